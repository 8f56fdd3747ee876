use chip8_vm::{Machine, MachineError, Rom, Step, u4};

fn load(rom: &[u8]) -> Machine {
    let mut machine = Machine::with_seed(1);
    machine.load("scenario", rom).unwrap();
    machine
}

fn run(machine: &mut Machine, steps: usize) {
    for _ in 0..steps {
        machine.step().unwrap();
    }
}

fn lit(machine: &Machine, y: usize) -> Vec<usize> {
    (0..machine.screen().width())
        .filter(|&x| machine.screen().is_set(x, y))
        .collect()
}

#[test]
fn logo_style_program_draws_and_loops_on_last_draw() {
    let mut machine = load(&[
        0x00, 0xE0, // 0x200: clear
        0xA2, 0x10, // 0x202: I = 0x210
        0x60, 0x0A, // 0x204: V0 = 10
        0x61, 0x05, // 0x206: V1 = 5
        0xD0, 0x12, // 0x208: draw 2 rows at (10, 5)
        0x60, 0x0E, // 0x20A: V0 = 14
        0xD0, 0x12, // 0x20C: draw 2 rows at (14, 5)
        0x12, 0x0C, // 0x20E: jump to 0x20C
        0xFF, 0x81, // 0x210: sprite
    ]);

    run(&mut machine, 1);
    assert!(machine.screen().pixels().all(|p| !p));

    run(&mut machine, 4);
    assert_eq!(lit(&machine, 5), (10..18).collect::<Vec<_>>());
    assert_eq!(lit(&machine, 6), vec![10, 17]);
    assert_eq!(machine.register(u4::new(0xF)), 0);

    run(&mut machine, 2);
    assert_eq!(lit(&machine, 5), vec![10, 11, 12, 13, 18, 19, 20, 21]);
    assert_eq!(lit(&machine, 6), vec![10, 14, 17, 21]);
    assert_eq!(machine.register(u4::new(0xF)), 1);

    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x20C);

    run(&mut machine, 1);
    assert_eq!(lit(&machine, 5), (10..18).collect::<Vec<_>>());
    assert_eq!(lit(&machine, 6), vec![10, 17]);
    assert_eq!(machine.register(u4::new(0xF)), 1);
    assert_eq!(machine.index(), 0x210);
}

#[test]
fn skip_if_equal_skips_the_next_instruction() {
    let mut machine = load(&[0x60, 0x11, 0x30, 0x11, 0x60, 0x12]);

    run(&mut machine, 3);
    assert_eq!(machine.register(u4::new(0)), 0x11);
}

#[test]
fn oversized_rom_is_rejected_before_mutation() {
    let pristine = Machine::with_seed(1);
    let mut machine = Machine::with_seed(1);

    let result = machine.load_rom(&Rom::new("big", vec![0xAB; 3585]));

    assert_eq!(
        result,
        Err(MachineError::RomTooLarge {
            size: 3585,
            max_size: 3584
        })
    );
    assert_eq!(machine.pc(), 0x200);
    assert!(machine.registers().iter().all(|&v| v == 0));
    assert_eq!(machine.memory(), pristine.memory());
}

#[test]
fn call_then_return_resumes_after_the_call() {
    let mut machine = load(&[
        0x22, 0x06, // 0x200: call 0x206
        0x00, 0x00, // 0x202
        0x00, 0x00, // 0x204
        0x00, 0xEE, // 0x206: return
    ]);

    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x206);
    assert_eq!(machine.stack_depth(), 1);

    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x202);
    assert_eq!(machine.stack_depth(), 0);
}

#[test]
fn underflow_surfaces_as_an_error() {
    let mut machine = load(&[0x00, 0xEE]);

    let err = machine.step().unwrap_err();
    assert_eq!(err, MachineError::StackUnderflow { address: 0x200 });
    assert!(err.to_string().contains("0x0200"));
}

#[test]
fn wait_for_key_blocks_until_a_key_is_pressed() {
    let mut machine = load(&[
        0x60, 0x20, // V0 = 0x20
        0xF0, 0x15, // DT = V0
        0xF1, 0x0A, // V1 = key
        0x62, 0x01, // V2 = 1
    ]);
    run(&mut machine, 2);
    let delay = machine.delay_timer();

    for _ in 0..5 {
        assert_eq!(machine.step(), Ok(Step::WaitingForKey));
    }
    assert_eq!(machine.pc(), 0x204);
    assert_eq!(machine.delay_timer(), delay - 5);

    machine.set_key(0x7, true);
    run(&mut machine, 2);
    assert_eq!(machine.register(u4::new(1)), 0x7);
    assert_eq!(machine.register(u4::new(2)), 1);
}

#[test]
fn sound_timer_drives_the_tone_signal() {
    let mut machine = load(&[
        0x60, 0x02, // V0 = 2
        0xF0, 0x18, // ST = V0
        0x12, 0x04, // loop
    ]);

    run(&mut machine, 1);
    assert!(!machine.is_sound_active());

    run(&mut machine, 1);
    assert!(machine.is_sound_active());

    run(&mut machine, 1);
    assert!(!machine.is_sound_active());
}
