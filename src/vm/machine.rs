use rand::{SeedableRng, rngs::StdRng};

use super::{
    FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Framebuffer, KEYPAD_SIZE, MEMORY_SIZE,
    MachineError, Opcode, ROM_MAX_SIZE, ROM_START_ADDRESS, RunState, STACK_SIZE, Step,
};
use crate::u4;

const VOLUME_MIN: f32 = 0.0;
const VOLUME_MAX: f32 = 1.0;

/// CHIP-8 virtual machine state
pub struct Machine {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) display: Framebuffer,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Return addresses for subroutine calls
    pub(crate) stack: [u16; STACK_SIZE],
    /// Number of occupied stack slots
    pub(crate) sp: usize,

    /// Delay timer: decrements once per step until it reaches 0
    pub(crate) delay_timer: u8,
    /// Sound timer: decrements once per step, beeps while non-zero
    pub(crate) sound_timer: u8,

    /// Keypad state: 16 keys mapped as booleans (true = pressed)
    pub(crate) keypad: [bool; KEYPAD_SIZE],

    pub(crate) rng: StdRng,

    run_state: RunState,
    volume: f32,
    rom_name: String,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a machine whose `Cxnn` results are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);

        Machine {
            memory,
            display: Framebuffer::new(),
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; KEYPAD_SIZE],
            rng,
            run_state: RunState::Running,
            volume: VOLUME_MAX,
            rom_name: String::new(),
        }
    }

    /// Copies a program image to the entry point and resets the program counter.
    ///
    /// Images larger than the space above the reserved area are rejected
    /// before anything is written.
    pub fn load(&mut self, name: &str, rom: &[u8]) -> Result<(), MachineError> {
        if rom.len() > ROM_MAX_SIZE {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max_size: ROM_MAX_SIZE,
            });
        }

        let rom_end = ROM_START_ADDRESS + rom.len();
        self.memory[ROM_START_ADDRESS..rom_end].copy_from_slice(rom);
        self.pc = ROM_START_ADDRESS as u16;
        self.rom_name = name.to_owned();

        log::info!("Loaded ROM {name:?} ({} bytes)", rom.len());
        Ok(())
    }

    /// Runs one instruction cycle followed by one timer tick.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if self.run_state != RunState::Running {
            return Ok(Step::Suspended(self.run_state));
        }

        let result = match self.fetch() {
            Some(raw) => {
                let address = self.pc;
                let opcode = Opcode::decode(raw);
                log::trace!("{address:03X}: {raw:04X} {opcode}");

                match self.execute(opcode) {
                    Ok(step) => step,
                    Err(err) => {
                        // Leave the machine pointing at the faulting instruction
                        self.pc = address;
                        return Err(err);
                    }
                }
            }
            None => Step::Halted,
        };

        self.timers_cycle();
        Ok(result)
    }

    fn timers_cycle(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);

        if self.sound_timer == 1 {
            log::debug!("Sound timer expired");
        }
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Returns true if the sound timer is greater than zero, indicating a tone should be played.
    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Set the state of a key on the keypad. Indices past 0xF are ignored.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match u4::try_from(key) {
            Ok(key) => self.keypad[key] = pressed,
            Err(key) => log::debug!("Ignoring state change of nonexistent key {key:#04X}"),
        }
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        u4::try_from(key).is_ok_and(|key| self.keypad[key])
    }

    pub fn screen(&self) -> &Framebuffer {
        &self.display
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Switches between running and paused. A machine that quit stays quit.
    pub fn toggle_pause(&mut self) {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Quit => RunState::Quit,
        };
        log::info!("Machine is now {}", self.run_state);
    }

    pub fn quit(&mut self) {
        self.run_state = RunState::Quit;
        log::info!("Machine is now {}", self.run_state);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Changes the tone volume by `delta`, clamped to `0.0..=1.0`.
    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume = (self.volume + delta).clamp(VOLUME_MIN, VOLUME_MAX);
        log::debug!("Volume set to {:.1}", self.volume);
    }

    pub fn rom_name(&self) -> &str {
        &self.rom_name
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn register(&self, x: u4) -> u8 {
        self.v[x]
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    /// Writes a hex dump of the whole address space to the debug log.
    pub fn log_memory(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }

        for row in self.memory_dump() {
            log::debug!("{row}");
        }
    }

    /// The address space as `ADDR: B0 B1 ... B15` rows of 16 bytes.
    fn memory_dump(&self) -> impl Iterator<Item = String> + '_ {
        self.memory.chunks(16).enumerate().map(|(row, chunk)| {
            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
            format!("{:03X}: {}", row * 16, bytes.join(" "))
        })
    }

    /// Fetches the next 16-bit opcode, or `None` if it would run off the end of memory.
    fn fetch(&self) -> Option<u16> {
        let pc = usize::from(self.pc);
        let high = *self.memory.get(pc)?;
        let low = *self.memory.get(pc + 1)?;

        Some(u16::from_be_bytes([high, low]))
    }

    /// Memory accessed through `I` wraps around the 4KB address space.
    pub(crate) fn mem_get(&mut self, addr: u16) -> &mut u8 {
        &mut self.memory[usize::from(addr) % MEMORY_SIZE]
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
