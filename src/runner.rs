use crate::vm::{Machine, MachineError, Step};

pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// Upper bound on steps per `update`, so a stalled host does not burst-execute.
const MAX_STEPS_PER_UPDATE: u32 = 8;

/// Paces a `Machine` against wall-clock time.
///
/// The machine has no notion of time; the runner turns elapsed seconds into
/// a whole number of `step` calls at the configured tick rate.
pub struct Runner {
    machine: Machine,
    tick_step: f32,
    dt_accumulator: f32,
}

impl Runner {
    /// Creates a runner stepping `machine` `tick_rate` times per second.
    ///
    /// Panics if `tick_rate` is not a positive, finite number.
    pub fn new(machine: Machine, tick_rate: f32) -> Self {
        assert!(
            tick_rate.is_finite() && tick_rate > 0.0,
            "tick rate must be positive and finite, got {tick_rate}"
        );

        Self {
            machine,
            tick_step: 1.0 / tick_rate,
            dt_accumulator: 0.0,
        }
    }

    /// Update the machine by delta time.
    ///
    /// Runs as many steps as fit into the accumulated time. Returns the last
    /// step outcome, or `None` if not enough time has passed for a step.
    pub fn update(&mut self, dt: f32) -> Result<Option<Step>, MachineError> {
        self.dt_accumulator += dt;

        let mut last = None;
        let mut steps = 0;
        while self.dt_accumulator >= self.tick_step {
            if steps == MAX_STEPS_PER_UPDATE {
                // Drop the backlog instead of catching up
                self.dt_accumulator = 0.0;
                break;
            }

            self.dt_accumulator -= self.tick_step;
            steps += 1;

            let step = self.machine.step()?;
            last = Some(step);

            if let Step::Suspended(_) = step {
                // Avoid a burst of steps when the machine resumes
                self.dt_accumulator = 0.0;
                break;
            }
        }

        Ok(last)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_with(rom: &[u8]) -> Runner {
        let mut machine = Machine::with_seed(0);
        machine.load("runner", rom).unwrap();
        Runner::new(machine, 10.0)
    }

    #[test]
    fn steps_once_per_tick() {
        // 0x200: V0 += 1; jump back
        let mut runner = runner_with(&[0x70, 0x01, 0x12, 0x00]);

        assert_eq!(runner.update(0.05), Ok(None));
        assert_eq!(runner.update(0.06), Ok(Some(Step::Executed)));
        assert_eq!(runner.machine().registers()[0], 1);

        // jump, add, jump
        runner.update(0.35).unwrap();
        assert_eq!(runner.machine().pc(), 0x200);
        assert_eq!(runner.machine().registers()[0], 2);
    }

    #[test]
    fn large_delta_is_capped() {
        let mut runner = runner_with(&[0x70, 0x01, 0x12, 0x00]);

        runner.update(100.0).unwrap();
        assert_eq!(
            runner.machine().registers()[0],
            (MAX_STEPS_PER_UPDATE / 2) as u8
        );

        // The backlog was dropped
        assert_eq!(runner.update(0.0), Ok(None));
    }

    #[test]
    fn paused_machine_stops_the_loop() {
        let mut runner = runner_with(&[0x70, 0x01, 0x12, 0x00]);
        runner.machine_mut().toggle_pause();

        assert_eq!(
            runner.update(0.5),
            Ok(Some(Step::Suspended(crate::vm::RunState::Paused)))
        );
        runner.machine_mut().toggle_pause();
        assert_eq!(runner.update(0.0), Ok(None));
        assert_eq!(runner.machine().registers()[0], 0);
    }

    #[test]
    #[should_panic(expected = "tick rate must be positive")]
    fn zero_tick_rate_is_rejected() {
        Runner::new(Machine::with_seed(0), 0.0);
    }

    #[test]
    #[should_panic(expected = "tick rate must be positive")]
    fn nan_tick_rate_is_rejected() {
        Runner::new(Machine::with_seed(0), f32::NAN);
    }

    #[test]
    fn fatal_errors_propagate() {
        let mut runner = runner_with(&[0x00, 0xEE]);
        assert_eq!(
            runner.update(0.1),
            Err(MachineError::StackUnderflow { address: 0x200 })
        );
    }
}
