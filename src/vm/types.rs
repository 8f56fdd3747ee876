use std::fmt;

pub const MEMORY_SIZE: usize = 4096;
/// Programs are loaded at this address; everything below it is reserved.
pub const ROM_START_ADDRESS: usize = 0x200;
pub const ROM_MAX_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;
pub const STACK_SIZE: usize = 16;
pub const KEYPAD_SIZE: usize = 16;

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;

/// Outcome of a single `Machine::step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An instruction was executed and the timers ticked.
    Executed,
    /// Fx0A found no pressed key; the same instruction runs again next step.
    WaitingForKey,
    /// An opcode with no known meaning was skipped.
    Unrecognized { opcode: u16 },
    /// The program counter ran past the end of memory. Timers still tick.
    Halted,
    /// The machine is paused or quit, nothing happened.
    Suspended(RunState),
}

/// Whether `step` advances the machine. Driven by the host, never by opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Paused,
    Quit,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::Running => "RUNNING",
            RunState::Paused => "PAUSED",
            RunState::Quit => "QUIT",
        })
    }
}

/// Error types that can occur during CHIP-8 emulation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Stack overflow: call at {address:#06X} with a full call stack")]
    StackOverflow { address: u16 },

    #[error("Stack underflow: return at {address:#06X} with an empty call stack")]
    StackUnderflow { address: u16 },
}
