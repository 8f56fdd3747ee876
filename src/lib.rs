//! A CHIP-8 interpreter core.
//!
//! [`Machine`] owns the whole machine state and advances one instruction per
//! [`Machine::step`]. Pacing, input mapping, rendering and sound are left to
//! the caller; [`Runner`] is a small helper for driving a machine from
//! wall-clock time.

mod nibble;
pub mod rom;
pub mod runner;
pub mod vm;

pub use nibble::u4;
pub use rom::{Rom, RomError};
pub use runner::{DEFAULT_TICK_RATE, Runner};
pub use vm::{DISPLAY_X, DISPLAY_Y, Framebuffer, Machine, MachineError, Opcode, RunState, Step};
