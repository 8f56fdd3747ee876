mod execute;
mod font;
mod framebuffer;
mod machine;
mod opcode;
mod types;

pub use font::*;
pub use framebuffer::*;
pub use machine::*;
pub use opcode::*;
pub use types::*;
