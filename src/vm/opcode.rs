use std::fmt;

use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// Operand names follow the usual notation: `x`/`y` select registers, `n` is
/// the low nibble, `nn` the low byte and `nnn` the 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 1nnn - PC = nnn.
    Jump { nnn: u16 },
    /// Bnnn - PC = nnn + V0.
    JumpWithOffset { nnn: u16 },

    /// 2nnn - Push the return address and jump to nnn. Fatal when all 16
    /// stack slots are in use.
    Call { nnn: u16 },
    /// 00EE - Pop the return address. Fatal on an empty stack.
    Return,

    /// 3xnn - Skip if Vx == nn.
    SkipRegEqualImm { x: u4, nn: u8 },
    /// 4xnn - Skip if Vx != nn.
    SkipRegNotEqualImm { x: u4, nn: u8 },
    /// 5xy0 - Skip if Vx == Vy. Any other low nibble is unrecognized.
    SkipRegEqualReg { x: u4, y: u4 },
    /// 9xy0 - Skip if Vx != Vy. Any other low nibble is unrecognized.
    SkipRegNotEqualReg { x: u4, y: u4 },

    /// 6xnn - Vx = nn.
    SetRegImm { x: u4, nn: u8 },
    /// 7xnn - Vx += nn, wrapping. VF is left alone.
    AddRegImm { x: u4, nn: u8 },
    /// Annn - I = nnn.
    SetIndexImm { nnn: u16 },
    /// Fx1E - I += Vx, wrapping at 16 bits. VF is left alone.
    AddIndexReg { x: u4 },

    /// 8xyN - Register arithmetic, see [`OpcodeALU`].
    ALU { x: u4, y: u4, op: OpcodeALU },
    /// Cxnn - Vx = random byte AND nn.
    Random { x: u4, nn: u8 },

    /// 00E0 - Clear the screen.
    ClearDisplay,
    /// Dxyn - XOR an n-row sprite read from I onto the screen at (Vx, Vy).
    /// The origin wraps, the sprite clips. VF = 1 if any pixel was erased.
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip if key Vx is down. Never skips for Vx > 0xF.
    SkipIfPressed { x: u4 },
    /// ExA1 - Skip if key Vx is up. Never skips for Vx > 0xF.
    SkipIfNotPressed { x: u4 },
    /// Fx0A - Vx = lowest pressed key; repeats until one is down.
    WaitForKey { x: u4 },

    /// Fx07 - Vx = delay timer.
    ReadDelayTimer { x: u4 },
    /// Fx15 - Delay timer = Vx.
    SetDelayTimer { x: u4 },
    /// Fx18 - Sound timer = Vx.
    SetSoundTimer { x: u4 },

    /// Fx29 - I = address of the built-in glyph for the digit Vx.
    FontChar { x: u4 },
    /// Fx33 - Hundreds, tens and ones of Vx to I, I+1, I+2.
    BCD { x: u4 },

    /// Fx55 - Copy V0..=Vx to memory at I. I is unchanged.
    StoreRegs { x: u4 },
    /// Fx65 - Copy memory at I into V0..=Vx. I is unchanged.
    LoadRegs { x: u4 },

    /// Any pattern above that does not match, including 0nnn machine
    /// routines. Executing it only advances the program counter.
    Unknown(u16),
}

/// The 8xyN arithmetic forms, selected by the low nibble.
///
/// Forms that produce a flag write VF before Vx, so with x = F the result
/// wins and with y = F the new flag is the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeALU {
    /// 8xy0 - Vx = Vy
    Set,
    /// 8xy1 - Vx |= Vy
    Or,
    /// 8xy2 - Vx &= Vy
    And,
    /// 8xy3 - Vx ^= Vy
    Xor,
    /// 8xy4 - VF = carry, then Vx += Vy
    Add,
    /// 8xy5 - VF = Vx >= Vy, then Vx -= Vy
    Sub,
    /// 8xy6 - VF = low bit of Vx, then Vx >>= 1
    ShiftRight,
    /// 8xy7 - VF = Vy >= Vx, then Vx = Vy - Vx
    SubReverse,
    /// 8xyE - VF = high bit of Vx, then Vx <<= 1
    ShiftLeft,
}

impl OpcodeALU {
    fn decode(n: u8) -> Option<Self> {
        Some(match n {
            0x0 => OpcodeALU::Set,
            0x1 => OpcodeALU::Or,
            0x2 => OpcodeALU::And,
            0x3 => OpcodeALU::Xor,
            0x4 => OpcodeALU::Add,
            0x5 => OpcodeALU::Sub,
            0x6 => OpcodeALU::ShiftRight,
            0x7 => OpcodeALU::SubReverse,
            0xE => OpcodeALU::ShiftLeft,
            _ => return None,
        })
    }
}

impl Opcode {
    /// Splits a big-endian instruction word into its operation. Never fails;
    /// unmatched words become [`Opcode::Unknown`].
    pub fn decode(raw: u16) -> Self {
        let [high, low] = raw.to_be_bytes();
        let family = high >> 4;
        let x = u4::new(high & 0x0F);
        let y = u4::new(low >> 4);
        let n = u4::new(low & 0x0F);
        let nn = low;
        let nnn = raw & 0x0FFF;

        match (family, u8::from(n)) {
            (0x0, _) if raw == 0x00E0 => Opcode::ClearDisplay,
            (0x0, _) if raw == 0x00EE => Opcode::Return,
            (0x1, _) => Opcode::Jump { nnn },
            (0x2, _) => Opcode::Call { nnn },
            (0x3, _) => Opcode::SkipRegEqualImm { x, nn },
            (0x4, _) => Opcode::SkipRegNotEqualImm { x, nn },
            (0x5, 0x0) => Opcode::SkipRegEqualReg { x, y },
            (0x6, _) => Opcode::SetRegImm { x, nn },
            (0x7, _) => Opcode::AddRegImm { x, nn },
            (0x8, op) => match OpcodeALU::decode(op) {
                Some(op) => Opcode::ALU { x, y, op },
                None => Opcode::Unknown(raw),
            },
            (0x9, 0x0) => Opcode::SkipRegNotEqualReg { x, y },
            (0xA, _) => Opcode::SetIndexImm { nnn },
            (0xB, _) => Opcode::JumpWithOffset { nnn },
            (0xC, _) => Opcode::Random { x, nn },
            (0xD, _) => Opcode::Draw { x, y, n },
            (0xE, _) => match nn {
                0x9E => Opcode::SkipIfPressed { x },
                0xA1 => Opcode::SkipIfNotPressed { x },
                _ => Opcode::Unknown(raw),
            },
            (0xF, _) => match nn {
                0x07 => Opcode::ReadDelayTimer { x },
                0x0A => Opcode::WaitForKey { x },
                0x15 => Opcode::SetDelayTimer { x },
                0x18 => Opcode::SetSoundTimer { x },
                0x1E => Opcode::AddIndexReg { x },
                0x29 => Opcode::FontChar { x },
                0x33 => Opcode::BCD { x },
                0x55 => Opcode::StoreRegs { x },
                0x65 => Opcode::LoadRegs { x },
                _ => Opcode::Unknown(raw),
            },
            _ => Opcode::Unknown(raw),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Opcode::Jump { nnn } => write!(f, "JP {nnn:#05X}"),
            Opcode::JumpWithOffset { nnn } => write!(f, "JP V0, {nnn:#05X}"),
            Opcode::Call { nnn } => write!(f, "CALL {nnn:#05X}"),
            Opcode::Return => write!(f, "RET"),
            Opcode::SkipRegEqualImm { x, nn } => write!(f, "SE V{x:X}, {nn:#04X}"),
            Opcode::SkipRegNotEqualImm { x, nn } => write!(f, "SNE V{x:X}, {nn:#04X}"),
            Opcode::SkipRegEqualReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Opcode::SkipRegNotEqualReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            Opcode::SetRegImm { x, nn } => write!(f, "LD V{x:X}, {nn:#04X}"),
            Opcode::AddRegImm { x, nn } => write!(f, "ADD V{x:X}, {nn:#04X}"),
            Opcode::SetIndexImm { nnn } => write!(f, "LD I, {nnn:#05X}"),
            Opcode::AddIndexReg { x } => write!(f, "ADD I, V{x:X}"),
            Opcode::ALU { x, y, op } => {
                let mnemonic = match op {
                    OpcodeALU::Set => "LD",
                    OpcodeALU::Or => "OR",
                    OpcodeALU::And => "AND",
                    OpcodeALU::Xor => "XOR",
                    OpcodeALU::Add => "ADD",
                    OpcodeALU::Sub => "SUB",
                    OpcodeALU::ShiftRight => "SHR",
                    OpcodeALU::SubReverse => "SUBN",
                    OpcodeALU::ShiftLeft => "SHL",
                };
                match op {
                    OpcodeALU::ShiftRight | OpcodeALU::ShiftLeft => write!(f, "{mnemonic} V{x:X}"),
                    _ => write!(f, "{mnemonic} V{x:X}, V{y:X}"),
                }
            }
            Opcode::Random { x, nn } => write!(f, "RND V{x:X}, {nn:#04X}"),
            Opcode::ClearDisplay => write!(f, "CLS"),
            Opcode::Draw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n:X}"),
            Opcode::SkipIfPressed { x } => write!(f, "SKP V{x:X}"),
            Opcode::SkipIfNotPressed { x } => write!(f, "SKNP V{x:X}"),
            Opcode::WaitForKey { x } => write!(f, "LD V{x:X}, K"),
            Opcode::ReadDelayTimer { x } => write!(f, "LD V{x:X}, DT"),
            Opcode::SetDelayTimer { x } => write!(f, "LD DT, V{x:X}"),
            Opcode::SetSoundTimer { x } => write!(f, "LD ST, V{x:X}"),
            Opcode::FontChar { x } => write!(f, "LD F, V{x:X}"),
            Opcode::BCD { x } => write!(f, "LD B, V{x:X}"),
            Opcode::StoreRegs { x } => write!(f, "LD [I], V{x:X}"),
            Opcode::LoadRegs { x } => write!(f, "LD V{x:X}, [I]"),
            Opcode::Unknown(opcode) => write!(f, "??? {opcode:#06X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operand_fields() {
        assert_eq!(
            Opcode::decode(0xD12F),
            Opcode::Draw {
                x: u4::new(1),
                y: u4::new(2),
                n: u4::new(0xF)
            }
        );
        assert_eq!(Opcode::decode(0x1ABC), Opcode::Jump { nnn: 0xABC });
        assert_eq!(
            Opcode::decode(0x7A42),
            Opcode::AddRegImm {
                x: u4::new(0xA),
                nn: 0x42
            }
        );
    }

    #[test]
    fn decodes_every_alu_form() {
        let cases = [
            (0x8120, OpcodeALU::Set),
            (0x8121, OpcodeALU::Or),
            (0x8122, OpcodeALU::And),
            (0x8123, OpcodeALU::Xor),
            (0x8124, OpcodeALU::Add),
            (0x8125, OpcodeALU::Sub),
            (0x8126, OpcodeALU::ShiftRight),
            (0x8127, OpcodeALU::SubReverse),
            (0x812E, OpcodeALU::ShiftLeft),
        ];

        for (raw, op) in cases {
            assert_eq!(
                Opcode::decode(raw),
                Opcode::ALU {
                    x: u4::new(1),
                    y: u4::new(2),
                    op
                },
                "{raw:#06X}"
            );
        }
    }

    #[test]
    fn decodes_timer_and_memory_forms() {
        let x = u4::new(3);
        assert_eq!(Opcode::decode(0xF30A), Opcode::WaitForKey { x });
        assert_eq!(Opcode::decode(0xF307), Opcode::ReadDelayTimer { x });
        assert_eq!(Opcode::decode(0xF315), Opcode::SetDelayTimer { x });
        assert_eq!(Opcode::decode(0xF318), Opcode::SetSoundTimer { x });
        assert_eq!(Opcode::decode(0xF31E), Opcode::AddIndexReg { x });
        assert_eq!(Opcode::decode(0xF329), Opcode::FontChar { x });
        assert_eq!(Opcode::decode(0xF333), Opcode::BCD { x });
        assert_eq!(Opcode::decode(0xF355), Opcode::StoreRegs { x });
        assert_eq!(Opcode::decode(0xF365), Opcode::LoadRegs { x });
        assert_eq!(Opcode::decode(0xE39E), Opcode::SkipIfPressed { x });
        assert_eq!(Opcode::decode(0xE3A1), Opcode::SkipIfNotPressed { x });
    }

    #[test]
    fn unrecognized_patterns_decode_as_unknown() {
        for raw in [0x0000, 0x0123, 0x00E1, 0x5121, 0x912F, 0x8128, 0x812F, 0xE19F, 0xF1FF, 0x0E0E] {
            assert_eq!(Opcode::decode(raw), Opcode::Unknown(raw), "{raw:#06X}");
        }
    }

    #[test]
    fn mnemonics_are_readable() {
        assert_eq!(Opcode::decode(0x00E0).to_string(), "CLS");
        assert_eq!(Opcode::decode(0x2ABC).to_string(), "CALL 0xABC");
        assert_eq!(Opcode::decode(0x6A0F).to_string(), "LD VA, 0x0F");
        assert_eq!(Opcode::decode(0x8126).to_string(), "SHR V1");
        assert_eq!(Opcode::decode(0xD015).to_string(), "DRW V0, V1, 5");
        assert_eq!(Opcode::decode(0x0123).to_string(), "??? 0x0123");
    }
}
