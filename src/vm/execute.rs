use rand::Rng;

use super::{
    DISPLAY_X, DISPLAY_Y, FONT_GLYPH_SIZE, FONT_START_ADDRESS, KEYPAD_SIZE, Machine, MachineError,
    Opcode, OpcodeALU, STACK_SIZE, Step,
};
use crate::u4;

impl Machine {
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<Step, MachineError> {
        let address = self.pc;
        self.pc = self.pc.wrapping_add(2);

        match opcode {
            Opcode::ClearDisplay => {
                self.display.clear();
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                if self.sp == STACK_SIZE {
                    return Err(MachineError::StackOverflow { address });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            Opcode::Return => {
                if self.sp == 0 {
                    return Err(MachineError::StackUnderflow { address });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                if self.v[x] == nn {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                if self.v[x] != nn {
                    self.skip();
                }
            }
            Opcode::SkipRegEqualReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n);
            }
            Opcode::SkipIfPressed { x } => {
                if self.key_at(self.v[x]) == Some(true) {
                    self.skip();
                }
            }
            Opcode::SkipIfNotPressed { x } => {
                if self.key_at(self.v[x]) == Some(false) {
                    self.skip();
                }
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelayTimer { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontChar { x } => {
                self.i = FONT_START_ADDRESS as u16 + u16::from(self.v[x]) * FONT_GLYPH_SIZE as u16;
            }
            Opcode::BCD { x } => {
                let value = self.v[x];
                *self.mem_get(self.i) = value / 100;
                *self.mem_get(self.i.wrapping_add(1)) = (value / 10) % 10;
                *self.mem_get(self.i.wrapping_add(2)) = value % 10;
            }
            Opcode::StoreRegs { x } => {
                for offset in 0..=u8::from(x) {
                    *self.mem_get(self.i.wrapping_add(offset.into())) = self.v[usize::from(offset)];
                }
            }
            Opcode::LoadRegs { x } => {
                for offset in 0..=u8::from(x) {
                    self.v[usize::from(offset)] = *self.mem_get(self.i.wrapping_add(offset.into()));
                }
            }
            Opcode::Unknown(opcode) => {
                log::warn!("Skipping unrecognized opcode {opcode:04X} at {address:03X}");
                return Ok(Step::Unrecognized { opcode });
            }
        };

        Ok(Step::Executed)
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Key state for a register value, `None` if no such key exists.
    fn key_at(&self, key: u8) -> Option<bool> {
        self.keypad.get(usize::from(key)).copied()
    }

    // VF is written before the result, so the arithmetic sees the new flag
    // whenever x or y is F.
    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        match op {
            OpcodeALU::Set => self.v[x] = self.v[y],
            OpcodeALU::Or => self.v[x] |= self.v[y],
            OpcodeALU::And => self.v[x] &= self.v[y],
            OpcodeALU::Xor => self.v[x] ^= self.v[y],
            OpcodeALU::Add => {
                let carry = self.v[x].checked_add(self.v[y]).is_none();
                self.v[0xF] = u8::from(carry);
                self.v[x] = self.v[x].wrapping_add(self.v[y]);
            }
            OpcodeALU::Sub => {
                self.v[0xF] = u8::from(self.v[x] >= self.v[y]); // Not borrow
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
            }
            OpcodeALU::SubReverse => {
                self.v[0xF] = u8::from(self.v[y] >= self.v[x]);
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
            }
            OpcodeALU::ShiftRight => {
                self.v[0xF] = self.v[x] & 1;
                self.v[x] >>= 1;
            }
            OpcodeALU::ShiftLeft => {
                self.v[0xF] = (self.v[x] >> 7) & 1;
                self.v[x] <<= 1;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) {
        let x_pos = self.v[x] as usize % DISPLAY_X;
        let y_pos = self.v[y] as usize % DISPLAY_Y;

        // Clip instead of wrapping at the right and bottom edges
        let row_count = std::cmp::min(usize::from(n), DISPLAY_Y - y_pos);
        let col_count = std::cmp::min(8, DISPLAY_X - x_pos);

        let mut any_erased = false;
        for row in 0..row_count {
            let sprite_byte = *self.mem_get(self.i.wrapping_add(row as u16));

            for col in 0..col_count {
                if (sprite_byte & (0x80 >> col)) != 0 {
                    any_erased |= self.display.flip(x_pos + col, y_pos + row);
                }
            }
        }

        self.v[0xF] = u8::from(any_erased);
    }

    fn execute_wait_for_key(&mut self, x: u4) -> Step {
        if let Some(key) = (0..KEYPAD_SIZE).find(|&key| self.keypad[key]) {
            self.v[x] = key as u8;
            return Step::Executed;
        }

        // Repeat this instruction on the next step
        self.pc = self.pc.wrapping_sub(2);
        Step::WaitingForKey
    }
}
