use chip8_vm::{DISPLAY_X, DISPLAY_Y, Machine};

use crate::config::Rgba;

/// Extra rows below the screen while the keypad overlay is shown.
pub const KEYPAD_AREA_HEIGHT: usize = 22;

const BUTTON_SIZE: usize = 4;
const BUTTON_GAP: usize = 1;
const BUTTONS_PER_ROW: usize = 4;

const BUTTON_RELEASED: Rgba = Rgba([0x99, 0x99, 0x99, 0xFF]);
const BUTTON_PRESSED: Rgba = Rgba([0x65, 0xF0, 0x57, 0xFF]);

/// Hex keypad as laid out on the original COSMAC VIP.
const KEYPAD_LAYOUT: [[u8; 4]; 4] = [
    [0x1, 0x2, 0x3, 0xC],
    [0x4, 0x5, 0x6, 0xD],
    [0x7, 0x8, 0x9, 0xE],
    [0xA, 0x0, 0xB, 0xF],
];

pub struct Palette {
    pub fg: Rgba,
    pub bg: Rgba,
}

pub fn frame_height(show_keypad: bool) -> usize {
    if show_keypad {
        DISPLAY_Y + KEYPAD_AREA_HEIGHT
    } else {
        DISPLAY_Y
    }
}

/// Paints the machine screen, and optionally the keypad, into an RGBA frame
/// that is `DISPLAY_X` pixels wide.
pub fn draw_frame(frame: &mut [u8], machine: &Machine, palette: &Palette, show_keypad: bool) {
    let screen = machine.screen();

    for (i, pxl) in frame.chunks_exact_mut(4).enumerate() {
        let x = i % DISPLAY_X;
        let y = i / DISPLAY_X;

        let color = if screen.is_set(x, y) {
            palette.fg
        } else {
            palette.bg
        };
        pxl.copy_from_slice(&color.0);
    }

    if show_keypad {
        draw_keypad(frame, machine);
    }
}

fn draw_keypad(frame: &mut [u8], machine: &Machine) {
    let keypad_width = BUTTONS_PER_ROW * BUTTON_SIZE + (BUTTONS_PER_ROW - 1) * BUTTON_GAP;
    let offset_x = (DISPLAY_X - keypad_width) / 2;
    let offset_y = DISPLAY_Y + 1;

    for (row, keys) in KEYPAD_LAYOUT.iter().enumerate() {
        for (col, &key) in keys.iter().enumerate() {
            let color = if machine.is_key_pressed(key) {
                BUTTON_PRESSED
            } else {
                BUTTON_RELEASED
            };

            let left = offset_x + col * (BUTTON_SIZE + BUTTON_GAP);
            let top = offset_y + row * (BUTTON_SIZE + BUTTON_GAP);
            fill_rect(frame, left, top, BUTTON_SIZE, color);
        }
    }
}

fn fill_rect(frame: &mut [u8], left: usize, top: usize, size: usize, color: Rgba) {
    for y in top..top + size {
        for x in left..left + size {
            let offset = (y * DISPLAY_X + x) * 4;
            if let Some(pxl) = frame.get_mut(offset..offset + 4) {
                pxl.copy_from_slice(&color.0);
            }
        }
    }
}
