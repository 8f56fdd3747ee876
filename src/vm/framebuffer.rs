use super::{DISPLAY_X, DISPLAY_Y};

/// 64x32 monochrome display. Cells are addressed by column and row; the
/// storage order is an implementation detail.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [bool; DISPLAY_X * DISPLAY_Y],
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            cells: [false; DISPLAY_X * DISPLAY_Y],
        }
    }

    pub const fn width(&self) -> usize {
        DISPLAY_X
    }

    pub const fn height(&self) -> usize {
        DISPLAY_Y
    }

    /// Returns true if the pixel at column `x`, row `y` is lit.
    /// Coordinates outside the screen read as unlit.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_X && y < DISPLAY_Y && self.cells[y * DISPLAY_X + x]
    }

    /// All pixels row by row, starting at the top-left corner.
    pub fn pixels(&self) -> impl Iterator<Item = bool> + '_ {
        self.cells.iter().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// XORs a lit sprite bit onto the cell and returns true if the cell was erased.
    pub(crate) fn flip(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.cells[y * DISPLAY_X + x];
        *pixel ^= true;
        !*pixel
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..DISPLAY_Y {
            let row: String = (0..DISPLAY_X)
                .map(|x| if self.is_set(x, y) { '#' } else { '.' })
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
