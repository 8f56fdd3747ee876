use std::path::PathBuf;

use clap::Parser;

use chip8_vm::DEFAULT_TICK_RATE;

/// An RGBA colour as stored in the pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

/// CHIP-8 emulator written in Rust.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// P pauses, K toggles the keypad overlay, 0 and 9 change the volume.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
pub struct Args {
    /// Path to the CHIP-8 ROM file
    pub rom_path: PathBuf,

    /// Foreground colour as RGB or RGBA hex
    #[arg(long, default_value = "FFFFFFFF", value_parser = parse_color)]
    pub fg: Rgba,

    /// Background colour as RGB or RGBA hex
    #[arg(long, default_value = "000000FF", value_parser = parse_color)]
    pub bg: Rgba,

    /// Emulated steps per second
    #[arg(long, default_value_t = DEFAULT_TICK_RATE, value_parser = parse_tick_rate)]
    pub tick_rate: f32,

    /// Initial window size as a multiple of the CHIP-8 resolution
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub scale: u32,

    /// Show the keypad overlay on startup
    #[arg(long)]
    pub keypad: bool,
}

pub fn parse_color(s: &str) -> Result<Rgba, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid hex colour: '{}'", s));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16);
    let parsed = match hex.len() {
        6 => (channel(0), channel(1), channel(2), Ok(0xFF)),
        8 => (channel(0), channel(1), channel(2), channel(3)),
        _ => return Err(format!("Colour must be RGB or RGBA hex: '{}'", s)),
    };

    match parsed {
        (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Rgba([r, g, b, a])),
        _ => Err(format!("Invalid hex colour: '{}'", s)),
    }
}

fn parse_tick_rate(s: &str) -> Result<f32, String> {
    match s.parse::<f32>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(format!("Tick rate must be a positive number: '{}'", s)),
    }
}
