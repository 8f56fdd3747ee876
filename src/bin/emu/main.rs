mod config;
mod render;
mod tone;

use std::{sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey, PhysicalKey},
    window::{Window, WindowId},
};

use chip8_vm::{DISPLAY_X, DISPLAY_Y, Machine, Rom, Runner};

use config::Args;
use render::{Palette, draw_frame, frame_height};
use tone::Tone;

const VOLUME_STEP: f32 = 0.2;

/// Mapping from physical keyboard keys to CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x00
    KeyCode::Digit1, // 0x01
    KeyCode::Digit2, // 0x02
    KeyCode::Digit3, // 0x03
    KeyCode::KeyQ,   // 0x04
    KeyCode::KeyW,   // 0x05
    KeyCode::KeyE,   // 0x06
    KeyCode::KeyA,   // 0x07
    KeyCode::KeyS,   // 0x08
    KeyCode::KeyD,   // 0x09
    KeyCode::KeyZ,   // 0x0A
    KeyCode::KeyC,   // 0x0B
    KeyCode::Digit4, // 0x0C
    KeyCode::KeyR,   // 0x0D
    KeyCode::KeyF,   // 0x0E
    KeyCode::KeyV,   // 0x0F
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,

    palette: Palette,
    show_keypad: bool,
    scale: u32,

    tone: Tone,

    runner: Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(args: &Args, rom: &Rom) -> anyhow::Result<Self> {
        let tone = Tone::new()?;

        let mut machine = Machine::new();
        machine
            .load_rom(rom)
            .context("Failed to load ROM into CHIP-8 memory")?;
        machine.log_memory();

        Ok(Self {
            pixels: None,
            window: None,

            palette: Palette {
                fg: args.fg,
                bg: args.bg,
            },
            show_keypad: args.keypad,
            scale: args.scale,

            tone,

            runner: Runner::new(machine, args.tick_rate),
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn title(&self) -> String {
        let machine = self.runner.machine();
        format!(
            "CHIP8 Emulator: {} {}",
            machine.rom_name(),
            machine.run_state()
        )
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.title());
        }
    }

    fn toggle_keypad(&mut self) -> anyhow::Result<()> {
        self.show_keypad = !self.show_keypad;

        if let Some(pixels) = self.pixels.as_mut() {
            pixels
                .resize_buffer(DISPLAY_X as u32, frame_height(self.show_keypad) as u32)
                .context("Failed to resize pixels buffer")?;
        }
        Ok(())
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let height = frame_height(self.show_keypad) as u32;

        let window = {
            let size = LogicalSize::new(DISPLAY_X as u32 * self.scale, height * self.scale);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title(self.title())
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let pixels = Pixels::new(DISPLAY_X as u32, height, surface_texture)
                .context("Failed to create pixels surface")?;

            window.request_redraw();
            Some(pixels)
        };

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let dt = (now - self.last_frame_instant).as_secs_f32();
        self.last_frame_instant = now;

        self.runner.update(dt).context("CHIP-8 execution error")?;

        let machine = self.runner.machine();
        self.tone
            .update(machine.is_sound_active(), machine.volume());

        if let Some(pixels) = self.pixels.as_mut() {
            draw_frame(pixels.frame_mut(), machine, &self.palette, self.show_keypad);
            pixels.render().context("Pixels render error")?;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn handle_key(&mut self, event: KeyEvent) -> anyhow::Result<()> {
        let pressed = event.state == ElementState::Pressed;

        if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
            self.runner.machine_mut().set_key(key as u8, pressed);
            return Ok(());
        }

        if !pressed || event.repeat {
            return Ok(());
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyP) => {
                self.runner.machine_mut().toggle_pause();
                self.refresh_title();
            }
            PhysicalKey::Code(KeyCode::KeyK) => self.toggle_keypad()?,
            PhysicalKey::Code(KeyCode::Digit0) => {
                self.runner.machine_mut().adjust_volume(VOLUME_STEP)
            }
            PhysicalKey::Code(KeyCode::Digit9) => {
                self.runner.machine_mut().adjust_volume(-VOLUME_STEP)
            }
            _ => {}
        }
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                self.runner.machine_mut().quit();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::RedrawRequested => self.redraw()?,

            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event)?,

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            log::error!("{e:#}");
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let rom = Rom::from_file(&args.rom_path).context("Failed to read ROM file")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&args, &rom).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
