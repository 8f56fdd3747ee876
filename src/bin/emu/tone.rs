use anyhow::Context;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SineWave};

const TONE_HZ: f32 = 440.0;

/// A 440 Hz tone that follows the machine's sound timer.
pub struct Tone {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    sink: Sink,
    playing: bool,
}

impl Tone {
    pub fn new() -> anyhow::Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(SineWave::new(TONE_HZ).amplify(0.5));

        Ok(Self {
            _stream: stream,
            sink,
            playing: false,
        })
    }

    /// Starts or stops the tone and applies the current volume.
    pub fn update(&mut self, active: bool, volume: f32) {
        self.sink.set_volume(volume);

        if active == self.playing {
            return;
        }

        if active {
            self.sink.play();
        } else {
            self.sink.pause();
        }
        self.playing = active;
        log::trace!("Tone {}", if active { "started" } else { "stopped" });
    }
}
