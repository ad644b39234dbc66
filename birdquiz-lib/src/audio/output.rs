//! `rodio` implementation of the audio output seam.

use std::thread;
use std::time::Duration;

use log::{error, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::{AudioOutput, ClipBuffer, PlaybackHandle};
use crate::error::QuizError;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 5;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Plays clips on the default output device.
///
/// The device is opened on the first `start` call so sessions that never play
/// audio (scripted runs, tests) do not need one.
pub struct RodioOutput {
    stream: Option<OutputStream>,
    volume: f32,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self::with_volume(0.8)
    }

    pub fn with_volume(volume: f32) -> Self {
        Self {
            stream: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn stream(&mut self) -> Result<&OutputStream, QuizError> {
        if self.stream.is_none() {
            let mut stream = open_output_stream_with_retry().ok_or_else(|| {
                QuizError::Playback("no audio output device available".to_string())
            })?;
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }

        self.stream
            .as_ref()
            .ok_or_else(|| QuizError::Playback("output stream unavailable".to_string()))
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RodioOutput {
    fn start(&mut self, buffer: &ClipBuffer) -> Result<Box<dyn PlaybackHandle>, QuizError> {
        buffer.validate()?;
        let volume = self.volume;
        let stream = self.stream()?;

        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume);
        sink.append(buffer.to_source());
        sink.play();

        Ok(Box::new(SinkPlayback { sink }))
    }
}

/// Playback handle backed by a dedicated sink.
struct SinkPlayback {
    sink: Sink,
}

impl PlaybackHandle for SinkPlayback {
    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

/// Open the default output stream with bounded retry behavior.
fn open_output_stream_with_retry() -> Option<OutputStream> {
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return None;
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    None
}
