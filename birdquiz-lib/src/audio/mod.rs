//! Decoded clip buffers and the audio output seam.

pub mod convert;
pub mod decode;
pub mod output;

use std::sync::Arc;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;

use crate::error::QuizError;

pub use decode::decode_clip;
pub use output::RodioOutput;

/// Decoded, interleaved `f32` audio held in memory.
///
/// Samples are shared so a buffer can be replayed without re-decoding.
#[derive(Debug, Clone)]
pub struct ClipBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    samples: Arc<[f32]>,
}

impl ClipBuffer {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Reject buffers an output device cannot play.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.channels == 0 || self.sample_rate == 0 {
            return Err(QuizError::Playback(format!(
                "malformed buffer ({} channel(s) at {} Hz)",
                self.channels, self.sample_rate
            )));
        }
        if self.frames() == 0 {
            return Err(QuizError::Playback("buffer holds no audio".to_string()));
        }
        Ok(())
    }

    /// Build a fresh `rodio` source that plays the buffer from the start.
    pub fn to_source(&self) -> SamplesBuffer {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.to_vec())
    }
}

/// A live playback started by an [`AudioOutput`].
pub trait PlaybackHandle {
    fn is_playing(&self) -> bool;
    fn stop(&mut self);
}

/// Something that can start asynchronous playback of a decoded clip.
pub trait AudioOutput {
    /// Start playing `buffer` from the beginning without blocking.
    fn start(&mut self, buffer: &ClipBuffer) -> Result<Box<dyn PlaybackHandle>, QuizError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_counts_frames_not_samples() {
        let buffer = ClipBuffer::new(2, 4, vec![0.0; 16]);
        assert_eq!(buffer.frames(), 8);
        assert_eq!(buffer.duration(), Duration::from_secs(2));
    }

    #[test]
    fn validate_rejects_malformed_buffers() {
        assert!(ClipBuffer::new(0, 44_100, vec![0.0; 4]).validate().is_err());
        assert!(ClipBuffer::new(1, 0, vec![0.0; 4]).validate().is_err());
        assert!(ClipBuffer::new(2, 44_100, Vec::new()).validate().is_err());
        assert!(ClipBuffer::new(1, 44_100, vec![0.1; 4]).validate().is_ok());
    }
}
