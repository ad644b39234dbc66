//! A single downloadable bird recording.

pub mod fetch;

use std::time::Duration;

use log::debug;
use serde::Serialize;

use crate::audio::{decode_clip, AudioOutput, ClipBuffer, PlaybackHandle};
use crate::error::QuizError;

pub use fetch::{ClipFetcher, HttpFetcher};

/// Only the start of each recording is kept for playback.
pub const CLIP_WINDOW: Duration = Duration::from_secs(15);

/// Attribution and location metadata for a recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipInfo {
    /// Catalog id, e.g. `XC123456`.
    pub id: String,
    pub url: String,
    pub download_url: String,
    pub recordist: String,
    pub country: String,
    pub location: String,
    pub sound_type: String,
    pub license: Option<String>,
}

/// A recording plus its lazily decoded audio and live playback.
pub struct SoundClip {
    info: ClipInfo,
    buffer: Option<ClipBuffer>,
    playback: Option<Box<dyn PlaybackHandle>>,
}

impl SoundClip {
    pub fn new(info: ClipInfo) -> Self {
        Self {
            info,
            buffer: None,
            playback: None,
        }
    }

    pub fn info(&self) -> &ClipInfo {
        &self.info
    }

    pub fn buffer(&self) -> Option<&ClipBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_fetched(&self) -> bool {
        self.buffer.is_some()
    }

    /// Download and decode the recording, keeping the first [`CLIP_WINDOW`].
    ///
    /// A clip that already holds a buffer is not downloaded again.
    pub fn fetch(&mut self, fetcher: &dyn ClipFetcher) -> Result<(), QuizError> {
        if self.buffer.is_some() {
            return Ok(());
        }

        let bytes = fetcher.fetch(&self.info.download_url)?;
        let buffer = decode_clip(bytes, CLIP_WINDOW).map_err(|err| QuizError::Download {
            url: self.info.download_url.clone(),
            reason: err.to_string(),
        })?;

        debug!(
            "{} decoded: {} channel(s), {} Hz, {:.1}s",
            self.info.id,
            buffer.channels,
            buffer.sample_rate,
            buffer.duration().as_secs_f32()
        );
        self.buffer = Some(buffer);
        Ok(())
    }

    /// Start playback from the beginning, replacing any earlier playback.
    pub fn play(&mut self, output: &mut dyn AudioOutput) -> Result<(), QuizError> {
        self.stop();

        let buffer = self.buffer.as_ref().ok_or_else(|| {
            QuizError::Playback(format!("{} has not been downloaded", self.info.id))
        })?;
        buffer.validate()?;
        self.playback = Some(output.start(buffer)?);
        Ok(())
    }

    /// Halt playback and release the handle. No-op when nothing is playing.
    pub fn stop(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .map(|playback| playback.is_playing())
            .unwrap_or(false)
    }

    pub fn has_playback(&self) -> bool {
        self.playback.is_some()
    }
}

impl Drop for SoundClip {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SoundClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundClip")
            .field("info", &self.info)
            .field("fetched", &self.buffer.is_some())
            .field("playing", &self.is_playing())
            .finish()
    }
}
