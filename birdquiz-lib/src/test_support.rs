//! Fakes and fixtures shared by the unit tests of both crates.
//!
//! Available to other crates through the `test-support` feature.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io::Cursor;
use std::rc::Rc;

use crate::audio::{AudioOutput, ClipBuffer, PlaybackHandle};
use crate::clip::{ClipFetcher, ClipInfo, SoundClip};
use crate::error::QuizError;
use crate::species::Species;

/// Render a quiet 16-bit sine tone as WAV bytes.
pub fn wav_bytes(channels: u16, sample_rate: u32, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        let frames = (sample_rate as f32 * seconds) as u32;
        for frame in 0..frames {
            let t = frame as f32 / sample_rate as f32;
            let value = ((t * 440.0 * std::f32::consts::TAU).sin() * 3000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(value).expect("write sample");
            }
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

pub fn clip_info(id: &str, download_url: &str) -> ClipInfo {
    ClipInfo {
        id: format!("XC{}", id),
        url: format!("https://xeno-canto.org/{}", id),
        download_url: download_url.to_string(),
        recordist: "Test Recordist".to_string(),
        country: "Finland".to_string(),
        location: "Helsinki".to_string(),
        sound_type: "song".to_string(),
        license: Some("CC BY-NC-SA 4.0".to_string()),
    }
}

/// Build a species whose clips download from `urls`.
pub fn species(primary: &str, scientific: &str, popularity: u32, urls: &[&str]) -> Species {
    let clips = urls
        .iter()
        .enumerate()
        .map(|(index, url)| SoundClip::new(clip_info(&index.to_string(), url)))
        .collect();
    Species::new(primary, &format!("{} (en)", primary), scientific, popularity, clips)
        .expect("species fixture")
}

/// Species ranked by position: the first entry is the most popular.
pub fn ranked_species(count: usize) -> Vec<Species> {
    (0..count)
        .map(|index| {
            species(
                &format!("bird {:03}", index),
                &format!("avis number{}", index),
                (count - index) as u32,
                &["https://example.org/ok"],
            )
        })
        .collect()
}

/// Serves the same bytes for every URL except the ones marked as failing.
pub struct FakeFetcher {
    bytes: Vec<u8>,
    failing: HashSet<String>,
    calls: Cell<usize>,
    requested: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            failing: HashSet::new(),
            calls: Cell::new(0),
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn serving_seconds(seconds: f32) -> Self {
        Self::serving_bytes(wav_bytes(1, 8_000, seconds))
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ClipFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuizError> {
        self.calls.set(self.calls.get() + 1);
        self.requested.borrow_mut().push(url.to_string());
        if self.failing.contains(url) {
            return Err(QuizError::Download {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.bytes.clone())
    }
}

/// Output that records how many playbacks were started and are still live.
#[derive(Default, Clone)]
pub struct FakeOutput {
    started: Rc<Cell<usize>>,
    active: Rc<Cell<usize>>,
    failures_left: Rc<Cell<usize>>,
}

impl FakeOutput {
    /// Reject the next `count` start requests.
    pub fn failing_starts(count: usize) -> Self {
        let output = Self::default();
        output.failures_left.set(count);
        output
    }

    pub fn started(&self) -> usize {
        self.started.get()
    }

    pub fn active(&self) -> usize {
        self.active.get()
    }
}

impl AudioOutput for FakeOutput {
    fn start(&mut self, _buffer: &ClipBuffer) -> Result<Box<dyn PlaybackHandle>, QuizError> {
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(QuizError::Playback("device rejected stream".to_string()));
        }
        self.started.set(self.started.get() + 1);
        self.active.set(self.active.get() + 1);
        Ok(Box::new(FakePlayback {
            active: self.active.clone(),
            stopped: false,
        }))
    }
}

struct FakePlayback {
    active: Rc<Cell<usize>>,
    stopped: bool,
}

impl PlaybackHandle for FakePlayback {
    fn is_playing(&self) -> bool {
        !self.stopped
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.active.set(self.active.get() - 1);
        }
    }
}
