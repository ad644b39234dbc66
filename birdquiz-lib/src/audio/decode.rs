//! Symphonia helpers for decoding downloaded clips.

use std::io::{Cursor, ErrorKind};
use std::time::Duration;

use log::warn;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::{Error, Result};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::convert::process_channel;
use super::ClipBuffer;

/// Decode in-memory audio bytes into an interleaved buffer.
///
/// Decoding stops once `max_duration` worth of frames has been collected, so
/// long recordings are never decoded in full.
pub fn decode_clip(bytes: Vec<u8>, max_duration: Duration) -> Result<ClipBuffer> {
    let mut format = get_reader(bytes)?;
    let (track_id, mut decoder) = get_decoder(&format)?;

    let mut samples: Vec<f32> = Vec::new();
    let mut channels = 0usize;
    let mut sample_rate = 0u32;
    let mut frames = 0usize;
    let mut max_frames = usize::MAX;

    let result: Result<()> = loop {
        if frames >= max_frames {
            break Ok(());
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break Ok(()),
            Err(err) => break Err(err),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                if channels == 0 {
                    channels = spec.channels.count();
                    sample_rate = spec.rate;
                    max_frames = (max_duration.as_secs_f64() * sample_rate as f64) as usize;
                }

                let per_channel: Vec<Vec<f32>> = (0..channels)
                    .map(|channel| process_channel(&decoded, channel))
                    .collect();
                let available = per_channel
                    .iter()
                    .map(Vec::len)
                    .min()
                    .unwrap_or(0)
                    .min(max_frames - frames);

                for frame in 0..available {
                    for channel in &per_channel {
                        samples.push(channel[frame]);
                    }
                }
                frames += available;
            }
            Err(Error::DecodeError(err)) => {
                // Decode errors are not fatal; skip the packet.
                warn!("decode error: {}", err);
            }
            Err(err) => break Err(err),
        }
    };
    result?;

    if channels == 0 || frames == 0 {
        return Err(Error::DecodeError("no audio frames decoded"));
    }

    Ok(ClipBuffer::new(channels as u16, sample_rate, samples))
}

/// Probe the bytes and return the container reader.
fn get_reader(bytes: Vec<u8>) -> Result<Box<dyn FormatReader>> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    // Download URLs carry no usable extension, so probe on content only.
    let hint = Hint::new();
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;

    Ok(probed.format)
}

/// Build a decoder for the first decodable track in a `FormatReader`.
fn get_decoder(format: &Box<dyn FormatReader>) -> Result<(u32, Box<dyn Decoder>)> {
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(Error::Unsupported("no supported audio tracks"))?;

    let dec_opts: DecoderOptions = Default::default();
    let decoder = symphonia::default::get_codecs().make(&track.codec_params, &dec_opts)?;

    Ok((track.id, decoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wav_bytes;

    #[test]
    fn decodes_wav_bytes() {
        let bytes = wav_bytes(2, 8_000, 0.5);
        let buffer = decode_clip(bytes, Duration::from_secs(15)).expect("decode wav");
        assert_eq!(buffer.channels, 2);
        assert_eq!(buffer.sample_rate, 8_000);
        assert_eq!(buffer.frames(), 4_000);
    }

    #[test]
    fn truncates_to_window() {
        let bytes = wav_bytes(1, 8_000, 3.0);
        let buffer = decode_clip(bytes, Duration::from_secs(1)).expect("decode wav");
        assert_eq!(buffer.frames(), 8_000);
        assert_eq!(buffer.duration(), Duration::from_secs(1));
    }

    #[test]
    fn rejects_garbage() {
        let result = decode_clip(b"definitely not audio".to_vec(), Duration::from_secs(15));
        assert!(result.is_err());
    }
}
