//! Sample format conversion helpers for clip decoding.

use symphonia::core::audio::{AudioBufferRef, Signal};

/// Convert a signed 24-bit sample stored in an `i32` to `f32`.
pub fn convert_signed_24bit_to_f32(sample: i32) -> f32 {
    // The 24-bit sample lives in the least significant bits of the i32.
    let shifted_sample = sample << 8 >> 8;
    shifted_sample as f32 / 2f32.powi(23)
}

/// Convert an unsigned 24-bit sample stored in a `u32` to `f32`.
pub fn convert_unsigned_24bit_to_f32(sample: u32) -> f32 {
    (sample as f32 - 2f32.powi(23)) / 2f32.powi(23)
}

pub fn convert_signed_16bit_to_f32(sample: i16) -> f32 {
    sample as f32 / 2f32.powi(15)
}

pub fn convert_unsigned_16bit_to_f32(sample: u16) -> f32 {
    (sample as f32 - 2f32.powi(15)) / 2f32.powi(15)
}

pub fn convert_signed_32bit_to_f32(sample: i32) -> f32 {
    (sample as f64 / 2f64.powi(31)) as f32
}

pub fn convert_unsigned_32bit_to_f32(sample: u32) -> f32 {
    ((sample as f64 - 2f64.powi(31)) / 2f64.powi(31)) as f32
}

pub fn convert_signed_8bit_to_f32(sample: i8) -> f32 {
    sample as f32 / 128.0
}

pub fn convert_unsigned_8bit_to_f32(sample: u8) -> f32 {
    (sample as f32 - 128.0) / 128.0
}

/// Extract samples for a single channel from a decoded packet.
pub fn process_channel(decoded: &AudioBufferRef<'_>, channel: usize) -> Vec<f32> {
    match decoded {
        AudioBufferRef::U8(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_unsigned_8bit_to_f32(*s))
            .collect(),
        AudioBufferRef::S8(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_signed_8bit_to_f32(*s))
            .collect(),
        AudioBufferRef::U16(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_unsigned_16bit_to_f32(*s))
            .collect(),
        AudioBufferRef::S16(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_signed_16bit_to_f32(*s))
            .collect(),
        AudioBufferRef::U24(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_unsigned_24bit_to_f32(s.0))
            .collect(),
        AudioBufferRef::S24(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_signed_24bit_to_f32(s.0))
            .collect(),
        AudioBufferRef::U32(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_unsigned_32bit_to_f32(*s))
            .collect(),
        AudioBufferRef::S32(buf) => buf
            .chan(channel)
            .iter()
            .map(|s| convert_signed_32bit_to_f32(*s))
            .collect(),
        AudioBufferRef::F32(buf) => buf.chan(channel).to_vec(),
        AudioBufferRef::F64(buf) => buf.chan(channel).iter().map(|s| *s as f32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_formats_map_to_unit_range() {
        assert_eq!(convert_signed_16bit_to_f32(i16::MIN), -1.0);
        assert_eq!(convert_unsigned_16bit_to_f32(0), -1.0);
        assert_eq!(convert_unsigned_16bit_to_f32(32768), 0.0);
        assert_eq!(convert_unsigned_8bit_to_f32(128), 0.0);
        assert_eq!(convert_signed_8bit_to_f32(-128), -1.0);
        assert!((convert_signed_32bit_to_f32(i32::MAX) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn signed_24bit_sign_extends() {
        // 0xFFFFFF is -1 in 24-bit two's complement.
        let value = convert_signed_24bit_to_f32(0x00FF_FFFF);
        assert!(value < 0.0);
        assert!(value > -1e-6);
    }
}
