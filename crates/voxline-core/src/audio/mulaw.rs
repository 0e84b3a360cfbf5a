//! G.711 µ-law encoding of 16-bit linear PCM
//!
//! Encode-only. Each little-endian `i16` sample becomes one companded byte,
//! so output is half the input length. A trailing odd byte is dropped.

/// Added to the magnitude before segment search
const BIAS: i32 = 0x84;

/// Largest biased magnitude
const CLIP: i32 = 32767;

/// µ-law byte for digital silence
pub const MULAW_SILENCE: u8 = 0xFF;

/// Encode one linear sample
pub fn encode_sample(sample: i16) -> u8 {
    let sample = i32::from(sample).clamp(-32768, 32767);

    let sign: u8 = if sample < 0 { 0x80 } else { 0 };
    let magnitude = (sample.abs() + BIAS).min(CLIP);

    // Segment is the highest set bit above bit 7; biased magnitude is always >= 0x84
    let exponent = (7..=14)
        .rev()
        .find(|&bit| magnitude >= 1 << bit)
        .map(|bit| bit - 7)
        .unwrap_or(0);
    let mantissa = (magnitude >> (exponent + 3)) & 0x0F;

    !(sign | ((exponent as u8) << 4) | mantissa as u8)
}

/// Encode a little-endian s16 byte stream
pub fn encode(pcm: &[u8]) -> Vec<u8> {
    pcm.chunks_exact(2)
        .map(|pair| encode_sample(i16::from_le_bytes([pair[0], pair[1]])))
        .collect()
}

/// Encode samples that are already decoded
pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| encode_sample(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_reference_vectors() {
        // Values from the ITU-T G.711 µ-law table
        assert_eq!(encode_sample(0), 0xFF);
        assert_eq!(encode_sample(-1), 0x7F);
        assert_eq!(encode_sample(32767), 0x80);
        assert_eq!(encode_sample(-32768), 0x00);
        assert_eq!(encode_sample(1000), 0xCE);
        assert_eq!(encode_sample(-1000), 0x4E);
        assert_eq!(encode_sample(100), 0xF2);
        assert_eq!(encode_sample(-100), 0x72);
    }

    #[test]
    fn test_silence_encodes_to_silence_byte() {
        assert_eq!(encode(&[0x00, 0x00, 0x00, 0x00]), vec![MULAW_SILENCE; 2]);
    }

    #[test]
    fn test_negative_full_scale_clears_sign_bit() {
        assert_eq!(encode_sample(i16::MIN) & 0x80, 0);
        assert_eq!(encode_sample(-30000) & 0x80, 0);
        assert_eq!(encode_sample(30000) & 0x80, 0x80);
    }

    #[test]
    fn test_magnitudes_near_clip_saturate() {
        assert_eq!(encode_sample(32700), 0x80);
        assert_eq!(encode_sample(32635), 0x80);
        assert_eq!(encode_sample(-32700), 0x00);
    }

    #[test]
    fn test_reads_little_endian() {
        // 1000 = 0x03E8
        assert_eq!(encode(&[0xE8, 0x03]), vec![0xCE]);
    }

    #[test]
    fn test_trailing_odd_byte_is_dropped() {
        let mut pcm = pcm_bytes(&[1000, -1000]);
        pcm.push(0x7F);
        assert_eq!(encode(&pcm), vec![0xCE, 0x4E]);
        assert!(encode(&[0x12]).is_empty());
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_encode_matches_encode_samples() {
        let samples = [0, 1, -1, 255, -256, 4096, -4096, 32767, -32768];
        assert_eq!(encode(&pcm_bytes(&samples)), encode_samples(&samples));
    }

    proptest! {
        #[test]
        fn output_is_half_the_input(pcm in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(encode(&pcm).len(), pcm.len() / 2);
        }

        #[test]
        fn complement_is_an_involution(sample in any::<i16>()) {
            let byte = encode_sample(sample);
            prop_assert_eq!(!!byte, byte);
        }

        #[test]
        fn code_grows_with_magnitude(a in 0i16..=i16::MAX, b in 0i16..=i16::MAX) {
            // For non-negative input the uncomplemented code is monotonic
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(!encode_sample(lo) <= !encode_sample(hi));
        }

        #[test]
        fn sign_is_symmetric(sample in 1i16..=i16::MAX) {
            prop_assert_eq!(encode_sample(sample) ^ 0x80, encode_sample(-sample));
        }
    }
}
