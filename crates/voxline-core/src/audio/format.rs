//! Container sniffing from leading bytes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-effort classification of an audio buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioFormatTag {
    /// ID3v2-tagged or bare MPEG audio
    Mp3,
    /// RIFF container
    Wav,
    /// No recognizable header; assumed s16le samples
    RawPcm,
    /// Too short to inspect
    Unknown,
}

impl AudioFormatTag {
    /// Scratch file extension handed to the resampler
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormatTag::Mp3 => "mp3",
            AudioFormatTag::Wav => "wav",
            AudioFormatTag::RawPcm | AudioFormatTag::Unknown => "pcm",
        }
    }

    /// Whether the buffer carries no sample rate or channel layout of its own
    pub fn is_containerless(&self) -> bool {
        matches!(self, AudioFormatTag::RawPcm | AudioFormatTag::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormatTag::Mp3 => "mp3",
            AudioFormatTag::Wav => "wav",
            AudioFormatTag::RawPcm => "raw-pcm",
            AudioFormatTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AudioFormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a buffer by its magic number. First match wins.
pub fn classify(buffer: &[u8]) -> AudioFormatTag {
    if buffer.len() < 4 {
        return AudioFormatTag::Unknown;
    }

    match buffer {
        [0x49, 0x44, 0x33, ..] => AudioFormatTag::Mp3,
        [0xFF, b1, ..] if *b1 & 0xE0 == 0xE0 => AudioFormatTag::Mp3,
        [0x52, 0x49, 0x46, 0x46, ..] => AudioFormatTag::Wav,
        _ => AudioFormatTag::RawPcm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_id3_tag_is_mp3() {
        assert_eq!(classify(&[0x49, 0x44, 0x33, 0x03, 0x00]), AudioFormatTag::Mp3);
    }

    #[test]
    fn test_frame_sync_is_mp3() {
        assert_eq!(classify(&[0xFF, 0xFB, 0x90, 0x64]), AudioFormatTag::Mp3);
        assert_eq!(classify(&[0xFF, 0xE0, 0x00, 0x00]), AudioFormatTag::Mp3);
    }

    #[test]
    fn test_partial_frame_sync_is_raw() {
        // Only two of the three sync bits in byte 1
        assert_eq!(classify(&[0xFF, 0xC0, 0x00, 0x00]), AudioFormatTag::RawPcm);
    }

    #[test]
    fn test_riff_is_wav() {
        assert_eq!(
            classify(&[0x52, 0x49, 0x46, 0x46, 0x24, 0x00]),
            AudioFormatTag::Wav
        );
    }

    #[test]
    fn test_short_buffer_is_unknown() {
        assert_eq!(classify(&[0x00, 0x01, 0x02]), AudioFormatTag::Unknown);
        assert_eq!(classify(b"ID3"), AudioFormatTag::Unknown);
        assert_eq!(classify(&[]), AudioFormatTag::Unknown);
    }

    #[test]
    fn test_headerless_is_raw_pcm() {
        assert_eq!(classify(&[0x10, 0x20, 0x30, 0x40]), AudioFormatTag::RawPcm);
    }

    #[test]
    fn test_extensions_and_names() {
        assert_eq!(AudioFormatTag::Mp3.extension(), "mp3");
        assert_eq!(AudioFormatTag::Wav.extension(), "wav");
        assert_eq!(AudioFormatTag::RawPcm.extension(), "pcm");
        assert_eq!(AudioFormatTag::Unknown.extension(), "pcm");
        assert_eq!(AudioFormatTag::RawPcm.to_string(), "raw-pcm");
        assert_eq!(
            serde_json::to_string(&AudioFormatTag::RawPcm).unwrap(),
            "\"raw-pcm\""
        );
        assert!(AudioFormatTag::Unknown.is_containerless());
        assert!(!AudioFormatTag::Wav.is_containerless());
    }

    proptest! {
        #[test]
        fn classification_depends_only_on_first_four_bytes(
            head in proptest::collection::vec(any::<u8>(), 4),
            tail_a in proptest::collection::vec(any::<u8>(), 0..64),
            tail_b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let a: Vec<u8> = head.iter().chain(tail_a.iter()).copied().collect();
            let b: Vec<u8> = head.iter().chain(tail_b.iter()).copied().collect();
            prop_assert_eq!(classify(&a), classify(&b));
        }

        #[test]
        fn short_buffers_are_always_unknown(buf in proptest::collection::vec(any::<u8>(), 0..4)) {
            prop_assert_eq!(classify(&buf), AudioFormatTag::Unknown);
        }
    }
}
