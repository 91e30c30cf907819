//! Packed audio and video attributes of a VOB format.
//!
//! Codes this decoder has not seen are kept as `Unknown(raw)` so the caller can
//! report them and carry on; only values that make the stream uninterpretable
//! (TV system, channel count) fail the decode.

use std::fmt::{Display, Formatter};

use crate::utils::errors::{AttributeError, DecodeWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Mpeg1,
    Mpeg2,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvSystem {
    Ntsc,
    Pal,
}

impl TvSystem {
    pub fn lines(&self) -> u16 {
        match self {
            TvSystem::Ntsc => 480,
            TvSystem::Pal => 576,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    R4_3,
    R16_9,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Known { width: u16, height: u16 },
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoAttributes {
    pub compression: Compression,
    pub tv_system: TvSystem,
    pub aspect: AspectRatio,
    pub resolution: Resolution,
}

impl VideoAttributes {
    /// Decodes the 16-bit video attribute word.
    pub fn decode(raw: u16) -> Result<Self, AttributeError> {
        let compression = ((raw >> 14) & 0x3) as u8;
        let tv_system = ((raw >> 12) & 0x3) as u8;
        let aspect = ((raw >> 10) & 0x3) as u8;
        let resolution = ((raw >> 3) & 0x7) as u8;

        let tv_system = match tv_system {
            0 => TvSystem::Ntsc,
            1 => TvSystem::Pal,
            _ => return Err(AttributeError::InvalidTvSystem { tv_system, raw }),
        };

        let resolution = decode_resolution(resolution, tv_system.lines());

        Ok(Self {
            compression: match compression {
                0 => Compression::Mpeg1,
                1 => Compression::Mpeg2,
                _ => Compression::Unknown(compression),
            },
            tv_system,
            aspect: match aspect {
                0 => AspectRatio::R4_3,
                1 => AspectRatio::R16_9,
                _ => AspectRatio::Unknown(aspect),
            },
            resolution,
        })
    }

    pub fn warnings(&self) -> Vec<DecodeWarning> {
        let mut warnings = Vec::new();
        if let Compression::Unknown(v) = self.compression {
            warnings.push(DecodeWarning::UnknownCompression(v));
        }
        if let AspectRatio::Unknown(v) = self.aspect {
            warnings.push(DecodeWarning::UnknownAspect(v));
        }
        if let Resolution::Unknown(v) = self.resolution {
            warnings.push(DecodeWarning::UnknownResolution(v));
        }
        warnings
    }
}

/// Code 3 is half D1: 352 wide at half the line count.
fn decode_resolution(code: u8, lines: u16) -> Resolution {
    let width = match code {
        0 => 720,
        1 => 704,
        2 | 3 => 352,
        4 => 544,
        5 => 480,
        _ => return Resolution::Unknown(code),
    };
    let height = if code == 3 { lines / 2 } else { lines };

    Resolution::Known { width, height }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCoding {
    Ac3,
    Mpeg1,
    Mpeg2Ext,
    Lpcm,
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioAttributes {
    pub coding: AudioCoding,
    pub channels: u8,
}

impl AudioAttributes {
    /// Raw channel value written by at least one camcorder for stereo tracks
    /// that are flagged mono.
    pub const STEREO_QUIRK: u8 = 9;

    /// Decodes a 3-byte audio attribute triple.
    pub fn decode(raw: [u8; 3]) -> Result<Self, AttributeError> {
        let coding = raw[0] >> 5;
        let channels = raw[1] & 0x0F;

        let channels = match channels {
            Self::STEREO_QUIRK => 2,
            0..=7 => channels + 1,
            _ => return Err(AttributeError::InvalidChannelCount(channels)),
        };

        Ok(Self {
            coding: match coding {
                0 => AudioCoding::Ac3,
                2 => AudioCoding::Mpeg1,
                3 => AudioCoding::Mpeg2Ext,
                4 => AudioCoding::Lpcm,
                _ => AudioCoding::Unknown(coding),
            },
            channels,
        })
    }

    pub fn warnings(&self) -> Vec<DecodeWarning> {
        match self.coding {
            AudioCoding::Unknown(v) => vec![DecodeWarning::UnknownAudioCoding(v)],
            _ => Vec::new(),
        }
    }
}

/// Flags word at the start of a program descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramFlags(pub u16);

impl ProgramFlags {
    /// Bit 7: a 12-byte adjacent VOB record precedes the VOBU map.
    pub fn has_adjacent_vob(&self) -> bool {
        self.0 & 0x0080 != 0
    }
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::Mpeg1 => f.write_str("MPEG1"),
            Compression::Mpeg2 => f.write_str("MPEG2"),
            Compression::Unknown(v) => write!(f, "Unknown({v})"),
        }
    }
}

impl Display for TvSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TvSystem::Ntsc => f.write_str("NTSC"),
            TvSystem::Pal => f.write_str("PAL"),
        }
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AspectRatio::R4_3 => f.write_str("4:3"),
            AspectRatio::R16_9 => f.write_str("16:9"),
            AspectRatio::Unknown(v) => write!(f, "Unknown({v})"),
        }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Known { width, height } => write!(f, "{width}x{height}"),
            Resolution::Unknown(v) => write!(f, "Unknown({v})"),
        }
    }
}

impl Display for AudioCoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioCoding::Ac3 => f.write_str("Dolby AC-3"),
            AudioCoding::Mpeg1 => f.write_str("MPEG-1"),
            AudioCoding::Mpeg2Ext => f.write_str("MPEG-2ext"),
            AudioCoding::Lpcm => f.write_str("Linear PCM"),
            AudioCoding::Unknown(v) => write!(f, "Unknown({v})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_mpeg2_full_d1() {
        let video = VideoAttributes::decode(0x4000).unwrap();
        assert_eq!(video.compression, Compression::Mpeg2);
        assert_eq!(video.tv_system, TvSystem::Ntsc);
        assert_eq!(video.aspect, AspectRatio::R4_3);
        assert_eq!(video.resolution.to_string(), "720x480");
        assert!(video.warnings().is_empty());
    }

    #[test]
    fn pal_half_d1_halves_height() {
        // PAL, 16:9, resolution code 3
        let raw = 0x4000 | 1 << 12 | 1 << 10 | 3 << 3;
        let video = VideoAttributes::decode(raw).unwrap();
        assert_eq!(video.tv_system, TvSystem::Pal);
        assert_eq!(video.aspect, AspectRatio::R16_9);
        assert_eq!(video.resolution.to_string(), "352x288");
    }

    #[test]
    fn unknown_codes_are_reported_not_fatal() {
        let raw = 3 << 14 | 2 << 10 | 7 << 3;
        let video = VideoAttributes::decode(raw).unwrap();
        assert_eq!(
            video.warnings(),
            vec![
                DecodeWarning::UnknownCompression(3),
                DecodeWarning::UnknownAspect(2),
                DecodeWarning::UnknownResolution(7),
            ]
        );
    }

    #[test]
    fn invalid_tv_system_fails() {
        assert_eq!(
            VideoAttributes::decode(2 << 12),
            Err(AttributeError::InvalidTvSystem {
                tv_system: 2,
                raw: 0x2000
            })
        );
    }

    #[test]
    fn audio_channels() {
        let ac3 = AudioAttributes::decode([0x00, 0x01, 0x00]).unwrap();
        assert_eq!(ac3.coding, AudioCoding::Ac3);
        assert_eq!(ac3.channels, 2);

        let lpcm = AudioAttributes::decode([4 << 5, 0xF5, 0x07]).unwrap();
        assert_eq!(lpcm.coding, AudioCoding::Lpcm);
        assert_eq!(lpcm.channels, 6);

        let quirk = AudioAttributes::decode([0x00, 0x09, 0x00]).unwrap();
        assert_eq!(quirk.channels, 2);

        assert_eq!(
            AudioAttributes::decode([0x00, 0x08, 0x00]),
            Err(AttributeError::InvalidChannelCount(8))
        );
        assert_eq!(
            AudioAttributes::decode([0x00, 0x0A, 0x00]),
            Err(AttributeError::InvalidChannelCount(10))
        );
    }

    #[test]
    fn unknown_audio_coding_warns() {
        let audio = AudioAttributes::decode([1 << 5, 0x01, 0x00]).unwrap();
        assert_eq!(audio.coding, AudioCoding::Unknown(1));
        let warnings = audio.warnings();
        assert_eq!(warnings, [DecodeWarning::UnknownAudioCoding(1)]);
    }

    #[test]
    fn adjacent_vob_flag_is_bit_7() {
        assert!(ProgramFlags(0x0080).has_adjacent_vob());
        assert!(!ProgramFlags(0x8000).has_adjacent_vob());
        assert!(!ProgramFlags(0x007F).has_adjacent_vob());
    }
}
