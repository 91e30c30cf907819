//! Disc text encodings.
//!
//! The root descriptor declares one encoding for all free text on the disc.
//! Decoding never fails: a label that cannot be decoded cleanly is still
//! rendered, with replacement characters.

use std::fmt::{Display, Formatter};

use encoding_rs::{Encoding, SHIFT_JIS, WINDOWS_1252};
use log::debug;

use crate::utils::errors::DecodeWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    /// ISO 646 Japanese variant: ASCII with yen and overline.
    Iso646Jp,
    /// JIS X 0201 Roman, same repertoire as ISO646-JP.
    JisRoman,
    Iso8859_1,
    ShiftJis,
    /// Undocumented selector; decoded as windows-1252.
    Unknown(u8),
}

impl TextEncoding {
    pub fn from_selector(selector: u8) -> Self {
        match selector {
            0x00 => Self::Ascii,
            0x01 => Self::Iso646Jp,
            0x10 => Self::JisRoman,
            0x11 => Self::Iso8859_1,
            0x12 => Self::ShiftJis,
            _ => Self::Unknown(selector),
        }
    }

    pub fn warning(&self) -> Option<DecodeWarning> {
        match self {
            Self::Unknown(v) => Some(DecodeWarning::UnknownTextEncoding(*v)),
            _ => None,
        }
    }

    /// Decodes a fixed-width text field.
    ///
    /// The field ends at the first NUL or at its width, whichever comes first.
    /// Trailing padding spaces are dropped.
    pub fn decode(&self, raw: &[u8]) -> String {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let raw = &raw[..end];

        let text: String = match self {
            Self::Ascii => raw.iter().map(|&b| ascii_char(b)).collect(),
            Self::Iso646Jp | Self::JisRoman => raw
                .iter()
                .map(|&b| match b {
                    0x5C => '\u{00A5}',
                    0x7E => '\u{203E}',
                    _ => ascii_char(b),
                })
                .collect(),
            // windows-1252 is a superset of the printable ISO-8859-1 range
            Self::Iso8859_1 | Self::Unknown(_) => decode_with(WINDOWS_1252, raw),
            Self::ShiftJis => decode_with(SHIFT_JIS, raw),
        };

        text.trim_end_matches(' ').to_string()
    }
}

fn ascii_char(b: u8) -> char {
    if b.is_ascii() {
        b as char
    } else {
        char::REPLACEMENT_CHARACTER
    }
}

fn decode_with(encoding: &'static Encoding, raw: &[u8]) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(raw);
    if had_errors {
        debug!("Lossy {} decode of {:02X?}", encoding.name(), raw);
    }
    text.into_owned()
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascii => f.write_str("ASCII"),
            Self::Iso646Jp => f.write_str("ISO646-JP"),
            Self::JisRoman => f.write_str("JIS_C6220-1969-RO"),
            Self::Iso8859_1 => f.write_str("ISO-8859-1"),
            Self::ShiftJis => f.write_str("SHIFT_JIS"),
            Self::Unknown(v) => write!(f, "Unknown({v:#04X})"),
        }
    }
}
