/// Logs a recoverable anomaly, or returns it as an error when its level is
/// within the state's `fail_level` (a `log::LevelFilter`).
#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err.into());
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid DVD-VR IFO identifier. Read {0:?}, expected \"DVD_RTR_VMG0\"")]
    BadMagic(String),

    #[error("Read of {width} bytes at offset {offset:#X} exceeds buffer length {len:#X}")]
    Truncated {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("Couldn't find an info table for the VRO")]
    NoInfoTables,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressingError {
    #[error("{table} address {address:#X} lies outside the loaded IFO ({len:#X} bytes)")]
    OutOfBounds {
        table: &'static str,
        address: u64,
        len: usize,
    },

    #[error("Program {index} out of range (1..={count})")]
    ProgramOutOfRange { index: usize, count: usize },
}

/// Attribute fields that could not be decoded at all.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("Error parsing video_attr: invalid tv_system {tv_system}. Raw {raw:#06X}")]
    InvalidTvSystem { tv_system: u8, raw: u16 },

    #[error("Error parsing audio_attr: invalid channel count value {0}")]
    InvalidChannelCount(u8),
}

/// Unrecognized codes. A safe default is substituted and processing continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    #[error("Unknown video compression [{0}]. Please report.")]
    UnknownCompression(u8),

    #[error("Unknown aspect ratio [{0}]. Please report.")]
    UnknownAspect(u8),

    #[error("Unknown video resolution [{0}]. Please report.")]
    UnknownResolution(u8),

    #[error("Unknown audio coding [{0}]. Please report.")]
    UnknownAudioCoding(u8),

    #[error("Unknown text encoding [{0:#04X}]. Please report. Falling back to windows-1252")]
    UnknownTextEncoding(u8),

    #[error("Only processing 1 of the {0} VRO info tables")]
    ExtraInfoTables(u8),

    #[error("Program {program} uses VOB format {id}, but only {count} are declared")]
    MissingVobFormat {
        program: usize,
        id: u8,
        count: usize,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("Error seeking within VRO to {offset:#X}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing VOBU {unit} to destination: {source}")]
    Write {
        unit: usize,
        #[source]
        source: std::io::Error,
    },
}
