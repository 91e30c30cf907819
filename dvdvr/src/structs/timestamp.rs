//! Packed recording time of a program
//!
//! Five bytes of bit-packed calendar fields, no BCD:
//! year (14 bits), month (4), day (5), hour (5), minute (6), second (6).

use std::fmt::{Display, Formatter};

use anyhow::{Result, ensure};
use chrono::{NaiveDate, NaiveDateTime};
use log::trace;

use crate::utils::bitstream_io::BsIoSliceReader;

/// Size of the packed timestamp in bytes.
pub const PACKED_LEN: usize = 5;

/// Calendar time at which a program was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Display for RecordingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl RecordingTime {
    /// Decodes a packed timestamp.
    ///
    /// A zero year means the recorder never set the time; that decodes to
    /// `None` rather than to year 0.
    pub fn from_bytes(buffer: &[u8]) -> Result<Option<Self>> {
        ensure!(
            buffer.len() >= PACKED_LEN,
            "Insufficient data for parsing RecordingTime"
        );

        let reader = &mut BsIoSliceReader::from_slice(&buffer[..PACKED_LEN]);
        let time = Self {
            year: reader.get_n(14)?,
            month: reader.get_n(4)?,
            day: reader.get_n(5)?,
            hour: reader.get_n(5)?,
            minute: reader.get_n(6)?,
            second: reader.get_n(6)?,
        };

        if time.year == 0 {
            trace!("Recording time not set");
            return Ok(None);
        }

        trace!("Recording time: {time}");

        Ok(Some(time))
    }

    /// Packs the time back into its 5-byte on-disc form.
    pub fn to_bytes(&self) -> [u8; PACKED_LEN] {
        let packed = (self.year as u64 & 0x3FFF) << 26
            | (self.month as u64 & 0x0F) << 22
            | (self.day as u64 & 0x1F) << 17
            | (self.hour as u64 & 0x1F) << 12
            | (self.minute as u64 & 0x3F) << 6
            | (self.second as u64 & 0x3F);

        let bytes = packed.to_be_bytes();
        [bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]
    }

    /// Converts to a calendar date-time, or `None` if the fields do not form
    /// a valid date (month 13, hour 25 and the like).
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let year = self.year as i32;
        let (h, m, s) = (self.hour.into(), self.minute.into(), self.second.into());

        NaiveDate::from_ymd_opt(year, self.month.into(), self.day.into())?
            .and_hms_opt(h, m, s)
    }
}
