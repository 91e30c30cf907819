//! Root descriptor of the navigation file (RTR_VMGI).

use std::fmt::{Display, Formatter};

use anyhow::{Result, bail};
use log::trace;

use crate::utils::bytes::ByteView;
use crate::utils::errors::FormatError;

/// Identifier at the start of every DVD-VR IFO.
pub const MAGIC: &[u8; 12] = b"DVD_RTR_VMG0";

/// Size of the root descriptor, excluding anything that follows it.
pub const ROOT_SIZE: usize = 512;

/// Length of each free-text disc label field.
pub const DISC_LABEL_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct RootDescriptor {
    /// End address of the navigation data, inclusive.
    pub end_address: u32,
    /// End address of the management information, inclusive.
    pub vmgi_end_address: u32,
    pub version: FormatVersion,
    pub text_encoding: u8,
    pub disc_labels: [[u8; DISC_LABEL_LEN]; 2],
    /// Program info table start, relative to the root.
    pub program_info_table_sa: u32,
    pub info2_sa: u32,
    /// Default program-set info start, relative to the root.
    pub program_set_info_sa: u32,
    pub info4_sa: u32,
    pub info5_sa: u32,
    pub info6_sa: u32,
}

impl RootDescriptor {
    pub fn read(view: &ByteView) -> Result<Self> {
        let id = view.bytes(0, MAGIC.len())?;
        if id != MAGIC {
            let id = String::from_utf8_lossy(id).into_owned();
            bail!(FormatError::BadMagic(id));
        }

        let root = Self {
            end_address: view.read_u32be(12)?,
            vmgi_end_address: view.read_u32be(28)?,
            version: FormatVersion(view.read_u16be(32)? as u8),
            text_encoding: view.read_u8(67)?,
            disc_labels: [view.array(98)?, view.array(162)?],
            program_info_table_sa: view.read_u32be(256)?,
            info2_sa: view.read_u32be(260)?,
            program_set_info_sa: view.read_u32be(304)?,
            info4_sa: view.read_u32be(308)?,
            info5_sa: view.read_u32be(312)?,
            info6_sa: view.read_u32be(316)?,
        };

        trace!(
            "RTR_VMGI: end address {:#X}, {}, text encoding {:#04X}",
            root.end_address, root.version, root.text_encoding
        );
        trace!(
            "pgit_sa: {:#X}, psi_sa: {:#X}",
            root.program_info_table_sa, root.program_set_info_sa
        );

        Ok(root)
    }

    /// Real size of the navigation data. The stored end address is inclusive.
    pub fn total_size(&self) -> u64 {
        self.end_address as u64 + 1
    }
}

/// Specification version, stored in the low byte of a 16-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatVersion(pub u8);

impl FormatVersion {
    pub fn major(&self) -> u8 {
        self.0 >> 4
    }

    pub fn minor(&self) -> u8 {
        self.0 & 0x0F
    }
}

impl Display for FormatVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DVD-VR V{}.{}", self.major(), self.minor())
    }
}
