//! Per-program descriptor ("virtual VOB") and its VOBU map.

use anyhow::Result;
use log::debug;

use crate::SECTOR_SIZE;
use crate::structs::attributes::ProgramFlags;
use crate::structs::timestamp::{PACKED_LEN, RecordingTime};
use crate::utils::bytes::ByteView;
use crate::utils::errors::FormatError;

pub const DESCRIPTOR_SIZE: usize = 21;
pub const ADJACENT_VOB_SIZE: usize = 12;
/// Undocumented bytes between the descriptor (or adjacent VOB record) and
/// the VOBU map.
pub const GAP_SIZE: usize = 2;
pub const VOBU_MAP_HEADER_SIZE: usize = 10;
pub const TIME_INFO_SIZE: usize = 7;
pub const VOBU_RECORD_SIZE: usize = 3;

/// Presentation time stamp pair as stored on disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ptm {
    pub ptm: u32,
    pub extra: u16,
}

impl Ptm {
    fn read(view: &ByteView, offset: usize) -> Result<Self, FormatError> {
        Ok(Self {
            ptm: view.read_u32be(offset)?,
            extra: view.read_u16be(offset + 4)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramDescriptor {
    /// 1-based program number.
    pub number: usize,
    /// Absolute offset of the descriptor within the IFO.
    pub offset: usize,
    pub flags: ProgramFlags,
    /// `None` when the recorder left the time unset.
    pub recorded: Option<RecordingTime>,
    /// 1-based index into the VOB formats of the program info table.
    pub vob_format_id: u8,
    pub start_ptm: Ptm,
    pub end_ptm: Ptm,
    pub vobu_map: VobuMap,
}

impl ProgramDescriptor {
    /// Reads the descriptor at the start of `view` along with its VOBU map.
    pub fn read(view: &ByteView, number: usize) -> Result<Self> {
        let flags = ProgramFlags(view.read_u16be(0)?);
        let recorded = RecordingTime::from_bytes(view.bytes(2, PACKED_LEN)?)?;
        let vob_format_id = view.read_u8(8)?;
        let start_ptm = Ptm::read(view, 9)?;
        let end_ptm = Ptm::read(view, 15)?;

        let mut skip = DESCRIPTOR_SIZE;
        if flags.has_adjacent_vob() {
            debug!("Program {number}: skipping adjacent VOB info");
            skip += ADJACENT_VOB_SIZE;
        }
        skip += GAP_SIZE;

        let vobu_map = VobuMap::read(&view.at(skip)?)?;

        Ok(Self {
            number,
            offset: view.position(),
            flags,
            recorded,
            vob_format_id,
            start_ptm,
            end_ptm,
            vobu_map,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VobuMap {
    pub time_info_count: u16,
    pub time_offset: u16,
    /// Start of the program in the VRO, in sectors.
    pub vob_offset: u32,
    pub vobu_sizes: Vec<VobuSize>,
}

impl VobuMap {
    pub fn read(view: &ByteView) -> Result<Self, FormatError> {
        let time_info_count = view.read_u16be(0)?;
        let vobu_count = view.read_u16be(2)?;
        let time_offset = view.read_u16be(4)?;
        let vob_offset = view.read_u32be(6)?;

        debug!("# time infos: {time_info_count}, # VOBUs: {vobu_count}");
        debug!(
            "time offset: {time_offset}, vob offset: {}",
            vob_offset as u64 * SECTOR_SIZE
        );

        let records = VOBU_MAP_HEADER_SIZE + time_info_count as usize * TIME_INFO_SIZE;
        let vobu_sizes = (0..vobu_count as usize)
            .map(|i| view.array(records + i * VOBU_RECORD_SIZE))
            .map(|record| record.map(VobuSize::from_record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            time_info_count,
            time_offset,
            vob_offset,
            vobu_sizes,
        })
    }

    pub fn vobu_count(&self) -> usize {
        self.vobu_sizes.len()
    }

    /// Byte offset of the program's first sector in the VRO.
    pub fn start_byte(&self) -> u64 {
        self.vob_offset as u64 * SECTOR_SIZE
    }

    pub fn total_sectors(&self) -> u64 {
        self.vobu_sizes.iter().map(|s| s.sectors() as u64).sum()
    }

    /// Size of the program as declared by its VOBU records.
    pub fn total_bytes(&self) -> u64 {
        self.total_sectors() * SECTOR_SIZE
    }
}

/// Size of one VOBU in sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VobuSize(u16);

impl VobuSize {
    /// The sector count is the low 10 bits of the last two bytes.
    pub fn from_record(record: [u8; VOBU_RECORD_SIZE]) -> Self {
        Self(u16::from_be_bytes([record[1], record[2]]) & 0x03FF)
    }

    pub fn sectors(&self) -> u16 {
        self.0
    }

    pub fn bytes(&self) -> u64 {
        self.0 as u64 * SECTOR_SIZE
    }
}
