//! Program info table (PGIT): VOB formats and the per-program pointer list.

use anyhow::{Result, bail};
use log::debug;

use crate::structs::attributes::{AudioAttributes, VideoAttributes};
use crate::utils::bytes::ByteView;
use crate::utils::errors::{AttributeError, FormatError};

pub const HEADER_SIZE: usize = 8;
pub const VOB_FORMAT_SIZE: usize = 60;
pub const GLOBAL_INFO_SIZE: usize = 2;
pub const POINTER_SIZE: usize = 4;

#[derive(Debug, Clone)]
pub struct ProgramInfoTable {
    /// Absolute offset of the table within the IFO.
    pub offset: usize,
    /// Number of info tables declared. Only the first is ever read.
    pub info_table_count: u8,
    pub end_address: u32,
    pub vob_formats: Vec<VobFormat>,
    /// Program descriptor offsets, relative to the start of this table.
    pub program_offsets: Vec<u32>,
}

impl ProgramInfoTable {
    /// Reads the table at the start of `view`.
    pub fn read(view: &ByteView) -> Result<Self> {
        let info_table_count = view.read_u8(2)?;
        let vob_format_count = view.read_u8(3)?;
        let end_address = view.read_u32be(4)?;

        debug!("Number of info tables for VRO: {info_table_count}");
        debug!("Number of vob formats: {vob_format_count}, pgit_ea: {end_address:08X}");

        if info_table_count == 0 {
            bail!(FormatError::NoInfoTables);
        }

        let mut cursor = HEADER_SIZE;
        let mut vob_formats = Vec::with_capacity(vob_format_count as usize);
        for _ in 0..vob_format_count {
            vob_formats.push(VobFormat::read(&view.at(cursor)?)?);
            cursor += VOB_FORMAT_SIZE;
        }

        let program_count = view.read_u16be(cursor)? as usize;
        cursor += GLOBAL_INFO_SIZE;

        let program_offsets = (0..program_count)
            .map(|i| view.read_u32be(cursor + i * POINTER_SIZE))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Number of programs: {program_count}");

        Ok(Self {
            offset: view.position(),
            info_table_count,
            end_address,
            vob_formats,
            program_offsets,
        })
    }

    pub fn program_count(&self) -> usize {
        self.program_offsets.len()
    }

    /// Looks up a VOB format by its 1-based id, as stored in program descriptors.
    pub fn vob_format(&self, id: u8) -> Option<&VobFormat> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.vob_formats.get(index))
    }
}

/// One encoding profile shared by any number of programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VobFormat {
    pub video_attr: u16,
    pub audio_stream_count: u8,
    pub audio_attrs: [[u8; 3]; 2],
}

impl VobFormat {
    pub fn read(view: &ByteView) -> Result<Self, FormatError> {
        Ok(Self {
            video_attr: view.read_u16be(0)?,
            audio_stream_count: view.read_u8(2)?,
            audio_attrs: [view.array(4)?, view.array(7)?],
        })
    }

    pub fn video(&self) -> Result<VideoAttributes, AttributeError> {
        VideoAttributes::decode(self.video_attr)
    }

    /// Decodes audio attribute triple `index` (0 or 1).
    pub fn audio(&self, index: usize) -> Option<Result<AudioAttributes, AttributeError>> {
        self.audio_attrs
            .get(index)
            .copied()
            .map(AudioAttributes::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{IfoBuilder, ProgramFixture};
    use crate::structs::attributes::{AudioCoding, TvSystem};

    #[test]
    fn reads_formats_and_pointers() -> Result<()> {
        let image = IfoBuilder::default()
            .program(ProgramFixture::new(0, &[10, 20, 5]))
            .program(ProgramFixture::new(35, &[1]))
            .build();
        let view = ByteView::new(&image.data).at(image.pgit_offset)?;
        let table = ProgramInfoTable::read(&view)?;

        assert_eq!(table.offset, image.pgit_offset);
        assert_eq!(table.info_table_count, 1);
        assert_eq!(table.program_count(), 2);
        assert_eq!(table.vob_formats.len(), 1);

        let format = table.vob_format(1).unwrap();
        assert_eq!(format.video()?.tv_system, TvSystem::Ntsc);
        let audio = format.audio(0).unwrap()?;
        assert_eq!(audio.coding, AudioCoding::Ac3);
        assert_eq!(audio.channels, 2);

        assert!(table.vob_format(0).is_none());
        assert!(table.vob_format(2).is_none());
        Ok(())
    }

    #[test]
    fn zero_info_tables_is_fatal() {
        let image = IfoBuilder::default().info_tables(0).build();
        let view = ByteView::new(&image.data).at(image.pgit_offset).unwrap();
        let err = ProgramInfoTable::read(&view).unwrap_err();

        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::NoInfoTables)
        );
    }
}
