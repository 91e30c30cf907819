//! Default program-set info (PSI): labels and titles for ranges of programs.

use anyhow::Result;
use log::{debug, trace};

use crate::structs::text::TextEncoding;
use crate::utils::bytes::ByteView;
use crate::utils::errors::FormatError;

pub const GLOBAL_INFO_SIZE: usize = 4;
pub const ENTRY_SIZE: usize = 140;
pub const LABEL_LEN: usize = 64;
pub const TITLE_LEN: usize = 64;

/// First-program values meaning "continue after the previous inferred set".
pub const INFERRED_FIRST: [u16; 2] = [0x0000, 0xFFFF];

#[derive(Debug, Clone)]
pub struct ProgramSetInfo {
    pub offset: usize,
    /// Total programs as declared in the global info.
    pub program_count: u16,
    pub entries: Vec<ProgramSetEntry>,
}

impl ProgramSetInfo {
    pub fn read(view: &ByteView) -> Result<Self> {
        let entry_count = view.read_u8(1)?;
        let program_count = view.read_u16be(2)?;

        debug!("Number of program sets: {entry_count}, programs: {program_count}");

        let entries = (0..entry_count as usize)
            .map(|i| view.at(GLOBAL_INFO_SIZE + i * ENTRY_SIZE))
            .map(|entry| ProgramSetEntry::read(&entry?))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            offset: view.position(),
            program_count,
            entries,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSetEntry {
    pub program_count: u8,
    /// Always ASCII; padded with spaces or NULs.
    pub label: [u8; LABEL_LEN],
    /// In the disc's declared text encoding.
    pub title: [u8; TITLE_LEN],
    pub program_set_id: u16,
    /// 1-based, or one of [`INFERRED_FIRST`].
    pub first_program: u16,
}

impl ProgramSetEntry {
    pub fn read(view: &ByteView) -> Result<Self, FormatError> {
        let entry = Self {
            program_count: view.read_u8(1)?,
            label: view.array(2)?,
            title: view.array(66)?,
            program_set_id: view.read_u16be(130)?,
            first_program: view.read_u16be(132)?,
        };

        trace!(
            "Program set {}: first program {}, count {}",
            entry.program_set_id, entry.first_program, entry.program_count
        );

        Ok(entry)
    }

    pub fn has_inferred_start(&self) -> bool {
        INFERRED_FIRST.contains(&self.first_program)
    }

    pub fn label(&self) -> String {
        TextEncoding::Ascii.decode(&self.label)
    }

    pub fn title(&self, encoding: TextEncoding) -> String {
        encoding.decode(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{IfoBuilder, SetFixture};

    #[test]
    fn reads_entries() -> Result<()> {
        let image = IfoBuilder::default()
            .program_set(SetFixture::new("Holiday", 1, 3).title(b"Beach day"))
            .program_set(SetFixture::new("Party", 0xFFFF, 2))
            .build();
        let view = ByteView::new(&image.data).at(image.psi_offset.unwrap())?;
        let psi = ProgramSetInfo::read(&view)?;

        assert_eq!(psi.entries.len(), 2);
        assert_eq!(psi.program_count, 5);

        let first = &psi.entries[0];
        assert_eq!(first.label(), "Holiday");
        assert_eq!(first.title(TextEncoding::Ascii), "Beach day");
        assert_eq!(first.program_count, 3);
        assert!(!first.has_inferred_start());

        let second = &psi.entries[1];
        assert_eq!(second.label(), "Party");
        assert!(second.has_inferred_start());
        Ok(())
    }
}
