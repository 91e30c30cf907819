use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{Level, LevelFilter, debug, warn};

use crate::log_or_err;
use crate::structs::attributes::{AudioAttributes, VideoAttributes};
use crate::structs::program::ProgramDescriptor;
use crate::structs::program_info::{ProgramInfoTable, VobFormat};
use crate::structs::program_set::ProgramSetInfo;
use crate::structs::root::{ROOT_SIZE, RootDescriptor};
use crate::structs::text::TextEncoding;
use crate::utils::bytes::ByteView;
use crate::utils::errors::{AddressingError, DecodeWarning};

/// Anchor a stored relative offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// Start of the IFO. Used by the root's table pointers.
    Root,
    /// Start of the program info table at the given absolute offset. Used by
    /// the per-program descriptor pointers.
    ProgramInfoTable(usize),
}

/// A loaded DVD-VR navigation file.
///
/// Owns the whole IFO as one immutable buffer. Tables are decoded on demand
/// from offsets into it, so nothing here is ever mutated after loading.
///
/// # Example
///
/// ```rust,no_run
/// use dvdvr::process::ifo::Ifo;
///
/// let ifo = Ifo::open("VR_MANGR.IFO")?;
/// println!("{}", ifo.root().version);
///
/// let table = ifo.program_info_table()?;
/// for index in 1..=table.program_count() {
///     let program = ifo.program(&table, index)?;
///     println!("program {index}: {} bytes", program.vobu_map.total_bytes());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Ifo {
    data: Vec<u8>,
    root: RootDescriptor,
    fail_level: LevelFilter,
}

impl Ifo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open IFO file: {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Loads the navigation data from a reader.
    ///
    /// The root descriptor is read and validated first. Its end address then
    /// gives the real size, and the rest is read to cover it. A source shorter
    /// than declared is accepted with a warning.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::with_capacity(ROOT_SIZE);
        reader
            .by_ref()
            .take(ROOT_SIZE as u64)
            .read_to_end(&mut data)
            .context("Failed to read IFO root descriptor")?;

        let root = RootDescriptor::read(&ByteView::new(&data))?;

        let total_size = root.total_size();
        debug!("IFO size: {total_size} bytes");

        if total_size > ROOT_SIZE as u64 {
            reader
                .take(total_size - ROOT_SIZE as u64)
                .read_to_end(&mut data)
                .context("Failed to read IFO")?;
        }

        Ok(Self::with_root(data, root))
    }

    /// Loads from an in-memory image through the same two-stage read as a file.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Self::from_reader(data)
    }

    /// Takes ownership of a complete image without re-reading it.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let root = RootDescriptor::read(&ByteView::new(&data))?;
        Ok(Self::with_root(data, root))
    }

    fn with_root(data: Vec<u8>, root: RootDescriptor) -> Self {
        if (data.len() as u64) < root.total_size() {
            warn!(
                "IFO is {} bytes, shorter than the declared {}; reading what is there",
                data.len(),
                root.total_size()
            );
        }

        Self {
            data,
            root,
            fail_level: LevelFilter::Off,
        }
    }

    /// Sets the level at which recoverable anomalies become errors.
    ///
    /// - `LevelFilter::Off`: never fail, only log (default)
    /// - `LevelFilter::Error`: fail on undecodable attributes
    /// - `LevelFilter::Warn`: also fail on unknown codes (strict mode)
    pub fn set_fail_level(&mut self, level: LevelFilter) {
        self.fail_level = level;
    }

    pub fn root(&self) -> &RootDescriptor {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Turns a stored relative offset into a view of the buffer.
    pub fn resolve(
        &self,
        base: Base,
        relative: u32,
        table: &'static str,
    ) -> Result<ByteView<'_>> {
        let base = match base {
            Base::Root => 0,
            Base::ProgramInfoTable(offset) => offset as u64,
        };
        let address = base + relative as u64;

        if address >= self.data.len() as u64 {
            bail!(AddressingError::OutOfBounds {
                table,
                address,
                len: self.data.len(),
            });
        }

        Ok(ByteView::new(&self.data).at(address as usize)?)
    }

    pub fn text_encoding(&self) -> Result<TextEncoding> {
        let encoding = TextEncoding::from_selector(self.root.text_encoding);
        if let Some(warning) = encoding.warning() {
            log_or_err!(self, Level::Warn, warning);
        }
        Ok(encoding)
    }

    pub fn disc_labels(&self) -> Result<[String; 2]> {
        let encoding = self.text_encoding()?;
        Ok(self.root.disc_labels.map(|raw| encoding.decode(&raw)))
    }

    /// Decodes the first program info table. Any further tables are reported
    /// and ignored.
    pub fn program_info_table(&self) -> Result<ProgramInfoTable> {
        debug!("pgit_sa: {:#X}", self.root.program_info_table_sa);
        let view = self.resolve(
            Base::Root,
            self.root.program_info_table_sa,
            "program info table",
        )?;
        let table = ProgramInfoTable::read(&view)?;

        if table.info_table_count > 1 {
            log_or_err!(
                self,
                Level::Warn,
                DecodeWarning::ExtraInfoTables(table.info_table_count)
            );
        }

        Ok(table)
    }

    /// Decodes the descriptor of program `index` (1-based).
    pub fn program(&self, table: &ProgramInfoTable, index: usize) -> Result<ProgramDescriptor> {
        let count = table.program_count();
        if index == 0 || index > count {
            bail!(AddressingError::ProgramOutOfRange { index, count });
        }

        let relative = table.program_offsets[index - 1];
        debug!("VVOB info ({index}) address: {relative}");

        let base = Base::ProgramInfoTable(table.offset);
        let view = self.resolve(base, relative, "program")?;
        ProgramDescriptor::read(&view, index)
    }

    /// Looks up the VOB format a program refers to.
    pub fn vob_format<'t>(
        &self,
        table: &'t ProgramInfoTable,
        program: &ProgramDescriptor,
    ) -> Result<Option<&'t VobFormat>> {
        let format = table.vob_format(program.vob_format_id);
        if format.is_none() {
            let warning = DecodeWarning::MissingVobFormat {
                program: program.number,
                id: program.vob_format_id,
                count: table.vob_formats.len(),
            };
            log_or_err!(self, Level::Warn, warning);
        }
        Ok(format)
    }

    /// Decodes the default program-set table, or `None` if the disc has none.
    pub fn program_sets(&self) -> Result<Option<ProgramSetInfo>> {
        let start = self.root.program_set_info_sa;
        if start == 0 {
            debug!("No program set info");
            return Ok(None);
        }

        let view = self.resolve(Base::Root, start, "program set info")?;
        ProgramSetInfo::read(&view).map(Some)
    }

    /// Decodes a format's video attributes.
    ///
    /// Returns `None` when the word cannot be decoded and the failure is below
    /// the fail level.
    pub fn video_attributes(&self, format: &VobFormat) -> Result<Option<VideoAttributes>> {
        match format.video() {
            Ok(video) => {
                for warning in video.warnings() {
                    log_or_err!(self, Level::Warn, warning);
                }
                Ok(Some(video))
            }
            Err(e) => {
                log_or_err!(self, Level::Error, e);
                Ok(None)
            }
        }
    }

    /// Decodes audio attribute triple `index` of a format.
    pub fn audio_attributes(
        &self,
        format: &VobFormat,
        index: usize,
    ) -> Result<Option<AudioAttributes>> {
        match format.audio(index) {
            Some(Ok(audio)) => {
                for warning in audio.warnings() {
                    log_or_err!(self, Level::Warn, warning);
                }
                Ok(Some(audio))
            }
            Some(Err(e)) => {
                log_or_err!(self, Level::Error, e);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{IfoBuilder, ProgramFixture, SetFixture, root_bytes};
    use crate::structs::attributes::{AspectRatio, TvSystem};
    use crate::utils::errors::{AttributeError, FormatError};

    fn two_programs() -> IfoBuilder {
        IfoBuilder::default()
            .program(ProgramFixture::new(0, &[10, 20, 5]))
            .program(ProgramFixture::new(35, &[10, 20, 5]))
    }

    #[test]
    fn loads_to_declared_size() -> Result<()> {
        let image = two_programs().build();
        let mut padded = image.data.clone();
        padded.extend([0xEE; 100]);

        let ifo = Ifo::from_slice(&padded)?;
        assert_eq!(ifo.len(), image.data.len());
        assert_eq!(ifo.root().total_size(), image.data.len() as u64);
        Ok(())
    }

    #[test]
    fn short_file_keeps_validated_root() -> Result<()> {
        // Declares 8 KiB but only the root is present
        let data = root_bytes(0x1FFF);
        let ifo = Ifo::from_slice(&data)?;
        assert_eq!(ifo.len(), ROOT_SIZE);
        assert_eq!(ifo.root().total_size(), 0x2000);
        Ok(())
    }

    #[test]
    fn declared_size_below_root_reads_root_only() -> Result<()> {
        let mut data = root_bytes(0x10);
        data.extend([0; 64]);
        let ifo = Ifo::from_slice(&data)?;
        assert_eq!(ifo.len(), ROOT_SIZE);
        Ok(())
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut data = two_programs().build().data;
        data[0] = b'X';
        let err = Ifo::from_slice(&data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::BadMagic(_))
        ));
    }

    #[test]
    fn end_to_end_program_sizes() -> Result<()> {
        let ifo = Ifo::from_bytes(two_programs().build().data)?;
        let table = ifo.program_info_table()?;
        assert_eq!(table.program_count(), 2);

        let format = &table.vob_formats[0];
        let video = ifo.video_attributes(format)?.unwrap();
        assert_eq!(video.compression.to_string(), "MPEG2");
        assert_eq!(video.tv_system.to_string(), "NTSC");
        assert_eq!(video.aspect.to_string(), "4:3");
        assert_eq!(video.resolution.to_string(), "720x480");
        let audio = ifo.audio_attributes(format, 0)?.unwrap();
        assert_eq!(audio.channels, 2);

        for index in 1..=2 {
            let program = ifo.program(&table, index)?;
            assert_eq!(program.vobu_map.total_bytes(), 71680);
        }
        assert_eq!(ifo.program(&table, 2)?.vobu_map.vob_offset, 35);
        Ok(())
    }

    #[test]
    fn program_index_is_checked() -> Result<()> {
        let ifo = Ifo::from_bytes(two_programs().build().data)?;
        let table = ifo.program_info_table()?;

        for index in [0, 3] {
            let err = ifo.program(&table, index).unwrap_err();
            assert_eq!(
                err.downcast_ref::<AddressingError>(),
                Some(&AddressingError::ProgramOutOfRange { index, count: 2 })
            );
        }
        Ok(())
    }

    #[test]
    fn program_pointers_are_relative_to_table() -> Result<()> {
        let image = two_programs().build();
        let ifo = Ifo::from_bytes(image.data.clone())?;
        let table = ifo.program_info_table()?;

        let relative = table.program_offsets[1];
        let base = Base::ProgramInfoTable(table.offset);
        let view = ifo.resolve(base, relative, "program")?;
        assert_eq!(view.position(), image.program_offsets[1]);
        assert_eq!(view.position(), image.pgit_offset + relative as usize);
        Ok(())
    }

    #[test]
    fn out_of_bounds_pointer() -> Result<()> {
        let ifo = Ifo::from_bytes(two_programs().build().data)?;
        let past_end = ifo.len() as u32;
        let err = ifo.resolve(Base::Root, past_end, "test").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AddressingError>(),
            Some(AddressingError::OutOfBounds { .. })
        ));
        Ok(())
    }

    #[test]
    fn no_info_tables() -> Result<()> {
        let ifo = Ifo::from_bytes(two_programs().info_tables(0).build().data)?;
        let err = ifo.program_info_table().unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::NoInfoTables)
        );
        Ok(())
    }

    #[test]
    fn extra_info_tables_warn_unless_strict() -> Result<()> {
        let mut ifo = Ifo::from_bytes(two_programs().info_tables(3).build().data)?;
        assert_eq!(ifo.program_info_table()?.program_count(), 2);

        ifo.set_fail_level(LevelFilter::Warn);
        let err = ifo.program_info_table().unwrap_err();
        assert_eq!(
            err.downcast_ref::<DecodeWarning>(),
            Some(&DecodeWarning::ExtraInfoTables(3))
        );
        Ok(())
    }

    #[test]
    fn undecodable_attributes_follow_fail_level() -> Result<()> {
        let image = two_programs()
            .replace_vob_formats(&[(0x6000, [0x00, 0x08, 0x00])])
            .build();
        let mut ifo = Ifo::from_bytes(image.data)?;
        let table = ifo.program_info_table()?;
        let format = &table.vob_formats[0];

        assert!(ifo.video_attributes(format)?.is_none());
        assert!(ifo.audio_attributes(format, 0)?.is_none());

        ifo.set_fail_level(LevelFilter::Error);
        let err = ifo.audio_attributes(format, 0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttributeError>(),
            Some(&AttributeError::InvalidChannelCount(8))
        );
        Ok(())
    }

    #[test]
    fn programs_pick_their_vob_format() -> Result<()> {
        let image = IfoBuilder::default()
            .vob_format(0x5400, [0x00, 0x01, 0x00])
            .program(ProgramFixture::new(0, &[10]))
            .program(ProgramFixture::new(10, &[10]).vob_format_id(2))
            .program(ProgramFixture::new(20, &[10]).vob_format_id(3))
            .build();
        let mut ifo = Ifo::from_bytes(image.data)?;
        let table = ifo.program_info_table()?;

        let first = ifo.program(&table, 1)?;
        let format = ifo.vob_format(&table, &first)?.unwrap();
        assert_eq!(format.video_attr, 0x4000);

        let second = ifo.program(&table, 2)?;
        let format = ifo.vob_format(&table, &second)?.unwrap();
        let video = format.video()?;
        assert_eq!(video.tv_system, TvSystem::Pal);
        assert_eq!(video.resolution.to_string(), "720x576");
        assert_eq!(video.aspect, AspectRatio::R16_9);

        let third = ifo.program(&table, 3)?;
        assert!(ifo.vob_format(&table, &third)?.is_none());

        ifo.set_fail_level(LevelFilter::Warn);
        let err = ifo.vob_format(&table, &third).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DecodeWarning>(),
            Some(&DecodeWarning::MissingVobFormat {
                program: 3,
                id: 3,
                count: 2,
            })
        );
        Ok(())
    }

    #[test]
    fn unknown_text_encoding_falls_back() -> Result<()> {
        let mut ifo = Ifo::from_bytes(two_programs().text_encoding(0x42).build().data)?;
        assert_eq!(ifo.text_encoding()?, TextEncoding::Unknown(0x42));
        assert_eq!(ifo.disc_labels()?[0], "TEST DISC");

        ifo.set_fail_level(LevelFilter::Warn);
        assert!(ifo.text_encoding().is_err());
        Ok(())
    }

    #[test]
    fn program_sets_optional() -> Result<()> {
        let ifo = Ifo::from_bytes(two_programs().build().data)?;
        assert!(ifo.program_sets()?.is_none());

        let image = two_programs()
            .program_set(SetFixture::new("Holiday", 1, 2))
            .build();
        let ifo = Ifo::from_bytes(image.data)?;
        let sets = ifo.program_sets()?.unwrap();
        assert_eq!(sets.offset, image.psi_offset.unwrap());
        assert_eq!(sets.entries[0].label(), "Holiday");
        Ok(())
    }
}
