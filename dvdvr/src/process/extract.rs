use std::io::{self, SeekFrom};
use std::iter::Enumerate;
use std::slice::Iter;

use log::{trace, warn};

use crate::SECTOR_SIZE;
use crate::structs::program::{VobuMap, VobuSize};
use crate::utils::cache::{SectorSink, SectorSource};
use crate::utils::errors::ExtractError;

/// What happened to one VOBU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    /// 0-based position of the unit in the VOBU map.
    pub index: usize,
    /// Byte offset of the unit in the VRO.
    pub offset: u64,
    pub sectors: u16,
    /// Bytes actually read and written.
    pub consumed: u64,
    /// Why the read stopped short, if it did.
    pub read_error: Option<io::ErrorKind>,
}

impl UnitOutcome {
    /// Bytes the VOBU map declares for this unit.
    pub fn owed(&self) -> u64 {
        self.sectors as u64 * SECTOR_SIZE
    }

    pub fn is_degraded(&self) -> bool {
        self.consumed < self.owed()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub units: usize,
    pub total_sectors: u64,
    pub degraded_units: Vec<UnitOutcome>,
}

impl ExtractSummary {
    /// Declared size of the program. Read faults do not change it.
    pub fn total_bytes(&self) -> u64 {
        self.total_sectors * SECTOR_SIZE
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_units.is_empty()
    }
}

/// Copies a program's VOBUs from the VRO to a sink, in map order.
///
/// Each call to [`next`](Iterator::next) copies one unit. A read that fails or
/// ends early leaves the unit degraded: whatever was read is written, the
/// source is moved to where the next unit starts, and extraction continues.
/// A write failure ends the iteration with [`ExtractError::Write`].
///
/// # Example
///
/// ```rust,no_run
/// use std::fs::File;
/// use dvdvr::process::{extract::Extractor, ifo::Ifo};
///
/// let ifo = Ifo::open("VR_MANGR.IFO")?;
/// let table = ifo.program_info_table()?;
/// let program = ifo.program(&table, 1)?;
///
/// let mut vro = File::open("VR_MOVIE.VRO")?;
/// let mut out = File::create("program_1.vob")?;
///
/// for unit in Extractor::new(&program.vobu_map, &mut vro, &mut out)? {
///     let unit = unit?;
///     if unit.is_degraded() {
///         eprintln!("VOBU {} is damaged", unit.index);
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Extractor<'a, S: SectorSource, W: SectorSink> {
    units: Enumerate<Iter<'a, VobuSize>>,
    source: S,
    sink: W,
    position: u64,
    buffer: Vec<u8>,
    summary: ExtractSummary,
    aborted: bool,
}

impl<'a, S: SectorSource, W: SectorSink> Extractor<'a, S, W> {
    /// Positions `source` at the program's first sector.
    pub fn new(map: &'a VobuMap, mut source: S, sink: W) -> Result<Self, ExtractError> {
        let position = map.start_byte();
        source
            .seek(SeekFrom::Start(position))
            .map_err(|source| ExtractError::Seek {
                offset: position,
                source,
            })?;

        trace!(
            "Extracting {} VOBUs from offset {position:#X}",
            map.vobu_count()
        );

        Ok(Self {
            units: map.vobu_sizes.iter().enumerate(),
            source,
            sink,
            position,
            buffer: Vec::new(),
            summary: ExtractSummary::default(),
            aborted: false,
        })
    }

    /// Copies every remaining unit, calling `on_unit` after each.
    pub fn run<F>(mut self, mut on_unit: F) -> Result<ExtractSummary, ExtractError>
    where
        F: FnMut(&UnitOutcome),
    {
        for unit in self.by_ref() {
            on_unit(&unit?);
        }
        self.sink
            .flush()
            .map_err(|source| ExtractError::Write {
                unit: self.summary.units,
                source,
            })?;
        Ok(self.summary)
    }

    fn copy_unit(&mut self, index: usize, size: VobuSize) -> Result<UnitOutcome, ExtractError> {
        let offset = self.position;
        let owed = size.bytes() as usize;

        self.summary.units += 1;
        self.summary.total_sectors += size.sectors() as u64;

        self.buffer.resize(owed, 0);
        let (consumed, read_error) = fill(&mut self.source, &mut self.buffer[..owed]);

        self.sink
            .write_all(&self.buffer[..consumed])
            .map_err(|source| ExtractError::Write {
                unit: index,
                source,
            })?;

        let next = offset + owed as u64;
        if let Some(e) = &read_error {
            warn!(
                "Error reading VOBU {index} at {offset:#X}: {e}. \
                 Read {consumed} of {owed} bytes, skipping the rest"
            );
            self.source
                .seek(SeekFrom::Start(next))
                .map_err(|source| ExtractError::Seek {
                    offset: next,
                    source,
                })?;
        }
        self.position = next;

        self.source.release_cached(offset, owed as u64);
        self.sink.release_cached();

        let outcome = UnitOutcome {
            index,
            offset,
            sectors: size.sectors(),
            consumed: consumed as u64,
            read_error: read_error.map(|e| e.kind()),
        };
        if outcome.is_degraded() {
            self.summary.degraded_units.push(outcome.clone());
        }

        Ok(outcome)
    }
}

impl<S: SectorSource, W: SectorSink> Iterator for Extractor<'_, S, W> {
    type Item = Result<UnitOutcome, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.aborted {
            return None;
        }

        let (index, size) = self.units.next()?;
        let outcome = self.copy_unit(index, *size);
        if outcome.is_err() {
            self.aborted = true;
        }
        Some(outcome)
    }
}

/// Reads until `buf` is full, the source ends, or a read fails.
fn fill<R: io::Read>(source: &mut R, buf: &mut [u8]) -> (usize, Option<io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return (
                    filled,
                    Some(io::Error::new(io::ErrorKind::UnexpectedEof, "end of VRO")),
                );
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}
