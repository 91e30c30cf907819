use std::ops::RangeInclusive;

use crate::structs::program_set::{ProgramSetEntry, ProgramSetInfo};

/// A program-set entry together with the programs it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramLabel<'a> {
    pub entry: &'a ProgramSetEntry,
    pub programs: RangeInclusive<usize>,
}

/// Walks the entries in stored order and yields the 1-based program range of
/// each.
///
/// Entries with an inferred first program continue one past the programs
/// counted so far. Ranges are assumed contiguous and increasing; nothing
/// checks that entries do not overlap.
pub fn program_ranges(info: &ProgramSetInfo) -> impl Iterator<Item = ProgramLabel<'_>> {
    info.entries.iter().scan(0usize, |total, entry| {
        let start = if entry.has_inferred_start() {
            *total + 1
        } else {
            entry.first_program as usize
        };
        *total += entry.program_count as usize;

        Some(ProgramLabel {
            entry,
            programs: start..=start + entry.program_count as usize - 1,
        })
    })
}

/// Finds the program set containing program `index` (1-based).
///
/// `None` is not an error: plenty of discs leave programs unlabelled.
pub fn resolve_label(info: &ProgramSetInfo, index: usize) -> Option<ProgramLabel<'_>> {
    program_ranges(info).find(|label| label.programs.contains(&index))
}
