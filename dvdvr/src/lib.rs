//! Parser for the navigation data of DVD Video-Recording discs and extractor
//! for the programs recorded on them.
//!
//! ## Technical Overview
//!
//! A DVD-VR disc carries a small navigation file (`VR_MANGR.IFO`) and one
//! large data file (`VR_MOVIE.VRO`). The IFO is a big-endian, pointer-chained
//! layout: a 512-byte root descriptor points at the program info table, which
//! lists the shared VOB formats and one descriptor per program. Each program
//! descriptor ends in a VOBU map giving the program's start sector in the VRO
//! and the size, in 2048-byte sectors, of every playback unit.
//!
//! ### Addressing
//!
//! Stored offsets are relative, and the base differs per field: the program
//! info table and the program-set table are relative to the start of the IFO,
//! program descriptors are relative to the start of the program info table.
//! [`process::ifo::Base`] makes that distinction explicit.
//!
//! ## Quick Start
//!
//! 1. Load the navigation data with [`process::ifo::Ifo`]
//! 2. Decode programs and formats through the resolver
//! 3. Stream a program out of the VRO with [`process::extract::Extractor`]
//!
//! ```rust,no_run
//! use std::fs::File;
//! use dvdvr::process::{extract::Extractor, ifo::Ifo};
//!
//! let ifo = Ifo::open("VR_MANGR.IFO")?;
//! let table = ifo.program_info_table()?;
//! let mut vro = File::open("VR_MOVIE.VRO")?;
//!
//! for index in 1..=table.program_count() {
//!     let program = ifo.program(&table, index)?;
//!     let mut out = File::create(format!("program_{index}.vob"))?;
//!
//!     let summary = Extractor::new(&program.vobu_map, &mut vro, &mut out)?.run(|_| {})?;
//!     println!("program {index}: {} bytes", summary.total_bytes());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Processing of the navigation data and the recorded data.
///
/// 1. **Address resolution** ([`process::ifo`]): loads the IFO and turns
///    stored relative offsets into decoded tables.
///
/// 2. **Labels** ([`process::label`]): maps a program number to its
///    program-set label and title.
///
/// 3. **Extraction** ([`process::extract`]): streams a program's VOBUs out of
///    the VRO.
pub mod process;

/// Fixed-layout records of the navigation file.
///
/// - **Root descriptor** ([`structs::root`]): identifier, size and table pointers
/// - **Program info** ([`structs::program_info`]): VOB formats and program pointers
/// - **Programs** ([`structs::program`]): per-program header and VOBU map
/// - **Program sets** ([`structs::program_set`]): labels and titles
/// - **Attributes** ([`structs::attributes`]): packed audio/video attributes
/// - **Timestamps** ([`structs::timestamp`]): packed recording time
/// - **Text** ([`structs::text`]): disc text encodings
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Byte views** ([`utils::bytes`]): bounds-checked big-endian reads
/// - **Bitstream I/O** ([`utils::bitstream_io`]): bit-level field reads
/// - **Cache advice** ([`utils::cache`]): page cache hints during streaming
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;

/// Size of one DVD sector in bytes. The VRO is addressed in whole sectors.
pub const SECTOR_SIZE: u64 = 2048;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
