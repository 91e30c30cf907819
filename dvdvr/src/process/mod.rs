/// Loading of the navigation file and resolution of its relative offsets.
///
/// Provides [`Ifo`](ifo::Ifo), which owns the IFO buffer and decodes tables
/// on access.
pub mod ifo;

/// Program-set label lookup by program number.
pub mod label;

/// Streaming of a program's VOBUs from the VRO.
///
/// Provides the [`Extractor`](extract::Extractor), which copies unit by unit
/// and survives read faults inside a unit.
pub mod extract;
