//! Utility functions and supporting infrastructure.
//!
//! Provides bounds-checked byte views, bit-level field reads, page cache
//! hints and the error types shared by the decoders and the extractor.

pub mod bitstream_io;
pub mod bytes;
pub mod cache;
pub mod errors;
