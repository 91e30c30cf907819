//! Fixed-layout records of the DVD-VR navigation file.
//!
//! Each record is decoded from a [`ByteView`](crate::utils::bytes::ByteView)
//! into plain host-order values. Packed bitfields are kept raw on the record
//! and decoded on demand by [`attributes`], [`timestamp`] and [`text`].

pub mod attributes;
pub mod program;
pub mod program_info;
pub mod program_set;
pub mod root;
pub mod text;
pub mod timestamp;
