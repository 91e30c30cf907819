//! Bounds-checked big-endian reads over the IFO buffer.
//!
//! Records are never overlaid on memory. Each field is read at an explicit
//! offset and converted to host order on the way out.

use crate::utils::errors::FormatError;

/// A window into the IFO buffer starting at an absolute offset.
///
/// Offsets passed to the readers are relative to the start of the window;
/// errors report the absolute offset.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    base: usize,
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, base: 0 }
    }

    /// Returns a view starting `offset` bytes into this one.
    pub fn at(&self, offset: usize) -> Result<Self, FormatError> {
        let absolute = self.base.saturating_add(offset);
        if absolute > self.data.len() {
            return Err(self.truncated(offset, 0));
        }

        Ok(Self {
            data: self.data,
            base: absolute,
        })
    }

    /// Absolute position of the start of this view.
    pub fn position(&self) -> usize {
        self.base
    }

    pub fn bytes(&self, offset: usize, width: usize) -> Result<&'a [u8], FormatError> {
        let start = self.base.saturating_add(offset);
        let end = start.saturating_add(width);
        if end > self.data.len() {
            return Err(self.truncated(offset, width));
        }

        Ok(&self.data[start..end])
    }

    pub fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&self, offset: usize) -> Result<u8, FormatError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    #[inline]
    pub fn read_u16be(&self, offset: usize) -> Result<u16, FormatError> {
        Ok(u16::from_be_bytes(self.array(offset)?))
    }

    #[inline]
    pub fn read_u32be(&self, offset: usize) -> Result<u32, FormatError> {
        Ok(u32::from_be_bytes(self.array(offset)?))
    }

    fn truncated(&self, offset: usize, width: usize) -> FormatError {
        FormatError::Truncated {
            offset: self.base.saturating_add(offset),
            width,
            len: self.data.len(),
        }
    }
}
