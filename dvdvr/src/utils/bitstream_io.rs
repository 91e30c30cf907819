//! Bit-level reads for packed timestamp fields.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

/// Reads fixed-width unsigned fields, most significant bit first.
#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R) -> Self {
        Self {
            bs: BitReader::new(read),
        }
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        match self.bs.read_unsigned_var(n) {
            Ok(val) => Ok(val),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "get_n({}): out of bounds bits at {}",
                    n,
                    self.bs.position_in_bits().unwrap_or(0)
                ),
            )),
            Err(e) => Err(e),
        }
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::new(io::Cursor::new(buf))
    }
}

#[test]
fn reads_fields_across_byte_boundaries() -> io::Result<()> {
    let data = [0b1010_1100, 0b0111_0001];
    let mut reader = BsIoSliceReader::from_slice(&data);

    assert_eq!(reader.get_n::<u8>(4)?, 0b1010);
    assert_eq!(reader.get_n::<u16>(6)?, 0b1100_01);
    assert_eq!(reader.get_n::<u8>(2)?, 0b11);
    assert_eq!(reader.get_n::<u8>(4)?, 0b0001);
    assert!(reader.get_n::<u8>(1).is_err());
    Ok(())
}
