//! Page cache hints for long sequential copies.
//!
//! Extraction reads gigabytes once and never again. Advising the kernel to
//! drop what was already copied keeps the rest of the page cache intact.
//! All hints are best effort: failures are logged at trace level and ignored.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

/// A seekable source of VRO sectors.
pub trait SectorSource: Read + Seek {
    /// Hints that `len` bytes starting at `offset` will not be read again.
    fn release_cached(&self, _offset: u64, _len: u64) {}
}

/// A destination for extracted program data.
pub trait SectorSink: Write {
    /// Hints that everything written so far will not be read back.
    fn release_cached(&self) {}
}

impl SectorSource for File {
    fn release_cached(&self, offset: u64, len: u64) {
        fadvise::dont_need(self, offset, len);
    }
}

impl SectorSink for File {
    fn release_cached(&self) {
        fadvise::dont_need(self, 0, 0);
    }
}

impl<T: AsRef<[u8]>> SectorSource for Cursor<T> {}

impl<S: SectorSource + ?Sized> SectorSource for &mut S {
    fn release_cached(&self, offset: u64, len: u64) {
        (**self).release_cached(offset, len);
    }
}

impl SectorSink for Vec<u8> {}
impl SectorSink for io::Stdout {}
impl SectorSink for io::StdoutLock<'_> {}

impl<S: SectorSink + ?Sized> SectorSink for &mut S {
    fn release_cached(&self) {
        (**self).release_cached();
    }
}

impl<S: SectorSink + ?Sized> SectorSink for Box<S> {
    fn release_cached(&self) {
        (**self).release_cached();
    }
}

/// Hints that `file` will be read front to back, enlarging readahead.
pub fn advise_sequential(file: &File) {
    fadvise::sequential(file);
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
mod fadvise {
    use std::fs::File;
    use std::os::fd::AsRawFd;

    use nix::fcntl::{PosixFadviseAdvice, posix_fadvise};

    pub fn dont_need(file: &File, offset: u64, len: u64) {
        advise(file, offset, len, PosixFadviseAdvice::POSIX_FADV_DONTNEED);
    }

    pub fn sequential(file: &File) {
        advise(file, 0, 0, PosixFadviseAdvice::POSIX_FADV_SEQUENTIAL);
    }

    fn advise(file: &File, offset: u64, len: u64, advice: PosixFadviseAdvice) {
        let (Ok(offset), Ok(len)) = (i64::try_from(offset), i64::try_from(len)) else {
            return;
        };

        if let Err(e) = posix_fadvise(file.as_raw_fd(), offset as _, len as _, advice) {
            log::trace!("posix_fadvise({advice:?}) failed: {e}");
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
mod fadvise {
    use std::fs::File;

    pub fn dont_need(_file: &File, _offset: u64, _len: u64) {}

    pub fn sequential(_file: &File) {}
}
