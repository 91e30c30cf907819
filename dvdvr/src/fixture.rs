//! Synthetic IFO images and VRO payloads for tests.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::ops::Range;

use crate::SECTOR_SIZE;
use crate::structs::root::{MAGIC, ROOT_SIZE};
use crate::structs::timestamp::RecordingTime;
use crate::utils::cache::SectorSource;

pub const SAMPLE_TIME: RecordingTime = RecordingTime {
    year: 2024,
    month: 3,
    day: 5,
    hour: 14,
    minute: 30,
    second: 45,
};

/// A valid 512-byte root descriptor with no table pointers set.
pub fn root_bytes(end_address: u32) -> Vec<u8> {
    let mut data = vec![0u8; ROOT_SIZE];
    data[..MAGIC.len()].copy_from_slice(MAGIC);
    data[12..16].copy_from_slice(&end_address.to_be_bytes());
    data[32..34].copy_from_slice(&0x0011u16.to_be_bytes());
    pad_into(&mut data[98..162], b"TEST DISC");
    data
}

fn pad_into(field: &mut [u8], text: &[u8]) {
    field.fill(b' ');
    field[..text.len()].copy_from_slice(text);
}

#[derive(Debug, Clone)]
pub struct ProgramFixture {
    vob_offset: u32,
    sizes: Vec<u16>,
    time_infos: u16,
    adjacent_vob: bool,
    recorded: Option<RecordingTime>,
    vob_format_id: u8,
}

impl ProgramFixture {
    pub fn new(vob_offset: u32, sizes: &[u16]) -> Self {
        Self {
            vob_offset,
            sizes: sizes.to_vec(),
            time_infos: 0,
            adjacent_vob: false,
            recorded: Some(SAMPLE_TIME),
            vob_format_id: 1,
        }
    }

    pub fn time_infos(mut self, count: u16) -> Self {
        self.time_infos = count;
        self
    }

    pub fn adjacent_vob(mut self) -> Self {
        self.adjacent_vob = true;
        self
    }

    pub fn recorded(mut self, recorded: Option<RecordingTime>) -> Self {
        self.recorded = recorded;
        self
    }

    pub fn vob_format_id(mut self, id: u8) -> Self {
        self.vob_format_id = id;
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let flags: u16 = if self.adjacent_vob { 0x0080 } else { 0 };
        out.extend(flags.to_be_bytes());
        out.extend(self.recorded.map(|t| t.to_bytes()).unwrap_or_default());
        out.push(0);
        out.push(self.vob_format_id);
        out.extend(0x0001_0000u32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(0x0002_0000u32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        if self.adjacent_vob {
            out.extend([0xAA; 12]);
        }
        out.extend([0, 0]);

        out.extend(self.time_infos.to_be_bytes());
        out.extend((self.sizes.len() as u16).to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(self.vob_offset.to_be_bytes());
        for _ in 0..self.time_infos {
            out.extend([0x55; 7]);
        }
        for &size in &self.sizes {
            // upper bits of the size word are flags, not size
            out.push(0x12);
            out.extend((size | 0xFC00).to_be_bytes());
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct SetFixture {
    label: String,
    title: Vec<u8>,
    first_program: u16,
    program_count: u8,
}

impl SetFixture {
    pub fn new(label: &str, first_program: u16, program_count: u8) -> Self {
        Self {
            label: label.to_string(),
            title: Vec::new(),
            first_program,
            program_count,
        }
    }

    pub fn title(mut self, title: &[u8]) -> Self {
        self.title = title.to_vec();
        self
    }

    fn encode(&self, id: u16) -> Vec<u8> {
        let mut out = vec![0u8; 140];
        out[1] = self.program_count;
        pad_into(&mut out[2..66], self.label.as_bytes());
        out[66..66 + self.title.len()].copy_from_slice(&self.title);
        out[130..132].copy_from_slice(&id.to_be_bytes());
        out[132..134].copy_from_slice(&self.first_program.to_be_bytes());
        out
    }
}

/// Assembles a complete navigation file: root, one program info table with
/// its descriptors, and an optional program-set table.
#[derive(Debug, Clone)]
pub struct IfoBuilder {
    info_tables: u8,
    text_encoding: u8,
    vob_formats: Vec<(u16, [u8; 3])>,
    programs: Vec<ProgramFixture>,
    program_sets: Vec<SetFixture>,
}

impl Default for IfoBuilder {
    fn default() -> Self {
        Self {
            info_tables: 1,
            text_encoding: 0x00,
            // NTSC 720x480 MPEG2 4:3, AC-3 stereo
            vob_formats: vec![(0x4000, [0x00, 0x01, 0x00])],
            programs: Vec::new(),
            program_sets: Vec::new(),
        }
    }
}

pub struct IfoImage {
    pub data: Vec<u8>,
    pub pgit_offset: usize,
    pub program_offsets: Vec<usize>,
    pub psi_offset: Option<usize>,
}

impl IfoBuilder {
    pub fn info_tables(mut self, count: u8) -> Self {
        self.info_tables = count;
        self
    }

    pub fn text_encoding(mut self, selector: u8) -> Self {
        self.text_encoding = selector;
        self
    }

    pub fn vob_format(mut self, video_attr: u16, audio_attr: [u8; 3]) -> Self {
        self.vob_formats.push((video_attr, audio_attr));
        self
    }

    pub fn replace_vob_formats(mut self, formats: &[(u16, [u8; 3])]) -> Self {
        self.vob_formats = formats.to_vec();
        self
    }

    pub fn program(mut self, program: ProgramFixture) -> Self {
        self.programs.push(program);
        self
    }

    pub fn program_set(mut self, set: SetFixture) -> Self {
        self.program_sets.push(set);
        self
    }

    pub fn build(&self) -> IfoImage {
        let pgit_offset = ROOT_SIZE;

        let mut pgit = vec![0, 0, self.info_tables, self.vob_formats.len() as u8];
        pgit.extend([0; 4]);
        for (video, audio) in &self.vob_formats {
            let mut format = vec![0u8; 60];
            format[0..2].copy_from_slice(&video.to_be_bytes());
            format[2] = 1;
            format[4..7].copy_from_slice(audio);
            pgit.extend(format);
        }
        pgit.extend((self.programs.len() as u16).to_be_bytes());

        let pointers_at = pgit.len();
        pgit.resize(pointers_at + 4 * self.programs.len(), 0);

        let mut program_offsets = Vec::new();
        for (i, program) in self.programs.iter().enumerate() {
            let relative = pgit.len() as u32;
            let at = pointers_at + i * 4;
            pgit[at..at + 4].copy_from_slice(&relative.to_be_bytes());
            program_offsets.push(pgit_offset + relative as usize);
            pgit.extend(program.encode());
        }
        let pgit_end = (pgit.len() - 1) as u32;
        pgit[4..8].copy_from_slice(&pgit_end.to_be_bytes());

        let mut data = root_bytes(0);
        data[67] = self.text_encoding;
        data[256..260].copy_from_slice(&(pgit_offset as u32).to_be_bytes());
        data.extend(pgit);

        let psi_offset = (!self.program_sets.is_empty()).then(|| {
            let offset = data.len();
            let counts = self.program_sets.iter().map(|s| s.program_count as u16);
            let total: u16 = counts.sum();
            data.extend([0, self.program_sets.len() as u8]);
            data.extend(total.to_be_bytes());
            for (i, set) in self.program_sets.iter().enumerate() {
                data.extend(set.encode(i as u16 + 1));
            }
            data[304..308].copy_from_slice(&(offset as u32).to_be_bytes());
            offset
        });

        let end_address = (data.len() - 1) as u32;
        data[12..16].copy_from_slice(&end_address.to_be_bytes());

        IfoImage {
            data,
            pgit_offset,
            program_offsets,
            psi_offset,
        }
    }
}

/// VRO contents of `sectors` sectors; every byte of a sector holds the low
/// byte of its sector number.
pub fn vro_payload(sectors: u64) -> Vec<u8> {
    (0..sectors * SECTOR_SIZE)
        .map(|i| (i / SECTOR_SIZE) as u8)
        .collect()
}

/// An in-memory VRO whose reads fail inside `faulty`.
///
/// A read that starts before the range returns only the bytes up to it.
pub struct FaultySource {
    inner: Cursor<Vec<u8>>,
    faulty: Range<u64>,
}

impl FaultySource {
    pub fn new(data: Vec<u8>, faulty: Range<u64>) -> Self {
        Self {
            inner: Cursor::new(data),
            faulty,
        }
    }
}

impl Read for FaultySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.inner.position();
        if self.faulty.contains(&position) {
            return Err(io::Error::other("injected media error"));
        }

        let limit = if position < self.faulty.start {
            buf.len().min((self.faulty.start - position) as usize)
        } else {
            buf.len()
        };
        self.inner.read(&mut buf[..limit])
    }
}

impl Seek for FaultySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl SectorSource for FaultySource {}

/// A sink that accepts `capacity` bytes and then fails.
pub struct FailingSink {
    pub written: Vec<u8>,
    capacity: usize,
}

impl FailingSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            written: Vec::new(),
            capacity,
        }
    }
}

impl io::Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.written.len();
        if room == 0 {
            return Err(io::Error::other("device full"));
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl crate::utils::cache::SectorSink for FailingSink {}
