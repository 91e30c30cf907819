use std::fs::{File, FileTimes, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use chrono::{Local, TimeZone};

use dvdvr::structs::program::ProgramDescriptor;
use dvdvr::structs::timestamp::RecordingTime;

/// `--name` value selecting standard output.
pub const STDOUT_NAME: &str = "-";

/// Where extracted programs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Files(OutputNamer),
}

impl Destination {
    pub fn new(name: Option<&str>, dir: &Path) -> Self {
        match name {
            Some(STDOUT_NAME) => Destination::Stdout,
            base => Destination::Files(OutputNamer::new(dir, base.map(str::to_string))),
        }
    }
}

/// Picks and creates output files without ever overwriting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    dir: PathBuf,
    base: Option<String>,
}

impl OutputNamer {
    pub fn new(dir: &Path, base: Option<String>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base,
        }
    }

    /// Creates the output file for `program`.
    ///
    /// Without a base name the file is named after the recording time (or the
    /// current time when unset). If that exists, the program number is
    /// appended once. With a base name the number is always part of it.
    pub fn create(&self, program: &ProgramDescriptor) -> Result<(PathBuf, File)> {
        let number = program.number;

        if let Some(base) = &self.base {
            let path = self.dir.join(format!("{base}#{number:03}.vob"));
            return create_new(&path)
                .with_context(|| format!("Failed to create {}", path.display()))
                .map(|file| (path, file));
        }

        let stem = match program.recorded {
            Some(time) => time_stem(&time),
            None => Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
        };

        let path = self.dir.join(format!("{stem}.vob"));
        match create_new(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, adding program number", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        }

        let path = self.dir.join(format!("{stem}#{number:03}.vob"));
        create_new(&path)
            .with_context(|| format!("Failed to create {}", path.display()))
            .map(|file| (path, file))
    }
}

fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// "YYYY-MM-DD_HH-MM-SS", from the raw fields so odd dates still get a name.
fn time_stem(time: &RecordingTime) -> String {
    format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        time.year, time.month, time.day, time.hour, time.minute, time.second
    )
}

/// Sets access and modification time of `file` to the recording time,
/// interpreted as local time.
pub fn touch(file: &File, time: &RecordingTime) -> Result<()> {
    let Some(naive) = time.to_naive() else {
        bail!("Recording time {time} is not a valid date");
    };
    let Some(local) = Local.from_local_datetime(&naive).earliest() else {
        bail!("Recording time {time} does not exist in the local time zone");
    };

    let when = SystemTime::from(local);
    let times = FileTimes::new().set_accessed(when).set_modified(when);
    file.set_times(times)?;
    Ok(())
}
