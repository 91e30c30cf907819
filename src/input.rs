use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Reads the navigation file from disk, or from stdin when the path is "-".
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
}

impl InputReader {
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let input_path = input_path.as_ref();
        let is_pipe = input_path == Path::new("-");

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)
                .with_context(|| format!("Failed to open {}", input_path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_file_contents() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"DVD_RTR_VMG0")?;

        let mut reader = InputReader::new(file.path())?;
        assert!(!reader.is_pipe());

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        assert_eq!(data, b"DVD_RTR_VMG0");
        Ok(())
    }

    #[test]
    fn missing_file_names_path() {
        let err = InputReader::new("/nonexistent/VR_MANGR.IFO").err().unwrap();
        assert!(err.to_string().contains("VR_MANGR.IFO"));
    }
}
