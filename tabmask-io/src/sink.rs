//! Output destinations for redacted payloads

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tabmask_codec::Payload;

/// Where a redacted payload goes
#[derive(Debug)]
pub enum OutputSink {
    /// Create or truncate a file
    Path(PathBuf),
    /// Process standard output
    Stdout,
    /// Collect in memory
    Memory(Vec<u8>),
}

impl OutputSink {
    /// Write the payload's raw bytes
    pub fn write(&mut self, payload: &Payload) -> io::Result<()> {
        match self {
            OutputSink::Path(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                writer.write_all(payload.data())?;
                writer.flush()
            }
            OutputSink::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(payload.data())?;
                lock.flush()
            }
            OutputSink::Memory(buf) => {
                buf.extend_from_slice(payload.data());
                Ok(())
            }
        }
    }

    /// Collected bytes of a memory sink
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            OutputSink::Memory(buf) => Some(buf),
            _ => None,
        }
    }
}
