//! Capture sources.
//!
//! The engine makes 2-4 forward passes per run; a source hands out a fresh
//! forward-only iterator per pass. Sources never need random access.

use std::fs::File;
use std::path::{Path, PathBuf};

use pcap_file::pcap::PcapReader;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// One capture record: raw bytes plus sequencing metadata.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Zero-based position in the capture.
    pub index: u64,
    pub data: Vec<u8>,
    /// Original on-air length; the stored data may be truncated below it.
    pub orig_len: u32,
}

/// A capture the engine can traverse repeatedly. Each `frames()` call
/// starts a fresh pass from the beginning.
pub trait FrameSource {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>>;
}

/// File-backed source reading the classic pcap format.
pub struct PcapFileSource {
    path: PathBuf,
}

impl PcapFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FrameSource for PcapFileSource {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>> {
        let file = File::open(&self.path).map_err(|e| {
            AnalysisError::SourceUnreadable(format!("{}: {e}", self.path.display()))
        })?;
        let reader = PcapReader::new(file)
            .map_err(|e| AnalysisError::SourceUnreadable(format!("{}: {e}", self.path.display())))?;
        Ok(Box::new(PcapIter { reader, index: 0 }))
    }
}

struct PcapIter {
    reader: PcapReader<File>,
    index: u64,
}

impl Iterator for PcapIter {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        match self.reader.next_packet()? {
            Ok(packet) => {
                let frame = RawFrame {
                    index: self.index,
                    data: packet.data.into_owned(),
                    orig_len: packet.orig_len,
                };
                self.index += 1;
                Some(frame)
            }
            // A corrupt record ends the pass; everything read so far has
            // already been handed out.
            Err(e) => {
                debug!(error = %e, index = self.index, "stopping pass on malformed pcap record");
                None
            }
        }
    }
}

/// In-memory source, used by tests and embedders that already hold the
/// frames.
pub struct MemorySource {
    frames: Vec<Vec<u8>>,
}

impl MemorySource {
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        Self { frames }
    }
}

impl FrameSource for MemorySource {
    fn frames(&mut self) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>> {
        Ok(Box::new(self.frames.iter().enumerate().map(
            |(index, data)| RawFrame {
                index: index as u64,
                data: data.clone(),
                orig_len: data.len() as u32,
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_supports_repeat_passes() {
        let mut source = MemorySource::new(vec![vec![1, 2, 3], vec![4, 5]]);
        for _ in 0..3 {
            let frames: Vec<RawFrame> = source.frames().unwrap().collect();
            assert_eq!(frames.len(), 2);
            assert_eq!(frames[0].index, 0);
            assert_eq!(frames[1].data, vec![4, 5]);
        }
    }

    #[test]
    fn missing_file_is_source_unreadable() {
        let mut source = PcapFileSource::new("/nonexistent/capture.pcap");
        let err = source.frames().err().expect("open must fail");
        assert!(matches!(err, AnalysisError::SourceUnreadable(_)));
    }
}
