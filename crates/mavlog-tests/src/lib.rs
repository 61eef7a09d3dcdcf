//! End-to-end tests for mavlog
//!
//! The tests drive `AutoLog` with the real file-backed loggers and read the
//! produced `.tlog` files back.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mavlog-tests
//! ```
//!
//! # Test Structure
//!
//! - `e2e_test.rs` - Gate, loggers and capture files together
//! - `replay_test.rs` - Captures replayed through a fresh gate

use std::fs;
use std::path::{Path, PathBuf};

use mavlog_replay::CaptureReader;

/// Build an in-memory capture from `frames`, one millisecond apart
pub fn capture_bytes(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        let timestamp = 1_700_000_000_000_000u64 + i as u64 * 1_000;
        out.extend_from_slice(&timestamp.to_be_bytes());
        out.extend_from_slice(frame);
    }
    out
}

/// Frames stored in a capture file, in order
pub fn read_frames(path: &Path) -> Vec<Vec<u8>> {
    let data = fs::read(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    CaptureReader::new(&data)
        .map(|record| match record {
            Ok(record) => record.frame.to_vec(),
            Err(e) => panic!("bad capture {}: {}", path.display(), e),
        })
        .collect()
}

/// `.tlog` files in `dir`, sorted by name. A missing directory is empty.
pub fn log_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("tlog"))
        .collect();
    files.sort();
    files
}
