//! Timestamped capture file writer shared by the flight-stack endpoints

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, Utc};
use mavlog_core::{
    EndpointError, EndpointResult, EndpointStatistics, LogConfig, LogMode, TrafficCounters,
};
use mavlog_proto::{component_id, Heartbeat, MavlinkHeader};
use tracing::{debug, info, warn};

use crate::loggers::FlightStack;

/// Size of the timestamp prefix of every capture record
pub const TIMESTAMP_LEN: usize = 8;

const CAPTURE_EXTENSION: &str = "tlog";

/// Writes forwarded packets to a capture file according to the log mode
pub struct CaptureWriter {
    name: String,
    stack: FlightStack,
    config: Arc<LogConfig>,
    target_system_id: u8,
    file: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    record: Vec<u8>,
    armed: bool,
    stopped: bool,
    received: TrafficCounters,
    written: TrafficCounters,
    dropped: u64,
    files_opened: u32,
}

impl CaptureWriter {
    pub fn new(stack: FlightStack, config: Arc<LogConfig>, target_system_id: u8) -> Self {
        Self {
            name: format!("{}-log", stack.tag()),
            stack,
            config,
            target_system_id,
            file: None,
            path: None,
            record: Vec::new(),
            armed: false,
            stopped: false,
            received: TrafficCounters::default(),
            written: TrafficCounters::default(),
            dropped: 0,
            files_opened: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flight_stack(&self) -> FlightStack {
        self.stack
    }

    pub fn target_system_id(&self) -> u8 {
        self.target_system_id
    }

    /// Path of the open capture file, if any
    pub fn current_file(&self) -> Option<&Path> {
        self.file.as_ref().and(self.path.as_deref())
    }

    /// Last arming state reported by the target autopilot
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        if self.stopped {
            return Err(EndpointError::Stopped(self.name.clone()));
        }
        self.received.record(packet.len());

        match self.config.mode {
            LogMode::Disabled => {}
            LogMode::Always => {
                if self.file.is_none() {
                    self.open()?;
                }
            }
            LogMode::WhileArmed => self.track_arming(packet)?,
        }

        match self.file.as_mut() {
            Some(file) => {
                let timestamp = Utc::now().timestamp_micros().max(0) as u64;
                if let Err(e) = write_record(file, &mut self.record, timestamp, packet) {
                    // A partial record can only ever be the last one of a file
                    warn!(logger = %self.name, error = %e, "Log write failed, closing file");
                    self.file = None;
                    self.dropped += 1;
                    return Err(e.into());
                }
                self.written.record(packet.len());
            }
            None => self.dropped += 1,
        }

        // The disarming heartbeat is the last record of its file
        if self.config.mode == LogMode::WhileArmed && !self.armed && self.file.is_some() {
            self.close()?;
        }

        Ok(packet.len())
    }

    /// Follow the arming flag of the target autopilot's heartbeats
    fn track_arming(&mut self, packet: &[u8]) -> EndpointResult<()> {
        let Ok(header) = MavlinkHeader::parse(packet) else {
            return Ok(());
        };
        if header.system_id() != self.target_system_id
            || header.component_id() != component_id::AUTOPILOT1
        {
            return Ok(());
        }
        let Some(heartbeat) = Heartbeat::from_header(&header) else {
            return Ok(());
        };

        let armed = heartbeat.is_armed();
        if armed != self.armed {
            info!(
                logger = %self.name,
                system_id = self.target_system_id,
                armed,
                "Vehicle arming state changed"
            );
            self.armed = armed;
        }
        if self.armed && self.file.is_none() {
            self.open()?;
        }
        Ok(())
    }

    fn open(&mut self) -> EndpointResult<()> {
        fs::create_dir_all(&self.config.logs_dir)?;
        self.rotate();

        let stem = format!(
            "{}-{}",
            Local::now().format("%Y-%m-%d_%H-%M-%S"),
            self.stack.tag()
        );
        let (file, path) = create_unique(&self.config.logs_dir, &stem)?;

        info!(logger = %self.name, path = %path.display(), "Opened log file");
        self.file = Some(BufWriter::new(file));
        self.path = Some(path);
        self.files_opened += 1;
        Ok(())
    }

    fn close(&mut self) -> EndpointResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            if let Some(path) = &self.path {
                info!(logger = %self.name, path = %path.display(), "Closed log file");
            }
        }
        Ok(())
    }

    /// Remove the oldest captures so that opening one more keeps the
    /// directory within `max_log_files`
    fn rotate(&self) {
        let max = self.config.max_log_files;
        if max == 0 {
            return;
        }

        let mut captures = match list_captures(&self.config.logs_dir) {
            Ok(captures) => captures,
            Err(e) => {
                warn!(dir = %self.config.logs_dir.display(), error = %e, "Failed to list log directory");
                return;
            }
        };
        if captures.len() < max {
            return;
        }

        // Names start with the creation time; same-second files are ordered
        // by their numeric suffix
        captures.sort_by_cached_key(|path| capture_key(path));
        let excess = captures.len() + 1 - max;
        for path in captures.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "Removed old log file"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old log file"),
            }
        }
    }

    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        if let Err(e) = self.close() {
            warn!(logger = %self.name, error = %e, "Failed to flush log file on stop");
        }
        self.stopped = true;
        debug!(logger = %self.name, "Logger stopped");
    }

    pub fn statistics(&self) -> EndpointStatistics {
        EndpointStatistics {
            endpoint: self.name.clone(),
            received: self.received,
            written: self.written,
            dropped: self.dropped,
            files_opened: self.files_opened,
            log_file: self.path.clone(),
        }
    }

    pub fn report_statistics(&self) -> EndpointStatistics {
        let stats = self.statistics();
        stats.log();
        stats
    }
}

fn list_captures(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut captures = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(CAPTURE_EXTENSION)
        {
            captures.push(path);
        }
    }
    Ok(captures)
}

/// Split a capture file name into its stem and `_<n>` suffix (0 if none)
fn capture_key(path: &Path) -> (String, u32) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some((base, suffix)) = stem.rsplit_once('_') {
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(attempt) = suffix.parse() {
                return (base.to_string(), attempt);
            }
        }
    }
    (stem, 0)
}

/// Write one timestamped record with a single `write_all`
fn write_record<W: Write>(
    out: &mut W,
    scratch: &mut Vec<u8>,
    timestamp_us: u64,
    packet: &[u8],
) -> io::Result<()> {
    scratch.clear();
    scratch.extend_from_slice(&timestamp_us.to_be_bytes());
    scratch.extend_from_slice(packet);
    out.write_all(scratch)
}

/// Create `<stem>.tlog`, or `<stem>_<n>.tlog` past the highest existing
/// suffix for `stem`
fn create_unique(dir: &Path, stem: &str) -> io::Result<(File, PathBuf)> {
    let mut attempt = list_captures(dir)
        .unwrap_or_default()
        .iter()
        .map(|path| capture_key(path))
        .filter(|(base, _)| base == stem)
        .map(|(_, n)| n + 1)
        .max()
        .unwrap_or(0);
    loop {
        let name = if attempt == 0 {
            format!("{}.{}", stem, CAPTURE_EXTENSION)
        } else {
            format!("{}_{}.{}", stem, attempt, CAPTURE_EXTENSION)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlog_proto::testing::{heartbeat_with_mode, FrameBuilder};
    use mavlog_proto::{mode_flag, MavlinkVersion};
    use pretty_assertions::assert_eq;

    fn config(dir: &Path, mode: LogMode) -> Arc<LogConfig> {
        Arc::new(LogConfig {
            logs_dir: dir.to_path_buf(),
            mode,
            ..Default::default()
        })
    }

    fn attitude(system_id: u8) -> Vec<u8> {
        FrameBuilder::new(MavlinkVersion::V2, 30)
            .system(system_id)
            .payload(&[1; 28])
            .build()
    }

    fn armed_heartbeat(armed: bool) -> Vec<u8> {
        let base_mode = if armed { mode_flag::SAFETY_ARMED } else { 0 };
        heartbeat_with_mode(MavlinkVersion::V2, 1, 1, 12, base_mode)
    }

    #[test]
    fn test_always_mode_writes_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::Always), 1);

        let packet = attitude(1);
        assert_eq!(writer.write_msg(&packet).unwrap(), packet.len());
        assert_eq!(writer.write_msg(&packet).unwrap(), packet.len());

        let path = writer.current_file().unwrap().to_path_buf();
        writer.stop();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 2 * (TIMESTAMP_LEN + packet.len()));
        assert_eq!(&data[TIMESTAMP_LEN..TIMESTAMP_LEN + packet.len()], packet.as_slice());

        let stats = writer.statistics();
        assert_eq!(stats.written.packets, 2);
        assert_eq!(stats.files_opened, 1);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_file_name_carries_flight_stack() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            CaptureWriter::new(FlightStack::ArduPilot, config(dir.path(), LogMode::Always), 1);
        writer.write_msg(&attitude(1)).unwrap();

        let name = writer
            .current_file()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(name.ends_with("-ardupilot.tlog"), "unexpected name {}", name);
    }

    #[test]
    fn test_disabled_mode_drops_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::Disabled), 1);

        let packet = attitude(1);
        assert_eq!(writer.write_msg(&packet).unwrap(), packet.len());
        assert!(writer.current_file().is_none());
        assert_eq!(writer.statistics().dropped, 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_while_armed_opens_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::WhileArmed), 1);

        writer.write_msg(&attitude(1)).unwrap();
        assert!(writer.current_file().is_none());

        writer.write_msg(&armed_heartbeat(true)).unwrap();
        assert!(writer.is_armed());
        assert!(writer.current_file().is_some());

        writer.write_msg(&attitude(1)).unwrap();
        writer.write_msg(&armed_heartbeat(false)).unwrap();
        assert!(!writer.is_armed());
        assert!(writer.current_file().is_none());

        writer.write_msg(&attitude(1)).unwrap();

        let stats = writer.statistics();
        assert_eq!(stats.received.packets, 5);
        assert_eq!(stats.written.packets, 3);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.files_opened, 1);
    }

    #[test]
    fn test_while_armed_ignores_other_systems() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::WhileArmed), 1);

        let other = heartbeat_with_mode(MavlinkVersion::V2, 2, 1, 12, mode_flag::SAFETY_ARMED);
        writer.write_msg(&other).unwrap();
        assert!(!writer.is_armed());
        assert!(writer.current_file().is_none());
    }

    #[test]
    fn test_rearming_opens_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::WhileArmed), 1);

        for _ in 0..2 {
            writer.write_msg(&armed_heartbeat(true)).unwrap();
            writer.write_msg(&armed_heartbeat(false)).unwrap();
        }

        assert_eq!(writer.statistics().files_opened, 2);
        assert_eq!(list_captures(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_rotation_keeps_max_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2001-01-01_00-00-00-px4.tlog", "2002-01-01_00-00-00-px4.tlog"] {
            fs::write(dir.path().join(name), b"old").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let config = Arc::new(LogConfig {
            logs_dir: dir.path().to_path_buf(),
            mode: LogMode::Always,
            max_log_files: 2,
            fcu_id: None,
        });
        let mut writer = CaptureWriter::new(FlightStack::Px4, config, 1);
        writer.write_msg(&attitude(1)).unwrap();

        let remaining = list_captures(dir.path()).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(!dir.path().join("2001-01-01_00-00-00-px4.tlog").exists());
        assert!(dir.path().join("2002-01-01_00-00-00-px4.tlog").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_create_unique_avoids_collision() {
        let dir = tempfile::tempdir().unwrap();
        let (_, first) = create_unique(dir.path(), "same").unwrap();
        let (_, second) = create_unique(dir.path(), "same").unwrap();
        assert_eq!(first.file_name().unwrap(), "same.tlog");
        assert_eq!(second.file_name().unwrap(), "same_1.tlog");
    }

    #[test]
    fn test_rotation_orders_suffixes_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let stem = "2001-01-01_00-00-00-px4";
        fs::write(dir.path().join(format!("{}.tlog", stem)), b"old").unwrap();
        for n in 1..=11 {
            fs::write(dir.path().join(format!("{}_{}.tlog", stem, n)), b"old").unwrap();
        }

        let config = Arc::new(LogConfig {
            logs_dir: dir.path().to_path_buf(),
            mode: LogMode::Always,
            max_log_files: 4,
            fcu_id: None,
        });
        let mut writer = CaptureWriter::new(FlightStack::Px4, config, 1);
        writer.write_msg(&attitude(1)).unwrap();

        // The three newest same-second files survive next to the new one
        for n in [9, 10, 11] {
            assert!(dir.path().join(format!("{}_{}.tlog", stem, n)).exists());
        }
        for n in 1..=8 {
            assert!(!dir.path().join(format!("{}_{}.tlog", stem, n)).exists());
        }
        assert!(!dir.path().join(format!("{}.tlog", stem)).exists());
        assert_eq!(list_captures(dir.path()).unwrap().len(), 4);
    }

    #[test]
    fn test_capture_key_splits_numeric_suffix() {
        assert_eq!(
            capture_key(Path::new("2001-01-01_00-00-00-px4_10.tlog")),
            ("2001-01-01_00-00-00-px4".to_string(), 10)
        );
        assert_eq!(
            capture_key(Path::new("2001-01-01_00-00-00-px4.tlog")),
            ("2001-01-01_00-00-00-px4".to_string(), 0)
        );
    }

    #[test]
    fn test_create_unique_continues_after_highest_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("same_4.tlog"), b"").unwrap();
        let (_, path) = create_unique(dir.path(), "same").unwrap();
        assert_eq!(path.file_name().unwrap(), "same_5.tlog");
    }

    /// Records the size of every write, or fails once `fail` is set
    struct RecordingSink {
        calls: Vec<usize>,
        fail: bool,
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.calls.push(buf.len());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_written_as_one_buffer() {
        let mut sink = RecordingSink {
            calls: Vec::new(),
            fail: false,
        };
        let mut scratch = Vec::new();
        let packet = attitude(1);

        write_record(&mut sink, &mut scratch, 7, &packet).unwrap();
        write_record(&mut sink, &mut scratch, 8, &packet).unwrap();
        assert_eq!(
            sink.calls,
            vec![TIMESTAMP_LEN + packet.len(), TIMESTAMP_LEN + packet.len()]
        );
        assert_eq!(&scratch[..TIMESTAMP_LEN], &8u64.to_be_bytes());

        sink.fail = true;
        assert!(write_record(&mut sink, &mut scratch, 9, &packet).is_err());
    }

    #[test]
    fn test_write_after_stop_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CaptureWriter::new(FlightStack::Px4, config(dir.path(), LogMode::Always), 1);
        writer.stop();
        writer.stop();

        let err = writer.write_msg(&attitude(1)).unwrap_err();
        assert!(matches!(err, EndpointError::Stopped(_)));
    }

    #[test]
    fn test_logs_dir_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut writer = CaptureWriter::new(FlightStack::Px4, config(&nested, LogMode::Always), 1);
        writer.write_msg(&attitude(1)).unwrap();
        assert!(nested.is_dir());
    }
}
