use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use hris_core::{Clock, SystemClock};
use hris_events::{NewTrigger, TriggerEvent};

use super::{TriggerStore, TriggerStoreError, newest_first};

/// Durable trigger log: one JSON object per line, appended and flushed before
/// `append` returns.
///
/// The file is replayed into memory on open so reads never touch disk. An
/// unterminated last line (a write torn by a crash) is dropped on open; any
/// other undecodable line makes the log corrupt.
pub struct JsonlTriggerStore {
    path: PathBuf,
    state: Mutex<LogState>,
    clock: Arc<dyn Clock>,
}

struct LogState {
    file: File,
    events: Vec<TriggerEvent>,
}

impl JsonlTriggerStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TriggerStoreError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, TriggerStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let events = replay(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(path = %path.display(), events = events.len(), "opened trigger log");
        Ok(Self {
            path,
            state: Mutex::new(LogState { file, events }),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn replay(path: &Path) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let terminated = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    let (body, tail) = bytes.split_at(terminated);

    let mut events = Vec::new();
    let mut lines = 0;
    for (idx, line) in body.split(|b| *b == b'\n').enumerate() {
        lines = idx;
        if line.trim_ascii().is_empty() {
            continue;
        }
        let event: TriggerEvent = serde_json::from_slice(line).map_err(|e| TriggerStoreError::Corrupt {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        events.push(event);
    }

    if tail.is_empty() {
        return Ok(events);
    }

    // The record was fully written but its newline was not.
    if let Ok(event) = serde_json::from_slice::<TriggerEvent>(tail) {
        OpenOptions::new().append(true).open(path)?.write_all(b"\n")?;
        events.push(event);
        return Ok(events);
    }

    warn!(
        path = %path.display(),
        line = lines + 1,
        bytes = tail.len(),
        "dropping torn trigger record at end of log"
    );
    OpenOptions::new().write(true).open(path)?.set_len(terminated as u64)?;
    Ok(events)
}

/// Where trigger records are written. `File` in production.
trait LogSink: Write {
    fn end(&mut self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn end(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write one record; on failure the sink is cut back to its previous end so
/// a partial record never prefixes the next one.
fn write_record<S: LogSink>(sink: &mut S, record: &[u8]) -> io::Result<()> {
    let before = sink.end()?;
    let written = sink.write_all(record).and_then(|()| sink.flush());
    if let Err(e) = written {
        if let Err(rollback) = sink.truncate(before) {
            warn!(error = %rollback, "could not roll back partial trigger record");
        }
        return Err(e);
    }
    Ok(())
}

impl core::fmt::Debug for JsonlTriggerStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonlTriggerStore")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TriggerStore for JsonlTriggerStore {
    fn append(&self, trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError> {
        let mut state = self.state.lock().map_err(|_| TriggerStoreError::Poisoned)?;

        let sequence = state.events.last().map(|e| e.sequence).unwrap_or(0) + 1;
        let event = TriggerEvent::commit(trigger, sequence, self.clock.now());

        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        write_record(&mut state.file, &line)?;

        // Only visible to readers once it is on disk.
        state.events.push(event.clone());
        Ok(event)
    }

    fn recent(&self, limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
        let state = self.state.lock().map_err(|_| TriggerStoreError::Poisoned)?;
        Ok(newest_first(&state.events, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hris_core::{EmployeeId, ManualClock};
    use hris_events::TriggerKind;

    #[test]
    fn events_survive_reopen_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/triggers.jsonl");
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 9, 30, 9, 0, 0).unwrap()));

        {
            let store = JsonlTriggerStore::open_with_clock(&path, clock.clone()).unwrap();
            for n in 1..=3 {
                store
                    .append(
                        NewTrigger::new(TriggerKind::HighAbsence, format!("Employee {n} (E10{n}) has 7 absences."))
                            .for_employee(EmployeeId::from_counter("E", 100 + n)),
                    )
                    .unwrap();
                clock.advance(Duration::seconds(1));
            }
        }

        let reopened = JsonlTriggerStore::open_with_clock(&path, clock.clone()).unwrap();
        assert_eq!(reopened.len(), 3);

        let next = reopened.append(NewTrigger::new(TriggerKind::PayrollAnomaly, "p")).unwrap();
        assert_eq!(next.sequence, 4);

        let recent = reopened.recent(2).unwrap();
        assert_eq!(recent[0].sequence, 4);
        assert_eq!(recent[1].employee_id, Some(EmployeeId::from("E103")));
    }

    #[test]
    fn corrupt_line_is_reported_with_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.jsonl");
        fs::write(&path, "\n{not json}\n").unwrap();

        match JsonlTriggerStore::open(&path) {
            Err(TriggerStoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt log, got {other:?}"),
        }
    }

    fn two_events(path: &Path) -> Vec<TriggerEvent> {
        let store = JsonlTriggerStore::open(path).unwrap();
        let a = store.append(NewTrigger::new(TriggerKind::HighAbsence, "a")).unwrap();
        let b = store.append(NewTrigger::new(TriggerKind::PayrollAnomaly, "b")).unwrap();
        vec![a, b]
    }

    #[test]
    fn torn_last_line_is_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.jsonl");
        let written = two_events(&path);
        let intact_len = fs::metadata(&path).unwrap().len();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"id\":\"0190").unwrap();
        drop(file);

        let store = JsonlTriggerStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);

        let next = store.append(NewTrigger::new(TriggerKind::HighAttritionRisk, "c")).unwrap();
        assert_eq!(next.sequence, 3);
        drop(store);

        let reopened = JsonlTriggerStore::open(&path).unwrap();
        let mut expected = written;
        expected.push(next);
        let mut all = reopened.recent(usize::MAX).unwrap();
        all.sort_by_key(|e| e.sequence);
        assert_eq!(all, expected);
    }

    #[test]
    fn complete_last_record_without_newline_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.jsonl");
        two_events(&path);

        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.trim_end()).unwrap();

        let store = JsonlTriggerStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        let next = store.append(NewTrigger::new(TriggerKind::HighAbsence, "c")).unwrap();
        assert_eq!(next.sequence, 3);
        drop(store);

        assert_eq!(JsonlTriggerStore::open(&path).unwrap().len(), 3);
    }

    #[test]
    fn bad_line_before_the_end_is_still_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triggers.jsonl");
        two_events(&path);

        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, format!("{{\"id\":\"0190\n{text}")).unwrap();

        match JsonlTriggerStore::open(&path) {
            Err(TriggerStoreError::Corrupt { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected corrupt log, got {other:?}"),
        }
    }

    /// Accepts `capacity` bytes, then fails mid-record.
    struct ShortSink {
        data: Vec<u8>,
        capacity: usize,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogSink for ShortSink {
        fn end(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_no_partial_record() {
        let mut sink = ShortSink {
            data: b"{\"sequence\":1}\n".to_vec(),
            capacity: 24,
        };

        let err = write_record(&mut sink, b"{\"sequence\":2}\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::StorageFull);
        assert_eq!(sink.data, b"{\"sequence\":1}\n");

        sink.capacity = 64;
        write_record(&mut sink, b"{\"sequence\":2}\n").unwrap();
        assert_eq!(sink.data, b"{\"sequence\":1}\n{\"sequence\":2}\n");
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlTriggerStore::open(dir.path().join("fresh.jsonl")).unwrap();
        assert!(store.is_empty());
        assert!(store.recent(10).unwrap().is_empty());
    }
}
