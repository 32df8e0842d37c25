//! Ingestion: the scan step and the thread that drives it.
//!
//! One scan step reads one raw line, decodes and classifies it, folds it into the
//! group index and produces a fresh snapshot. The read happens outside the index
//! lock; everything after it happens under the lock, so snapshots come out in the
//! same order as the lines that produced them.

use crate::classify::{self, Classification};
use crate::config::Rules;
use crate::index::{GroupIndex, Snapshot};
use crate::parser::{decode, DecodeResult};
use crate::source::LineSource;
use chrono::Utc;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Events the ingestion thread may queue ahead of the UI before it blocks.
///
/// Each event carries a whole snapshot, so the bound caps memory held by a
/// stalled UI; the blocked thread in turn stops reading its input.
pub const QUEUE_DEPTH: usize = 64;

/// The bounded channel between the ingestion thread and the UI.
pub fn channel() -> (SyncSender<IngestEvent>, Receiver<IngestEvent>) {
    mpsc::sync_channel(QUEUE_DEPTH)
}

/// Message from the ingestion thread to the UI.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// One more line was ingested.
    Scanned {
        /// All groups after this line.
        snapshot: Snapshot,
        /// Status text produced by this line, if any.
        status: Option<String>,
    },
    /// The input stream ended or failed. No further events follow.
    Disconnected,
}

/// Decode and classify one raw line.
pub fn classify_line(raw: &str, rules: &Rules) -> Classification {
    let now = Utc::now();
    match decode(raw) {
        DecodeResult::Structured(record) => classify::classify_at(record, rules, now),
        DecodeResult::PlainText => classify::plain_text(raw, now),
        DecodeResult::Malformed { raw, error } => {
            tracing::warn!(error = %error, "Malformed JSON line");
            classify::malformed(&raw, &error, now)
        }
    }
}

/// Perform exactly one read and fold the result into `index`.
///
/// Returns [`IngestEvent::Disconnected`] at end of stream or on a read error.
pub fn scan_step<S: LineSource + ?Sized>(
    source: &mut S,
    index: &Mutex<GroupIndex>,
    rules: &Rules,
) -> IngestEvent {
    let raw = match source.next_line() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::info!("Input stream ended");
            return IngestEvent::Disconnected;
        }
        Err(e) => {
            tracing::info!(error = %e, "Input stream failed");
            return IngestEvent::Disconnected;
        }
    };

    let mut index = index.lock().unwrap_or_else(PoisonError::into_inner);
    let Classification {
        key,
        title,
        description,
        status,
        line,
    } = classify_line(&raw, rules);
    index.upsert(key, title, description, line);

    IngestEvent::Scanned {
        snapshot: index.snapshot(),
        status,
    }
}

/// Owns the source and drives scan steps on a dedicated thread.
pub struct Ingestor<S> {
    source: S,
    index: Arc<Mutex<GroupIndex>>,
    rules: Arc<Rules>,
}

impl<S: LineSource + 'static> Ingestor<S> {
    /// Ingestor over a fresh index.
    pub fn new(source: S, rules: Arc<Rules>) -> Self {
        Self::with_index(source, Arc::new(Mutex::new(GroupIndex::new())), rules)
    }

    /// Ingestor over an existing index.
    pub fn with_index(source: S, index: Arc<Mutex<GroupIndex>>, rules: Arc<Rules>) -> Self {
        Self {
            source,
            index,
            rules,
        }
    }

    /// Shared handle to the index.
    pub fn index(&self) -> Arc<Mutex<GroupIndex>> {
        Arc::clone(&self.index)
    }

    /// Snapshot of the index as it is now.
    pub fn snapshot(&self) -> Snapshot {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Run one scan step on the calling thread.
    pub fn step(&mut self) -> IngestEvent {
        scan_step(&mut self.source, &self.index, &self.rules)
    }

    /// Run scan steps until the stream ends or the receiver is dropped.
    ///
    /// Sends exactly one [`IngestEvent::Disconnected`] when the stream ends.
    /// Blocks while the channel is full.
    pub fn run(&mut self, tx: &SyncSender<IngestEvent>) {
        loop {
            let event = self.step();
            let disconnected = matches!(event, IngestEvent::Disconnected);

            if tx.send(event).is_err() {
                tracing::debug!("UI receiver dropped, stopping ingestion");
                return;
            }
            if disconnected {
                return;
            }
        }
    }

    /// Move the ingestor onto its own thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be created.
    pub fn spawn(mut self, tx: SyncSender<IngestEvent>) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("logweave-ingest".to_string())
            .spawn(move || self.run(&tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::model::GroupKey;
    use crate::source::StdinSource;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn rules() -> Arc<Rules> {
        Arc::new(Rules::compile(&ResolvedConfig::default()).expect("defaults compile"))
    }

    fn source(data: &'static str) -> StdinSource<&'static [u8]> {
        StdinSource::from_reader(data.as_bytes())
    }

    #[test]
    fn scan_step_folds_one_line() {
        let index = Mutex::new(GroupIndex::new());
        let mut input = source("{\"request_id\":\"r1\",\"msg\":\"hi\"}\n");

        let IngestEvent::Scanned { snapshot, status } = scan_step(&mut input, &index, &rules())
        else {
            panic!("expected a scanned event");
        };

        assert_eq!(status, None);
        let position = snapshot.position(&GroupKey::value("r1")).expect("group created");
        assert_eq!(snapshot.groups()[position].len(), 1);
    }

    #[test]
    fn scan_step_reads_exactly_one_line() {
        let index = Mutex::new(GroupIndex::new());
        let mut input = source("a\nb\n");

        scan_step(&mut input, &index, &rules());
        let text_lines = index
            .lock()
            .expect("not poisoned")
            .get(&GroupKey::PlainText)
            .map(|g| g.len());
        assert_eq!(text_lines, Some(1));
    }

    #[test]
    fn scan_step_reports_disconnect_at_eof() {
        let index = Mutex::new(GroupIndex::new());
        let mut input = source("");
        assert!(matches!(
            scan_step(&mut input, &index, &rules()),
            IngestEvent::Disconnected
        ));
    }

    #[test]
    fn malformed_and_plain_lines_go_to_reserved_groups() {
        let index = Mutex::new(GroupIndex::new());
        let mut input = source("plain\n{oops\n");
        let rules = rules();

        scan_step(&mut input, &index, &rules);
        scan_step(&mut input, &index, &rules);

        let index = index.lock().expect("not poisoned");
        assert_eq!(index.get(&GroupKey::PlainText).map(|g| g.len()), Some(1));
        assert_eq!(index.get(&GroupKey::ParseFailures).map(|g| g.len()), Some(1));
    }

    #[test]
    fn spawned_ingestor_sends_one_event_per_line_then_disconnects() {
        let (tx, rx) = channel();
        let ingestor = Ingestor::new(source("one\ntwo\nthree\n"), rules());
        let handle = ingestor.spawn(tx).expect("thread spawns");

        let mut scanned = 0;
        loop {
            match rx
                .recv_timeout(Duration::from_secs(5))
                .expect("event arrives")
            {
                IngestEvent::Scanned { .. } => scanned += 1,
                IngestEvent::Disconnected => break,
            }
        }

        assert_eq!(scanned, 3);
        handle.join().expect("thread exits cleanly");
        assert!(rx.recv().is_err(), "nothing after Disconnected");
    }

    #[test]
    fn stalled_receiver_bounds_the_backlog() {
        let input: String = (0..1000)
            .map(|i| format!("{{\"request_id\":\"r{i}\",\"msg\":\"m\"}}\n"))
            .collect();
        let ingestor = Ingestor::new(StdinSource::from_reader(Cursor::new(input.into_bytes())), rules());
        let index = ingestor.index();
        let keyed_groups = || index.lock().expect("not poisoned").len() - 2;

        let (tx, rx) = channel();
        let handle = ingestor.spawn(tx).expect("thread spawns");

        // Full queue plus the one event blocked in `send`.
        let bound = QUEUE_DEPTH + 1;
        let deadline = Instant::now() + Duration::from_secs(5);
        while keyed_groups() < bound && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(50));
        assert_eq!(keyed_groups(), bound, "ingestion waits for the UI");

        let events = rx.iter().count();
        assert_eq!(events, 1001, "every line plus the disconnect still arrives");
        handle.join().expect("thread exits cleanly");
    }

    #[test]
    fn snapshots_grow_monotonically() {
        let mut ingestor = Ingestor::new(source("a\nb\n"), rules());
        let mut sizes = Vec::new();
        while let IngestEvent::Scanned { snapshot, .. } = ingestor.step() {
            let position = snapshot.position(&GroupKey::PlainText).expect("reserved");
            sizes.push(snapshot.groups()[position].len());
        }
        assert_eq!(sizes, vec![1, 2]);
    }
}
