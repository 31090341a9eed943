use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Lines kept by `RunLog::new`; older lines are dropped first.
pub const DEFAULT_MAX_LINES: usize = 10_000;

/// Append-only log shared by the runner, the rainbow panel and readers.
///
/// Cloning yields another handle onto the same lines. Each appended line is
/// also forwarded to live subscribers; a subscriber that falls behind misses
/// lines on its channel but can always re-read `lines()`. Only the newest
/// `max_lines` are kept.
#[derive(Clone)]
pub struct RunLog {
    lines: Arc<Mutex<VecDeque<String>>>,
    max_lines: usize,
    tx: broadcast::Sender<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::with_max_lines(DEFAULT_MAX_LINES)
    }

    pub fn with_max_lines(max_lines: usize) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::new())),
            max_lines: max_lines.max(1),
            tx,
        }
    }

    pub fn append(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "botblocks::log", "{line}");
        {
            let mut lines = self.guard();
            if lines.len() >= self.max_lines {
                lines.pop_front();
            }
            lines.push_back(line.clone());
        }
        // No receivers is fine.
        let _ = self.tx.send(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.guard().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<String>> {
        // A panic while holding the lock cannot leave the lines torn.
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").field("lines", &self.len()).finish()
    }
}
