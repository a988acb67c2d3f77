// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded ring of recent tool invocations, retained for post-mortem
//! dumps when a `ToolBug` is raised (§4.1, invariant 5).

use lvmd_core::ExecutionMeta;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub const DEFAULT_CAPACITY: usize = 50;

/// A handle to one in-flight or completed recorder entry. Wrapped in its
/// own mutex so a dump can format a "still running" entry concurrently
/// with the call that is about to complete it (§9 Design Notes).
pub type EntryHandle = Arc<Mutex<ExecutionMeta>>;

pub struct FlightRecorder {
    capacity: usize,
    entries: VecDeque<EntryHandle>,
}

impl FlightRecorder {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: VecDeque::with_capacity(capacity) }
    }

    /// Record a new entry before invocation, evicting the oldest if the
    /// ring is full. Returns the handle so the caller can finalize it.
    pub fn record_started(&mut self, meta: ExecutionMeta) -> EntryHandle {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        let handle = Arc::new(Mutex::new(meta));
        self.entries.push_back(handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders every entry, oldest first, for the post-mortem log line
    /// that accompanies a `ToolBug`.
    pub fn dump(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let meta = entry.lock();
                match &meta.finished {
                    Some(done) => format!(
                        "{} -> exit={} ({:?})",
                        meta.argv_display(),
                        done.exit_code,
                        meta.started_at.elapsed()
                    ),
                    None => format!("{} -> still running", meta.argv_display()),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for FlightRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn meta(arg: &str) -> ExecutionMeta {
        ExecutionMeta::started(vec![arg.to_string()], Instant::now())
    }

    #[test]
    fn evicts_oldest_entry_when_full() {
        let mut recorder = FlightRecorder::new(2);
        recorder.record_started(meta("a"));
        recorder.record_started(meta("b"));
        recorder.record_started(meta("c"));
        assert_eq!(recorder.len(), 2);
        assert!(!recorder.dump().contains('a'));
    }

    #[test]
    fn dump_renders_running_and_finished_entries() {
        let mut recorder = FlightRecorder::new(4);
        let running = recorder.record_started(meta("pvs"));
        let done = recorder.record_started(meta("vgs"));
        done.lock().finish(Instant::now(), 0, String::new(), String::new());
        let dump = recorder.dump();
        assert!(dump.contains("still running"));
        assert!(dump.contains("exit=0"));
        drop(running);
    }
}
