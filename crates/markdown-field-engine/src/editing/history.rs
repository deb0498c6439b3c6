//! Linear undo/redo history.
//!
//! Entries are immutable snapshots of text and selection kept in a `Vec`
//! with a cursor. Recording from the middle of the history drops the redo
//! tail, so the history never branches.

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::{Duration, Instant};

use xi_rope::Rope;

use crate::editing::Document;

/// Quiet period after the last change before it is recorded
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default maximum number of history entries
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Snapshot of the document at one point in history
#[derive(Clone)]
pub struct HistoryEntry {
    buffer: Rope,
    selection: Range<usize>,
}

impl HistoryEntry {
    pub fn new(buffer: Rope, selection: Range<usize>) -> Self {
        Self { buffer, selection }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub(crate) fn buffer(&self) -> &Rope {
        &self.buffer
    }

    /// Rebuild a document from this snapshot
    pub fn to_document(&self) -> Document {
        Document::from_parts(self.buffer.clone(), self.selection.clone())
    }
}

impl From<&Document> for HistoryEntry {
    fn from(doc: &Document) -> Self {
        Self::new(doc.buffer.clone(), doc.selection())
    }
}

impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.selection == other.selection
            && self.buffer.slice_to_cow(0..self.buffer.len())
                == other.buffer.slice_to_cow(0..other.buffer.len())
    }
}

impl fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("text", &self.text())
            .field("selection", &self.selection)
            .finish()
    }
}

/// Undo/redo history with an optional bound on its length
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: Option<usize>,
    max_entries: Option<NonZeroUsize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_HISTORY_LIMIT))
    }
}

impl History {
    /// Create an empty history; `None` keeps every entry for the session
    pub fn new(max_entries: Option<NonZeroUsize>) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            max_entries,
        }
    }

    /// Record the document after the current entry.
    ///
    /// Drops any redo tail first. Returns `false` when the snapshot equals the
    /// current entry and nothing was added.
    pub fn record(&mut self, doc: &Document) -> bool {
        self.push(HistoryEntry::from(doc))
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) -> bool {
        if self.current() == Some(&entry) {
            return false;
        }

        if let Some(current) = self.current {
            self.entries.truncate(current + 1);
        }
        self.entries.push(entry);

        if let Some(max) = self.max_entries {
            let excess = self.entries.len().saturating_sub(max.get());
            if excess > 0 {
                self.entries.drain(..excess);
                log::debug!("history limit {max} reached, dropped {excess} oldest entries");
            }
        }

        self.current = Some(self.entries.len() - 1);
        log::debug!("recorded history entry, {} in total", self.entries.len());
        true
    }

    /// Step back one entry; `None` at the head
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let current = self.current?;
        let previous = current.checked_sub(1)?;
        self.current = Some(previous);
        log::debug!("undo to history entry {}", previous + 1);
        self.entries.get(previous)
    }

    /// Step forward one entry; `None` at the tail
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let current = self.current?;
        let next = current + 1;
        if next >= self.entries.len() {
            return None;
        }
        self.current = Some(next);
        log::debug!("redo to history entry {}", next + 1);
        self.entries.get(next)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }

    /// Zero-based position of the current entry
    pub fn position(&self) -> Option<usize> {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current
            .is_some_and(|index| index + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> Option<NonZeroUsize> {
        self.max_entries
    }
}

/// Cancellable quiet-period timer for history recording.
///
/// The caller supplies the clock: `schedule` on every change, `poll` from the
/// event loop. Each `schedule` pushes the deadline out again, so a burst of
/// edits fires once.
#[derive(Debug, Clone)]
pub struct HistoryDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for HistoryDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl HistoryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        log::trace!("history record scheduled in {:?}", self.delay);
    }

    /// Returns `true` once when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the pending record fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str, selection: Range<usize>) -> Document {
        let mut doc = Document::new(text);
        doc.set_selection(selection);
        doc
    }

    #[test]
    fn test_undo_redo_at_boundaries_are_noops() {
        let mut history = History::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());

        history.record(&doc("a", 1..1));
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.position(), Some(0));
    }

    #[test]
    fn test_round_trip_restores_latest_state() {
        let mut history = History::default();
        let states = [
            doc("", 0..0),
            doc("a", 1..1),
            doc("ab", 2..2),
            doc("**ab**", 2..4),
        ];
        for state in &states {
            assert!(history.record(state));
        }

        let edits = states.len() - 1;
        for _ in 0..edits {
            assert!(history.undo().is_some());
        }
        assert_eq!(history.current().unwrap().to_document(), states[0]);

        for _ in 0..edits {
            assert!(history.redo().is_some());
        }
        let latest = history.current().unwrap();
        assert_eq!(latest.text(), "**ab**");
        assert_eq!(latest.selection(), 2..4);
    }

    #[test]
    fn test_record_after_undo_discards_redo_tail() {
        let mut history = History::default();
        history.record(&doc("one", 3..3));
        history.record(&doc("two", 3..3));
        history.record(&doc("three", 5..5));

        history.undo();
        history.undo();
        history.record(&doc("branch", 6..6));

        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo().unwrap().text(), "one");
    }

    #[test]
    fn test_identical_snapshot_is_not_recorded() {
        let mut history = History::default();
        assert!(history.record(&doc("same", 4..4)));
        assert!(!history.record(&doc("same", 4..4)));
        assert!(history.record(&doc("same", 0..4)));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_bounded_history_drops_oldest() {
        let mut history = History::new(NonZeroUsize::new(2));
        history.record(&doc("1", 0..0));
        history.record(&doc("2", 0..0));
        history.record(&doc("3", 0..0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap().text(), "3");
        assert_eq!(history.undo().unwrap().text(), "2");
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_edits() {
        let mut history = History::new(None);
        let mut live = doc("original", 0..0);
        history.record(&live);

        live.set_text("changed");
        assert_eq!(history.current().unwrap().text(), "original");
    }

    #[test]
    fn test_debouncer_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = HistoryDebouncer::default();

        debouncer.schedule(start);
        assert!(!debouncer.poll(start + Duration::from_millis(299)));
        assert!(debouncer.poll(start + Duration::from_millis(300)));
        assert!(!debouncer.poll(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_debouncer_restarts_on_every_change() {
        let start = Instant::now();
        let mut debouncer = HistoryDebouncer::new(Duration::from_millis(300));

        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(200));
        assert!(!debouncer.poll(start + Duration::from_millis(400)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(400)),
            Some(Duration::from_millis(100))
        );
        assert!(debouncer.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_debouncer_cancel() {
        let start = Instant::now();
        let mut debouncer = HistoryDebouncer::default();
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }
}
