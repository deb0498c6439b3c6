//! The editing session: the imperative shell around the pure editing core.
//!
//! The session owns the document, history, debounce timer, tab mode and the
//! mirrored form field. Hosts feed it key presses, plain input and clock
//! ticks, and call [`EditorSession::acknowledge_layout`] once the surface
//! shows new text so the pending selection can be applied.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::{Duration, Instant};

use crate::editing::{
    Cmd, DEFAULT_DEBOUNCE, DEFAULT_HISTORY_LIMIT, Document, FormatCommand, History,
    HistoryDebouncer, HistoryEntry, Patch, TokenSpec, compile_command,
};
use crate::field::FieldMirror;
use crate::keymap::{Action, KeyInput, Mode, Platform, dispatch};
use crate::render::render;

/// Field name used when the host does not supply one
pub const DEFAULT_FIELD_NAME: &str = "markdown";

/// Resolved settings for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub platform: Platform,
    pub debounce: Duration,
    /// `None` keeps every history entry for the session
    pub history_limit: Option<NonZeroUsize>,
    pub field_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            debounce: DEFAULT_DEBOUNCE,
            history_limit: NonZeroUsize::new(DEFAULT_HISTORY_LIMIT),
            field_name: DEFAULT_FIELD_NAME.to_string(),
        }
    }
}

/// Whether a key press was consumed by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Not intercepted: the surface applies its default behaviour
    Ignored,
}

pub struct EditorSession {
    document: Document,
    history: History,
    debouncer: HistoryDebouncer,
    mode: Mode,
    platform: Platform,
    field: FieldMirror,
    /// Selection waiting for the surface to show the latest text
    pending_selection: Option<Range<usize>>,
    /// Set while a history snapshot is being applied
    suppress_record: bool,
    rendered: Option<String>,
}

impl EditorSession {
    pub fn new(text: &str, options: SessionOptions) -> Self {
        let document = Document::new(text);
        let mut history = History::new(options.history_limit);
        history.record(&document);

        let mut field = FieldMirror::new(options.field_name);
        field.sync(text);

        Self {
            document,
            history,
            debouncer: HistoryDebouncer::new(options.debounce),
            mode: Mode::Write,
            platform: options.platform,
            field,
            pending_selection: None,
            suppress_record: false,
            rendered: None,
        }
    }

    /// Route a key press through the dispatcher
    pub fn handle_key(&mut self, input: &KeyInput, now: Instant) -> KeyOutcome {
        self.acknowledge_layout();

        let Some(action) = dispatch(input, self.mode, self.platform) else {
            return KeyOutcome::Ignored;
        };
        log::debug!("dispatching {action:?} for {input:?}");

        match action {
            Action::Undo => {
                self.undo(now);
                KeyOutcome::Handled
            }
            Action::Redo => {
                self.redo(now);
                KeyOutcome::Handled
            }
            Action::Edit(cmd) => {
                if self.apply(&cmd, now) {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Apply a command; returns `false` when it does not apply
    pub fn apply(&mut self, cmd: &Cmd, now: Instant) -> bool {
        self.acknowledge_layout();

        match compile_command(&self.document, cmd) {
            Some(patch) => {
                self.commit_text(&patch, now);
                true
            }
            None => false,
        }
    }

    /// Toolbar command
    pub fn format(&mut self, command: FormatCommand, now: Instant) -> bool {
        log::debug!("toolbar command {}", command.label());
        self.apply(&command.into(), now)
    }

    /// Wrap/unwrap the selection with an arbitrary token pair
    pub fn insert_at_cursor(
        &mut self,
        before: impl Into<String>,
        after: impl Into<String>,
        now: Instant,
    ) -> bool {
        let spec = TokenSpec::new(before.into(), after.into());
        self.apply(&Cmd::InsertAtCursor(spec), now)
    }

    /// Text and selection reported by the surface after ordinary typing
    pub fn input(&mut self, text: &str, selection: Range<usize>, now: Instant) {
        self.pending_selection = None;
        self.suppress_record = false;

        let changed = self.document.slice_to_cow(0..self.document.len()) != text;
        if changed {
            self.document.set_text(text);
        }
        self.document.set_selection(selection);
        if changed {
            self.text_changed(now);
        }
    }

    /// Cursor moved on the surface
    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.acknowledge_layout();
        self.document.set_selection(selection);
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        self.acknowledge_layout();
        self.flush_pending_record();

        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(entry, now);
        true
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        self.acknowledge_layout();
        self.flush_pending_record();

        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(entry, now);
        true
    }

    /// The surface has laid out the latest text: apply the pending selection
    pub fn acknowledge_layout(&mut self) {
        if let Some(selection) = self.pending_selection.take() {
            self.document.set_selection(selection);
        }
        self.suppress_record = false;
    }

    /// Fire the debounced history record if its quiet period has passed
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debouncer.poll(now) {
            return false;
        }
        let entry = self.snapshot();
        self.history.push(entry)
    }

    /// Time until the next debounced record, for hosts that sleep between events
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("switching to {} tab", mode.label());
            self.mode = mode;
        }
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Selection as the user will see it once the pending phase completes
    pub fn selection(&self) -> Range<usize> {
        self.pending_selection
            .clone()
            .unwrap_or_else(|| self.document.selection())
    }

    pub fn pending_selection(&self) -> Option<Range<usize>> {
        self.pending_selection.clone()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn field(&self) -> &FieldMirror {
        &self.field
    }

    /// Preview HTML, re-rendered only after the text changed
    pub fn rendered_html(&mut self) -> &str {
        let document = &self.document;
        self.rendered
            .get_or_insert_with(|| render(&document.slice_to_cow(0..document.len())))
    }

    fn commit_text(&mut self, patch: &Patch, now: Instant) {
        self.document.apply_text(patch);
        self.stage_selection(patch.new_selection.clone());
        self.text_changed(now);
    }

    fn restore(&mut self, entry: HistoryEntry, now: Instant) {
        self.suppress_record = true;
        self.document.set_buffer(entry.buffer().clone());
        self.stage_selection(entry.selection());
        self.text_changed(now);
    }

    /// Hold a selection for the next layout, clamped onto char boundaries of the new text
    fn stage_selection(&mut self, selection: Range<usize>) {
        let a = self.document.clamp_offset(selection.start);
        let b = self.document.clamp_offset(selection.end);
        self.pending_selection = Some(a.min(b)..a.max(b));
    }

    fn text_changed(&mut self, now: Instant) {
        self.field
            .sync(&self.document.slice_to_cow(0..self.document.len()));
        self.rendered = None;
        if !self.suppress_record {
            self.debouncer.schedule(now);
        }
    }

    /// Record a change still waiting on the debounce so undo reverts it
    fn flush_pending_record(&mut self) {
        if self.debouncer.is_pending() {
            self.debouncer.cancel();
            let entry = self.snapshot();
            self.history.push(entry);
        }
    }

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry::new(self.document.buffer.clone(), self.selection())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new("", SessionOptions::default())
    }
}
