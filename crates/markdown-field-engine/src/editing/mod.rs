/*!
 * # Editing Core
 *
 * Cursor-aware Markdown editing over a single text buffer.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The [`Document`] holds the whole text in an **`xi_rope::Rope`** plus the
 *   active selection (byte offsets)
 * - Cloning a document shares the rope, which makes history snapshots cheap
 *   and fully independent of later edits
 *
 * ### 2. Command-Based Editing
 * - Every edit is a [`Cmd`] compiled against an immutable document into a
 *   [`Patch`]: a `Delta` of replacements plus the selection to restore
 * - Compilation returns `None` when the command does not apply, leaving the
 *   keystroke to the default text input
 * - Patches are committed in two steps: text first, selection once the
 *   editing surface has caught up
 *
 * ### 3. Linear History
 * - [`History`] is a `Vec` of snapshots with a cursor; recording from the
 *   middle drops the redo tail
 * - [`HistoryDebouncer`] coalesces bursts of edits into one entry
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` state, clamping, line lookup
 * - **`commands`**: `Cmd` enum and compilation to patches
 * - **`lists`**: list continuation and ordered-list renumbering
 * - **`tokens`**: inline and line token toggling (`insert_at_cursor`)
 * - **`history`**: snapshots, history chain and debounce timer
 * - **`patch`**: edit result with changed ranges and new selection
 *
 * ## Usage Pattern
 *
 * ```rust
 * use markdown_field_engine::editing::*;
 *
 * let mut doc = Document::new("1. first");
 * let patch = compile_command(&doc, &Cmd::ContinueList).unwrap();
 *
 * // Text first, then the selection
 * doc.apply_text(&patch);
 * doc.set_selection(patch.new_selection.clone());
 *
 * assert_eq!(doc.text(), "1. first\n2. ");
 * assert_eq!(doc.selection(), 12..12);
 * ```
 */

pub mod commands;
pub mod document;
pub mod history;
pub mod lists;
pub mod patch;
pub mod tokens;

pub use commands::{Cmd, compile_command};
pub use document::{Document, LineSpan};
pub use history::{DEFAULT_DEBOUNCE, DEFAULT_HISTORY_LIMIT, History, HistoryDebouncer, HistoryEntry};
pub use lists::{ListKind, ListMatch, match_list_line};
pub use patch::{Patch, Replacement};
pub use tokens::{FormatCommand, TokenClass, TokenSpec};
