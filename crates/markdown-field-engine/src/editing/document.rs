use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use xi_rope::Rope;

use crate::editing::Patch;

/// A line of the document located by offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Zero-based line index
    pub index: usize,
    /// Byte offset of the first character of the line
    pub start: usize,
    /// Byte offset just past the last character (before the `\n`)
    pub end: usize,
}

/// Document state: the full Markdown text plus the active selection.
///
/// The text lives in an `xi_rope::Rope`, so cloning a document (which is how
/// history snapshots are taken) shares structure instead of copying bytes.
/// All offsets are UTF-8 byte offsets into the text.
///
/// Invariant: `selection.start <= selection.end <= len()` and both ends sit on
/// char boundaries. Every setter clamps to keep it.
///
/// ```rust
/// # use markdown_field_engine::editing::Document;
/// let mut doc = Document::new("hello");
/// assert_eq!(doc.selection(), 5..5);
///
/// doc.set_selection(9..2);
/// assert_eq!(doc.selection(), 2..5);
/// ```
#[derive(Clone)]
pub struct Document {
    pub(crate) buffer: Rope,
    pub(crate) selection: Range<usize>,
}

impl Document {
    /// Create a document with the cursor at the end of the text
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
        }
    }

    /// Create a document from raw bytes, rejecting invalid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    pub(crate) fn from_parts(buffer: Rope, selection: Range<usize>) -> Self {
        let mut doc = Self {
            buffer,
            selection: 0..0,
        };
        doc.set_selection(selection);
        doc
    }

    /// Get the document's content as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Length of the text in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Get the current selection range
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// The text covered by the selection
    pub fn selected_text(&self) -> Cow<'_, str> {
        self.slice_to_cow(self.selection.clone())
    }

    /// Replace the full text.
    ///
    /// The selection is clamped to the new length; callers that know where the
    /// cursor belongs follow up with [`Document::set_selection`].
    pub fn set_text(&mut self, text: &str) {
        self.set_buffer(Rope::from(text));
    }

    pub(crate) fn set_buffer(&mut self, buffer: Rope) {
        self.buffer = buffer;
        let selection = self.selection.clone();
        self.set_selection(selection);
    }

    /// Set the selection, clamping both ends into the text and ordering them
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let a = self.clamp_offset(selection.start);
        let b = self.clamp_offset(selection.end);
        self.selection = a.min(b)..a.max(b);
    }

    /// Clamp an offset to `[0, len]` and move it back onto a char boundary
    pub fn clamp_offset(&self, offset: usize) -> usize {
        let len = self.buffer.len();
        if offset >= len {
            return len;
        }
        let text = self.slice_to_cow(0..len);
        let mut offset = offset;
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Apply the text half of a patch.
    ///
    /// The selection is only clamped here; the patch's `new_selection` is
    /// applied separately once the surface reflects the new text.
    pub fn apply_text(&mut self, patch: &Patch) {
        let buffer = patch.delta.apply(&self.buffer);
        self.set_buffer(buffer);
    }

    /// Return a new document with both halves of the patch applied
    pub fn with_patch(&self, patch: &Patch) -> Self {
        let mut next = self.clone();
        next.apply_text(patch);
        next.set_selection(patch.new_selection.clone());
        next
    }

    /// Locate the line containing `offset`.
    ///
    /// An offset sitting exactly at the end of a line belongs to that line,
    /// not to the one after the newline.
    pub fn line_at(&self, offset: usize) -> LineSpan {
        line_at(&self.slice_to_cow(0..self.len()), offset)
    }

    /// Row and column (in chars) of a byte offset, for surfaces that place a caret
    pub fn point_of(&self, offset: usize) -> (usize, usize) {
        byte_to_point_in_text(&self.slice_to_cow(0..self.len()), offset)
    }

    /// Slice the buffer to a cow string
    pub fn slice_to_cow(&self, range: Range<usize>) -> Cow<'_, str> {
        let doc_len = self.buffer.len();

        // Clamp range to document bounds to prevent xi-rope panic
        let start = range.start.min(doc_len);
        let end = range.end.min(doc_len).max(start);

        self.buffer.slice_to_cow(start..end)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .field("selection", &self.selection)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.selection == other.selection
            && self.slice_to_cow(0..self.len()) == other.slice_to_cow(0..other.len())
    }
}

impl Eq for Document {}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Scan line boundaries, accumulating offsets, until the line holding `offset`
pub(crate) fn line_at(text: &str, offset: usize) -> LineSpan {
    let mut start = 0;
    for (index, line) in text.split('\n').enumerate() {
        let end = start + line.len();
        if offset <= end {
            return LineSpan { index, start, end };
        }
        start = end + 1;
    }

    // Offsets past the end land on the last line
    let last_start = text.rfind('\n').map_or(0, |pos| pos + 1);
    LineSpan {
        index: text.matches('\n').count(),
        start: last_start,
        end: text.len(),
    }
}

/// Convert byte offset to (row, column) position in given text
fn byte_to_point_in_text(text: &str, byte_offset: usize) -> (usize, usize) {
    let mut offset = byte_offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &text[..offset];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    let col = before[line_start..].chars().count();
    (row, col)
}
