use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

/// A single replacement against the pre-edit text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub range: Range<usize>,
    pub text: String,
}

impl Replacement {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at..at, text)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }
}

/// Result of compiling a command against a document.
///
/// Applying a patch is a two-step commit: the text first
/// ([`Document::apply_text`](crate::editing::Document::apply_text)), then
/// `new_selection` once the editing surface shows the new text.
#[derive(Clone)]
pub struct Patch {
    /// Byte ranges in the new text written by this edit
    pub changed: Vec<Range<usize>>,
    /// Selection to restore after the text is in place
    pub new_selection: Range<usize>,
    pub(crate) delta: Delta<RopeInfo>,
}

impl Patch {
    /// Build a patch from replacements sorted by start offset and non-overlapping
    pub(crate) fn from_replacements(
        base_len: usize,
        replacements: &[Replacement],
        new_selection: Range<usize>,
    ) -> Self {
        let mut builder = Builder::new(base_len);
        let mut changed = Vec::with_capacity(replacements.len());
        let mut shift: isize = 0;

        for replacement in replacements {
            builder.replace(replacement.range.clone(), Rope::from(&replacement.text));

            let start = (replacement.range.start as isize + shift) as usize;
            changed.push(start..start + replacement.text.len());
            shift += replacement.text.len() as isize - replacement.range.len() as isize;
        }

        Self {
            changed,
            new_selection,
            delta: builder.build(),
        }
    }

    /// Length of the text after this patch is applied
    pub fn new_len(&self) -> usize {
        self.delta.new_document_len()
    }
}

impl std::fmt::Debug for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patch")
            .field("changed", &self.changed)
            .field("new_selection", &self.new_selection)
            .finish()
    }
}
