use std::ops::Range;

use crate::editing::patch::Replacement;
use crate::editing::tokens::{self, FormatCommand, TokenSpec};
use crate::editing::{Document, Patch, lists};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Wrap/unwrap the selection or toggle a line prefix
    InsertAtCursor(TokenSpec),
    /// Enter on a list line
    ContinueList,
    /// Backspace on an ordered list marker
    RemoveListMarker,
    /// Plain text input replacing a range; the caret lands after `text`
    ReplaceRange {
        range: Range<usize>,
        text: String,
    },
}

impl From<FormatCommand> for Cmd {
    fn from(command: FormatCommand) -> Self {
        Cmd::InsertAtCursor(command.token())
    }
}

/// Compile a command against the document.
///
/// Returns `None` when the command does not apply, in which case the
/// editing surface keeps its default behaviour.
pub fn compile_command(doc: &Document, cmd: &Cmd) -> Option<Patch> {
    let len = doc.len();
    let text = doc.slice_to_cow(0..len);
    let selection = doc.selection();

    match cmd {
        Cmd::InsertAtCursor(spec) => {
            let edit = tokens::toggle(&text, selection, spec);
            Some(Patch::from_replacements(
                len,
                &edit.replacements,
                edit.selection,
            ))
        }
        Cmd::ContinueList => {
            let edit = lists::continue_list(&text, selection.start)?;
            Some(Patch::from_replacements(
                len,
                &edit.replacements,
                edit.cursor..edit.cursor,
            ))
        }
        Cmd::RemoveListMarker => {
            // A selection is deleted as a whole by the default handler
            if !selection.is_empty() {
                return None;
            }
            let edit = lists::remove_list_marker(&text, selection.start)?;
            Some(Patch::from_replacements(
                len,
                &edit.replacements,
                edit.cursor..edit.cursor,
            ))
        }
        Cmd::ReplaceRange { range, text } => {
            let start = doc.clamp_offset(range.start);
            let end = doc.clamp_offset(range.end).max(start);
            let caret = start + text.len();
            Some(Patch::from_replacements(
                len,
                &[Replacement::new(start..end, text.clone())],
                caret..caret,
            ))
        }
    }
}

impl Document {
    /// Apply a command in one step, returning the patch that was applied
    pub fn apply(&mut self, cmd: &Cmd) -> Option<Patch> {
        let patch = compile_command(self, cmd)?;
        self.apply_text(&patch);
        self.set_selection(patch.new_selection.clone());
        Some(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc(text: &str, selection: Range<usize>) -> Document {
        let mut doc = Document::new(text);
        doc.set_selection(selection);
        doc
    }

    fn assert_selection_invariant(doc: &Document) {
        let selection = doc.selection();
        assert!(selection.start <= selection.end);
        assert!(selection.end <= doc.len());
    }

    #[test]
    fn test_enter_continuation_scenario() {
        let mut d = doc("1. a", 4..4);
        let patch = d.apply(&Cmd::ContinueList).unwrap();

        assert_eq!(d.text(), "1. a\n2. ");
        assert_eq!(d.selection(), 8..8);
        assert_eq!(patch.changed, vec![4..8]);
    }

    #[test]
    fn test_enter_with_selection_splits_at_selection_start() {
        let mut d = doc("1. abc", 3..6);
        d.apply(&Cmd::ContinueList).unwrap();

        assert_eq!(d.text(), "1. \n2. abc");
        assert_eq!(d.selection(), 7..7);
    }

    #[test]
    fn test_backspace_decrement_scenario() {
        let mut d = doc("2. a\n3. b", 1..1);
        let patch = d.apply(&Cmd::RemoveListMarker).unwrap();

        assert_eq!(d.text(), "a\n2. b");
        assert_eq!(d.selection(), 0..0);
        assert_eq!(patch.changed, vec![0..0, 2..3]);
    }

    #[test]
    fn test_backspace_with_selection_falls_through() {
        let d = doc("2. a", 0..2);
        assert!(compile_command(&d, &Cmd::RemoveListMarker).is_none());
    }

    #[test]
    fn test_bold_scenario() {
        let mut d = doc("hello", 0..5);
        d.apply(&FormatCommand::Bold.into()).unwrap();
        assert_eq!(d.text(), "**hello**");
        assert_eq!(d.selected_text(), "hello");

        d.apply(&FormatCommand::Bold.into()).unwrap();
        assert_eq!(d.text(), "hello");
        assert_eq!(d.selection(), 0..5);
    }

    #[test]
    fn test_link_scenario() {
        let mut d = doc("abc: ", 5..5);
        d.apply(&FormatCommand::Link.into()).unwrap();
        assert_eq!(d.text(), "abc: [link text](url)");
        assert_eq!(d.selected_text(), "link text");
    }

    #[test]
    fn test_replace_range_clamps_out_of_bounds() {
        let mut d = doc("abc", 3..3);
        d.apply(&Cmd::ReplaceRange {
            range: 2..99,
            text: "Z".to_string(),
        })
        .unwrap();
        assert_eq!(d.text(), "abZ");
        assert_eq!(d.selection(), 3..3);
    }

    #[test]
    fn test_compile_does_not_mutate_document() {
        let d = doc("- a", 3..3);
        let patch = compile_command(&d, &Cmd::ContinueList).unwrap();
        assert_eq!(d.text(), "- a");
        assert_eq!(d.with_patch(&patch).text(), "- a\n- ");
        assert_eq!(patch.new_len(), 6);
    }

    #[rstest]
    #[case("", 0..0)]
    #[case("x", 0..1)]
    #[case("1. a\n2. b", 1..1)]
    #[case("1. a\n2. b", 9..9)]
    #[case("- a\n\n# h", 5..5)]
    #[case("[t](u)", 1..2)]
    #[case("**", 1..1)]
    #[case("héllo wörld", 1..3)]
    #[case("1. abc\n2. d", 3..6)]
    fn test_every_command_keeps_selection_in_bounds(
        #[case] text: &str,
        #[case] selection: Range<usize>,
    ) {
        let mut commands: Vec<Cmd> = vec![Cmd::ContinueList, Cmd::RemoveListMarker];
        commands.extend(
            [
                FormatCommand::Bold,
                FormatCommand::Italic,
                FormatCommand::Underline,
                FormatCommand::UnorderedList,
                FormatCommand::OrderedList,
                FormatCommand::Link,
                FormatCommand::Heading(1),
                FormatCommand::Heading(6),
            ]
            .map(Cmd::from),
        );

        for cmd in &commands {
            let mut d = doc(text, selection.clone());
            d.apply(cmd);
            assert_selection_invariant(&d);

            // Applying again from the resulting state must also hold
            d.apply(cmd);
            assert_selection_invariant(&d);
        }
    }
}
