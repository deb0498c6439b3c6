//! Formatting tokens and the wrap/unwrap toggler behind `insert_at_cursor`.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::editing::document::line_at;
use crate::editing::patch::Replacement;

/// Placeholder used when a link is inserted without a selection
pub const LINK_PLACEHOLDER: &str = "link text";

const LINK_BEFORE: &str = "[";
const LINK_AFTER: &str = "](url)";

fn line_token_regex() -> &'static Regex {
    static LINE_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    LINE_TOKEN_REGEX
        .get_or_init(|| Regex::new(r"^#{1,6} |^[-*+] |^[0-9]+\. ").expect("Invalid line token regex"))
}

fn line_prefix_regex() -> &'static Regex {
    static LINE_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
    LINE_PREFIX_REGEX.get_or_init(|| {
        Regex::new(r"^(\s*)(#{1,6} |[-*+] |[0-9]+\. )?").expect("Invalid line prefix regex")
    })
}

fn link_tail_regex() -> &'static Regex {
    static LINK_TAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_TAIL_REGEX.get_or_init(|| Regex::new(r"^\]\([^)]+\)").expect("Invalid link tail regex"))
}

/// Whether a token occupies the start of a line or surrounds a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Line,
    Inline,
}

/// A pair of marker strings describing one formatting command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub before: Cow<'static, str>,
    pub after: Cow<'static, str>,
}

impl TokenSpec {
    pub fn new(before: impl Into<Cow<'static, str>>, after: impl Into<Cow<'static, str>>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    pub fn class(&self) -> TokenClass {
        if line_token_regex().is_match(&self.before) {
            TokenClass::Line
        } else {
            TokenClass::Inline
        }
    }

    pub fn is_link(&self) -> bool {
        self.before == LINK_BEFORE && self.after == LINK_AFTER
    }
}

/// The fixed toolbar commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    UnorderedList,
    OrderedList,
    Link,
    /// Heading level, clamped into `1..=6`
    Heading(u8),
}

impl FormatCommand {
    pub fn token(self) -> TokenSpec {
        match self {
            FormatCommand::Bold => TokenSpec::new("**", "**"),
            FormatCommand::Italic => TokenSpec::new("*", "*"),
            FormatCommand::Underline => TokenSpec::new("__", "__"),
            FormatCommand::UnorderedList => TokenSpec::new("- ", ""),
            FormatCommand::OrderedList => TokenSpec::new("1. ", ""),
            FormatCommand::Link => TokenSpec::new(LINK_BEFORE, LINK_AFTER),
            FormatCommand::Heading(level) => {
                let hashes = "#".repeat(usize::from(level.clamp(1, 6)));
                TokenSpec::new(format!("{hashes} "), "")
            }
        }
    }

    /// Short label for toolbars and logs
    pub fn label(self) -> Cow<'static, str> {
        match self {
            FormatCommand::Bold => "Bold".into(),
            FormatCommand::Italic => "Italic".into(),
            FormatCommand::Underline => "Underline".into(),
            FormatCommand::UnorderedList => "Unordered List".into(),
            FormatCommand::OrderedList => "Ordered List".into(),
            FormatCommand::Link => "Insert Link".into(),
            FormatCommand::Heading(level) => format!("H{}", level.clamp(1, 6)).into(),
        }
    }
}

/// A computed toggle: replacements against the original text plus the new selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEdit {
    pub replacements: Vec<Replacement>,
    pub selection: Range<usize>,
}

/// Wrap or unwrap the selection with `spec`, or toggle a line prefix.
///
/// Always produces an edit; repeated application toggles cleanly.
pub fn toggle(text: &str, selection: Range<usize>, spec: &TokenSpec) -> TokenEdit {
    match spec.class() {
        TokenClass::Line => toggle_line_token(text, selection.start, &spec.before),
        TokenClass::Inline if spec.is_link() => toggle_link(text, selection),
        TokenClass::Inline => toggle_inline(text, selection, &spec.before, &spec.after),
    }
}

fn toggle_line_token(text: &str, cursor: usize, prefix: &str) -> TokenEdit {
    let line = line_at(text, cursor);
    let current = &text[line.start..line.end];

    let (indent_len, old_prefix) = match line_prefix_regex().captures(current) {
        Some(caps) => (
            caps.get(1).map_or(0, |m| m.len()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => (0, ""),
    };

    let prefix_start = line.start + indent_len;
    let prefix_range = prefix_start..prefix_start + old_prefix.len();
    let new_prefix = if old_prefix == prefix { "" } else { prefix };

    let delta = new_prefix.len() as isize - old_prefix.len() as isize;
    let new_cursor = cursor.saturating_add_signed(delta).max(line.start);

    TokenEdit {
        replacements: vec![Replacement::new(prefix_range, new_prefix)],
        selection: new_cursor..new_cursor,
    }
}

fn toggle_link(text: &str, selection: Range<usize>) -> TokenEdit {
    let Range { start, end } = selection;
    let selected = &text[start..end];

    // Unwrap only a well-formed `[text](url)` framing the selection
    let framed = !selected.is_empty()
        && !selected.contains(']')
        && start >= 1
        && text.get(start - 1..start) == Some(LINK_BEFORE);
    let tail = if framed {
        link_tail_regex().find(&text[end..])
    } else {
        None
    };

    if let Some(tail) = tail {
        let new_start = start - 1;
        return TokenEdit {
            replacements: vec![
                Replacement::delete(start - 1..start),
                Replacement::delete(end..end + tail.end()),
            ],
            selection: new_start..new_start + selected.len(),
        };
    }

    let link_text = if selected.is_empty() {
        LINK_PLACEHOLDER
    } else {
        selected
    };
    let new_start = start + LINK_BEFORE.len();
    TokenEdit {
        replacements: vec![Replacement::new(
            start..end,
            format!("{LINK_BEFORE}{link_text}{LINK_AFTER}"),
        )],
        selection: new_start..new_start + link_text.len(),
    }
}

fn toggle_inline(text: &str, selection: Range<usize>, before: &str, after: &str) -> TokenEdit {
    let Range { start, end } = selection;

    let wrapped_start = start
        .checked_sub(before.len())
        .and_then(|from| text.get(from..start));
    let wrapped_end = text.get(end..end + after.len());

    if wrapped_start == Some(before) && wrapped_end == Some(after) {
        let new_start = start - before.len();
        return TokenEdit {
            replacements: vec![
                Replacement::delete(new_start..start),
                Replacement::delete(end..end + after.len()),
            ],
            selection: new_start..end - before.len(),
        };
    }

    let new_start = start + before.len();
    TokenEdit {
        replacements: vec![Replacement::insert(start, before), Replacement::insert(end, after)],
        selection: new_start..new_start + (end - start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{Document, Patch};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn apply(text: &str, selection: Range<usize>, spec: &TokenSpec) -> (String, Range<usize>) {
        let edit = toggle(text, selection, spec);
        let patch = Patch::from_replacements(text.len(), &edit.replacements, edit.selection);
        let doc = Document::new(text).with_patch(&patch);
        (doc.text(), doc.selection())
    }

    #[rstest]
    #[case("# ", TokenClass::Line)]
    #[case("###### ", TokenClass::Line)]
    #[case("- ", TokenClass::Line)]
    #[case("* ", TokenClass::Line)]
    #[case("1. ", TokenClass::Line)]
    #[case("**", TokenClass::Inline)]
    #[case("*", TokenClass::Inline)]
    #[case("__", TokenClass::Inline)]
    #[case("[", TokenClass::Inline)]
    #[case("####### ", TokenClass::Inline)]
    fn test_token_class(#[case] before: &'static str, #[case] class: TokenClass) {
        assert_eq!(TokenSpec::new(before, "").class(), class);
    }

    #[test]
    fn test_bold_wraps_then_unwraps() {
        let bold = FormatCommand::Bold.token();

        let (text, selection) = apply("hello", 0..5, &bold);
        assert_eq!(text, "**hello**");
        assert_eq!(selection, 2..7);

        let (text, selection) = apply(&text, selection, &bold);
        assert_eq!(text, "hello");
        assert_eq!(selection, 0..5);
    }

    #[rstest]
    #[case::bold(FormatCommand::Bold)]
    #[case::italic(FormatCommand::Italic)]
    #[case::underline(FormatCommand::Underline)]
    #[case::link(FormatCommand::Link)]
    fn test_inline_toggle_twice_is_identity(#[case] command: FormatCommand) {
        let original = "say hello world";
        let spec = command.token();

        let (wrapped, selection) = apply(original, 4..9, &spec);
        assert_ne!(wrapped, original);
        assert_eq!(&wrapped[selection.clone()], "hello");

        let (unwrapped, selection) = apply(&wrapped, selection, &spec);
        assert_eq!(unwrapped, original);
        assert_eq!(selection, 4..9);
    }

    #[test]
    fn test_wrap_with_empty_selection_places_cursor_between_tokens() {
        let (text, selection) = apply("ab", 1..1, &FormatCommand::Underline.token());
        assert_eq!(text, "a____b");
        assert_eq!(selection, 3..3);
    }

    #[test]
    fn test_wrap_at_document_start_does_not_underflow() {
        let (text, selection) = apply("*x", 0..1, &FormatCommand::Bold.token());
        assert_eq!(text, "*****x");
        assert_eq!(selection, 2..3);
    }

    #[test]
    fn test_unwrap_needs_both_sides() {
        let (text, _) = apply("**hello", 2..7, &FormatCommand::Bold.token());
        assert_eq!(text, "****hello**");
    }

    #[test]
    fn test_link_inserts_placeholder() {
        let (text, selection) = apply("abc: ", 5..5, &FormatCommand::Link.token());
        assert_eq!(text, "abc: [link text](url)");
        assert_eq!(&text[selection.clone()], "link text");
        assert_eq!(selection, 6..15);
    }

    #[test]
    fn test_link_unwraps_edited_url() {
        let text = "see [docs](https://example.com) here";
        let (result, selection) = apply(text, 5..9, &FormatCommand::Link.token());
        assert_eq!(result, "see docs here");
        assert_eq!(selection, 4..8);
    }

    #[test]
    fn test_malformed_link_wraps_again() {
        let text = "[docs](url";
        let (result, selection) = apply(text, 1..5, &FormatCommand::Link.token());
        assert_eq!(result, "[[docs](url)](url");
        assert_eq!(selection, 2..6);
    }

    #[test]
    fn test_heading_added_to_plain_line() {
        let (text, selection) = apply("a\ntitle", 4..4, &FormatCommand::Heading(2).token());
        assert_eq!(text, "a\n## title");
        assert_eq!(selection, 7..7);
    }

    #[test]
    fn test_heading_switches_level_in_one_step() {
        let (text, selection) = apply("# title", 7..7, &FormatCommand::Heading(2).token());
        assert_eq!(text, "## title");
        assert_eq!(selection, 8..8);
    }

    #[test]
    fn test_same_line_token_toggles_off() {
        let (text, selection) = apply("- item", 6..6, &FormatCommand::UnorderedList.token());
        assert_eq!(text, "item");
        assert_eq!(selection, 4..4);
    }

    #[test]
    fn test_line_token_keeps_indent() {
        let (text, _) = apply("  - item", 8..8, &FormatCommand::OrderedList.token());
        assert_eq!(text, "  1. item");
    }

    #[test]
    fn test_line_token_cursor_inside_prefix_stays_on_line() {
        let (text, selection) = apply("x\n### t", 3..3, &FormatCommand::Heading(3).token());
        assert_eq!(text, "x\nt");
        assert_eq!(selection, 2..2);
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_list_prefix() {
        let text = "١٢. item";
        let (result, _) = apply(text, text.len()..text.len(), &FormatCommand::OrderedList.token());
        assert_eq!(result, "1. ١٢. item");
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(FormatCommand::Heading(9).token().before, "###### ");
        assert_eq!(FormatCommand::Heading(0).token().before, "# ");
        assert_eq!(FormatCommand::Heading(4).label(), "H4");
    }
}
