//! List continuation on Enter and marker removal on Backspace.
//!
//! Only markers at the very start of a line are recognised; indented
//! (nested) list items are left to the default text input.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::editing::document::line_at;
use crate::editing::patch::Replacement;

fn ordered_regex() -> &'static Regex {
    static ORDERED_REGEX: OnceLock<Regex> = OnceLock::new();
    ORDERED_REGEX.get_or_init(|| Regex::new(r"^([0-9]+)\. (.*)").expect("Invalid ordered list regex"))
}

fn unordered_regex() -> &'static Regex {
    static UNORDERED_REGEX: OnceLock<Regex> = OnceLock::new();
    UNORDERED_REGEX
        .get_or_init(|| Regex::new(r"^([*\-+]) (.*)").expect("Invalid unordered list regex"))
}

/// Kind of list marker found at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered(u64),
    Unordered(char),
}

/// A list line split into marker and content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMatch<'a> {
    pub kind: ListKind,
    /// The full marker including its trailing space, e.g. `"12. "` or `"- "`
    pub marker: &'a str,
    pub content: &'a str,
}

impl ListMatch<'_> {
    /// Byte length of the number digits for ordered markers
    fn digits_len(&self) -> usize {
        match self.kind {
            ListKind::Ordered(_) => self.marker.len() - 2,
            ListKind::Unordered(_) => 0,
        }
    }
}

/// Match a single line (without its newline) against the list patterns.
///
/// Ordered markers are tried first.
pub fn match_list_line(line: &str) -> Option<ListMatch<'_>> {
    match_ordered(line).or_else(|| {
        let caps = unordered_regex().captures(line)?;
        let bullet = caps.get(1)?;
        let content = caps.get(2)?;
        Some(ListMatch {
            kind: ListKind::Unordered(bullet.as_str().chars().next()?),
            marker: &line[..content.start()],
            content: content.as_str(),
        })
    })
}

fn match_ordered(line: &str) -> Option<ListMatch<'_>> {
    let caps = ordered_regex().captures(line)?;
    let number = caps.get(1)?;
    let content = caps.get(2)?;
    let n = number.as_str().parse::<u64>().ok()?;
    Some(ListMatch {
        kind: ListKind::Ordered(n),
        marker: &line[..content.start()],
        content: content.as_str(),
    })
}

/// A computed list edit: replacements against the original text plus the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEdit {
    pub replacements: Vec<Replacement>,
    pub cursor: usize,
}

/// Enter inside a list line: insert the next marker at the cursor.
///
/// Ordered lists renumber every contiguous ordered line below the split.
/// Returns `None` when the cursor's line is not a list item.
pub fn continue_list(text: &str, cursor: usize) -> Option<ListEdit> {
    let line = line_at(text, cursor);
    let current = &text[line.start..line.end];
    let list = match_list_line(current)?;

    match list.kind {
        ListKind::Ordered(n) => {
            let next = n.checked_add(1)?;
            let inserted = format!("\n{next}. ");
            let cursor_after = cursor + inserted.len();

            let mut replacements = vec![Replacement::insert(cursor, inserted)];
            replacements.extend(renumber_following(text, line.end, next.checked_add(1)?));

            Some(ListEdit {
                replacements,
                cursor: cursor_after,
            })
        }
        ListKind::Unordered(bullet) => {
            let inserted = format!("\n{bullet} ");
            let cursor_after = cursor + inserted.len();
            Some(ListEdit {
                replacements: vec![Replacement::insert(cursor, inserted)],
                cursor: cursor_after,
            })
        }
    }
}

/// Backspace on an ordered marker: strip the marker and renumber downwards.
///
/// Only applies when the cursor is after the line start and no further than
/// the end of `"<n>. "`. The following contiguous ordered lines take over the
/// removed line's number.
pub fn remove_list_marker(text: &str, cursor: usize) -> Option<ListEdit> {
    let line = line_at(text, cursor);
    let current = &text[line.start..line.end];
    let list = match_ordered(current)?;
    let ListKind::Ordered(n) = list.kind else {
        return None;
    };

    let marker_end = line.start + list.marker.len();
    if cursor <= line.start || cursor > marker_end {
        return None;
    }

    let mut replacements = vec![Replacement::delete(line.start..marker_end)];
    replacements.extend(renumber_following(text, line.end, n));

    Some(ListEdit {
        replacements,
        cursor: line.start,
    })
}

/// Renumber the contiguous ordered lines that start after `line_end`.
///
/// Stops at the first line that is not an ordered item.
fn renumber_following(text: &str, line_end: usize, first: u64) -> Vec<Replacement> {
    let mut replacements = Vec::new();
    if line_end >= text.len() {
        return replacements;
    }

    let mut number = first;
    let mut start = line_end + 1;
    for line in text[start..].split('\n') {
        let Some(list) = match_ordered(line) else {
            break;
        };
        let digits: Range<usize> = start..start + list.digits_len();
        let renumbered = number.to_string();
        if text[digits.clone()] != renumbered {
            replacements.push(Replacement::new(digits, renumbered));
        }
        let Some(next) = number.checked_add(1) else {
            break;
        };
        number = next;
        start += line.len() + 1;
    }

    replacements
}
