use std::ops::Range;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use markdown_field_engine::{
    Cmd, EditorSession, FormatCommand, Key, KeyInput, KeyOutcome, Mode, io,
};

/// Terminal editor state wrapped around one editing session
pub struct App {
    pub session: EditorSession,
    pub path: Option<PathBuf>,
    /// Fixed end of a Shift+arrow selection
    anchor: Option<usize>,
    pub status: String,
    pub modified: bool,
    pub should_quit: bool,
    pub editor_scroll: usize,
    pub preview_scroll: u16,
}

impl App {
    pub fn new(session: EditorSession, path: Option<PathBuf>) -> Self {
        let status = match &path {
            Some(path) => format!("Editing {}", path.display()),
            None => "No file: Ctrl+S is disabled".to_string(),
        };
        Self {
            session,
            path,
            anchor: None,
            status,
            modified: false,
            should_quit: false,
            editor_scroll: 0,
            preview_scroll: 0,
        }
    }

    pub fn handle_key(&mut self, input: KeyInput, now: Instant) -> Result<()> {
        if self.handle_shell_key(&input, now)? {
            return Ok(());
        }

        let before = self.session.field().value().to_string();
        if self.session.handle_key(&input, now) == KeyOutcome::Handled {
            self.anchor = None;
            if self.session.field().value() != before {
                self.modified = true;
            }
            return Ok(());
        }

        match self.session.mode() {
            Mode::Write => self.default_edit(&input, now),
            Mode::Preview => self.scroll_preview(&input),
        }
        Ok(())
    }

    /// Debounce timer hook for the event loop
    pub fn tick(&mut self, now: Instant) {
        if self.session.tick(now) {
            log::trace!("history entry recorded by tick");
        }
    }

    /// Keys that belong to the terminal shell rather than the editor
    fn handle_shell_key(&mut self, input: &KeyInput, now: Instant) -> Result<bool> {
        let mods = input.modifiers;
        match input.key {
            Key::Escape => self.should_quit = true,
            Key::Char('q') if mods.ctrl => self.should_quit = true,
            Key::Char('s') if mods.ctrl => self.save()?,
            Key::Tab if !mods.ctrl && !mods.alt && !mods.meta => {
                let mode = self.session.toggle_mode();
                self.status = format!("{} tab", mode.label());
            }
            Key::Char(c) if mods.alt && self.session.mode() == Mode::Write => {
                let Some(command) = toolbar_command(c) else {
                    return Ok(false);
                };
                if self.session.format(command, now) {
                    self.anchor = None;
                    self.modified = true;
                    self.status = command.label().to_string();
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            self.status = "No file to save to".to_string();
            return Ok(());
        };
        match io::write_file(path, self.session.field().value()) {
            Ok(()) => {
                self.modified = false;
                self.status = format!("Saved {}", path.display());
            }
            Err(e) => {
                log::error!("save failed: {e}");
                self.status = format!("Save failed: {e}");
            }
        }
        Ok(())
    }

    /// What a plain textarea does with keys the editor let through
    fn default_edit(&mut self, input: &KeyInput, now: Instant) {
        let mods = input.modifiers;
        let text = self.session.text();
        let selection = self.session.selection();

        let edit = match input.key {
            Key::Char(c) if !mods.ctrl && !mods.alt && !mods.meta => {
                Some((selection, c.to_string()))
            }
            Key::Enter => Some((selection, "\n".to_string())),
            Key::Backspace if selection.is_empty() => {
                let start = prev_char_boundary(&text, selection.start);
                (start < selection.start).then(|| (start..selection.start, String::new()))
            }
            Key::Delete if selection.is_empty() => {
                let end = next_char_boundary(&text, selection.end);
                (end > selection.end).then(|| (selection.start..end, String::new()))
            }
            Key::Backspace | Key::Delete => Some((selection, String::new())),
            Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End => {
                self.move_caret(&text, input.key, mods.shift);
                return;
            }
            _ => None,
        };

        if let Some((range, text)) = edit {
            self.anchor = None;
            if self.session.apply(&Cmd::ReplaceRange { range, text }, now) {
                self.modified = true;
            }
        }
    }

    fn move_caret(&mut self, text: &str, key: Key, extend: bool) {
        let selection = self.session.selection();
        let head = self.head(&selection);

        if !extend && !selection.is_empty() && matches!(key, Key::Left | Key::Right) {
            let collapsed = if key == Key::Left {
                selection.start
            } else {
                selection.end
            };
            self.anchor = None;
            self.session.set_selection(collapsed..collapsed);
            return;
        }

        let target = match key {
            Key::Left => prev_char_boundary(text, head),
            Key::Right => next_char_boundary(text, head),
            Key::Up => vertical_target(text, head, false),
            Key::Down => vertical_target(text, head, true),
            Key::Home => line_bounds(text, head).start,
            Key::End => line_bounds(text, head).end,
            _ => head,
        };

        if extend {
            let anchor = *self.anchor.get_or_insert(if head == selection.end {
                selection.start
            } else {
                selection.end
            });
            self.session
                .set_selection(anchor.min(target)..anchor.max(target));
        } else {
            self.anchor = None;
            self.session.set_selection(target..target);
        }
    }

    /// Moving end of the selection
    fn head(&self, selection: &Range<usize>) -> usize {
        match self.anchor {
            Some(anchor) if anchor == selection.end && anchor != selection.start => {
                selection.start
            }
            _ => selection.end,
        }
    }

    fn scroll_preview(&mut self, input: &KeyInput) {
        match input.key {
            Key::Up => self.preview_scroll = self.preview_scroll.saturating_sub(1),
            Key::Down => self.preview_scroll = self.preview_scroll.saturating_add(1),
            Key::Home => self.preview_scroll = 0,
            _ => {}
        }
    }

    /// Keep the caret row inside a viewport of `height` rows
    pub fn scroll_to_caret(&mut self, caret_row: usize, height: usize) {
        if caret_row < self.editor_scroll {
            self.editor_scroll = caret_row;
        } else if height > 0 && caret_row >= self.editor_scroll + height {
            self.editor_scroll = caret_row + 1 - height;
        }
    }
}

/// Alt+key toolbar bindings
pub fn toolbar_command(c: char) -> Option<FormatCommand> {
    match c.to_ascii_lowercase() {
        '1'..='6' => c.to_digit(10).map(|level| FormatCommand::Heading(level as u8)),
        'b' => Some(FormatCommand::Bold),
        'i' => Some(FormatCommand::Italic),
        'u' => Some(FormatCommand::Underline),
        'l' => Some(FormatCommand::Link),
        '-' => Some(FormatCommand::UnorderedList),
        'o' => Some(FormatCommand::OrderedList),
        _ => None,
    }
}

fn prev_char_boundary(text: &str, offset: usize) -> usize {
    text.get(..offset)
        .and_then(|before| before.chars().next_back())
        .map_or(0, |c| offset - c.len_utf8())
}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    text.get(offset..)
        .and_then(|after| after.chars().next())
        .map_or(text.len(), |c| offset + c.len_utf8())
}

/// Byte range of the line holding `offset`, without its newline
fn line_bounds(text: &str, offset: usize) -> Range<usize> {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

/// Same char column on the previous or next line, clamped to its length
fn vertical_target(text: &str, offset: usize, down: bool) -> usize {
    let line = line_bounds(text, offset);
    let column = text[line.start..offset.min(text.len())].chars().count();

    let target_line = if down {
        if line.end >= text.len() {
            return text.len();
        }
        line_bounds(text, line.end + 1)
    } else {
        if line.start == 0 {
            return 0;
        }
        line_bounds(text, line.start - 1)
    };

    text[target_line.clone()]
        .char_indices()
        .nth(column)
        .map_or(target_line.end, |(i, _)| target_line.start + i)
}
