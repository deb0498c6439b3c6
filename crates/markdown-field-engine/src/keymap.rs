//! Keyboard command dispatch.
//!
//! The shell resolves the platform and hands over plain key events; this
//! module decides which of them the editor intercepts.

use crate::editing::{Cmd, FormatCommand};

/// Which modifier acts as the command key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Cmd (reported as `meta`)
    Mac,
    /// Ctrl
    #[default]
    Other,
}

/// Editor tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Write,
    Preview,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Write => Mode::Preview,
            Mode::Preview => Mode::Write,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Write => "Write",
            Mode::Preview => "Preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Whether the platform's command modifier is held
    pub fn command(&self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.meta,
            Platform::Other => self.ctrl,
        }
    }
}

/// A key press as reported by the editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// The key with the platform's command modifier held
    pub fn command(key: Key, platform: Platform) -> Self {
        let modifiers = match platform {
            Platform::Mac => Modifiers {
                meta: true,
                ..Modifiers::NONE
            },
            Platform::Other => Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        };
        Self::new(key, modifiers)
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// What an intercepted key asks the editor to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Undo,
    Redo,
    Edit(Cmd),
}

/// Map a key press to an editor action.
///
/// Only the Write tab dispatches. Enter and Backspace map to list commands
/// that may still decline when the cursor is not on a list line; anything
/// else returns `None` and is left to the default text input.
pub fn dispatch(input: &KeyInput, mode: Mode, platform: Platform) -> Option<Action> {
    if mode != Mode::Write {
        return None;
    }

    let command = input.modifiers.command(platform);
    let shift = input.modifiers.shift;

    match input.key {
        Key::Char(c) if command && c.eq_ignore_ascii_case(&'z') => {
            Some(if shift { Action::Redo } else { Action::Undo })
        }
        Key::Char('b') if command => Some(Action::Edit(FormatCommand::Bold.into())),
        Key::Char('u') if command => Some(Action::Edit(FormatCommand::Underline.into())),
        Key::Enter => Some(Action::Edit(Cmd::ContinueList)),
        Key::Backspace => Some(Action::Edit(Cmd::RemoveListMarker)),
        _ => None,
    }
}
