use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use markdown_field_engine::{Key, KeyInput, Modifiers};

/// Convert a crossterm key press into the engine's key input.
///
/// Releases and keys the editor has no use for map to `None`.
pub fn to_key_input(event: &KeyEvent) -> Option<KeyInput> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab => Key::Tab,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };

    let modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        meta: event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };

    Some(KeyInput::new(key, modifiers))
}
