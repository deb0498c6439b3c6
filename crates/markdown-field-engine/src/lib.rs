pub mod editing;
pub mod field;
pub mod io;
pub mod keymap;
pub mod render;
pub mod session;

// Re-export key types for easier usage
pub use editing::{commands::*, document::*, history::*, patch::*, tokens::*};
pub use field::FieldMirror;
pub use keymap::{Action, Key, KeyInput, Mode, Modifiers, Platform, dispatch};
pub use render::render;
pub use session::{DEFAULT_FIELD_NAME, EditorSession, KeyOutcome, SessionOptions};
