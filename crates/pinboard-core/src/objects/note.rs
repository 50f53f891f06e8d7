//! Sticky note payload.

/// Text placed on a freshly created note.
pub const DEFAULT_NOTE_TEXT: &str = "New note";

/// Content of a sticky note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePayload {
    /// Plain text body.
    pub text: String,
}

impl NotePayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for NotePayload {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_TEXT)
    }
}
