//! Keyboard shortcuts active while a wizard is open.

use crate::WizardStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    S,
    ArrowLeft,
    ArrowRight,
}

/// A key plus the platform command modifier (Ctrl, or Cmd on macOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub command: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            command: false,
        }
    }

    pub fn command(key: Key) -> Self {
        Self { key, command: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardCommand {
    Next,
    Previous,
    Submit,
    SaveDraft,
    Cancel,
}

/// Map a chord to a wizard command for the given step.
///
/// Cmd+Enter advances, and submits on the review step.
pub fn resolve_shortcut(chord: KeyChord, step: WizardStep) -> Option<WizardCommand> {
    match (chord.key, chord.command) {
        (Key::Enter, true) if step.is_last() => Some(WizardCommand::Submit),
        (Key::Enter, true) => Some(WizardCommand::Next),
        (Key::S, true) => Some(WizardCommand::SaveDraft),
        (Key::Escape, false) => Some(WizardCommand::Cancel),
        (Key::ArrowLeft, true) => Some(WizardCommand::Previous),
        (Key::ArrowRight, true) => Some(WizardCommand::Next),
        _ => None,
    }
}
