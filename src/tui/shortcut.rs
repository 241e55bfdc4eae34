//! The run chord.
//!
//! Ctrl+Enter (Cmd+Enter on macOS terminals that report Super) runs the
//! editor's code from any focus or overlay. The chord is always consumed so
//! it never reaches the editor as a newline, even when the run is refused.
//!
//! Legacy terminals cannot tell Ctrl+Enter from Enter and report Ctrl+J
//! instead; that is accepted as the same chord. Terminals with the kitty
//! keyboard protocol get disambiguated keys via [`super::terminal`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// Invoke run.
    Run,
    /// The chord matched but a run is already in flight; swallow it.
    Suppressed,
    /// Not the run chord; handle the key normally.
    Ignored,
}

#[derive(Debug, Default)]
pub(crate) struct ShortcutDispatcher {
    suppressed: u64,
}

impl ShortcutDispatcher {
    pub fn is_run_chord(key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let chord = KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META;
        match key.code {
            KeyCode::Enter => key.modifiers.intersects(chord),
            KeyCode::Char('j') => key.modifiers == KeyModifiers::CONTROL,
            _ => false,
        }
    }

    /// `is_executing` is read at dispatch time; the controller repeats the check.
    pub fn dispatch(&mut self, key: &KeyEvent, is_executing: bool) -> Dispatch {
        if !Self::is_run_chord(key) {
            return Dispatch::Ignored;
        }
        if is_executing {
            self.suppressed += 1;
            tracing::debug!("run chord suppressed while executing ({})", self.suppressed);
            return Dispatch::Suppressed;
        }
        Dispatch::Run
    }
}
