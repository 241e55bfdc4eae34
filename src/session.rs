//! The aggregate UI state. Owned by the composition root; components read and
//! write it only while handling a user action or a resolved response.

use crate::editor::EditorBuffer;
use crate::model::{ExecutionResult, Language};
use crate::theme::ThemeMode;

/// Identifies one buffer state: which workspace (bumped by every load, new
/// file or clear) and which revision within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeStamp {
    workspace: u64,
    revision: u64,
}

#[derive(Debug)]
pub struct Session {
    pub code: EditorBuffer,
    /// Optional stdin for the next run.
    pub input: EditorBuffer,
    pub language: Language,
    pub current_filename: Option<String>,
    pub result: Option<ExecutionResult>,
    /// True only while one execute request is in flight.
    pub is_executing: bool,
    /// Transport-level failure; cleared by the next run attempt or successful file action.
    pub banner: Option<String>,
    pub theme: ThemeMode,
    pub stdin_visible: bool,
    saved_revision: u64,
    workspace: u64,
}

impl Session {
    pub fn new(language: Language, theme: ThemeMode) -> Self {
        let code = EditorBuffer::default();
        let saved_revision = code.revision();
        Self {
            code,
            input: EditorBuffer::default(),
            language,
            current_filename: None,
            result: None,
            is_executing: false,
            banner: None,
            theme,
            stdin_visible: false,
            saved_revision,
            workspace: 0,
        }
    }

    /// Non-blank code that changed since the last load, save or reset.
    pub fn has_unsaved_edits(&self) -> bool {
        !self.code.is_blank() && self.code.revision() != self.saved_revision
    }

    pub fn mark_saved(&mut self) {
        self.saved_revision = self.code.revision();
    }

    pub fn stamp(&self) -> CodeStamp {
        CodeStamp {
            workspace: self.workspace,
            revision: self.code.revision(),
        }
    }

    /// False once the buffer was replaced (load, new file, clear) after `stamp`.
    pub fn is_current(&self, stamp: CodeStamp) -> bool {
        stamp.workspace == self.workspace
    }

    /// Record that the buffer as of `stamp` reached the store. Ignored when the
    /// workspace has since been replaced.
    pub fn mark_saved_at(&mut self, stamp: CodeStamp) -> bool {
        if !self.is_current(stamp) {
            return false;
        }
        self.saved_revision = stamp.revision;
        true
    }

    /// Swap in a loaded file, discarding local edits and the last result.
    pub fn replace_code(&mut self, code: String, filename: String) {
        self.code.set_text(code);
        self.current_filename = Some(filename);
        self.result = None;
        self.workspace += 1;
        self.mark_saved();
    }

    /// Back to an empty, unnamed workspace (new file / clear).
    pub fn reset_workspace(&mut self) {
        self.code.clear();
        self.input.clear();
        self.result = None;
        self.current_filename = None;
        self.workspace += 1;
        self.mark_saved();
    }
}
