use crate::orchestrator::Listing;

pub const TAB_EDITOR: usize = 0;
pub const TAB_HELP: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Code,
    Stdin,
}

/// An action waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    NewFile,
    ClearEditor,
    Delete(String),
    LoadDiscarding(String),
    Quit,
}

impl ConfirmAction {
    pub fn question(&self) -> String {
        match self {
            ConfirmAction::NewFile => "Create a new file? Unsaved changes will be lost.".into(),
            ConfirmAction::ClearEditor => "Are you sure you want to clear the editor?".into(),
            ConfirmAction::Delete(name) => format!("Are you sure you want to delete \"{name}\"?"),
            ConfirmAction::LoadDiscarding(name) => {
                format!("Load \"{name}\"? Unsaved changes will be lost.")
            }
            ConfirmAction::Quit => "Quit? Unsaved changes will be lost.".into(),
        }
    }
}

/// Single-line filename input for save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePrompt {
    pub value: String,
}

impl SavePrompt {
    pub fn new(initial: String) -> Self {
        Self { value: initial }
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }
}

/// Everything the view needs beyond the session. Owned by the event loop.
#[derive(Debug, Default)]
pub(crate) struct UiState {
    pub tab: usize,
    pub focus: Focus,
    pub info: String,
    pub prompt: Option<SavePrompt>,
    pub confirm: Option<ConfirmAction>,
    pub(crate) listing: Listing,
    pub output_scroll: u16,
    pub spinner: usize,
}

impl UiState {
    /// A confirm dialog or the save prompt is capturing keys.
    pub fn is_modal(&self) -> bool {
        self.confirm.is_some() || self.prompt.is_some()
    }

    pub fn spinner_frame(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
        FRAMES[self.spinner % FRAMES.len()]
    }
}
