//! Interactive terminal client: the composition root.
//!
//! One `select!` loop owns the session. Terminal keys, completions of spawned
//! remote calls, the stopwatch tick and a render tick are its only inputs, so
//! every mutation of the session happens here, one event at a time.

mod clipboard;
mod draw;
mod help;
mod shortcut;
mod state;
mod terminal;

use crate::api::{ExecutionBackend, FileStore, HttpClient};
use crate::cli::{build_config, Cli};
use crate::model::Language;
use crate::orchestrator::{
    apply_delete, apply_listing, apply_load, apply_save, suggested_filename, Completion,
    ExecutionController, FileOpError, FilePersistenceClient,
};
use crate::session::Session;
use crate::theme::ThemeStore;
use crate::timer::Stopwatch;
use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use shortcut::{Dispatch, ShortcutDispatcher};
use state::{ConfirmAction, Focus, SavePrompt, UiState, TAB_EDITOR, TAB_HELP};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

const OUTPUT_SCROLL_STEP: u16 = 5;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend = Arc::new(HttpClient::new(&cfg)?);
    tracing::info!("TUI starting against {}", backend.base_url());

    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut app = App::new(backend, ThemeStore::load(&cfg.theme_path), cfg.language, tx);
    app.startup(args.open.as_deref());

    let mut guard = terminal::TerminalGuard::acquire()?;
    let mut events = EventStream::new();
    let mut render_tick = tokio::time::interval(Duration::from_millis(200));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let res = loop {
        if let Err(e) = guard
            .terminal()
            .draw(|f| draw::draw(f, &app.session, &app.ui, &app.stopwatch))
        {
            break Err(e).context("draw frame");
        }
        if app.should_quit {
            break Ok(());
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                    app.handle_key(key);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e).context("read terminal event"),
                None => break Ok(()),
            },
            Some(completion) = rx.recv() => app.handle_completion(completion),
            _ = app.stopwatch.tick() => {}
            _ = render_tick.tick() => {
                if app.session.is_executing {
                    app.ui.spinner = app.ui.spinner.wrapping_add(1);
                }
            }
        }
    };

    app.shutdown();
    drop(guard);
    res
}

struct App<B> {
    session: Session,
    ui: UiState,
    controller: ExecutionController<B>,
    files: FilePersistenceClient<B>,
    theme: ThemeStore,
    stopwatch: Stopwatch,
    shortcuts: ShortcutDispatcher,
    tx: UnboundedSender<Completion>,
    should_quit: bool,
}

impl<B> App<B>
where
    B: ExecutionBackend + FileStore + Send + Sync + 'static,
{
    fn new(
        backend: Arc<B>,
        theme: ThemeStore,
        language: Language,
        tx: UnboundedSender<Completion>,
    ) -> Self {
        Self {
            session: Session::new(language, theme.mode()),
            ui: UiState::default(),
            controller: ExecutionController::new(Arc::clone(&backend)),
            files: FilePersistenceClient::new(backend),
            theme,
            stopwatch: Stopwatch::new(),
            shortcuts: ShortcutDispatcher::default(),
            tx,
            should_quit: false,
        }
    }

    /// Connectivity check and optional initial file. Neither blocks the UI.
    fn startup(&mut self, open: Option<&str>) {
        self.files.spawn_health(&self.tx);
        if let Some(name) = open {
            self.load(name.to_string());
        }
    }

    fn shutdown(&mut self) {
        self.controller.shutdown();
        self.stopwatch.reset();
        tracing::info!("TUI shut down");
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.shortcuts.dispatch(&key, self.session.is_executing) {
            Dispatch::Run => return self.run_code(),
            Dispatch::Suppressed => return,
            Dispatch::Ignored => {}
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return self.request_quit();
        }
        if self.ui.confirm.is_some() {
            return self.handle_confirm_key(key);
        }
        if self.ui.prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if self.ui.listing.is_visible() {
            return self.handle_listing_key(key);
        }

        if key.code == KeyCode::F(1) {
            self.ui.tab = if self.ui.tab == TAB_HELP {
                TAB_EDITOR
            } else {
                TAB_HELP
            };
            return;
        }
        if self.ui.tab == TAB_HELP {
            if key.code == KeyCode::Esc {
                self.ui.tab = TAB_EDITOR;
            }
            return;
        }

        match (ctrl, key.code) {
            (_, KeyCode::F(5)) | (true, KeyCode::Char('r')) => self.run_code(),
            (true, KeyCode::Char('s')) => self.open_save_prompt(),
            (true, KeyCode::Char('o')) => self.open_file_list(),
            (true, KeyCode::Char('n')) => {
                if self.session.code.is_blank() {
                    self.reset_workspace("New file");
                } else {
                    self.ui.confirm = Some(ConfirmAction::NewFile);
                }
            }
            (true, KeyCode::Char('l')) => self.ui.confirm = Some(ConfirmAction::ClearEditor),
            (true, KeyCode::Char('t')) => self.toggle_theme(),
            (true, KeyCode::Char('y')) => self.copy_output(),
            (_, KeyCode::F(2)) => {
                self.session.stdin_visible = !self.session.stdin_visible;
                self.ui.focus = if self.session.stdin_visible {
                    Focus::Stdin
                } else {
                    Focus::Code
                };
            }
            (_, KeyCode::F(4)) if self.session.stdin_visible => {
                self.ui.focus = match self.ui.focus {
                    Focus::Code => Focus::Stdin,
                    Focus::Stdin => Focus::Code,
                };
            }
            (_, KeyCode::F(6)) => self.stopwatch.toggle(),
            (_, KeyCode::F(7)) => self.stopwatch.reset(),
            (_, KeyCode::PageUp) => {
                self.ui.output_scroll = self.ui.output_scroll.saturating_sub(OUTPUT_SCROLL_STEP);
            }
            (_, KeyCode::PageDown) => {
                self.ui.output_scroll = self.ui.output_scroll.saturating_add(OUTPUT_SCROLL_STEP);
            }
            (false, _) => self.edit(key),
            _ => {}
        }
    }

    /// Text editing on whichever buffer has focus.
    fn edit(&mut self, key: KeyEvent) {
        let on_code = self.ui.focus == Focus::Code || !self.session.stdin_visible;
        let buf = if on_code {
            &mut self.session.code
        } else {
            &mut self.session.input
        };
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => buf.insert_char(c),
            KeyCode::Enter => buf.insert_char('\n'),
            KeyCode::Tab if on_code => buf.indent(),
            KeyCode::BackTab if on_code => buf.outdent(),
            KeyCode::Backspace => buf.backspace(),
            KeyCode::Delete => buf.delete(),
            KeyCode::Left => buf.move_left(),
            KeyCode::Right => buf.move_right(),
            KeyCode::Up => buf.move_up(),
            KeyCode::Down => buf.move_down(),
            KeyCode::Home => buf.move_home(),
            KeyCode::End => buf.move_end(),
            _ => {}
        }
    }

    fn run_code(&mut self) {
        if self.controller.start(&mut self.session, &self.tx) {
            self.ui.output_scroll = 0;
            self.ui.spinner = 0;
        }
    }

    fn request_quit(&mut self) {
        if self.session.has_unsaved_edits() && self.ui.confirm != Some(ConfirmAction::Quit) {
            self.ui.confirm = Some(ConfirmAction::Quit);
        } else {
            self.should_quit = true;
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let accepted = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        let Some(action) = self.ui.confirm.take() else {
            return;
        };
        if !accepted {
            return;
        }
        match action {
            ConfirmAction::NewFile => self.reset_workspace("New file"),
            ConfirmAction::ClearEditor => self.reset_workspace("Editor cleared"),
            ConfirmAction::Delete(name) => {
                self.ui.info = format!("Deleting {name}...");
                self.files.spawn_delete(&name, &self.tx);
            }
            ConfirmAction::LoadDiscarding(name) => self.load(name),
            ConfirmAction::Quit => self.should_quit = true,
        }
    }

    fn reset_workspace(&mut self, info: &str) {
        self.session.reset_workspace();
        self.ui.focus = Focus::Code;
        self.ui.output_scroll = 0;
        self.ui.info = info.to_string();
    }

    fn open_save_prompt(&mut self) {
        if self.session.code.is_blank() {
            self.ui.info = FileOpError::EmptyCode.to_string();
            return;
        }
        self.ui.prompt = Some(SavePrompt::new(suggested_filename(&self.session)));
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.ui.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.ui.prompt = None,
            KeyCode::Enter => {
                let name = prompt.value.trim().to_string();
                match self.files.spawn_save(&self.session, &name, &self.tx) {
                    Ok(()) => {
                        self.ui.prompt = None;
                        self.ui.info = format!("Saving {name}...");
                    }
                    Err(FileOpError::EmptyFilename) => {
                        self.ui.info = FileOpError::EmptyFilename.to_string();
                    }
                    Err(e) => {
                        self.ui.prompt = None;
                        self.ui.info = e.to_string();
                    }
                }
            }
            KeyCode::Backspace => prompt.pop(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => prompt.push(c),
            _ => {}
        }
    }

    fn open_file_list(&mut self) {
        let ticket = self.ui.listing.open();
        self.files.spawn_list(ticket, &self.tx);
    }

    fn handle_listing_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.ui.listing.close(),
            KeyCode::Char('o') if ctrl => self.ui.listing.close(),
            KeyCode::Up | KeyCode::Char('k') => self.ui.listing.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.ui.listing.select_next(),
            KeyCode::Char('r') => self.open_file_list(),
            KeyCode::Enter => {
                if let Some(name) = self.ui.listing.selected().map(|e| e.filename.clone()) {
                    if self.session.has_unsaved_edits() {
                        self.ui.confirm = Some(ConfirmAction::LoadDiscarding(name));
                    } else {
                        self.load(name);
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(entry) = self.ui.listing.selected() {
                    self.ui.confirm = Some(ConfirmAction::Delete(entry.filename.clone()));
                }
            }
            _ => {}
        }
    }

    fn load(&mut self, name: String) {
        self.ui.listing.close();
        self.ui.info = format!("Loading {name}...");
        self.files.spawn_load(&name, &self.tx);
    }

    fn toggle_theme(&mut self) {
        match self.theme.toggle() {
            Ok(mode) => self.session.theme = mode,
            Err(e) => {
                tracing::warn!("theme not persisted to {}: {e}", self.theme.path().display());
                self.session.theme = self.theme.mode();
                self.ui.info = format!("Could not save theme preference: {e}");
            }
        }
    }

    fn copy_output(&mut self) {
        let text = self
            .session
            .result
            .as_ref()
            .and_then(|r| r.output().or_else(|| r.error()))
            .filter(|t| !t.is_empty());
        let Some(text) = text else {
            self.ui.info = "Nothing to copy yet.".into();
            return;
        };
        self.ui.info = match clipboard::copy_to_clipboard(text) {
            Ok(()) => "✓ Copied output to clipboard".into(),
            Err(e) => format!("Clipboard copy failed: {e:#}"),
        };
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Executed { stamp, result } => {
                self.controller.finish_stamped(&mut self.session, stamp, result);
            }
            Completion::Listed { ticket, result } => {
                apply_listing(&mut self.ui.listing, ticket, result);
            }
            Completion::Saved { stamp, result } => {
                self.ui.info = match apply_save(&mut self.session, stamp, result) {
                    Ok(msg) => msg,
                    Err(e) => e.to_string(),
                };
            }
            Completion::Loaded(result) => {
                self.ui.info = match apply_load(&mut self.session, result) {
                    Ok(msg) => {
                        self.ui.output_scroll = 0;
                        msg
                    }
                    Err(e) => e.to_string(),
                };
            }
            Completion::Deleted { filename, result } => {
                // Already gone on the server: the shown listing is stale either way.
                let vanished = matches!(&result, Err(e) if e.is_not_found());
                let outcome =
                    apply_delete(&mut self.session, &mut self.ui.listing, &filename, result);
                let refetch = match outcome {
                    Ok((msg, refetch)) => {
                        self.ui.info = msg;
                        refetch
                    }
                    Err(e) => {
                        self.ui.info = e.to_string();
                        if vanished {
                            self.ui.listing.invalidate()
                        } else {
                            None
                        }
                    }
                };
                if let Some(ticket) = refetch {
                    self.files.spawn_list(ticket, &self.tx);
                }
            }
            Completion::Health(Ok(health)) => {
                tracing::info!("backend health: {}", health.status);
            }
            Completion::Health(Err(e)) => {
                tracing::warn!("backend health check failed: {e}");
                self.session.banner = Some(format!("Backend connection error: {}", e.user_message()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ListingState;
    use crate::test_support::FakeBackend;
    use crate::theme::ThemeMode;
    use crate::timer::TimerPhase;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        app: App<FakeBackend>,
        rx: UnboundedReceiver<Completion>,
        backend: Arc<FakeBackend>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(backend: FakeBackend) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let backend = Arc::new(backend);
            let (tx, rx) = mpsc::unbounded_channel();
            let theme = ThemeStore::load(dir.path().join("theme"));
            let app = App::new(Arc::clone(&backend), theme, Language::Python, tx);
            Self {
                app,
                rx,
                backend,
                _dir: dir,
            }
        }

        fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) {
            self.app.handle_key(KeyEvent::new(code, modifiers));
        }

        fn type_text(&mut self, text: &str) {
            for c in text.chars() {
                let code = if c == '\n' {
                    KeyCode::Enter
                } else {
                    KeyCode::Char(c)
                };
                self.press(code, KeyModifiers::NONE);
            }
        }

        async fn pump(&mut self) {
            let completion = self.rx.recv().await.unwrap();
            self.app.handle_completion(completion);
        }
    }

    #[tokio::test]
    async fn test_ctrl_enter_runs_once_while_pending() {
        let mut h = Harness::new(FakeBackend::gated());
        h.type_text("print(1)");
        h.press(KeyCode::Enter, KeyModifiers::CONTROL);
        assert!(h.app.session.is_executing);
        assert_eq!(h.app.session.code.text(), "print(1)");

        h.press(KeyCode::Enter, KeyModifiers::CONTROL);
        h.press(KeyCode::F(5), KeyModifiers::NONE);
        h.backend.release();
        h.pump().await;

        assert!(!h.app.session.is_executing);
        assert_eq!(h.backend.exec_calls(), 1);
        assert!(h.app.session.result.as_ref().unwrap().is_success());
    }

    #[tokio::test]
    async fn test_load_during_run_drops_the_old_result() {
        let mut h = Harness::new(FakeBackend::gated().with_file("b.py", "print('b')"));
        h.type_text("print('a')");
        h.press(KeyCode::Enter, KeyModifiers::CONTROL);
        h.app.load("b.py".into());
        h.pump().await;
        assert_eq!(h.app.session.code.text(), "print('b')");

        h.backend.release();
        h.pump().await;
        assert!(!h.app.session.is_executing);
        assert!(h.app.session.result.is_none());
        assert_eq!(h.app.session.current_filename.as_deref(), Some("b.py"));
    }

    #[tokio::test]
    async fn test_new_file_during_run_stays_empty() {
        let mut h = Harness::new(FakeBackend::gated());
        h.type_text("print(1)");
        h.press(KeyCode::Enter, KeyModifiers::CONTROL);
        h.press(KeyCode::Char('n'), KeyModifiers::CONTROL);
        h.press(KeyCode::Char('y'), KeyModifiers::NONE);

        h.backend.release();
        h.pump().await;
        assert!(!h.app.session.is_executing);
        assert!(h.app.session.result.is_none());
        assert!(h.app.session.code.text().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_blank_editor_shows_validation_error() {
        let mut h = Harness::new(FakeBackend::new());
        h.type_text("   ");
        h.press(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(h.backend.exec_calls(), 0);
        assert_eq!(
            h.app.session.result.as_ref().unwrap().error(),
            Some(crate::orchestrator::EMPTY_CODE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_tab_and_backtab_edit_indentation() {
        let mut h = Harness::new(FakeBackend::new());
        h.type_text("if x:\n");
        h.press(KeyCode::Tab, KeyModifiers::NONE);
        h.type_text("y");
        assert_eq!(h.app.session.code.text(), "if x:\n    y");
        h.press(KeyCode::Home, KeyModifiers::NONE);
        h.press(KeyCode::End, KeyModifiers::NONE);
        h.press(KeyCode::Left, KeyModifiers::NONE);
        h.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(h.app.session.code.text(), "if x:\ny");
    }

    #[tokio::test]
    async fn test_save_prompt_flow() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(h.app.ui.prompt.is_none());
        assert_eq!(h.app.ui.info, "No code to save.");

        h.type_text("x = 1");
        h.press(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(h.app.ui.prompt.as_ref().unwrap().value, "my_script.py");
        for _ in 0.."my_script.py".len() {
            h.press(KeyCode::Backspace, KeyModifiers::NONE);
        }
        h.type_text("a.py");
        h.press(KeyCode::Enter, KeyModifiers::NONE);
        assert!(h.app.ui.prompt.is_none());
        h.pump().await;

        assert_eq!(h.app.ui.info, "File saved successfully: a.py");
        assert_eq!(h.app.session.current_filename.as_deref(), Some("a.py"));
        assert_eq!(h.backend.stored("a.py").as_deref(), Some("x = 1"));
        assert!(!h.app.session.has_unsaved_edits());
    }

    #[tokio::test]
    async fn test_open_list_and_load_selected() {
        let mut h = Harness::new(FakeBackend::new().with_file("a.py", "print('a')"));
        h.press(KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(h.app.ui.listing.state(), &ListingState::Loading);
        h.pump().await;
        assert_eq!(h.app.ui.listing.entries().len(), 1);

        h.press(KeyCode::Enter, KeyModifiers::NONE);
        assert!(!h.app.ui.listing.is_visible());
        h.pump().await;
        assert_eq!(h.app.session.code.text(), "print('a')");
        assert_eq!(h.app.ui.info, "File loaded successfully: a.py");
    }

    #[tokio::test]
    async fn test_load_over_unsaved_edits_asks_first() {
        let mut h = Harness::new(FakeBackend::new().with_file("a.py", "1"));
        h.type_text("mine");
        h.press(KeyCode::Char('o'), KeyModifiers::CONTROL);
        h.pump().await;
        h.press(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            h.app.ui.confirm,
            Some(ConfirmAction::LoadDiscarding("a.py".into()))
        );
        h.press(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(h.app.session.code.text(), "mine");
        assert_eq!(h.backend.file_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_from_list_refetches_and_clears_current() {
        let mut h = Harness::new(
            FakeBackend::new()
                .with_file("a.py", "1")
                .with_file("b.py", "2"),
        );
        h.app.session.current_filename = Some("a.py".into());
        h.press(KeyCode::Char('o'), KeyModifiers::CONTROL);
        h.pump().await;

        h.press(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(h.app.ui.confirm, Some(ConfirmAction::Delete("a.py".into())));
        h.press(KeyCode::Char('y'), KeyModifiers::NONE);
        h.pump().await;
        assert!(h.app.session.current_filename.is_none());
        assert_eq!(h.app.ui.listing.state(), &ListingState::Loading);

        h.pump().await;
        let names: Vec<_> = h
            .app
            .ui
            .listing
            .entries()
            .iter()
            .map(|e| e.filename.clone())
            .collect();
        assert_eq!(names, ["b.py"]);
    }

    #[tokio::test]
    async fn test_delete_of_vanished_file_refreshes_list() {
        let mut h = Harness::new(FakeBackend::new().with_file("a.py", "1"));
        h.press(KeyCode::Char('o'), KeyModifiers::CONTROL);
        h.pump().await;
        h.backend.delete("a.py").await.unwrap();

        h.press(KeyCode::Delete, KeyModifiers::NONE);
        h.press(KeyCode::Enter, KeyModifiers::NONE);
        h.pump().await;
        assert_eq!(h.app.ui.info, "Error deleting file: File not found");
        h.pump().await;
        assert_eq!(h.app.ui.listing.state(), &ListingState::Ready(vec![]));
    }

    #[tokio::test]
    async fn test_health_failure_sets_banner() {
        let backend = FakeBackend::new();
        backend.set_files_down(true);
        let mut h = Harness::new(backend);
        h.app.startup(None);
        h.pump().await;
        assert!(h
            .app
            .session
            .banner
            .as_deref()
            .unwrap()
            .starts_with("Backend connection error: Network error"));
    }

    #[tokio::test]
    async fn test_open_flag_loads_file_at_startup() {
        let mut h = Harness::new(FakeBackend::new().with_file("start.py", "pass"));
        h.app.startup(Some("start.py"));
        h.pump().await;
        h.pump().await;
        assert_eq!(h.app.session.code.text(), "pass");
        assert_eq!(h.app.session.current_filename.as_deref(), Some("start.py"));
    }

    #[tokio::test]
    async fn test_new_file_confirms_only_with_code() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert!(h.app.ui.confirm.is_none());

        h.type_text("x");
        h.press(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(h.app.ui.confirm, Some(ConfirmAction::NewFile));
        h.press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(h.app.session.code.text(), "x");

        h.press(KeyCode::Char('l'), KeyModifiers::CONTROL);
        h.press(KeyCode::Char('y'), KeyModifiers::NONE);
        assert!(h.app.session.code.text().is_empty());
    }

    #[tokio::test]
    async fn test_theme_toggle_persists() {
        let mut h = Harness::new(FakeBackend::new());
        assert_eq!(h.app.session.theme, ThemeMode::Light);
        h.press(KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(h.app.session.theme, ThemeMode::Dark);
        assert_eq!(ThemeStore::load(h.app.theme.path()).mode(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_stdin_panel_receives_typing() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::F(2), KeyModifiers::NONE);
        h.type_text("42");
        assert_eq!(h.app.session.input.text(), "42");
        h.press(KeyCode::F(4), KeyModifiers::NONE);
        h.type_text("print(input())");
        assert_eq!(h.app.session.code.text(), "print(input())");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_keys() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::F(6), KeyModifiers::NONE);
        assert_eq!(h.app.stopwatch.phase(), TimerPhase::Running);
        h.app.stopwatch.tick().await;
        assert_eq!(h.app.stopwatch.display(), "00:01");
        h.press(KeyCode::F(7), KeyModifiers::NONE);
        assert_eq!(h.app.stopwatch.phase(), TimerPhase::Idle);
        assert_eq!(h.app.stopwatch.display(), "00:00");
    }

    #[tokio::test]
    async fn test_quit_with_unsaved_edits_asks_first() {
        let mut h = Harness::new(FakeBackend::new());
        h.type_text("x");
        h.press(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(!h.app.should_quit);
        h.press(KeyCode::Char('y'), KeyModifiers::NONE);
        assert!(h.app.should_quit);
    }
}
