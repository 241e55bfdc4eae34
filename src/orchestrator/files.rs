//! Remote file workflow and local-state reconciliation.

use super::Completion;
use crate::api::FileStore;
use crate::error::{ApiError, ApiResult};
use crate::model::{FileEntry, FileListing, LoadedFile, MessageResponse, SavedFile};
use crate::session::{CodeStamp, Session};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Pre-filled name for the save prompt on an unnamed buffer.
pub(crate) const DEFAULT_FILENAME: &str = "my_script.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileOp {
    List,
    Save,
    Load,
    Delete,
}

impl FileOp {
    fn prefix(self) -> &'static str {
        match self {
            FileOp::List => "",
            FileOp::Save => "Error saving file: ",
            FileOp::Load => "Error loading file: ",
            FileOp::Delete => "Error deleting file: ",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum FileOpError {
    #[error("No code to save.")]
    EmptyCode,
    #[error("Please enter a filename.")]
    EmptyFilename,
    #[error("{}{}", .op.prefix(), .source.user_message())]
    Remote { op: FileOp, source: ApiError },
}

impl FileOpError {
    fn remote(op: FileOp) -> impl FnOnce(ApiError) -> Self {
        move |source| {
            tracing::warn!("{op:?} failed: {source}");
            FileOpError::Remote { op, source }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ListingState {
    Hidden,
    Loading,
    Ready(Vec<FileEntry>),
    Failed(String),
}

/// The directory listing as shown in the file overlay.
///
/// Each fetch is stamped with a ticket; a response carrying an older ticket
/// than the current one is dropped. Closing the overlay and every successful
/// delete bump the ticket, so a listing fetched before a delete never shows.
#[derive(Debug)]
pub(crate) struct Listing {
    state: ListingState,
    ticket: u64,
    selected: usize,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            state: ListingState::Hidden,
            ticket: 0,
            selected: 0,
        }
    }
}

impl Listing {
    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != ListingState::Hidden
    }

    /// Show the overlay in its loading state and hand out the ticket for
    /// the fetch that should fill it.
    pub fn open(&mut self) -> u64 {
        self.ticket += 1;
        self.state = ListingState::Loading;
        self.selected = 0;
        self.ticket
    }

    pub fn close(&mut self) {
        self.ticket += 1;
        self.state = ListingState::Hidden;
    }

    /// Make any in-flight or shown listing stale. Returns a fresh ticket when
    /// the overlay is visible and must be refetched.
    pub fn invalidate(&mut self) -> Option<u64> {
        if self.is_visible() {
            Some(self.open())
        } else {
            self.ticket += 1;
            None
        }
    }

    /// Apply a fetched listing. Returns false when the response was stale.
    pub fn apply(&mut self, ticket: u64, result: Result<Vec<FileEntry>, FileOpError>) -> bool {
        if ticket != self.ticket || !self.is_visible() {
            tracing::debug!("dropping stale listing (ticket {ticket}, current {})", self.ticket);
            return false;
        }
        self.state = match result {
            Ok(files) => ListingState::Ready(files),
            Err(e) => ListingState::Failed(e.to_string()),
        };
        self.clamp_selection();
        true
    }

    pub fn entries(&self) -> &[FileEntry] {
        match &self.state {
            ListingState::Ready(files) => files,
            _ => &[],
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&FileEntry> {
        self.entries().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.entries().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Wraps the remote store. Each operation has an awaiting form, used by the
/// one-shot modes and tests, and a `spawn_*` form whose result comes back as a
/// [`Completion`] and is reconciled with the matching `apply_*`.
pub(crate) struct FilePersistenceClient<S> {
    store: Arc<S>,
}

impl<S> FilePersistenceClient<S>
where
    S: FileStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<FileEntry>, FileOpError> {
        let listing = self
            .store
            .list_files()
            .await
            .map_err(FileOpError::remote(FileOp::List))?;
        Ok(listing.files)
    }

    pub async fn refresh(&self, listing: &mut Listing) {
        let ticket = listing.open();
        let result = self.list().await;
        listing.apply(ticket, result);
    }

    pub async fn save(&self, session: &mut Session, filename: &str) -> Result<String, FileOpError> {
        let (code, filename, stamp) = Self::save_args(session, filename)?;
        let result = self.store.save(&code, &filename).await;
        apply_save(session, stamp, result)
    }

    pub async fn load(&self, session: &mut Session, filename: &str) -> Result<String, FileOpError> {
        let result = self.store.load(filename).await;
        apply_load(session, result)
    }

    pub async fn delete(
        &self,
        session: &mut Session,
        listing: &mut Listing,
        filename: &str,
    ) -> Result<String, FileOpError> {
        let result = self.store.delete(filename).await;
        let (message, refetch) = apply_delete(session, listing, filename, result)?;
        if let Some(ticket) = refetch {
            let result = self.list().await;
            listing.apply(ticket, result);
        }
        Ok(message)
    }

    pub fn spawn_list(&self, ticket: u64, tx: &UnboundedSender<Completion>) {
        let store = Arc::clone(&self.store);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = store.list_files().await;
            let _ = tx.send(Completion::Listed { ticket, result });
        });
    }

    /// Validation failures are returned immediately; nothing is sent.
    pub fn spawn_save(
        &self,
        session: &Session,
        filename: &str,
        tx: &UnboundedSender<Completion>,
    ) -> Result<(), FileOpError> {
        let (code, filename, stamp) = Self::save_args(session, filename)?;
        let store = Arc::clone(&self.store);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = store.save(&code, &filename).await;
            let _ = tx.send(Completion::Saved { stamp, result });
        });
        Ok(())
    }

    pub fn spawn_load(&self, filename: &str, tx: &UnboundedSender<Completion>) {
        let store = Arc::clone(&self.store);
        let tx = tx.clone();
        let filename = filename.to_string();
        tokio::spawn(async move {
            let result = store.load(&filename).await;
            let _ = tx.send(Completion::Loaded(result));
        });
    }

    pub fn spawn_delete(&self, filename: &str, tx: &UnboundedSender<Completion>) {
        let store = Arc::clone(&self.store);
        let tx = tx.clone();
        let filename = filename.to_string();
        tokio::spawn(async move {
            let result = store.delete(&filename).await;
            let _ = tx.send(Completion::Deleted { filename, result });
        });
    }

    pub fn spawn_health(&self, tx: &UnboundedSender<Completion>) {
        let store = Arc::clone(&self.store);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = store.health().await;
            let _ = tx.send(Completion::Health(result));
        });
    }

    fn save_args(
        session: &Session,
        filename: &str,
    ) -> Result<(String, String, CodeStamp), FileOpError> {
        if session.code.is_blank() {
            return Err(FileOpError::EmptyCode);
        }
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(FileOpError::EmptyFilename);
        }
        Ok((
            session.code.text().to_string(),
            filename.to_string(),
            session.stamp(),
        ))
    }
}

/// The save prompt's initial value.
pub(crate) fn suggested_filename(session: &Session) -> String {
    session
        .current_filename
        .clone()
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// The server-confirmed name becomes current; edits made after `revision`
/// was captured still count as unsaved.
/// The file name only follows the save when the buffer it was taken from is
/// still the one being edited.
pub(crate) fn apply_save(
    session: &mut Session,
    stamp: CodeStamp,
    result: ApiResult<SavedFile>,
) -> Result<String, FileOpError> {
    let saved = result.map_err(FileOpError::remote(FileOp::Save))?;
    tracing::info!("saved {}", saved.filename);
    session.banner = None;
    let message = format!("File saved successfully: {}", saved.filename);
    if session.mark_saved_at(stamp) {
        session.current_filename = Some(saved.filename);
    } else {
        tracing::debug!("workspace replaced during save of {}", saved.filename);
    }
    Ok(message)
}

pub(crate) fn apply_load(
    session: &mut Session,
    result: ApiResult<LoadedFile>,
) -> Result<String, FileOpError> {
    let loaded = result.map_err(FileOpError::remote(FileOp::Load))?;
    tracing::info!("loaded {} ({} bytes)", loaded.filename, loaded.code.len());
    let message = format!("File loaded successfully: {}", loaded.filename);
    session.replace_code(loaded.code, loaded.filename);
    session.banner = None;
    Ok(message)
}

/// Returns the message and, when the overlay is open, the ticket for the
/// mandatory refetch.
pub(crate) fn apply_delete(
    session: &mut Session,
    listing: &mut Listing,
    filename: &str,
    result: ApiResult<MessageResponse>,
) -> Result<(String, Option<u64>), FileOpError> {
    let resp = result.map_err(FileOpError::remote(FileOp::Delete))?;
    tracing::info!("deleted {filename}");
    if session.current_filename.as_deref() == Some(filename) {
        session.current_filename = None;
    }
    session.banner = None;
    let message = if resp.message.is_empty() {
        format!("File {filename} deleted successfully")
    } else {
        resp.message
    };
    Ok((message, listing.invalidate()))
}

pub(crate) fn apply_listing(listing: &mut Listing, ticket: u64, result: ApiResult<FileListing>) -> bool {
    let result = result
        .map(|l| l.files)
        .map_err(FileOpError::remote(FileOp::List));
    listing.apply(ticket, result)
}
