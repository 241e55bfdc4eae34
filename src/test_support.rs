//! In-process doubles for the remote collaborators.

use crate::api::{ExecutionBackend, FileStore};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    ExecutionRequest, ExecutionResponse, FileEntry, FileListing, HealthResponse, LoadedFile,
    MessageResponse, SavedFile,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// What `execute` answers with.
#[derive(Debug, Clone)]
pub(crate) enum ExecReply {
    Ok(ExecutionResponse),
    Unreachable,
    Status(u16, Option<String>),
}

pub(crate) struct FakeBackend {
    exec_reply: Mutex<ExecReply>,
    exec_calls: AtomicUsize,
    last_request: Mutex<Option<ExecutionRequest>>,
    gate: Option<Notify>,
    files: Mutex<BTreeMap<String, String>>,
    file_calls: AtomicUsize,
    files_down: AtomicBool,
    append_py: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            exec_reply: Mutex::new(ExecReply::Ok(ExecutionResponse::default())),
            exec_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            gate: None,
            files: Mutex::new(BTreeMap::new()),
            file_calls: AtomicUsize::new(0),
            files_down: AtomicBool::new(false),
            append_py: false,
        }
    }

    /// `execute` blocks until [`FakeBackend::release`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new()
        }
    }

    /// Store appends `.py` to names without an extension, like a normalizing server.
    pub fn normalizing() -> Self {
        Self {
            append_py: true,
            ..Self::new()
        }
    }

    pub fn with_reply(self, reply: ExecReply) -> Self {
        *self.exec_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_file(self, name: &str, code: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), code.to_string());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_files_down(&self, down: bool) {
        self.files_down.store(down, Ordering::SeqCst);
    }

    pub fn exec_calls(&self) -> usize {
        self.exec_calls.load(Ordering::SeqCst)
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ExecutionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn stored(&self, name: &str) -> Option<String> {
        self.files.lock().unwrap().get(name).cloned()
    }

    fn file_call(&self) -> ApiResult<()> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        if self.files_down.load(Ordering::SeqCst) {
            return Err(ApiError::Connect);
        }
        Ok(())
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            detail: Some("File not found".into()),
        }
    }
}

impl ExecutionBackend for FakeBackend {
    async fn execute(&self, request: ExecutionRequest) -> ApiResult<ExecutionResponse> {
        self.exec_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = self.exec_reply.lock().unwrap().clone();
        match reply {
            ExecReply::Ok(resp) => Ok(resp),
            ExecReply::Unreachable => Err(ApiError::Connect),
            ExecReply::Status(status, detail) => Err(ApiError::Status { status, detail }),
        }
    }
}

impl FileStore for FakeBackend {
    async fn list_files(&self) -> ApiResult<FileListing> {
        self.file_call()?;
        let files: Vec<FileEntry> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, code)| FileEntry {
                filename: name.clone(),
                size_bytes: code.len() as u64,
                modified: "2024-05-01T12:00:00".into(),
            })
            .collect();
        Ok(FileListing {
            count: files.len(),
            files,
        })
    }

    async fn save(&self, code: &str, filename: &str) -> ApiResult<SavedFile> {
        self.file_call()?;
        if filename.contains('/') {
            return Err(ApiError::Status {
                status: 400,
                detail: Some("Invalid filename".into()),
            });
        }
        let name = if self.append_py && !filename.contains('.') {
            format!("{filename}.py")
        } else {
            filename.to_string()
        };
        self.files
            .lock()
            .unwrap()
            .insert(name.clone(), code.to_string());
        Ok(SavedFile {
            message: "File saved successfully".into(),
            filename: name,
        })
    }

    async fn load(&self, filename: &str) -> ApiResult<LoadedFile> {
        self.file_call()?;
        let code = self.files.lock().unwrap().get(filename).cloned();
        match code {
            Some(code) => Ok(LoadedFile {
                code,
                filename: filename.to_string(),
            }),
            None => Err(Self::not_found()),
        }
    }

    async fn delete(&self, filename: &str) -> ApiResult<MessageResponse> {
        self.file_call()?;
        let removed = self.files.lock().unwrap().remove(filename);
        match removed {
            Some(_) => Ok(MessageResponse {
                message: format!("File {filename} deleted successfully"),
            }),
            None => Err(Self::not_found()),
        }
    }

    async fn health(&self) -> ApiResult<HealthResponse> {
        self.file_call()?;
        Ok(HealthResponse {
            status: "healthy".into(),
        })
    }
}
