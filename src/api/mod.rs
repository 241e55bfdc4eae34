//! Remote collaborators: the execution engine and the file store.
//!
//! Both are expressed as traits so the orchestration layer can be driven by
//! in-process doubles in tests. [`HttpClient`] is the production
//! implementation of both.

mod http;

pub use http::HttpClient;

use crate::error::ApiResult;
use crate::model::{
    ExecutionRequest, ExecutionResponse, FileListing, HealthResponse, LoadedFile,
    MessageResponse, SavedFile,
};

/// Accepts code plus optional stdin, answers with output/error/timing.
#[trait_variant::make(ExecutionBackend: Send)]
pub trait LocalExecutionBackend {
    async fn execute(&self, request: ExecutionRequest) -> ApiResult<ExecutionResponse>;
}

/// Persists named text blobs on the server.
#[trait_variant::make(FileStore: Send)]
pub trait LocalFileStore {
    async fn list_files(&self) -> ApiResult<FileListing>;

    async fn save(&self, code: &str, filename: &str) -> ApiResult<SavedFile>;

    async fn load(&self, filename: &str) -> ApiResult<LoadedFile>;

    async fn delete(&self, filename: &str) -> ApiResult<MessageResponse>;

    async fn health(&self) -> ApiResult<HealthResponse>;
}
