//! Client-side orchestration.
//!
//! This module owns the run lifecycle (validation, single-flight, dispatch,
//! projection) and the file workflow (list/save/load/delete with local-state
//! reconciliation). Remote calls run as spawned tasks; their results come back
//! to the owner of the session as [`Completion`] messages so the session is
//! only ever mutated from one place.

mod controller;
mod files;

pub(crate) use controller::{ExecutionController, RunStatus, EMPTY_CODE_MESSAGE};
pub(crate) use files::{
    apply_delete, apply_listing, apply_load, apply_save, suggested_filename, FileOpError,
    FilePersistenceClient, Listing, ListingState,
};

use crate::error::ApiResult;
use crate::model::{
    ExecutionResponse, FileListing, HealthResponse, LoadedFile, MessageResponse, SavedFile,
};
use crate::session::CodeStamp;

/// A resolved remote call, delivered back to the session owner.
#[derive(Debug)]
pub(crate) enum Completion {
    Executed {
        stamp: CodeStamp,
        result: ApiResult<ExecutionResponse>,
    },
    Listed {
        ticket: u64,
        result: ApiResult<FileListing>,
    },
    Saved {
        stamp: CodeStamp,
        result: ApiResult<SavedFile>,
    },
    Loaded(ApiResult<LoadedFile>),
    Deleted {
        filename: String,
        result: ApiResult<MessageResponse>,
    },
    Health(ApiResult<HealthResponse>),
}
