//! Run lifecycle controller.
//!
//! A run is split into `begin` (validation, single-flight guard, clearing),
//! the remote call, and `finish` (projection into the session). `run` chains
//! the three for callers that can simply await; `start` spawns the remote call
//! and reports back through a [`Completion`] for the event loop.

use super::Completion;
use crate::api::ExecutionBackend;
use crate::error::ApiResult;
use crate::model::{ExecutionRequest, ExecutionResponse, ExecutionResult};
use crate::session::{CodeStamp, Session};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub(crate) const EMPTY_CODE_MESSAGE: &str = "Please enter some code to execute.";

/// How a `run` ended, for callers that need an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunStatus {
    /// Another run was in flight; nothing happened.
    Ignored,
    /// Blank code; no request was made.
    Rejected,
    Succeeded,
    ProgramFailed,
    TransportFailed,
    /// The workspace was replaced while the request was in flight; the
    /// response was dropped.
    Superseded,
}

pub(crate) struct ExecutionController<B> {
    backend: Arc<B>,
    in_flight: Option<JoinHandle<()>>,
}

impl<B> ExecutionController<B>
where
    B: ExecutionBackend + Send + Sync + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: None,
        }
    }

    /// Validate and claim the single-flight slot.
    ///
    /// Returns the request to dispatch, or `None` when the run ends here: either
    /// another run is in flight (no-op) or the code is blank (validation error,
    /// prior result cleared).
    pub fn begin(&self, session: &mut Session) -> Option<ExecutionRequest> {
        if session.is_executing {
            tracing::debug!("run ignored: a request is already in flight");
            return None;
        }
        if session.code.is_blank() {
            tracing::debug!("run rejected: empty code");
            session.result = Some(ExecutionResult::validation(EMPTY_CODE_MESSAGE));
            return None;
        }

        // Clear before dispatch so nothing stale shows while pending.
        session.is_executing = true;
        session.result = None;
        session.banner = None;

        Some(ExecutionRequest::new(
            session.code.text(),
            session.language,
            session.input.text(),
        ))
    }

    /// Project a resolved request into the session and release the slot.
    pub fn finish(
        &mut self,
        session: &mut Session,
        response: ApiResult<ExecutionResponse>,
    ) -> RunStatus {
        session.is_executing = false;
        self.in_flight = None;
        match response {
            Ok(resp) => {
                let result = ExecutionResult::from_response(resp);
                let status = if result.is_success() {
                    RunStatus::Succeeded
                } else {
                    RunStatus::ProgramFailed
                };
                tracing::info!(
                    "run finished: {:?} ({:?}s)",
                    status,
                    result.execution_time_seconds
                );
                session.result = Some(result);
                status
            }
            Err(e) => {
                tracing::warn!("run failed in transport: {e}");
                session.result = None;
                session.banner = Some(e.user_message());
                RunStatus::TransportFailed
            }
        }
    }

    /// Await a whole run in place. Exactly one remote call, never retried.
    pub async fn run(&mut self, session: &mut Session) -> RunStatus {
        let Some(request) = self.begin(session) else {
            return if session.is_executing {
                RunStatus::Ignored
            } else {
                RunStatus::Rejected
            };
        };
        let response = self.backend.execute(request).await;
        self.finish(session, response)
    }

    /// Begin a run and spawn its remote call; the result arrives as
    /// [`Completion::Executed`] and must be handed to [`Self::finish_stamped`].
    ///
    /// Returns false when nothing was dispatched.
    pub fn start(&mut self, session: &mut Session, tx: &UnboundedSender<Completion>) -> bool {
        let Some(request) = self.begin(session) else {
            return false;
        };
        let stamp = session.stamp();
        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let response = backend.execute(request).await;
            let _ = tx.send(Completion::Executed {
                stamp,
                result: response,
            });
        }));
        true
    }

    /// Like [`Self::finish`], but a response for code that was since replaced
    /// (load, new file, clear) only releases the slot.
    pub fn finish_stamped(
        &mut self,
        session: &mut Session,
        stamp: CodeStamp,
        response: ApiResult<ExecutionResponse>,
    ) -> RunStatus {
        if session.is_current(stamp) {
            return self.finish(session, response);
        }
        tracing::debug!("run response dropped: workspace replaced while in flight");
        session.is_executing = false;
        self.in_flight = None;
        RunStatus::Superseded
    }

    /// Abort an in-flight request on teardown. The session is not touched.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
