//! Single-slot background worker for collaborator requests
//!
//! A worker runs at most one request at a time on its own thread and hands
//! the result back through a channel. Submitting while a request is in
//! flight fails with [`KaraokeError::CollaboratorBusy`] instead of queueing,
//! so two recognitions or renders can never race over the same timeline.

use super::{CancellationToken, Encoder, Recognizer, RecognitionRequest, RenderJob, Transcript};
use crate::error::{KaraokeError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

/// Clears the in-flight flag when the request finishes, even by panic
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Background runner for one collaborator
#[derive(Debug)]
pub struct CollaboratorWorker {
    name: String,
    in_flight: Arc<AtomicBool>,
}

impl CollaboratorWorker {
    /// Worker for the collaborator called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Collaborator name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a request is running
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run `job` on a new thread
    ///
    /// The job receives the task's cancellation token. A panic inside the job
    /// is reported as [`KaraokeError::CollaboratorFailure`].
    ///
    /// # Errors
    ///
    /// Returns [`KaraokeError::CollaboratorBusy`] if a request is already in
    /// flight and [`KaraokeError::Io`] if the thread cannot be started.
    pub fn submit<T, F>(&self, job: F) -> Result<PendingTask<T>>
    where
        T: Send + 'static,
        F: FnOnce(&CancellationToken) -> Result<T> + Send + 'static,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(KaraokeError::CollaboratorBusy {
                collaborator: self.name.clone(),
            });
        }

        let guard = InFlight(Arc::clone(&self.in_flight));
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let name = self.name.clone();
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name(format!("{}-worker", self.name))
            .spawn(move || {
                debug!(collaborator = %name, "request started");
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&worker_token)))
                    .unwrap_or_else(|payload| {
                        let detail = panic_detail(payload.as_ref());
                        error!(collaborator = %name, %detail, "request panicked");
                        Err(KaraokeError::collaborator(&name, detail))
                    });
                debug!(collaborator = %name, ok = outcome.is_ok(), "request finished");
                drop(guard);
                // the caller may have dropped the task
                let _ = sender.send(outcome);
            })
            .map_err(|e| KaraokeError::io(format!("Failed to start {} worker: {e}", self.name)))?;

        Ok(PendingTask {
            receiver,
            token,
            collaborator: self.name.clone(),
        })
    }

    /// Run a recognition request in the background
    ///
    /// # Errors
    ///
    /// Same conditions as [`CollaboratorWorker::submit`].
    pub fn recognize<R>(&self, recognizer: Arc<R>, request: RecognitionRequest) -> Result<PendingTask<Transcript>>
    where
        R: Recognizer + ?Sized + 'static,
    {
        self.submit(move |token| recognizer.recognize(&request, token))
    }

    /// Run a render job in the background
    ///
    /// # Errors
    ///
    /// Same conditions as [`CollaboratorWorker::submit`].
    pub fn encode<E>(&self, encoder: Arc<E>, job: RenderJob) -> Result<PendingTask<()>>
    where
        E: Encoder + ?Sized + 'static,
    {
        self.submit(move |token| encoder.encode(&job, token))
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("worker panicked")
    }
}

/// Handle to a request running on a [`CollaboratorWorker`]
///
/// Delivers exactly one result.
#[derive(Debug)]
pub struct PendingTask<T> {
    receiver: Receiver<Result<T>>,
    token: CancellationToken,
    collaborator: String,
}

impl<T> PendingTask<T> {
    /// Ask the request to stop
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token shared with the running request
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Block until the result arrives
    ///
    /// # Errors
    ///
    /// Returns the request's own error, or
    /// [`KaraokeError::CollaboratorFailure`] if the worker vanished.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or_else(|_| Err(self.lost()))
    }

    /// Wait at most `timeout`; `None` while the request is still running
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.lost())),
        }
    }

    /// Result if already available, without blocking
    pub fn try_result(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.lost())),
        }
    }

    fn lost(&self) -> KaraokeError {
        KaraokeError::collaborator(&self.collaborator, "worker stopped without a result")
    }
}
