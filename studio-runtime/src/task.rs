use crate::completion::CompletionGuard;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("failed to spawn task '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("task '{0}' panicked")]
    Panicked(String),
    #[error("task '{0}' was already joined")]
    AlreadyJoined(String),
}

/// Handed to the work closure; shared with the owning [`BackgroundTask`].
#[derive(Debug, Clone)]
pub struct TaskContext {
    name: String,
    cancelled: Arc<AtomicBool>,
    progress: Arc<AtomicU8>,
}

impl TaskContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Percentage, clamped to 100.
    pub fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::Release);
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }
}

/// A named worker thread with cooperative cancellation and completion signaling.
pub struct BackgroundTask<T> {
    context: TaskContext,
    finished: Arc<AtomicBool>,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn spawn<F>(name: &str, work: F) -> Result<Self, TaskError>
    where
        F: FnOnce(&TaskContext) -> T + Send + 'static,
    {
        Self::spawn_with_completion(name, work, || {})
    }

    /// `on_complete` runs on the worker once `work` returns or unwinds.
    pub fn spawn_with_completion<F, C>(name: &str, work: F, on_complete: C) -> Result<Self, TaskError>
    where
        F: FnOnce(&TaskContext) -> T + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let context = TaskContext {
            name: name.to_string(),
            cancelled: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(AtomicU8::new(0)),
        };
        let finished = Arc::new(AtomicBool::new(false));

        let worker_context = context.clone();
        let worker_finished = finished.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _guard = CompletionGuard::new(move || {
                    worker_finished.store(true, Ordering::Release);
                    on_complete();
                });
                log::debug!("task '{}' started", worker_context.name());
                let result = work(&worker_context);
                log::debug!("task '{}' finished", worker_context.name());
                result
            })
            .map_err(|source| TaskError::Spawn {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            context,
            finished,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn cancel(&self) {
        log::debug!("cancelling task '{}'", self.context.name());
        self.context.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn progress(&self) -> u8 {
        self.context.progress()
    }

    /// Blocks until the worker exits.
    pub fn join(&mut self) -> Result<T, TaskError> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| TaskError::AlreadyJoined(self.context.name.clone()))?;
        handle
            .join()
            .map_err(|_| TaskError::Panicked(self.context.name.clone()))
    }
}
