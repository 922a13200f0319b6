/// Runs its closure when dropped, including while a panic unwinds the worker.
pub(crate) struct CompletionGuard<F: FnOnce()> {
    on_complete: Option<F>,
}

impl<F: FnOnce()> CompletionGuard<F> {
    pub(crate) fn new(on_complete: F) -> Self {
        Self {
            on_complete: Some(on_complete),
        }
    }
}

impl<F: FnOnce()> Drop for CompletionGuard<F> {
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}
