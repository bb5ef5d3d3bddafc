use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cancellation flag shared between a receiver and whoever wants to stop its command.
///
/// Clones share the same state: once any clone is cancelled, all of them report cancelled.
/// A flag never goes back to not-cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}
