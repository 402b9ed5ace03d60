//! Shared "data changed" signal between the scanner and the calendar view.

use std::sync::Arc;

use tokio::sync::watch;

/// Monotonic generation counter. Mutating actions bump it; views remember the
/// generation they last fetched at and refetch when it moves.
#[derive(Clone)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn bump(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Receiver for callers that want to await changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}
