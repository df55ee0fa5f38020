use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delivers the most recent pushed value to a channel once it has been left
/// alone for `delay`. Each push restarts the timer and drops the previous
/// pending value. Dropping the debouncer cancels any pending delivery.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            tx,
            cancel: CancellationToken::new(),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.cancel_pending();

        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tx.send(value).ok();
                }
            }
        }));
    }

    /// Drop the pending value, if any, without delivering it.
    pub fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    #[allow(dead_code)]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}
