use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Process-wide "new data has landed" bit.
///
/// `signal` is idempotent: any number of signals before the consumer drains
/// collapse into a single pending notification. `await_and_clear` suspends
/// without polling until a signal is pending, then atomically clears it.
/// Dropping the returned future cancels the wait cleanly, so a disconnecting
/// consumer does not leak a waiter.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.pending.store(true, Ordering::SeqCst);
        // Stores a permit when nobody is waiting yet, so a consumer that
        // arrives later still wakes immediately.
        self.notify.notify_one();
    }

    pub async fn await_and_clear(&self) {
        loop {
            self.notify.notified().await;
            if self.pending.swap(false, Ordering::SeqCst) {
                return;
            }
        }
    }

    /// Non-blocking view of the pending bit, without clearing it.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn signal_before_wait_returns_immediately() {
        let signal = ChangeSignal::new();
        signal.signal();
        timeout(Duration::from_millis(100), signal.await_and_clear())
            .await
            .expect("pending signal should resolve the wait");
        assert!(!signal.is_pending());
    }

    #[tokio::test]
    async fn wait_blocks_until_signaled() {
        let signal = Arc::new(ChangeSignal::new());

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.await_and_clear().await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        signal.signal();
        timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn repeated_signals_collapse_to_one() {
        let signal = ChangeSignal::new();
        signal.signal();
        signal.signal();
        signal.signal();

        timeout(Duration::from_millis(100), signal.await_and_clear())
            .await
            .expect("first wait resolves");

        // The burst was one notification; a second wait must block.
        assert!(timeout(Duration::from_millis(100), signal.await_and_clear())
            .await
            .is_err());
    }
}
