// Processor Shutdown Token

use tokio::sync::watch;

/// Shutdown signal for graceful termination
///
/// Dropping the `ShutdownSender` counts as a shutdown request.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait for shutdown signal (returns at once if already requested)
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to the processor
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_wait_pending_until_signal() {
        let (tx, mut token) = shutdown_channel();
        let mut wait = task::spawn(token.wait());

        assert_pending!(wait.poll());
        tx.shutdown();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
    }

    #[tokio::test]
    async fn test_wait_returns_after_signal() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());

        tx.shutdown();
        assert!(token.is_shutdown());

        // Already signalled: must not block
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .expect("wait should return immediately");
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .expect("wait should stay ready");
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, mut token) = shutdown_channel();
        drop(tx);
        assert!(token.is_shutdown());
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .expect("wait should return once the sender is gone");
    }
}
