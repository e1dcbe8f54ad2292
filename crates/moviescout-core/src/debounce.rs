// Coalesces rapid-fire inputs (keystrokes in a search box) into one
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Yields the latest input once inputs stop arriving for `quiet`
pub struct Debouncer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
}

/// Create a sender/debouncer pair
pub fn debounce<T>(quiet: Duration) -> (mpsc::UnboundedSender<T>, Debouncer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Debouncer { rx, quiet })
}

impl<T> Debouncer<T> {
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Wait for the next settled input
    ///
    /// Every new input restarts the quiet period. Closing the sender flushes
    /// a pending input right away; `None` means the sender is gone and
    /// nothing is pending.
    pub async fn next(&mut self) -> Option<T> {
        let mut latest = self.rx.recv().await?;

        loop {
            match timeout(self.quiet, self.rx.recv()).await {
                Ok(Some(value)) => latest = value,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_burst_yields_last_value() {
        let (tx, mut debouncer) = debounce(Duration::from_millis(500));
        let started = Instant::now();

        tx.send("A").unwrap();
        tx.send("Al").unwrap();
        tx.send("Alien").unwrap();

        assert_eq!(debouncer.next().await, Some("Alien"));
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_input_restarts_quiet_period() {
        let (tx, mut debouncer) = debounce(Duration::from_millis(500));
        let started = Instant::now();

        tokio::spawn(async move {
            tx.send("A").unwrap();
            sleep(Duration::from_millis(300)).await;
            tx.send("Al").unwrap();
            sleep(Duration::from_millis(300)).await;
            tx.send("Ali").unwrap();
            // Keep the sender open past the quiet period
            sleep(Duration::from_secs(5)).await;
        });

        assert_eq!(debouncer.next().await, Some("Ali"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1100));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_yield_separately() {
        let (tx, mut debouncer) = debounce(Duration::from_millis(500));

        tx.send(1).unwrap();
        assert_eq!(debouncer.next().await, Some(1));

        tx.send(2).unwrap();
        tx.send(3).unwrap();
        assert_eq!(debouncer.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_closed_sender_flushes_then_ends() {
        let (tx, mut debouncer) = debounce(Duration::from_secs(60));

        tx.send("pending").unwrap();
        drop(tx);

        assert_eq!(debouncer.next().await, Some("pending"));
        assert_eq!(debouncer.next().await, None);
    }
}
