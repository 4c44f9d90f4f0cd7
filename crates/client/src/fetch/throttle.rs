//! Minimum spacing between outgoing requests.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a fixed minimum delay between consecutive requests.
///
/// The first request goes out immediately. The lock is held while sleeping so
/// concurrent callers queue up behind each other.
#[derive(Clone)]
pub struct Throttle {
    min_delay: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self { min_delay, last_request: Arc::new(Mutex::new(None)) }
    }

    /// Wait until a request may be sent, then record it as sent.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!(wait_ms = (ready_at - now).as_millis() as u64, "throttling request");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}
