use std::{fmt::Display, future::Future, time::Duration};

use crate::config::RetryConfig;

/// Fixed delay retries, no jitter and no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.delay_ms))
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }

    pub fn max_attempts(&self) -> u32 { self.max_attempts }

    /// Runs `op` until it succeeds or `max_attempts` are used up,
    /// the error of the last attempt is returned as is.
    /// `op` gets the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "attempt {attempt}/{} failed: {err}, retrying in {:?}",
                        self.max_attempts, self.delay,
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                },
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts_with_last_error() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let res: Result<(), String> = RetryPolicy::default().run(|attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("connection refused ({attempt})")) }
        }).await;

        assert_eq!(res, Err("connection refused (3)".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // two delays between three attempts
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2), "{waited:?}");
        assert!(waited < Duration::from_secs(3), "{waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let calls = AtomicU32::new(0);

        let res = RetryPolicy::default().run(|attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 { Err("timeout") } else { Ok(attempt) }
            }
        }).await;

        assert_eq!(res, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn success_needs_no_delay() {
        let start = std::time::Instant::now();
        let res: Result<_, String> = RetryPolicy::new(3, Duration::from_secs(30))
            .run(|_| async { Ok("menu") }).await;

        assert_eq!(res, Ok("menu"));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_means_one() {
        let policy = RetryPolicy::from(&RetryConfig { max_attempts: 0, delay_ms: 10 });
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy, RetryPolicy::new(1, Duration::from_millis(10)));
    }
}
