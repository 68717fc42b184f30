use anyhow::{bail, Result};
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

pub async fn retry_with_backoff<T, E, Fut, F>(
    operation: F,
    initial_delay: Duration,
    max_retries: usize,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let mut retries = 0;
    let mut fib = (initial_delay, initial_delay);

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if retries < max_retries => {
                info!(
                    "Operation failed: {:?}. Retrying in {:?} (attempt {}/{})",
                    e,
                    fib.0,
                    retries + 1,
                    max_retries
                );
                sleep(fib.0).await;
                retries += 1;
                fib = (fib.1, fib.0 + fib.1);
            }
            Err(e) => return Err(e),
        }
    }
}

/// What a single poll observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    /// The resource reached the state we were waiting for.
    Ready(T),
    /// Still transitioning; the string is the status reported by the service.
    Pending(String),
    /// The resource can no longer reach the wanted state.
    Failed(String),
}

/// Calls `check` until it reports `Ready`, sleeping `interval` between calls.
///
/// Fails when a check reports `Failed` or after `max_attempts` checks.
pub async fn poll_until<T, Fut, F>(
    what: &str,
    mut check: F,
    interval: Duration,
    max_attempts: usize,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    for attempt in 1..=max_attempts {
        match check().await? {
            PollState::Ready(value) => {
                info!("{what} is ready after {attempt} attempt(s)");
                return Ok(value);
            }
            PollState::Failed(reason) => bail!("{what} failed: {reason}"),
            PollState::Pending(status) => {
                debug!("{what} is {status} (attempt {attempt}/{max_attempts})");
                if attempt < max_attempts {
                    sleep(interval).await;
                }
            }
        }
    }
    bail!("{what} was not ready after {max_attempts} attempts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retry_returns_first_success() {
        let calls = AtomicUsize::new(0);
        let result: Result<usize, String> = retry_with_backoff(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(format!("failure {n}"))
                } else {
                    Ok(n)
                }
            },
            Duration::from_millis(10),
            5,
        )
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_retries() {
        let calls = AtomicUsize::new(0);
        let started = tokio::time::Instant::now();
        let result: Result<(), &str> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("nope")
            },
            Duration::from_secs(1),
            3,
        )
        .await;
        assert_eq!(result, Err("nope"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 1 + 1 + 2 seconds of Fibonacci backoff.
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_until_waits_for_ready() {
        let mut states = vec![
            PollState::Pending("CREATING".to_string()),
            PollState::Pending("CREATING".to_string()),
            PollState::Ready("ACTIVE"),
        ]
        .into_iter();
        let value = poll_until(
            "table",
            || {
                let next = states.next();
                async move { Ok(next.expect("status checked too often")) }
            },
            Duration::from_secs(5),
            10,
        )
        .await
        .unwrap();
        assert_eq!(value, "ACTIVE");
    }

    #[tokio::test(start_paused = true)]
    async fn poll_until_stops_on_failure() {
        let err = poll_until::<(), _, _>(
            "bot",
            || async { Ok(PollState::Failed("intent missing".to_string())) },
            Duration::from_secs(1),
            10,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("intent missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_until_runs_out_of_attempts() {
        let calls = AtomicUsize::new(0);
        let err = poll_until::<(), _, _>(
            "job",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(PollState::Pending("IN_PROGRESS".to_string()))
            },
            Duration::from_secs(1),
            3,
        )
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("3 attempts"));
    }
}
