use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Monotonic time source and waiter used by every polling loop
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(
        &self,
        duration: Duration,
    );
}

/// Clock backed by the tokio timer. Honours `tokio::time::pause`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(
        &self,
        duration: Duration,
    ) {
        tokio::time::sleep(duration).await
    }
}

/// Calls `attempt` until it yields a value or `timeout` has elapsed.
///
/// One step: call, inspect, sleep `interval`, then compare the elapsed time
/// against `timeout`. On timeout the error of the last attempt is returned.
pub(crate) async fn poll_until<T, E, F, Fut>(
    clock: &dyn Clock,
    interval: Duration,
    timeout: Duration,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = clock.now();
    loop {
        let last = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        clock.sleep(interval).await;

        if clock.now().saturating_duration_since(started) >= timeout {
            return Err(last);
        }
    }
}
