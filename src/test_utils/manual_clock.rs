use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::Clock;

/// Clock that only moves when something sleeps on it
#[derive(Debug)]
pub(crate) struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    pub(crate) fn advance(
        &self,
        by: Duration,
    ) {
        *self.offset.lock() += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }

    async fn sleep(
        &self,
        duration: Duration,
    ) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}
