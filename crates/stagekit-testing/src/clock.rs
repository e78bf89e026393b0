//! A clock that never sleeps, recording what was asked of it.

use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use stagekit_runtime::Clock;

#[derive(Default)]
pub struct ManualClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    /// Durations requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
