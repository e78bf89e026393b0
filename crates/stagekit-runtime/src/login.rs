//! Login/logout window polling as an explicit state machine.
//!
//! The host runtime opens an auth window the core cannot observe directly;
//! all it can do is poll the window's closed-state and then check whether
//! a profile (dis)appeared. The clock is injectable so tests never sleep.

use std::time::Duration;

use futures::future::BoxFuture;

/// Injectable timer.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Production clock backed by tokio.
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// The auth popup, as far as the core can see it.
pub trait AuthWindow {
    fn is_closed(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    AwaitingWindowClose,
    CheckingProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Success,
    /// The attempt cap ran out; callers surface a terminal "timed out".
    TimedOut,
}

/// Capped single-shot poll loop.
///
/// `awaiting-window-close → checking-profile → {success | retry |
/// exhausted}`; the caller drives the profile check between ticks, since
/// only it can refresh the status.
pub struct LoginPoll {
    max_attempts: u32,
    interval: Duration,
    attempts: u32,
    state: PollState,
}

impl Default for LoginPoll {
    fn default() -> Self {
        LoginPoll::new(5, Duration::from_secs(1))
    }
}

impl LoginPoll {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        LoginPoll {
            max_attempts,
            interval,
            attempts: 0,
            state: PollState::AwaitingWindowClose,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait one interval. Returns `false` once the cap is exhausted.
    pub async fn tick(&mut self, clock: &dyn Clock) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        clock.sleep(self.interval).await;
        self.attempts += 1;
        true
    }

    /// The window was observed closed; move on to profile checking.
    pub fn window_closed(&mut self) {
        self.state = PollState::CheckingProfile;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct InstantClock;

    impl Clock for InstantClock {
        fn sleep(&self, _duration: Duration) -> BoxFuture<'_, ()> {
            Box::pin(async {})
        }
    }

    #[tokio::test]
    async fn exhausts_after_the_cap() {
        let mut poll = LoginPoll::new(3, Duration::from_millis(1));
        let mut ticks = 0;
        while poll.tick(&InstantClock).await {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert_eq!(poll.attempts(), 3);
    }

    #[tokio::test]
    async fn transitions_on_window_close() {
        let mut poll = LoginPoll::default();
        assert_eq!(poll.state(), PollState::AwaitingWindowClose);
        assert!(poll.tick(&InstantClock).await);
        poll.window_closed();
        assert_eq!(poll.state(), PollState::CheckingProfile);
    }
}
