use chrono::{DateTime, Duration, Utc};

/// Source of "now" for anything session- or token-related. Production code
/// uses [`SystemClock`]; tests inject a fake.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A user session described by its last activity and an idle timeout.
/// Token expiry is derived from this, so session lifetime rules live in one
/// place instead of ambient timestamp reads scattered around the callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySession {
    last_active: DateTime<Utc>,
    idle_timeout: Duration,
}

impl ActivitySession {
    pub fn started(clock: &impl Clock, idle_timeout: Duration) -> Self {
        Self {
            last_active: clock.now(),
            idle_timeout,
        }
    }

    /// Records fresh activity, pushing the expiry window forward.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.last_active = clock.now();
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.last_active + self.idle_timeout
    }

    pub fn is_expired(&self, clock: &impl Clock) -> bool {
        clock.now() >= self.expires_at()
    }
}
