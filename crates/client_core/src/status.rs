use std::time::{Duration, Instant};

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_millis(3500);

/// Ephemeral one-line status. A new message replaces the old one and restarts
/// the timer.
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
    ttl: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::with_ttl(STATUS_TTL)
    }
}

impl StatusLine {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { message: None, ttl }
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.set_at(message, Instant::now());
    }

    pub fn set_at(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some((message.into(), now));
    }

    pub fn current(&self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&str> {
        let (message, set_at) = self.message.as_ref()?;
        (now.saturating_duration_since(*set_at) < self.ttl).then_some(message.as_str())
    }

    /// Time left before the current message expires.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        let (_, set_at) = self.message.as_ref()?;
        self.ttl
            .checked_sub(now.saturating_duration_since(*set_at))
            .filter(|left| !left.is_zero())
    }
}
