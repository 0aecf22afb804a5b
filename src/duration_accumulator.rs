use chrono::{DateTime, Utc};
use std::time::Duration;

/// Timing internals that live next to the snapshot but are not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimingState {
    pub total_paused: Duration,
    pub last_pause: Option<DateTime<Utc>>,
}

impl TimingState {
    pub fn mark_paused(&mut self, now: DateTime<Utc>) {
        self.last_pause = Some(now);
    }

    /// Folds the pause that just ended into the running total and returns the
    /// interval that was added.
    pub fn mark_resumed(&mut self, now: DateTime<Utc>) -> Duration {
        let Some(paused_at) = self.last_pause.take() else {
            return Duration::ZERO;
        };
        let paused_for = span_between(paused_at, now);
        self.total_paused = self.total_paused.saturating_add(paused_for);
        paused_for
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Active time since `start`, excluding paused intervals. While paused the
/// value is frozen at the pause instant.
pub fn active_elapsed(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    timing: &TimingState,
) -> Duration {
    let until = timing.last_pause.unwrap_or(now);
    span_between(start, until).saturating_sub(timing.total_paused)
}

/// Clamps to zero when `to` precedes `from`.
pub fn span_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    to.signed_duration_since(from)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format_duration(elapsed.as_secs())
}
