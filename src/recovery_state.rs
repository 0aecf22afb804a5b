use crate::duration_accumulator::TimingState;
use crate::models::WorkoutSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Durable record of the live session. The raw timing fields are stored next
/// to the encoded snapshot so recovery never has to derive them from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub session: WorkoutSession,
    pub start_time: f64,
    pub total_paused_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pause_time: Option<f64>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_exercise: Option<String>,
}

impl PersistedSession {
    pub fn capture(session: &WorkoutSession, timing: &TimingState) -> Self {
        Self {
            session: session.clone(),
            start_time: to_epoch_seconds(session.start_time),
            total_paused_duration: timing.total_paused.as_secs_f64(),
            last_pause_time: timing.last_pause.map(to_epoch_seconds),
            is_active: session.is_active,
            current_exercise: session.current_exercise.clone(),
        }
    }

    pub fn start_instant(&self) -> DateTime<Utc> {
        from_epoch_seconds(self.start_time).unwrap_or(self.session.start_time)
    }

    pub fn last_pause_instant(&self) -> Option<DateTime<Utc>> {
        self.last_pause_time.and_then(from_epoch_seconds)
    }

    /// Negative, non-finite and out-of-range totals read as zero.
    pub fn total_paused(&self) -> Duration {
        Duration::try_from_secs_f64(self.total_paused_duration).unwrap_or(Duration::ZERO)
    }
}

pub fn to_epoch_seconds(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 1000.0
}

pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::{from_epoch_seconds, to_epoch_seconds, PersistedSession};
    use crate::duration_accumulator::TimingState;
    use crate::models::{Exercise, WorkoutSession};
    use chrono::DateTime;
    use std::time::Duration;

    fn paused_session() -> WorkoutSession {
        let start = DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp");
        WorkoutSession {
            routine_id: Some("routine-1".to_string()),
            routine_name: "Leg Day".to_string(),
            exercises: vec![Exercise::named("Squat")],
            start_time: start,
            is_active: false,
            current_exercise: Some("Squat".to_string()),
            paused_at: DateTime::from_timestamp(1_700_000_010, 0),
            completed_sets: 2,
        }
    }

    #[test]
    fn capture_writes_raw_timing_fields() {
        let session = paused_session();
        let timing = TimingState {
            total_paused: Duration::from_millis(4_500),
            last_pause: session.paused_at,
        };

        let record = PersistedSession::capture(&session, &timing);

        assert_eq!(record.start_time, 1_700_000_000.0);
        assert_eq!(record.total_paused_duration, 4.5);
        assert_eq!(record.last_pause_time, Some(1_700_000_010.0));
        assert!(!record.is_active);
        assert_eq!(record.current_exercise.as_deref(), Some("Squat"));
    }

    #[test]
    fn serializes_with_record_keys() {
        let session = paused_session();
        let record = PersistedSession::capture(&session, &TimingState::default());
        let value = serde_json::to_value(&record).expect("serialize");

        for key in ["session", "start_time", "total_paused_duration", "is_active"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("last_pause_time").is_none());
        assert_eq!(value["session"]["routineName"], "Leg Day");
    }

    #[test]
    fn negative_or_invalid_paused_total_reads_as_zero() {
        let mut record =
            PersistedSession::capture(&paused_session(), &TimingState::default());
        record.total_paused_duration = -3.0;
        assert_eq!(record.total_paused(), Duration::ZERO);
        record.total_paused_duration = f64::NAN;
        assert_eq!(record.total_paused(), Duration::ZERO);
    }

    #[test]
    fn oversized_paused_total_reads_as_zero() {
        let mut record =
            PersistedSession::capture(&paused_session(), &TimingState::default());
        for value in [1e30, f64::MAX, f64::INFINITY] {
            record.total_paused_duration = value;
            assert_eq!(record.total_paused(), Duration::ZERO, "value {value}");
        }
        record.total_paused_duration = 90.5;
        assert_eq!(record.total_paused(), Duration::from_millis(90_500));
    }

    #[test]
    fn epoch_seconds_keep_millisecond_precision() {
        let instant = DateTime::from_timestamp_millis(1_700_000_000_250).expect("timestamp");
        let seconds = to_epoch_seconds(instant);
        assert_eq!(from_epoch_seconds(seconds), Some(instant));
        assert_eq!(from_epoch_seconds(f64::INFINITY), None);
    }
}
