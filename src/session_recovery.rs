use crate::clock::Clock;
use crate::data_manager::SessionStore;
use crate::duration_accumulator::{active_elapsed, format_elapsed, TimingState};
use crate::events::SessionObserver;
use crate::models::WorkoutSession;
use crate::recovery_state::PersistedSession;
use crate::session_tracker::{TrackerSettings, WorkoutSessionTracker};
use crate::tick_scheduler::TickScheduler;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Nothing was stored.
    NoSession,
    /// A record existed but could not be read; it has been erased.
    Discarded,
    Active { elapsed: Duration },
    Paused { elapsed: Duration },
}

impl<S, C, T> WorkoutSessionTracker<S, C, T>
where
    S: SessionStore,
    C: Clock,
    T: TickScheduler,
{
    /// Creates the tracker and restores whatever the store holds. This is the
    /// process-start entry point; no command should reach the tracker before
    /// it returns.
    pub fn open(
        store: S,
        clock: C,
        scheduler: T,
        settings: TrackerSettings,
    ) -> (Self, RecoveryOutcome) {
        let mut tracker = Self::new(store, clock, scheduler, settings);
        let outcome = recover_session(&mut tracker);
        (tracker, outcome)
    }

    /// Like [`open`](Self::open), with `observer` subscribed before recovery
    /// runs so it also receives the recovered update.
    pub fn open_observed(
        store: S,
        clock: C,
        scheduler: T,
        settings: TrackerSettings,
        observer: impl SessionObserver + 'static,
    ) -> (Self, RecoveryOutcome) {
        let mut tracker = Self::new(store, clock, scheduler, settings);
        tracker.subscribe(observer);
        let outcome = recover_session(&mut tracker);
        (tracker, outcome)
    }
}

pub fn recover_session<S, C, T>(tracker: &mut WorkoutSessionTracker<S, C, T>) -> RecoveryOutcome
where
    S: SessionStore,
    C: Clock,
    T: TickScheduler,
{
    let record = match tracker.store().load_active_session() {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!("no stored workout to recover");
            return RecoveryOutcome::NoSession;
        }
        Err(err) => {
            tracing::warn!(error = %err, "stored workout is unreadable, discarding it");
            if let Err(err) = tracker.store().clear_active_session() {
                tracing::warn!(error = %err, "failed to erase unreadable workout record");
            }
            return RecoveryOutcome::Discarded;
        }
    };

    let now = tracker.clock().now();
    let (session, timing) = reconcile(record, now);
    let elapsed = active_elapsed(now, session.start_time, &timing);
    let active = session.is_active;
    tracing::info!(
        routine = %session.routine_name,
        active,
        elapsed = %format_elapsed(elapsed),
        "recovered workout"
    );
    tracker.install_recovered(session, timing);

    if active {
        RecoveryOutcome::Active { elapsed }
    } else {
        RecoveryOutcome::Paused { elapsed }
    }
}

/// Rebuilds the snapshot and timing from a stored record. The raw fields take
/// precedence over the embedded snapshot when the two disagree.
fn reconcile(record: PersistedSession, now: DateTime<Utc>) -> (WorkoutSession, TimingState) {
    let start_time = record.start_instant();
    let total_paused = record.total_paused();
    let is_active = record.is_active;
    let last_pause = if is_active {
        None
    } else {
        Some(
            record
                .last_pause_instant()
                .or(record.session.paused_at)
                .unwrap_or(now),
        )
    };
    let current_exercise = record
        .current_exercise
        .clone()
        .or_else(|| record.session.current_exercise.clone());

    let session = WorkoutSession {
        start_time,
        is_active,
        paused_at: last_pause,
        current_exercise,
        ..record.session
    };
    let timing = TimingState {
        total_paused,
        last_pause,
    };
    (session, timing)
}
