use crate::clock::Clock;
use crate::data_manager::SessionStore;
use crate::duration_accumulator::{active_elapsed, format_elapsed, span_between, TimingState};
use crate::events::{ObserverList, SessionEventKind, SessionObserver, SessionUpdate};
use crate::models::{CompletedWorkout, Exercise, WorkoutSession, WorkoutState};
use crate::recovery_state::PersistedSession;
use crate::tick_scheduler::{Tick, TickScheduler, DEFAULT_TICK_INTERVAL};
use std::time::Duration;

pub const DEFAULT_EXERCISE_LABEL: &str = "No exercise";
const FALLBACK_ROUTINE_NAME: &str = "Workout";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub tick_interval: Duration,
    pub idle_exercise_label: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            idle_exercise_label: DEFAULT_EXERCISE_LABEL.to_string(),
        }
    }
}

/// Owns the live workout and its timing. Commands that do not apply to the
/// current state are ignored; store failures are logged and dropped.
#[derive(Debug)]
pub struct WorkoutSessionTracker<S, C, T> {
    store: S,
    clock: C,
    scheduler: T,
    settings: TrackerSettings,
    session: Option<WorkoutSession>,
    timing: TimingState,
    observers: ObserverList,
}

impl<S, C, T> WorkoutSessionTracker<S, C, T>
where
    S: SessionStore,
    C: Clock,
    T: TickScheduler,
{
    /// Builds an idle tracker without looking at the store. Use
    /// [`WorkoutSessionTracker::open`] at process start.
    pub fn new(store: S, clock: C, scheduler: T, settings: TrackerSettings) -> Self {
        Self {
            store,
            clock,
            scheduler,
            settings,
            session: None,
            timing: TimingState::default(),
            observers: ObserverList::default(),
        }
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn start(
        &mut self,
        routine_id: Option<String>,
        routine_name: impl Into<String>,
        exercises: Vec<Exercise>,
    ) {
        let now = self.clock.now();
        let routine_name = non_blank_name(routine_name.into());
        if self.session.is_some() {
            tracing::info!("starting a new workout over the current one");
        }
        self.timing.reset();
        let current_exercise = WorkoutSession::first_exercise_name(&exercises);
        self.session = Some(WorkoutSession {
            routine_id,
            routine_name,
            exercises,
            start_time: now,
            is_active: true,
            current_exercise,
            paused_at: None,
            completed_sets: 0,
        });
        tracing::info!(routine = %self.routine_name(), "workout started");
        self.persist();
        self.scheduler.start(self.settings.tick_interval);
        self.publish(SessionEventKind::Started);
    }

    pub fn pause(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.is_active {
            tracing::debug!("pause ignored, workout already paused");
            return;
        }
        let now = self.clock.now();
        self.timing.mark_paused(now);
        self.session = Some(WorkoutSession {
            is_active: false,
            paused_at: Some(now),
            ..session.clone()
        });
        tracing::debug!(elapsed = self.elapsed().as_secs(), "workout paused");
        self.persist();
        self.scheduler.stop();
        self.publish(SessionEventKind::Paused);
    }

    pub fn resume(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.is_active {
            tracing::debug!("resume ignored, workout already running");
            return;
        }
        let now = self.clock.now();
        let paused_for = self.timing.mark_resumed(now);
        self.session = Some(WorkoutSession {
            is_active: true,
            paused_at: None,
            ..session.clone()
        });
        tracing::debug!(
            paused_secs = paused_for.as_secs(),
            total_paused_secs = self.timing.total_paused.as_secs(),
            "workout resumed"
        );
        self.persist();
        self.scheduler.start(self.settings.tick_interval);
        self.publish(SessionEventKind::Resumed);
    }

    /// Ends the workout and hands back what the history collaborator needs.
    pub fn finish(&mut self) -> Option<CompletedWorkout> {
        let session = self.session.as_ref()?;
        let now = self.clock.now();
        let ongoing_pause = self
            .timing
            .last_pause
            .map(|paused_at| span_between(paused_at, now))
            .unwrap_or(Duration::ZERO);
        let completed = CompletedWorkout {
            routine_id: session.routine_id.clone(),
            routine_name: session.routine_name.clone(),
            exercises: session.exercises.clone(),
            started_at: session.start_time,
            ended_at: now,
            active_seconds: self.elapsed().as_secs(),
            paused_seconds: self.timing.total_paused.saturating_add(ongoing_pause).as_secs(),
            completed_sets: session.completed_sets,
        };
        tracing::info!(
            routine = %completed.routine_name,
            active_secs = completed.active_seconds,
            "workout finished"
        );
        self.close(SessionEventKind::Finished);
        Some(completed)
    }

    /// Drops the workout without a summary. Returns whether one existed.
    pub fn discard(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }
        tracing::info!(routine = %self.routine_name(), "workout discarded");
        self.close(SessionEventKind::Discarded);
        true
    }

    pub fn update_current_exercise(&mut self, name: impl Into<String>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.session = Some(WorkoutSession {
            current_exercise: Some(name.into()),
            ..session.clone()
        });
        self.persist();
        self.publish(SessionEventKind::Updated);
    }

    pub fn add_completed_set(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.session = Some(WorkoutSession {
            completed_sets: session.completed_sets.saturating_add(1),
            ..session.clone()
        });
        self.persist();
        self.publish(SessionEventKind::Updated);
    }

    /// Replaces routine identity and exercises. Timing and the pause state
    /// are kept; focus moves to the first exercise if the old one is gone.
    pub fn update_session(
        &mut self,
        routine_id: Option<String>,
        routine_name: impl Into<String>,
        exercises: Vec<Exercise>,
    ) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let current_exercise = match &session.current_exercise {
            Some(name) if exercises.iter().any(|exercise| &exercise.name == name) => {
                Some(name.clone())
            }
            _ => WorkoutSession::first_exercise_name(&exercises),
        };
        self.session = Some(WorkoutSession {
            routine_id,
            routine_name: non_blank_name(routine_name.into()),
            exercises,
            current_exercise,
            ..session.clone()
        });
        self.persist();
        self.publish(SessionEventKind::Updated);
    }

    /// Called by the host each time the scheduler fires.
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        self.publish(SessionEventKind::Tick);
    }

    /// Delivers a tick received from the scheduler, dropping any that were
    /// queued for a timer that has since been stopped or replaced.
    pub fn on_tick(&mut self, tick: Tick) {
        if !self.scheduler.is_current(tick) {
            tracing::trace!(generation = tick.generation, "dropping stale tick");
            return;
        }
        self.tick();
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_active)
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|session| !session.is_active)
    }

    pub fn current_snapshot(&self) -> Option<&WorkoutSession> {
        self.session.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        match &self.session {
            Some(session) => active_elapsed(self.clock.now(), session.start_time, &self.timing),
            None => Duration::ZERO,
        }
    }

    pub fn formatted_duration(&self) -> String {
        format_elapsed(self.elapsed())
    }

    pub fn total_paused(&self) -> Duration {
        self.timing.total_paused
    }

    pub fn current_exercise_label(&self) -> String {
        self.session
            .as_ref()
            .and_then(|session| session.current_exercise.clone())
            .unwrap_or_else(|| self.settings.idle_exercise_label.clone())
    }

    pub fn state(&self) -> WorkoutState {
        let elapsed = self.elapsed();
        WorkoutState {
            has_session: self.session.is_some(),
            is_active: self.is_active(),
            is_paused: self.is_paused(),
            elapsed_seconds: elapsed.as_secs(),
            formatted_duration: format_elapsed(elapsed),
            current_exercise: self
                .session
                .as_ref()
                .and_then(|session| session.current_exercise.clone()),
            completed_sets: self
                .session
                .as_ref()
                .map(|session| session.completed_sets)
                .unwrap_or(0),
        }
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn install_recovered(&mut self, session: WorkoutSession, timing: TimingState) {
        let active = session.is_active;
        self.session = Some(session);
        self.timing = timing;
        self.persist();
        if active {
            self.scheduler.start(self.settings.tick_interval);
        } else {
            self.scheduler.stop();
        }
        self.publish(SessionEventKind::Recovered);
    }

    fn close(&mut self, kind: SessionEventKind) {
        self.session = None;
        self.timing.reset();
        self.erase();
        self.scheduler.stop();
        self.publish(kind);
    }

    fn routine_name(&self) -> &str {
        self.session
            .as_ref()
            .map(|session| session.routine_name.as_str())
            .unwrap_or_default()
    }

    fn persist(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let record = PersistedSession::capture(session, &self.timing);
        if let Err(err) = self.store.save_active_session(&record) {
            tracing::warn!(error = %err, "failed to persist workout session");
        }
    }

    fn erase(&self) {
        if let Err(err) = self.store.clear_active_session() {
            tracing::warn!(error = %err, "failed to erase persisted workout session");
        }
    }

    fn publish(&mut self, kind: SessionEventKind) {
        if self.observers.is_empty() {
            return;
        }
        let elapsed = self.elapsed();
        let update = SessionUpdate {
            kind,
            formatted_duration: format_elapsed(elapsed),
            elapsed_seconds: elapsed.as_secs(),
            current_exercise_label: self.current_exercise_label(),
            is_active: self.is_active(),
            session: self.session.clone(),
        };
        self.observers.publish(&update);
    }
}

fn non_blank_name(name: String) -> String {
    if name.trim().is_empty() {
        FALLBACK_ROUTINE_NAME.to_string()
    } else {
        name
    }
}
