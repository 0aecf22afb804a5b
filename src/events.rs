use crate::models::WorkoutSession;
use serde::Serialize;

const WORKOUT_STARTED_EVENT: &str = "workout-started";
const WORKOUT_PAUSED_EVENT: &str = "workout-paused";
const WORKOUT_RESUMED_EVENT: &str = "workout-resumed";
const WORKOUT_UPDATED_EVENT: &str = "workout-updated";
const WORKOUT_TICK_EVENT: &str = "workout-tick";
const WORKOUT_FINISHED_EVENT: &str = "workout-finished";
const WORKOUT_DISCARDED_EVENT: &str = "workout-discarded";
const WORKOUT_RECOVERED_EVENT: &str = "workout-recovered";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEventKind {
    Started,
    Paused,
    Resumed,
    Updated,
    Tick,
    Finished,
    Discarded,
    Recovered,
}

impl SessionEventKind {
    pub fn event_name(self) -> &'static str {
        match self {
            SessionEventKind::Started => WORKOUT_STARTED_EVENT,
            SessionEventKind::Paused => WORKOUT_PAUSED_EVENT,
            SessionEventKind::Resumed => WORKOUT_RESUMED_EVENT,
            SessionEventKind::Updated => WORKOUT_UPDATED_EVENT,
            SessionEventKind::Tick => WORKOUT_TICK_EVENT,
            SessionEventKind::Finished => WORKOUT_FINISHED_EVENT,
            SessionEventKind::Discarded => WORKOUT_DISCARDED_EVENT,
            SessionEventKind::Recovered => WORKOUT_RECOVERED_EVENT,
        }
    }
}

/// Everything an observer needs to redraw, published after each mutation and
/// each tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub kind: SessionEventKind,
    pub formatted_duration: String,
    pub elapsed_seconds: u64,
    pub current_exercise_label: String,
    pub is_active: bool,
    pub session: Option<WorkoutSession>,
}

impl SessionUpdate {
    pub fn event_name(&self) -> &'static str {
        self.kind.event_name()
    }
}

pub trait SessionObserver {
    fn on_update(&mut self, update: &SessionUpdate);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionUpdate),
{
    fn on_update(&mut self, update: &SessionUpdate) {
        self(update)
    }
}

#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn SessionObserver>>,
}

impl ObserverList {
    pub fn push(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, update: &SessionUpdate) {
        tracing::trace!(event = update.event_name(), "publishing session update");
        for observer in &mut self.observers {
            observer.on_update(update);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
