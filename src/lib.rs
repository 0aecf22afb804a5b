pub mod app_error;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod data_manager;
pub mod duration_accumulator;
pub mod events;
pub mod logging;
pub mod models;
pub mod recovery_state;
pub mod session_recovery;
pub mod session_tracker;
pub mod tick_scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data_manager::{DataError, DataManager, MemorySessionStore, SessionStore};
pub use events::{SessionEventKind, SessionObserver, SessionUpdate};
pub use models::{CompletedWorkout, Exercise, ExerciseSet, WorkoutSession, WorkoutState};
pub use session_recovery::{recover_session, RecoveryOutcome};
pub use session_tracker::{TrackerSettings, WorkoutSessionTracker};
pub use tick_scheduler::{IntervalScheduler, ManualScheduler, Tick, TickScheduler};
