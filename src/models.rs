use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub reps: u32,
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

impl Exercise {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            sets: Vec::new(),
        }
    }
}

/// Immutable view of an in-progress workout. Every transition builds a new
/// value instead of editing one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub routine_id: Option<String>,
    pub routine_name: String,
    pub exercises: Vec<Exercise>,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
    pub current_exercise: Option<String>,
    pub paused_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_sets: u32,
}

impl WorkoutSession {
    pub fn first_exercise_name(exercises: &[Exercise]) -> Option<String> {
        exercises.first().map(|exercise| exercise.name.clone())
    }
}

/// Summary handed to the history collaborator when a workout is finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    pub routine_id: Option<String>,
    pub routine_name: String,
    pub exercises: Vec<Exercise>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub active_seconds: u64,
    pub paused_seconds: u64,
    pub completed_sets: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutState {
    pub has_session: bool,
    pub is_active: bool,
    pub is_paused: bool,
    pub elapsed_seconds: u64,
    pub formatted_duration: String,
    pub current_exercise: Option<String>,
    pub completed_sets: u32,
}
