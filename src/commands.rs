use crate::app_error::{AppError, AppResult};
use crate::clock::Clock;
use crate::data_manager::SessionStore;
use crate::models::{CompletedWorkout, Exercise, WorkoutState};
use crate::session_tracker::WorkoutSessionTracker;
use crate::tick_scheduler::TickScheduler;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start {
        routine_id: Option<String>,
        routine_name: String,
        exercises: Vec<Exercise>,
    },
    Pause,
    Resume,
    Finish,
    Discard,
    UpdateCurrentExercise(String),
    AddCompletedSet,
    UpdateSession {
        routine_id: Option<String>,
        routine_name: String,
        exercises: Vec<Exercise>,
    },
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Done,
    Finished(Option<CompletedWorkout>),
    Discarded(bool),
    Status(WorkoutState),
    Quit,
}

/// Parses one line of input.
///
/// `start` and `update` take `[#<routine id>] <routine name>[: <exercise>, ...]`.
pub fn parse_command(line: &str) -> AppResult<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let command = match verb.to_ascii_lowercase().as_str() {
        "start" => {
            let (routine_id, routine_name, exercises) = parse_routine(rest)?;
            Command::Start {
                routine_id,
                routine_name,
                exercises,
            }
        }
        "update" => {
            let (routine_id, routine_name, exercises) = parse_routine(rest)?;
            Command::UpdateSession {
                routine_id,
                routine_name,
                exercises,
            }
        }
        "exercise" => {
            if rest.is_empty() {
                return Err(AppError::invalid_command("exercise needs a name"));
            }
            Command::UpdateCurrentExercise(rest.to_string())
        }
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "finish" => Command::Finish,
        "discard" => Command::Discard,
        "set" => Command::AddCompletedSet,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        "" => return Err(AppError::invalid_command("empty command")),
        other => return Err(AppError::invalid_command(format!("unknown command: {other}"))),
    };
    Ok(command)
}

fn parse_routine(input: &str) -> AppResult<(Option<String>, String, Vec<Exercise>)> {
    let (head, exercise_list) = match input.split_once(':') {
        Some((head, list)) => (head.trim(), Some(list)),
        None => (input.trim(), None),
    };
    let (routine_id, routine_name) = match head.strip_prefix('#') {
        Some(tagged) => match tagged.split_once(char::is_whitespace) {
            Some((id, name)) => (Some(id.to_string()), name.trim().to_string()),
            None => (Some(tagged.to_string()), String::new()),
        },
        None => (None, head.to_string()),
    };
    if routine_name.is_empty() {
        return Err(AppError::invalid_command("routine name is required"));
    }
    let exercises = exercise_list
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(Exercise::named)
                .collect()
        })
        .unwrap_or_default();
    Ok((routine_id, routine_name, exercises))
}

pub fn dispatch<S, C, T>(
    tracker: &mut WorkoutSessionTracker<S, C, T>,
    command: Command,
) -> CommandReply
where
    S: SessionStore,
    C: Clock,
    T: TickScheduler,
{
    match command {
        Command::Start {
            routine_id,
            routine_name,
            exercises,
        } => {
            tracker.start(routine_id, routine_name, exercises);
            CommandReply::Done
        }
        Command::Pause => {
            tracker.pause();
            CommandReply::Done
        }
        Command::Resume => {
            tracker.resume();
            CommandReply::Done
        }
        Command::Finish => CommandReply::Finished(tracker.finish()),
        Command::Discard => CommandReply::Discarded(tracker.discard()),
        Command::UpdateCurrentExercise(name) => {
            tracker.update_current_exercise(name);
            CommandReply::Done
        }
        Command::AddCompletedSet => {
            tracker.add_completed_set();
            CommandReply::Done
        }
        Command::UpdateSession {
            routine_id,
            routine_name,
            exercises,
        } => {
            tracker.update_session(routine_id, routine_name, exercises);
            CommandReply::Done
        }
        Command::Status => CommandReply::Status(tracker.state()),
        Command::Quit => CommandReply::Quit,
    }
}
