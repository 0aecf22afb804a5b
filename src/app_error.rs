use crate::data_manager::DataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand(message.into())
    }

    /// Whether the host loop can keep accepting commands after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::InvalidCommand(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;
    use crate::data_manager::DataError;
    use std::io;

    #[test]
    fn only_bad_input_is_recoverable() {
        assert!(AppError::invalid_command("jump").is_recoverable());
        assert!(!AppError::config("config.toml", "bad level").is_recoverable());
        let io_err = || io::Error::other("disk gone");
        assert!(!AppError::Io(io_err()).is_recoverable());
        assert!(!AppError::from(DataError::Io(io_err())).is_recoverable());
    }
}
