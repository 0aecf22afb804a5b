use crate::recovery_state::PersistedSession;
use serde::Serialize;
use std::cell::RefCell;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

const ACTIVE_SESSION_FILE: &str = "active_session.json";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type DataResult<T> = Result<T, DataError>;

/// Durable home of the live session record. Writes replace the whole record.
pub trait SessionStore {
    fn load_active_session(&self) -> DataResult<Option<PersistedSession>>;
    fn save_active_session(&self, record: &PersistedSession) -> DataResult<()>;
    fn clear_active_session(&self) -> DataResult<()>;
}

#[derive(Debug, Clone)]
pub struct DataManager {
    active_session_path: PathBuf,
}

impl DataManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> DataResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        let active_session_path = base_dir.join(ACTIVE_SESSION_FILE);
        Ok(Self {
            active_session_path,
        })
    }

    pub fn active_session_path(&self) -> &Path {
        &self.active_session_path
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> DataResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let file = fs::File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        match fs::rename(&temp_path, path) {
            Ok(()) => Ok(()),
            Err(_err) if path.exists() => {
                let _ = fs::remove_file(path);
                fs::rename(&temp_path, path).map_err(DataError::from)
            }
            Err(err) => Err(DataError::from(err)),
        }
    }
}

impl SessionStore for DataManager {
    fn load_active_session(&self) -> DataResult<Option<PersistedSession>> {
        if !self.active_session_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.active_session_path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let record = serde_json::from_str(&contents)?;
        Ok(Some(record))
    }

    fn save_active_session(&self, record: &PersistedSession) -> DataResult<()> {
        self.write_json(&self.active_session_path, record)
    }

    fn clear_active_session(&self) -> DataResult<()> {
        match fs::remove_file(&self.active_session_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DataError::from(err)),
        }
    }
}

/// In-process store. Clones share the same slot, which lets a test play the
/// part of the disk across a simulated restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }

    /// Stores raw text as-is, including text that will not decode.
    pub fn put_raw(&self, contents: impl Into<String>) {
        *self.slot.borrow_mut() = Some(contents.into());
    }
}

impl SessionStore for MemorySessionStore {
    fn load_active_session(&self) -> DataResult<Option<PersistedSession>> {
        match self.slot.borrow().as_deref() {
            Some(contents) => Ok(Some(serde_json::from_str(contents)?)),
            None => Ok(None),
        }
    }

    fn save_active_session(&self, record: &PersistedSession) -> DataResult<()> {
        let contents = serde_json::to_string(record)?;
        *self.slot.borrow_mut() = Some(contents);
        Ok(())
    }

    fn clear_active_session(&self) -> DataResult<()> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}
