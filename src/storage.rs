//! Local persistence for engine runs.
//!
//! Each run lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   run.json         # Run metadata
//!   events.jsonl     # The engine's event stream, verbatim
//! ```

use std::{fs, io, path::PathBuf};

use io::Write;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::run::RunRecord;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("run not found: {0}")]
    RunNotFound(Uuid),

    #[error("run already exists: {0}")]
    RunAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for run records.
pub struct RunStore {
    root: PathBuf,
}

/// Append handle for a run's raw event stream.
pub struct EventLog {
    file: fs::File,
}

impl EventLog {
    /// Append one raw line from the engine.
    pub fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")
    }
}

impl RunStore {
    /// Creates a new store rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Creates a new run, writing its metadata to disk.
    pub fn create_run(&self, run: &RunRecord) -> Result<()> {
        let dir = self.run_dir(run.id);
        if dir.exists() {
            return Err(StorageError::RunAlreadyExists(run.id));
        }
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(run)?;
        fs::write(dir.join("run.json"), json)?;
        debug!(run = %run.id, "created run record");
        Ok(())
    }

    /// Updates a run's metadata on disk.
    pub fn update_run(&self, run: &RunRecord) -> Result<()> {
        let path = self.run_dir(run.id).join("run.json");
        if !path.exists() {
            return Err(StorageError::RunNotFound(run.id));
        }
        let json = serde_json::to_string_pretty(run)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a single run's metadata.
    pub fn load_run(&self, id: Uuid) -> Result<RunRecord> {
        let path = self.run_dir(id).join("run.json");
        if !path.exists() {
            return Err(StorageError::RunNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Lists all runs, oldest first.
    ///
    /// Records that can't be read or parsed are logged and left out.
    pub fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let mut runs = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(runs),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path().join("run.json");
            if !path.is_file() {
                continue;
            }
            let parsed: Result<RunRecord> = fs::read_to_string(&path)
                .map_err(StorageError::from)
                .and_then(|json| Ok(serde_json::from_str(&json)?));
            match parsed {
                Ok(run) => runs.push(run),
                Err(e) => warn!(path = %path.display(), "skipping unreadable run record: {e}"),
            }
        }
        runs.sort_by(|a: &RunRecord, b: &RunRecord| a.started_at.cmp(&b.started_at));
        Ok(runs)
    }

    /// Opens a run's event stream for appending.
    pub fn open_event_log(&self, id: Uuid) -> Result<EventLog> {
        let dir = self.run_dir(id);
        if !dir.exists() {
            return Err(StorageError::RunNotFound(id));
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("events.jsonl"))?;
        Ok(EventLog { file })
    }

    /// Path to a run's recorded event stream.
    pub fn events_path(&self, id: Uuid) -> PathBuf {
        self.run_dir(id).join("events.jsonl")
    }

    fn run_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}
