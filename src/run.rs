//! Run types: one execution of the automation engine against a plan.

use std::path::PathBuf;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single engine run, recorded so it can be listed and replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: Uuid,
    pub playbook: PathBuf,
    pub plan_file: PathBuf,
    pub started_at: Timestamp,
    pub status: RunStatus,
}

/// Where a run stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RunStatus {
    /// The engine is running, or keel exited before it finished.
    Running,

    /// The engine exited successfully.
    #[serde(rename_all = "camelCase")]
    Succeeded { finished_at: Timestamp },

    /// The engine failed or couldn't be started.
    #[serde(rename_all = "camelCase")]
    Failed {
        finished_at: Timestamp,
        reason: String,
    },
}

impl RunRecord {
    /// A new run, started now.
    pub fn start(playbook: impl Into<PathBuf>, plan_file: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            playbook: playbook.into(),
            plan_file: plan_file.into(),
            started_at: Timestamp::now(),
            status: RunStatus::Running,
        }
    }

    /// Mark the run finished with the engine's outcome.
    pub fn finish<E: ToString>(&mut self, outcome: &Result<(), E>) {
        let finished_at = Timestamp::now();
        self.status = match outcome {
            Ok(()) => RunStatus::Succeeded { finished_at },
            Err(e) => RunStatus::Failed {
                finished_at,
                reason: e.to_string(),
            },
        };
    }

    /// First eight characters of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
