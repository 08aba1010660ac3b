//! Connect: plan lookup, preflight, then the shell.
//!
//! Every failure before the shell opens aborts the connect with nothing done
//! on the remote side.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::plan::{FilePlanner, PlanError};

use super::{Preflight, Shell, ShellError};

/// Why a connect didn't happen, or didn't finish cleanly.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("plan file {} does not exist", .0.display())]
    PlanMissing(PathBuf),

    #[error("error reading plan file: {0}")]
    PlanRead(#[source] PlanError),

    #[error("host {0:?} not found in the plan")]
    HostNotFound(String),

    #[error("cannot validate SSH connection to node {host:?}")]
    ValidationFailed { host: String, errors: Vec<String> },

    #[error("error trying to connect to host {host:?}: {source}")]
    Shell {
        host: String,
        #[source]
        source: ShellError,
    },
}

/// Open a shell on `host`, running `command` if one is given.
///
/// The preflight always runs first; the shell is never opened when it fails.
/// An interrupted session counts as success.
pub fn connect(
    planner: &FilePlanner,
    host: &str,
    command: &[String],
    preflight: &impl Preflight,
    shell: &impl Shell,
) -> Result<(), ConnectError> {
    if !planner.exists() {
        return Err(ConnectError::PlanMissing(planner.path().to_path_buf()));
    }
    let plan = planner.read().map_err(ConnectError::PlanRead)?;

    let conn = plan.ssh_connection(host).map_err(|e| match e {
        PlanError::NodeNotFound(host) => ConnectError::HostNotFound(host),
        other => ConnectError::PlanRead(other),
    })?;

    if let Err(errors) = preflight.validate(&conn) {
        warn!(host, failures = errors.len(), "preflight failed");
        return Err(ConnectError::ValidationFailed {
            host: host.to_string(),
            errors,
        });
    }

    match shell.open(&conn, command) {
        Ok(()) => Ok(()),
        Err(ShellError::Interrupted) => {
            info!(host, "session interrupted locally");
            Ok(())
        }
        Err(source) => Err(ConnectError::Shell {
            host: host.to_string(),
            source,
        }),
    }
}
