//! Shell: open an interactive session, or run a command, on a node.
//!
//! Backed by the system `ssh` client. Its stdio is the operator's terminal.

use std::io;
use std::process::{Command, ExitStatus};

use tracing::info;

use crate::plan::SshConnection;

/// Exit status a shell reports when it was ended with Control-C.
const INTERRUPTED_STATUS: i32 = 130;

/// Signal number of SIGINT.
const SIGINT: i32 = 2;

/// Errors from a remote shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The operator interrupted the session. Not a failure.
    #[error("interrupted")]
    Interrupted,

    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("remote session exited with status {0}")]
    Exited(i32),

    #[error("ssh was terminated by signal {0}")]
    Killed(i32),
}

/// Opens a shell on a node.
pub trait Shell {
    /// Open a session and block until it ends.
    ///
    /// An empty `command` means an interactive login shell.
    fn open(&self, conn: &SshConnection<'_>, command: &[String]) -> Result<(), ShellError>;
}

/// The system OpenSSH client.
#[derive(Debug, Clone)]
pub struct OpenSsh {
    program: String,
}

impl OpenSsh {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, conn: &SshConnection<'_>, command: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        if !conn.key_path().as_os_str().is_empty() {
            cmd.arg("-i").arg(conn.key_path());
        }
        cmd.arg("-p")
            .arg(conn.port().to_string())
            .args(["-o", "StrictHostKeyChecking=no"])
            .args(["-o", "UserKnownHostsFile=/dev/null"])
            .arg("-o")
            .arg(format!("ConnectionAttempts={}", conn.retries()))
            .arg(format!("{}@{}", conn.username(), conn.address()));
        if !command.is_empty() {
            cmd.arg(command.join(" "));
        }
        cmd
    }
}

impl Default for OpenSsh {
    fn default() -> Self {
        Self::new("ssh")
    }
}

impl Shell for OpenSsh {
    fn open(&self, conn: &SshConnection<'_>, command: &[String]) -> Result<(), ShellError> {
        info!(host = conn.host(), address = conn.address(), "opening shell");
        let status = self
            .command(conn, command)
            .status()
            .map_err(|source| ShellError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        classify(status.code(), signal(status))
    }
}

/// Map how the client ended to a result. Control-C is not an error.
fn classify(code: Option<i32>, signal: Option<i32>) -> Result<(), ShellError> {
    match (code, signal) {
        (Some(0), _) => Ok(()),
        (Some(INTERRUPTED_STATUS), _) | (None, Some(SIGINT)) => Err(ShellError::Interrupted),
        (Some(code), _) => Err(ShellError::Exited(code)),
        (None, Some(sig)) => Err(ShellError::Killed(sig)),
        (None, None) => Err(ShellError::Exited(-1)),
    }
}

#[cfg(unix)]
fn signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal(_status: ExitStatus) -> Option<i32> {
    None
}
