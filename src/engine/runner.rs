//! Runner: spawn the automation engine and stream its events.
//!
//! The engine writes one JSON event per line on stdout (via its stdout
//! callback plugin). Its stderr goes straight to the operator's terminal.

use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::Event;

/// Errors running the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed reading engine output: {0}")]
    Stream(#[from] io::Error),

    #[error("engine exited with status {0}")]
    Failed(i32),

    #[error("engine was terminated by a signal")]
    Killed,
}

/// Spawns the automation engine against a playbook and inventory.
#[derive(Debug, Clone)]
pub struct Runner {
    program: String,
    stdout_callback: String,
}

impl Runner {
    pub fn new(program: impl Into<String>, stdout_callback: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            stdout_callback: stdout_callback.into(),
        }
    }

    /// Run `playbook` against `inventory`, blocking until the engine exits.
    ///
    /// Every raw stdout line goes to `on_line` (for the run record) before it
    /// is decoded. Lines that decode go to `on_event` in emission order.
    pub fn run(
        &self,
        playbook: &Path,
        inventory: &Path,
        mut on_line: impl FnMut(&str),
        mut on_event: impl FnMut(Event),
    ) -> Result<(), EngineError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-i")
            .arg(inventory)
            .arg(playbook)
            .env("ANSIBLE_STDOUT_CALLBACK", &self.stdout_callback)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        info!(program = %self.program, playbook = %playbook.display(), "starting engine");
        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let Some(stdout) = child.stdout.take() else {
            return Err(EngineError::Stream(io::Error::other(
                "engine stdout was not captured",
            )));
        };

        let pumped = pump(BufReader::new(stdout), &mut on_line, &mut on_event);
        let status = child.wait()?;
        let count = pumped?;
        debug!(events = count, %status, "engine exited");

        if status.success() {
            Ok(())
        } else {
            match status.code() {
                Some(code) => Err(EngineError::Failed(code)),
                None => Err(EngineError::Killed),
            }
        }
    }
}

/// Read an event stream to the end, returning how many events decoded.
///
/// Malformed lines are logged and skipped; they never end the stream. Bytes
/// that aren't UTF-8 are replaced rather than rejected.
pub fn pump(
    mut reader: impl BufRead,
    on_line: &mut impl FnMut(&str),
    on_event: &mut impl FnMut(Event),
) -> io::Result<usize> {
    let mut count = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        on_line(line);
        match Event::parse_line(line) {
            Ok(event) => {
                count += 1;
                on_event(event);
            }
            Err(e) => warn!("skipping event line: {e}"),
        }
    }
    Ok(count)
}
