//! Event: what the automation engine reports while a run is in flight.

use serde::Deserialize;
use serde_json::Value;

/// A single event from the engine's stream.
///
/// Events arrive one per line, in emission order. Each variant describes a
/// point in the run's lifecycle. Discriminants this build doesn't know decode
/// to [`Event::Unknown`] so newer engines degrade to generic rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A playbook began.
    PlaybookStart { name: String },

    /// A play within the playbook began.
    PlayStart { name: String },

    /// A task began.
    TaskStart { name: String },

    /// A handler task began.
    HandlerTaskStart { name: String },

    /// A task finished successfully on a host.
    RunnerOk { host: String, result: RunnerResult },

    /// A task failed on a host.
    ///
    /// `ignore_errors` is set when the playbook marks the failure as tolerated.
    RunnerFailed {
        host: String,
        result: RunnerResult,
        ignore_errors: bool,
    },

    /// A task was skipped on a host.
    RunnerSkipped { host: String },

    /// A host could not be reached.
    RunnerUnreachable { host: String, result: RunnerResult },

    /// The playbook finished.
    PlaybookEnd,

    /// An event type this build doesn't recognize.
    Unknown { event_type: String },
}

/// Output captured from a task on a remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerResult {
    pub stdout: String,
    pub stderr: String,
    pub msg: String,
    pub changed: bool,
}

/// Errors decoding a line of the event stream.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("malformed event line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid data for {event_type}: {source}")]
    Data {
        event_type: String,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    event_type: String,
    #[serde(default)]
    event_data: Value,
}

#[derive(Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct HostResult {
    #[serde(default)]
    host: String,
    #[serde(default)]
    result: RunnerResult,
    #[serde(default, rename = "ignoreErrors")]
    ignore_errors: bool,
}

impl Event {
    /// Decode one line of the engine's JSON-lines stream.
    pub fn parse_line(line: &str) -> Result<Self, EventError> {
        let raw: RawEvent = serde_json::from_str(line)?;
        let data = if raw.event_data.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            raw.event_data
        };

        let event = match raw.event_type.as_str() {
            "PLAYBOOK_START" => Self::PlaybookStart {
                name: named(&raw.event_type, data)?,
            },
            "PLAY_START" => Self::PlayStart {
                name: named(&raw.event_type, data)?,
            },
            "TASK_START" => Self::TaskStart {
                name: named(&raw.event_type, data)?,
            },
            "HANDLER_TASK_START" => Self::HandlerTaskStart {
                name: named(&raw.event_type, data)?,
            },
            "RUNNER_OK" => {
                let r = host_result(&raw.event_type, data)?;
                Self::RunnerOk {
                    host: r.host,
                    result: r.result,
                }
            }
            "RUNNER_FAILED" => {
                let r = host_result(&raw.event_type, data)?;
                Self::RunnerFailed {
                    host: r.host,
                    result: r.result,
                    ignore_errors: r.ignore_errors,
                }
            }
            "RUNNER_SKIPPED" => Self::RunnerSkipped {
                host: host_result(&raw.event_type, data)?.host,
            },
            "RUNNER_UNREACHABLE" => {
                let r = host_result(&raw.event_type, data)?;
                Self::RunnerUnreachable {
                    host: r.host,
                    result: r.result,
                }
            }
            "PLAYBOOK_END" => Self::PlaybookEnd,
            _ => Self::Unknown {
                event_type: raw.event_type,
            },
        };

        Ok(event)
    }
}

fn named(event_type: &str, data: Value) -> Result<String, EventError> {
    serde_json::from_value::<Named>(data)
        .map(|n| n.name)
        .map_err(|source| EventError::Data {
            event_type: event_type.to_string(),
            source,
        })
}

fn host_result(event_type: &str, data: Value) -> Result<HostResult, EventError> {
    serde_json::from_value(data).map_err(|source| EventError::Data {
        event_type: event_type.to_string(),
        source,
    })
}
