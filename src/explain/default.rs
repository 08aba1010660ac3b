//! The default explainer: a narration for every event.

use std::fmt::Write;

use crate::engine::{Event, RunnerResult};

use super::{Explainer, marker};

/// Stateless, total translation from events to narration.
///
/// Task starts and skips only show up when verbose. Successes get a short
/// marker, with captured stdout appended when verbose. Failures always carry
/// their captured output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExplainer;

impl Explainer for DefaultExplainer {
    fn explain(&mut self, event: &Event, verbose: bool) -> String {
        match event {
            Event::PlaybookStart { name } => format!("Running {name}\n"),
            Event::PlayStart { name } => format!("- {name}\n"),
            Event::TaskStart { name } | Event::HandlerTaskStart { name } => {
                if verbose {
                    format!("  {name}\n")
                } else {
                    String::new()
                }
            }
            Event::RunnerOk { host, result } => {
                let mut out = format!("  {} {host}\n", marker::ok());
                if verbose {
                    push_indented(&mut out, &result.stdout);
                }
                out
            }
            Event::RunnerSkipped { host } => {
                if verbose {
                    format!("  {} {host}\n", marker::skipped())
                } else {
                    String::new()
                }
            }
            Event::RunnerFailed {
                host,
                result,
                ignore_errors,
            } => {
                let tag = if *ignore_errors {
                    marker::ignored()
                } else {
                    marker::error()
                };
                let mut out = format!("  {tag} {host}\n");
                push_captured(&mut out, result);
                out
            }
            Event::RunnerUnreachable { host, result } => {
                let mut out = format!("  {} {host}\n", marker::unreachable());
                push_captured(&mut out, result);
                out
            }
            Event::PlaybookEnd => format!("{} Run finished\n", marker::ok()),
            Event::Unknown { event_type } => {
                if verbose {
                    format!("  (unrecognized event {event_type})\n")
                } else {
                    String::new()
                }
            }
        }
    }
}

/// Append everything a failed task left behind: message, stdout, stderr.
fn push_captured(out: &mut String, result: &RunnerResult) {
    push_indented(out, &result.msg);
    push_indented(out, &result.stdout);
    push_indented(out, &result.stderr);
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        // Writing to a String can't fail.
        let _ = writeln!(out, "    {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stdout: &str) -> RunnerResult {
        RunnerResult {
            stdout: stdout.into(),
            ..RunnerResult::default()
        }
    }

    fn every_event() -> Vec<Event> {
        vec![
            Event::PlaybookStart {
                name: "kubernetes.yaml".into(),
            },
            Event::PlayStart {
                name: "etcd".into(),
            },
            Event::TaskStart {
                name: "install etcd".into(),
            },
            Event::HandlerTaskStart {
                name: "restart etcd".into(),
            },
            Event::RunnerOk {
                host: "etcd01".into(),
                result: result("ok\n"),
            },
            Event::RunnerFailed {
                host: "etcd01".into(),
                result: result("nope\n"),
                ignore_errors: false,
            },
            Event::RunnerSkipped {
                host: "etcd01".into(),
            },
            Event::RunnerUnreachable {
                host: "etcd01".into(),
                result: RunnerResult::default(),
            },
            Event::PlaybookEnd,
            Event::Unknown {
                event_type: "SOMETHING_NEW".into(),
            },
        ]
    }

    #[test]
    fn total_over_every_event() {
        let mut explainer = DefaultExplainer;
        for verbose in [false, true] {
            for event in every_event() {
                let text = explainer.explain(&event, verbose);
                assert!(text.is_empty() || text.ends_with('\n'), "{event:?}");
            }
        }
    }

    #[test]
    fn task_start_only_when_verbose() {
        let mut explainer = DefaultExplainer;
        let event = Event::TaskStart {
            name: "install docker".into(),
        };
        assert_eq!(explainer.explain(&event, false), "");
        assert_eq!(explainer.explain(&event, true), "  install docker\n");
    }

    #[test]
    fn ok_omits_stdout_when_quiet() {
        let mut explainer = DefaultExplainer;
        let event = Event::RunnerOk {
            host: "worker01".into(),
            result: result("noisy output\n"),
        };

        let quiet = explainer.explain(&event, false);
        assert!(quiet.contains("[OK]"));
        assert!(quiet.contains("worker01"));
        assert!(!quiet.contains("noisy output"));

        let verbose = explainer.explain(&event, true);
        assert!(verbose.contains("    noisy output\n"));
    }

    #[test]
    fn failure_always_includes_captured_output() {
        let mut explainer = DefaultExplainer;
        let event = Event::RunnerFailed {
            host: "master01".into(),
            result: RunnerResult {
                stdout: "partial\n".into(),
                stderr: "permission denied\n".into(),
                msg: "non-zero return code".into(),
                changed: false,
            },
            ignore_errors: false,
        };

        for verbose in [false, true] {
            let text = explainer.explain(&event, verbose);
            assert!(text.contains("[ERROR]"));
            assert!(text.contains("non-zero return code"));
            assert!(text.contains("partial"));
            assert!(text.contains("permission denied"));
        }
    }

    #[test]
    fn ignored_failure_is_marked_differently() {
        let mut explainer = DefaultExplainer;
        let event = Event::RunnerFailed {
            host: "master01".into(),
            result: result("tolerated\n"),
            ignore_errors: true,
        };
        let text = explainer.explain(&event, false);
        assert!(text.contains("[IGNORED]"));
        assert!(!text.contains("[ERROR]"));
        assert!(text.contains("tolerated"));
    }

    #[test]
    fn run_end_closes_with_status() {
        let text = DefaultExplainer.explain(&Event::PlaybookEnd, false);
        assert!(text.contains("[OK]"));
        assert!(text.contains("Run finished"));
    }

    #[test]
    fn unknown_event_is_quiet_unless_verbose() {
        let mut explainer = DefaultExplainer;
        let event = Event::Unknown {
            event_type: "RUNNER_RETRY".into(),
        };
        assert_eq!(explainer.explain(&event, false), "");
        assert!(explainer.explain(&event, true).contains("RUNNER_RETRY"));
    }
}
