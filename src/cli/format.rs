//! Output formatting for CLI display.

use jiff::Timestamp;

use crate::run::{RunRecord, RunStatus};

/// One line describing a run: short id, status, playbook, start time.
pub(super) fn format_run(run: &RunRecord) -> String {
    let status = match &run.status {
        RunStatus::Running => "running".to_string(),
        RunStatus::Succeeded { finished_at } => {
            format!("succeeded in {}", elapsed(run.started_at, *finished_at))
        }
        RunStatus::Failed {
            finished_at,
            reason,
        } => format!(
            "failed after {}: {reason}",
            elapsed(run.started_at, *finished_at)
        ),
    };
    format!(
        "{}  {}  {}  [{status}]",
        run.short_id(),
        run.started_at.strftime("%Y-%m-%d %H:%M:%S"),
        run.playbook.display()
    )
}

/// A bulleted list, one error per line.
pub(super) fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn elapsed(from: Timestamp, to: Timestamp) -> String {
    // Clock skew can put the end before the start.
    let secs = u64::try_from(to.duration_since(from).as_secs()).unwrap_or(0);
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m{:02}s", secs / 60, secs % 60),
        _ => format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_at(start: i64) -> RunRecord {
        let mut run = RunRecord::start("kubernetes.yaml", "kismatic-cluster.yaml");
        run.started_at = Timestamp::from_second(start).unwrap();
        run
    }

    #[test]
    fn format_succeeded_run() {
        let mut run = run_at(1_700_000_000);
        run.status = RunStatus::Succeeded {
            finished_at: Timestamp::from_second(1_700_000_185).unwrap(),
        };
        let line = format_run(&run);
        assert!(line.starts_with(&run.short_id()));
        assert!(line.contains("kubernetes.yaml"));
        assert!(line.ends_with("[succeeded in 3m05s]"));
    }

    #[test]
    fn format_failed_run() {
        let mut run = run_at(1_700_000_000);
        run.status = RunStatus::Failed {
            finished_at: Timestamp::from_second(1_700_000_042).unwrap(),
            reason: "engine exited with status 2".into(),
        };
        assert!(format_run(&run).ends_with("[failed after 42s: engine exited with status 2]"));
    }

    #[test]
    fn format_running_run() {
        assert!(format_run(&run_at(0)).ends_with("[running]"));
    }

    #[test]
    fn long_runs_show_hours() {
        let from = Timestamp::from_second(0).unwrap();
        let to = Timestamp::from_second(2 * 3600 + 7 * 60).unwrap();
        assert_eq!(elapsed(from, to), "2h07m");
    }

    #[test]
    fn elapsed_truncates_and_clamps() {
        let from = Timestamp::new(100, 0).unwrap();
        assert_eq!(elapsed(from, Timestamp::new(159, 999_999_999).unwrap()), "59s");
        assert_eq!(elapsed(from, Timestamp::new(40, 0).unwrap()), "0s");
    }

    #[test]
    fn format_error_list() {
        let errors = vec!["key missing".to_string(), "port closed".to_string()];
        assert_eq!(format_errors(&errors), "  - key missing\n  - port closed");
    }
}
