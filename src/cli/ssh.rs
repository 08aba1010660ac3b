//! The `ssh` command.

use std::path::Path;

use crate::{
    config::Config,
    plan::FilePlanner,
    ssh::{ConnectError, OpenSsh, SshPreflight, connect},
};

use super::format::format_errors;

pub(super) fn cmd_ssh(
    config: &Config,
    path: &Path,
    host: &str,
    command: &[String],
) -> Result<(), String> {
    let planner = FilePlanner::new(path);
    let shell = OpenSsh::new(&config.ssh);

    connect(&planner, host, command, &SshPreflight, &shell).map_err(|e| match &e {
        ConnectError::ValidationFailed { errors, .. } => {
            format!("{e}:\n{}", format_errors(errors))
        }
        ConnectError::PlanMissing(_) => {
            format!("{e}; run `keel install plan` to create one")
        }
        _ => e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::plan::tests::sample_plan;

    fn config_with_plan() -> (TempDir, Config, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kismatic-cluster.yaml");
        let mut plan = sample_plan();
        // Port 0 keeps preflight from probing the network.
        plan.cluster.ssh.port = 0;
        FilePlanner::new(&path).write(&plan).unwrap();
        (dir, Config::default(), path)
    }

    #[test]
    fn missing_plan_suggests_plan_command() {
        let dir = TempDir::new().unwrap();
        let err = cmd_ssh(
            &Config::default(),
            &dir.path().join("nope.yaml"),
            "worker01",
            &[],
        )
        .unwrap_err();
        assert!(err.contains("does not exist"));
        assert!(err.contains("keel install plan"));
    }

    #[test]
    fn unknown_host_is_reported() {
        let (_dir, config, path) = config_with_plan();
        let err = cmd_ssh(&config, &path, "nosuchhost", &[]).unwrap_err();
        assert!(err.contains("\"nosuchhost\" not found"));
    }

    #[test]
    fn preflight_failures_are_listed() {
        let (_dir, config, path) = config_with_plan();
        let err = cmd_ssh(&config, &path, "worker01", &[]).unwrap_err();
        assert!(err.starts_with("cannot validate SSH connection to node \"worker01\":\n"));
        assert!(err.contains("  - SSH key /keys/ops.pem does not exist"));
        assert!(err.contains("  - SSH port must be greater than 0"));
    }
}
