//! Preflight: make sure a node can be reached before opening a shell.

use std::net::TcpStream;

use tracing::debug;

use crate::plan::SshConnection;

/// Checks a connection before any remote action is taken.
pub trait Preflight {
    /// Run every check, returning all failures rather than just the first.
    fn validate(&self, conn: &SshConnection<'_>) -> Result<(), Vec<String>>;
}

/// Local checks on the SSH settings, then a TCP probe of the SSH port.
///
/// The probe blocks for as long as the OS takes to connect or give up.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshPreflight;

impl Preflight for SshPreflight {
    fn validate(&self, conn: &SshConnection<'_>) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if conn.username().trim().is_empty() {
            errors.push("SSH user is empty".to_string());
        }

        let key = conn.key_path();
        if key.as_os_str().is_empty() {
            errors.push("SSH key path is empty".to_string());
        } else if !key.is_file() {
            errors.push(format!("SSH key {} does not exist", key.display()));
        }

        if conn.port() == 0 {
            errors.push("SSH port must be greater than 0".to_string());
        }

        if conn.address().trim().is_empty() {
            errors.push(format!("node {:?} has no IP address", conn.host()));
        } else if conn.port() != 0
            && let Err(e) = probe(conn.address(), conn.port(), conn.retries())
        {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Try a TCP connection up to `attempts` times.
fn probe(address: &str, port: u16, attempts: u32) -> Result<(), String> {
    let mut last = None;
    for attempt in 1..=attempts.max(1) {
        match TcpStream::connect((address, port)) {
            Ok(_) => {
                debug!(address, port, attempt, "SSH port reachable");
                return Ok(());
            }
            Err(e) => {
                debug!(address, port, attempt, "SSH port unreachable: {e}");
                last = Some(e);
            }
        }
    }
    let reason = last.map_or_else(|| "no attempts made".to_string(), |e| e.to_string());
    Err(format!("cannot reach {address}:{port}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::net::TcpListener;

    use tempfile::TempDir;

    use crate::plan::tests::sample_plan;

    #[test]
    fn reports_every_local_problem() {
        let mut plan = sample_plan();
        plan.cluster.ssh.user = String::new();
        plan.cluster.ssh.port = 0;
        plan.worker.nodes[0].ip = String::new();

        let conn = plan.ssh_connection("worker01").unwrap();
        let errors = SshPreflight.validate(&conn).unwrap_err();

        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("user is empty")));
        assert!(errors.iter().any(|e| e.contains("/keys/ops.pem does not exist")));
        assert!(errors.iter().any(|e| e.contains("port must be greater than 0")));
        assert!(errors.iter().any(|e| e.contains("\"worker01\" has no IP")));
    }

    #[test]
    fn passes_with_key_and_listening_port() {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("id_rsa");
        fs::write(&key, "not really a key").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut plan = sample_plan();
        plan.cluster.ssh.key = key;
        plan.cluster.ssh.port = port;
        plan.etcd.nodes[0].ip = "127.0.0.1".into();

        let conn = plan.ssh_connection("etcd01").unwrap();
        SshPreflight.validate(&conn).unwrap();
    }

    #[test]
    fn closed_port_is_reported() {
        // Bind then drop to find a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = probe("127.0.0.1", port, 2).unwrap_err();
        assert!(err.starts_with(&format!("cannot reach 127.0.0.1:{port}")));
    }
}
