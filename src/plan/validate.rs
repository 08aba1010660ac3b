//! Plan validation: everything that would make an install fail early.

use std::collections::HashMap;

use super::{Plan, Role};

impl Plan {
    /// Check the plan for problems, reporting all of them at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.cluster.name.trim().is_empty() {
            errors.push("cluster name is empty".to_string());
        }

        let ssh = &self.cluster.ssh;
        if ssh.user.trim().is_empty() {
            errors.push("cluster.ssh.user is empty".to_string());
        }
        if ssh.key.as_os_str().is_empty() {
            errors.push("cluster.ssh.ssh_key is empty".to_string());
        }
        if ssh.port == 0 {
            errors.push("cluster.ssh.ssh_port must be greater than 0".to_string());
        }

        let mut seen: HashMap<&str, Role> = HashMap::new();
        for (role, nodes) in self.groups() {
            let name = role.name();
            if nodes.is_empty() && role != Role::Ingress {
                errors.push(format!("{name} group has no nodes"));
            }

            let want = self.expected_count(role);
            if want != nodes.len() {
                errors.push(format!(
                    "{name} group expects {want} node(s) but lists {}",
                    nodes.len()
                ));
            }

            for (i, node) in nodes.iter().enumerate() {
                if node.host.trim().is_empty() {
                    errors.push(format!("{name} node #{} has no host", i + 1));
                    continue;
                }
                if node.ip.trim().is_empty() {
                    errors.push(format!("{name} node {:?} has no ip", node.host));
                }
                if let Some(first) = seen.insert(&node.host, role) {
                    errors.push(format!(
                        "hostname {:?} appears in both the {} and {name} groups",
                        node.host,
                        first.name()
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn expected_count(&self, role: Role) -> usize {
        match role {
            Role::Etcd => self.etcd.expected_count,
            Role::Master => self.master.expected_count,
            Role::Worker => self.worker.expected_count,
            Role::Ingress => self.ingress.as_ref().map_or(0, |g| g.expected_count),
        }
    }
}
