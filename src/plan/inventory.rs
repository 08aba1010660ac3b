//! Render a plan as an INI inventory for the automation engine.

use std::fmt::Write;

use super::Plan;

impl Plan {
    /// One section per non-empty group, then the SSH settings for all hosts.
    ///
    /// Nodes without an internal IP use their public IP for both.
    pub fn inventory(&self) -> String {
        let mut out = String::new();
        for (role, nodes) in self.groups() {
            if nodes.is_empty() {
                continue;
            }
            // Writing to a String can't fail.
            let _ = writeln!(out, "[{}]", role.name());
            for node in nodes {
                let internal = if node.internal_ip.is_empty() {
                    &node.ip
                } else {
                    &node.internal_ip
                };
                let _ = writeln!(
                    out,
                    "{} ansible_host={} internal_ipv4={internal}",
                    node.host, node.ip
                );
            }
            out.push('\n');
        }

        let ssh = &self.cluster.ssh;
        let _ = writeln!(out, "[all:vars]");
        let _ = writeln!(out, "ansible_user={}", ssh.user);
        let _ = writeln!(out, "ansible_ssh_private_key_file={}", ssh.key.display());
        let _ = writeln!(out, "ansible_port={}", ssh.port);
        out
    }
}
