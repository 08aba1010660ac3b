//! SSH connection parameters for one node of a plan.

use std::path::Path;

use super::{Node, SshConfig};

/// Connection attempts made before giving up on a node.
pub const DEFAULT_RETRIES: u32 = 1;

/// One resolved node bound to the cluster's SSH config.
///
/// Borrowed from the plan: built on demand for a single connect and dropped
/// after it.
#[derive(Debug, Clone, Copy)]
pub struct SshConnection<'a> {
    ssh: &'a SshConfig,
    node: &'a Node,
    retries: u32,
}

impl<'a> SshConnection<'a> {
    pub(super) fn new(ssh: &'a SshConfig, node: &'a Node) -> Self {
        Self {
            ssh,
            node,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn host(&self) -> &'a str {
        &self.node.host
    }

    /// The node's public IP.
    pub fn address(&self) -> &'a str {
        &self.node.ip
    }

    pub fn port(&self) -> u16 {
        self.ssh.port
    }

    pub fn key_path(&self) -> &'a Path {
        &self.ssh.key
    }

    pub fn username(&self) -> &'a str {
        &self.ssh.user
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}
