//! The installation plan: which nodes make up the cluster and how to reach them.
//!
//! A plan is read once per invocation and never changes while it's in use.
//! Node hostnames are unique across all groups; lookups walk the groups in a
//! fixed order (etcd, master, worker, ingress) and take the first match.

mod connection;
mod file;
mod form;
mod inventory;
mod validate;

use std::{io, path::PathBuf};

use serde::{Deserialize, Serialize};

pub use connection::SshConnection;
pub use file::FilePlanner;
pub use form::{Preset, Sizing, StorageKind, prompt_sizing};

/// Errors that can occur reading, writing or querying a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("node {0:?} not found in the plan")]
    NodeNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = core::result::Result<T, PlanError>;

/// The installation plan the operator intends to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub cluster: Cluster,
    pub etcd: NodeGroup,
    pub master: MasterNodeGroup,
    pub worker: NodeGroup,

    /// Optional: a cluster without managed ingress has no ingress group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<NodeGroup>,
}

/// Cluster-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub name: String,
    pub ssh: SshConfig,
}

/// How to SSH into every node of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub user: String,

    #[serde(rename = "ssh_key")]
    pub key: PathBuf,

    #[serde(rename = "ssh_port")]
    pub port: u16,
}

/// A compute unit, virtual or physical, that is part of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub host: String,
    pub ip: String,

    #[serde(rename = "internalip", skip_serializing_if = "String::is_empty")]
    pub internal_ip: String,
}

/// A collection of nodes serving one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGroup {
    pub expected_count: usize,
    pub nodes: Vec<Node>,
}

/// The master nodes, plus how they're reached behind a load balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterNodeGroup {
    pub expected_count: usize,
    pub load_balanced_fqdn: String,
    pub load_balanced_short_name: String,
    pub nodes: Vec<Node>,
}

/// The role a node group plays in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Etcd,
    Master,
    Worker,
    Ingress,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Self::Etcd => "etcd",
            Self::Master => "master",
            Self::Worker => "worker",
            Self::Ingress => "ingress",
        }
    }
}

impl Plan {
    /// Groups in lookup order: etcd, master, worker, then ingress if present.
    pub fn groups(&self) -> impl Iterator<Item = (Role, &[Node])> {
        [
            (Role::Etcd, self.etcd.nodes.as_slice()),
            (Role::Master, self.master.nodes.as_slice()),
            (Role::Worker, self.worker.nodes.as_slice()),
        ]
        .into_iter()
        .chain(
            self.ingress
                .as_ref()
                .map(|g| (Role::Ingress, g.nodes.as_slice())),
        )
    }

    /// Every node, in lookup order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.groups().flat_map(|(_, nodes)| nodes.iter())
    }

    /// Resolve a hostname to the parameters needed to SSH into it.
    ///
    /// The first node with a matching hostname wins.
    pub fn ssh_connection(&self, host: &str) -> Result<SshConnection<'_>> {
        let node = self
            .nodes()
            .find(|n| n.host == host)
            .ok_or_else(|| PlanError::NodeNotFound(host.to_string()))?;
        Ok(SshConnection::new(&self.cluster.ssh, node))
    }

    /// A plan with placeholder nodes for the operator to fill in.
    ///
    /// Hostnames are numbered per role (`etcd01`, `master01`, ...) and IPs are
    /// left blank. No ingress group is created when none is asked for.
    /// Storage answers are not part of the plan.
    pub fn template(sizing: &Sizing) -> Self {
        let ingress =
            (sizing.ingress > 0).then(|| placeholder_group(Role::Ingress, sizing.ingress));
        Self {
            cluster: Cluster {
                name: "kubernetes".to_string(),
                ssh: SshConfig {
                    user: "kismaticuser".to_string(),
                    key: PathBuf::from("kismaticuser.key"),
                    port: 22,
                },
            },
            etcd: placeholder_group(Role::Etcd, sizing.etcd),
            master: MasterNodeGroup {
                expected_count: sizing.master,
                load_balanced_fqdn: String::new(),
                load_balanced_short_name: String::new(),
                nodes: placeholder_nodes(Role::Master, sizing.master),
            },
            worker: placeholder_group(Role::Worker, sizing.worker),
            ingress,
        }
    }
}

fn placeholder_group(role: Role, count: usize) -> NodeGroup {
    NodeGroup {
        expected_count: count,
        nodes: placeholder_nodes(role, count),
    }
}

fn placeholder_nodes(role: Role, count: usize) -> Vec<Node> {
    (1..=count)
        .map(|i| Node {
            host: format!("{}{i:02}", role.name()),
            ..Node::default()
        })
        .collect()
}
