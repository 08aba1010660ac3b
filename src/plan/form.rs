//! Sizing form: ask the operator how many nodes each role needs.
//!
//! Line-oriented so it works over any terminal, pipe or test buffer. Each
//! field carries its own label, help text and kind.

use std::io::{self, BufRead, Write};

use super::Role;

/// Where persistent data for cluster features lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageKind {
    /// No persistent features.
    #[default]
    None,

    /// The operator provides NFS shares.
    Nfs,

    /// A storage cluster built on dedicated nodes.
    Cluster,
}

impl StorageKind {
    pub const ALL: [Self; 3] = [Self::None, Self::Nfs, Self::Cluster];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Nfs => "nfs",
            Self::Cluster => "cluster",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// What the operator asked for. Generated plans only use the node counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub etcd: usize,
    pub master: usize,
    pub worker: usize,
    pub ingress: usize,
    pub storage: StorageKind,
    pub storage_nodes: usize,
}

impl Default for Sizing {
    fn default() -> Self {
        Self {
            etcd: 3,
            master: 2,
            worker: 3,
            ingress: 2,
            storage: StorageKind::None,
            storage_nodes: 0,
        }
    }
}

/// Answers already given on the command line. Those fields aren't asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preset {
    pub etcd: Option<usize>,
    pub master: Option<usize>,
    pub worker: Option<usize>,
    pub ingress: Option<usize>,
    pub storage: Option<StorageKind>,
    pub storage_nodes: Option<usize>,
}

impl Preset {
    fn get(&self, key: FieldKey) -> Option<Answer> {
        match key {
            FieldKey::Nodes(Role::Etcd) => self.etcd.map(Answer::Count),
            FieldKey::Nodes(Role::Master) => self.master.map(Answer::Count),
            FieldKey::Nodes(Role::Worker) => self.worker.map(Answer::Count),
            FieldKey::Nodes(Role::Ingress) => self.ingress.map(Answer::Count),
            FieldKey::Storage => self.storage.map(Answer::Storage),
            FieldKey::StorageNodes => self.storage_nodes.map(Answer::Count),
        }
    }
}

/// Which value a field sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Nodes(Role),
    Storage,
    StorageNodes,
}

/// What kind of answer a field takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A node count no lower than `min`.
    Count { default: usize, min: usize },

    /// One of the storage kinds, by name.
    Storage { default: StorageKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Count(usize),
    Storage(StorageKind),
}

/// One question on the form.
#[derive(Debug, Clone, Copy)]
pub struct PlanField {
    pub key: FieldKey,
    pub label: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
}

impl PlanField {
    /// Parse an answer. Blank means the default.
    fn parse(&self, answer: &str) -> Option<Answer> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Some(self.default_answer());
        }
        match self.kind {
            FieldKind::Count { min, .. } => answer
                .parse()
                .ok()
                .filter(|n| *n >= min)
                .map(Answer::Count),
            FieldKind::Storage { .. } => StorageKind::from_name(answer).map(Answer::Storage),
        }
    }

    fn default_answer(&self) -> Answer {
        match self.kind {
            FieldKind::Count { default, .. } => Answer::Count(default),
            FieldKind::Storage { default } => Answer::Storage(default),
        }
    }

    /// The bracketed hint after the label.
    fn hint(&self) -> String {
        match self.kind {
            FieldKind::Count { default, .. } => default.to_string(),
            FieldKind::Storage { default } => {
                let names: Vec<&str> = StorageKind::ALL.iter().map(|k| k.name()).collect();
                format!("{}, default {}", names.join("/"), default.name())
            }
        }
    }

    fn retry_message(&self) -> String {
        match self.kind {
            FieldKind::Count { min, .. } => format!("Enter a whole number of at least {min}."),
            FieldKind::Storage { .. } => {
                let names: Vec<&str> = StorageKind::ALL.iter().map(|k| k.name()).collect();
                format!("Enter one of: {}.", names.join(", "))
            }
        }
    }
}

impl Sizing {
    fn set(&mut self, key: FieldKey, answer: Answer) {
        match (key, answer) {
            (FieldKey::Nodes(role), Answer::Count(n)) => match role {
                Role::Etcd => self.etcd = n,
                Role::Master => self.master = n,
                Role::Worker => self.worker = n,
                Role::Ingress => self.ingress = n,
            },
            (FieldKey::StorageNodes, Answer::Count(n)) => self.storage_nodes = n,
            (FieldKey::Storage, Answer::Storage(kind)) => self.storage = kind,
            // Each field's kind only yields answers for its own key.
            (FieldKey::Nodes(_) | FieldKey::StorageNodes, Answer::Storage(_))
            | (FieldKey::Storage, Answer::Count(_)) => {}
        }
    }
}

/// The sizing form, in the order it is asked.
pub const SIZING_FIELDS: [PlanField; 6] = [
    PlanField {
        key: FieldKey::Nodes(Role::Etcd),
        label: "Number of etcd nodes",
        help: "Etcd stores the data Kubernetes uses to find and monitor workloads.\n\
               1 is only for development; 3 survives one failure, 5 survives two.",
        kind: FieldKind::Count { default: 3, min: 1 },
    },
    PlanField {
        key: FieldKey::Nodes(Role::Master),
        label: "Number of master nodes",
        help: "Masters monitor and control workloads on the cluster.\n\
               1 is only for development; 2 or more survives one failure.",
        kind: FieldKind::Count { default: 2, min: 1 },
    },
    PlanField {
        key: FieldKey::Nodes(Role::Worker),
        label: "Number of worker nodes",
        help: "Workers run most of the cluster's workloads.\n\
               1 is only for development; 2 or more survives worker failures.",
        kind: FieldKind::Count { default: 3, min: 1 },
    },
    PlanField {
        key: FieldKey::Nodes(Role::Ingress),
        label: "Number of ingress nodes",
        help: "Ingress nodes expose HTTP workloads to clients outside the cluster.\n\
               0 skips managed ingress; 2 or more survives one failure.",
        kind: FieldKind::Count { default: 2, min: 0 },
    },
    PlanField {
        key: FieldKey::Storage,
        label: "Persistent storage",
        help: "Long term health monitoring and log aggregation need somewhere to keep data.\n\
               none: no persistent features. nfs: you provide NFS shares.\n\
               cluster: build a storage cluster on dedicated nodes.",
        kind: FieldKind::Storage {
            default: StorageKind::None,
        },
    },
    PlanField {
        key: FieldKey::StorageNodes,
        label: "Number of storage nodes",
        help: "Nodes that host the storage cluster's data.\n\
               1 is only for testing; 2 replicates data, 4 or more distributes replicas.",
        kind: FieldKind::Count { default: 0, min: 0 },
    },
];

/// Ask for every field not already answered in `preset`.
///
/// Blank answers take the field's default, invalid answers are asked again,
/// and once input runs out every remaining field takes its default. Storage
/// nodes are only asked for when the storage kind is `cluster`.
pub fn prompt_sizing(
    mut input: impl BufRead,
    mut out: impl Write,
    preset: &Preset,
) -> io::Result<Sizing> {
    let mut sizing = Sizing::default();
    let mut exhausted = false;

    for field in &SIZING_FIELDS {
        if field.key == FieldKey::StorageNodes && sizing.storage != StorageKind::Cluster {
            sizing.storage_nodes = 0;
            continue;
        }
        if let Some(answer) = preset.get(field.key) {
            sizing.set(field.key, answer);
            continue;
        }
        if exhausted {
            sizing.set(field.key, field.default_answer());
            continue;
        }

        writeln!(out, "\n{}", field.help)?;
        loop {
            write!(out, "{} [{}]: ", field.label, field.hint())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                exhausted = true;
                sizing.set(field.key, field.default_answer());
                break;
            }
            if let Some(answer) = field.parse(&line) {
                sizing.set(field.key, answer);
                break;
            }
            writeln!(out, "{}", field.retry_message())?;
        }
    }

    Ok(sizing)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn run(input: &str, preset: &Preset) -> (Sizing, String) {
        let mut out = Vec::new();
        let sizing = prompt_sizing(Cursor::new(input), &mut out, preset).unwrap();
        (sizing, String::from_utf8(out).unwrap())
    }

    #[test]
    fn defaults_match_fields() {
        let sizing = Sizing::default();
        for field in &SIZING_FIELDS {
            let mut s = Sizing::default();
            s.set(field.key, field.default_answer());
            assert_eq!(s, sizing);
        }
    }

    #[test]
    fn blank_answers_take_defaults() {
        let (sizing, out) = run("\n\n\n\n\n", &Preset::default());
        assert_eq!(sizing, Sizing::default());
        assert!(!out.contains("Number of storage nodes"));
    }

    #[test]
    fn answers_fill_in_order() {
        let (sizing, out) = run("5\n1\n7\n0\nnfs\n", &Preset::default());
        assert_eq!(
            sizing,
            Sizing {
                etcd: 5,
                master: 1,
                worker: 7,
                ingress: 0,
                storage: StorageKind::Nfs,
                storage_nodes: 0,
            }
        );
        assert!(out.contains("Number of etcd nodes [3]: "));
        assert!(out.contains("Persistent storage [none/nfs/cluster, default none]: "));
        assert!(out.contains("Ingress nodes expose HTTP"));
    }

    #[test]
    fn storage_nodes_asked_only_for_cluster_storage() {
        let (sizing, out) = run("\n\n\n\nCLUSTER\n4\n", &Preset::default());
        assert_eq!(sizing.storage, StorageKind::Cluster);
        assert_eq!(sizing.storage_nodes, 4);
        assert!(out.contains("Number of storage nodes [0]: "));
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (sizing, out) = run("three\n0\n3\n\n\n\nceph\n\n", &Preset::default());
        assert_eq!(sizing.etcd, 3);
        assert_eq!(sizing.storage, StorageKind::None);
        assert_eq!(out.matches("Enter a whole number of at least 1.").count(), 2);
        assert_eq!(out.matches("Enter one of: none, nfs, cluster.").count(), 1);
    }

    #[test]
    fn end_of_input_takes_remaining_defaults() {
        let (sizing, _) = run("1\n", &Preset::default());
        assert_eq!(
            sizing,
            Sizing {
                etcd: 1,
                ..Sizing::default()
            }
        );
    }

    #[test]
    fn preset_fields_are_not_asked() {
        let preset = Preset {
            etcd: Some(1),
            master: Some(1),
            ingress: Some(0),
            storage: Some(StorageKind::None),
            ..Preset::default()
        };
        let (sizing, out) = run("4\n", &preset);
        assert_eq!(
            sizing,
            Sizing {
                etcd: 1,
                master: 1,
                worker: 4,
                ingress: 0,
                ..Sizing::default()
            }
        );
        assert!(!out.contains("etcd"));
        assert!(!out.contains("Persistent storage"));
        assert!(out.contains("Number of worker nodes"));
    }

    #[test]
    fn storage_nodes_ignored_without_cluster_storage() {
        let preset = Preset {
            storage: Some(StorageKind::Nfs),
            storage_nodes: Some(3),
            ..Preset::default()
        };
        let (sizing, _) = run("", &preset);
        assert_eq!(sizing.storage_nodes, 0);
    }

    #[test]
    fn storage_kind_names() {
        assert_eq!(StorageKind::from_name(" Nfs "), Some(StorageKind::Nfs));
        assert_eq!(StorageKind::from_name("ceph"), None);
    }
}
