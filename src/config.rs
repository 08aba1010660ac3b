//! Keel configuration.
//!
//! Loaded from `~/.keel/config.toml`. Every key is optional; a missing file
//! means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors loading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Keel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// The automation engine binary.
    pub engine: String,

    /// Stdout callback plugin that makes the engine emit JSON-lines events.
    pub stdout_callback: String,

    /// Where the install and smoke test playbooks live.
    pub playbooks_dir: PathBuf,

    /// Where inventories and run records are written.
    pub generated_dir: PathBuf,

    /// The SSH client binary.
    pub ssh: String,

    /// Narrate every task, not just results.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: "ansible-playbook".to_string(),
            stdout_callback: "json_lines".to_string(),
            playbooks_dir: PathBuf::from("ansible").join("playbooks"),
            generated_dir: PathBuf::from("generated"),
            ssh: "ssh".to_string(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load config from `~/.keel/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config file path: `~/.keel/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".keel").join("config.toml"))
    }

    /// Where `keel` keeps run records.
    pub fn runs_dir(&self) -> PathBuf {
        self.generated_dir.join("runs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_is_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "engine = \"/opt/ansible/bin/ansible-playbook\"\nverbose = true\n")
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.engine, "/opt/ansible/bin/ansible-playbook");
        assert!(config.verbose);
        assert_eq!(config.stdout_callback, "json_lines");
        assert_eq!(config.runs_dir(), PathBuf::from("generated").join("runs"));
    }

    #[test]
    fn kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "playbooks-dir = \"/srv/playbooks\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.playbooks_dir, PathBuf::from("/srv/playbooks"));
    }

    #[test]
    fn invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "verbose = \"very\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid config at"));
    }
}
