//! SSH access to the nodes of a plan.
//!
//! The transport itself is the system `ssh` client. This module decides which
//! node to reach, checks it can be reached, and classifies how the session
//! ended.

mod connect;
mod preflight;
mod shell;

pub use connect::{ConnectError, connect};
pub use preflight::{Preflight, SshPreflight};
pub use shell::{OpenSsh, Shell, ShellError};
