//! CLI interface for Keel.
//!
//! Commands split into two groups:
//!
//! - `keel install plan|validate|apply|smoketest|replay|list`: generate a
//!   plan, check it, run the engine against it, and look back at runs.
//! - `keel ssh HOST [COMMAND...]`: open a shell on a node of the plan.
//!
//! Every command that needs a plan takes `--plan-file/-f`, defaulting to
//! `kismatic-cluster.yaml` in the current directory.

mod format;
mod install;
mod ssh;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::plan::Preset;

use install::InstallCommand;

/// Default plan file, relative to the working directory.
pub const DEFAULT_PLAN_FILE: &str = "kismatic-cluster.yaml";

/// Keel: plan, install and reach your Kubernetes cluster.
#[derive(Debug, Parser)]
#[command(name = "keel", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Narrate every task and its output, not just results.
    /// Also raises log output to `info`.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: a new cluster
  1. keel install plan --etcd 3 --master 2 --worker 3 --ingress 0 --storage none
     → writes kismatic-cluster.yaml with placeholder nodes
  2. edit the file: node IPs, SSH user and key
  3. keel install validate
  4. keel install apply
  5. keel install smoketest

Reach a node:
  keel ssh worker01
  keel ssh etcd01 -- systemctl status etcd

Look back:
  keel install list
  keel install replay 3f2a --verbose";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the version.
    Version,

    /// Plan, validate and run cluster installs.
    Install {
        #[command(subcommand)]
        command: InstallCommand,
    },

    /// Open a shell on a node of the cluster, or run a command there.
    ///
    /// The node's SSH settings come from the plan. The connection is checked
    /// before the shell opens; Control-C in the remote shell is not an error.
    Ssh {
        /// Hostname of the node, as listed in the plan.
        host: String,

        /// Command to run instead of an interactive shell.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        #[command(flatten)]
        plan: PlanFileArg,
    },
}

/// The `--plan-file` option shared by plan-based commands.
#[derive(Debug, Clone, Args)]
pub struct PlanFileArg {
    /// Path to the installation plan file.
    #[arg(long = "plan-file", short = 'f', default_value = DEFAULT_PLAN_FILE)]
    pub path: PathBuf,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, cli: Cli) -> Result<(), String> {
    let verbose = cli.verbose || config.verbose;

    match cli.command {
        Command::Version => {
            println!("keel {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Install { command } => match command {
            InstallCommand::Plan {
                plan,
                etcd,
                master,
                worker,
                ingress,
                storage,
                storage_nodes,
            } => install::cmd_plan(
                &plan.path,
                &Preset {
                    etcd,
                    master,
                    worker,
                    ingress,
                    storage,
                    storage_nodes,
                },
            ),
            InstallCommand::Validate { plan } => install::cmd_validate(&plan.path),
            InstallCommand::Apply { plan } => install::cmd_apply(config, &plan.path, verbose),
            InstallCommand::Smoketest { plan } => {
                install::cmd_smoketest(config, &plan.path, verbose)
            }
            InstallCommand::Replay { run, smoketest } => {
                install::cmd_replay(config, &run, smoketest, verbose)
            }
            InstallCommand::List => install::cmd_list(config),
        },
        Command::Ssh {
            host,
            command,
            plan,
        } => ssh::cmd_ssh(config, &plan.path, &host, &command),
    }
}
