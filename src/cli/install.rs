//! Install commands: plan, validate, apply, smoketest, replay, list.

use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{Runner, pump},
    explain::{DefaultExplainer, Explainer, Narrator, PassthroughExplainer, SMOKE_TEST_TASK},
    plan::{FilePlanner, Plan, Preset, StorageKind, prompt_sizing},
    run::RunRecord,
    storage::RunStore,
};

use super::PlanFileArg;
use super::format::{format_errors, format_run};

/// Playbook that installs the cluster.
const INSTALL_PLAYBOOK: &str = "kubernetes.yaml";

/// Playbook that smoke tests an installed cluster.
const SMOKE_TEST_PLAYBOOK: &str = "smoketest.yaml";

#[derive(Debug, Subcommand)]
pub enum InstallCommand {
    /// Generate a plan file with placeholder nodes.
    ///
    /// Counts not given as flags are asked for on stdin.
    Plan {
        #[command(flatten)]
        plan: PlanFileArg,

        /// Number of etcd nodes.
        #[arg(long)]
        etcd: Option<usize>,

        /// Number of master nodes.
        #[arg(long)]
        master: Option<usize>,

        /// Number of worker nodes.
        #[arg(long)]
        worker: Option<usize>,

        /// Number of ingress nodes (0 for none).
        #[arg(long)]
        ingress: Option<usize>,

        /// Persistent storage: none, nfs or cluster.
        #[arg(long, value_parser = parse_storage)]
        storage: Option<StorageKind>,

        /// Number of storage nodes, when storage is `cluster`.
        #[arg(long)]
        storage_nodes: Option<usize>,
    },

    /// Check the plan file for problems.
    Validate {
        #[command(flatten)]
        plan: PlanFileArg,
    },

    /// Install the cluster described by the plan.
    Apply {
        #[command(flatten)]
        plan: PlanFileArg,
    },

    /// Run the smoke test against an installed cluster.
    Smoketest {
        #[command(flatten)]
        plan: PlanFileArg,
    },

    /// Narrate a recorded run again.
    Replay {
        /// Run ID (full UUID or unambiguous prefix) or path to an events file.
        run: String,

        /// Narrate as a smoke test run.
        #[arg(long)]
        smoketest: bool,
    },

    /// List recorded runs.
    List,
}

pub(super) fn cmd_plan(path: &Path, preset: &Preset) -> Result<(), String> {
    let planner = FilePlanner::new(path);
    if planner.exists() {
        return Err(format!(
            "plan file {} already exists; remove it or pick another with --plan-file",
            path.display()
        ));
    }

    let sizing = prompt_sizing(io::stdin().lock(), io::stderr(), preset)
        .map_err(|e| format!("failed to read plan sizing: {e}"))?;

    println!(
        "Generating installation plan file with {} etcd nodes, {} master nodes, \
         {} worker nodes and {} ingress nodes",
        sizing.etcd, sizing.master, sizing.worker, sizing.ingress
    );
    if sizing.storage != StorageKind::None {
        warn!(
            storage = sizing.storage.name(),
            nodes = sizing.storage_nodes,
            "storage is not written to generated plans; add it by hand"
        );
    }

    planner
        .write(&Plan::template(&sizing))
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    println!(
        "Wrote {}. Edit the file to further describe your cluster, \
         then run `keel install validate`.",
        path.display()
    );
    Ok(())
}

pub(super) fn cmd_validate(path: &Path) -> Result<(), String> {
    let plan = read_plan(path)?;
    check_plan(&plan)?;
    println!("Plan {} is valid", path.display());
    Ok(())
}

pub(super) fn cmd_apply(config: &Config, path: &Path, verbose: bool) -> Result<(), String> {
    let mut explainer = DefaultExplainer;
    execute(config, path, INSTALL_PLAYBOOK, &mut explainer, verbose)
}

pub(super) fn cmd_smoketest(config: &Config, path: &Path, verbose: bool) -> Result<(), String> {
    let mut explainer = PassthroughExplainer::smoke_test();
    execute(config, path, SMOKE_TEST_PLAYBOOK, &mut explainer, verbose)?;
    if !explainer.is_passing_through() {
        warn!(task = SMOKE_TEST_TASK, "smoke test task never started");
    }
    Ok(())
}

pub(super) fn cmd_replay(
    config: &Config,
    reference: &str,
    smoketest: bool,
    verbose: bool,
) -> Result<(), String> {
    let events_path = resolve_events(config, reference)?;
    let file = fs::File::open(&events_path)
        .map_err(|e| format!("failed to open {}: {e}", events_path.display()))?;

    let mut explainer: Box<dyn Explainer> = if smoketest {
        Box::new(PassthroughExplainer::smoke_test())
    } else {
        Box::new(DefaultExplainer)
    };

    let mut events = Vec::new();
    pump(BufReader::new(file), &mut |_: &str| {}, &mut |event| {
        events.push(event);
    })
    .map_err(|e| format!("failed to read {}: {e}", events_path.display()))?;

    let stdout = io::stdout();
    Narrator::new(&mut explainer, stdout.lock(), verbose)
        .narrate_all(&events)
        .map_err(|e| format!("failed to write narration: {e}"))
}

pub(super) fn cmd_list(config: &Config) -> Result<(), String> {
    let runs = run_store(config)?
        .list_runs()
        .map_err(|e| format!("failed to list runs: {e}"))?;

    if runs.is_empty() {
        println!("No runs");
        return Ok(());
    }

    for run in &runs {
        println!("{}", format_run(run));
    }
    Ok(())
}

/// Run a playbook against the plan, narrating as the engine goes.
///
/// The plan must validate first. Every run is recorded, whatever its outcome.
fn execute(
    config: &Config,
    path: &Path,
    playbook: &str,
    explainer: &mut dyn Explainer,
    verbose: bool,
) -> Result<(), String> {
    let plan = read_plan(path)?;
    check_plan(&plan)?;

    fs::create_dir_all(&config.generated_dir)
        .map_err(|e| format!("failed to create {}: {e}", config.generated_dir.display()))?;
    let inventory = config.generated_dir.join("inventory.ini");
    fs::write(&inventory, plan.inventory())
        .map_err(|e| format!("failed to write {}: {e}", inventory.display()))?;

    let playbook = config.playbooks_dir.join(playbook);
    let store = run_store(config)?;
    let mut run = RunRecord::start(&playbook, path);
    store
        .create_run(&run)
        .map_err(|e| format!("failed to record run: {e}"))?;
    let mut log = store
        .open_event_log(run.id)
        .map_err(|e| format!("failed to record run: {e}"))?;
    info!(run = %run.id, playbook = %playbook.display(), "run started");

    let stdout = io::stdout();
    let mut narrator = Narrator::new(explainer, stdout.lock(), verbose);
    let outcome = Runner::new(&config.engine, &config.stdout_callback).run(
        &playbook,
        &inventory,
        |line| {
            if let Err(e) = log.append(line) {
                warn!("failed to record event: {e}");
            }
        },
        |event| {
            if let Err(e) = narrator.narrate(&event) {
                warn!("failed to write narration: {e}");
            }
        },
    );

    run.finish(&outcome);
    if let Err(e) = store.update_run(&run) {
        warn!(run = %run.id, "failed to update run record: {e}");
    }
    info!(run = %run.id, ok = outcome.is_ok(), "run finished");

    outcome.map_err(|e| format!("run {} failed: {e}", run.short_id()))
}

fn parse_storage(value: &str) -> Result<StorageKind, String> {
    StorageKind::from_name(value)
        .ok_or_else(|| format!("unknown storage {value:?}; expected none, nfs or cluster"))
}

fn read_plan(path: &Path) -> Result<Plan, String> {
    let planner = FilePlanner::new(path);
    if !planner.exists() {
        return Err(format!(
            "plan file {} does not exist; generate one with `keel install plan`",
            path.display()
        ));
    }
    planner
        .read()
        .map_err(|e| format!("error reading plan file {}: {e}", path.display()))
}

fn check_plan(plan: &Plan) -> Result<(), String> {
    plan.validate().map_err(|errors| {
        format!(
            "plan has {} problem(s):\n{}",
            errors.len(),
            format_errors(&errors)
        )
    })
}

fn run_store(config: &Config) -> Result<RunStore, String> {
    RunStore::new(config.runs_dir()).map_err(|e| format!("failed to open run records: {e}"))
}

/// Resolve a replay argument to an events file.
///
/// An existing file path wins; otherwise it's a run ID or unambiguous prefix.
fn resolve_events(config: &Config, reference: &str) -> Result<PathBuf, String> {
    let as_path = Path::new(reference);
    if as_path.is_file() {
        return Ok(as_path.to_path_buf());
    }

    let store = run_store(config)?;
    let id = resolve_run(&store, reference)?;
    Ok(store.events_path(id))
}

/// Resolve a run reference (full UUID or unambiguous prefix) to a run ID.
fn resolve_run(store: &RunStore, reference: &str) -> Result<Uuid, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return store
            .load_run(id)
            .map(|run| run.id)
            .map_err(|e| e.to_string());
    }

    // Try as a prefix match against all runs.
    let runs = store
        .list_runs()
        .map_err(|e| format!("failed to list runs: {e}"))?;

    let matches: Vec<&RunRecord> = runs
        .iter()
        .filter(|r| r.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no run matching '{reference}'")),
        [run] => Ok(run.id),
        many => {
            let ids: Vec<String> = many.iter().map(|r| r.short_id()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} runs: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
