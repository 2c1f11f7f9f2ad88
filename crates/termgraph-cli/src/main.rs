//! termgraph command-line tool.
//!
//! Works on a project snapshot file: switches diagram representations,
//! restores and arranges entities, exports and imports single diagrams, and
//! pushes the resulting records to the remote store.
//!
//! The store is configured with `--endpoint`/`--context` or the
//! `TERMGRAPH_ENDPOINT` and `TERMGRAPH_CONTEXT` environment variables.
//! Log output goes to stderr and is filtered with `RUST_LOG`.
//!
//! Exit codes: 0 = success, 1 = usage or model error, 3 = I/O or network error.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use termgraph_core::{DiagramId, EntityId, Iri, Representation, UpdateBatch, UpdateOp, Workspace};
use termgraph_store::{
    DiagramSave, Executor, ProjectSnapshot, StoreConfig, StoreError, TransactionClient,
    TransactionPolicy,
};
use termgraph_view::{RestoreOptions, Synchronizer, Transformer, VertexPolicy};

const EXIT_USAGE: i32 = 1;
const EXIT_IO: i32 = 3;

/// Multi-diagram vocabulary graph tools.
#[derive(Parser)]
#[command(name = "termgraph", about = "Multi-diagram vocabulary graph tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Snapshot file and diagram a command works on.
#[derive(Args)]
struct Target {
    /// Path to the project snapshot file.
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Diagram index.
    #[arg(short, long, default_value_t = 0)]
    diagram: u32,
}

/// Remote store settings.
#[derive(Args)]
struct Remote {
    /// Send the resulting records to the store.
    #[arg(long)]
    push: bool,

    /// Repository URL of the store.
    #[arg(long, env = "TERMGRAPH_ENDPOINT")]
    endpoint: Option<String>,

    /// IRI of the graph holding workspace records.
    #[arg(long, env = "TERMGRAPH_CONTEXT")]
    context: Option<String>,

    /// Roll a transaction back instead of committing after a failed step.
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RepresentationArg {
    Full,
    Compact,
}

impl From<RepresentationArg> for Representation {
    fn from(arg: RepresentationArg) -> Self {
        match arg {
            RepresentationArg::Full => Representation::Full,
            RepresentationArg::Compact => Representation::Compact,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Switch a diagram between the full and compact representations.
    Switch {
        #[command(flatten)]
        target: Target,

        /// Representation to switch to.
        #[arg(long, value_enum)]
        to: RepresentationArg,

        #[command(flatten)]
        remote: Remote,
    },
    /// Show an entity on a diagram and redraw its links.
    Restore {
        #[command(flatten)]
        target: Target,

        /// IRI of the entity's term.
        #[arg(long)]
        iri: String,

        /// Discard stored link vertices instead of reusing them.
        #[arg(long)]
        reset_vertices: bool,

        /// Keep a reified relationship's stored position when it comes back.
        #[arg(long)]
        keep_reified_position: bool,

        #[command(flatten)]
        remote: Remote,
    },
    /// Place entities on a circle around an anchor entity.
    Spread {
        #[command(flatten)]
        target: Target,

        /// IRI of the anchor entity.
        #[arg(long)]
        anchor: String,

        /// IRIs of the entities to place.
        #[arg(long = "entity", required = true)]
        entities: Vec<String>,

        #[command(flatten)]
        remote: Remote,
    },
    /// Move entities by a screen-space delta.
    Move {
        #[command(flatten)]
        target: Target,

        /// IRIs of the entities to move.
        #[arg(long = "entity", required = true)]
        entities: Vec<String>,

        #[arg(long, allow_hyphen_values = true)]
        dx: f64,

        #[arg(long, allow_hyphen_values = true)]
        dy: f64,

        #[command(flatten)]
        remote: Remote,
    },
    /// Write a diagram in the save format.
    Export {
        #[command(flatten)]
        target: Target,

        /// Label language.
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Output file (default: stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Re-apply a saved diagram to the workspace.
    Import {
        #[command(flatten)]
        target: Target,

        /// Saved diagram file.
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        remote: Remote,
    },
    /// Send every record of a diagram to the store.
    Push {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        remote: Remote,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Switch { target, to, remote } => run_switch(&target, to.into(), &remote).await,
        Commands::Restore {
            target,
            iri,
            reset_vertices,
            keep_reified_position,
            remote,
        } => {
            let options = RestoreOptions {
                vertices: if reset_vertices {
                    VertexPolicy::Reset
                } else {
                    VertexPolicy::Restore
                },
                keep_reified_position,
                ..RestoreOptions::default()
            };
            run_restore(&target, &iri, options, &remote).await
        }
        Commands::Spread {
            target,
            anchor,
            entities,
            remote,
        } => run_spread(&target, &anchor, &entities, &remote).await,
        Commands::Move {
            target,
            entities,
            dx,
            dy,
            remote,
        } => run_move(&target, &entities, dx, dy, &remote).await,
        Commands::Export {
            target,
            language,
            out,
        } => run_export(&target, &language, out),
        Commands::Import {
            target,
            file,
            remote,
        } => run_import(&target, &file, &remote).await,
        Commands::Push { target, remote } => run_push(&target, &remote).await,
    };
    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn run_switch(target: &Target, to: Representation, remote: &Remote) -> i32 {
    let mut project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let diagram = DiagramId(target.diagram);
    let transformer = Transformer::new(&project.terms, &project.catalog);
    let transition = match transformer.set_representation(&mut project.workspace, diagram, to) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    finish(target, &project, transition.updates, remote).await
}

async fn run_restore(target: &Target, iri: &str, options: RestoreOptions, remote: &Remote) -> i32 {
    let mut project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let diagram = DiagramId(target.diagram);
    let entity = match lookup(&project.workspace, iri) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let sync = Synchronizer::new(&project.terms, &project.catalog);
    let updates = match sync.restore_entity(&mut project.workspace, entity, diagram, options) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    finish(target, &project, updates, remote).await
}

async fn run_spread(target: &Target, anchor: &str, iris: &[String], remote: &Remote) -> i32 {
    let mut project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let diagram = DiagramId(target.diagram);
    let anchor = match lookup(&project.workspace, anchor) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let entities = match lookup_all(&project.workspace, iris) {
        Ok(ids) => ids,
        Err(code) => return code,
    };
    let sync = Synchronizer::new(&project.terms, &project.catalog);
    let updates = match sync.spread(&mut project.workspace, anchor, &entities, diagram) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    finish(target, &project, updates, remote).await
}

async fn run_move(target: &Target, iris: &[String], dx: f64, dy: f64, remote: &Remote) -> i32 {
    let mut project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let diagram = DiagramId(target.diagram);
    let entities = match lookup_all(&project.workspace, iris) {
        Ok(ids) => ids,
        Err(code) => return code,
    };
    let sync = Synchronizer::new(&project.terms, &project.catalog);
    let updates = match sync.move_entities(&mut project.workspace, diagram, &entities, dx, dy) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    finish(target, &project, updates, remote).await
}

fn run_export(target: &Target, language: &str, out: Option<PathBuf>) -> i32 {
    let project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let diagram = DiagramId(target.diagram);
    let save = match DiagramSave::capture(&project.workspace, diagram, &project.terms, language) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    let json = match save.to_json() {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: failed to serialize diagram: {}", e);
            return EXIT_USAGE;
        }
    };
    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, json) {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                return EXIT_IO;
            }
            0
        }
        None => {
            println!("{}", json);
            0
        }
    }
}

async fn run_import(target: &Target, file: &Path, remote: &Remote) -> i32 {
    let mut project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", file.display(), e);
            return EXIT_IO;
        }
    };
    let save = match DiagramSave::from_json(&text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: invalid diagram file '{}': {}", file.display(), e);
            return EXIT_USAGE;
        }
    };
    let updates = match save.restore_into(&mut project.workspace, DiagramId(target.diagram)) {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };
    finish(target, &project, updates, remote).await
}

async fn run_push(target: &Target, remote: &Remote) -> i32 {
    let project = match open(target) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let updates = diagram_records(&project.workspace, DiagramId(target.diagram));
    let Some(config) = store_config(remote) else {
        return EXIT_USAGE;
    };
    push(&project.workspace, &config, &updates).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(target: &Target) -> Result<ProjectSnapshot, i32> {
    let project = ProjectSnapshot::load(&target.snapshot).map_err(|e| {
        eprintln!(
            "Error: failed to load snapshot '{}': {}",
            target.snapshot.display(),
            e
        );
        exit_code(&e)
    })?;
    if project.workspace.diagram(DiagramId(target.diagram)).is_err() {
        eprintln!("Error: no diagram with index {}", target.diagram);
        return Err(EXIT_USAGE);
    }
    Ok(project)
}

fn lookup(ws: &Workspace, iri: &str) -> Result<EntityId, i32> {
    ws.find_entity(&Iri::from(iri)).ok_or_else(|| {
        eprintln!("Error: no entity for <{}>", iri);
        EXIT_USAGE
    })
}

fn lookup_all(ws: &Workspace, iris: &[String]) -> Result<Vec<EntityId>, i32> {
    iris.iter().map(|iri| lookup(ws, iri)).collect()
}

/// Every persisted record describing `diagram`.
fn diagram_records(ws: &Workspace, diagram: DiagramId) -> UpdateBatch {
    let mut updates = UpdateBatch::new();
    updates.push(UpdateOp::Diagram { diagram });
    for (entity, _) in ws.entities().filter(|(_, e)| e.diagrams.contains(&diagram)) {
        updates.push(UpdateOp::Element { entity });
        updates.push(UpdateOp::ElementDiagram { diagram, entity });
    }
    for (link, l) in ws.links().filter(|(_, l)| l.is_drawn(diagram)) {
        updates.push(UpdateOp::Link { link });
        if !l.vertices(diagram).is_empty() {
            updates.push(UpdateOp::LinkVertices { diagram, link });
        }
    }
    updates
}

fn store_config(remote: &Remote) -> Option<StoreConfig> {
    let (Some(endpoint), Some(context)) = (&remote.endpoint, &remote.context) else {
        eprintln!("Error: pushing needs --endpoint and --context (or TERMGRAPH_ENDPOINT and TERMGRAPH_CONTEXT)");
        return None;
    };
    let config = StoreConfig::new(endpoint.clone(), Iri::from(context.as_str())).with_policy(
        TransactionPolicy {
            commit_after_failed_step: !remote.strict,
        },
    );
    Some(config)
}

/// Saves the snapshot, prints the emitted descriptors and pushes them when asked.
async fn finish(target: &Target, project: &ProjectSnapshot, updates: UpdateBatch, remote: &Remote) -> i32 {
    let config = if remote.push {
        match store_config(remote) {
            Some(config) => Some(config),
            None => return EXIT_USAGE,
        }
    } else {
        None
    };

    if let Err(e) = project.save(&target.snapshot) {
        eprintln!(
            "Error: failed to save snapshot '{}': {}",
            target.snapshot.display(),
            e
        );
        return exit_code(&e);
    }

    let ops = updates.iter().copied().collect::<Vec<_>>();
    let json = serde_json::to_string_pretty(&ops)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize updates: {}\"}}", e));
    println!("{}", json);

    match config {
        Some(config) => push(&project.workspace, &config, &updates).await,
        None => 0,
    }
}

async fn push(ws: &Workspace, config: &StoreConfig, updates: &UpdateBatch) -> i32 {
    let executor = Executor::new(TransactionClient::new(config));
    if executor.run(ws, config, updates).await {
        tracing::info!("Pushed {} updates to {}", updates.len(), config.endpoint);
        0
    } else {
        eprintln!("Error: pushing to '{}' failed", config.endpoint);
        EXIT_IO
    }
}

fn exit_code(err: &StoreError) -> i32 {
    if err.is_io() {
        EXIT_IO
    } else {
        EXIT_USAGE
    }
}
