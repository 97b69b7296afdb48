//! `workflowctl` — a thin CLI over the execution core, for local validation
//! and dry-runs. It is deliberately not a server: the HTTP/CLI surface,
//! storage back-ends, and real agent providers are external collaborators
//! (see `ports`) that a production deployment wires in; this binary wires
//! in-memory fixtures instead so a workflow definition can be sanity-checked
//! without any of that.
//!
//! Sub-commands:
//! - `validate` — check a workflow JSON file's structural invariants.
//! - `run`      — execute a workflow JSON file against stub agents that
//!                echo their prompt back, useful for tracing a workflow's
//!                shape before wiring real agent providers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use engine::{Engine, EngineConfig, Registry};
use fixtures::{AutoApproveReviewHandler, InMemoryLeaseManager, InMemorySnapshotRepository, ScriptedAgent};
use model::{AgentResponse, TenantId, Workflow};
use ports::Agent;

#[derive(Parser)]
#[command(
    name = "workflowctl",
    about = "Local validation and dry-run tool for the workflow execution engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file's structural invariants.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Drive a workflow definition to completion against stub agents.
    Run {
        /// Path to the workflow JSON file.
        path: PathBuf,
        /// Initial context as a JSON object (defaults to `{}`).
        #[arg(long)]
        context: Option<String>,
    },
}

fn load_workflow(path: &PathBuf) -> Result<Workflow> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| "invalid workflow JSON".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => {
            let workflow = load_workflow(&path)?;
            match engine::validate::validate(&workflow) {
                Ok(()) => {
                    println!("workflow '{}' is valid ({} nodes)", workflow.name, workflow.nodes.len());
                }
                Err(err) => {
                    eprintln!("workflow is invalid: {err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Run { path, context } => {
            let workflow = load_workflow(&path)?;
            engine::validate::validate(&workflow).context("workflow failed structural validation")?;

            let initial_context: HashMap<String, serde_json::Value> = match context {
                Some(raw) => serde_json::from_str(&raw).context("invalid --context JSON")?,
                None => HashMap::new(),
            };

            let mut agents: Registry<dyn Agent> = Registry::new();
            for binding in &workflow.agent_bindings {
                let stub = ScriptedAgent::new(
                    binding.agent_id.clone(),
                    vec![AgentResponse::Text {
                        content: format!("stub response from agent '{}'", binding.agent_id),
                        metadata: HashMap::new(),
                    }],
                );
                agents.register(binding.agent_id.clone(), Arc::new(stub) as Arc<dyn Agent>);
            }

            let node_executors = engine::nodes::default_registry();
            let action_handlers = Registry::new();
            let tools = Registry::new();
            let generic_handlers = engine::nodes::default_generic_handlers();
            let observer = fixtures::RecordingObserver::new();
            let review_handler = AutoApproveReviewHandler;
            let snapshots = InMemorySnapshotRepository::new();
            let lease_manager = InMemoryLeaseManager::new("workflowctl-local");
            let planner = engine::plan::StaticPlanner;

            let driver = Engine {
                tenant_id: TenantId::new(),
                agents: &agents,
                node_executors: &node_executors,
                action_handlers: &action_handlers,
                tools: &tools,
                generic_handlers: &generic_handlers,
                observer: &observer,
                review_handler: &review_handler,
                snapshots: &snapshots,
                lease_manager: &lease_manager,
                planner: &planner,
                config: EngineConfig::default(),
            };

            info!(workflow = %workflow.name, "starting local dry run");
            let mut outcome = driver.execute(&workflow, initial_context).await;
            while let engine::ExecutionOutcome::Paused { snapshot, reason } = outcome {
                info!(%reason, "paused for review, resuming with the wired review handler");
                outcome = driver.resume(&workflow, snapshot).await;
            }
            println!("{outcome:#?}");
        }
    }

    Ok(())
}
