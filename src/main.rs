//! Automator CLI entry point

use anyhow::Result;
use automator::config::AutomatorConfig;
use automator::core::Orchestrator;
use automator::tasks::default_registry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "automator", version, about = "Home-automation task supervisor")]
struct Cli {
    /// Override the task root directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every discovered task until all of them stop
    Run,
    /// Run a single task in isolation, with the same supervision semantics
    Debug {
        /// Name of the task directory to run
        task_name: String,
    },
    /// List the tasks discovery would pick up
    List,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AutomatorConfig::auto_load()?;
    if let Some(root) = cli.root {
        config.tasks_root = root;
    }

    log::info!("automator v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = Orchestrator::new(config, default_registry());

    // Tasks cooperate on a single thread: a body that blocks suspends every
    // other task until it returns.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Command::Run => runtime.block_on(orchestrator.run()),
        Command::Debug { task_name } => runtime.block_on(orchestrator.run_single(&task_name)),
        Command::List => {
            for unit in orchestrator.discover()? {
                println!("{}  [{}]", unit.name, unit.trigger);
            }
            Ok(())
        }
    }
}
