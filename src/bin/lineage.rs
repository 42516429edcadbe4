//! Lineage CLI: replay a job plan through the lineage lifecycle.
//!
//! Usage:
//!   lineage replay <plan.yaml> [--config path] [--app-name name] [--fail message]
//!   lineage flatten <plan.yaml>
//!
//! Events are written to stdout as JSON lines; logs go to stderr.

use clap::{Parser, Subcommand};
use lineage::{
    flatten, ChannelSink, JobException, JobId, JobPlan, JobResult, LineageAgent, LineageConfig,
    LineageListener, StdoutTransport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lineage",
    version,
    about = "Data-lineage extraction for batch jobs"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind, start and end a job described by a plan, printing its events
    Replay {
        /// Path to the YAML job plan
        plan: PathBuf,
        /// Path to the agent config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Application name (overrides config and plan)
        #[arg(long)]
        app_name: Option<String>,
        /// End the job as failed with this exception message
        #[arg(long)]
        fail: Option<String>,
        /// Host job id to report
        #[arg(long, default_value_t = 0)]
        job_id: u64,
    },
    /// Print the ids of every node reachable from the plan's root
    Flatten {
        /// Path to the YAML job plan
        plan: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn cmd_replay(
    plan_path: &Path,
    config_path: Option<&Path>,
    app_name: Option<String>,
    fail: Option<String>,
    job_id: u64,
) -> i32 {
    let plan = match JobPlan::from_file(plan_path) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let root = match plan.build() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let mut config = match LineageConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            return 1;
        }
    };
    if let Some(name) = app_name.or(plan.app_name.clone()) {
        config.app_name = Some(name);
    }

    let (sink, delivery) = ChannelSink::spawn(StdoutTransport);
    let agent = match LineageAgent::new(config, Arc::new(sink)) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let job = JobId(job_id);
    {
        let listener = LineageListener::new(Arc::new(agent));
        listener.on_final_node_bound(job, &root);
        listener.on_job_start(job, now_millis());

        let result = match fail {
            Some(message) => JobResult::failed(JobException::new("lineage.ReplayFailure", message)),
            None => JobResult::Succeeded,
        };
        listener.on_job_end(job, now_millis(), &result);
    }

    // The listener (and the only sink handle) is gone; wait for the queue to drain.
    match delivery.await {
        Ok(stats) if stats.failed == 0 => 0,
        Ok(stats) => {
            eprintln!("Error: {} of {} events failed to deliver", stats.failed, stats.failed + stats.delivered);
            1
        }
        Err(e) => {
            eprintln!("Error: delivery task failed: {}", e);
            1
        }
    }
}

fn cmd_flatten(plan_path: &Path) -> i32 {
    let root = match JobPlan::from_file(plan_path).and_then(|plan| plan.build()) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    for node in flatten(&root) {
        println!("{:<24}  {:<24}  {}", node.id, node.operation, node.binding.kind());
    }
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Replay {
            plan,
            config,
            app_name,
            fail,
            job_id,
        } => cmd_replay(&plan, config.as_deref(), app_name, fail, job_id).await,
        Commands::Flatten { plan } => cmd_flatten(&plan),
    };
    std::process::exit(code);
}
