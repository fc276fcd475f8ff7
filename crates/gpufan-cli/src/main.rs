//! gpufan CLI - Main entry point

mod render;

use clap::Parser;
use gpufan_core::{run_batch, BatchConfig, IsolationConfig};
use render::SummaryRenderer;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fan a parameterized command out over a fixed set of GPU slots
#[derive(Parser, Debug)]
#[command(name = "gpufan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GPU slot identifiers; one worker runs per listed slot
    #[arg(long, num_args = 1.., required = true)]
    gpus: Vec<u32>,

    /// Command template; {gpu} and {x} are substituted per task
    #[arg(long)]
    cmd: String,

    /// Values substituted for {x}, one task per value
    #[arg(value_name = "X", required = true)]
    xs: Vec<String>,

    /// Run the batch inside a disposable git worktree created under this directory
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// Use the last commit even when the repository has uncommitted changes
    #[arg(long)]
    last_clean_git: bool,

    /// Print the summary as JSON instead of the text table
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let isolation = match &args.tmp_dir {
        Some(base_dir) => Some(IsolationConfig {
            repo_root: std::env::current_dir()?,
            base_dir: base_dir.clone(),
            allow_dirty: args.last_clean_git,
        }),
        None => None,
    };

    let config = BatchConfig {
        gpus: args.gpus,
        command: args.cmd,
        parameters: args.xs,
        isolation,
    };

    // Fatal errors (dirty repo, worktree create/cleanup failure) propagate
    // through anyhow and exit non-zero with their cause.
    let report = run_batch(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let color = std::io::stdout().is_terminal() && !args.no_color;
        print!("{}", SummaryRenderer::new(color).render(&report));
    }

    if !report.all_succeeded() {
        tracing::warn!("{} task(s) failed", report.failed_count());
        std::process::exit(1);
    }
    Ok(())
}
