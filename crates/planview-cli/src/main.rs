mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "planview",
    about = "Live dashboard and inspection tools for markdown planning trees",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root (defaults to walking up from the current directory)
    #[arg(long, global = true, env = "PLANVIEW_ROOT")]
    root: Option<PathBuf>,

    /// Emit machine-readable JSON
    #[arg(long, short = 'j', global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the live dashboard
    Serve {
        /// Port to bind (0 picks a free port)
        #[arg(long, default_value = "0")]
        port: u16,
        /// Do not open the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Show the current snapshot of the planning tree
    Status,
    /// Compare STATE.md against the files it references
    Drift,
    /// Inspect the persisted state record
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
    /// Append a timestamped note to a plan
    Note {
        /// Task id, e.g. 01-02
        task: String,
        /// Note text
        content: String,
    },
    /// Show the wave schedule and complexity estimate
    Schedule,
}

#[derive(Subcommand)]
enum StateCommands {
    /// Print the state record
    Show,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if matches!(cli.command, Commands::Serve { .. }) {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.clone());
    let result = match cli.command {
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Drift => cmd::drift::run(&root, cli.json),
        Commands::State { command } => match command {
            StateCommands::Show => cmd::state::show(&root, cli.json),
        },
        Commands::Note { task, content } => cmd::note::run(&root, &task, &content, cli.json),
        Commands::Schedule => cmd::schedule::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
