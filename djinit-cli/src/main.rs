//! djinit — Django project scaffolding CLI.
//!
//! # Usage
//!
//! ```text
//! djinit setup <dir> --project <name> [--app <name>]... [--module <name>]
//!        [--nested-dir <dir>] [--database postgresql|mysql|sqlite]
//!        [--no-database-url] [--templates <dir>] [--dry-run]
//! djinit app <names>... [--dry-run] [--templates <dir>]
//! djinit secret [--count N] [--length N]
//! djinit render <template-file> [--context <file>] [--set key=value]...
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{app::AppArgs, render::RenderArgs, secret::SecretArgs, setup::SetupArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "djinit",
    version,
    about = "Scaffold Django projects and apps from bundled templates",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new Django project.
    Setup(SetupArgs),

    /// Add one or more apps to the project in the current directory.
    App(AppArgs),

    /// Generate Django SECRET_KEY values.
    Secret(SecretArgs),

    /// Render a template file with a context and print the result.
    Render(RenderArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Setup(args) => args.run(),
        Commands::App(args) => args.run(),
        Commands::Secret(args) => args.run(),
        Commands::Render(args) => args.run(),
    }
}
