#![forbid(unsafe_code)]

mod cmd;
mod output;
mod runtime;

use clap::{Parser, Subcommand};
use output::OutputMode;
use runtime::Ctx;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tsk: event-sourced todo service CLI",
    long_about = None
)]
struct Cli {
    /// User whose todo list is addressed (falls back to TASKPIPE_USER).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Acting identity, when different from --user. Mutations by a
    /// non-owner are rejected.
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Data directory (falls back to TASKPIPE_DATA_DIR, then the platform
    /// user data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Create a new todo",
        after_help = "EXAMPLES:\n    # Create a todo\n    tsk add \"Buy milk\"\n\n    # With a description\n    tsk add \"Buy milk\" --description \"2L, whole\"\n\n    # Emit machine-readable output\n    tsk add \"Buy milk\" --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        about = "List todos",
        after_help = "EXAMPLES:\n    # List everything\n    tsk list\n\n    # Only unfinished todos\n    tsk list --filter pending\n\n    # Emit machine-readable output\n    tsk list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Show one todo",
        after_help = "EXAMPLES:\n    # Show a todo by id\n    tsk show 4b4a...\n\n    # Emit machine-readable output\n    tsk show 4b4a... --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        about = "Change a todo's title or description",
        after_help = "EXAMPLES:\n    # Retitle\n    tsk update 4b4a... --title \"Buy oat milk\"\n\n    # Touch without changing content (refreshes updated_at)\n    tsk update 4b4a..."
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        about = "Toggle or set completion",
        after_help = "EXAMPLES:\n    # Flip the flag\n    tsk done 4b4a...\n\n    # Set it explicitly\n    tsk done 4b4a... --set false"
    )]
    Done(cmd::done::DoneArgs),

    #[command(
        about = "Delete a todo",
        after_help = "EXAMPLES:\n    # Delete by id\n    tsk rm 4b4a...\n\n    # Emit machine-readable output\n    tsk rm 4b4a... --json"
    )]
    Rm(cmd::delete::RmArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKPIPE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "taskpipe=debug,info"
        } else {
            "taskpipe=info,warn"
        })
    });

    let format = env::var("TASKPIPE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    if cli.verbose {
        debug!("verbose mode enabled");
    }

    let ctx = Ctx::open(
        cli.data_dir.clone(),
        cli.user.as_deref(),
        cli.actor.as_deref(),
    )?;

    match cli.command {
        Commands::Add(ref args) => cmd::add::run_add(args, &ctx, output),
        Commands::List(ref args) => cmd::list::run_list(args, &ctx, output),
        Commands::Show(ref args) => cmd::show::run_show(args, &ctx, output),
        Commands::Update(ref args) => cmd::update::run_update(args, &ctx, output),
        Commands::Done(ref args) => cmd::done::run_done(args, &ctx, output),
        Commands::Rm(ref args) => cmd::delete::run_rm(args, &ctx, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["tsk", "--json", "list"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tsk", "list", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn default_output_is_human() {
        let cli = Cli::parse_from(["tsk", "list"]);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn user_and_actor_flags_parse_globally() {
        let cli = Cli::parse_from(["tsk", "list", "--user", "u-1", "--actor", "a-1"]);
        assert_eq!(cli.user.as_deref(), Some("u-1"));
        assert_eq!(cli.actor.as_deref(), Some("a-1"));
    }

    #[test]
    fn all_subcommands_listed() {
        let id = "0e43cbde-5480-4b50-9d4a-1bf8a2c4f7b7";
        let subcommands = [
            vec!["tsk", "add", "x"],
            vec!["tsk", "list"],
            vec!["tsk", "show", id],
            vec!["tsk", "update", id, "--title", "y"],
            vec!["tsk", "done", id],
            vec!["tsk", "done", id, "--set", "true"],
            vec!["tsk", "rm", id],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn list_filter_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["tsk", "list", "--filter", "done"]).is_err());
    }

    #[test]
    fn show_rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["tsk", "show", "not-a-uuid"]).is_err());
    }
}
