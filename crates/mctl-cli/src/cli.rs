//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mctl_config::FileProjectStore;
use mctl_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, command_span, init_logging};
use tracing::Instrument;
use uuid::Uuid;

use crate::commands::projects::{
    handle_project_list, handle_project_new, handle_project_remove, handle_project_show,
};
use crate::commands::rules::{handle_check, handle_edit, handle_save};
use crate::commands::static_routes::{handle_static_save, handle_static_show};
use crate::context::{AppContext, CliResult};

const DEFAULT_STORE_DIR: &str = ".mctl";

/// Parses CLI arguments, executes the requested command, and reports
/// failures on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let build_sha = option_env!("MCTL_BUILD_SHA").unwrap_or("dev");
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(command_label(&cli.command), &trace_id);

    match dispatch(cli).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = AppContext {
        store: FileProjectStore::new(cli.store_dir),
        output: cli.output,
    };

    match cli.command {
        Command::Edit(args) => handle_edit(&args),
        Command::Check(args) => handle_check(&ctx, &args),
        Command::Save(args) => handle_save(&ctx, &args).await,
        Command::New(args) => handle_project_new(&ctx, &args).await,
        Command::Ls => handle_project_list(&ctx).await,
        Command::Show(args) => handle_project_show(&ctx, &args).await,
        Command::Rm(args) => handle_project_remove(&ctx, &args).await,
        Command::Static(command) => match command {
            StaticCommand::Show(args) => handle_static_show(&ctx, &args).await,
            StaticCommand::Save(args) => handle_static_save(&ctx, &args).await,
        },
    }
}

#[derive(Parser)]
#[command(
    name = "mctl",
    about = "Edit, validate, and store project configuration documents"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "MCTL_STORE_DIR",
        default_value = DEFAULT_STORE_DIR
    )]
    store_dir: PathBuf,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "MCTL_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "MCTL_LOG_FORMAT")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert a structured project file into its editable form.
    Edit(EditArgs),
    /// Check that every rule of an editable project file parses.
    Check(FileArgs),
    /// Validate an editable project file and store it.
    Save(FileArgs),
    /// Create a project from the default template.
    New(NewArgs),
    /// List stored projects.
    Ls,
    /// Print a stored project.
    Show(ShowArgs),
    /// Delete a stored project.
    Rm(IdArgs),
    /// Manage the cluster-level static routing document.
    #[command(subcommand)]
    Static(StaticCommand),
}

#[derive(Subcommand)]
pub(crate) enum StaticCommand {
    /// Print the static routing document.
    Show(StaticShowArgs),
    /// Validate an editable static routing file and store it.
    Save(FileArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct EditArgs {
    /// Structured project document.
    pub(crate) input: PathBuf,
    /// Write the editable document here instead of stdout.
    #[arg(short = 'o', long = "out")]
    pub(crate) destination: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FileArgs {
    /// Editable document.
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct NewArgs {
    /// Project name.
    pub(crate) name: String,
    /// Database to configure (`mongo`, `postgres`, `mysql`).
    #[arg(long, default_value = "mongo")]
    pub(crate) db: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ShowArgs {
    /// Project identifier.
    pub(crate) id: String,
    /// Print rules as editable text.
    #[arg(long)]
    pub(crate) editable: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct IdArgs {
    /// Project identifier.
    pub(crate) id: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StaticShowArgs {
    /// Print routes as editable text.
    #[arg(long)]
    pub(crate) editable: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Edit(_) => "edit",
        Command::Check(_) => "check",
        Command::Save(_) => "save",
        Command::New(_) => "new",
        Command::Ls => "ls",
        Command::Show(_) => "show",
        Command::Rm(_) => "rm",
        Command::Static(StaticCommand::Show(_)) => "static.show",
        Command::Static(StaticCommand::Save(_)) => "static.save",
    }
}
