use super::args::{Cli, Commands};
use super::handlers;
use crate::handlers::logs::LogsArgs;
use crate::logging;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;
use synclog_runtime::{Synclog, resolve_workspace_path};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level, cli.log_format);

    let data_dir = resolve_workspace_path(cli.data_dir.as_deref())?;
    tracing::debug!(data_dir = %data_dir.display(), "resolved workspace");

    dispatch(cli.command, &data_dir, cli.format)
}

fn dispatch(command: Commands, data_dir: &Path, format: OutputFormat) -> Result<()> {
    match command {
        // the only command that works without an existing workspace
        Commands::Init => handlers::init::handle(data_dir, format),

        Commands::Import { dir } => {
            handlers::import::handle_all(&open(data_dir)?, dir.as_deref(), format)
        }

        Commands::ImportFile { name, dialect } => {
            handlers::import::handle_file(&open(data_dir)?, &name, dialect, format)
        }

        Commands::Importable => handlers::importable::handle(&open(data_dir)?, format),

        Commands::Cat { name } => handlers::cat::handle(&open(data_dir)?, &name, format),

        Commands::Files => handlers::files::handle(&open(data_dir)?, format),

        Commands::Logs {
            page,
            limit,
            status,
            size,
            duration,
            from,
            to,
            search,
            sort,
            direction,
        } => handlers::logs::handle(
            &open(data_dir)?,
            LogsArgs {
                page,
                limit,
                status,
                size,
                duration,
                from,
                to,
                search,
                sort,
                direction,
            },
            format,
        ),

        Commands::Show { id } => handlers::show::handle(&open(data_dir)?, id, format),

        Commands::Stats => handlers::stats::handle(&open(data_dir)?, format),
    }
}

fn open(data_dir: &Path) -> Result<Synclog> {
    Synclog::open(data_dir.to_path_buf())
        .with_context(|| format!("Failed to open workspace at {}", data_dir.display()))
}
