use crate::output::print_json;
use crate::types::OutputFormat;
use anyhow::Result;
use serde_json::json;
use std::path::Path;
use synclog_runtime::Synclog;

pub fn handle(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let result = Synclog::init(data_dir)?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "data_dir": result.data_dir,
            "config_path": result.config_path,
            "config_created": result.config_created,
            "db_path": result.db_path,
            "schema_version": result.schema_version,
        })),
        OutputFormat::Plain | OutputFormat::Csv => {
            if result.config_created {
                println!("Wrote default config to {}", result.config_path.display());
            } else {
                println!("Using existing config at {}", result.config_path.display());
            }
            println!(
                "Database ready at {} (schema v{})",
                result.db_path.display(),
                result.schema_version
            );
            Ok(())
        }
    }
}
