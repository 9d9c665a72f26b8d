use crate::output::{print_csv, print_json};
use crate::types::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use synclog_runtime::Synclog;
use synclog_types::Dialect;

#[derive(Serialize)]
struct FileRow<'a> {
    filename: &'a str,
    file_type: Dialect,
}

pub fn handle(synclog: &Synclog, format: OutputFormat) -> Result<()> {
    let listing = synclog.log_files()?;

    match format {
        OutputFormat::Json => print_json(&listing),
        OutputFormat::Csv => {
            let success = listing.success_files.iter().map(|name| FileRow {
                filename: name,
                file_type: Dialect::Success,
            });
            let failed = listing.failed_files.iter().map(|name| FileRow {
                filename: name,
                file_type: Dialect::Failed,
            });
            print_csv(&success.chain(failed).collect::<Vec<_>>())
        }
        OutputFormat::Plain => {
            println!("Success reports ({}):", listing.success_files.len());
            for name in &listing.success_files {
                println!("  {}", name);
            }
            println!("Failed reports ({}):", listing.failed_files.len());
            for name in &listing.failed_files {
                println!("  {}", name);
            }
            Ok(())
        }
    }
}
