use crate::output::{print_csv, print_json};
use crate::types::OutputFormat;
use anyhow::Result;
use synclog_runtime::Synclog;

pub fn handle(synclog: &Synclog, format: OutputFormat) -> Result<()> {
    let files = synclog.list_importable_files()?;

    match format {
        OutputFormat::Json => print_json(&files),
        OutputFormat::Csv => {
            let rows: Vec<_> = files.success.iter().chain(files.failed.iter()).collect();
            print_csv(&rows)
        }
        OutputFormat::Plain => {
            if files.is_empty() {
                println!("Nothing to import.");
                return Ok(());
            }
            for (label, group) in [("Success", &files.success), ("Failed", &files.failed)] {
                println!("{} reports ({}):", label, group.len());
                for file in group {
                    println!("  {}", file.filename);
                }
            }
            Ok(())
        }
    }
}
