use crate::output::{print_csv, print_json, print_stats};
use crate::types::OutputFormat;
use anyhow::Result;
use synclog_runtime::Synclog;

pub fn handle(synclog: &Synclog, format: OutputFormat) -> Result<()> {
    let stats = synclog.stats()?;

    match format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Csv => print_csv(&[stats]),
        OutputFormat::Plain => {
            print_stats(&stats);
            Ok(())
        }
    }
}
