use crate::output::{print_csv, print_json, print_record_detail};
use crate::types::OutputFormat;
use anyhow::Result;
use synclog_runtime::Synclog;

pub fn handle(synclog: &Synclog, id: i64, format: OutputFormat) -> Result<()> {
    let record = synclog.get_log_by_id(id)?;

    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Csv => print_csv(&[record]),
        OutputFormat::Plain => {
            print_record_detail(&record);
            Ok(())
        }
    }
}
