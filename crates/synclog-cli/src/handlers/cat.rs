use crate::output::{print_csv, print_json};
use crate::types::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use synclog_runtime::Synclog;

#[derive(Serialize)]
struct SourceText<'a> {
    filename: &'a str,
    content: &'a str,
}

pub fn handle(synclog: &Synclog, name: &str, format: OutputFormat) -> Result<()> {
    let content = synclog.read_source(name)?;
    let source = SourceText {
        filename: name,
        content: &content,
    };

    match format {
        OutputFormat::Json => print_json(&source),
        OutputFormat::Csv => print_csv(&[source]),
        OutputFormat::Plain => {
            print!("{}", content);
            Ok(())
        }
    }
}
