use crate::output::{print_csv, print_json, print_records_table};
use crate::types::OutputFormat;
use anyhow::Result;
use chrono::NaiveDate;
use synclog_runtime::Synclog;
use synclog_types::{
    DateRange, DurationBucket, LogFilters, LogQuery, LogSort, SizeBucket, StatusFilter,
};

/// Flags of the `logs` subcommand.
pub struct LogsArgs {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: StatusFilter,
    pub size: SizeBucket,
    pub duration: DurationBucket,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: String,
    pub direction: String,
}

impl LogsArgs {
    fn into_query(self, synclog: &Synclog) -> LogQuery {
        LogQuery {
            page: synclog.config().page_request(self.page, self.limit),
            filters: LogFilters {
                status: self.status,
                size: self.size,
                duration: self.duration,
                date_range: DateRange::new(self.from, self.to),
                search: self.search.filter(|text| !text.trim().is_empty()),
            },
            sort: LogSort::from_request(&self.sort, &self.direction),
        }
    }
}

pub fn handle(synclog: &Synclog, args: LogsArgs, format: OutputFormat) -> Result<()> {
    let query = args.into_query(synclog);
    let page = synclog.query_logs(&query)?;

    match format {
        OutputFormat::Json => print_json(&page),
        OutputFormat::Csv => print_csv(&page.logs),
        OutputFormat::Plain => {
            print_records_table(&page);
            Ok(())
        }
    }
}
