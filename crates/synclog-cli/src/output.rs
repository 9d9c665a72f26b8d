use anyhow::Result;
use serde::Serialize;
use std::io;
use synclog_types::{GIB, KIB, LogPage, LogStats, MIB, StoredRecord, TIB};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Rows as CSV on stdout, header taken from the field names.
pub fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_records_table(page: &LogPage) {
    if page.logs.is_empty() {
        println!("No records found.");
    } else {
        println!(
            "{:<8} {:<20} {:<8} {:>10} {:>9}  TRANSFER",
            "ID", "TIMESTAMP", "STATUS", "SIZE", "COST(ms)"
        );
        for record in &page.logs {
            println!(
                "{:<8} {:<20} {:<8} {:>10} {:>9}  {}",
                record.id,
                record.timestamp,
                record.status.as_str(),
                record.file_size,
                record
                    .cost
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                transfer_summary(record)
            );
        }
    }

    let pagination = &page.pagination;
    println!(
        "\nPage {} of {} ({} records)",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total
    );
}

pub fn print_record_detail(record: &StoredRecord) {
    println!("Record #{}", record.id);
    println!("{}", "=".repeat(60));
    println!("Log file:      {}", record.log_file);
    println!("Timestamp:     {}", record.timestamp);
    println!("Status:        {}", record.status);
    println!(
        "Size:          {} ({} bytes)",
        record.file_size, record.file_size_bytes
    );
    println!("Source:        {}", record.src_path);
    println!("Destination:   {}", record.dst_path);
    println!(
        "Cost:          {}",
        record
            .cost
            .map(|c| format!("{} ms", c))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Status code:   {}", record.status_code);
    if let Some(message) = &record.message {
        println!("Message:       {}", message);
    }
    if let Some(code) = &record.error_code {
        println!("Error code:    {}", code);
    }
    if let Some(message) = &record.error_message {
        println!("Error message: {}", message);
    }
    println!("Request id:    {}", record.request_id);
    println!("MD5:           {}", record.md5);
}

pub fn print_stats(stats: &LogStats) {
    println!("TRANSFER STATISTICS");
    println!("{}", "=".repeat(60));
    println!("Total records:      {}", stats.total_logs);
    println!("Succeeded:          {}", stats.success_logs);
    println!("Failed:             {}", stats.failed_logs);
    println!(
        "Bytes transferred:  {} ({} bytes)",
        format_bytes(stats.total_size),
        stats.total_size
    );
}

fn transfer_summary(record: &StoredRecord) -> String {
    if record.src_path.is_empty() && record.dst_path.is_empty() {
        return record
            .error_message
            .clone()
            .unwrap_or_else(|| "-".to_string());
    }
    format!("{} --> {}", record.src_path, record.dst_path)
}

/// Human-readable size using the same 1024-based units the reports use.
pub fn format_bytes(bytes: i64) -> String {
    let value = bytes.max(0) as u64;
    let (unit, divisor) = match value {
        v if v >= TIB => ("TiB", TIB),
        v if v >= GIB => ("GiB", GIB),
        v if v >= MIB => ("MiB", MIB),
        v if v >= KIB => ("KiB", KIB),
        _ => return format!("{} B", value),
    };
    format!("{:.1} {}", value as f64 / divisor as f64, unit)
}
