//! Read-path tests against a seeded in-memory store

use chrono::{NaiveDate, TimeZone, Utc};
use synclog_index::{Database, Error};
use synclog_types::{
    DateRange, Dialect, DurationBucket, KIB, LogFilters, LogQuery, LogSort, MIB, PageRequest,
    SizeBucket, StatusFilter, TransferOutcome, TransferRecord, TransferStatus,
};

struct Row {
    ts: (u32, u32, u32, u32),
    bytes: u64,
    cost: Option<i64>,
    src: &'static str,
    message: &'static str,
}

fn success(row: &Row) -> TransferRecord {
    let (month, day, hour, minute) = row.ts;
    TransferRecord {
        timestamp: Utc
            .with_ymd_and_hms(2024, month, day, hour, minute, 0)
            .unwrap(),
        file_size: format!("{}B", row.bytes),
        file_size_bytes: row.bytes,
        src_path: row.src.to_string(),
        dst_path: format!("oss://bucket{}", row.src),
        cost_ms: row.cost,
        status_code: "200".to_string(),
        request_id: "n/a".to_string(),
        md5: "n/a".to_string(),
        outcome: TransferOutcome::Succeeded {
            message: row.message.to_string(),
        },
    }
}

fn failure(src: &str, error_message: &str) -> TransferRecord {
    TransferRecord {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
        file_size: "n/a".to_string(),
        file_size_bytes: 0,
        src_path: src.to_string(),
        dst_path: String::new(),
        cost_ms: None,
        status_code: "n/a".to_string(),
        request_id: "req-77".to_string(),
        md5: "n/a".to_string(),
        outcome: TransferOutcome::Failed {
            error_code: "NoSuchBucket".to_string(),
            error_message: error_message.to_string(),
        },
    }
}

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    let rows = [
        Row { ts: (3, 1, 23, 59), bytes: 0, cost: None, src: "/data/empty.txt", message: "skipped" },
        Row { ts: (3, 2, 0, 0), bytes: MIB, cost: Some(50), src: "/data/report.csv", message: "uploaded" },
        Row { ts: (3, 2, 8, 0), bytes: MIB + 1, cost: Some(100), src: "/data/a.bin", message: "uploaded" },
        Row { ts: (3, 2, 9, 0), bytes: 10 * MIB, cost: Some(101), src: "/data/b.bin", message: "café upload" },
        Row { ts: (3, 3, 1, 0), bytes: 10 * MIB + 1, cost: Some(500), src: "/data/c.bin", message: "uploaded" },
        Row { ts: (3, 3, 2, 0), bytes: 100 * MIB + 1, cost: Some(501), src: "/data/d.bin", message: "uploaded" },
    ];
    let records: Vec<_> = rows.iter().map(success).collect();
    db.insert_log_file_with_records("sync_succeed_seed.txt", Dialect::Success, &records)
        .unwrap();

    db.insert_log_file_with_records(
        "sync_failed_seed.txt",
        Dialect::Failed,
        &[failure("/data/e.bin", "bucket missing"), failure("", "50%_done")],
    )
    .unwrap();

    db
}

fn query(filters: LogFilters) -> LogQuery {
    LogQuery {
        page: PageRequest::new(1, 100),
        filters,
        sort: LogSort::from_request("timestamp", "asc"),
    }
}

fn sources(db: &Database, filters: LogFilters) -> Vec<String> {
    db.query_logs(&query(filters))
        .unwrap()
        .logs
        .into_iter()
        .map(|log| log.src_path)
        .collect()
}

#[test]
fn test_size_buckets_exclude_lower_include_upper() {
    let db = seeded();
    let by_size = |size| sources(&db, LogFilters { size, ..Default::default() });

    assert_eq!(by_size(SizeBucket::UpTo1Mb), vec!["/data/report.csv"]);
    assert_eq!(by_size(SizeBucket::From1To10Mb), vec!["/data/a.bin", "/data/b.bin"]);
    assert_eq!(by_size(SizeBucket::From10To100Mb), vec!["/data/c.bin"]);
    assert_eq!(by_size(SizeBucket::Over100Mb), vec!["/data/d.bin"]);
}

#[test]
fn test_duration_buckets_skip_missing_cost() {
    let db = seeded();
    let by_cost = |duration| sources(&db, LogFilters { duration, ..Default::default() });

    assert_eq!(
        by_cost(DurationBucket::UpTo100Ms),
        vec!["/data/report.csv", "/data/a.bin"]
    );
    assert_eq!(
        by_cost(DurationBucket::From100To500Ms),
        vec!["/data/b.bin", "/data/c.bin"]
    );
    assert_eq!(by_cost(DurationBucket::Over500Ms), vec!["/data/d.bin"]);
}

#[test]
fn test_date_range_is_inclusive_whole_days() {
    let db = seeded();
    let day = |d| NaiveDate::from_ymd_opt(2024, 3, d);
    let in_range = |start, end| {
        let filters = LogFilters {
            status: StatusFilter::Success,
            date_range: DateRange::new(start, end),
            ..Default::default()
        };
        db.query_logs(&query(filters)).unwrap().pagination.total
    };

    assert_eq!(in_range(day(2), day(2)), 3);
    assert_eq!(in_range(day(2), None), 5);
    assert_eq!(in_range(None, day(2)), 4);
    assert_eq!(in_range(day(4), None), 0);
}

#[test]
fn test_status_filter() {
    let db = seeded();
    let page = db
        .query_logs(&query(LogFilters {
            status: StatusFilter::Failed,
            ..Default::default()
        }))
        .unwrap();

    assert_eq!(page.pagination.total, 2);
    for log in &page.logs {
        assert_eq!(log.status, TransferStatus::Failed);
        assert_eq!(log.log_file, "sync_failed_seed.txt");
        assert_eq!(log.message, None);
        assert_eq!(log.error_code.as_deref(), Some("NoSuchBucket"));
    }
}

#[test]
fn test_search_matches_index_or_substring() {
    let db = seeded();
    let search = |text: &str| {
        sources(
            &db,
            LogFilters {
                search: Some(text.to_string()),
                ..Default::default()
            },
        )
    };

    // token prefix through the index
    assert_eq!(search("repo csv"), vec!["/data/report.csv"]);
    // mid-word substring, only the LIKE branch can match
    assert_eq!(search("eport"), vec!["/data/report.csv"]);
    // diacritic folding, only the index can match
    assert_eq!(search("cafe"), vec!["/data/b.bin"]);
    // wildcard characters are literal
    assert_eq!(search("%_"), vec![""]);
    // error messages and request ids are searched too
    assert_eq!(search("missing req-77"), vec!["/data/e.bin"]);
    assert!(search("nothing-like-this").is_empty());
}

#[test]
fn test_pagination_over_45_records() {
    let db = Database::open_in_memory().unwrap();
    let records: Vec<_> = (0..45)
        .map(|i| {
            success(&Row {
                ts: (4, 1, i / 60, i % 60),
                bytes: u64::from(i) * KIB,
                cost: Some(i64::from(i)),
                src: "/bulk/file",
                message: "ok",
            })
        })
        .collect();
    db.insert_log_file_with_records("sync_succeed_bulk.txt", Dialect::Success, &records)
        .unwrap();

    let page_of = |page| {
        db.query_logs(&LogQuery {
            page: PageRequest::new(page, 20),
            ..Default::default()
        })
        .unwrap()
    };

    let third = page_of(3);
    assert_eq!(third.logs.len(), 5);
    assert_eq!(third.pagination.total, 45);
    assert_eq!(third.pagination.total_pages, 3);
    // newest first by default, so the last page holds the oldest rows
    assert_eq!(third.logs.last().unwrap().timestamp, "2024-04-01T00:00:00Z");

    let past_end = page_of(4);
    assert!(past_end.logs.is_empty());
    assert_eq!(past_end.pagination.total, 45);
}

#[test]
fn test_sort_allow_list_and_fallback() {
    let db = seeded();
    let sorted = |column: &str, direction: &str| {
        db.query_logs(&LogQuery {
            page: PageRequest::new(1, 100),
            filters: LogFilters {
                status: StatusFilter::Success,
                ..Default::default()
            },
            sort: LogSort::from_request(column, direction),
        })
        .unwrap()
        .logs
        .into_iter()
        .map(|log| log.file_size_bytes)
        .collect::<Vec<_>>()
    };

    let by_size = sorted("file_size_bytes", "desc");
    let mut expected = by_size.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(by_size, expected);

    // unknown column sorts by timestamp, same as asking for it
    assert_eq!(sorted("md5; DROP TABLE logs", "asc"), sorted("timestamp", "asc"));
    assert_eq!(db.count_logs().unwrap(), 8);
}

#[test]
fn test_invalid_pagination_is_an_error() {
    let db = seeded();
    let result = db.query_logs(&LogQuery {
        page: PageRequest::new(1, 0),
        ..Default::default()
    });

    assert!(matches!(result, Err(Error::InvalidPagination { page: 1, limit: 0 })));
}

#[test]
fn test_stats_count_bytes_of_successes_only() {
    let db = seeded();
    let stats = db.stats().unwrap();

    assert_eq!(stats.total_logs, 8);
    assert_eq!(stats.success_logs, 6);
    assert_eq!(stats.failed_logs, 2);
    let expected = MIB + (MIB + 1) + 10 * MIB + (10 * MIB + 1) + (100 * MIB + 1);
    assert_eq!(stats.total_size, expected as i64);
}

#[test]
fn test_empty_store_stats_are_zero() {
    let db = Database::open_in_memory().unwrap();
    let stats = db.stats().unwrap();

    assert_eq!(stats.total_logs, 0);
    assert_eq!(stats.total_size, 0);
}
