use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use synclog_types::{LogFilters, LogQuery, LogSort};

use crate::{Error, Result};

/// Columns searched by free text, both through the FTS index and by substring.
const SEARCH_COLUMNS: &[&str] = &[
    "l.src_path",
    "l.dst_path",
    "l.message",
    "l.error_message",
    "l.request_id",
];

/// Bound parameter of a generated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Integer(value) => Ok(ToSqlOutput::from(*value)),
            SqlValue::Text(value) => Ok(ToSqlOutput::from(value.as_str())),
        }
    }
}

/// WHERE conditions (ANDed) with their parameters in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConditions {
    pub conditions: Vec<String>,
    pub params: Vec<SqlValue>,
}

impl FilterConditions {
    fn push(&mut self, condition: String, params: impl IntoIterator<Item = SqlValue>) {
        self.conditions.push(condition);
        self.params.extend(params);
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Everything needed to run the count query and the page query of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub filters: FilterConditions,
    pub order_by: String,
    pub limit: i64,
    pub offset: i64,
}

impl QueryPlan {
    /// Filter parameters followed by LIMIT and OFFSET.
    pub fn page_params(&self) -> Vec<SqlValue> {
        let mut params = self.filters.params.clone();
        params.push(SqlValue::Integer(self.limit));
        params.push(SqlValue::Integer(self.offset));
        params
    }
}

pub fn build_query(query: &LogQuery) -> Result<QueryPlan> {
    let page = query.page;
    if !page.is_valid() {
        return Err(Error::InvalidPagination {
            page: page.page,
            limit: page.limit,
        });
    }

    Ok(QueryPlan {
        filters: build_conditions(&query.filters),
        order_by: order_by(&query.sort),
        limit: i64::from(page.limit),
        offset: i64::try_from(page.offset()).unwrap_or(i64::MAX),
    })
}

pub fn build_conditions(filters: &LogFilters) -> FilterConditions {
    let mut out = FilterConditions::default();

    if let Some(status) = filters.status.status() {
        out.push(
            "l.status = ?".to_string(),
            [SqlValue::Text(status.as_str().to_string())],
        );
    }

    if let Some((lower, upper)) = filters.size.bounds() {
        let lower = clamp_bytes(lower);
        range_condition(&mut out, "l.file_size_bytes", lower, upper.map(clamp_bytes));
    }

    if let Some((lower, upper)) = filters.duration.bounds() {
        range_condition(&mut out, "l.cost", lower, upper);
    }

    match (
        filters.date_range.lower_bound(),
        filters.date_range.upper_bound(),
    ) {
        (Some(start), Some(end)) => out.push(
            "l.timestamp >= ? AND l.timestamp <= ?".to_string(),
            [SqlValue::Text(start), SqlValue::Text(end)],
        ),
        (Some(start), None) => out.push("l.timestamp >= ?".to_string(), [SqlValue::Text(start)]),
        (None, Some(end)) => out.push("l.timestamp <= ?".to_string(), [SqlValue::Text(end)]),
        (None, None) => {}
    }

    let terms = filters.search_terms();
    if !terms.is_empty() {
        search_condition(&mut out, &terms);
    }

    out
}

fn range_condition(out: &mut FilterConditions, column: &str, lower: i64, upper: Option<i64>) {
    match upper {
        Some(upper) => out.push(
            format!("{column} > ? AND {column} <= ?"),
            [SqlValue::Integer(lower), SqlValue::Integer(upper)],
        ),
        None => out.push(format!("{column} > ?"), [SqlValue::Integer(lower)]),
    }
}

/// A row matches when the FTS index matches every term, or when every term
/// is a substring of one of the searched columns.
fn search_condition(out: &mut FilterConditions, terms: &[&str]) {
    let mut branches = Vec::new();
    let mut params = Vec::new();

    // terms made only of punctuation produce no FTS tokens
    if terms.iter().all(|term| term.chars().any(char::is_alphanumeric)) {
        branches.push("l.id IN (SELECT rowid FROM logs_fts WHERE logs_fts MATCH ?)".to_string());
        params.push(SqlValue::Text(fts_expression(terms)));
    }

    let per_term = SEARCH_COLUMNS
        .iter()
        .map(|column| format!("{column} LIKE ? ESCAPE '\\'"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let substring = terms
        .iter()
        .map(|_| format!("({per_term})"))
        .collect::<Vec<_>>()
        .join(" AND ");
    branches.push(format!("({substring})"));
    for term in terms {
        let pattern = like_pattern(term);
        params.extend(SEARCH_COLUMNS.iter().map(|_| SqlValue::Text(pattern.clone())));
    }

    out.push(format!("({})", branches.join(" OR ")), params);
}

/// Each term becomes a quoted prefix phrase; FTS5 ANDs adjacent phrases.
fn fts_expression(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|term| format!("\"{}\"*", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn order_by(sort: &LogSort) -> String {
    let direction = sort.direction.keyword();
    format!(
        "l.{} {}, l.id {}",
        sort.column.column_name(),
        direction,
        direction
    )
}

fn clamp_bytes(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}
