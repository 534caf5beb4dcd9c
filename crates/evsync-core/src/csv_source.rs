// Remote CSV source for the push path
//
// The municipal feed is CP932-encoded (encoding_rs's Shift_JIS codec is
// the WHATWG superset covering it). Rows come back keyed by the display
// labels; the start/end date columns are pre-parsed so the filter works
// on calendar dates, with invalid cells degrading to absent.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::coerce::parse_datetime_utc;
use crate::error::{Result, SyncError};
use crate::mapping::{END_DATE_LABEL, START_DATE_LABEL};

/// One CSV row, keyed by display label.
#[derive(Debug, Clone)]
pub struct EventRow {
    columns: HashMap<String, String>,

    /// `開始日`, absent when the cell is empty or unparseable
    pub start_date: Option<NaiveDate>,

    /// `終了日`, absent when the cell is empty or unparseable
    pub end_date: Option<NaiveDate>,
}

impl EventRow {
    /// Raw cell under a display label; absent columns and empty cells
    /// both read as `None`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.columns
            .get(label)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Download and parse the event CSV. Transport failures and non-2xx
/// statuses are fatal; without the source there is nothing to push.
pub async fn fetch_rows(http: &reqwest::Client, csv_url: &str) -> Result<Vec<EventRow>> {
    let response = http.get(csv_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::CsvFetch {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    let (text, _, _) = encoding_rs::SHIFT_JIS.decode(&bytes);
    parse_rows(&text)
}

/// Parse decoded CSV text into display-label-keyed rows.
pub fn parse_rows(text: &str) -> Result<Vec<EventRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let columns: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.trim().to_string(), v.to_string()))
            .collect();

        let start_date = parse_cell_date(&columns, START_DATE_LABEL);
        let end_date = parse_cell_date(&columns, END_DATE_LABEL);
        rows.push(EventRow {
            columns,
            start_date,
            end_date,
        });
    }
    Ok(rows)
}

fn parse_cell_date(columns: &HashMap<String, String>, label: &str) -> Option<NaiveDate> {
    let cell = columns.get(label)?;
    parse_datetime_utc(cell).map(|dt| dt.date_naive())
}
