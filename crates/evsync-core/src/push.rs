// Push pipeline: CSV rows → create-or-update broker entities
//
// Rows are processed strictly in sequence; a failed write is logged and
// the loop moves on to the next row. The run only aborts when the CSV
// source itself cannot be fetched or parsed.

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use serde_json::{json, Map, Value};

use crate::coerce::{coerce, format_utc};
use crate::config::SyncConfig;
use crate::csv_source::{self, EventRow};
use crate::datefilter;
use crate::error::Result;
use crate::mapping::{AttributeType, ENTITY_ID_PREFIX, ENTITY_TYPE, EVENT_NO_LABEL, FIELDS};
use crate::orion::OrionClient;
use crate::sanitize::sanitize_strict;

/// Download the event CSV and push every row whose date interval covers
/// the target date (tomorrow, local clock) to the broker.
pub async fn run(config: &SyncConfig) -> Result<()> {
    let csv_url = config.csv_url()?;
    let http = reqwest::Client::new();
    let rows = csv_source::fetch_rows(&http, csv_url).await?;

    let target = Local::now().date_naive() + Days::new(1);
    let client = OrionClient::new(config);
    push_rows(&client, &rows, target).await
}

/// Push the rows matching `target`, one broker round-trip at a time.
pub async fn push_rows(client: &OrionClient, rows: &[EventRow], target: NaiveDate) -> Result<()> {
    let mut pushed = 0usize;
    for row in rows {
        // rows with an unparseable start date fall out here
        if !datefilter::matches(target, row.start_date, row.end_date) {
            continue;
        }

        let Some(event_no) = event_no(row) else {
            tracing::warn!("skipping row without a numeric event id");
            continue;
        };
        let entity_id = format!("{ENTITY_ID_PREFIX}{event_no}");
        let attrs = build_attrs(row, Utc::now());

        if client.entity_exists(&entity_id).await {
            tracing::info!(%entity_id, "updating existing entity");
            client
                .update_attrs(&entity_id, &Value::Object(attrs))
                .await;
        } else {
            tracing::info!(%entity_id, "creating entity");
            let mut payload = Map::with_capacity(attrs.len() + 2);
            payload.insert("id".to_string(), json!(entity_id));
            payload.insert("type".to_string(), json!(ENTITY_TYPE));
            payload.extend(attrs);
            client.create_entity(&Value::Object(payload)).await;
        }
        pushed += 1;
    }

    tracing::info!(count = pushed, date = %target, "push run finished");
    Ok(())
}

/// Numeric event id from the `NO` column. Integral floats are accepted
/// (the feed occasionally renders ids as `42.0`); anything else is
/// absent and the row is skipped.
fn event_no(row: &EventRow) -> Option<i64> {
    let raw = row.get(EVENT_NO_LABEL)?.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Build the typed attribute map for one row: strict sanitization, then
/// per-field type coercion, with absent values omitted entirely. The
/// `updated_at` attribute is always stamped with the run time.
fn build_attrs(row: &EventRow, now: DateTime<Utc>) -> Map<String, Value> {
    let mut attrs = Map::new();
    for spec in FIELDS.iter().filter(|spec| spec.pushed) {
        let Some(raw) = row.get(spec.label) else {
            continue;
        };
        let Some(sanitized) = sanitize_strict(raw) else {
            continue;
        };
        let Some(value) = coerce(&Value::String(sanitized), spec.ty) else {
            continue;
        };
        attrs.insert(
            spec.name.to_string(),
            json!({ "value": value, "type": spec.ty.as_str() }),
        );
    }
    attrs.insert(
        "updated_at".to_string(),
        json!({
            "value": format_utc(&now),
            "type": AttributeType::DateTime.as_str(),
        }),
    );
    attrs
}
