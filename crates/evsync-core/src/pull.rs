// Pull pipeline: broker query → display-keyed records
//
// Design Decision: The two historical fetch strategies (server-side filter
// expressions vs. full fetch with local date filtering) live behind one
// FetchStrategy switch instead of two parallel code paths.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::coerce::parse_datetime_utc;
use crate::datefilter;
use crate::error::Result;
use crate::mapping::{self, ENTITY_TYPE};
use crate::orion::{OrionClient, QueryFilter};

/// Fixed result-limit parameter on broker queries; there is no
/// pagination beyond it.
const RESULT_LIMIT: u32 = 1000;

/// Where the date filtering happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Push the date predicates down to the broker (two queries, one for
    /// ranged events and one for single-day events, merged by id)
    ServerFilter,

    /// Fetch everything and filter locally by date overlap
    ClientFilter,
}

/// Fetch events overlapping `date` and project them onto display labels,
/// in attribute-table order.
pub async fn run(
    client: &OrionClient,
    date: NaiveDate,
    strategy: FetchStrategy,
) -> Result<Vec<Map<String, Value>>> {
    let events = match strategy {
        FetchStrategy::ServerFilter => fetch_server_filtered(client, date).await?,
        FetchStrategy::ClientFilter => fetch_client_filtered(client, date).await?,
    };

    Ok(events
        .iter()
        .filter_map(Value::as_object)
        .map(mapping::to_display)
        .collect())
}

/// Ranged events (`start <= date <= end`) and single-day events
/// (`start == date`, no end attribute) come back from two pushed-down
/// queries whose results are merged by entity id.
async fn fetch_server_filtered(client: &OrionClient, date: NaiveDate) -> Result<Vec<Value>> {
    let day = date.format("%Y-%m-%d").to_string();

    let ranged = QueryFilter::new()
        .le("start_date", &day)
        .ge("end_date", &day)
        .build();
    let single_day = QueryFilter::new()
        .eq("start_date", &day)
        .absent("end_date")
        .build();

    let first = client
        .query(ENTITY_TYPE, Some(ranged.as_str()), RESULT_LIMIT)
        .await?;
    let second = client
        .query(ENTITY_TYPE, Some(single_day.as_str()), RESULT_LIMIT)
        .await?;

    Ok(merge_by_id([first, second]))
}

async fn fetch_client_filtered(client: &OrionClient, date: NaiveDate) -> Result<Vec<Value>> {
    let mut events = client.query(ENTITY_TYPE, None, RESULT_LIMIT).await?;
    events.retain(|entity| {
        datefilter::matches(
            date,
            entity_date(entity, "start_date"),
            entity_date(entity, "end_date"),
        )
    });
    Ok(events)
}

/// Merge query results into one list with a single record per entity id;
/// a later occurrence of an id replaces an earlier one. Entities without
/// a string id are dropped. Output order is not specified.
fn merge_by_id<I>(lists: I) -> Vec<Value>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    let mut by_id: HashMap<String, Value> = HashMap::new();
    for entity in lists.into_iter().flatten() {
        let Some(id) = entity.get("id").and_then(Value::as_str) else {
            continue;
        };
        by_id.insert(id.to_string(), entity);
    }
    by_id.into_values().collect()
}

/// Calendar date of a keyValues date attribute; absent or unparseable
/// values read as `None`.
fn entity_date(entity: &Value, attr: &str) -> Option<NaiveDate> {
    let raw = entity.get(attr)?.as_str()?;
    parse_datetime_utc(raw).map(|dt| dt.date_naive())
}
