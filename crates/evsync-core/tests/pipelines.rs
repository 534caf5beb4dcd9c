// End-to-end pull and push runs against mock broker and CSV endpoints

use chrono::{Days, Local};
use evsync_core::orion::OrionClient;
use evsync_core::pull::{self, FetchStrategy};
use evsync_core::{push, SyncConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(orion: &str, csv_url: Option<String>) -> SyncConfig {
    SyncConfig {
        orion_endpoint: orion.to_string(),
        fiware_service: "openevents".to_string(),
        fiware_service_path: "/city".to_string(),
        authorization: None,
        csv_url,
    }
}

#[tokio::test]
async fn server_filtered_pull_merges_overlapping_ids_last_wins() {
    let server = MockServer::start().await;
    let day = "2024-05-01";

    Mock::given(method("GET"))
        .and(path("/v2/entities"))
        .and(query_param("q", format!("start_date<={day};end_date>={day}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "Event_1", "type": "Event", "event_no": 1,
             "event_name": "stale name", "start_date": "2024-04-30T00:00:00.00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/entities"))
        .and(query_param("q", format!("start_date=={day};!end_date")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "Event_1", "type": "Event", "event_no": 1,
             "event_name": "fresh name", "start_date": "2024-05-01T00:00:00.00Z"},
            {"id": "Event_2", "type": "Event", "event_no": 2,
             "event_name": "single day", "start_date": "2024-05-01T00:00:00.00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OrionClient::new(&config(&server.uri(), None));
    let records = pull::run(&client, day.parse().unwrap(), FetchStrategy::ServerFilter)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    let event_1 = records
        .iter()
        .find(|r| r["NO"] == json!(1))
        .expect("merged record for event 1");
    // the record from the second query replaced the first one
    assert_eq!(event_1["イベント名"], json!("fresh name"));
    // display keys carry bare dates
    assert_eq!(event_1["開始日"], json!("2024-05-01"));
    assert_eq!(event_1["終了日"], Value::Null);
}

#[tokio::test]
async fn client_filtered_pull_applies_the_date_overlap_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/entities"))
        .and(query_param("options", "keyValues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "Event_1", "event_no": 1, "event_name": "in range",
             "start_date": "2024-04-30T00:00:00.00Z", "end_date": "2024-05-02T00:00:00.00Z"},
            {"id": "Event_2", "event_no": 2, "event_name": "exact single day",
             "start_date": "2024-05-01T00:00:00.00Z"},
            {"id": "Event_3", "event_no": 3, "event_name": "other day",
             "start_date": "2024-05-03T00:00:00.00Z"},
            {"id": "Event_4", "event_no": 4, "event_name": "broken start",
             "start_date": "未定"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OrionClient::new(&config(&server.uri(), None));
    let records = pull::run(
        &client,
        "2024-05-01".parse().unwrap(),
        FetchStrategy::ClientFilter,
    )
    .await
    .unwrap();

    let names: Vec<&Value> = records.iter().map(|r| &r["イベント名"]).collect();
    assert_eq!(records.len(), 2);
    assert!(names.contains(&&json!("in range")));
    assert!(names.contains(&&json!("exact single day")));
}

#[tokio::test]
async fn push_creates_a_new_entity_for_tomorrows_row() {
    let tomorrow = Local::now().date_naive() + Days::new(1);
    let day = tomorrow.format("%Y-%m-%d").to_string();

    let csv = format!(
        "NO,イベント名,開始日,終了日,定員\n\
         42,朝市,{day},,120\n\
         43,先月のイベント,2000-01-10,2000-01-12,\n"
    );
    let (body, _, _) = encoding_rs::SHIFT_JIS.encode(&csv);

    let csv_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), "text/csv"))
        .expect(1)
        .mount(&csv_server)
        .await;

    let orion = MockServer::start().await;
    // the existence probe misses, so the row is created rather than updated
    Mock::given(method("GET"))
        .and(path("/v2/entities/Event_42"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&orion)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/entities"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&orion)
        .await;

    let cfg = config(
        &orion.uri(),
        Some(format!("{}/events.csv", csv_server.uri())),
    );
    push::run(&cfg).await.unwrap();

    let requests = orion.received_requests().await.unwrap();
    let created: Value = requests
        .iter()
        .find(|r| r.url.path() == "/v2/entities")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .expect("create request");

    assert_eq!(created["id"], json!("Event_42"));
    assert_eq!(created["type"], json!("Event"));
    assert_eq!(created["event_no"], json!({"value": 42.0, "type": "Number"}));
    assert_eq!(created["start_date"]["type"], json!("DateTime"));
    assert_eq!(
        created["start_date"]["value"],
        json!(format!("{day}T00:00:00Z"))
    );
    assert_eq!(created["capacity"], json!({"value": 120.0, "type": "Number"}));
    // the empty end date column stays absent
    assert!(created.get("end_date").is_none());
    assert_eq!(created["updated_at"]["type"], json!("DateTime"));
}

#[tokio::test]
async fn push_updates_when_the_entity_already_exists() {
    let tomorrow = Local::now().date_naive() + Days::new(1);
    let day = tomorrow.format("%Y-%m-%d").to_string();

    let csv = format!("NO,イベント名,開始日\n7,盆踊り,{day}\n");
    let (body, _, _) = encoding_rs::SHIFT_JIS.encode(&csv);

    let csv_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), "text/csv"))
        .mount(&csv_server)
        .await;

    let orion = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/entities/Event_7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "Event_7"})))
        .expect(1)
        .mount(&orion)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v2/entities/Event_7/attrs"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&orion)
        .await;

    let cfg = config(
        &orion.uri(),
        Some(format!("{}/events.csv", csv_server.uri())),
    );
    push::run(&cfg).await.unwrap();

    let requests = orion.received_requests().await.unwrap();
    let patched: Value = requests
        .iter()
        .find(|r| r.url.path() == "/v2/entities/Event_7/attrs")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .expect("update request");

    // the attribute payload carries no identity members
    assert!(patched.get("id").is_none());
    assert!(patched.get("type").is_none());
    assert_eq!(
        patched["event_name"],
        json!({"value": "盆踊り", "type": "Text"})
    );
}
