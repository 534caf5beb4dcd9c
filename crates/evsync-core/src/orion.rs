// HTTP client for the Orion context broker (NGSI v2)
//
// Design Decision: One reqwest::Client per OrionClient; configuration is
// injected at construction, never read from globals.
// Design Decision: Read failures are fatal (the run must not continue on
// partial data); write failures are logged and reported as a bare status
// code so the caller can move on to the next record.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};

/// Builder for the NGSI v2 simple query grammar: semicolon-joined
/// predicates such as `start_date<=2024-05-01;!end_date`.
#[derive(Debug, Default)]
pub struct QueryFilter {
    predicates: Vec<String>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field<=value`
    pub fn le(mut self, field: &str, value: impl std::fmt::Display) -> Self {
        self.predicates.push(format!("{field}<={value}"));
        self
    }

    /// `field>=value`
    pub fn ge(mut self, field: &str, value: impl std::fmt::Display) -> Self {
        self.predicates.push(format!("{field}>={value}"));
        self
    }

    /// `field==value`
    pub fn eq(mut self, field: &str, value: impl std::fmt::Display) -> Self {
        self.predicates.push(format!("{field}=={value}"));
        self
    }

    /// `!field`: the attribute is absent from the entity
    pub fn absent(mut self, field: &str) -> Self {
        self.predicates.push(format!("!{field}"));
        self
    }

    pub fn build(&self) -> String {
        self.predicates.join(";")
    }
}

/// Client for the broker's entity API.
pub struct OrionClient {
    http: reqwest::Client,
    base_url: String,
    fiware_service: String,
    fiware_service_path: String,
    authorization: Option<String>,
}

impl OrionClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.orion_endpoint.trim_end_matches('/').to_string(),
            fiware_service: config.fiware_service.clone(),
            fiware_service_path: config.fiware_service_path.clone(),
            authorization: config.authorization.clone(),
        }
    }

    /// Query entities in keyValues mode, optionally with a server-side
    /// filter expression. A non-2xx response is fatal.
    pub async fn query(
        &self,
        entity_type: &str,
        filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let url = format!("{}/v2/entities", self.base_url);
        let limit = limit.to_string();
        let mut params = vec![
            ("type", entity_type),
            ("options", "keyValues"),
            ("limit", limit.as_str()),
        ];
        if let Some(q) = filter {
            params.push(("q", q));
        }

        let response = self
            .with_headers(self.http.get(&url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Query {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// True iff a direct entity-by-id GET returns 200. Every other
    /// outcome, transport errors included, reads as "does not exist";
    /// the subsequent create surfaces any real problem.
    pub async fn entity_exists(&self, entity_id: &str) -> bool {
        let url = format!("{}/v2/entities/{}", self.base_url, entity_id);
        match self.with_headers(self.http.get(&url)).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// POST a full entity (id + type + attributes). Non-fatal: returns
    /// the response status, or the 0 sentinel on a transport or
    /// serialization failure.
    pub async fn create_entity(&self, payload: &Value) -> u16 {
        self.send_write(Method::POST, "/v2/entities".to_string(), payload)
            .await
    }

    /// PATCH a partial attribute map (no id/type members). Same
    /// non-fatal contract as [`create_entity`](Self::create_entity).
    pub async fn update_attrs(&self, entity_id: &str, payload: &Value) -> u16 {
        self.send_write(
            Method::PATCH,
            format!("/v2/entities/{entity_id}/attrs"),
            payload,
        )
        .await
    }

    async fn send_write(&self, method: Method, path: String, payload: &Value) -> u16 {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(%err, "JSON serialization error");
                return 0;
            }
        };

        let url = format!("{}{}", self.base_url, path);
        let request = self
            .with_headers(self.http.request(method, &url))
            .header("Content-Type", "application/json")
            .body(body);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.as_u16() >= 400 {
                    let text = response.text().await.unwrap_or_default();
                    tracing::error!(
                        status = status.as_u16(),
                        response = %text,
                        "failed to send data to the broker"
                    );
                } else {
                    tracing::info!(status = status.as_u16(), "data sent to the broker");
                }
                status.as_u16()
            }
            Err(err) => {
                tracing::error!(%err, "request error");
                0
            }
        }
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Fiware-Service", &self.fiware_service)
            .header("Fiware-ServicePath", &self.fiware_service_path);
        match &self.authorization {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        }
    }
}
