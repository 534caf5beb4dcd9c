// Sync configuration
//
// Read once from the environment at startup and passed by value into the
// client and pipelines. There is no process-wide configuration state.

use crate::error::{Result, SyncError};

/// Connection settings for the broker and the CSV source.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the Orion context broker, e.g. `http://localhost:1026`
    pub orion_endpoint: String,

    /// Value for the `Fiware-Service` header
    pub fiware_service: String,

    /// Value for the `Fiware-ServicePath` header
    pub fiware_service_path: String,

    /// Bearer credential for the `Authorization` header, if the broker
    /// sits behind an auth proxy
    pub authorization: Option<String>,

    /// URL of the remote event CSV (required by the push path only)
    pub csv_url: Option<String>,
}

impl SyncConfig {
    /// Load configuration from the environment, reading a `.env` file
    /// first when one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            orion_endpoint: require("FIWARE_ORION_ENDPOINT")?,
            fiware_service: require("FIWARE_SERVICE")?,
            fiware_service_path: require("FIWARE_SERVICE_PATH")?,
            authorization: std::env::var("FIWARE_AUTHORIZATION").ok(),
            csv_url: std::env::var("CSV_URL").ok(),
        })
    }

    /// CSV source URL, or a configuration error when it is not set.
    pub fn csv_url(&self) -> Result<&str> {
        self.csv_url
            .as_deref()
            .ok_or_else(|| SyncError::config("CSV_URL is not set"))
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SyncError::Config(format!("{name} is not set")))
}
