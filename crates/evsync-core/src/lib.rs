// Event sync pipeline
//
// Synchronizes municipal event records between a CP932-encoded CSV feed,
// a FIWARE Orion context broker (NGSI v2, entity type "Event"), and
// display-keyed JSON exports.
//
// Key design decisions:
// - Configuration is an explicit SyncConfig value injected everywhere;
//   nothing reads the environment after startup
// - Per-record problems degrade to absent values or skipped rows; only
//   configuration, read-query, and CSV-source failures abort a run
// - One broker request is in flight at a time; writes are strictly
//   sequential with no retry, batching, or pagination
// - The fixed attribute table in `mapping` drives both the pull-side
//   display projection and the push-side payload construction

pub mod coerce;
pub mod config;
pub mod csv_source;
pub mod datefilter;
pub mod error;
pub mod mapping;
pub mod orion;
pub mod pull;
pub mod push;
pub mod sanitize;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
