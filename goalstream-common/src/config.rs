//! Configuration resolution for goalstream services
//!
//! Provides two-tier configuration resolution with ENV → TOML priority:
//! defaults are applied first, then an optional TOML file, then
//! `GOALSTREAM_*` environment variables override individual fields.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Base URL of the sports event-source API
    pub event_source_base_url: String,
    /// Base URL of the JSON blob store (checkpoint + archives)
    pub blob_store_base_url: String,
    /// Base URL of the feed store (collections + activity feeds)
    pub feed_base_url: String,
    /// Feed store API key (sent as a header on every request)
    pub feed_api_key: Option<String>,
    /// Collection name for upserted goal records
    pub collection: String,
    /// Feed group for activity appends
    pub feed_group: String,
    /// Feed id receiving every event in addition to the team feeds
    pub central_feed_id: String,
    /// Blob key holding the ingestion checkpoint
    pub checkpoint_key: String,
    /// Per-request timeout for all outbound HTTP calls
    pub http_timeout: Duration,
    /// Fixed delay between processed dates (upstream rate limit)
    pub inter_date_delay: Duration,
    /// Fixed delay between games within a date
    pub per_game_delay: Duration,
    /// Fixed delay between publish calls (downstream rate limit)
    pub publish_delay: Duration,
    /// Recent-window size for startup / on-demand checks
    pub startup_days_back: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            event_source_base_url: "https://api-web.nhle.com/v1".to_string(),
            blob_store_base_url: "https://s3.foreverflow.click/api/hockeyGoals".to_string(),
            feed_base_url: "https://api.stream-io-api.com/api/v1.0".to_string(),
            feed_api_key: None,
            collection: "goals".to_string(),
            feed_group: "goals".to_string(),
            central_feed_id: "nhl".to_string(),
            checkpoint_key: "ingest_progress.json".to_string(),
            http_timeout: Duration::from_secs(30),
            inter_date_delay: Duration::from_millis(1000),
            per_game_delay: Duration::from_millis(100),
            publish_delay: Duration::from_millis(500),
            startup_days_back: 3,
        }
    }
}

/// TOML file representation (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    pub event_source_base_url: Option<String>,
    pub blob_store_base_url: Option<String>,
    pub feed_base_url: Option<String>,
    pub feed_api_key: Option<String>,
    pub collection: Option<String>,
    pub feed_group: Option<String>,
    pub central_feed_id: Option<String>,
    pub checkpoint_key: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub inter_date_delay_ms: Option<u64>,
    pub per_game_delay_ms: Option<u64>,
    pub publish_delay_ms: Option<u64>,
    pub startup_days_back: Option<u32>,
}

impl IngestConfig {
    /// Resolve configuration from an optional TOML file plus environment.
    ///
    /// Priority per field: `GOALSTREAM_*` env var → TOML → built-in default.
    /// A field set in both sources logs a warning and uses the env value.
    pub fn load(toml_path: Option<&Path>) -> Result<Self> {
        let file_config = match toml_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?
            }
            _ => TomlConfig::default(),
        };

        let mut config = Self::default();

        apply_string(
            &mut config.event_source_base_url,
            "GOALSTREAM_EVENT_SOURCE_URL",
            file_config.event_source_base_url,
        );
        apply_string(
            &mut config.blob_store_base_url,
            "GOALSTREAM_BLOB_STORE_URL",
            file_config.blob_store_base_url,
        );
        apply_string(
            &mut config.feed_base_url,
            "GOALSTREAM_FEED_URL",
            file_config.feed_base_url,
        );
        apply_string(&mut config.collection, "GOALSTREAM_COLLECTION", file_config.collection);
        apply_string(&mut config.feed_group, "GOALSTREAM_FEED_GROUP", file_config.feed_group);
        apply_string(
            &mut config.central_feed_id,
            "GOALSTREAM_CENTRAL_FEED_ID",
            file_config.central_feed_id,
        );
        apply_string(
            &mut config.checkpoint_key,
            "GOALSTREAM_CHECKPOINT_KEY",
            file_config.checkpoint_key,
        );

        config.feed_api_key = std::env::var("GOALSTREAM_FEED_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or(file_config.feed_api_key);

        config.http_timeout = duration_field(
            "GOALSTREAM_HTTP_TIMEOUT_SECS",
            file_config.http_timeout_secs,
            config.http_timeout,
            Duration::from_secs,
        )?;
        config.inter_date_delay = duration_field(
            "GOALSTREAM_INTER_DATE_DELAY_MS",
            file_config.inter_date_delay_ms,
            config.inter_date_delay,
            Duration::from_millis,
        )?;
        config.per_game_delay = duration_field(
            "GOALSTREAM_PER_GAME_DELAY_MS",
            file_config.per_game_delay_ms,
            config.per_game_delay,
            Duration::from_millis,
        )?;
        config.publish_delay = duration_field(
            "GOALSTREAM_PUBLISH_DELAY_MS",
            file_config.publish_delay_ms,
            config.publish_delay,
            Duration::from_millis,
        )?;

        if let Ok(raw) = std::env::var("GOALSTREAM_STARTUP_DAYS_BACK") {
            config.startup_days_back = raw
                .parse()
                .map_err(|e| Error::Config(format!("GOALSTREAM_STARTUP_DAYS_BACK: {}", e)))?;
        } else if let Some(days) = file_config.startup_days_back {
            config.startup_days_back = days;
        }

        Ok(config)
    }
}

/// Apply ENV → TOML resolution for one string field
fn apply_string(target: &mut String, env_var: &str, toml_value: Option<String>) {
    let env_value = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty());

    match (env_value, toml_value) {
        (Some(env), Some(_)) => {
            warn!("{} set in both environment and TOML; using environment", env_var);
            *target = env;
        }
        (Some(env), None) => *target = env,
        (None, Some(toml)) => *target = toml,
        (None, None) => {}
    }
}

/// Apply ENV → TOML resolution for one duration field
fn duration_field(
    env_var: &str,
    toml_value: Option<u64>,
    default: Duration,
    make: fn(u64) -> Duration,
) -> Result<Duration> {
    if let Ok(raw) = std::env::var(env_var) {
        let value: u64 = raw
            .parse()
            .map_err(|e| Error::Config(format!("{}: {}", env_var, e)))?;
        return Ok(make(value));
    }
    Ok(toml_value.map(make).unwrap_or(default))
}
