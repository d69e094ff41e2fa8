//! Planner configuration and loaders.

use crate::api::{DEFAULT_API_BASE, DEFAULT_TTL};
use crate::store::DEFAULT_STORAGE_KEY;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for wiring the store and caches together.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Key the persisted build blob is stored under.
    pub storage_key: String,
    /// Directory for [`FileStorage`](crate::storage::FileStorage).
    pub data_dir: Option<PathBuf>,
    /// Deployed base path of the catalogue documents.
    pub asset_base: String,
    pub api_base_url: String,
    pub cache_ttl: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: default_data_dir(),
            asset_base: "/".to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

impl PlannerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ZZPLAN_STORAGE_KEY` - Storage key for build data (default: `zzz-disc-planner-storage`)
    /// - `ZZPLAN_DATA_DIR` - Directory for build data (default: platform-specific)
    /// - `ZZPLAN_ASSET_BASE` - Base path of catalogue documents (default: `/`)
    /// - `ZZPLAN_API_BASE` - Game-data API base URL
    /// - `ZZPLAN_CACHE_TTL_SECS` - API cache freshness window (default: 600)
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = env::var("ZZPLAN_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Ok(dir) = env::var("ZZPLAN_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(base) = env::var("ZZPLAN_ASSET_BASE") {
            config.asset_base = base;
        }
        if let Ok(url) = env::var("ZZPLAN_API_BASE") {
            config.api_base_url = url;
        }
        if let Some(secs) = read_env::<u64>("ZZPLAN_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }

        config
    }
}

/// Platform data directory, e.g. `~/.local/share/zzplan` on Linux.
fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "zzplan").map(|dirs| dirs.data_dir().to_path_buf())
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
