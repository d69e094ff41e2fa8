//! Remote detail API cache.
//!
//! Per-entity documents (weapon talents, base stat scalars) come from the
//! game-data API. Responses are cached per URL for a fixed time-to-live.
//! A stale entry is still returned immediately while one background
//! refetch replaces it (stale-while-revalidate). Failed requests never
//! evict a cached value.

use crate::clock::{Clock, SystemClock};
use crate::config::PlannerConfig;
use crate::error::FetchError;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::model::Overclock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Base URL of the public game-data API.
pub const DEFAULT_API_BASE: &str = "https://api.hakush.in/zzz/data";

/// How long a cached response counts as fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// A document the API serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiResource {
    /// Detail document for one character.
    Character(String),
    /// The character list.
    Characters,
    /// Detail document for one W-Engine.
    Weapon(String),
    /// The W-Engine list.
    Weapons,
    /// The disc set list.
    Relics,
}

impl ApiResource {
    /// Absolute URL of this resource under `base`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzplan::api::ApiResource;
    ///
    /// let url = ApiResource::Weapon("14102".into()).url("https://example.test/zzz/data");
    /// assert_eq!(url, "https://example.test/zzz/data/en/weapon/14102.json");
    /// ```
    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            ApiResource::Character(id) => format!("{}/en/character/{}.json", base, id),
            ApiResource::Characters => format!("{}/character.json", base),
            ApiResource::Weapon(id) => format!("{}/en/weapon/{}.json", base, id),
            ApiResource::Weapons => format!("{}/weapon.json", base),
            ApiResource::Relics => format!("{}/equipment.json", base),
        }
    }
}

/// Base attack scalar of a W-Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseProperty {
    pub value: f64,
}

/// Secondary stat of a W-Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RandProperty {
    pub name: String,
    pub value: f64,
}

/// One overclock tier of a W-Engine talent. `desc` carries color markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Talent {
    pub name: String,
    pub desc: String,
}

/// The parts of the W-Engine detail document the planner reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WEngineDetail {
    pub base_property: BaseProperty,
    pub rand_property: RandProperty,
    /// Keyed by overclock tier, `"1"` through `"5"`.
    #[serde(default)]
    pub talents: BTreeMap<String, Talent>,
}

impl WEngineDetail {
    /// The talent text for an overclock tier.
    pub fn talent(&self, overclock: Overclock) -> Option<&Talent> {
        self.talents.get(&overclock.get().to_string())
    }
}

struct Entry {
    data: Value,
    fetched_at: Duration,
}

/// Entries are kept until invalidated or pruned; stale entries are still
/// served while they revalidate.
#[derive(Default)]
struct Table {
    entries: HashMap<String, Entry>,
    revalidating: HashSet<String>,
}

enum Lookup {
    Fresh(Value),
    Stale(Value),
    Miss,
}

/// Time-boxed response cache keyed by request URL.
///
/// Cloning is cheap and clones share one cache table.
#[derive(Clone)]
pub struct ApiCache {
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    base_url: String,
    ttl: Duration,
    table: Arc<Mutex<Table>>,
}

impl ApiCache {
    /// Create a cache over `fetcher` using [`DEFAULT_API_BASE`] and
    /// [`DEFAULT_TTL`].
    pub fn new(fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            base_url: DEFAULT_API_BASE.to_string(),
            ttl: DEFAULT_TTL,
            table: Arc::new(Mutex::new(Table::default())),
        }
    }

    /// An HTTP-backed cache configured from `config`.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(Arc::new(HttpFetcher::new()), Arc::new(SystemClock::new()))
            .with_base_url(config.api_base_url.clone())
            .with_ttl(config.cache_ttl)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn url_for(&self, resource: &ApiResource) -> String {
        resource.url(&self.base_url)
    }

    /// Fetch a resource through the cache.
    pub async fn get(&self, resource: &ApiResource) -> Result<Value, FetchError> {
        let url = self.url_for(resource);
        self.get_url(&url).await
    }

    /// Fetch a URL through the cache.
    ///
    /// * fresh hit: the cached value
    /// * stale hit: the cached value, plus a background refetch
    /// * miss: awaits the fetcher and caches a successful response
    ///
    /// Concurrent misses on the same URL are not coalesced; the response
    /// that lands last stays cached.
    pub async fn get_url(&self, url: &str) -> Result<Value, FetchError> {
        match self.lookup(url) {
            Lookup::Fresh(data) => {
                tracing::debug!("API cache hit: {}", url);
                Ok(data)
            }
            Lookup::Stale(data) => {
                tracing::debug!("API cache stale: {}", url);
                self.spawn_revalidation(url);
                Ok(data)
            }
            Lookup::Miss => {
                tracing::debug!("API cache miss: {}", url);
                let data = self.fetcher.fetch_json(url).await.map_err(|e| {
                    tracing::error!("Failed to fetch API data: {}", e);
                    e
                })?;
                self.insert(url, data.clone());
                Ok(data)
            }
        }
    }

    /// Fetch and decode the W-Engine detail document.
    pub async fn weapon(&self, id: &str) -> Result<WEngineDetail, FetchError> {
        let resource = ApiResource::Weapon(id.to_string());
        let data = self.get(&resource).await?;
        serde_json::from_value(data).map_err(|source| FetchError::Parse {
            url: self.url_for(&resource),
            source,
        })
    }

    /// The cached value for `url`, fresh or stale, without fetching.
    pub fn cached(&self, url: &str) -> Option<Value> {
        self.table().entries.get(url).map(|e| e.data.clone())
    }

    /// Whether a background refetch of `url` is in flight.
    pub fn is_revalidating(&self, url: &str) -> bool {
        self.table().revalidating.contains(url)
    }

    /// Drop the cached value for `url`.
    pub fn invalidate(&self, url: &str) {
        self.table().entries.remove(url);
    }

    /// Drop entries fetched more than `max_age` ago, except those being
    /// revalidated. Returns how many were removed.
    pub fn prune(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let mut table = self.table();
        let Table {
            entries,
            revalidating,
        } = &mut *table;
        let before = entries.len();
        entries.retain(|url, entry| {
            revalidating.contains(url) || now.saturating_sub(entry.fetched_at) <= max_age
        });
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Pruned {} API cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.table().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, url: &str) -> Lookup {
        let now = self.clock.now();
        match self.table().entries.get(url) {
            Some(entry) if now.saturating_sub(entry.fetched_at) < self.ttl => {
                Lookup::Fresh(entry.data.clone())
            }
            Some(entry) => Lookup::Stale(entry.data.clone()),
            None => Lookup::Miss,
        }
    }

    fn insert(&self, url: &str, data: Value) {
        let fetched_at = self.clock.now();
        self.table()
            .entries
            .insert(url.to_string(), Entry { data, fetched_at });
    }

    /// Start one background refetch of `url` unless one is already running.
    fn spawn_revalidation(&self, url: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; serving stale {} without revalidation", url);
            return;
        };
        if !self.table().revalidating.insert(url.to_string()) {
            return;
        }

        let cache = self.clone();
        let url = url.to_string();
        runtime.spawn(async move {
            match cache.fetcher.fetch_json(&url).await {
                Ok(data) => {
                    tracing::debug!("Revalidated {}", url);
                    cache.insert(&url, data);
                }
                Err(e) => tracing::warn!("Revalidation of {} failed, keeping cached value: {}", url, e),
            }
            cache.table().revalidating.remove(&url);
        });
    }
}
