//! Game data catalogue.
//!
//! Two read-only reference documents, the agent catalogue
//! (`agents-data.json`) and the W-Engine catalogue (`wengine-data.json`),
//! are loaded once per [`GameDataCache`] and served from memory afterwards.
//! A failed load degrades to an empty catalogue instead of an error.

use crate::fetch::Fetcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the agent catalogue.
pub const AGENTS_FILE: &str = "agents-data.json";

/// File name of the W-Engine catalogue.
pub const WENGINES_FILE: &str = "wengine-data.json";

/// A catalogue agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentData {
    pub id: String,
    pub name: String,
    pub rank: u32,
    #[serde(rename = "type")]
    pub kind: u32,
    pub element: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub body_url: String,
}

impl AgentData {
    /// An S-rank entry with only an id and a name, for fixtures and tests.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank: 4,
            kind: 1,
            element: 200,
            icon: String::new(),
            icon_url: String::new(),
            body_url: String::new(),
        }
    }

    pub fn rank_label(&self) -> String {
        rank_label(self.rank)
    }

    pub fn type_label(&self) -> String {
        type_label(self.kind)
    }

    pub fn element_label(&self) -> String {
        element_label(self.element)
    }
}

/// A catalogue W-Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WEngineData {
    pub id: String,
    pub name: String,
    pub rank: u32,
    #[serde(rename = "type")]
    pub kind: u32,
    #[serde(default)]
    pub icon_url: String,
}

impl WEngineData {
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank: 4,
            kind: 1,
            icon_url: String::new(),
        }
    }
}

/// Rank letter for a catalogue rank code.
///
/// # Examples
///
/// ```rust
/// use zzplan::catalogue::rank_label;
///
/// assert_eq!(rank_label(4), "S");
/// assert_eq!(rank_label(9), "Rank 9");
/// ```
pub fn rank_label(rank: u32) -> String {
    match rank {
        2 => "B".to_string(),
        3 => "A".to_string(),
        4 => "S".to_string(),
        other => format!("Rank {}", other),
    }
}

/// Specialty name for a catalogue type code.
pub fn type_label(kind: u32) -> String {
    match kind {
        1 => "Attack".to_string(),
        2 => "Stun".to_string(),
        3 => "Anomaly".to_string(),
        4 => "Support".to_string(),
        5 => "Defense".to_string(),
        6 => "Rupture".to_string(),
        other => format!("Type {}", other),
    }
}

/// Attribute name for a catalogue element code.
pub fn element_label(element: u32) -> String {
    match element {
        200 => "Physical".to_string(),
        201 => "Fire".to_string(),
        202 => "Ice".to_string(),
        203 => "Electric".to_string(),
        205 => "Ether".to_string(),
        other => format!("Element {}", other),
    }
}

/// The two reference datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Agents,
    WEngines,
}

impl Dataset {
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Agents => AGENTS_FILE,
            Dataset::WEngines => WENGINES_FILE,
        }
    }
}

/// Loaded catalogue contents, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameData {
    pub agents: BTreeMap<String, AgentData>,
    pub w_engines: BTreeMap<String, WEngineData>,
}

impl GameData {
    pub fn agent(&self, id: &str) -> Option<&AgentData> {
        self.agents.get(id)
    }

    pub fn all_agents(&self) -> Vec<&AgentData> {
        self.agents.values().collect()
    }

    pub fn w_engine(&self, id: &str) -> Option<&WEngineData> {
        self.w_engines.get(id)
    }

    pub fn all_w_engines(&self) -> Vec<&WEngineData> {
        self.w_engines.values().collect()
    }

    pub fn insert_agent(&mut self, agent: AgentData) {
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn insert_w_engine(&mut self, w_engine: WEngineData) {
        self.w_engines.insert(w_engine.id.clone(), w_engine);
    }
}

/// Loads the catalogue documents once and serves them from memory.
///
/// Each document is looked up at `<asset_base><file>` first and at
/// `/<file>` as a fallback.
pub struct GameDataCache<F: Fetcher> {
    fetcher: F,
    asset_base: String,
    data: GameData,
    agents_loaded: bool,
    w_engines_loaded: bool,
}

impl<F: Fetcher> GameDataCache<F> {
    /// Create an empty cache. `asset_base` is normalized to end with `/`.
    pub fn new(fetcher: F, asset_base: impl Into<String>) -> Self {
        let mut asset_base = asset_base.into();
        if !asset_base.ends_with('/') {
            asset_base.push('/');
        }
        Self {
            fetcher,
            asset_base,
            data: GameData::default(),
            agents_loaded: false,
            w_engines_loaded: false,
        }
    }

    /// Load `dataset` unless it has already been loaded.
    ///
    /// Failures are logged and leave the dataset empty; they are not
    /// retried on later calls.
    pub async fn ensure_loaded(&mut self, dataset: Dataset) {
        if self.is_loaded(dataset) {
            return;
        }
        match dataset {
            Dataset::Agents => {
                self.data.agents = self.load_map(dataset).await;
                self.agents_loaded = true;
            }
            Dataset::WEngines => {
                self.data.w_engines = self.load_map(dataset).await;
                self.w_engines_loaded = true;
            }
        }
    }

    /// Load both datasets.
    pub async fn ensure_all_loaded(&mut self) {
        self.ensure_loaded(Dataset::Agents).await;
        self.ensure_loaded(Dataset::WEngines).await;
    }

    pub fn is_loaded(&self, dataset: Dataset) -> bool {
        match dataset {
            Dataset::Agents => self.agents_loaded,
            Dataset::WEngines => self.w_engines_loaded,
        }
    }

    /// Everything loaded so far.
    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn agent(&self, id: &str) -> Option<&AgentData> {
        self.data.agent(id)
    }

    pub fn all_agents(&self) -> Vec<&AgentData> {
        self.data.all_agents()
    }

    pub fn w_engine(&self, id: &str) -> Option<&WEngineData> {
        self.data.w_engine(id)
    }

    pub fn all_w_engines(&self) -> Vec<&WEngineData> {
        self.data.all_w_engines()
    }

    async fn load_map<T>(&self, dataset: Dataset) -> BTreeMap<String, T>
    where
        T: serde::de::DeserializeOwned,
    {
        let file = dataset.file_name();
        let primary = format!("{}{}", self.asset_base, file);
        let fallback = format!("/{}", file);

        let mut candidates = vec![primary];
        if candidates[0] != fallback {
            candidates.push(fallback);
        }

        for url in &candidates {
            let document = match self.fetcher.fetch_json(url).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::debug!("Catalogue {} not available at {}: {}", file, url, e);
                    continue;
                }
            };
            return match serde_json::from_value::<BTreeMap<String, T>>(document) {
                Ok(map) => {
                    tracing::debug!("Loaded {} entries from {}", map.len(), url);
                    map
                }
                Err(e) => {
                    tracing::error!("Failed to parse {} from {}: {}", file, url, e);
                    BTreeMap::new()
                }
            };
        }

        tracing::warn!(
            "Catalogue {} not found; continuing with an empty catalogue",
            file
        );
        BTreeMap::new()
    }
}
