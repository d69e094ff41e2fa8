//! Build store module.
//!
//! Provides the `BuildStore` type, the single owner of the user's build
//! data. Every change goes through a mutator; each successful mutator
//! flushes the persisted blob once.

use crate::catalogue::GameData;
use crate::error::{ImportError, StoreError};
use crate::model::{
    Agent, AppState, Area, AreaUpdate, Buff, BuffSource, BuffUpdate, Disc, FontPreset, Loadout,
    WEngineRef, DISC_SLOTS, MAX_LOADOUTS,
};
use crate::snapshot::{self, ImportReport};
use crate::stat::{StatName, StatValue};
use crate::storage::Storage;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "zzz-disc-planner-storage";

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The authoritative, persisted build state.
///
/// # Examples
///
/// ```rust
/// use zzplan::catalogue::{AgentData, GameData};
/// use zzplan::storage::MemoryStorage;
/// use zzplan::BuildStore;
///
/// let mut catalogue = GameData::default();
/// catalogue.insert_agent(AgentData::named("1011", "Anby"));
///
/// let mut store = BuildStore::new(MemoryStorage::new());
/// let agent_id = store.add_agent("1011", &catalogue).unwrap();
///
/// let agent = store.agent(&agent_id).unwrap();
/// assert_eq!(agent.loadouts.len(), 1);
/// assert_eq!(agent.current_loadout_id.as_deref(), Some("default"));
/// ```
pub struct BuildStore<S: Storage> {
    state: AppState,
    storage: S,
    key: String,
}

impl<S: Storage> BuildStore<S> {
    /// Create an empty store that persists under [`DEFAULT_STORAGE_KEY`].
    ///
    /// Nothing is read from `storage`; use [`BuildStore::open`] to restore.
    pub fn new(storage: S) -> Self {
        Self {
            state: AppState::default(),
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Restore the store from `storage` under `key`.
    ///
    /// A missing blob yields the default state. An unreadable or invalid
    /// blob is logged and also yields the default state; an invalid blob is
    /// first copied to `<key>.rejected` so the next save cannot destroy it.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match storage.load(&key) {
            Ok(Some(blob)) => match restore(&blob) {
                Ok(state) => {
                    tracing::debug!(
                        "Restored {} agents and {} areas from '{}'",
                        state.agents.len(),
                        state.areas.len(),
                        key
                    );
                    state
                }
                Err(e) => {
                    let rejected_key = format!("{}.rejected", key);
                    tracing::warn!(
                        "Persisted state under '{}' is invalid, moved to '{}': {}",
                        key,
                        rejected_key,
                        e
                    );
                    if let Err(e) = storage.save(&rejected_key, &blob) {
                        tracing::error!("Could not keep rejected state '{}': {}", rejected_key, e);
                    }
                    AppState::default()
                }
            },
            Ok(None) => AppState::default(),
            Err(e) => {
                tracing::warn!("Could not read persisted state '{}': {}", key, e);
                AppState::default()
            }
        };
        Self {
            state,
            storage,
            key,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A deep copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.state.agent(agent_id)
    }

    /// The agent `selected_agent_id` points at, if it exists.
    pub fn selected_agent(&self) -> Option<&Agent> {
        self.state
            .selected_agent_id
            .as_deref()
            .and_then(|id| self.state.agent(id))
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    /// Start tracking the catalogue agent `data_id`.
    ///
    /// The new agent's id is `data_id`. It gets one loadout, id
    /// `"default"`, which is also its current loadout.
    ///
    /// # Errors
    ///
    /// * [`StoreError::UnknownCatalogueId`] if the catalogue has no such agent
    /// * [`StoreError::AgentExists`] if the agent is already tracked
    pub fn add_agent(&mut self, data_id: &str, catalogue: &GameData) -> Result<String, StoreError> {
        if catalogue.agent(data_id).is_none() {
            return Err(StoreError::UnknownCatalogueId(data_id.to_string()));
        }
        if self.state.agent(data_id).is_some() {
            return Err(StoreError::AgentExists(data_id.to_string()));
        }

        self.state.agents.push(Agent::new(data_id));
        tracing::debug!("Added agent {}", data_id);
        self.persist();
        Ok(data_id.to_string())
    }

    /// Stop tracking an agent, clearing the selection if it pointed at it.
    pub fn delete_agent(&mut self, agent_id: &str) -> Result<(), StoreError> {
        let before = self.state.agents.len();
        self.state.agents.retain(|a| a.id != agent_id);
        if self.state.agents.len() == before {
            return Err(StoreError::AgentNotFound(agent_id.to_string()));
        }
        if self.state.selected_agent_id.as_deref() == Some(agent_id) {
            self.state.selected_agent_id = None;
        }
        tracing::debug!("Deleted agent {}", agent_id);
        self.persist();
        Ok(())
    }

    /// Move UI focus. The id is not checked against the tracked agents.
    pub fn select_agent(&mut self, agent_id: Option<&str>) {
        self.state.selected_agent_id = agent_id.map(str::to_string);
        self.persist();
    }

    pub fn set_agent_tracking(&mut self, agent_id: &str, tracking: bool) -> Result<(), StoreError> {
        self.agent_mut(agent_id)?.tracking = tracking;
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Loadouts
    // ------------------------------------------------------------------

    /// Equip or unequip the W-Engine of a loadout.
    pub fn update_w_engine(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        w_engine: Option<WEngineRef>,
    ) -> Result<(), StoreError> {
        self.loadout_mut(agent_id, loadout_id)?.w_engine = w_engine;
        self.persist();
        Ok(())
    }

    /// Deep-copy a loadout under a fresh id and the name `"Loadout {n}"`,
    /// where `n` is the smallest number not below the loadout count after
    /// the copy that no other loadout's name uses.
    ///
    /// # Errors
    ///
    /// * [`StoreError::AgentNotFound`] / [`StoreError::LoadoutNotFound`]
    /// * [`StoreError::LoadoutLimit`] if the agent already has
    ///   [`MAX_LOADOUTS`] loadouts
    pub fn duplicate_loadout(&mut self, agent_id: &str, loadout_id: &str) -> Result<String, StoreError> {
        let agent = self.agent_mut(agent_id)?;
        let source = agent
            .loadout(loadout_id)
            .ok_or_else(|| loadout_not_found(agent_id, loadout_id))?;
        if agent.loadouts.len() >= MAX_LOADOUTS {
            return Err(StoreError::LoadoutLimit {
                agent_id: agent_id.to_string(),
                max: MAX_LOADOUTS,
            });
        }

        let mut copy: Loadout = source.clone();
        copy.id = new_id();
        copy.loadout_name = next_loadout_name(&agent.loadouts);
        let new_id = copy.id.clone();
        agent.loadouts.push(copy);

        tracing::debug!("Duplicated loadout {} of {} as {}", loadout_id, agent_id, new_id);
        self.persist();
        Ok(new_id)
    }

    /// Remove a loadout.
    ///
    /// If it was current, the first remaining loadout becomes current, or
    /// `None` when the agent has no loadouts left.
    pub fn delete_loadout(&mut self, agent_id: &str, loadout_id: &str) -> Result<(), StoreError> {
        let agent = self.agent_mut(agent_id)?;
        let position = agent
            .loadouts
            .iter()
            .position(|l| l.id == loadout_id)
            .ok_or_else(|| loadout_not_found(agent_id, loadout_id))?;
        agent.loadouts.remove(position);

        if agent.current_loadout_id.as_deref() == Some(loadout_id) {
            agent.current_loadout_id = agent.loadouts.first().map(|l| l.id.clone());
        }
        self.persist();
        Ok(())
    }

    /// Point the agent at another of its loadouts.
    pub fn set_current_loadout(&mut self, agent_id: &str, loadout_id: &str) -> Result<(), StoreError> {
        let agent = self.agent_mut(agent_id)?;
        if agent.loadout(loadout_id).is_none() {
            return Err(loadout_not_found(agent_id, loadout_id));
        }
        agent.current_loadout_id = Some(loadout_id.to_string());
        self.persist();
        Ok(())
    }

    pub fn rename_loadout(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.loadout_mut(agent_id, loadout_id)?.loadout_name = name.into();
        self.persist();
        Ok(())
    }

    pub fn set_loadout_tracking(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        tracking: bool,
    ) -> Result<(), StoreError> {
        self.loadout_mut(agent_id, loadout_id)?.tracking = tracking;
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Discs
    // ------------------------------------------------------------------

    /// Put a disc into a 1-indexed slot, or clear the slot with `None`.
    ///
    /// The stored disc's `slot` field is set to `slot`.
    ///
    /// # Errors
    ///
    /// * [`StoreError::InvalidSlot`] for slots outside 1..=6
    /// * [`StoreError::InvalidUpgradeChance`] unless the chance is in `[0, 1]`
    /// * [`StoreError::NonFinite`] for NaN or infinite stat values
    pub fn set_disc(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        slot: u8,
        disc: Option<Disc>,
    ) -> Result<(), StoreError> {
        let index = match usize::from(slot) {
            n @ 1..=DISC_SLOTS => n - 1,
            _ => return Err(StoreError::InvalidSlot(slot)),
        };
        if let Some(disc) = &disc {
            check_disc(disc)?;
        }
        let loadout = self.loadout_mut(agent_id, loadout_id)?;
        loadout.discs[index] = disc.map(|mut d| {
            d.slot = slot;
            d
        });
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Buffs
    // ------------------------------------------------------------------

    /// Flip a buff id in or out of the loadout's active set.
    ///
    /// Returns whether the buff is active afterwards. Any id may be
    /// toggled, including ids of w-engine buffs that live outside the store.
    pub fn toggle_buff(&mut self, agent_id: &str, loadout_id: &str, buff_id: &str) -> Result<bool, StoreError> {
        let loadout = self.loadout_mut(agent_id, loadout_id)?;
        let active = if loadout.is_buff_active(buff_id) {
            loadout.active_buff_ids.retain(|id| id != buff_id);
            false
        } else {
            loadout.active_buff_ids.push(buff_id.to_string());
            true
        };
        self.persist();
        Ok(active)
    }

    /// Add an inactive custom buff to a loadout and return its id.
    pub fn add_custom_buff(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        label: impl Into<String>,
        stats: Vec<StatValue>,
    ) -> Result<String, StoreError> {
        check_stats("stats", &stats)?;
        let buff = Buff {
            id: new_id(),
            label: label.into(),
            source: BuffSource::Custom,
            stats,
            active: false,
        };
        let buff_id = buff.id.clone();
        self.loadout_mut(agent_id, loadout_id)?.custom_buffs.push(buff);
        self.persist();
        Ok(buff_id)
    }

    pub fn update_custom_buff(
        &mut self,
        agent_id: &str,
        loadout_id: &str,
        buff_id: &str,
        update: BuffUpdate,
    ) -> Result<(), StoreError> {
        if let Some(stats) = &update.stats {
            check_stats("stats", stats)?;
        }
        let loadout = self.loadout_mut(agent_id, loadout_id)?;
        let buff = loadout
            .custom_buffs
            .iter_mut()
            .find(|b| b.id == buff_id)
            .ok_or_else(|| StoreError::BuffNotFound {
                loadout_id: loadout_id.to_string(),
                buff_id: buff_id.to_string(),
            })?;
        if let Some(label) = update.label {
            buff.label = label;
        }
        if let Some(stats) = update.stats {
            buff.stats = stats;
        }
        self.persist();
        Ok(())
    }

    /// Remove a custom buff and drop its id from the active set.
    pub fn delete_custom_buff(&mut self, agent_id: &str, loadout_id: &str, buff_id: &str) -> Result<(), StoreError> {
        let loadout = self.loadout_mut(agent_id, loadout_id)?;
        let before = loadout.custom_buffs.len();
        loadout.custom_buffs.retain(|b| b.id != buff_id);
        if loadout.custom_buffs.len() == before {
            return Err(StoreError::BuffNotFound {
                loadout_id: loadout_id.to_string(),
                buff_id: buff_id.to_string(),
            });
        }
        loadout.active_buff_ids.retain(|id| id != buff_id);
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settings, weights and areas
    // ------------------------------------------------------------------

    pub fn set_font_preset(&mut self, preset: FontPreset) {
        self.state.font_preset = preset;
        self.persist();
    }

    /// Insert or replace the global weight of `stat`.
    pub fn set_stat_weight(&mut self, stat: StatName, weight: f64) -> Result<(), StoreError> {
        check_finite(format!("statWeights.{}", stat), weight)?;
        self.state.stat_weights.insert(stat, weight);
        self.persist();
        Ok(())
    }

    /// Record a farming area and return its id.
    pub fn add_area(
        &mut self,
        name: impl Into<String>,
        disc_set1: impl Into<String>,
        disc_set2: impl Into<String>,
    ) -> String {
        let area = Area {
            id: new_id(),
            name: name.into(),
            disc_set1: disc_set1.into(),
            disc_set2: disc_set2.into(),
        };
        let area_id = area.id.clone();
        self.state.areas.push(area);
        self.persist();
        area_id
    }

    pub fn update_area(&mut self, area_id: &str, update: AreaUpdate) -> Result<(), StoreError> {
        let area = self
            .state
            .areas
            .iter_mut()
            .find(|a| a.id == area_id)
            .ok_or_else(|| StoreError::AreaNotFound(area_id.to_string()))?;
        if let Some(name) = update.name {
            area.name = name;
        }
        if let Some(set) = update.disc_set1 {
            area.disc_set1 = set;
        }
        if let Some(set) = update.disc_set2 {
            area.disc_set2 = set;
        }
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Serialize the whole state as JSON text.
    pub fn export_state(&self) -> Result<String, StoreError> {
        snapshot::export_json(&self.state).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Validate `text` and replace every top-level field it carries.
    ///
    /// Nothing changes unless the whole document is accepted.
    pub fn import_state(&mut self, text: &str) -> Result<ImportReport, ImportError> {
        let (patch, report) = snapshot::parse_import(text).map_err(|e| {
            tracing::warn!("Rejected import: {}", e);
            e
        })?;
        patch.apply(&mut self.state);
        if !report.ignored.is_empty() {
            tracing::debug!("Import ignored keys: {:?}", report.ignored);
        }
        self.persist();
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn agent_mut(&mut self, agent_id: &str) -> Result<&mut Agent, StoreError> {
        self.state
            .agent_mut(agent_id)
            .ok_or_else(|| StoreError::AgentNotFound(agent_id.to_string()))
    }

    fn loadout_mut(&mut self, agent_id: &str, loadout_id: &str) -> Result<&mut Loadout, StoreError> {
        self.agent_mut(agent_id)?
            .loadout_mut(loadout_id)
            .ok_or_else(|| loadout_not_found(agent_id, loadout_id))
    }

    /// Best-effort write of the persisted blob.
    fn persist(&self) {
        let blob = match serde_json::to_string(&self.state) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("Could not serialize state for '{}': {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.key, &blob) {
            tracing::warn!("Could not persist state under '{}': {}", self.key, e);
        }
    }
}

fn next_loadout_name(loadouts: &[Loadout]) -> String {
    (loadouts.len() + 1..)
        .map(|n| format!("Loadout {}", n))
        .find(|name| loadouts.iter().all(|l| &l.loadout_name != name))
        .unwrap_or_default()
}

fn check_finite(field: impl Into<String>, value: f64) -> Result<(), StoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StoreError::NonFinite {
            field: field.into(),
            value,
        })
    }
}

fn check_stats(field: &str, stats: &[StatValue]) -> Result<(), StoreError> {
    for (i, stat) in stats.iter().enumerate() {
        check_finite(format!("{}[{}]", field, i), stat.value)?;
    }
    Ok(())
}

/// Reject discs that import validation would refuse.
fn check_disc(disc: &Disc) -> Result<(), StoreError> {
    if !(0.0..=1.0).contains(&disc.upgrade_chance) {
        return Err(StoreError::InvalidUpgradeChance(disc.upgrade_chance));
    }
    check_finite("mainStat", disc.main_stat.value)?;
    check_stats("substats", &disc.substats)
}

fn loadout_not_found(agent_id: &str, loadout_id: &str) -> StoreError {
    StoreError::LoadoutNotFound {
        agent_id: agent_id.to_string(),
        loadout_id: loadout_id.to_string(),
    }
}

/// Parse a persisted blob through the same validation as imports.
fn restore(blob: &str) -> Result<AppState, ImportError> {
    let (patch, _) = snapshot::parse_import(blob)?;
    let mut state = AppState::default();
    patch.apply(&mut state);
    Ok(state)
}
