//! Build data model.
//!
//! These are the persisted types owned by the [`BuildStore`](crate::store::BuildStore).
//! Field names serialize in camelCase so exported documents match the
//! planner's storage format.

use crate::stat::{StatValue, StatWeights};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of disc slots on every loadout.
pub const DISC_SLOTS: usize = 6;

/// Maximum number of loadouts one agent can hold.
pub const MAX_LOADOUTS: usize = 5;

/// Id given to the loadout seeded by `add_agent`.
pub const DEFAULT_LOADOUT_ID: &str = "default";

/// Name given to the loadout seeded by `add_agent`.
pub const DEFAULT_LOADOUT_NAME: &str = "Default Loadout";

/// A tracked character build.
///
/// `id` doubles as the catalogue id, so there is at most one build entry
/// per catalogue character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub tracking: bool,
    /// `None` only when every loadout has been deleted.
    pub current_loadout_id: Option<String>,
    pub loadouts: Vec<Loadout>,
}

impl Agent {
    /// Create an agent with the single default loadout selected.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracking: true,
            current_loadout_id: Some(DEFAULT_LOADOUT_ID.to_string()),
            loadouts: vec![Loadout::new(DEFAULT_LOADOUT_ID, DEFAULT_LOADOUT_NAME)],
        }
    }

    pub fn loadout(&self, loadout_id: &str) -> Option<&Loadout> {
        self.loadouts.iter().find(|l| l.id == loadout_id)
    }

    pub fn loadout_mut(&mut self, loadout_id: &str) -> Option<&mut Loadout> {
        self.loadouts.iter_mut().find(|l| l.id == loadout_id)
    }

    /// The loadout `current_loadout_id` points at, if it resolves.
    pub fn current_loadout(&self) -> Option<&Loadout> {
        self.current_loadout_id
            .as_deref()
            .and_then(|id| self.loadout(id))
    }
}

/// A switchable weapon + discs + buffs configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loadout {
    pub id: String,
    pub loadout_name: String,
    pub tracking: bool,
    pub w_engine: Option<WEngineRef>,
    /// Slot `n` lives at index `n - 1`.
    pub discs: [Option<Disc>; DISC_SLOTS],
    /// Set semantics; order carries no meaning.
    pub active_buff_ids: Vec<String>,
    pub custom_buffs: Vec<Buff>,
}

impl Loadout {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            loadout_name: name.into(),
            tracking: true,
            w_engine: None,
            discs: Default::default(),
            active_buff_ids: Vec::new(),
            custom_buffs: Vec::new(),
        }
    }

    /// The disc in a 1-indexed slot.
    pub fn disc(&self, slot: u8) -> Option<&Disc> {
        let index = usize::from(slot).checked_sub(1)?;
        self.discs.get(index).and_then(Option::as_ref)
    }

    /// Filled slots as `(slot, disc)` pairs in slot order.
    pub fn equipped_discs(&self) -> impl Iterator<Item = (u8, &Disc)> {
        self.discs
            .iter()
            .zip(1u8..)
            .filter_map(|(disc, slot)| disc.as_ref().map(|d| (slot, d)))
    }

    pub fn is_buff_active(&self, buff_id: &str) -> bool {
        self.active_buff_ids.iter().any(|id| id == buff_id)
    }
}

/// Weapon upgrade tier, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Overclock(u8);

impl Overclock {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(tier: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&tier).then_some(Self(tier))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Overclock {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Overclock {
    type Error = String;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        Self::new(tier).ok_or_else(|| {
            format!(
                "overclock {} outside {}..={}",
                tier,
                Overclock::MIN,
                Overclock::MAX
            )
        })
    }
}

impl From<Overclock> for u8 {
    fn from(overclock: Overclock) -> Self {
        overclock.0
    }
}

impl fmt::Display for Overclock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// Reference to an equipped W-Engine in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WEngineRef {
    pub id: String,
    pub overclock: Overclock,
}

impl WEngineRef {
    pub fn new(id: impl Into<String>, overclock: Overclock) -> Self {
        Self {
            id: id.into(),
            overclock,
        }
    }
}

/// A piece of gear in one of the six slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disc {
    pub id: String,
    pub slot: u8,
    pub set_name: String,
    pub main_stat: StatValue,
    pub substats: Vec<StatValue>,
    /// User-entered probability in `[0, 1]`.
    pub upgrade_chance: f64,
}

/// Where a buff comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuffSource {
    #[serde(rename = "self")]
    SelfBuff,
    WEngine,
    Disc,
    Custom,
}

/// A named, toggleable stat modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub id: String,
    pub label: String,
    pub source: BuffSource,
    pub stats: Vec<StatValue>,
    pub active: bool,
}

/// Partial edit of a custom buff; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffUpdate {
    pub label: Option<String>,
    pub stats: Option<Vec<StatValue>>,
}

/// A farming location and the two disc sets it drops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    pub disc_set1: String,
    pub disc_set2: String,
}

/// Partial edit of an area; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaUpdate {
    pub name: Option<String>,
    pub disc_set1: Option<String>,
    pub disc_set2: Option<String>,
}

/// UI font choice, persisted with the build data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontPreset {
    #[default]
    Inter,
    Jetbrains,
    Space,
    System,
}

/// The whole persisted state tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub font_preset: FontPreset,
    pub agents: Vec<Agent>,
    pub areas: Vec<Area>,
    pub selected_agent_id: Option<String>,
    pub stat_weights: StatWeights,
}

impl AppState {
    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == agent_id)
    }

    pub fn area(&self, area_id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == area_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat::StatName;

    fn disc(slot: u8) -> Disc {
        Disc {
            id: format!("disc-{slot}"),
            slot,
            set_name: "Woodpecker Electro".to_string(),
            main_stat: StatValue::new(StatName::Atk, 30.0),
            substats: vec![],
            upgrade_chance: 0.1,
        }
    }

    #[test]
    fn test_new_agent_has_default_loadout() {
        let agent = Agent::new("1011");
        assert_eq!(agent.loadouts.len(), 1);
        assert_eq!(agent.current_loadout().unwrap().id, DEFAULT_LOADOUT_ID);
        assert!(agent.loadouts[0].discs.iter().all(Option::is_none));
    }

    #[test]
    fn test_disc_slot_lookup_is_one_indexed() {
        let mut loadout = Loadout::new("l", "L");
        loadout.discs[2] = Some(disc(3));
        assert_eq!(loadout.disc(3).unwrap().id, "disc-3");
        assert!(loadout.disc(0).is_none());
        assert!(loadout.disc(7).is_none());
        let slots: Vec<u8> = loadout.equipped_discs().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![3]);
    }

    #[test]
    fn test_overclock_bounds() {
        assert!(Overclock::new(0).is_none());
        assert_eq!(Overclock::new(5).unwrap().get(), 5);
        assert!(Overclock::new(6).is_none());
        assert!(serde_json::from_str::<Overclock>("9").is_err());
        assert_eq!(serde_json::from_str::<Overclock>("3").unwrap().get(), 3);
    }

    #[test]
    fn test_buff_source_wire_names() {
        let sources = [
            BuffSource::SelfBuff,
            BuffSource::WEngine,
            BuffSource::Disc,
            BuffSource::Custom,
        ];
        let json = serde_json::to_string(&sources).unwrap();
        assert_eq!(json, r#"["self","w-engine","disc","custom"]"#);
    }

    #[test]
    fn test_loadout_serializes_camel_case() {
        let loadout = Loadout::new("default", "Default Loadout");
        let value = serde_json::to_value(&loadout).unwrap();
        assert_eq!(value["loadoutName"], "Default Loadout");
        assert!(value["wEngine"].is_null());
        assert_eq!(value["discs"].as_array().unwrap().len(), DISC_SLOTS);
        assert!(value["activeBuffIds"].as_array().unwrap().is_empty());
    }
}
