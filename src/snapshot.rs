//! Export and validating import of the build tree.
//!
//! Export writes the whole [`AppState`] as JSON text. Import reads a JSON
//! object, deserializes each known top-level field on its own so that every
//! mismatch is reported by name, checks the tree invariants, and only then
//! produces a [`StatePatch`] that replaces the fields it carries.

use crate::error::{FieldError, ImportError};
use crate::model::{Agent, AppState, Area, FontPreset, MAX_LOADOUTS};
use crate::stat::StatWeights;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;

const FONT_PRESET: &str = "fontPreset";
const AGENTS: &str = "agents";
const AREAS: &str = "areas";
const SELECTED_AGENT_ID: &str = "selectedAgentId";
const STAT_WEIGHTS: &str = "statWeights";

/// Serialize the full state as pretty-printed JSON.
pub fn export_json(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(state)
}

/// The fields an import document carried; absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub font_preset: Option<FontPreset>,
    pub agents: Option<Vec<Agent>>,
    pub areas: Option<Vec<Area>>,
    pub selected_agent_id: Option<Option<String>>,
    pub stat_weights: Option<StatWeights>,
}

impl StatePatch {
    /// Replace every field of `state` that this patch carries.
    pub fn apply(self, state: &mut AppState) {
        if let Some(font_preset) = self.font_preset {
            state.font_preset = font_preset;
        }
        if let Some(agents) = self.agents {
            state.agents = agents;
        }
        if let Some(areas) = self.areas {
            state.areas = areas;
        }
        if let Some(selected) = self.selected_agent_id {
            state.selected_agent_id = selected;
        }
        if let Some(weights) = self.stat_weights {
            state.stat_weights = weights;
        }
    }
}

/// What an accepted import touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Known fields that were replaced.
    pub applied: Vec<String>,
    /// Top-level keys that are not part of the persisted state.
    pub ignored: Vec<String>,
}

/// Parse and validate an import document.
///
/// # Errors
///
/// * [`ImportError::Json`] if `text` is not JSON
/// * [`ImportError::NotAnObject`] if the top level is not an object
/// * [`ImportError::Schema`] if any known field has the wrong shape
/// * [`ImportError::Invalid`] if the agents break a tree invariant
pub fn parse_import(text: &str) -> Result<(StatePatch, ImportReport), ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(object) = value else {
        return Err(ImportError::NotAnObject);
    };

    let mut errors = Vec::new();
    let mut report = ImportReport::default();
    let patch = StatePatch {
        font_preset: field(&object, FONT_PRESET, &mut errors, &mut report),
        agents: field(&object, AGENTS, &mut errors, &mut report),
        areas: field(&object, AREAS, &mut errors, &mut report),
        selected_agent_id: field(&object, SELECTED_AGENT_ID, &mut errors, &mut report),
        stat_weights: field(&object, STAT_WEIGHTS, &mut errors, &mut report),
    };

    if !errors.is_empty() {
        return Err(ImportError::Schema(errors));
    }

    if let Some(agents) = &patch.agents {
        let problems = validate_agents(agents);
        if !problems.is_empty() {
            return Err(ImportError::Invalid(problems));
        }
    }

    const KNOWN: [&str; 5] = [FONT_PRESET, AGENTS, AREAS, SELECTED_AGENT_ID, STAT_WEIGHTS];
    report.ignored = object
        .keys()
        .filter(|key| !KNOWN.contains(&key.as_str()))
        .cloned()
        .collect();

    Ok((patch, report))
}

/// Deserialize one top-level field, recording a mismatch instead of failing.
fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    name: &str,
    errors: &mut Vec<FieldError>,
    report: &mut ImportReport,
) -> Option<T> {
    let raw = object.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => {
            report.applied.push(name.to_string());
            Some(parsed)
        }
        Err(e) => {
            errors.push(FieldError::new(name, e.to_string()));
            None
        }
    }
}

/// Check the invariants deserialization alone cannot express.
pub fn validate_agents(agents: &[Agent]) -> Vec<FieldError> {
    let mut problems = Vec::new();
    let mut agent_ids = HashSet::new();

    for (a, agent) in agents.iter().enumerate() {
        let at = format!("{}[{}]", AGENTS, a);

        if !agent_ids.insert(agent.id.as_str()) {
            problems.push(FieldError::new(
                format!("{}.id", at),
                format!("duplicate agent id {}", agent.id),
            ));
        }

        if agent.loadouts.len() > MAX_LOADOUTS {
            problems.push(FieldError::new(
                format!("{}.loadouts", at),
                format!(
                    "{} loadouts exceeds the limit of {}",
                    agent.loadouts.len(),
                    MAX_LOADOUTS
                ),
            ));
        }

        let mut loadout_ids = HashSet::new();
        for (l, loadout) in agent.loadouts.iter().enumerate() {
            let lat = format!("{}.loadouts[{}]", at, l);
            if !loadout_ids.insert(loadout.id.as_str()) {
                problems.push(FieldError::new(
                    format!("{}.id", lat),
                    format!("duplicate loadout id {}", loadout.id),
                ));
            }
            for (index, disc) in loadout.discs.iter().enumerate() {
                let Some(disc) = disc else { continue };
                let expected = index + 1;
                if usize::from(disc.slot) != expected {
                    problems.push(FieldError::new(
                        format!("{}.discs[{}].slot", lat, index),
                        format!("slot {} stored at position {}", disc.slot, expected),
                    ));
                }
                if !(0.0..=1.0).contains(&disc.upgrade_chance) {
                    problems.push(FieldError::new(
                        format!("{}.discs[{}].upgradeChance", lat, index),
                        format!("{} outside [0, 1]", disc.upgrade_chance),
                    ));
                }
            }
        }

        match agent.current_loadout_id.as_deref() {
            Some(current) if agent.loadout(current).is_none() => {
                problems.push(FieldError::new(
                    format!("{}.currentLoadoutId", at),
                    format!("{} does not name a loadout", current),
                ));
            }
            None if !agent.loadouts.is_empty() => {
                problems.push(FieldError::new(
                    format!("{}.currentLoadoutId", at),
                    "missing while loadouts exist",
                ));
            }
            _ => {}
        }
    }

    problems
}
