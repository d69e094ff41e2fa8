//! Stat aggregation.
//!
//! [`calculate_agent_stats`] sums every contribution to an agent's stats in
//! a fixed order:
//!
//! ```text
//! base stats → W-Engine → discs (slot order, main before subs) → active buffs
//! ```
//!
//! Base stats and weapon numbers are not part of the stored build; they are
//! supplied through an [`AgentProfile`], usually built from API detail
//! documents.

use crate::api::WEngineDetail;
use crate::breakdown::CalculatedStats;
use crate::markup::{parse_markup, strip_markup, TextSpan};
use crate::model::{Agent, Buff, BuffSource, Overclock};
use crate::source::{BaseStats, BuffStats, DiscStats, StatSource, WEngineStats};
use crate::stat::{StatName, StatValue};

/// Max-level base ATK of a W-Engine from its level-1 base value,
/// rounded to two decimals.
///
/// # Examples
///
/// ```rust
/// use zzplan::stats::calculate_weapon_max_base_stat;
///
/// assert_eq!(calculate_weapon_max_base_stat(48.0), 713.76);
/// ```
pub fn calculate_weapon_max_base_stat(base_attack: f64) -> f64 {
    let scaled = base_attack * (1.0 + 94090.0 / 10000.0 + 0.8922 * 5.0);
    (scaled * 100.0).round() / 100.0
}

/// Max-level secondary stat of a W-Engine, in the API's units.
pub fn calculate_weapon_max_secondary_stat(base_value: f64) -> f64 {
    base_value * (1.0 + 0.3 * 5.0)
}

/// Talent text for the equipped overclock tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TalentText {
    pub name: String,
    /// Description with markup removed.
    pub description: String,
    /// Description split into colored spans.
    pub spans: Vec<TextSpan>,
}

/// What an equipped W-Engine contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct WEngineProfile {
    pub id: String,
    pub name: String,
    pub overclock: Overclock,
    pub stats: Vec<StatValue>,
    pub talent: Option<TalentText>,
    /// Buffs this W-Engine offers for toggling.
    pub buffs: Vec<Buff>,
}

impl WEngineProfile {
    /// Derive the profile from the API detail document.
    ///
    /// Stats are the max-level ATK and, when its name is a known stat, the
    /// max-level secondary stat. The talent of the equipped overclock tier
    /// becomes a toggleable `w-engine` buff; talent effects are text only,
    /// so that buff carries no stats.
    pub fn from_detail(
        id: impl Into<String>,
        name: impl Into<String>,
        detail: &WEngineDetail,
        overclock: Overclock,
    ) -> Self {
        let id = id.into();
        let mut stats = vec![StatValue::new(
            StatName::Atk,
            calculate_weapon_max_base_stat(detail.base_property.value),
        )];
        match detail.rand_property.name.parse::<StatName>() {
            Ok(stat) => stats.push(StatValue::new(
                stat,
                calculate_weapon_max_secondary_stat(detail.rand_property.value),
            )),
            Err(e) => tracing::debug!("W-Engine {} secondary stat skipped: {}", id, e),
        }

        let talent = detail.talent(overclock).map(|t| TalentText {
            name: t.name.clone(),
            description: strip_markup(&t.desc),
            spans: parse_markup(&t.desc),
        });
        let buffs = talent
            .iter()
            .map(|t| Buff {
                id: format!("w-engine:{}", id),
                label: t.name.clone(),
                source: BuffSource::WEngine,
                stats: Vec::new(),
                active: false,
            })
            .collect();

        Self {
            id,
            name: name.into(),
            overclock,
            stats,
            talent,
            buffs,
        }
    }
}

/// Stat inputs that live outside the stored build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentProfile {
    pub base_stats: Vec<StatValue>,
    /// The W-Engine equipped on the agent's current loadout.
    pub w_engine: Option<WEngineProfile>,
}

/// Sum every contribution to the agent's stats.
///
/// Discs come from the agent's current loadout; an agent without one gets
/// no disc contributions. `active_buffs` are applied in the order given.
/// Stats with no contributions are absent from the result.
pub fn calculate_agent_stats(
    agent: &Agent,
    profile: &AgentProfile,
    active_buffs: &[Buff],
) -> CalculatedStats {
    let mut stats = CalculatedStats::new();

    let mut sources: Vec<Box<dyn StatSource + '_>> = vec![Box::new(BaseStats(&profile.base_stats))];
    if let Some(w_engine) = &profile.w_engine {
        sources.push(Box::new(WEngineStats {
            name: &w_engine.name,
            stats: &w_engine.stats,
        }));
    }
    if let Some(loadout) = agent.current_loadout() {
        sources.push(Box::new(DiscStats(loadout)));
    }
    sources.push(Box::new(BuffStats(active_buffs)));

    for source in &sources {
        source.contribute(&mut stats);
    }
    stats
}

/// Every buff the agent could toggle: custom buffs of the current loadout
/// followed by the equipped W-Engine's buffs.
///
/// Self and disc buffs are not derived yet and never appear here.
pub fn get_all_buffs_for_agent(agent: &Agent, profile: &AgentProfile) -> Vec<Buff> {
    let mut buffs: Vec<Buff> = agent
        .current_loadout()
        .map(|l| l.custom_buffs.clone())
        .unwrap_or_default();
    if let Some(w_engine) = &profile.w_engine {
        buffs.extend(w_engine.buffs.iter().cloned());
    }
    buffs
}

/// The buffs of `all_buffs` whose ids are active on the current loadout,
/// in `all_buffs` order, each marked `active`.
pub fn active_buffs(agent: &Agent, all_buffs: &[Buff]) -> Vec<Buff> {
    let Some(loadout) = agent.current_loadout() else {
        return Vec::new();
    };
    all_buffs
        .iter()
        .filter(|b| loadout.is_buff_active(&b.id))
        .map(|b| Buff {
            active: true,
            ..b.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BaseProperty, RandProperty, Talent};
    use crate::breakdown::ContributorKind;
    use std::collections::BTreeMap;

    fn detail(rand_name: &str) -> WEngineDetail {
        let mut talents = BTreeMap::new();
        talents.insert(
            "2".to_string(),
            Talent {
                name: "Metal Cat Claws".to_string(),
                desc: "Physical DMG +<color=#2BAD00>25%</color>".to_string(),
            },
        );
        WEngineDetail {
            base_property: BaseProperty { value: 48.0 },
            rand_property: RandProperty {
                name: rand_name.to_string(),
                value: 960.0,
            },
            talents,
        }
    }

    #[test]
    fn test_weapon_formulas() {
        assert_eq!(calculate_weapon_max_base_stat(48.0), 713.76);
        assert_eq!(calculate_weapon_max_base_stat(40.0), 594.8);
        assert_eq!(calculate_weapon_max_secondary_stat(960.0), 2400.0);
    }

    #[test]
    fn test_profile_from_detail() {
        let profile = WEngineProfile::from_detail(
            "14102",
            "Steel Cushion",
            &detail("Crit Rate"),
            Overclock::new(2).unwrap(),
        );
        assert_eq!(
            profile.stats,
            vec![
                StatValue::new(StatName::Atk, 713.76),
                StatValue::new(StatName::CritRate, 2400.0),
            ]
        );
        let talent = profile.talent.as_ref().unwrap();
        assert_eq!(talent.description, "Physical DMG +25%");
        assert_eq!(profile.buffs.len(), 1);
        assert_eq!(profile.buffs[0].source, BuffSource::WEngine);
        assert_eq!(profile.buffs[0].label, "Metal Cat Claws");
    }

    #[test]
    fn test_profile_skips_unknown_secondary_and_missing_talent() {
        let profile = WEngineProfile::from_detail(
            "1",
            "Odd",
            &detail("Sheer Force"),
            Overclock::new(1).unwrap(),
        );
        assert_eq!(profile.stats.len(), 1);
        assert!(profile.talent.is_none());
        assert!(profile.buffs.is_empty());
    }

    #[test]
    fn test_agent_without_loadout_gets_base_only() {
        let mut agent = Agent::new("1011");
        agent.loadouts.clear();
        agent.current_loadout_id = None;
        let profile = AgentProfile {
            base_stats: vec![StatValue::new(StatName::Def, 600.0)],
            w_engine: None,
        };
        let stats = calculate_agent_stats(&agent, &profile, &[]);
        assert_eq!(stats.len(), 1);
        assert_eq!(
            stats.get(StatName::Def).unwrap().contributors[0].kind,
            ContributorKind::Base
        );
        assert!(get_all_buffs_for_agent(&agent, &profile).is_empty());
        assert!(active_buffs(&agent, &[]).is_empty());
    }
}
