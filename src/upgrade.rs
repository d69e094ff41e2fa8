//! Upgrade-chance estimates.
//!
//! Both estimates are placeholders: a disc's chance is the value the user
//! entered, and an area's chance is the sum over the current loadout's
//! discs capped at 1. The sum is kept rather than `1 - Π(1 - p)` so that
//! numbers match earlier planner versions.

use crate::model::{Agent, Disc};
use crate::stat::StatWeights;

/// Upgrade chance of one disc; an empty slot has none.
///
/// `weights` is accepted for the eventual weighted model and is unused.
pub fn calculate_upgrade_chance(disc: Option<&Disc>, _weights: &StatWeights) -> f64 {
    disc.map_or(0.0, |d| d.upgrade_chance)
}

/// Combined upgrade chance of farming `area_id` for the agent's current
/// loadout, clamped to `[0, 1]`.
///
/// Returns `0.0` when the agent has no current loadout.
///
/// # Examples
///
/// ```rust
/// use zzplan::model::{Agent, Disc};
/// use zzplan::upgrade::calculate_area_upgrade_chance;
/// use zzplan::{StatName, StatValue, StatWeights};
///
/// let mut agent = Agent::new("1011");
/// agent.loadouts[0].discs[0] = Some(Disc {
///     id: "d1".into(),
///     slot: 1,
///     set_name: "Fanged Metal".into(),
///     main_stat: StatValue::new(StatName::Hp, 2200.0),
///     substats: vec![],
///     upgrade_chance: 0.25,
/// });
///
/// let chance = calculate_area_upgrade_chance(&agent, "area", &StatWeights::new());
/// assert_eq!(chance, 0.25);
/// ```
pub fn calculate_area_upgrade_chance(agent: &Agent, area_id: &str, weights: &StatWeights) -> f64 {
    let Some(loadout) = agent.current_loadout() else {
        return 0.0;
    };
    let total: f64 = loadout
        .discs
        .iter()
        .map(|disc| calculate_upgrade_chance(disc.as_ref(), weights))
        .sum();
    tracing::debug!(
        "Area {} raw upgrade chance for {}: {}",
        area_id,
        agent.id,
        total
    );
    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat::{StatName, StatValue};

    fn disc(slot: u8, chance: f64) -> Disc {
        Disc {
            id: format!("d{slot}"),
            slot,
            set_name: "Chaos Jazz".to_string(),
            main_stat: StatValue::new(StatName::Atk, 30.0),
            substats: vec![],
            upgrade_chance: chance,
        }
    }

    #[test]
    fn test_empty_slot_has_no_chance() {
        assert_eq!(calculate_upgrade_chance(None, &StatWeights::new()), 0.0);
    }

    #[test]
    fn test_disc_chance_is_identity() {
        let d = disc(1, 0.42);
        assert_eq!(calculate_upgrade_chance(Some(&d), &StatWeights::new()), 0.42);
    }

    #[test]
    fn test_partial_loadout_sums() {
        let mut agent = Agent::new("1011");
        agent.loadouts[0].discs[1] = Some(disc(2, 0.1));
        agent.loadouts[0].discs[3] = Some(disc(4, 0.2));
        let chance = calculate_area_upgrade_chance(&agent, "a", &StatWeights::new());
        assert!((chance - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_no_current_loadout() {
        let mut agent = Agent::new("1011");
        agent.current_loadout_id = None;
        assert_eq!(calculate_area_upgrade_chance(&agent, "a", &StatWeights::new()), 0.0);
    }
}
