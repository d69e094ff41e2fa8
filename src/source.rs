//! Stat sources module.
//!
//! A source adds labeled contributions to a [`CalculatedStats`]. The
//! aggregator runs its sources in a fixed order, so the contributor list of
//! every stat comes out in the same order for the same input.

use crate::breakdown::{CalculatedStats, ContributorKind};
use crate::model::{Buff, Loadout};
use crate::stat::StatValue;

/// Something that contributes to an agent's stats.
///
/// # Examples
///
/// ```rust
/// use zzplan::breakdown::CalculatedStats;
/// use zzplan::source::{BaseStats, StatSource};
/// use zzplan::{StatName, StatValue};
///
/// let base = [StatValue::new(StatName::Hp, 7_500.0)];
/// let mut stats = CalculatedStats::new();
/// BaseStats(&base).contribute(&mut stats);
///
/// assert_eq!(stats.total(StatName::Hp), Some(7_500.0));
/// ```
pub trait StatSource {
    /// Add this source's contributions, in order.
    fn contribute(&self, stats: &mut CalculatedStats);
}

/// The agent's own base stats, labeled `Base`.
#[derive(Debug, Clone, Copy)]
pub struct BaseStats<'a>(pub &'a [StatValue]);

impl StatSource for BaseStats<'_> {
    fn contribute(&self, stats: &mut CalculatedStats) {
        for stat in self.0 {
            stats.add(stat.stat, "Base", stat.value, ContributorKind::Base);
        }
    }
}

/// Stats of the equipped W-Engine, labeled with its name.
#[derive(Debug, Clone, Copy)]
pub struct WEngineStats<'a> {
    pub name: &'a str,
    pub stats: &'a [StatValue],
}

impl StatSource for WEngineStats<'_> {
    fn contribute(&self, stats: &mut CalculatedStats) {
        for stat in self.stats {
            stats.add(stat.stat, self.name, stat.value, ContributorKind::WEngine);
        }
    }
}

/// Main stats and substats of a loadout's discs.
///
/// Slots are visited in order; within a slot the main stat comes before the
/// substats.
#[derive(Debug, Clone, Copy)]
pub struct DiscStats<'a>(pub &'a Loadout);

impl StatSource for DiscStats<'_> {
    fn contribute(&self, stats: &mut CalculatedStats) {
        for (slot, disc) in self.0.equipped_discs() {
            let main = disc.main_stat;
            stats.add(
                main.stat,
                format!("Disc {} (Main)", slot),
                main.value,
                ContributorKind::DiscMain,
            );
            for sub in &disc.substats {
                stats.add(
                    sub.stat,
                    format!("Disc {} (Sub)", slot),
                    sub.value,
                    ContributorKind::DiscSub,
                );
            }
        }
    }
}

/// Active buffs, each labeled with its own label.
#[derive(Debug, Clone, Copy)]
pub struct BuffStats<'a>(pub &'a [Buff]);

impl StatSource for BuffStats<'_> {
    fn contribute(&self, stats: &mut CalculatedStats) {
        for buff in self.0 {
            for stat in &buff.stats {
                stats.add(stat.stat, buff.label.as_str(), stat.value, ContributorKind::Buff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuffSource, Disc};
    use crate::stat::StatName;

    fn disc(slot: u8, main: StatValue, substats: Vec<StatValue>) -> Disc {
        Disc {
            id: format!("d{slot}"),
            slot,
            set_name: "Swing Jazz".to_string(),
            main_stat: main,
            substats,
            upgrade_chance: 0.0,
        }
    }

    #[test]
    fn test_disc_slot_order_and_labels() {
        let mut loadout = Loadout::new("l", "L");
        loadout.discs[4] = Some(disc(5, StatValue::new(StatName::Atk, 30.0), vec![]));
        loadout.discs[0] = Some(disc(
            1,
            StatValue::new(StatName::Hp, 2200.0),
            vec![StatValue::new(StatName::Atk, 19.0)],
        ));

        let mut stats = CalculatedStats::new();
        DiscStats(&loadout).contribute(&mut stats);

        let atk = stats.get(StatName::Atk).unwrap();
        let sources: Vec<&str> = atk.contributors.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["Disc 1 (Sub)", "Disc 5 (Main)"]);
        assert_eq!(atk.total, 49.0);
        assert_eq!(stats.total(StatName::Hp), Some(2200.0));
    }

    #[test]
    fn test_buff_with_several_stats() {
        let buff = Buff {
            id: "b".to_string(),
            label: "Shield".to_string(),
            source: BuffSource::Custom,
            stats: vec![
                StatValue::new(StatName::Def, 50.0),
                StatValue::new(StatName::Impact, 8.0),
            ],
            active: true,
        };
        let mut stats = CalculatedStats::new();
        BuffStats(std::slice::from_ref(&buff)).contribute(&mut stats);

        assert_eq!(stats.len(), 2);
        let impact = stats.get(StatName::Impact).unwrap();
        assert_eq!(impact.contributors[0].source, "Shield");
        assert_eq!(impact.contributors[0].kind, ContributorKind::Buff);
    }
}
