//! Stat name module.
//!
//! Provides the closed `StatName` enumeration used everywhere a stat is
//! referenced, plus the `StatValue` pair and the global `StatWeights` map.
//! Stat names serialize as their in-game display strings ("Crit Rate",
//! "PEN Ratio", ...), which is also the format of persisted build data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the eleven stats an agent can carry.
///
/// # Examples
///
/// ```rust
/// use zzplan::StatName;
///
/// let crit: StatName = "Crit Rate".parse().unwrap();
/// assert_eq!(crit, StatName::CritRate);
/// assert_eq!(crit.as_str(), "Crit Rate");
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatName {
    #[serde(rename = "ATK")]
    Atk,
    #[serde(rename = "DEF")]
    Def,
    #[serde(rename = "HP")]
    Hp,
    #[serde(rename = "Crit Rate")]
    CritRate,
    #[serde(rename = "Crit DMG")]
    CritDmg,
    #[serde(rename = "Energy Regen")]
    EnergyRegen,
    #[serde(rename = "Impact")]
    Impact,
    #[serde(rename = "Anomaly Proficiency")]
    AnomalyProficiency,
    #[serde(rename = "Anomaly Mastery")]
    AnomalyMastery,
    #[serde(rename = "DEF PEN")]
    DefPen,
    #[serde(rename = "PEN Ratio")]
    PenRatio,
}

impl StatName {
    /// Every stat, in display order.
    pub const ALL: [StatName; 11] = [
        StatName::Atk,
        StatName::Def,
        StatName::Hp,
        StatName::CritRate,
        StatName::CritDmg,
        StatName::EnergyRegen,
        StatName::Impact,
        StatName::AnomalyProficiency,
        StatName::AnomalyMastery,
        StatName::DefPen,
        StatName::PenRatio,
    ];

    /// The display string, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatName::Atk => "ATK",
            StatName::Def => "DEF",
            StatName::Hp => "HP",
            StatName::CritRate => "Crit Rate",
            StatName::CritDmg => "Crit DMG",
            StatName::EnergyRegen => "Energy Regen",
            StatName::Impact => "Impact",
            StatName::AnomalyProficiency => "Anomaly Proficiency",
            StatName::AnomalyMastery => "Anomaly Mastery",
            StatName::DefPen => "DEF PEN",
            StatName::PenRatio => "PEN Ratio",
        }
    }
}

impl fmt::Display for StatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the eleven stat names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stat name: {0}")]
pub struct UnknownStat(pub String);

impl FromStr for StatName {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StatName::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

/// A stat paired with a signed amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub stat: StatName,
    pub value: f64,
}

impl StatValue {
    pub fn new(stat: StatName, value: f64) -> Self {
        Self { stat, value }
    }
}

/// Global stat weights, keyed by stat name.
///
/// Ordered so that exported JSON is stable across runs.
pub type StatWeights = BTreeMap<StatName, f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_name_roundtrips_display_string() {
        for stat in StatName::ALL {
            let parsed: StatName = stat.as_str().parse().unwrap();
            assert_eq!(parsed, stat);
        }
    }

    #[test]
    fn test_stat_name_parse_is_case_insensitive() {
        assert_eq!("crit dmg".parse::<StatName>().unwrap(), StatName::CritDmg);
        assert_eq!(" pen ratio ".parse::<StatName>().unwrap(), StatName::PenRatio);
    }

    #[test]
    fn test_unknown_stat_name() {
        let err = "Sheer Force".parse::<StatName>().unwrap_err();
        assert!(err.to_string().contains("Sheer Force"));
    }

    #[test]
    fn test_stat_name_serializes_as_display_string() {
        let json = serde_json::to_string(&StatName::AnomalyMastery).unwrap();
        assert_eq!(json, "\"Anomaly Mastery\"");
    }

    #[test]
    fn test_stat_weights_use_names_as_keys() {
        let mut weights = StatWeights::new();
        weights.insert(StatName::CritRate, 2.0);
        weights.insert(StatName::Atk, 1.0);
        let json = serde_json::to_string(&weights).unwrap();
        assert_eq!(json, r#"{"ATK":1.0,"Crit Rate":2.0}"#);
    }
}
