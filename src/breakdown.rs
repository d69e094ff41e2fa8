//! Calculated stat results module.
//!
//! Contains the `CalculatedStats` map produced by
//! [`calculate_agent_stats`](crate::stats::calculate_agent_stats): one
//! `StatTotal` per stat that received at least one contribution, each with
//! the ordered list of contributors that make up its total.

use crate::stat::StatName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which kind of source a contribution came from.
///
/// Used for presentation only (color-coding the breakdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorKind {
    Base,
    WEngine,
    DiscMain,
    DiscSub,
    Buff,
}

/// One labeled addition to a stat total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatContributor {
    /// Human-readable source, e.g. `Base` or `Disc 3 (Main)`.
    pub source: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: ContributorKind,
}

/// The total of one stat with its full breakdown.
///
/// # Examples
///
/// ```rust
/// use zzplan::breakdown::{ContributorKind, StatTotal};
///
/// let mut total = StatTotal::default();
/// total.add_contributor("Base", 100.0, ContributorKind::Base);
/// total.add_contributor("Disc 1 (Main)", 30.0, ContributorKind::DiscMain);
///
/// assert_eq!(total.total, 130.0);
/// assert_eq!(total.contributors.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTotal {
    pub total: f64,
    /// Contributors in the order they were added.
    pub contributors: Vec<StatContributor>,
}

impl StatTotal {
    /// Add a contribution to the total and the breakdown.
    pub fn add_contributor(&mut self, source: impl Into<String>, value: f64, kind: ContributorKind) {
        self.total += value;
        self.contributors.push(StatContributor {
            source: source.into(),
            value,
            kind,
        });
    }
}

/// Per-stat totals. Stats nobody contributed to are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculatedStats {
    stats: BTreeMap<StatName, StatTotal>,
}

impl CalculatedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contribution, creating the stat's entry on first use.
    pub fn add(&mut self, stat: StatName, source: impl Into<String>, value: f64, kind: ContributorKind) {
        self.stats
            .entry(stat)
            .or_default()
            .add_contributor(source, value, kind);
    }

    pub fn get(&self, stat: StatName) -> Option<&StatTotal> {
        self.stats.get(&stat)
    }

    /// The total of `stat`, or `None` if nothing contributed to it.
    pub fn total(&self, stat: StatName) -> Option<f64> {
        self.stats.get(&stat).map(|s| s.total)
    }

    pub fn contains(&self, stat: StatName) -> bool {
        self.stats.contains_key(&stat)
    }

    /// Stats in display order.
    pub fn iter(&self) -> impl Iterator<Item = (StatName, &StatTotal)> {
        self.stats.iter().map(|(stat, total)| (*stat, total))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
