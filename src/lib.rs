//! # zzplan - Agent Build Planner Core
//!
//! The state and stat core of a build planner for agents (characters),
//! their W-Engines (weapons) and discs (gear):
//! - **Build store** with loadouts, discs, custom buffs and areas, persisted
//!   as one JSON blob
//! - **Deterministic** stat breakdowns (same build → same contributors in the
//!   same order)
//! - **Validated** import of exported build data
//! - **Cached** catalogue and game-data API reads that degrade gracefully
//!
//! ## Stat Pipeline
//!
//! ```text
//! [Base] → [W-Engine] → [Disc main/sub, slot order] → [Active buffs] → CalculatedStats
//! ```
//!
//! Each step adds labeled contributors; a stat's total is the sum of its
//! contributors, and stats nobody contributed to are absent.
//!
//! ## Example
//!
//! ```rust
//! use zzplan::catalogue::{AgentData, GameData};
//! use zzplan::model::Disc;
//! use zzplan::storage::MemoryStorage;
//! use zzplan::stats::{calculate_agent_stats, AgentProfile};
//! use zzplan::*;
//!
//! let mut catalogue = GameData::default();
//! catalogue.insert_agent(AgentData::named("1091", "Miyabi"));
//!
//! let mut store = BuildStore::new(MemoryStorage::new());
//! let agent_id = store.add_agent("1091", &catalogue).unwrap();
//! store
//!     .set_disc(&agent_id, "default", 4, Some(Disc {
//!         id: "d4".into(),
//!         slot: 4,
//!         set_name: "Branch & Blade Song".into(),
//!         main_stat: StatValue::new(StatName::CritDmg, 48.0),
//!         substats: vec![StatValue::new(StatName::CritRate, 4.8)],
//!         upgrade_chance: 0.2,
//!     }))
//!     .unwrap();
//!
//! let profile = AgentProfile {
//!     base_stats: vec![StatValue::new(StatName::CritDmg, 50.0)],
//!     w_engine: None,
//! };
//! let agent = store.agent(&agent_id).unwrap();
//! let stats = calculate_agent_stats(agent, &profile, &[]);
//! assert_eq!(stats.total(StatName::CritDmg), Some(98.0));
//! assert_eq!(stats.total(StatName::CritRate), Some(4.8));
//! assert!(!stats.contains(StatName::Hp));
//! ```
//!
//! ## Modules
//!
//! - [`stat`] - Stat names, values and weights
//! - [`model`] - Persisted build types
//! - [`store`] - The build store and its mutators
//! - [`snapshot`] - Export and validating import
//! - [`storage`] - Durable local storage
//! - [`source`] - Contribution sources
//! - [`breakdown`] - Calculated stat results
//! - [`stats`] - Stat aggregation and weapon formulas
//! - [`upgrade`] - Upgrade-chance estimates
//! - [`catalogue`] - Agent and W-Engine catalogue cache
//! - [`api`] - Game-data API cache
//! - [`fetch`] - Document fetchers
//! - [`clock`] - Time sources
//! - [`markup`] - Talent text markup
//! - [`config`] - Planner configuration
//! - [`error`] - Error types

pub mod api;
pub mod breakdown;
pub mod catalogue;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod markup;
pub mod model;
pub mod snapshot;
pub mod source;
pub mod stat;
pub mod stats;
pub mod storage;
pub mod store;
pub mod upgrade;

// Re-export main types for convenience
pub use breakdown::{CalculatedStats, ContributorKind, StatContributor, StatTotal};
pub use config::PlannerConfig;
pub use error::{FetchError, FieldError, ImportError, StoreError};
pub use stat::{StatName, StatValue, StatWeights};
pub use store::BuildStore;

// Re-export the aggregation entry points
pub use stats::{active_buffs, calculate_agent_stats, get_all_buffs_for_agent};
pub use upgrade::{calculate_area_upgrade_chance, calculate_upgrade_chance};
