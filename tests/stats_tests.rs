use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use zzplan::api::ApiCache;
use zzplan::catalogue::{Dataset, GameDataCache};
use zzplan::clock::ManualClock;
use zzplan::fetch::{Fetcher, MemoryFetcher};
use zzplan::model::{Agent, Buff, BuffSource, Disc, Overclock, WEngineRef};
use zzplan::stats::{AgentProfile, WEngineProfile};
use zzplan::storage::MemoryStorage;
use zzplan::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn disc(slot: u8, main: StatValue, substats: Vec<StatValue>, chance: f64) -> Disc {
    Disc {
        id: format!("disc-{slot}"),
        slot,
        set_name: "Hormone Punk".to_string(),
        main_stat: main,
        substats,
        upgrade_chance: chance,
    }
}

fn w_engine(name: &str, stats: Vec<StatValue>) -> WEngineProfile {
    WEngineProfile {
        id: "14001".to_string(),
        name: name.to_string(),
        overclock: Overclock::default(),
        stats,
        talent: None,
        buffs: Vec::new(),
    }
}

/// Base, W-Engine and one disc main stat add up with one contributor each.
#[test]
fn test_atk_breakdown() {
    init_tracing();
    let mut agent = Agent::new("1011");
    agent.loadouts[0].discs[0] = Some(disc(1, StatValue::new(StatName::Atk, 30.0), vec![], 0.0));
    let profile = AgentProfile {
        base_stats: vec![StatValue::new(StatName::Atk, 100.0)],
        w_engine: Some(w_engine("Starlight Engine", vec![StatValue::new(StatName::Atk, 50.0)])),
    };

    let stats = calculate_agent_stats(&agent, &profile, &[]);
    let atk = stats.get(StatName::Atk).unwrap();

    assert_eq!(atk.total, 180.0);
    let kinds: Vec<ContributorKind> = atk.contributors.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ContributorKind::Base,
            ContributorKind::WEngine,
            ContributorKind::DiscMain
        ]
    );
    let sources: Vec<&str> = atk.contributors.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(sources, vec!["Base", "Starlight Engine", "Disc 1 (Main)"]);
}

#[test]
fn test_absent_stats_and_total_invariant() {
    let mut agent = Agent::new("1011");
    agent.loadouts[0].discs[3] = Some(disc(
        4,
        StatValue::new(StatName::CritRate, 24.0),
        vec![
            StatValue::new(StatName::CritDmg, 4.8),
            StatValue::new(StatName::CritDmg, 9.6),
        ],
        0.0,
    ));
    let profile = AgentProfile {
        base_stats: vec![StatValue::new(StatName::CritRate, 5.0)],
        w_engine: None,
    };

    let stats = calculate_agent_stats(&agent, &profile, &[]);

    assert_eq!(stats.len(), 2);
    assert!(!stats.contains(StatName::Hp));
    assert!(!stats.contains(StatName::AnomalyProficiency));
    for (_, total) in stats.iter() {
        let sum: f64 = total.contributors.iter().map(|c| c.value).sum();
        assert!((total.total - sum).abs() < 1e-9);
    }
    let crit_dmg = stats.get(StatName::CritDmg).unwrap();
    assert_eq!(crit_dmg.contributors.len(), 2);
    assert!(crit_dmg
        .contributors
        .iter()
        .all(|c| c.source == "Disc 4 (Sub)" && c.kind == ContributorKind::DiscSub));
}

#[test]
fn test_same_build_same_breakdown() {
    let mut agent = Agent::new("1011");
    for slot in 1..=6u8 {
        agent.loadouts[0].discs[usize::from(slot) - 1] = Some(disc(
            slot,
            StatValue::new(StatName::Hp, 100.0 * f64::from(slot)),
            vec![StatValue::new(StatName::Atk, 19.0)],
            0.0,
        ));
    }
    let profile = AgentProfile::default();

    let first = calculate_agent_stats(&agent, &profile, &[]);
    let second = calculate_agent_stats(&agent.clone(), &profile, &[]);
    assert_eq!(first, second);
    assert_eq!(first.total(StatName::Hp), Some(2100.0));
}

#[test]
fn test_only_active_buffs_apply() {
    let mut store = BuildStore::new(MemoryStorage::new());
    let mut catalogue = zzplan::catalogue::GameData::default();
    catalogue.insert_agent(zzplan::catalogue::AgentData::named("1011", "Anby"));
    let agent_id = store.add_agent("1011", &catalogue).unwrap();

    let on = store
        .add_custom_buff(&agent_id, "default", "Core Passive", vec![StatValue::new(StatName::Impact, 10.0)])
        .unwrap();
    store
        .add_custom_buff(&agent_id, "default", "Unused", vec![StatValue::new(StatName::Impact, 99.0)])
        .unwrap();
    store.toggle_buff(&agent_id, "default", &on).unwrap();

    let agent = store.agent(&agent_id).unwrap();
    let profile = AgentProfile::default();
    let all = get_all_buffs_for_agent(agent, &profile);
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|b| b.source == BuffSource::Custom && !b.active));

    let active = active_buffs(agent, &all);
    assert_eq!(active.len(), 1);
    assert!(active[0].active);

    let stats = calculate_agent_stats(agent, &profile, &active);
    let impact = stats.get(StatName::Impact).unwrap();
    assert_eq!(impact.total, 10.0);
    assert_eq!(impact.contributors[0].source, "Core Passive");
    assert_eq!(impact.contributors[0].kind, ContributorKind::Buff);
}

#[test]
fn test_negative_buff_values_subtract() {
    let agent = Agent::new("1011");
    let profile = AgentProfile {
        base_stats: vec![StatValue::new(StatName::Def, 600.0)],
        w_engine: None,
    };
    let debuff = Buff {
        id: "shred".to_string(),
        label: "Armor Shred".to_string(),
        source: BuffSource::Custom,
        stats: vec![StatValue::new(StatName::Def, -120.0)],
        active: true,
    };
    let stats = calculate_agent_stats(&agent, &profile, &[debuff]);
    assert_eq!(stats.total(StatName::Def), Some(480.0));
}

#[test]
fn test_full_loadout_upgrade_chance_clamps() {
    let mut agent = Agent::new("1011");
    for slot in 1..=6u8 {
        agent.loadouts[0].discs[usize::from(slot) - 1] =
            Some(disc(slot, StatValue::new(StatName::Atk, 30.0), vec![], 0.3));
    }
    let weights = StatWeights::new();

    assert_eq!(calculate_area_upgrade_chance(&agent, "area-1", &weights), 1.0);
    assert_eq!(
        calculate_upgrade_chance(agent.loadouts[0].disc(1), &weights),
        0.3
    );
}

#[tokio::test]
async fn test_catalogue_and_api_feed_the_aggregator() {
    init_tracing();

    let assets = MemoryFetcher::new();
    assets.insert(
        "/zzz/agents-data.json",
        json!({
            "1041": { "id": "1041", "name": "Soldier 11", "rank": 4, "type": 1, "element": 201 }
        }),
    );
    let mut catalogue = GameDataCache::new(assets, "/zzz");
    catalogue.ensure_loaded(Dataset::Agents).await;
    assert_eq!(catalogue.agent("1041").unwrap().element_label(), "Fire");

    let mut store = BuildStore::new(MemoryStorage::new());
    let agent_id = store.add_agent("1041", catalogue.data()).unwrap();
    store
        .update_w_engine(
            &agent_id,
            "default",
            Some(WEngineRef::new("14102", Overclock::new(1).unwrap())),
        )
        .unwrap();

    let api_fetcher = Arc::new(MemoryFetcher::new());
    let api = ApiCache::new(api_fetcher.clone(), Arc::new(ManualClock::new()))
        .with_base_url("https://api.test/zzz")
        .with_ttl(Duration::from_secs(60));
    api_fetcher.insert(
        "https://api.test/zzz/en/weapon/14102.json",
        json!({
            "BaseProperty": { "Value": 48.0 },
            "RandProperty": { "Name": "ATK", "Value": 10.0 },
            "Talents": {
                "1": { "Name": "Metal Cat Claws", "Desc": "ATK +<color=#FFFFFF>10%</color>" }
            }
        }),
    );

    let detail = api.weapon("14102").await.unwrap();
    let equipped = store.agent(&agent_id).unwrap().current_loadout().unwrap().w_engine.clone().unwrap();
    let profile = AgentProfile {
        base_stats: vec![StatValue::new(StatName::Atk, 938.0)],
        w_engine: Some(WEngineProfile::from_detail(
            equipped.id,
            "Steel Cushion",
            &detail,
            equipped.overclock,
        )),
    };

    // Second read is served from the cache.
    api.weapon("14102").await.unwrap();
    assert_eq!(api_fetcher.requests(), 1);

    let agent = store.agent(&agent_id).unwrap();
    let all = get_all_buffs_for_agent(agent, &profile);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "w-engine:14102");
    assert!(active_buffs(agent, &all).is_empty());

    let stats = calculate_agent_stats(agent, &profile, &[]);
    let atk = stats.get(StatName::Atk).unwrap();
    assert_eq!(atk.contributors.len(), 3);
    assert_eq!(atk.total, 938.0 + 713.76 + 25.0);
}

#[tokio::test]
async fn test_missing_catalogue_is_empty_not_fatal() {
    let fetcher = MemoryFetcher::new();
    assert!(fetcher.fetch_json("/agents-data.json").await.is_err());

    let mut catalogue = GameDataCache::new(fetcher, "/assets/");
    catalogue.ensure_all_loaded().await;
    assert!(catalogue.is_loaded(Dataset::Agents));
    assert!(catalogue.all_agents().is_empty());
    assert!(catalogue.all_w_engines().is_empty());
}
