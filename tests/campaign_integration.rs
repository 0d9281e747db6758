//! Orchestrator integration tests
//!
//! Several game turns of detection, resolution and casualty removal against
//! a caller-owned ship list.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use star_armada::campaign::{apply_casualties, CombatOrchestrator, ResolutionMode};
use star_armada::combat::{Combatant, FactionRelations, Outcome, Relation, ShipClass, Side};
use star_armada::core::config::CombatConfig;
use star_armada::core::types::{CombatantId, FactionId, Vec2};

fn ship(id: u32, faction: u32, class: ShipClass, x: f32, y: f32) -> Combatant {
    Combatant::from_class(
        CombatantId::new(id),
        FactionId::new(faction),
        Vec2::new(x, y),
        class,
    )
}

fn total_war(factions: &[u32]) -> FactionRelations {
    let mut relations = FactionRelations::new();
    for (i, a) in factions.iter().enumerate() {
        for b in &factions[i + 1..] {
            relations.set(FactionId(*a), FactionId(*b), Relation::War);
        }
    }
    relations
}

#[test]
fn test_turns_until_the_dust_settles() {
    let mut orchestrator = CombatOrchestrator::new();
    let relations = total_war(&[0, 1]);
    let mut store = vec![
        ship(1, 0, ShipClass::Cruiser, 0.0, 0.0),
        ship(2, 0, ShipClass::Fighter, 10.0, 0.0),
        ship(3, 1, ShipClass::Fighter, 0.0, 10.0),
        ship(4, 1, ShipClass::Scout, 5.0, 5.0),
        // Far away, never fights
        ship(5, 1, ShipClass::Scout, 1000.0, 1000.0),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let report = orchestrator.process(&store, &relations, &mut rng);
    assert_eq!(report.battles_started, 1);
    assert_eq!(report.battles_resolved, 1);

    let battle = &report.reports[0];
    assert_eq!(battle.mode, ResolutionMode::Strategic);
    assert_ne!(battle.result.outcome, Outcome::NoBattle);

    let removed = apply_casualties(&mut store, &report);
    assert_eq!(removed, report.casualties.len());
    assert!(store.iter().all(|s| !report.casualties.contains(&s.id)));
    assert!(store.iter().any(|s| s.id == CombatantId(5)));

    // Hit points carried back into the store
    for survivor in battle
        .result
        .initiator_survivors
        .iter()
        .chain(&battle.result.responder_survivors)
    {
        let stored = store
            .iter()
            .find(|s| s.id == survivor.id)
            .expect("survivor kept");
        assert_eq!(stored.hp, survivor.hp);
    }

    // One side is gone from the cell, so the next turn is quiet
    let report = orchestrator.process(&store, &relations, &mut rng);
    assert_eq!(report.battles_started, 0);
    assert_eq!(orchestrator.turn(), 2);
}

/// Three warring factions in one cell: overlapping encounters resolve in
/// order, and a unit destroyed in the first is absent from the later ones
#[test]
fn test_three_way_war_is_deterministic() {
    let relations = total_war(&[0, 1, 2]);
    let store = vec![
        ship(1, 0, ShipClass::Battleship, 0.0, 0.0),
        ship(2, 0, ShipClass::Battleship, 0.0, 0.0),
        ship(3, 1, ShipClass::Scout, 0.0, 0.0),
        ship(4, 2, ShipClass::Fighter, 0.0, 0.0),
    ];

    let run = |seed| {
        let mut orchestrator = CombatOrchestrator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        orchestrator.process(&store, &relations, &mut rng)
    };

    let report = run(5);
    assert_eq!(report, run(5));
    assert_eq!(report.battles_started, 3);

    let pairs: Vec<(FactionId, FactionId)> = report
        .reports
        .iter()
        .map(|r| (r.key.initiator, r.key.responder))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (FactionId(0), FactionId(1)),
            (FactionId(0), FactionId(2)),
            (FactionId(1), FactionId(2)),
        ]
    );

    // The scout cannot survive two battleships, so the last pairing has
    // nobody on the initiator side
    assert!(report.casualties.contains(&CombatantId(3)));
    assert_eq!(report.reports[2].result.outcome, Outcome::NoBattle);

    // Casualty list is sorted and free of duplicates
    let mut sorted = report.casualties.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, report.casualties);
}

#[test]
fn test_player_engagement_lifecycle() {
    let mut orchestrator = CombatOrchestrator::new();
    orchestrator.set_interactive(FactionId(0), true);
    let relations = total_war(&[0, 1]);
    let store = vec![
        ship(1, 0, ShipClass::Scout, 200.0, 200.0),
        ship(2, 0, ShipClass::Scout, 200.0, 200.0),
        ship(3, 1, ShipClass::Cruiser, 210.0, 195.0),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    let report = orchestrator.process(&store, &relations, &mut rng);
    assert_eq!(report.battles_started, 1);
    assert_eq!(report.battles_resolved, 0);
    assert!(report.casualties.is_empty());

    let (key, engagement) = orchestrator
        .engagement_at(Vec2::new(190.0, 190.0), 100.0)
        .expect("player engagement nearby");
    assert_eq!(engagement.controlled_side(), Some(Side::Initiator));
    let holder = engagement.current_unit().expect("player unit holds the turn");
    assert_eq!(holder.side, Side::Initiator);

    // Player fights a couple of rounds, then the engine is left alone for a
    // turn, then the player finishes it automatically
    {
        let engagement = orchestrator.engagement_mut(&key).expect("tracked");
        engagement.advance_round();
        engagement.advance_round();
    }
    let report = orchestrator.process(&store, &relations, &mut rng);
    assert_eq!(report.battles_started, 0);

    let engagement = orchestrator.engagement_mut(&key).expect("tracked");
    let result = engagement.auto_resolve();
    assert!(result.rounds <= 50);

    let report = orchestrator.process(&store, &relations, &mut rng);
    assert_eq!(report.battles_resolved, 1);
    assert_eq!(report.reports[0].mode, ResolutionMode::Tactical);
    assert_eq!(report.reports[0].result, result);
    assert!(orchestrator.engagement(&key).is_none());
    assert_eq!(orchestrator.recent_reports(10).len(), 1);
}

#[test]
fn test_oversized_fleet_falls_back_to_strategic() {
    let mut config = CombatConfig::default();
    config.arena.width = 6;
    config.arena.height = 2;
    let mut orchestrator = CombatOrchestrator::with_config(config).expect("valid config");
    orchestrator.set_interactive(FactionId(1), true);

    // Seven scouts do not fit in a 3x2 half arena
    let mut store: Vec<Combatant> = (0..7).map(|i| ship(i, 0, ShipClass::Scout, 0.0, 0.0)).collect();
    store.push(ship(100, 1, ShipClass::Battleship, 0.0, 0.0));

    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let report = orchestrator.process(&store, &total_war(&[0, 1]), &mut rng);

    assert_eq!(report.battles_resolved, 1);
    assert_eq!(report.reports[0].mode, ResolutionMode::Strategic);
    assert!(orchestrator.active_engagements().is_empty());
}

#[test]
fn test_config_file_round_trip() {
    let config = CombatConfig::from_toml_str(
        r#"
        encounter_cell_size = 100.0
        max_rounds = 10

        [arena]
        width = 10
        height = 6
        "#,
    )
    .expect("valid config");

    let mut orchestrator = CombatOrchestrator::with_config(config).expect("valid config");
    assert_eq!(orchestrator.config().max_rounds, 10);

    // 40 units apart: separate cells at size 50, same cell at size 100
    let store = vec![
        ship(1, 0, ShipClass::ColonyShip, 0.0, 0.0),
        ship(2, 1, ShipClass::ColonyShip, 40.0, 0.0),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = orchestrator.process(&store, &total_war(&[0, 1]), &mut rng);

    assert_eq!(report.battles_resolved, 1);
    let result = &report.reports[0].result;
    assert_eq!(result.outcome, Outcome::Timeout);
    assert_eq!(result.rounds, 10);
    assert!(result.is_draw());
}
