//! Replays the bundled scenario file through the CLI runner

use pool_config::EngineConfig;
use pool_engine::{EngineState, Scenario, ScenarioRunner};
use std::path::PathBuf;

fn reference_scenario() -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/reference_pool.json");
    Scenario::load(&path).unwrap()
}

#[test]
fn reference_scenario_matches_every_expectation() {
    let mut runner = ScenarioRunner::new(&EngineConfig::default());
    let outcomes = runner.run(&reference_scenario());

    for outcome in &outcomes {
        assert!(outcome.matched, "step {} ({}) did not match: {:?}", outcome.step, outcome.op, outcome);
    }

    let pool_id = runner.pool_id("main").unwrap();
    let ledger = runner.engine().pool(pool_id).unwrap();
    assert_eq!(ledger.config.fee_bps, 500);
    assert_eq!(ledger.reserves.lp_supply, 500_000_000000);
    assert!(!ledger.config.locked);
    assert!(runner.engine().reconcile(pool_id).is_ok());

    let last = outcomes.last().unwrap();
    assert_eq!(last.result.as_ref().unwrap()["balance"], 500_000_000000u64);
}

#[test]
fn state_file_resumes_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let config = EngineConfig::default();

    let mut first = ScenarioRunner::new(&config);
    first.run(&reference_scenario());
    first.state().save(&state_path).unwrap();

    let mut second = ScenarioRunner::from_state(&config, EngineState::load(&state_path).unwrap()).unwrap();
    let follow_up = Scenario::from_json(
        r#"[
            { "op": "initialize", "pool": "again", "initializer": "initializer",
              "mint_x": "x", "mint_y": "y", "seed": 42, "expect": "PoolAlreadyExists" },
            { "op": "swap", "pool": "main", "user": "initializer",
              "is_x_to_y": false, "amount_in": 1000000, "min_out": 1 },
            { "op": "withdraw", "pool": "main", "user": "initializer",
              "amount": 500000000000, "min_x": 0, "min_y": 0 }
        ]"#,
    )
    .unwrap();
    let outcomes = second.run(&follow_up);
    assert!(outcomes.iter().all(|o| o.matched), "{:?}", outcomes);

    let pool_id = second.pool_id("main").unwrap();
    let reserves = second.engine().pool(pool_id).unwrap().reserves;
    assert_eq!((reserves.reserve_x, reserves.reserve_y, reserves.lp_supply), (0, 0, 0));

    // A new pool after restore gets a fresh id
    let next = Scenario::from_json(
        r#"[{ "op": "initialize", "pool": "second", "initializer": "initializer",
              "mint_x": "y", "mint_y": "x", "seed": 42 }]"#,
    )
    .unwrap();
    assert!(second.run(&next)[0].ok);
    assert_ne!(second.pool_id("second"), second.pool_id("main"));
}
