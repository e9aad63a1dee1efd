//! End-to-end hold lifecycle scenarios.
//!
//! Each test walks a full payer/payee/notary interaction through the public
//! engine surface and checks balances, statuses, and outcome records after
//! every step.

use std::sync::Arc;
use std::thread;

use holdable_core::{
    Expiration, HoldEngine, HoldError, HoldStatus, ManualClock, SharedHoldEngine, ValidationError,
};

const PAYER: &str = "payer";
const PAYEE: &str = "payee";
const NOTARY: &str = "notary";
const OPERATOR: &str = "operator";
const BYSTANDER: &str = "bystander";

const ONE_DAY: u64 = 60 * 60 * 24;
const T0: u64 = 1_700_000_000;

fn setup() -> (Arc<ManualClock>, HoldEngine) {
    let clock = Arc::new(ManualClock::new(T0));
    let mut engine = HoldEngine::new(clock.clone());
    engine.mint(PAYER, 3).unwrap();
    (clock, engine)
}

#[test]
fn perpetual_hold_released_by_notary() {
    let (_, mut engine) = setup();

    let created = engine.hold(PAYER, "op-1", PAYEE, NOTARY, 1, 0).unwrap();
    assert_eq!(created.expiration, Expiration::Never);
    assert_eq!(created.value, 1);
    assert_eq!(engine.balance_of(PAYER), 2);
    assert_eq!(engine.balance_on_hold(PAYER), 1);

    let released = engine.release_hold(NOTARY, "op-1").unwrap();
    assert_eq!(released.status, HoldStatus::ReleasedByNotary);
    assert_eq!(engine.balance_of(PAYER), 3);
    assert_eq!(engine.balance_on_hold(PAYER), 0);
}

#[test]
fn full_execution_pays_the_payee() {
    let (_, mut engine) = setup();
    engine.hold(PAYER, "op-1", PAYEE, NOTARY, 3, ONE_DAY).unwrap();

    let executed = engine.execute_hold(NOTARY, "op-1", 3).unwrap();
    assert_eq!(executed.held_value, 3);
    assert_eq!(executed.transferred_value, 3);
    assert_eq!(engine.balance_of(PAYER), 0);
    assert_eq!(engine.balance_of(PAYEE), 3);
    assert_eq!(
        engine.retrieve_hold("op-1").unwrap().status,
        HoldStatus::Executed
    );
}

#[test]
fn partial_execution_returns_the_remainder() {
    let (_, mut engine) = setup();
    engine.hold(PAYER, "op-1", PAYEE, NOTARY, 3, ONE_DAY).unwrap();

    let executed = engine.execute_hold(NOTARY, "op-1", 1).unwrap();
    assert_eq!(executed.held_value, 3);
    assert_eq!(executed.transferred_value, 1);
    // The remaining 2 come back to the payer.
    assert_eq!(engine.balance_of(PAYER), 2);
    assert_eq!(engine.balance_of(PAYEE), 1);
    assert_eq!(
        engine.retrieve_hold("op-1").unwrap().status,
        HoldStatus::Executed
    );
}

#[test]
fn staged_execution_keeps_the_hold_open_until_closed() {
    let (_, mut engine) = setup();
    engine.hold(PAYER, "op-1", PAYEE, NOTARY, 3, ONE_DAY).unwrap();

    let first = engine.execute_hold_and_keep_open(NOTARY, "op-1", 1).unwrap();
    assert_eq!(first.held_value, 3);
    assert_eq!(first.transferred_value, 1);
    assert_eq!(engine.balance_on_hold(PAYER), 2);
    let hold = engine.retrieve_hold("op-1").unwrap();
    assert_eq!(hold.value, 2);
    assert_eq!(hold.status, HoldStatus::ExecutedAndKeptOpen);

    let second = engine.execute_hold(NOTARY, "op-1", 2).unwrap();
    assert_eq!(second.held_value, 2);
    assert_eq!(second.transferred_value, 2);
    assert_eq!(engine.balance_on_hold(PAYER), 0);
    assert_eq!(engine.balance_of(PAYEE), 3);
    assert_eq!(
        engine.retrieve_hold("op-1").unwrap().status,
        HoldStatus::Executed
    );
}

#[test]
fn expired_hold_is_releasable_by_anyone() {
    let (clock, mut engine) = setup();
    engine.hold(PAYER, "op-1", PAYEE, NOTARY, 1, ONE_DAY).unwrap();

    // Before expiration a bystander cannot release.
    assert!(engine.release_hold(BYSTANDER, "op-1").is_err());

    clock.advance(ONE_DAY);
    let released = engine.release_hold(BYSTANDER, "op-1").unwrap();
    assert_eq!(released.status, HoldStatus::ReleasedByExpiration);
    assert_eq!(engine.balance_of(PAYER), 3);
}

#[test]
fn operator_creates_holds_until_revoked() {
    let (_, mut engine) = setup();

    engine.authorize_hold_operator(PAYER, OPERATOR).unwrap();
    let created = engine
        .hold_from(OPERATOR, "op-1", PAYER, PAYEE, NOTARY, 1, 0)
        .unwrap();
    assert_eq!(created.issuer, OPERATOR);
    assert_eq!(created.payer, PAYER);

    engine.revoke_hold_operator(PAYER, OPERATOR).unwrap();
    let denied = engine.hold_from(OPERATOR, "op-2", PAYER, PAYEE, NOTARY, 1, 0);
    assert!(denied.is_err());
    assert!(!engine.is_hold_operator_for(OPERATOR, PAYER));
}

#[test]
fn operation_ids_stay_consumed_across_the_whole_lifecycle() {
    let (_, mut engine) = setup();
    engine.hold(PAYER, "op-1", PAYEE, NOTARY, 1, ONE_DAY).unwrap();
    engine.release_hold(NOTARY, "op-1").unwrap();

    // Terminal history stays queryable and the id is gone for good.
    assert_eq!(
        engine.retrieve_hold("op-1").unwrap().status,
        HoldStatus::ReleasedByNotary
    );
    assert!(matches!(
        engine.hold(PAYER, "op-1", PAYEE, NOTARY, 1, 0),
        Err(HoldError::Validation(
            ValidationError::DuplicateOperationId { .. }
        ))
    ));
}

#[test]
fn shared_engine_keeps_readers_consistent_with_one_writer() {
    let clock = Arc::new(ManualClock::new(T0));
    let mut engine = HoldEngine::new(clock);
    engine.mint(PAYER, 1_000).unwrap();
    let shared = SharedHoldEngine::new(engine);

    thread::scope(|scope| {
        let writer = shared.clone();
        scope.spawn(move || {
            for i in 0..100 {
                let id = format!("op-{i}");
                let mut engine = writer.write();
                engine.hold(PAYER, &id, PAYEE, NOTARY, 5, 0).unwrap();
                if i % 2 == 0 {
                    engine.release_hold(NOTARY, &id).unwrap();
                } else {
                    engine.execute_hold(NOTARY, &id, 5).unwrap();
                }
            }
        });

        for _ in 0..4 {
            let reader = shared.clone();
            scope.spawn(move || {
                for _ in 0..200 {
                    let engine = reader.read();
                    // Each snapshot observes the accounting identity.
                    assert_eq!(
                        engine.balance_of(PAYER) + engine.balance_on_hold(PAYER),
                        engine.net_balance_of(PAYER)
                    );
                    assert_eq!(
                        engine.total_supply_on_hold(),
                        engine.balance_on_hold(PAYER)
                    );
                }
            });
        }
    });

    let engine = shared.read();
    assert_eq!(engine.balance_on_hold(PAYER), 0);
    assert_eq!(engine.balance_of(PAYER), 750);
    assert_eq!(engine.balance_of(PAYEE), 250);
}
