use super::*;

fn sample_hold() -> Hold {
    Hold::new("issuer", "payer", "payee", "notary", 5, Expiration::Never)
}

#[test]
fn status_codes_match_wire_enum() {
    assert_eq!(HoldStatus::Ordered.code(), 1);
    assert_eq!(HoldStatus::Executed.code(), 2);
    assert_eq!(HoldStatus::ReleasedByNotary.code(), 3);
    assert_eq!(HoldStatus::ReleasedByPayee.code(), 4);
    assert_eq!(HoldStatus::ReleasedByExpiration.code(), 5);
    assert_eq!(HoldStatus::ExecutedAndKeptOpen.code(), 6);
}

#[test]
fn only_ordered_and_kept_open_are_active() {
    assert!(HoldStatus::Ordered.is_active());
    assert!(HoldStatus::ExecutedAndKeptOpen.is_active());
    for status in [
        HoldStatus::Executed,
        HoldStatus::ReleasedByNotary,
        HoldStatus::ReleasedByPayee,
        HoldStatus::ReleasedByExpiration,
    ] {
        assert!(status.is_terminal(), "{status} should be terminal");
    }
}

#[test]
fn perpetual_hold_never_expires() {
    assert!(!Expiration::Never.is_expired_at(u64::MAX));
    assert_eq!(Expiration::Never.as_secs(), 0);
}

#[test]
fn expiration_is_inclusive() {
    let exp = Expiration::At(100);
    assert!(!exp.is_expired_at(99));
    assert!(exp.is_expired_at(100));
    assert!(exp.is_expired_at(101));
}

#[test]
fn zero_duration_means_perpetual() {
    assert_eq!(Expiration::from_duration(1_000, 0), Expiration::Never);
    assert_eq!(Expiration::from_duration(1_000, 60), Expiration::At(1_060));
}

#[test]
fn new_holds_start_ordered() {
    let hold = sample_hold();
    assert_eq!(hold.status, HoldStatus::Ordered);
    assert_eq!(hold.value, 5);
    assert!(!hold.is_expired_at(u64::MAX));
}

#[test]
fn registry_rejects_empty_operation_id() {
    let mut registry = HoldRegistry::new();
    assert_eq!(
        registry.insert("", sample_hold()),
        Err(ValidationError::EmptyOperationId)
    );
    assert!(registry.is_empty());
}

#[test]
fn registry_consumes_operation_ids_permanently() {
    let mut registry = HoldRegistry::new();
    registry.insert("op-1", sample_hold()).unwrap();

    // The id stays consumed even after the hold terminates.
    registry.get_mut("op-1").unwrap().status = HoldStatus::Executed;
    assert_eq!(
        registry.insert("op-1", sample_hold()),
        Err(ValidationError::DuplicateOperationId {
            operation_id: "op-1".to_string()
        })
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn registry_keeps_terminal_holds_queryable() {
    let mut registry = HoldRegistry::new();
    registry.insert("op-1", sample_hold()).unwrap();
    registry.get_mut("op-1").unwrap().status = HoldStatus::ReleasedByNotary;

    let hold = registry.get("op-1").unwrap();
    assert_eq!(hold.status, HoldStatus::ReleasedByNotary);
    assert_eq!(registry.active_count(), 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn registry_sums_active_value_per_payer() {
    let mut registry = HoldRegistry::new();
    registry.insert("op-1", sample_hold()).unwrap();
    registry.insert("op-2", sample_hold()).unwrap();
    let mut other = sample_hold();
    other.payer = "someone-else".to_string();
    registry.insert("op-3", other).unwrap();

    assert_eq!(registry.active_value_for_payer("payer"), 10);
    assert_eq!(registry.active_value_for_payer("someone-else"), 5);

    registry.get_mut("op-1").unwrap().status = HoldStatus::Executed;
    assert_eq!(registry.active_value_for_payer("payer"), 5);
}

#[test]
fn hold_serde_round_trip() {
    let hold = sample_hold();
    let json = serde_json::to_string(&hold).unwrap();
    assert_eq!(serde_json::from_str::<Hold>(&json).unwrap(), hold);
}
