//! Tests for the Facility value type

use facility_sim_core_rs::{Facility, FacilityKind};

#[test]
fn test_new_facility_is_available() {
    let facility = Facility::new(FacilityKind::Primary, 3, 4000);

    assert_eq!(facility.kind(), FacilityKind::Primary);
    assert_eq!(facility.index(), 3);
    assert!(facility.is_available());
    assert!(!facility.is_occupied());
    assert!(!facility.is_out_of_order());
    assert!(!facility.has_reward());
    assert_eq!(facility.occupant_id(), None);
    assert_eq!(facility.occupied_at(), None);
}

#[test]
fn test_occupy_stamps_time_and_occupant() {
    let mut facility = Facility::new(FacilityKind::Secondary, 0, 6000);
    facility.occupy(9, 250);

    assert!(facility.is_occupied());
    assert!(!facility.is_available());
    assert_eq!(facility.occupant_id(), Some(9));
    assert_eq!(facility.occupied_at(), Some(250));
}

#[test]
fn test_usage_expiry_boundary_is_inclusive() {
    let mut facility = Facility::new(FacilityKind::Primary, 0, 4000);
    facility.occupy(1, 100);

    assert!(!facility.usage_expired(4099));
    assert!(facility.usage_expired(4100));
    assert_eq!(facility.usage_elapsed(2100), Some(2000));
}

#[test]
fn test_out_of_order_is_idempotent() {
    let mut facility = Facility::new(FacilityKind::Primary, 2, 4000);

    let first = facility.set_out_of_order(true);
    let state_after_first = facility.clone();
    let second = facility.set_out_of_order(true);

    assert_eq!(first, None);
    assert_eq!(second, None);
    assert_eq!(facility.is_out_of_order(), state_after_first.is_out_of_order());
    assert_eq!(facility.is_occupied(), state_after_first.is_occupied());
}

#[test]
fn test_out_of_order_occupied_implies_eviction() {
    let mut facility = Facility::new(FacilityKind::Secondary, 1, 6000);
    facility.occupy(5, 0);

    // The occupant is evicted; the flag lands on a free slot.
    assert_eq!(facility.set_out_of_order(true), Some(5));
    assert!(!facility.is_occupied());
    assert_eq!(facility.occupant_id(), None);

    // Restoration leaves a plain available slot.
    assert_eq!(facility.set_out_of_order(false), None);
    assert!(facility.is_available());
}

#[test]
fn test_release_then_occupy_succeeds() {
    let mut facility = Facility::new(FacilityKind::Primary, 0, 4000);
    facility.occupy(1, 0);
    facility.release();

    assert!(facility.is_available());
    facility.occupy(2, 500);
    assert_eq!(facility.occupant_id(), Some(2));
}
