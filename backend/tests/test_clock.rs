//! Tests for GameClock

use facility_sim_core_rs::GameClock;

#[test]
fn test_clock_starts_at_zero() {
    let clock = GameClock::new(50);
    assert_eq!(clock.now(), 0);
    assert_eq!(clock.ticks_elapsed(), 0);
}

#[test]
fn test_advance_returns_new_time() {
    let mut clock = GameClock::new(50);

    assert_eq!(clock.advance(), 50);
    assert_eq!(clock.advance(), 100);
    assert_eq!(clock.now(), 100);
    assert_eq!(clock.ticks_elapsed(), 2);
}

#[test]
fn test_tick_interval_accessor() {
    let clock = GameClock::new(100);
    assert_eq!(clock.tick_interval(), 100);
}

#[test]
fn test_many_ticks() {
    let mut clock = GameClock::new(50);
    for _ in 0..1000 {
        clock.advance();
    }
    assert_eq!(clock.now(), 50_000);
    assert_eq!(clock.ticks_elapsed(), 1000);
}
