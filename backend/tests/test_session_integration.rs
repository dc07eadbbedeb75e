//! Integration tests for the session controller tick loop
//!
//! These drive full sessions through the public surface: status
//! transitions, spawn cadence, the timeout and scoring rules, the life
//! economy and the deferred adjacency penalty.

use facility_sim_core_rs::{
    AssignmentError, FacilityKind, GameOverReason, OutageConfig, RewardConfig, SessionConfig,
    SessionController, SessionStatus,
};

/// Configuration with the stochastic processes silenced, so gameplay
/// scenarios are exact.
fn quiet_config() -> SessionConfig {
    SessionConfig {
        rng_seed: 42,
        reward: RewardConfig {
            check_interval: 8000,
            probability: 0.0,
        },
        outage: OutageConfig {
            start_difficulty: 99,
            ..OutageConfig::default()
        },
        ..SessionConfig::default()
    }
}

fn controller(config: SessionConfig) -> SessionController {
    SessionController::new(config).unwrap()
}

#[test]
fn test_tick_is_gameplay_noop_in_menu() {
    let mut controller = controller(quiet_config());

    let result = controller.tick();
    assert_eq!(result.spawned, None);
    assert_eq!(result.timed_out, None);
    assert_eq!(controller.session().status, SessionStatus::Menu);
    assert!(controller.queue().is_empty());
    assert!(controller.event_log().is_empty());
}

#[test]
fn test_start_resets_and_spawns_synchronously() {
    let mut controller = controller(quiet_config());
    controller.start();

    let session = controller.session();
    assert_eq!(session.status, SessionStatus::Playing);
    assert_eq!(session.score, 0);
    assert_eq!(session.lives, 3);
    assert_eq!(session.difficulty, 1);
    assert_eq!(controller.queue().len(), 1);
    assert_eq!(controller.event_log().count_of("SessionStarted"), 1);
    assert_eq!(controller.event_log().count_of("OccupantSpawned"), 1);
}

#[test]
fn test_spawn_cadence_follows_spawn_rate() {
    let config = SessionConfig {
        base_spawn_rate: 100,
        min_spawn_rate: 100,
        spawn_rate_step: 0,
        wait_budget: 100_000,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();

    // t=50: below the cadence. t=100: spawn. t=150: below. t=200: spawn.
    assert_eq!(controller.tick().spawned, None);
    assert_eq!(controller.tick().spawned, Some(2));
    assert_eq!(controller.tick().spawned, None);
    assert_eq!(controller.tick().spawned, Some(3));
    assert_eq!(controller.queue().len(), 3);
}

#[test]
fn test_three_timeouts_end_the_session() {
    let config = SessionConfig {
        wait_budget: 100,
        base_spawn_rate: 100,
        min_spawn_rate: 100,
        spawn_rate_step: 0,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();

    for _ in 0..20 {
        let _ = controller.tick();
        if controller.session().status == SessionStatus::GameOver {
            break;
        }
    }

    let session = controller.session();
    assert_eq!(session.status, SessionStatus::GameOver);
    assert_eq!(session.lives, 0);
    assert_eq!(session.game_over_reason, Some(GameOverReason::Timeout));
    assert_eq!(controller.event_log().count_of("LifeLost"), 3);
    assert_eq!(controller.event_log().count_of("SessionEnded"), 1);
}

#[test]
fn test_only_one_timeout_processed_per_tick() {
    let config = SessionConfig {
        wait_budget: 10_000,
        base_spawn_rate: 100,
        min_spawn_rate: 100,
        spawn_rate_step: 0,
        starting_lives: 5,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();

    // Build a backlog of three waiters, then let them all age out
    // through a pause (the clock keeps running while paused).
    for _ in 0..4 {
        let _ = controller.tick();
    }
    assert_eq!(controller.queue().len(), 3);

    controller.pause();
    for _ in 0..250 {
        let _ = controller.tick();
    }
    controller.resume();

    // All three are simultaneously expired; they drain one per tick.
    let _ = controller.tick();
    assert_eq!(controller.session().lives, 4);
    let _ = controller.tick();
    assert_eq!(controller.session().lives, 3);
    let _ = controller.tick();
    assert_eq!(controller.session().lives, 2);
    assert_eq!(controller.session().status, SessionStatus::Playing);
}

fn no_pressure_config() -> SessionConfig {
    // Long budgets and durations: nothing times out or releases on its
    // own, spawns come every tick.
    SessionConfig {
        wait_budget: 100_000,
        primary_usage_duration: 100_000,
        secondary_usage_duration: 100_000,
        base_spawn_rate: 50,
        min_spawn_rate: 50,
        spawn_rate_step: 0,
        ..quiet_config()
    }
}

#[test]
fn test_adjacency_penalty_lands_once_after_the_display_delay() {
    let mut controller = controller(no_pressure_config());
    controller.start();
    let _ = controller.tick(); // second occupant arrives at t=50

    controller
        .apply_assignment(FacilityKind::Primary, 2)
        .unwrap();
    controller
        .apply_assignment(FacilityKind::Primary, 1)
        .unwrap();

    assert_eq!(controller.event_log().count_of("AdjacencyViolation"), 1);
    assert_eq!(controller.session().lives, 3, "penalty must be deferred");

    // Nine ticks reach t=500, one unit short of the penalty.
    for _ in 0..9 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().lives, 3);

    let _ = controller.tick(); // t=550 >= 50 + 500
    assert_eq!(controller.session().lives, 2);

    // Exactly one penalty even though two facilities stay occupied.
    for _ in 0..20 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().lives, 2);
    assert_eq!(controller.event_log().count_of("LifeLost"), 1);
}

#[test]
fn test_milestone_raises_difficulty_and_tightens_spawn_rate() {
    let config = SessionConfig {
        primary_usage_duration: 100,
        secondary_usage_duration: 100,
        wait_budget: 50_000,
        base_spawn_rate: 1000,
        min_spawn_rate: 100,
        spawn_rate_step: 100,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();

    for _ in 0..400 {
        let _ = controller.tick();
        // Serve waiters on non-adjacent slots only.
        for index in [0, 2, 4] {
            if controller.queue().waiting_count() == 0 {
                break;
            }
            if controller.is_assignment_valid(FacilityKind::Primary, index) {
                controller
                    .apply_assignment(FacilityKind::Primary, index)
                    .unwrap();
            }
        }
        if controller.session().score >= 10 {
            break;
        }
    }

    let session = controller.session();
    assert_eq!(session.score, 10);
    assert_eq!(session.difficulty, 2);
    assert_eq!(session.spawn_rate, 900); // max(100, 1000 - 1*100)
    assert_eq!(controller.event_log().count_of("MilestoneReached"), 1);
}

#[test]
fn test_reward_gains_life_before_the_adjacency_consequence() {
    let mut controller = controller(no_pressure_config());
    controller.start();
    let _ = controller.tick();

    controller
        .pool_mut()
        .set_reward(FacilityKind::Primary, 1, true);

    controller
        .apply_assignment(FacilityKind::Primary, 2)
        .unwrap();
    controller
        .apply_assignment(FacilityKind::Primary, 1)
        .unwrap();

    // The reward lands immediately; the flag is gone.
    assert_eq!(controller.session().lives, 4);
    assert!(!controller
        .pool()
        .facility(FacilityKind::Primary, 1)
        .has_reward());

    // And strictly before the violation in the event stream.
    let events = controller.event_log().events();
    let reward_pos = events
        .iter()
        .position(|e| e.event_type() == "RewardClaimed")
        .unwrap();
    let violation_pos = events
        .iter()
        .position(|e| e.event_type() == "AdjacencyViolation")
        .unwrap();
    assert!(reward_pos < violation_pos);

    // After the delay the penalty nets the session back to 3.
    for _ in 0..12 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().lives, 3);
    assert_eq!(controller.event_log().count_of("LifeGained"), 1);
    assert_eq!(controller.event_log().count_of("LifeLost"), 1);
}

#[test]
fn test_pause_freezes_gameplay() {
    let config = SessionConfig {
        base_spawn_rate: 100,
        min_spawn_rate: 100,
        spawn_rate_step: 0,
        wait_budget: 100_000,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();
    controller.pause();

    for _ in 0..10 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().status, SessionStatus::Paused);
    assert_eq!(controller.queue().len(), 1, "no spawns while paused");

    controller.resume();
    let result = controller.tick();
    assert_eq!(result.spawned, Some(2));
    assert_eq!(controller.session().status, SessionStatus::Playing);
}

#[test]
fn test_penalty_is_dropped_when_it_fires_outside_play() {
    let mut controller = controller(no_pressure_config());
    controller.start();
    let _ = controller.tick();

    controller
        .apply_assignment(FacilityKind::Primary, 2)
        .unwrap();
    controller
        .apply_assignment(FacilityKind::Primary, 1)
        .unwrap();

    // Pause inside the delay window; the one-shot still fires on its
    // schedule but lands outside a live session and is dropped.
    controller.pause();
    for _ in 0..30 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().lives, 3);

    controller.resume();
    for _ in 0..30 {
        let _ = controller.tick();
    }
    assert_eq!(controller.session().lives, 3);
    assert_eq!(controller.event_log().count_of("LifeLost"), 0);
}

#[test]
fn test_restart_voids_penalties_from_the_previous_session() {
    let mut controller = controller(no_pressure_config());
    controller.start();
    let _ = controller.tick();

    controller
        .apply_assignment(FacilityKind::Primary, 2)
        .unwrap();
    controller
        .apply_assignment(FacilityKind::Primary, 1)
        .unwrap();

    // Restart before the penalty fires; the new session is live when
    // the stale one-shot lands, and must not be debited.
    controller.start();
    for _ in 0..30 {
        let _ = controller.tick();
    }

    assert_eq!(controller.session().lives, 3);
    assert_eq!(controller.event_log().count_of("LifeLost"), 0);
}

#[test]
fn test_assignment_contention_errors() {
    let mut controller = controller(no_pressure_config());

    assert_eq!(
        controller.apply_assignment(FacilityKind::Primary, 0),
        Err(AssignmentError::SessionNotActive)
    );

    controller.start();
    controller
        .apply_assignment(FacilityKind::Primary, 0)
        .unwrap();

    assert_eq!(
        controller.apply_assignment(FacilityKind::Primary, 0),
        Err(AssignmentError::NotAvailable {
            kind: FacilityKind::Primary,
            index: 0
        })
    );

    // The only occupant is already placed.
    assert_eq!(
        controller.apply_assignment(FacilityKind::Secondary, 0),
        Err(AssignmentError::QueueEmpty)
    );

    assert!(!controller.is_assignment_valid(FacilityKind::Primary, 0));
    assert!(controller.is_assignment_valid(FacilityKind::Primary, 1));
}

#[test]
fn test_start_is_reentrant_after_game_over() {
    let config = SessionConfig {
        wait_budget: 100,
        base_spawn_rate: 100,
        min_spawn_rate: 100,
        spawn_rate_step: 0,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start();

    for _ in 0..20 {
        let _ = controller.tick();
        if controller.session().status == SessionStatus::GameOver {
            break;
        }
    }
    assert_eq!(controller.session().status, SessionStatus::GameOver);

    controller.start();
    let session = controller.session();
    assert_eq!(session.status, SessionStatus::Playing);
    assert_eq!(session.lives, 3);
    assert_eq!(session.score, 0);
    assert_eq!(session.game_over_reason, None);
    assert_eq!(controller.queue().len(), 1);
}

#[test]
fn test_return_to_menu_and_back() {
    let mut controller = controller(no_pressure_config());
    controller.start();
    let _ = controller.tick();

    controller.return_to_menu();
    assert_eq!(controller.session().status, SessionStatus::Menu);

    let result = controller.tick();
    assert_eq!(result.spawned, None);

    controller.start();
    assert_eq!(controller.session().status, SessionStatus::Playing);
    assert_eq!(controller.queue().len(), 1);
}

#[test]
fn test_starting_difficulty_override_shapes_initial_spawn_rate() {
    let config = SessionConfig {
        base_spawn_rate: 1000,
        min_spawn_rate: 100,
        spawn_rate_step: 100,
        ..quiet_config()
    };
    let mut controller = controller(config);
    controller.start_at_difficulty(4);

    let session = controller.session();
    assert_eq!(session.difficulty, 4);
    assert_eq!(session.spawn_rate, 700); // max(100, 1000 - 3*100)
}
