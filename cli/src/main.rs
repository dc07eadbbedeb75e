//! Headless session runner
//!
//! Drives the core engine with a naive auto-player so a full session
//! can be watched from a terminal:
//!
//! ```text
//! facility-sim [seed] [ticks] [difficulty]
//! ```

use std::env;
use std::process;

use facility_sim_core_rs::{
    FacilityKind, SessionConfig, SessionController, SessionStatus,
};

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    args.get(index)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Pick a slot for the auto-player
///
/// Prefers Secondary slots, then Primary slots with free neighbors,
/// then any available Primary (eating the adjacency penalty).
fn choose_slot(controller: &SessionController) -> Option<(FacilityKind, usize)> {
    let pool = controller.pool();

    for index in 0..pool.secondary_count() {
        if pool.is_available(FacilityKind::Secondary, index) {
            return Some((FacilityKind::Secondary, index));
        }
    }

    for index in 0..pool.primary_count() {
        if pool.is_available(FacilityKind::Primary, index) && !pool.neighbor_occupied(index) {
            return Some((FacilityKind::Primary, index));
        }
    }

    (0..pool.primary_count())
        .find(|&index| pool.is_available(FacilityKind::Primary, index))
        .map(|index| (FacilityKind::Primary, index))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let seed: u64 = parse_arg(&args, 1, 12345);
    let ticks: u64 = parse_arg(&args, 2, 2000);
    let difficulty: u32 = parse_arg(&args, 3, 1);

    let config = SessionConfig {
        rng_seed: seed,
        starting_difficulty: difficulty,
        ..SessionConfig::default()
    };

    let mut controller = match SessionController::new(config) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };

    println!(
        "running seed={} ticks={} starting difficulty={}",
        seed, ticks, difficulty
    );
    controller.start_at_difficulty(difficulty);

    for _ in 0..ticks {
        let result = controller.tick();

        if controller.session().status == SessionStatus::Playing
            && controller.queue().waiting_count() > 0
        {
            if let Some((kind, index)) = choose_slot(&controller) {
                let _ = controller.apply_assignment(kind, index);
            }
        }

        if result.primary_releases > 0
            || result.timed_out.is_some()
            || result.outages_started > 0
        {
            let session = controller.session();
            println!(
                "t={:>7} score={:>3} lives={} difficulty={} spawn_rate={}",
                result.now, session.score, session.lives, session.difficulty, session.spawn_rate
            );
        }

        if controller.session().status == SessionStatus::GameOver {
            break;
        }
    }

    let session = controller.session();
    println!("---");
    println!(
        "finished: status={:?} score={} lives={} difficulty={}",
        session.status, session.score, session.lives, session.difficulty
    );
    println!(
        "high score={} (new: {}) events logged={}",
        session.high_score,
        session.is_new_high_score,
        controller.event_log().len()
    );
    if let Some(reason) = session.game_over_reason {
        println!("game over reason: {:?}", reason);
    }
}
