//! Spaceship Merge headless driver
//!
//! Plays a few games with a random aiming policy and prints the results.
//!
//! Usage: `spaceship-merge [settings.json] [seed]`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use spaceship_merge::consts::TICK_INTERVAL_MS;
use spaceship_merge::sim::{Board, Engine, ScaledFootprints, SeededTiers};
use spaceship_merge::{HighScores, Settings};

const BOARD_WIDTH: f32 = 1080.0;
const BOARD_HEIGHT: f32 = 1920.0;
const TOP_BAR: f32 = 150.0;
/// Tiers with art available
const TIER_COUNT: u32 = 11;

const GAMES: usize = 5;
/// Ticks to wait between launches so ships can settle
const LAUNCH_INTERVAL: u64 = 40;
/// Upper bound on a single game (about 10 minutes at 30ms per tick)
const MAX_TICKS: u64 = 20_000;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = args
        .next()
        .map(Settings::load_or_default)
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    log::info!("Spaceship Merge (headless) starting with seed {}", seed);

    let mut engine = Engine::new(
        Board::new(BOARD_WIDTH, BOARD_HEIGHT, TOP_BAR),
        ScaledFootprints::uniform(BOARD_WIDTH, TIER_COUNT),
        SeededTiers::new(seed),
        settings,
    );
    let mut aim = Pcg32::seed_from_u64(seed ^ 0x5eed);
    let mut scores = HighScores::new();

    for game in 0..GAMES {
        if game > 0 {
            engine.reset();
        }
        let mut ticks = 0;
        while !engine.is_game_over() && ticks < MAX_TICKS {
            if ticks % LAUNCH_INTERVAL == 0 && engine.is_ready_to_launch() {
                engine.set_armed_ship_x(aim.random_range(0.0..BOARD_WIDTH));
                engine.launch();
            }
            engine.tick();
            ticks += 1;
        }
        log::info!(
            "Game {} finished after {} ticks (~{}s): score {}, max tier {}",
            game + 1,
            ticks,
            ticks * TICK_INTERVAL_MS / 1000,
            engine.score(),
            engine.max_tier()
        );
        scores.record_run(&engine, ticks);
    }

    println!("High scores:");
    for (rank, entry) in scores.entries.iter().enumerate() {
        println!(
            "{:>2}. {:>8}  tier {:>2}  {} ticks",
            rank + 1,
            entry.score,
            entry.max_tier,
            entry.ticks
        );
    }

    match serde_json::to_string_pretty(&engine.ships()) {
        Ok(json) => println!("Last frame:\n{}", json),
        Err(e) => log::warn!("Could not serialize last frame: {}", e),
    }
}
