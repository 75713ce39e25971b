//! Headless hexstack runner (default binary).
//!
//! Autoplays one seeded game and prints the final snapshot as JSON.
//!
//! Environment:
//! - `HEXSTACK_CONFIG`: path to a rules JSON file
//! - `HEXSTACK_RADIUS`, `HEXSTACK_GOAL`, `HEXSTACK_REVEAL_BONUS`, `HEXSTACK_MAX_STEPS`: rule overrides
//! - `HEXSTACK_SEED`: dealer seed (default 1)
//! - `HEXSTACK_MAX_MOVES`: placement cap (default 500)
//! - `HEXSTACK_SPEED`: when set, pace the cascade in real time divided by this factor
//! - `RUST_LOG`: log filter, e.g. `hexstack=debug`

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hexstack::core::{GameState, RulesConfig};
use hexstack::engine::{autoplay, autoplay_paced, PacedDriver, PacingConfig};

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("invalid value {raw:?} for {key}")),
        _ => Ok(None),
    }
}

fn load_rules() -> Result<RulesConfig> {
    let mut rules = match env::var("HEXSTACK_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            let path = PathBuf::from(path.trim());
            RulesConfig::from_path(&path)
                .with_context(|| format!("loading rules from {}", path.display()))?
        }
        _ => RulesConfig::default(),
    };
    rules
        .apply_env_overrides()
        .context("applying rule overrides from the environment")?;
    Ok(rules)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let rules = load_rules()?;
    let seed: u32 = env_parse("HEXSTACK_SEED")?.unwrap_or(1);
    let max_moves: u32 = env_parse("HEXSTACK_MAX_MOVES")?.unwrap_or(500);
    let speed: Option<u32> = env_parse("HEXSTACK_SPEED")?;

    info!(
        target: "hexstack::main",
        radius = rules.radius,
        goal = rules.goal,
        seed,
        max_moves,
        paced = speed.is_some(),
        "main.start"
    );

    let mut game = GameState::new(rules, seed).context("building game session")?;

    let snapshot = match speed {
        Some(speed) => {
            let driver = PacedDriver::new(game, PacingConfig::default().with_speed(speed));
            autoplay_paced(&driver, max_moves)
                .await
                .map_err(|err| anyhow::anyhow!("{} ({})", err, err.code()))?;
            let shared = driver.game();
            let state = shared.read().await;
            state.snapshot()
        }
        None => {
            autoplay(&mut game, max_moves)
                .map_err(|err| anyhow::anyhow!("{} ({})", err, err.code()))?;
            game.snapshot()
        }
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
