//! Rules configuration
//!
//! Loaded from JSON (every field optional) with environment variable
//! overrides. The elimination threshold is a constant and cannot be set here.

use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    Color, Hex, ObstacleKind, COLOR_UNLOCK_INTERVAL, DEFAULT_GOAL, DEFAULT_MAX_STACK_HEIGHT,
    DEFAULT_MULLIGANS, DEFAULT_RADIUS, DEFAULT_REVEAL_BONUS, DEFAULT_STARTING_COLORS, HAND_SIZE,
    MAX_CASCADE_STEPS,
};

pub const ENV_RADIUS: &str = "HEXSTACK_RADIUS";
pub const ENV_GOAL: &str = "HEXSTACK_GOAL";
pub const ENV_REVEAL_BONUS: &str = "HEXSTACK_REVEAL_BONUS";
pub const ENV_MAX_STEPS: &str = "HEXSTACK_MAX_STEPS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse rules config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read rules config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("radius must be at least 1")]
    ZeroRadius,
    #[error("goal must be at least 1")]
    ZeroGoal,
    #[error("max_steps must be at least 1")]
    ZeroMaxSteps,
    #[error("starting_colors must be within 1..=6, got {0}")]
    StartingColors(u8),
    #[error("hand_size must be within 1..=3, got {0}")]
    HandSize(usize),
    #[error("obstacle at {0} is outside the board")]
    ObstacleOffBoard(Hex),
    #[error("more than one obstacle at {0}")]
    DuplicateObstacle(Hex),
}

/// An obstacle placed at level setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    pub q: i32,
    pub r: i32,
    pub kind: ObstacleKind,
}

impl ObstaclePlacement {
    pub fn at(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// Rules for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub radius: u8,
    pub goal: u32,
    pub reveal_bonus: u32,
    /// Circuit breaker for one resolution pass
    pub max_steps: u32,
    /// Display hint only; stacks are never capped
    pub max_stack_height: u32,
    pub starting_colors: u8,
    /// One more color unlocks every this many moves (0 disables unlocking)
    pub color_unlock_interval: u32,
    pub mulligans: u32,
    pub hand_size: usize,
    pub obstacles: Vec<ObstaclePlacement>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            goal: DEFAULT_GOAL,
            reveal_bonus: DEFAULT_REVEAL_BONUS,
            max_steps: MAX_CASCADE_STEPS,
            max_stack_height: DEFAULT_MAX_STACK_HEIGHT,
            starting_colors: DEFAULT_STARTING_COLORS,
            color_unlock_interval: COLOR_UNLOCK_INTERVAL,
            mulligans: DEFAULT_MULLIGANS,
            hand_size: HAND_SIZE,
            obstacles: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Difficulty preset for a board size.
    ///
    /// Radius 2, 3 and 4 carry their own goal and stack height hint; any
    /// other radius uses the defaults.
    pub fn for_radius(radius: u8) -> Self {
        let (goal, max_stack_height) = match radius {
            2 => (100, 25),
            3 => (200, 20),
            4 => (300, 15),
            _ => (DEFAULT_GOAL, DEFAULT_MAX_STACK_HEIGHT),
        };
        Self {
            radius,
            goal,
            max_stack_height,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Preset chosen by `HEXSTACK_RADIUS` (default radius otherwise), then
    /// the remaining environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides_with(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_with(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// A radius override switches to that radius' preset before the other
    /// keys are applied, so an explicit goal still wins.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(radius) = parse_override::<u8, _>(&lookup, ENV_RADIUS)? {
            let preset = Self::for_radius(radius);
            self.radius = preset.radius;
            self.goal = preset.goal;
            self.max_stack_height = preset.max_stack_height;
        }
        if let Some(goal) = parse_override(&lookup, ENV_GOAL)? {
            self.goal = goal;
        }
        if let Some(bonus) = parse_override(&lookup, ENV_REVEAL_BONUS)? {
            self.reveal_bonus = bonus;
        }
        if let Some(steps) = parse_override(&lookup, ENV_MAX_STEPS)? {
            self.max_steps = steps;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        if self.goal == 0 {
            return Err(ConfigError::ZeroGoal);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if self.starting_colors == 0 || self.starting_colors as usize > Color::PLAYABLE.len() {
            return Err(ConfigError::StartingColors(self.starting_colors));
        }
        if self.hand_size == 0 || self.hand_size > HAND_SIZE {
            return Err(ConfigError::HandSize(self.hand_size));
        }

        let mut seen = HashSet::with_capacity(self.obstacles.len());
        for placement in &self.obstacles {
            let at = placement.at();
            if !at.within_radius(self.radius) {
                return Err(ConfigError::ObstacleOffBoard(at));
            }
            if !seen.insert(at) {
                return Err(ConfigError::DuplicateObstacle(at));
            }
        }
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { key, value: raw })
}
