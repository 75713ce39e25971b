//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data (plus `serde` derives), so it can be shared by
//! the pure resolver, the paced driver and any renderer that consumes events.
//!
//! # Board Geometry
//!
//! Cells are addressed with axial hex coordinates `(q, r)`. A board of radius
//! `R` contains every coordinate with `max(|q|, |r|, |q + r|) <= R`:
//!
//! | Radius | Cells |
//! |--------|-------|
//! | 2 | 19 |
//! | 3 | 37 |
//! | 4 | 61 |
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `ELIMINATION_THRESHOLD` | 10 | Top run length that gets removed |
//! | `MAX_CASCADE_STEPS` | 100 | Circuit breaker for one resolution pass |
//! | `DEFAULT_REVEAL_BONUS` | 150 | Destination bonus per connectable revealed color |
//! | `ELIMINATION_PRIORITY` | 1000 | Destination score when the merge reaches the threshold |
//! | `CENTER_BONUS` | 5 | Extra points for an elimination gathered into the hub |
//!
//! # Animation Timing
//!
//! Timing values are in milliseconds. They never influence the outcome of a
//! resolution pass; the paced driver uses them to size its pauses.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TRANSFER_ANIM_MS` | 300 | Flight time of one chip |
//! | `GATHER_SETTLE_MS` | 200 | Extra settle time after a gather |
//! | `GATHER_STAGGER_MS` | 20 | Launch offset between gathered chips |
//! | `DUMP_STAGGER_MS` | 30 | Launch offset between dumped chips |
//! | `ELIMINATION_PAUSE_MS` | 300 | Pause after an elimination |
//! | `STEP_PAUSE_MS` | 50 | Pause between queue steps |
//!
//! # Examples
//!
//! ```
//! use hexstack_types::{Color, Hex};
//!
//! let origin = Hex::ORIGIN;
//! assert_eq!(origin.neighbors()[0], Hex::new(1, 0));
//! assert!(Hex::new(2, -2).within_radius(2));
//! assert!(!Hex::new(2, 1).within_radius(2));
//!
//! assert_eq!(Color::from_str("RED"), Some(Color::Red));
//! assert!(!Color::Stone.is_playable());
//! ```

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Top run length that triggers an elimination
pub const ELIMINATION_THRESHOLD: usize = 10;

/// Maximum number of steps in one resolution pass
pub const MAX_CASCADE_STEPS: u32 = 100;

/// Default reveal bonus per matching neighbor of a revealed color
pub const DEFAULT_REVEAL_BONUS: u32 = 150;

/// Destination score awarded when the candidates together reach the threshold
pub const ELIMINATION_PRIORITY: u32 = 1000;

/// Extra points for an elimination produced by gathering into the hub
pub const CENTER_BONUS: u32 = 5;

/// Per-combo-step bonus multiplier (applies from the second elimination of a pass)
pub const COMBO_MULTIPLIER: u32 = 2;

/// Number of pile slots offered to the player
pub const HAND_SIZE: usize = 3;

/// Smallest dealt pile
pub const PILE_MIN_CHIPS: usize = 2;

/// Largest dealt pile
pub const PILE_MAX_CHIPS: usize = 4;

/// Default board radius (19 cells)
pub const DEFAULT_RADIUS: u8 = 2;

/// Default score goal
pub const DEFAULT_GOAL: u32 = 150;

/// Default number of mulligans per game
pub const DEFAULT_MULLIGANS: u32 = 3;

/// Colors available at the start of a game
pub const DEFAULT_STARTING_COLORS: u8 = 3;

/// A new color is unlocked every N placements
pub const COLOR_UNLOCK_INTERVAL: u32 = 10;

/// Display hint for the tallest stack a renderer should expect
pub const DEFAULT_MAX_STACK_HEIGHT: u32 = 15;

/// Flight time of one transferred chip
pub const TRANSFER_ANIM_MS: u32 = 300;

/// Settle time after a gather lands
pub const GATHER_SETTLE_MS: u32 = 200;

/// Launch offset between consecutive gathered chips
pub const GATHER_STAGGER_MS: u32 = 20;

/// Launch offset between consecutive dumped chips
pub const DUMP_STAGGER_MS: u32 = 30;

/// Pause after an elimination effect
pub const ELIMINATION_PAUSE_MS: u32 = 300;

/// Pause between two queue steps
pub const STEP_PAUSE_MS: u32 = 50;

/// Axial hex coordinate.
///
/// The implicit cube coordinate is `s = -q - r`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex { q: 0, r: 0 };

    /// The six neighbor offsets, in the canonical scan order.
    pub const DIRECTIONS: [Hex; 6] = [
        Hex { q: 1, r: 0 },
        Hex { q: 1, r: -1 },
        Hex { q: 0, r: -1 },
        Hex { q: -1, r: 0 },
        Hex { q: -1, r: 1 },
        Hex { q: 0, r: 1 },
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate. Wraps for coordinates far outside any board.
    #[inline]
    pub const fn s(self) -> i32 {
        self.q.wrapping_neg().wrapping_sub(self.r)
    }

    /// All six neighbors in canonical order (regardless of board bounds).
    pub fn neighbors(self) -> [Hex; 6] {
        Self::DIRECTIONS.map(|d| self + d)
    }

    /// Distance from the origin in hex steps.
    pub fn length(self) -> u64 {
        cube_length(i64::from(self.q), i64::from(self.r))
    }

    pub fn distance(self, other: Hex) -> u64 {
        cube_length(
            i64::from(self.q) - i64::from(other.q),
            i64::from(self.r) - i64::from(other.r),
        )
    }

    /// Whether the coordinate lies inside a hexagonal board of `radius`.
    pub fn within_radius(self, radius: u8) -> bool {
        self.length() <= u64::from(radius)
    }
}

// i64 inputs never overflow here: every component fits in 34 bits.
fn cube_length(q: i64, r: i64) -> u64 {
    q.unsigned_abs()
        .max(r.unsigned_abs())
        .max((q + r).unsigned_abs())
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex {
            q: self.q.wrapping_add(other.q),
            r: self.r.wrapping_add(other.r),
        }
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

/// Chip colors.
///
/// The six playable colors are unlocked in declaration order. `Stone` is the
/// sentinel token carried by obstacle cells and is never dealt to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
    Stone,
}

impl Color {
    /// Playable colors in unlock order.
    pub const PLAYABLE: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    pub fn is_playable(self) -> bool {
        !matches!(self, Color::Stone)
    }

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use hexstack_types::Color;
    ///
    /// assert_eq!(Color::from_str("blue"), Some(Color::Blue));
    /// assert_eq!(Color::from_str("Orange"), Some(Color::Orange));
    /// assert_eq!(Color::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            "purple" => Some(Color::Purple),
            "orange" => Some(Color::Orange),
            "stone" => Some(Color::Stone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
            Color::Stone => "stone",
        }
    }

    /// RGB hex code a renderer can paint the chip with.
    pub fn hex_code(&self) -> &'static str {
        match self {
            Color::Red => "#ef4444",
            Color::Green => "#22c55e",
            Color::Blue => "#3b82f6",
            Color::Yellow => "#eab308",
            Color::Purple => "#a855f7",
            Color::Orange => "#f97316",
            Color::Stone => "#57534e",
        }
    }
}

/// Obstacle kinds.
///
/// Every kind currently behaves as an impassable cell; the descriptions record
/// the intended flavor for renderers and level data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Rock,
    Crack,
    Magnet,
    Fan,
    Crystal,
    Valve,
    Portal,
    Toll,
    Fog,
    Core,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 10] = [
        ObstacleKind::Rock,
        ObstacleKind::Crack,
        ObstacleKind::Magnet,
        ObstacleKind::Fan,
        ObstacleKind::Crystal,
        ObstacleKind::Valve,
        ObstacleKind::Portal,
        ObstacleKind::Toll,
        ObstacleKind::Fog,
        ObstacleKind::Core,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rock" => Some(ObstacleKind::Rock),
            "crack" => Some(ObstacleKind::Crack),
            "magnet" => Some(ObstacleKind::Magnet),
            "fan" => Some(ObstacleKind::Fan),
            "crystal" => Some(ObstacleKind::Crystal),
            "valve" => Some(ObstacleKind::Valve),
            "portal" => Some(ObstacleKind::Portal),
            "toll" => Some(ObstacleKind::Toll),
            "fog" => Some(ObstacleKind::Fog),
            "core" => Some(ObstacleKind::Core),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "rock",
            ObstacleKind::Crack => "crack",
            ObstacleKind::Magnet => "magnet",
            ObstacleKind::Fan => "fan",
            ObstacleKind::Crystal => "crystal",
            ObstacleKind::Valve => "valve",
            ObstacleKind::Portal => "portal",
            ObstacleKind::Toll => "toll",
            ObstacleKind::Fog => "fog",
            ObstacleKind::Core => "core",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "Blocks the cell completely.",
            ObstacleKind::Crack => "Absorbs one chip from every pile passing over it.",
            ObstacleKind::Magnet => "Pulls nearby jumps toward itself.",
            ObstacleKind::Fan => "Pushes chips away from its position.",
            ObstacleKind::Crystal => "Locks after three nearby jumps.",
            ObstacleKind::Valve => "Only lets one specific color through.",
            ObstacleKind::Portal => "Teleports chips to its paired portal.",
            ObstacleKind::Toll => "Only lets piles of five or more chips jump.",
            ObstacleKind::Fog => "Hides information about neighboring cells.",
            ObstacleKind::Core => "Moves after every elimination.",
        }
    }
}

/// How a chip transfer came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Neighbor run pulled onto the hub cell
    Gather,
    /// Hub run pushed onto the chosen neighbor
    Dump,
}

/// One chip flying from one cell to another.
///
/// `from_index` / `to_index` are stack positions (0 = bottom) before and after
/// the move. `order` is the launch slot within the batch: 0 flies first and is
/// the chip that was on top of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipTransfer {
    pub kind: TransferKind,
    pub from: Hex,
    pub to: Hex,
    pub color: Color,
    pub from_index: usize,
    pub to_index: usize,
    pub order: usize,
}

/// Why the failsafe scan queued a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailsafeReason {
    PendingElimination,
    FragmentedConnection,
}

/// Events emitted by the resolver for the animation and scoring layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CascadeEvent {
    Transfer(ChipTransfer),
    Eliminated {
        at: Hex,
        color: Color,
        count: usize,
        points: u32,
        combo: u32,
    },
    Won {
        score: u32,
    },
    FailsafeQueued {
        at: Hex,
        reason: FailsafeReason,
    },
}
