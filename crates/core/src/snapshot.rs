use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::game_state::GameStatus;
use crate::types::{Color, Hex, ObstacleKind};

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub q: i32,
    pub r: i32,
    pub stack: Vec<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle: Option<ObstacleKind>,
}

impl CellSnapshot {
    pub fn at(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub radius: u8,
    /// Every cell in canonical order
    pub cells: Vec<CellSnapshot>,
    pub score: u32,
    pub goal: u32,
    pub current_combo: u32,
    pub best_combo: u32,
    pub total_eliminated: u32,
    pub status: GameStatus,
    pub busy: bool,
    pub moves: u32,
    pub hand: Vec<Option<Vec<Color>>>,
    pub mulligans: u32,
    pub active_colors: u8,
    pub episode_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing && !self.busy
    }

    pub fn cell(&self, at: Hex) -> Option<&CellSnapshot> {
        self.cells.iter().find(|cell| cell.at() == at)
    }

    /// Player chips on the board, obstacle tokens excluded
    pub fn total_chips(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.obstacle.is_none())
            .map(|cell| cell.stack.len())
            .sum()
    }

    /// Deterministic fingerprint of the whole snapshot
    pub fn state_hash(&self) -> u64 {
        let mut hasher = Fnv1aHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GameSnapshot {
        GameSnapshot {
            radius: 1,
            cells: vec![
                CellSnapshot {
                    q: 0,
                    r: 0,
                    stack: vec![Color::Red, Color::Blue],
                    obstacle: None,
                },
                CellSnapshot {
                    q: 1,
                    r: 0,
                    stack: vec![Color::Stone],
                    obstacle: Some(ObstacleKind::Crystal),
                },
            ],
            score: 12,
            goal: 100,
            current_combo: 0,
            best_combo: 1,
            total_eliminated: 10,
            status: GameStatus::Playing,
            busy: false,
            moves: 4,
            hand: vec![Some(vec![Color::Green, Color::Green]), None, None],
            mulligans: 3,
            active_colors: 3,
            episode_id: 0,
            seed: 7,
        }
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.state_hash(), b.state_hash());

        b.cells[0].stack.push(Color::Red);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_json_round_trip_and_helpers() {
        let snap = sample();
        let json = serde_json::to_string(&snap).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);

        assert!(snap.playable());
        assert_eq!(snap.total_chips(), 2);
        assert_eq!(
            snap.cell(Hex::new(1, 0)).and_then(|c| c.obstacle),
            Some(ObstacleKind::Crystal)
        );
    }
}
