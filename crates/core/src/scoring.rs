//! Scoring module - elimination points, combo streaks and the win signal
//!
//! Point rules:
//! - Every eliminated chip is worth one point.
//! - An elimination produced by gathering into the hub earns `CENTER_BONUS`.
//! - From the second elimination of a pass on, `combo * COMBO_MULTIPLIER` is added.

use serde::{Deserialize, Serialize};

use crate::types::{CENTER_BONUS, COMBO_MULTIPLIER};

/// Points for one elimination.
///
/// `combo` is the pass-local combo counter *after* counting this elimination.
pub fn elimination_points(count: usize, gather_bonus: bool, combo: u32) -> u32 {
    let mut points = count as u32;
    if gather_bonus {
        points += CENTER_BONUS;
    }
    if combo > 1 {
        points += combo * COMBO_MULTIPLIER;
    }
    points
}

/// Result of recording one elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliminationScore {
    pub points: u32,
    pub combo: u32,
    /// True only for the elimination that first reached the goal
    pub won: bool,
}

/// Cumulative score and combo state for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
    goal: u32,
    current_combo: u32,
    best_combo: u32,
    total_eliminated: u32,
    won: bool,
}

impl ScoreTracker {
    pub fn new(goal: u32) -> Self {
        Self {
            score: 0,
            goal,
            current_combo: 0,
            best_combo: 0,
            total_eliminated: 0,
            won: false,
        }
    }

    /// Reset the pass-local combo (called once per resolution pass)
    pub fn start_pass(&mut self) {
        self.current_combo = 0;
    }

    /// Record an elimination of `count` chips.
    ///
    /// The win flag is raised at most once per game; points keep accruing
    /// after it.
    pub fn record_elimination(&mut self, count: usize, gather_bonus: bool) -> EliminationScore {
        self.total_eliminated = self.total_eliminated.saturating_add(count as u32);
        self.current_combo += 1;
        self.best_combo = self.best_combo.max(self.current_combo);

        let points = elimination_points(count, gather_bonus, self.current_combo);
        self.score = self.score.saturating_add(points);

        let won = !self.won && self.score >= self.goal;
        if won {
            self.won = true;
        }

        EliminationScore {
            points,
            combo: self.current_combo,
            won,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn current_combo(&self) -> u32 {
        self.current_combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn total_eliminated(&self) -> u32 {
        self.total_eliminated
    }

    pub fn has_won(&self) -> bool {
        self.won
    }
}

impl Default for ScoreTracker {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_GOAL)
    }
}
