//! Game state module - one session of the puzzle
//!
//! Ties together the board, pile dealer, scoring and rules. Placement is split
//! into [`GameState::commit_pile`], a series of [`GameState::step_cascade`]
//! calls and [`GameState::finish_resolution`] so that a driver can pause
//! between steps. [`GameState::resolve`] runs the steps back to back.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{Board, BoardError};
use crate::cascade::{Cascade, Resolution, StepReport};
use crate::config::{ConfigError, RulesConfig};
use crate::rng::{Pile, PileDealer};
use crate::scoring::ScoreTracker;
use crate::snapshot::{CellSnapshot, GameSnapshot};
use crate::types::{CascadeEvent, Color, Hex};

const LOG_TARGET: &str = "hexstack::game";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    rules: RulesConfig,
    board: Board,
    scoring: ScoreTracker,
    dealer: PileDealer,
    hand: Vec<Option<Pile>>,
    mulligans: u32,
    moves: u32,
    active_colors: u8,
    status: GameStatus,
    /// Set while a resolution pass is in flight; blocks placements and mulligans.
    resolving: bool,
    /// Monotonic episode id (increments on reset).
    episode_id: u32,
}

impl GameState {
    /// Create a new game with the given rules and RNG seed
    pub fn new(rules: RulesConfig, seed: u32) -> Result<Self, ConfigError> {
        rules.validate()?;

        let mut state = Self {
            board: Board::new(rules.radius),
            scoring: ScoreTracker::new(rules.goal),
            dealer: PileDealer::new(seed),
            hand: vec![None; rules.hand_size],
            mulligans: rules.mulligans,
            moves: 0,
            active_colors: rules.starting_colors,
            status: GameStatus::Playing,
            resolving: false,
            episode_id: 0,
            rules,
        };
        state.place_obstacles();
        state.deal_hand();
        Ok(state)
    }

    /// Start a new episode with the same rules.
    ///
    /// The dealer keeps its stream, so the new episode sees fresh piles.
    pub fn reset(&mut self) {
        self.board.clear();
        self.place_obstacles();
        self.scoring = ScoreTracker::new(self.rules.goal);
        self.mulligans = self.rules.mulligans;
        self.moves = 0;
        self.active_colors = self.rules.starting_colors;
        self.status = GameStatus::Playing;
        self.resolving = false;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.deal_hand();
        info!(target: LOG_TARGET, episode = self.episode_id, "game.reset");
    }

    fn place_obstacles(&mut self) {
        for placement in &self.rules.obstacles {
            if let Err(err) = self.board.place_obstacle(placement.at(), placement.kind) {
                warn!(target: LOG_TARGET, error = %err, "game.obstacle_skipped");
            }
        }
    }

    fn deal_hand(&mut self) {
        for slot in &mut self.hand {
            *slot = Some(self.dealer.deal(self.active_colors));
        }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for level setup and tests
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn scoring(&self) -> &ScoreTracker {
        &self.scoring
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn hand(&self) -> &[Option<Pile>] {
        &self.hand
    }

    pub fn slot(&self, slot: usize) -> Option<&Pile> {
        self.hand.get(slot).and_then(Option::as_ref)
    }

    pub fn mulligans_left(&self) -> u32 {
        self.mulligans
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn active_colors(&self) -> u8 {
        self.active_colors
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.resolving
    }

    /// Playing and no pass in flight
    pub fn is_playable(&self) -> bool {
        self.status == GameStatus::Playing && !self.resolving
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u32 {
        self.dealer.seed()
    }

    /// Commit the pile in `slot` onto `at` and open a resolution pass.
    ///
    /// Only board-level checks happen here; callers validate status, busy flag
    /// and slot first. On error the hand and board are left untouched.
    pub fn commit_pile(&mut self, slot: usize, at: Hex) -> Result<Cascade, BoardError> {
        let pile = self
            .hand
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(BoardError::EmptyPile(at))?;
        if let Err(err) = self.board.place_pile(at, &pile) {
            self.hand[slot] = Some(pile);
            return Err(err);
        }

        self.moves += 1;
        self.maybe_unlock_color();
        if self.hand.iter().all(Option::is_none) {
            self.deal_hand();
        }

        self.resolving = true;
        self.scoring.start_pass();
        debug!(
            target: LOG_TARGET,
            slot,
            at = %at,
            chips = pile.len(),
            moves = self.moves,
            "game.placed"
        );
        Ok(Cascade::from_rules(at, &self.rules))
    }

    fn maybe_unlock_color(&mut self) {
        let interval = self.rules.color_unlock_interval;
        if interval == 0 || self.moves % interval != 0 {
            return;
        }
        if (self.active_colors as usize) < Color::PLAYABLE.len() {
            self.active_colors += 1;
            info!(
                target: LOG_TARGET,
                moves = self.moves,
                colors = self.active_colors,
                "game.color_unlocked"
            );
        }
    }

    /// Advance the open pass by one step
    pub fn step_cascade(&mut self, cascade: &mut Cascade) -> StepReport {
        let report = cascade.advance(&mut self.board, &mut self.scoring);
        self.note_events(&report.events);
        report
    }

    fn note_events(&mut self, events: &[CascadeEvent]) {
        if self.status != GameStatus::Playing {
            return;
        }
        if events.iter().any(|ev| matches!(ev, CascadeEvent::Won { .. })) {
            self.status = GameStatus::Won;
            info!(
                target: LOG_TARGET,
                score = self.scoring.score(),
                goal = self.scoring.goal(),
                moves = self.moves,
                "game.won"
            );
        }
    }

    /// Close the pass: clear the busy flag and check for a full board.
    pub fn finish_resolution(&mut self) -> GameStatus {
        self.resolving = false;
        if self.status == GameStatus::Playing && self.board.is_full() {
            self.status = GameStatus::Lost;
            info!(
                target: LOG_TARGET,
                score = self.scoring.score(),
                moves = self.moves,
                "game.lost"
            );
        }
        self.status
    }

    /// Run an open pass to completion and close it
    pub fn resolve(&mut self, mut cascade: Cascade) -> Resolution {
        let resolution = cascade.run(&mut self.board, &mut self.scoring);
        self.note_events(&resolution.events);
        self.finish_resolution();
        resolution
    }

    /// Re-deal every hand slot. Returns false when not allowed.
    pub fn mulligan(&mut self) -> bool {
        if !self.is_playable() || self.mulligans == 0 {
            return false;
        }
        self.mulligans -= 1;
        self.deal_hand();
        info!(target: LOG_TARGET, left = self.mulligans, "game.mulligan");
        true
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let cells = self
            .board
            .iter()
            .map(|(at, cell)| CellSnapshot {
                q: at.q,
                r: at.r,
                stack: cell.stack().to_vec(),
                obstacle: cell.obstacle_kind(),
            })
            .collect();

        GameSnapshot {
            radius: self.board.radius(),
            cells,
            score: self.scoring.score(),
            goal: self.scoring.goal(),
            current_combo: self.scoring.current_combo(),
            best_combo: self.scoring.best_combo(),
            total_eliminated: self.scoring.total_eliminated(),
            status: self.status,
            busy: self.resolving,
            moves: self.moves,
            hand: self
                .hand
                .iter()
                .map(|slot| slot.as_ref().map(|pile| pile.to_vec()))
                .collect(),
            mulligans: self.mulligans,
            active_colors: self.active_colors,
            episode_id: self.episode_id,
            seed: self.dealer.seed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObstaclePlacement;
    use crate::types::ObstacleKind;

    fn game() -> GameState {
        GameState::new(RulesConfig::default(), 12345).unwrap()
    }

    #[test]
    fn test_new_game_has_full_hand() {
        let state = game();
        assert_eq!(state.hand().len(), 3);
        assert!(state.hand().iter().all(Option::is_some));
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.mulligans_left(), 3);
        assert!(state.is_playable());
    }

    #[test]
    fn test_obstacles_from_rules() {
        let rules = RulesConfig {
            obstacles: vec![ObstaclePlacement {
                q: 1,
                r: 0,
                kind: ObstacleKind::Magnet,
            }],
            ..RulesConfig::default()
        };
        let state = GameState::new(rules, 1).unwrap();
        assert!(state.board().is_obstacle(Hex::new(1, 0)));
        assert_eq!(
            state.board().get(Hex::new(1, 0)).unwrap().obstacle_kind(),
            Some(ObstacleKind::Magnet)
        );
    }

    #[test]
    fn test_commit_sets_busy_and_consumes_slot() {
        let mut state = game();
        let pile = state.slot(0).unwrap().clone();
        let cascade = state.commit_pile(0, Hex::ORIGIN).unwrap();

        assert!(state.is_busy());
        assert!(!state.is_playable());
        assert!(state.slot(0).is_none());
        assert_eq!(state.moves(), 1);
        assert_eq!(state.board().get(Hex::ORIGIN).unwrap().stack(), pile.as_slice());

        state.resolve(cascade);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_failed_commit_restores_slot() {
        let mut state = game();
        let err = state.commit_pile(1, Hex::new(9, 9)).unwrap_err();
        assert_eq!(err, BoardError::OffBoard(Hex::new(9, 9)));
        assert!(state.slot(1).is_some());
        assert_eq!(state.moves(), 0);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_hand_refills_after_last_slot() {
        let mut state = game();
        let targets = [Hex::new(-2, 0), Hex::new(2, 0), Hex::new(0, 2)];
        for (slot, at) in targets.into_iter().enumerate() {
            // Keep the cells apart so nothing merges.
            state.board_mut().clear();
            let cascade = state.commit_pile(slot, at).unwrap();
            state.resolve(cascade);
        }
        assert!(state.hand().iter().all(Option::is_some));
    }

    #[test]
    fn test_color_unlock_every_interval() {
        let rules = RulesConfig {
            color_unlock_interval: 1,
            ..RulesConfig::default()
        };
        let mut state = GameState::new(rules, 3).unwrap();
        assert_eq!(state.active_colors(), 3);
        for slot in 0..3 {
            state.board_mut().clear();
            let cascade = state.commit_pile(slot, Hex::ORIGIN).unwrap();
            state.resolve(cascade);
        }
        assert_eq!(state.active_colors(), 6);

        state.board_mut().clear();
        let cascade = state.commit_pile(0, Hex::ORIGIN).unwrap();
        state.resolve(cascade);
        assert_eq!(state.active_colors(), 6);
    }

    #[test]
    fn test_mulligan_budget() {
        let mut state = game();
        for _ in 0..3 {
            assert!(state.mulligan());
        }
        assert!(!state.mulligan());
        assert_eq!(state.mulligans_left(), 0);
    }

    #[test]
    fn test_full_board_loses() {
        let rules = RulesConfig {
            radius: 1,
            ..RulesConfig::default()
        };
        let mut state = GameState::new(rules, 5).unwrap();
        // Fill all but the center with non-matching single chips.
        let palette = [Color::Red, Color::Green];
        for (i, at) in Hex::ORIGIN.neighbors().into_iter().enumerate() {
            state
                .board_mut()
                .set_stack(at, vec![palette[i % 2]])
                .unwrap();
        }
        state.board_mut().set_stack(Hex::ORIGIN, vec![Color::Blue]).unwrap();
        // Nothing to place on: pretend a pass just ended.
        assert_eq!(state.finish_resolution(), GameStatus::Lost);
        assert!(!state.is_playable());
    }

    #[test]
    fn test_reset_starts_new_episode() {
        let mut state = game();
        let cascade = state.commit_pile(0, Hex::ORIGIN).unwrap();
        state.resolve(cascade);
        state.mulligan();

        state.reset();
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.moves(), 0);
        assert_eq!(state.mulligans_left(), 3);
        assert_eq!(state.board().total_chips(), 0);
        assert!(state.hand().iter().all(Option::is_some));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let state = game();
        let snap = state.snapshot();
        assert_eq!(snap.cells.len(), 19);
        assert_eq!(snap.hand.len(), 3);
        assert_eq!(snap.seed, 12345);
        assert!(snap.playable());
    }
}
