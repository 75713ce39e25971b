//! Headless autoplay: first non-empty slot onto the first empty cell.

use tracing::{info, warn};

use hexstack_core::types::Hex;
use hexstack_core::{GameState, GameStatus, Resolution, Termination};

use crate::driver::PacedDriver;
use crate::place::{apply_place, PlaceError};

/// Totals over one autoplayed game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoplaySummary {
    pub moves: u32,
    pub eliminated: usize,
    pub points: u32,
    pub step_limit_passes: u32,
    pub aborted_passes: u32,
}

impl AutoplaySummary {
    fn record(&mut self, resolution: &Resolution) {
        self.moves += 1;
        self.eliminated += resolution.eliminated;
        self.points += resolution.points;
        match resolution.termination {
            Termination::Settled => {}
            Termination::StepLimit => self.step_limit_passes += 1,
            Termination::Aborted => self.aborted_passes += 1,
        }
    }
}

/// The move autoplay would make next, if any
pub fn next_move(state: &GameState) -> Option<(usize, Hex)> {
    if !state.is_playable() {
        return None;
    }
    let slot = state.hand().iter().position(Option::is_some)?;
    let at = state.board().empty_coords().next()?;
    Some((slot, at))
}

/// Play until the game ends or `max_moves` placements were made.
pub fn autoplay(state: &mut GameState, max_moves: u32) -> Result<AutoplaySummary, PlaceError> {
    let mut summary = AutoplaySummary::default();
    while summary.moves < max_moves {
        let Some((slot, at)) = next_move(state) else {
            break;
        };
        let resolution = apply_place(state, slot, at)?;
        summary.record(&resolution);
    }
    log_summary(&summary, state.status(), state.score());
    Ok(summary)
}

/// Same as [`autoplay`], through a paced driver
pub async fn autoplay_paced(
    driver: &PacedDriver,
    max_moves: u32,
) -> Result<AutoplaySummary, PlaceError> {
    let game = driver.game();
    let mut summary = AutoplaySummary::default();
    while summary.moves < max_moves {
        let next = next_move(&*game.read().await);
        let Some((slot, at)) = next else {
            break;
        };
        let resolution = driver.place(slot, at).await?;
        summary.record(&resolution);
    }

    let state = game.read().await;
    log_summary(&summary, state.status(), state.score());
    Ok(summary)
}

fn log_summary(summary: &AutoplaySummary, status: GameStatus, score: u32) {
    if summary.aborted_passes > 0 {
        warn!(
            target: "hexstack::autoplay",
            aborted = summary.aborted_passes,
            "autoplay.aborted_passes"
        );
    }
    info!(
        target: "hexstack::autoplay",
        moves = summary.moves,
        status = ?status,
        score,
        eliminated = summary.eliminated,
        step_limit_passes = summary.step_limit_passes,
        "autoplay.finished"
    );
}
