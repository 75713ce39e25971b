//! Failsafe scanner - full-board sweep for work the local cascade missed
//!
//! Invoked only when the resolution queue runs dry. Scans in the board's
//! canonical order, so the first hit is deterministic.

use crate::board::Board;
use crate::types::{FailsafeReason, Hex, ELIMINATION_THRESHOLD};

/// First cell whose top run already reached the elimination threshold
pub fn find_pending_elimination(board: &Board) -> Option<Hex> {
    board
        .iter()
        .filter(|(_, cell)| cell.is_active() && cell.len() >= ELIMINATION_THRESHOLD)
        .find(|(_, cell)| {
            cell.top_run()
                .is_some_and(|(_, run)| run >= ELIMINATION_THRESHOLD)
        })
        .map(|(at, _)| at)
}

/// First cell that shares its top color with a playable neighbor
pub fn find_fragmented_connection(board: &Board) -> Option<Hex> {
    board
        .iter()
        .filter(|(_, cell)| cell.is_active())
        .find(|(at, cell)| {
            cell.top_color()
                .is_some_and(|color| board.count_neighbor_matches(*at, color) > 0)
        })
        .map(|(at, _)| at)
}

/// Pending eliminations take priority over fragmented connections.
pub fn scan(board: &Board) -> Option<(Hex, FailsafeReason)> {
    if let Some(at) = find_pending_elimination(board) {
        return Some((at, FailsafeReason::PendingElimination));
    }
    find_fragmented_connection(board).map(|at| (at, FailsafeReason::FragmentedConnection))
}
