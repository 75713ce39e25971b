use hexstack_core::types::Hex;
use hexstack_core::{BoardError, Cascade, GameState, GameStatus, Resolution};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("game is not playable")]
    NotPlayable,
    #[error("a resolution pass is in flight")]
    Busy,
    #[error("hand slot {0} is empty")]
    EmptySlot(usize),
    #[error("{0} is outside the board")]
    OffBoard(Hex),
    #[error("{0} is an obstacle")]
    Obstacle(Hex),
    #[error("{0} is already occupied")]
    CellOccupied(Hex),
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "not_playable",
            PlaceError::Busy => "busy",
            PlaceError::EmptySlot(_) => "empty_slot",
            PlaceError::OffBoard(_) => "off_board",
            PlaceError::Obstacle(_) => "obstacle",
            PlaceError::CellOccupied(_) => "cell_occupied",
            PlaceError::Board(_) => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "game is over",
            PlaceError::Busy => "wait for the current cascade to finish",
            PlaceError::EmptySlot(_) => "selected hand slot holds no pile",
            PlaceError::OffBoard(_) => "target cell is not on the board",
            PlaceError::Obstacle(_) => "target cell is blocked by an obstacle",
            PlaceError::CellOccupied(_) => "target cell already holds chips",
            PlaceError::Board(_) => "board rejected the pile",
        }
    }
}

/// Check a placement without touching the state
pub fn validate_place(state: &GameState, slot: usize, at: Hex) -> Result<(), PlaceError> {
    if state.status() != GameStatus::Playing {
        return Err(PlaceError::NotPlayable);
    }
    if state.is_busy() {
        return Err(PlaceError::Busy);
    }
    if state.slot(slot).is_none() {
        return Err(PlaceError::EmptySlot(slot));
    }

    let Some(cell) = state.board().get(at) else {
        return Err(PlaceError::OffBoard(at));
    };
    if cell.is_obstacle() {
        return Err(PlaceError::Obstacle(at));
    }
    if !cell.is_empty() {
        return Err(PlaceError::CellOccupied(at));
    }
    Ok(())
}

/// Validate, commit the pile and hand back the open pass
pub fn begin_place(state: &mut GameState, slot: usize, at: Hex) -> Result<Cascade, PlaceError> {
    validate_place(state, slot, at)?;
    Ok(state.commit_pile(slot, at)?)
}

/// Place and resolve without pausing
pub fn apply_place(state: &mut GameState, slot: usize, at: Hex) -> Result<Resolution, PlaceError> {
    let cascade = begin_place(state, slot, at)?;
    Ok(state.resolve(cascade))
}
