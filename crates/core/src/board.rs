//! Board module - owns every chip stack on the hex grid
//!
//! The board covers a hexagon of a given radius in axial coordinates.
//! Cells are kept in a flat vector in canonical order (q ascending, then r
//! ascending), which is also the order every full-board scan uses. A
//! coordinate maps to its slot through per-row offsets, so lookups never
//! allocate or hash.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Color, Hex, ObstacleKind};

/// Errors raised when a board mutation would break a cell invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("cell {0} is outside the board")]
    OffBoard(Hex),
    #[error("cell {0} is an obstacle")]
    Obstacle(Hex),
    #[error("cell {0} is already occupied")]
    Occupied(Hex),
    #[error("cell {0} has no {1:?} run on top")]
    NoRun(Hex, Color),
    #[error("cannot place an empty pile on {0}")]
    EmptyPile(Hex),
}

/// One board cell: a bottom-to-top chip stack plus an optional obstacle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    stack: Vec<Color>,
    obstacle: Option<ObstacleKind>,
}

impl Cell {
    /// Create an empty playable cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a playable cell holding `stack` (bottom first)
    pub fn with_stack(stack: Vec<Color>) -> Self {
        Self {
            stack,
            obstacle: None,
        }
    }

    /// Create an obstacle cell carrying the stone sentinel
    pub fn obstacle(kind: ObstacleKind) -> Self {
        Self::obstacle_with_token(kind, Color::Stone)
    }

    /// Create an obstacle cell carrying an arbitrary decoration token.
    ///
    /// The token never takes part in matching; the obstacle flag wins.
    pub fn obstacle_with_token(kind: ObstacleKind, token: Color) -> Self {
        Self {
            stack: vec![token],
            obstacle: Some(kind),
        }
    }

    pub fn stack(&self) -> &[Color] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// True when the cell holds no token at all (obstacles are never empty)
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn is_obstacle(&self) -> bool {
        self.obstacle.is_some()
    }

    pub fn obstacle_kind(&self) -> Option<ObstacleKind> {
        self.obstacle
    }

    /// Whether the cell can take part in a cascade (non-obstacle, non-empty)
    pub fn is_active(&self) -> bool {
        !self.is_obstacle() && !self.is_empty()
    }

    pub fn top_color(&self) -> Option<Color> {
        self.stack.last().copied()
    }

    /// Length of the run of `color` counted from the top down
    pub fn count_consecutive_top(&self, color: Color) -> usize {
        self.stack
            .iter()
            .rev()
            .take_while(|&&c| c == color)
            .count()
    }

    /// Top color together with its run length
    pub fn top_run(&self) -> Option<(Color, usize)> {
        let color = self.top_color()?;
        Some((color, self.count_consecutive_top(color)))
    }

    /// The color that would surface if the top run were removed
    pub fn color_below_top_run(&self) -> Option<Color> {
        let (color, _) = self.top_run()?;
        self.stack.iter().rev().find(|&&c| c != color).copied()
    }
}

/// The hexagonal game board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    radius: u8,
    /// Flat cell storage in canonical order
    cells: Vec<Cell>,
    /// Index of the first cell of each q-row
    row_offsets: Vec<usize>,
}

impl Board {
    /// Create an empty board of the given radius
    pub fn new(radius: u8) -> Self {
        let r = radius as i32;
        let mut row_offsets = Vec::with_capacity(2 * radius as usize + 1);
        let mut total = 0usize;
        for q in -r..=r {
            row_offsets.push(total);
            total += Self::row_len(radius, q);
        }

        Self {
            radius,
            cells: vec![Cell::new(); total],
            row_offsets,
        }
    }

    #[inline(always)]
    fn row_len(radius: u8, q: i32) -> usize {
        (2 * radius as i32 + 1 - q.abs()) as usize
    }

    #[inline(always)]
    fn row_start_r(radius: u8, q: i32) -> i32 {
        (-(radius as i32)).max(-q - radius as i32)
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, at: Hex) -> Option<usize> {
        if !at.within_radius(self.radius) {
            return None;
        }
        let row = (at.q + self.radius as i32) as usize;
        let offset = (at.r - Self::row_start_r(self.radius, at.q)) as usize;
        Some(self.row_offsets[row] + offset)
    }

    pub fn radius(&self) -> u8 {
        self.radius
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Hex) -> bool {
        self.index(at).is_some()
    }

    /// Get the cell at `at`, or `None` outside the playable region
    pub fn get(&self, at: Hex) -> Option<&Cell> {
        self.index(at).map(|idx| &self.cells[idx])
    }

    fn get_mut(&mut self, at: Hex) -> Option<&mut Cell> {
        self.index(at).map(move |idx| &mut self.cells[idx])
    }

    pub fn top_color(&self, at: Hex) -> Option<Color> {
        self.get(at).and_then(Cell::top_color)
    }

    pub fn count_consecutive_top(&self, at: Hex, color: Color) -> usize {
        self.get(at)
            .map(|cell| cell.count_consecutive_top(color))
            .unwrap_or(0)
    }

    pub fn is_obstacle(&self, at: Hex) -> bool {
        self.get(at).is_some_and(Cell::is_obstacle)
    }

    /// All coordinates in canonical order
    pub fn coords(&self) -> impl Iterator<Item = Hex> + '_ {
        let r = self.radius as i32;
        (-r..=r).flat_map(move |q| {
            let start = Self::row_start_r(self.radius, q);
            let len = Self::row_len(self.radius, q) as i32;
            (start..start + len).map(move |r| Hex::new(q, r))
        })
    }

    /// Cells with their coordinates in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Hex, &Cell)> + '_ {
        self.coords().zip(self.cells.iter())
    }

    /// On-board neighbors of `at`, in canonical direction order
    pub fn neighbors(&self, at: Hex) -> ArrayVec<Hex, 6> {
        at.neighbors()
            .into_iter()
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// Neighbors that would join a cascade on `color`, with their run sizes.
    ///
    /// A neighbor matches when it exists, is not an obstacle, is non-empty and
    /// shows `color` on top.
    pub fn matching_neighbors(&self, at: Hex, color: Color) -> ArrayVec<(Hex, usize), 6> {
        at.neighbors()
            .into_iter()
            .filter_map(|n| {
                let cell = self.get(n)?;
                if cell.is_active() && cell.top_color() == Some(color) {
                    Some((n, cell.count_consecutive_top(color)))
                } else {
                    None
                }
            })
            .collect()
    }

    /// How many neighbors of `at` show `color` on top
    pub fn count_neighbor_matches(&self, at: Hex, color: Color) -> usize {
        self.matching_neighbors(at, color).len()
    }

    /// Place a dealt pile (bottom first) onto an empty playable cell
    pub fn place_pile(&mut self, at: Hex, pile: &[Color]) -> Result<(), BoardError> {
        if pile.is_empty() {
            return Err(BoardError::EmptyPile(at));
        }
        let cell = self.get_mut(at).ok_or(BoardError::OffBoard(at))?;
        if cell.is_obstacle() {
            return Err(BoardError::Obstacle(at));
        }
        if !cell.is_empty() {
            return Err(BoardError::Occupied(at));
        }
        cell.stack.extend_from_slice(pile);
        Ok(())
    }

    /// Turn a cell into an obstacle carrying the stone sentinel
    pub fn place_obstacle(&mut self, at: Hex, kind: ObstacleKind) -> Result<(), BoardError> {
        self.set_cell(at, Cell::obstacle(kind))
    }

    /// Overwrite a cell (level setup and tests)
    pub fn set_cell(&mut self, at: Hex, cell: Cell) -> Result<(), BoardError> {
        let slot = self.get_mut(at).ok_or(BoardError::OffBoard(at))?;
        *slot = cell;
        Ok(())
    }

    /// Replace the stack of a playable cell (level setup and tests)
    pub fn set_stack(&mut self, at: Hex, stack: Vec<Color>) -> Result<(), BoardError> {
        let cell = self.get_mut(at).ok_or(BoardError::OffBoard(at))?;
        if cell.is_obstacle() {
            return Err(BoardError::Obstacle(at));
        }
        cell.stack = stack;
        Ok(())
    }

    /// Pop the whole top run of `color` from a playable cell.
    ///
    /// Returns the number of chips removed.
    pub fn remove_top_run(&mut self, at: Hex, color: Color) -> Result<usize, BoardError> {
        let cell = self.get_mut(at).ok_or(BoardError::OffBoard(at))?;
        if cell.is_obstacle() {
            return Err(BoardError::Obstacle(at));
        }
        let run = cell.count_consecutive_top(color);
        if run == 0 {
            return Err(BoardError::NoRun(at, color));
        }
        let keep = cell.stack.len() - run;
        cell.stack.truncate(keep);
        Ok(run)
    }

    /// Push `count` chips of `color` on top of a playable cell
    pub fn push_chips(&mut self, at: Hex, color: Color, count: usize) -> Result<(), BoardError> {
        let cell = self.get_mut(at).ok_or(BoardError::OffBoard(at))?;
        if cell.is_obstacle() {
            return Err(BoardError::Obstacle(at));
        }
        cell.stack.extend(std::iter::repeat(color).take(count));
        Ok(())
    }

    /// Number of empty cells (obstacles count as occupied)
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    /// Board is full when no cell is empty (the loss condition)
    pub fn is_full(&self) -> bool {
        self.empty_cells() == 0
    }

    /// Player chips on the board (obstacle tokens excluded)
    pub fn total_chips(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| !cell.is_obstacle())
            .map(Cell::len)
            .sum()
    }

    /// Empty playable cells in canonical order
    pub fn empty_coords(&self) -> impl Iterator<Item = Hex> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(at, _)| at)
    }

    /// Advisory flow direction for a renderer's arrows.
    ///
    /// Picks the matching neighbor holding the most chips of the top color
    /// anywhere in its stack, ties going to the taller stack. The resolver
    /// never consults this.
    pub fn flow_target(&self, at: Hex) -> Option<Hex> {
        let cell = self.get(at)?;
        if !cell.is_active() {
            return None;
        }
        let color = cell.top_color()?;

        let mut best: Option<(Hex, usize, usize)> = None;
        for (n, _) in self.matching_neighbors(at, color) {
            let Some(neighbor) = self.get(n) else {
                continue;
            };
            let same = neighbor.stack().iter().filter(|&&c| c == color).count();
            let total = neighbor.len();
            let better = match best {
                None => true,
                Some((_, best_same, best_total)) => {
                    same > best_same || (same == best_same && total > best_total)
                }
            };
            if better {
                best = Some((n, same, total));
            }
        }
        best.map(|(n, _, _)| n)
    }

    /// Empty every cell, keeping the geometry
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_cell_counts() {
        assert_eq!(Board::new(0).len(), 1);
        assert_eq!(Board::new(2).len(), 19);
        assert_eq!(Board::new(3).len(), 37);
        assert_eq!(Board::new(4).len(), 61);
    }

    #[test]
    fn test_index_matches_canonical_order() {
        let board = Board::new(3);
        for (i, at) in board.coords().enumerate() {
            assert_eq!(board.index(at), Some(i), "index mismatch at {}", at);
        }
        assert_eq!(board.index(Hex::new(4, 0)), None);
        assert_eq!(board.index(Hex::new(2, 2)), None);
    }

    #[test]
    fn test_coords_start_in_first_row() {
        let board = Board::new(2);
        let first: Vec<Hex> = board.coords().take(3).collect();
        assert_eq!(first, vec![Hex::new(-2, 0), Hex::new(-2, 1), Hex::new(-2, 2)]);
    }

    #[test]
    fn test_cell_runs() {
        let cell = Cell::with_stack(vec![Color::Blue, Color::Red, Color::Red]);
        assert_eq!(cell.top_color(), Some(Color::Red));
        assert_eq!(cell.count_consecutive_top(Color::Red), 2);
        assert_eq!(cell.count_consecutive_top(Color::Blue), 0);
        assert_eq!(cell.color_below_top_run(), Some(Color::Blue));

        let uniform = Cell::with_stack(vec![Color::Red; 3]);
        assert_eq!(uniform.color_below_top_run(), None);
        assert_eq!(Cell::new().top_run(), None);
    }

    #[test]
    fn test_obstacle_cells_are_never_empty_or_active() {
        let rock = Cell::obstacle(ObstacleKind::Rock);
        assert!(!rock.is_empty());
        assert!(!rock.is_active());
        assert_eq!(rock.top_color(), Some(Color::Stone));
    }

    #[test]
    fn test_remove_and_push() {
        let mut board = Board::new(1);
        let at = Hex::new(0, 1);
        board
            .set_stack(at, vec![Color::Green, Color::Red, Color::Red])
            .unwrap();

        assert_eq!(board.remove_top_run(at, Color::Red), Ok(2));
        assert_eq!(board.get(at).unwrap().stack(), &[Color::Green]);
        assert_eq!(
            board.remove_top_run(at, Color::Red),
            Err(BoardError::NoRun(at, Color::Red))
        );

        board.push_chips(at, Color::Blue, 3).unwrap();
        assert_eq!(board.count_consecutive_top(at, Color::Blue), 3);
    }

    #[test]
    fn test_obstacles_reject_mutation() {
        let mut board = Board::new(1);
        let at = Hex::new(1, 0);
        board.place_obstacle(at, ObstacleKind::Crystal).unwrap();

        assert_eq!(board.push_chips(at, Color::Red, 1), Err(BoardError::Obstacle(at)));
        assert_eq!(
            board.remove_top_run(at, Color::Stone),
            Err(BoardError::Obstacle(at))
        );
        assert_eq!(board.place_pile(at, &[Color::Red]), Err(BoardError::Obstacle(at)));
        assert_eq!(board.get(at).unwrap().stack(), &[Color::Stone]);
    }

    #[test]
    fn test_flow_target_prefers_most_same_color() {
        let mut board = Board::new(1);
        board.set_stack(Hex::ORIGIN, vec![Color::Red]).unwrap();
        board
            .set_stack(Hex::new(1, 0), vec![Color::Red, Color::Blue, Color::Red])
            .unwrap();
        board
            .set_stack(Hex::new(0, 1), vec![Color::Blue, Color::Blue, Color::Red])
            .unwrap();

        assert_eq!(board.flow_target(Hex::ORIGIN), Some(Hex::new(1, 0)));
        assert_eq!(board.flow_target(Hex::new(-1, 0)), None);
    }
}
