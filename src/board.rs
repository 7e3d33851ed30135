use crate::{
    EngineConfig, EngineError, EngineResult, HAND_SIZE, Tile, WildcardFace, ensure_distinct,
    run_matches, set_matches,
};
use log::debug;

pub const BOARD_ROWS: usize = 2;
pub const BOARD_COLS: usize = 12;

/// A player's physical rack: fixed rows of optional slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Tile>>,
}

/// A maximal run of occupied slots within one row, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub row: usize,
    pub start_col: usize,
    pub tiles: Vec<Tile>,
}

impl Board {
    /// Create an empty board
    pub fn new(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Create an empty board of the configured size
    pub fn for_config(config: &EngineConfig) -> Self {
        Board::new(config.board_rows, config.board_cols)
    }

    /// Build a board from row-major cells
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Option<Tile>>) -> EngineResult<Self> {
        if cells.len() != rows * cols {
            return Err(EngineError::precondition(format!(
                "expected {} board cells, got {}",
                rows * cols,
                cells.len()
            )));
        }
        Ok(Board { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Option<Tile>] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Tile> {
        self.cells.get(index).copied().flatten()
    }

    /// Put a tile into an empty slot. Returns false if the slot is taken or out of range.
    pub fn place(&mut self, index: usize, tile: Tile) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if cell.is_none() => {
                *cell = Some(tile);
                true
            }
            _ => false,
        }
    }

    /// Remove and return the tile at a slot
    pub fn take(&mut self, index: usize) -> Option<Tile> {
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// All placed tiles, row-major
    pub fn tiles(&self) -> Vec<Tile> {
        self.cells.iter().flatten().copied().collect()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Maximal contiguous occupied runs, row by row
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for row in 0..self.rows {
            let mut current: Option<Segment> = None;
            for col in 0..self.cols {
                match self.cells[row * self.cols + col] {
                    Some(tile) => match current.as_mut() {
                        Some(segment) => segment.tiles.push(tile),
                        None => {
                            current = Some(Segment {
                                row,
                                start_col: col,
                                tiles: vec![tile],
                            })
                        }
                    },
                    None => segments.extend(current.take()),
                }
            }
            segments.extend(current);
        }
        segments
    }

    /// Drop a tile onto a slot, shifting neighbors within the row when it is taken.
    ///
    /// Tiles shift right towards the nearest empty slot when there is one,
    /// otherwise left. Returns false when the row is full.
    pub fn insert_with_shift(&mut self, index: usize, tile: Tile) -> bool {
        if index >= self.cells.len() {
            return false;
        }
        if self.cells[index].is_none() {
            self.cells[index] = Some(tile);
            return true;
        }

        let row_start = index / self.cols * self.cols;
        let row_end = row_start + self.cols - 1;

        if let Some(empty) = (index..=row_end).find(|&i| self.cells[i].is_none()) {
            for i in (index + 1..=empty).rev() {
                self.cells[i] = self.cells[i - 1];
            }
            self.cells[index] = Some(tile);
            return true;
        }

        if let Some(empty) = (row_start..=index).rev().find(|&i| self.cells[i].is_none()) {
            for i in empty..index {
                self.cells[i] = self.cells[i + 1];
            }
            self.cells[index] = Some(tile);
            return true;
        }

        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(BOARD_ROWS, BOARD_COLS)
    }
}

/// Decide whether a fully arranged board shows a winning hand.
///
/// Position-based and non-searching: every segment must either be a
/// same-face pair (seven pairs), or every segment must be a run read left
/// to right or a set. Segments of length one, and mixes of pairs with
/// longer melds, never win. A board with fewer than 14 tiles placed is
/// simply not winning.
pub fn validate_board(board: &Board, wildcard: WildcardFace) -> EngineResult<bool> {
    let placed = board.tiles();
    if placed.len() > HAND_SIZE {
        return Err(EngineError::precondition(format!(
            "board holds {} tiles, at most {} allowed",
            placed.len(),
            HAND_SIZE
        )));
    }
    ensure_distinct(&placed)?;
    if placed.len() < HAND_SIZE {
        return Ok(false);
    }

    let segments = board.segments();
    if segments.iter().any(|s| s.tiles.len() == 1) {
        debug!("board rejected: single-tile segment");
        return Ok(false);
    }

    if segments.iter().all(|s| s.tiles.len() == 2) {
        return Ok(segments.iter().all(|s| is_exact_pair(&s.tiles, wildcard)));
    }

    if segments.iter().any(|s| s.tiles.len() == 2) {
        return Ok(false);
    }

    Ok(segments
        .iter()
        .all(|s| set_matches(&s.tiles, wildcard) || run_matches(&s.tiles, wildcard)))
}

/// Two tiles showing the same face; wildcards get no substitution here
fn is_exact_pair(tiles: &[Tile], wildcard: WildcardFace) -> bool {
    matches!(tiles, [a, b] if a.face(wildcard) == b.face(wildcard))
}
