use crate::board::{BOARD_COLS, Board};
use crate::pairs::evaluate_pairs_hand;
use crate::solver::evaluate_hand;
use crate::{
    Color, EngineConfig, Face, GameMode, HAND_SIZE, MAX_RANK, Partition, Tile, WildcardFace,
};
use log::warn;
use std::collections::BTreeMap;

/// Group a hand for display.
///
/// For a confirmed win the exact partition from the mode's solver is used.
/// Otherwise the grouping is greedy and purely cosmetic: longest runs first,
/// then the largest sets, then everything else as one sorted tail. The
/// greedy and exact groupings may differ for the same tiles.
pub fn group_for_display(
    tiles: &[Tile],
    wildcard: WildcardFace,
    mode: GameMode,
    confirmed_win: bool,
) -> Vec<Vec<Tile>> {
    group_within(tiles, wildcard, mode, confirmed_win, BOARD_COLS)
}

/// Greedy runs never grow wider than the row they will be laid out on
fn group_within(
    tiles: &[Tile],
    wildcard: WildcardFace,
    mode: GameMode,
    confirmed_win: bool,
    cols: usize,
) -> Vec<Vec<Tile>> {
    if confirmed_win && tiles.len() == HAND_SIZE {
        if let Some(partition) = exact_partition(tiles, wildcard, mode) {
            return partition.into_iter().map(|meld| meld.tiles).collect();
        }
    }
    greedy_groups(tiles, wildcard, cols)
}

/// Re-run the mode's solver to recover the winning partition
fn exact_partition(tiles: &[Tile], wildcard: WildcardFace, mode: GameMode) -> Option<Partition> {
    let result = match mode {
        GameMode::Standard => evaluate_hand(tiles, wildcard).map(|r| r.partition),
        GameMode::Pairs => evaluate_pairs_hand(tiles, wildcard).map(|r| r.pairing),
    };
    match result {
        Ok(partition) => partition,
        Err(err) => {
            warn!("falling back to greedy grouping: {}", err);
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RunCandidate {
    color: Color,
    start: u8,
    len: usize,
    wilds_needed: usize,
}

/// Tiles still ungrouped, by face, plus the spare wildcards
struct Pool {
    buckets: BTreeMap<Face, Vec<Tile>>,
    wilds: Vec<Tile>,
}

impl Pool {
    fn new(tiles: &[Tile], wildcard: WildcardFace) -> Self {
        let mut buckets: BTreeMap<Face, Vec<Tile>> = BTreeMap::new();
        let mut wilds = Vec::new();
        for tile in tiles {
            if tile.is_wild(wildcard) {
                wilds.push(*tile);
            } else {
                buckets.entry(tile.face(wildcard)).or_default().push(*tile);
            }
        }
        Pool { buckets, wilds }
    }

    fn has(&self, face: Face) -> bool {
        self.buckets.get(&face).is_some_and(|b| !b.is_empty())
    }

    fn take(&mut self, face: Face) -> Option<Tile> {
        let bucket = self.buckets.get_mut(&face)?;
        let tile = bucket.pop();
        if bucket.is_empty() {
            self.buckets.remove(&face);
        }
        tile
    }

    /// Measure the run starting at `start`, filling gaps and the tail with
    /// spare wildcards. A 13 -> 1 step ends the run.
    fn measure_run(&self, color: Color, start: u8, max_len: usize) -> Option<RunCandidate> {
        let mut len = 0;
        let mut wilds_needed = 0;
        let mut has_real = false;
        let mut wrapped = false;

        for step in 0..max_len {
            if wrapped {
                break;
            }
            let raw = start as usize + step;
            if raw > MAX_RANK as usize + 1 {
                break;
            }
            let rank = if raw > MAX_RANK as usize { 1 } else { raw as u8 };
            wrapped = raw > MAX_RANK as usize;

            if self.has(Face::new(color, rank)) {
                has_real = true;
            } else if wilds_needed < self.wilds.len() {
                wilds_needed += 1;
            } else {
                break;
            }
            len += 1;
        }

        (has_real && len >= 3).then_some(RunCandidate {
            color,
            start,
            len,
            wilds_needed,
        })
    }

    fn best_run(&self, max_len: usize) -> Option<RunCandidate> {
        let mut best: Option<RunCandidate> = None;
        for color in Color::ALL {
            for start in 1..=MAX_RANK {
                let Some(candidate) = self.measure_run(color, start, max_len) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some(b) => {
                        candidate.len > b.len
                            || (candidate.len == b.len && candidate.wilds_needed < b.wilds_needed)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn take_run(&mut self, run: RunCandidate) -> Vec<Tile> {
        let mut group = Vec::with_capacity(run.len);
        for step in 0..run.len {
            let rank = ((run.start as usize - 1 + step) % MAX_RANK as usize) as u8 + 1;
            match self.take(Face::new(run.color, rank)) {
                Some(tile) => group.push(tile),
                None => group.extend(self.wilds.pop()),
            }
        }
        group
    }

    /// Rank whose set would be largest (capped at 4), with its real colors
    fn best_set(&self) -> Option<(u8, Vec<Color>, usize)> {
        let mut best: Option<(u8, Vec<Color>, usize)> = None;
        for rank in 1..=MAX_RANK {
            let colors: Vec<Color> = Color::ALL
                .into_iter()
                .filter(|&c| self.has(Face::new(c, rank)))
                .collect();
            if colors.is_empty() || colors.len() + self.wilds.len() < 3 {
                continue;
            }
            let target = (colors.len() + self.wilds.len()).min(4);
            if best.as_ref().is_none_or(|(_, _, t)| target > *t) {
                best = Some((rank, colors, target));
            }
        }
        best
    }

    fn take_set(&mut self, rank: u8, colors: &[Color], target: usize) -> Vec<Tile> {
        let mut group: Vec<Tile> = colors
            .iter()
            .take(4)
            .filter_map(|&c| self.take(Face::new(c, rank)))
            .collect();
        while group.len() < target {
            match self.wilds.pop() {
                Some(wild) => group.push(wild),
                None => break,
            }
        }
        group
    }

    fn into_tail(self) -> Vec<Tile> {
        let mut rest: Vec<Tile> = self.buckets.into_values().flatten().collect();
        rest.extend(self.wilds);
        rest
    }
}

fn greedy_groups(tiles: &[Tile], wildcard: WildcardFace, cols: usize) -> Vec<Vec<Tile>> {
    let mut pool = Pool::new(tiles, wildcard);
    let mut groups = Vec::new();
    let max_len = cols.min(MAX_RANK as usize);

    while let Some(run) = pool.best_run(max_len) {
        let group = pool.take_run(run);
        if group.len() < 3 {
            break;
        }
        groups.push(group);
    }

    while let Some((rank, colors, target)) = pool.best_set() {
        let group = pool.take_set(rank, &colors, target);
        if group.len() < 3 {
            break;
        }
        groups.push(group);
    }

    let tail = pool.into_tail();
    if !tail.is_empty() {
        groups.push(sort_for_display(&tail, wildcard));
    }
    groups
}

/// Sort a hand for display: wildcards, then mimics, then by color, rank and copy
pub fn sort_for_display(tiles: &[Tile], wildcard: WildcardFace) -> Vec<Tile> {
    let mut sorted = tiles.to_vec();
    sorted.sort_by_key(|tile| {
        let kind = if tile.is_wild(wildcard) {
            0
        } else if tile.is_mimic() {
            1
        } else {
            2
        };
        (kind, tile.face(wildcard), tile.copy())
    });
    sorted
}

/// Pack display groups into a grid, row-major.
///
/// A group is never split across rows; groups are separated by one empty
/// slot unless the next one starts a new row. Tiles that do not fit are dropped.
pub fn layout_for_board(groups: &[Vec<Tile>], rows: usize, cols: usize) -> Vec<Option<Tile>> {
    let total = rows * cols;
    let mut cells = vec![None; total];
    if total == 0 {
        return cells;
    }
    let mut pos = 0;

    for (gi, group) in groups.iter().enumerate() {
        let remaining_in_row = cols - pos % cols;
        if group.len() > remaining_in_row {
            pos = pos.div_ceil(cols) * cols;
        }

        for &tile in group {
            if pos >= total {
                return cells;
            }
            cells[pos] = Some(tile);
            pos += 1;
        }

        if gi + 1 != groups.len() && pos < total && pos % cols != 0 {
            pos += 1;
        }
    }

    cells
}

/// Group a hand and lay it out on a board of the configured size
pub fn display_board(
    tiles: &[Tile],
    wildcard: WildcardFace,
    config: &EngineConfig,
    confirmed_win: bool,
) -> Board {
    let groups = group_within(tiles, wildcard, config.mode, confirmed_win, config.board_cols);
    let cells = layout_for_board(&groups, config.board_rows, config.board_cols);
    let mut board = Board::for_config(config);
    for (index, cell) in cells.into_iter().enumerate() {
        if let Some(tile) = cell {
            board.place(index, tile);
        }
    }
    board
}
