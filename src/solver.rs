use crate::{
    EngineResult, Face, FaceTally, HAND_SIZE, MAX_RANK, Meld, MeldKind, Partition, Tile,
    WildcardFace, ensure_hand, run_rank_at,
};
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of a standard-mode win check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandEvaluation {
    pub wins: bool,
    /// Which rule the hand won by
    pub shape: Option<WinShape>,
    /// One valid covering of the hand when it wins; not necessarily canonical
    pub partition: Option<Partition>,
}

impl HandEvaluation {
    fn losing() -> Self {
        HandEvaluation {
            wins: false,
            shape: None,
            partition: None,
        }
    }

    fn winning(shape: WinShape, partition: Partition) -> Self {
        HandEvaluation {
            wins: true,
            shape: Some(shape),
            partition: Some(partition),
        }
    }
}

/// How a hand was found to win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WinShape {
    SevenPairs,
    Melds,
}

/// Decide whether 14 tiles form a standard-mode win.
///
/// Seven exact pairs win immediately. Otherwise the wildcards are set aside
/// and the remaining tiles are covered by runs and sets through an anchored
/// backtracking search. Every tile, wildcards included, must end up in a meld.
pub fn evaluate_hand(tiles: &[Tile], wildcard: WildcardFace) -> EngineResult<HandEvaluation> {
    ensure_hand(tiles, HAND_SIZE)?;

    if let Some(pairs) = seven_pairs_partition(tiles, wildcard) {
        debug!("hand wins as seven pairs");
        return Ok(HandEvaluation::winning(WinShape::SevenPairs, pairs));
    }

    let mut search = MeldSearch::new(tiles, wildcard);
    let result = match search.solve() {
        Some(plan) => HandEvaluation::winning(WinShape::Melds, search.splice_wildcards(plan)),
        None => HandEvaluation::losing(),
    };
    debug!(
        "meld search finished: wins={} memo_entries={}",
        result.wins,
        search.failed.len()
    );
    Ok(result)
}

// ============================================================================
// Seven Pairs
// ============================================================================

/// Seven exact pairs, matched by face.
///
/// Wildness is ignored here: a wildcard only pairs with its own duplicate or
/// a mimic tile (which shows the same face), never with an arbitrary tile.
pub fn is_seven_pairs(tiles: &[Tile], wildcard: WildcardFace) -> bool {
    FaceTally::of_all(tiles, wildcard).pair_count() >= 7
}

/// Build the seven pairs of a seven-pairs hand, or None when it is not one
pub fn seven_pairs_partition(tiles: &[Tile], wildcard: WildcardFace) -> Option<Partition> {
    if !is_seven_pairs(tiles, wildcard) {
        return None;
    }

    let mut buckets: std::collections::BTreeMap<Face, Vec<Tile>> = Default::default();
    for tile in tiles {
        buckets.entry(tile.face(wildcard)).or_default().push(*tile);
    }

    let mut pairs = Vec::with_capacity(7);
    for bucket in buckets.values() {
        for chunk in bucket.chunks_exact(2) {
            pairs.push(Meld::new(MeldKind::Pair, chunk.to_vec()));
        }
    }
    pairs.truncate(7);
    Some(pairs)
}

// ============================================================================
// Anchored Meld Search
// ============================================================================

/// A meld position filled either by a specific tile or by some wildcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Tile(Tile),
    Wild,
}

/// A meld found by the search, before physical wildcards are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedMeld {
    pub kind: MeldKind,
    pub slots: Vec<Slot>,
}

/// Remaining non-wild tiles as a bitmask over the sorted tile array
type Remaining = u32;

/// Backtracking state over a fixed, sorted array of non-wild tiles.
///
/// Branches never share mutable lists: each recursive call receives its own
/// `Remaining` mask, and failures are remembered by face multiset plus
/// wildcard budget.
struct MeldSearch {
    /// Non-wild tiles sorted by (color, rank, copy)
    normals: Vec<(Face, Tile)>,
    wilds: Vec<Tile>,
    /// (face multiset signature, wildcards left) pairs known to fail
    failed: HashSet<(u128, usize)>,
}

impl MeldSearch {
    fn new(tiles: &[Tile], wildcard: WildcardFace) -> Self {
        let mut normals = Vec::with_capacity(tiles.len());
        let mut wilds = Vec::new();
        for tile in tiles {
            if tile.is_wild(wildcard) {
                wilds.push(*tile);
            } else {
                normals.push((tile.face(wildcard), *tile));
            }
        }
        normals.sort_by_key(|(face, tile)| (*face, tile.copy(), tile.is_mimic()));

        MeldSearch {
            normals,
            wilds,
            failed: HashSet::new(),
        }
    }

    fn solve(&mut self) -> Option<Vec<PlannedMeld>> {
        let all: Remaining = if self.normals.is_empty() {
            0
        } else {
            Remaining::MAX >> (Remaining::BITS as usize - self.normals.len())
        };
        self.solve_from(all, self.wilds.len())
    }

    /// Canonical key for a remaining multiset: two bits per face index
    fn signature(&self, remaining: Remaining) -> u128 {
        self.indices(remaining)
            .map(|i| 1u128 << (2 * self.normals[i].0.index()))
            .sum()
    }

    fn indices(&self, remaining: Remaining) -> impl Iterator<Item = usize> + '_ {
        (0..self.normals.len()).filter(move |i| remaining & (1 << i) != 0)
    }

    fn solve_from(&mut self, remaining: Remaining, wilds: usize) -> Option<Vec<PlannedMeld>> {
        if remaining == 0 {
            // Leftover wildcards would sit outside every meld
            return (wilds == 0).then(Vec::new);
        }

        let key = (self.signature(remaining), wilds);
        if self.failed.contains(&key) {
            trace!("memo hit: {} tiles, {} wildcards", remaining.count_ones(), wilds);
            return None;
        }

        let anchor = remaining.trailing_zeros() as usize;

        if let Some(found) = self.try_sets(remaining, wilds, anchor) {
            return Some(found);
        }
        if let Some(found) = self.try_runs(remaining, wilds, anchor) {
            return Some(found);
        }

        self.failed.insert(key);
        None
    }

    /// Sets of size 3 then 4 containing the anchor, one tile per color
    fn try_sets(
        &mut self,
        remaining: Remaining,
        wilds: usize,
        anchor: usize,
    ) -> Option<Vec<PlannedMeld>> {
        let anchor_face = self.normals[anchor].0;

        let mut seen_colors = vec![anchor_face.color];
        let mut partners = Vec::new();
        for i in self.indices(remaining) {
            let face = self.normals[i].0;
            if i != anchor && face.rank == anchor_face.rank && !seen_colors.contains(&face.color) {
                seen_colors.push(face.color);
                partners.push(i);
            }
        }

        for size in 3..=4usize {
            let max_real = size.min(partners.len() + 1);
            let min_real = size.saturating_sub(wilds).max(1);
            for real_count in min_real..=max_real {
                let wild_used = size - real_count;
                for combo in combinations(&partners, real_count - 1) {
                    let mut next = remaining & !(1 << anchor);
                    for &i in &combo {
                        next &= !(1 << i);
                    }
                    if let Some(mut rest) = self.solve_from(next, wilds - wild_used) {
                        let mut slots = vec![Slot::Tile(self.normals[anchor].1)];
                        slots.extend(combo.iter().map(|&i| Slot::Tile(self.normals[i].1)));
                        slots.extend(std::iter::repeat_n(Slot::Wild, wild_used));
                        rest.insert(0, PlannedMeld { kind: MeldKind::Set, slots });
                        return Some(rest);
                    }
                }
            }
        }
        None
    }

    /// Every run window of the anchor's color that covers the anchor's rank
    fn try_runs(
        &mut self,
        remaining: Remaining,
        wilds: usize,
        anchor: usize,
    ) -> Option<Vec<PlannedMeld>> {
        let anchor_face = self.normals[anchor].0;

        for start in 1..=MAX_RANK {
            for len in 3..=MAX_RANK as usize {
                if start as usize + len - 1 > MAX_RANK as usize + 1 {
                    break;
                }
                let ranks: Option<Vec<u8>> =
                    (0..len).map(|i| run_rank_at(start, len, i)).collect();
                let Some(ranks) = ranks else {
                    continue;
                };
                let Some(anchor_offset) = ranks.iter().position(|&r| r == anchor_face.rank) else {
                    continue;
                };

                let mut next = remaining & !(1 << anchor);
                let mut slots = Vec::with_capacity(len);
                let mut wild_used = 0;
                for (offset, &rank) in ranks.iter().enumerate() {
                    if offset == anchor_offset {
                        slots.push(Slot::Tile(self.normals[anchor].1));
                        continue;
                    }
                    let wanted = Face::new(anchor_face.color, rank);
                    match self.indices(next).find(|&i| self.normals[i].0 == wanted) {
                        Some(i) => {
                            next &= !(1 << i);
                            slots.push(Slot::Tile(self.normals[i].1));
                        }
                        None => {
                            wild_used += 1;
                            slots.push(Slot::Wild);
                        }
                    }
                }
                if wild_used > wilds {
                    continue;
                }

                if let Some(mut rest) = self.solve_from(next, wilds - wild_used) {
                    rest.insert(0, PlannedMeld { kind: MeldKind::Run, slots });
                    return Some(rest);
                }
            }
        }
        None
    }

    /// Replace wildcard placeholders with the physical wildcard tiles
    fn splice_wildcards(&self, plan: Vec<PlannedMeld>) -> Partition {
        splice_wildcards(plan, &self.wilds)
    }
}

/// Assign physical wildcards to placeholder slots in order of appearance
pub(crate) fn splice_wildcards(plan: Vec<PlannedMeld>, wilds: &[Tile]) -> Partition {
    let mut spare = wilds.iter().copied();
    plan.into_iter()
        .map(|meld| {
            let tiles = meld
                .slots
                .into_iter()
                .filter_map(|slot| match slot {
                    Slot::Tile(tile) => Some(tile),
                    Slot::Wild => spare.next(),
                })
                .collect();
            Meld::new(meld.kind, tiles)
        })
        .collect()
}

/// All k-element subsets of `items`, in lexicographic order
fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k > items.len() {
        return out;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i]).collect());
        if !next_combination(&mut indices, items.len()) {
            break;
        }
    }
    out
}

/// Generate the next combination in lexicographic order
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    if k == 0 {
        return false;
    }

    // Find the rightmost element that can be incremented
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] < n - k + i {
            combo[i] += 1;
            for j in (i + 1)..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }

    false
}
