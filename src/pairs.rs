use crate::solver::{is_seven_pairs, seven_pairs_partition};
use crate::{
    EngineResult, Face, FaceTally, HAND_SIZE, Meld, MeldKind, Tile, WildcardFace, ensure_hand,
};
use log::debug;
use std::collections::BTreeMap;

/// Outcome of a pairs-mode win check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairsEvaluation {
    pub wins: bool,
    /// Seven pairs covering the hand when it wins
    pub pairing: Option<Vec<Meld>>,
}

/// Bucket accounting for a pairs-mode hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairsFeasibility {
    /// Faces held an odd number of times
    pub odd_faces: usize,
    /// Σ⌊count/2⌋ over the non-wild faces
    pub spare_pair_capacity: usize,
    pub wildcards: usize,
}

impl PairsFeasibility {
    pub fn of(tiles: &[Tile], wildcard: WildcardFace) -> Self {
        let (tally, wildcards) = FaceTally::of_normals(tiles, wildcard);
        PairsFeasibility {
            odd_faces: tally.odd_faces(),
            spare_pair_capacity: tally.pair_count(),
            wildcards,
        }
    }

    /// One wildcard fixes each odd face; the rest must go two at a time
    /// into split identical pairs.
    pub fn is_feasible(&self) -> bool {
        if self.wildcards < self.odd_faces {
            return false;
        }
        let extra = self.wildcards - self.odd_faces;
        extra % 2 == 0 && extra / 2 <= self.spare_pair_capacity
    }
}

/// Decide whether 14 tiles split into seven pairs under pairs-mode rules.
///
/// A wildcard may complete any single tile but two wildcards never pair
/// with each other.
pub fn evaluate_pairs_hand(
    tiles: &[Tile],
    wildcard: WildcardFace,
) -> EngineResult<PairsEvaluation> {
    ensure_hand(tiles, HAND_SIZE)?;

    let feasibility = PairsFeasibility::of(tiles, wildcard);
    if feasibility.wildcards == 0 && is_seven_pairs(tiles, wildcard) {
        return Ok(PairsEvaluation {
            wins: true,
            pairing: seven_pairs_partition(tiles, wildcard),
        });
    }

    if !feasibility.is_feasible() {
        debug!("pairs hand infeasible: {:?}", feasibility);
        return Ok(PairsEvaluation {
            wins: false,
            pairing: None,
        });
    }

    let pairing = build_pairing(tiles, wildcard);
    Ok(PairsEvaluation {
        wins: pairing.is_some(),
        pairing,
    })
}

/// Construct the pairing: fix odd faces first, then split spare pairs to
/// absorb remaining wildcards, then pair what is left directly.
fn build_pairing(tiles: &[Tile], wildcard: WildcardFace) -> Option<Vec<Meld>> {
    let mut wilds = Vec::new();
    let mut buckets: BTreeMap<Face, Vec<Tile>> = BTreeMap::new();
    for tile in tiles {
        if tile.is_wild(wildcard) {
            wilds.push(*tile);
        } else {
            buckets.entry(tile.face(wildcard)).or_default().push(*tile);
        }
    }

    let mut pairs = Vec::with_capacity(7);
    let pair = |a: Tile, b: Tile| Meld::new(MeldKind::Pair, vec![a, b]);

    for bucket in buckets.values_mut() {
        if bucket.len() % 2 == 1 {
            let tile = bucket.pop()?;
            pairs.push(pair(tile, wilds.pop()?));
        }
    }

    while !wilds.is_empty() {
        let bucket = buckets.values_mut().find(|b| b.len() >= 2 && wilds.len() >= 2)?;
        for _ in 0..2 {
            let tile = bucket.pop()?;
            pairs.push(pair(tile, wilds.pop()?));
        }
    }

    for bucket in buckets.values() {
        if bucket.len() % 2 != 0 {
            return None;
        }
        for chunk in bucket.chunks_exact(2) {
            pairs.push(pair(chunk[0], chunk[1]));
        }
    }

    (pairs.len() == 7).then_some(pairs)
}

/// Heuristic progress towards seven pairs. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairsScore {
    pub score: i32,
    pub exact_pairs: usize,
    pub singles: usize,
    pub wildcards: usize,
    /// Wildcards with no single left to complete
    pub leftover_wildcards: usize,
    pub effective_pairs: usize,
}

/// Reward exact pairs and wildcard-completed singles, penalize unpaired
/// singles and, more heavily, wildcards that would have to pair together.
pub fn pairs_score(tiles: &[Tile], wildcard: WildcardFace) -> PairsScore {
    let (tally, wildcards) = FaceTally::of_normals(tiles, wildcard);
    let exact_pairs = tally.pair_count();
    let singles = tally.odd_faces();

    let covered_singles = wildcards.min(singles);
    let leftover_wildcards = wildcards - covered_singles;
    let effective_pairs = exact_pairs + covered_singles;

    let score = effective_pairs as i32 * 100 - singles as i32 * 15 - leftover_wildcards as i32 * 80;

    PairsScore {
        score,
        exact_pairs,
        singles,
        wildcards,
        leftover_wildcards,
        effective_pairs,
    }
}
