use crate::pairs::pairs_score;
use crate::{
    EngineError, EngineResult, Face, GameMode, HAND_SIZE, Tile, WildcardFace, ensure_hand,
};
use log::trace;

/// Score given to wildcards so they are never thrown away
const WILDCARD_USEFULNESS: i32 = 1000;
const MIMIC_BONUS: i32 = 2;
const SET_PARTNER: i32 = 4;
const RUN_NEIGHBOR: i32 = 3;
const RUN_GAP_NEIGHBOR: i32 = 1;

/// Decide whether an automated seat takes the visible discard instead of drawing.
///
/// Standard mode takes a tile that extends a set (same rank, another color)
/// or a run (same color, adjacent rank) of something already held. Pairs
/// mode takes it only when it strictly improves the pairs score.
pub fn choose_take_discard(
    hand: &[Tile],
    discard: Tile,
    wildcard: WildcardFace,
    mode: GameMode,
) -> EngineResult<bool> {
    ensure_hand(hand, HAND_SIZE)?;
    if hand.contains(&discard) {
        return Err(EngineError::precondition(format!(
            "discard {} is already in the hand",
            discard
        )));
    }

    let take = match mode {
        GameMode::Pairs => {
            let mut extended = hand.to_vec();
            extended.push(discard);
            pairs_score(&extended, wildcard).score > pairs_score(hand, wildcard).score
        }
        GameMode::Standard => {
            let top = discard.face(wildcard);
            held_faces(hand, wildcard).any(|f| {
                (f.rank == top.rank && f.color != top.color)
                    || (f.color == top.color && f.rank.abs_diff(top.rank) == 1)
            })
        }
    };
    trace!("take discard {}: {}", discard, take);
    Ok(take)
}

/// Pick which of 15 held tiles to discard.
///
/// Standard mode drops the least useful tile; pairs mode drops whichever
/// tile leaves the best-scoring 14. Ties go to the lowest index.
pub fn choose_discard_index(
    hand: &[Tile],
    wildcard: WildcardFace,
    mode: GameMode,
) -> EngineResult<usize> {
    ensure_hand(hand, HAND_SIZE + 1)?;

    let index = match mode {
        GameMode::Pairs => {
            let mut best = (0, i32::MIN);
            for i in 0..hand.len() {
                let remaining: Vec<Tile> = hand
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, t)| *t)
                    .collect();
                let score = pairs_score(&remaining, wildcard).score;
                if score > best.1 {
                    best = (i, score);
                }
            }
            best.0
        }
        GameMode::Standard => {
            let mut best = (0, i32::MAX);
            for i in 0..hand.len() {
                let score = tile_usefulness(hand, i, wildcard);
                if score < best.1 {
                    best = (i, score);
                }
            }
            best.0
        }
    };
    trace!("discard index {} ({})", index, hand[index]);
    Ok(index)
}

/// How much the tile at `index` contributes to possible melds in `hand`.
///
/// Other tiles of the same rank and another color count 4 each, same-color
/// neighbors at distance 1 count 3 and at distance 2 count 1. Wildcards
/// are never worth discarding; mimic tiles get a small bonus.
pub fn tile_usefulness(hand: &[Tile], index: usize, wildcard: WildcardFace) -> i32 {
    let tile = hand[index];
    if tile.is_wild(wildcard) {
        return WILDCARD_USEFULNESS;
    }
    let face = tile.face(wildcard);

    let mut score = 0;
    for (j, other) in hand.iter().enumerate() {
        if j == index || other.is_wild(wildcard) {
            continue;
        }
        let g = other.face(wildcard);
        if g.rank == face.rank && g.color != face.color {
            score += SET_PARTNER;
        }
        if g.color == face.color {
            match g.rank.abs_diff(face.rank) {
                1 => score += RUN_NEIGHBOR,
                2 => score += RUN_GAP_NEIGHBOR,
                _ => {}
            }
        }
    }

    if tile.is_mimic() {
        score += MIMIC_BONUS;
    }
    score
}

fn held_faces(hand: &[Tile], wildcard: WildcardFace) -> impl Iterator<Item = Face> + '_ {
    hand.iter()
        .filter(move |t| !t.is_wild(wildcard))
        .map(move |t| t.face(wildcard))
}
