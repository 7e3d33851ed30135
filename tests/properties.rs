//! Property-based tests for the win checks.
//!
//! Hands are drawn as 14 distinct tiles from the full set, or built from
//! known melds and pairs so that winning hands show up often enough to check.

use okey_engine::pairs::{PairsFeasibility, evaluate_pairs_hand};
use okey_engine::solver::evaluate_hand;
use okey_engine::{Color, FaceTally, Meld, Tile, WildcardFace};
use proptest::prelude::*;

fn wildcard_strategy() -> impl Strategy<Value = WildcardFace> {
    (0..4usize, 1..=13u8).prop_map(|(c, r)| WildcardFace::new(Color::ALL[c], r))
}

/// Any 14 distinct physical tiles, in random order
fn random_hand() -> impl Strategy<Value = Vec<Tile>> {
    prop::sample::subsequence(Tile::full_set(), 14).prop_shuffle()
}

/// One run per color: lengths 3, 3, 4 and 4
fn run_hand() -> impl Strategy<Value = Vec<Tile>> {
    (1..=11u8, 1..=11u8, 1..=10u8, 1..=10u8, 0..2u8).prop_flat_map(|(a, b, c, d, copy)| {
        let mut hand = Vec::with_capacity(14);
        for (color, start, len) in [
            (Color::Red, a, 3),
            (Color::Blue, b, 3),
            (Color::Black, c, 4),
            (Color::Yellow, d, 4),
        ] {
            for rank in start..start + len {
                hand.push(Tile::new(color, rank, copy));
            }
        }
        Just(hand).prop_shuffle()
    })
}

/// A run hand that leans on jokers: the wildcard face is the first Yellow rank, a
/// mimic stands in for that tile, and one or two physical wildcards fill gaps in
/// the Black and Red runs.
fn wild_run_hand() -> impl Strategy<Value = (Vec<Tile>, WildcardFace)> {
    (1..=11u8, 1..=11u8, 1..=10u8, 1..=10u8, any::<bool>()).prop_flat_map(
        |(a, b, c, d, second_wild)| {
            let wildcard = WildcardFace::new(Color::Yellow, d);
            let mut hand = Vec::with_capacity(14);
            hand.push(Tile::new(Color::Red, a, 0));
            hand.push(if second_wild {
                Tile::new(Color::Yellow, d, 0)
            } else {
                Tile::new(Color::Red, a + 1, 0)
            });
            hand.push(Tile::new(Color::Red, a + 2, 0));
            hand.extend((b..b + 3).map(|r| Tile::new(Color::Blue, r, 0)));
            hand.extend((c..c + 3).map(|r| Tile::new(Color::Black, r, 0)));
            hand.push(Tile::new(Color::Yellow, d, 1));
            hand.push(Tile::mimic(0));
            hand.extend((d + 1..d + 4).map(|r| Tile::new(Color::Yellow, r, 0)));
            (Just(hand).prop_shuffle(), Just(wildcard))
        },
    )
}

/// A hand together with an independent reordering of it
fn hand_and_permutation(
    hand: impl Strategy<Value = Vec<Tile>>,
) -> impl Strategy<Value = (Vec<Tile>, Vec<Tile>)> {
    hand.prop_flat_map(|h| (Just(h.clone()), Just(h).prop_shuffle()))
}

/// Both copies of seven distinct faces
fn pairs_hand() -> impl Strategy<Value = Vec<Tile>> {
    prop::sample::subsequence((0..52usize).collect::<Vec<_>>(), 7).prop_flat_map(|faces| {
        let hand: Vec<Tile> = faces
            .iter()
            .flat_map(|&i| {
                let color = Color::ALL[i / 13];
                let rank = (i % 13) as u8 + 1;
                [Tile::new(color, rank, 0), Tile::new(color, rank, 1)]
            })
            .collect();
        Just(hand).prop_shuffle()
    })
}

fn assert_covers(
    hand: &[Tile],
    partition: &[Meld],
    wildcard: WildcardFace,
) -> Result<(), TestCaseError> {
    let mut covered: Vec<Tile> =
        partition.iter().flat_map(|m| m.tiles.iter().copied()).collect();
    let mut expected = hand.to_vec();
    covered.sort();
    expected.sort();
    prop_assert_eq!(covered, expected);
    for meld in partition {
        prop_assert!(meld.is_valid(wildcard), "invalid meld {:?}", meld);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn wildness_follows_face(index in 0..106usize, wildcard in wildcard_strategy()) {
        let tile = Tile::full_set()[index];
        let literal = tile.color() == Some(wildcard.color) && tile.rank() == Some(wildcard.rank);
        prop_assert_eq!(tile.is_wild(wildcard), !tile.is_mimic() && literal);
        let face_matches = tile.face(wildcard) == wildcard.face();
        prop_assert_eq!(tile.is_wild(wildcard), face_matches && !tile.is_mimic());
    }

    #[test]
    fn evaluation_ignores_order(
        (hand, shuffled) in hand_and_permutation(random_hand()),
        wildcard in wildcard_strategy(),
    ) {
        let first = evaluate_hand(&hand, wildcard).unwrap();
        let second = evaluate_hand(&shuffled, wildcard).unwrap();
        prop_assert_eq!(first.wins, second.wins);
        prop_assert_eq!(first.shape, second.shape);
    }

    #[test]
    fn wildcard_hands_win_in_any_order((hand, wildcard) in wild_run_hand(), seed in any::<u64>()) {
        prop_assert!(hand.iter().any(|t| t.is_mimic()));
        let wilds = hand.iter().filter(|t| t.is_wild(wildcard)).count();
        prop_assert!((1..=2).contains(&wilds));

        let result = evaluate_hand(&hand, wildcard).unwrap();
        prop_assert!(result.wins);
        assert_covers(&hand, result.partition.as_deref().unwrap(), wildcard)?;

        // Rotate by a seeded amount and reverse, then check again
        let mut reordered = hand.clone();
        reordered.rotate_left((seed % hand.len() as u64) as usize);
        reordered.reverse();
        let again = evaluate_hand(&reordered, wildcard).unwrap();
        prop_assert!(again.wins);
        prop_assert_eq!(again.shape, result.shape);
        assert_covers(&reordered, again.partition.as_deref().unwrap(), wildcard)?;
    }

    #[test]
    fn built_runs_always_win(hand in run_hand(), wildcard in wildcard_strategy()) {
        let result = evaluate_hand(&hand, wildcard).unwrap();
        prop_assert!(result.wins);
        assert_covers(&hand, &result.partition.unwrap(), wildcard)?;

        let mut reordered = hand.clone();
        reordered.rotate_left(5);
        prop_assert!(evaluate_hand(&reordered, wildcard).unwrap().wins);
    }

    #[test]
    fn winning_partition_covers_hand(hand in random_hand(), wildcard in wildcard_strategy()) {
        let result = evaluate_hand(&hand, wildcard).unwrap();
        prop_assert_eq!(result.wins, result.partition.is_some());
        if let Some(partition) = result.partition {
            assert_covers(&hand, &partition, wildcard)?;
        }
    }

    #[test]
    fn seven_literal_pairs_win_in_both_modes(
        hand in pairs_hand(),
        wildcard in wildcard_strategy(),
    ) {
        prop_assert!(evaluate_hand(&hand, wildcard).unwrap().wins);
        let pairs = evaluate_pairs_hand(&hand, wildcard).unwrap();
        prop_assert!(pairs.wins);
        prop_assert_eq!(pairs.pairing.map(|p| p.len()), Some(7));
    }

    #[test]
    fn pairs_without_wildcards_need_even_buckets(
        hand in random_hand(),
        wildcard in wildcard_strategy(),
    ) {
        let feasibility = PairsFeasibility::of(&hand, wildcard);
        prop_assume!(feasibility.wildcards == 0);

        let (tally, _) = FaceTally::of_normals(&hand, wildcard);
        let expected = tally.odd_faces() == 0 && tally.pair_count() == 7;
        prop_assert_eq!(feasibility.is_feasible(), expected);
        prop_assert_eq!(evaluate_pairs_hand(&hand, wildcard).unwrap().wins, expected);
    }

    #[test]
    fn pairs_law_on_pair_rich_hands(
        hand in pairs_hand(),
        swap in 0..14usize,
        wildcard in wildcard_strategy(),
    ) {
        // Break one pair by swapping in a tile of a face nobody holds
        let mut broken = hand.clone();
        let faces: Vec<_> = hand.iter().map(|t| t.face(wildcard)).collect();
        let replacement = Tile::full_set()
            .into_iter()
            .find(|t| !t.is_mimic() && !faces.contains(&t.face(wildcard)) && !t.is_wild(wildcard));
        prop_assume!(replacement.is_some());
        broken[swap] = replacement.unwrap();

        let feasibility = PairsFeasibility::of(&broken, wildcard);
        prop_assume!(feasibility.wildcards == 0);
        prop_assert_eq!(feasibility.odd_faces, 2);
        prop_assert!(!evaluate_pairs_hand(&broken, wildcard).unwrap().wins);
    }
}
