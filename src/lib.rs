use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub mod api;
pub mod board;
pub mod bot;
pub mod config;
pub mod display;
pub mod error;
pub mod pairs;
pub mod session;
pub mod solver;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use config::{EngineConfig, GameMode};
pub use error::{EngineError, EngineResult};

/// Highest printed rank
pub const MAX_RANK: u8 = 13;

/// Number of tiles in a hand at win-check time
pub const HAND_SIZE: usize = 14;

/// Rank that follows `rank`, wrapping 13 -> 1
pub fn next_rank(rank: u8) -> u8 {
    rank % MAX_RANK + 1
}

/// The four suits, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Red,
    Blue,
    Black,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Black, Color::Yellow];

    fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }

    fn bits(self) -> u8 {
        self as u8
    }

    /// Single-letter code used in the text format
    pub fn letter(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Blue => 'b',
            Color::Black => 'k',
            Color::Yellow => 'y',
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "r" => Some(Color::Red),
            "b" => Some(Color::Blue),
            "k" => Some(Color::Black),
            "y" => Some(Color::Yellow),
            _ => None,
        }
    }
}

/// A physical tile represented as a u8.
/// - Bits 0-1: Color (00 = Red, 01 = Blue, 10 = Black, 11 = Yellow)
/// - Bits 2-5: Rank (1-13), zero for mimic tiles
/// - Bit 6: Copy slot (every color/rank exists twice; mimics are slots 0 and 1)
/// - Bit 7: Mimic flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile(u8);

impl Tile {
    const COLOR_MASK: u8 = 0b0000_0011;
    const RANK_MASK: u8 = 0b0011_1100;
    const RANK_SHIFT: u8 = 2;
    const COPY_BIT: u8 = 0b0100_0000;
    const MIMIC_BIT: u8 = 0b1000_0000;

    /// Create a tile from color, rank (1-13) and copy slot (0-1)
    pub fn new(color: Color, rank: u8, copy: u8) -> Self {
        assert!((1..=MAX_RANK).contains(&rank), "Rank must be 1-13");
        assert!(copy < 2, "Copy slot must be 0 or 1");
        Tile((copy << 6) | (rank << Self::RANK_SHIFT) | color.bits())
    }

    /// Create one of the two mimic tiles
    pub fn mimic(slot: u8) -> Self {
        assert!(slot < 2, "Mimic slot must be 0 or 1");
        Tile(Self::MIMIC_BIT | (slot << 6))
    }

    /// Printed color, or None for a mimic tile
    pub fn color(&self) -> Option<Color> {
        if self.is_mimic() {
            None
        } else {
            Some(Color::from_bits(self.0 & Self::COLOR_MASK))
        }
    }

    /// Printed rank, or None for a mimic tile
    pub fn rank(&self) -> Option<u8> {
        if self.is_mimic() {
            None
        } else {
            Some((self.0 & Self::RANK_MASK) >> Self::RANK_SHIFT)
        }
    }

    /// Duplicate slot (0 or 1)
    pub fn copy(&self) -> u8 {
        (self.0 & Self::COPY_BIT) >> 6
    }

    pub fn is_mimic(&self) -> bool {
        self.0 & Self::MIMIC_BIT != 0
    }

    /// The face this tile shows in a round. Mimic tiles show the wildcard face.
    pub fn face(&self, wildcard: WildcardFace) -> Face {
        match (self.color(), self.rank()) {
            (Some(color), Some(rank)) => Face { color, rank },
            _ => wildcard.face(),
        }
    }

    /// Whether the tile substitutes for any value this round. Never true for mimic tiles.
    pub fn is_wild(&self, wildcard: WildcardFace) -> bool {
        !self.is_mimic() && self.face(wildcard) == wildcard.face()
    }

    /// The complete 106-tile set: two copies of every color and rank plus both mimics
    pub fn full_set() -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(106);
        for copy in 0..2 {
            for color in Color::ALL {
                for rank in 1..=MAX_RANK {
                    tiles.push(Tile::new(color, rank, copy));
                }
            }
        }
        tiles.push(Tile::mimic(0));
        tiles.push(Tile::mimic(1));
        tiles
    }

    /// Parse a tile from a string representation
    /// Format: "r13" (red 13), "b1'" (blue 1, second copy), "k9" (black 9),
    /// "y7" (yellow 7), "m0"/"m1" (mimic tiles)
    pub fn from_string(s: &str) -> EngineResult<Self> {
        let s = s.trim();
        if let Some(slot) = s.strip_prefix('m') {
            return match slot {
                "0" => Ok(Tile::mimic(0)),
                "1" => Ok(Tile::mimic(1)),
                _ => Err(EngineError::parse(s, "Mimic slot must be 0 or 1")),
            };
        }
        if s.len() < 2 || !s.is_char_boundary(1) {
            return Err(EngineError::parse(s, "Invalid tile string"));
        }

        let color = Color::from_letter(&s[0..1])
            .ok_or_else(|| EngineError::parse(s, format!("Invalid color: {}", &s[0..1])))?;

        let (digits, copy) = match s[1..].strip_suffix('\'') {
            Some(digits) => (digits, 1),
            None => (&s[1..], 0),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::parse(s, format!("Invalid rank: {}", digits)));
        }
        let rank: u8 = digits
            .parse()
            .map_err(|_| EngineError::parse(s, format!("Invalid rank: {}", digits)))?;

        if !(1..=MAX_RANK).contains(&rank) {
            return Err(EngineError::parse(s, format!("Rank must be 1-13, got {}", rank)));
        }

        Ok(Tile::new(color, rank, copy))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.color(), self.rank()) {
            (Some(color), Some(rank)) => {
                write!(f, "{}{}", color.letter(), rank)?;
                if self.copy() == 1 {
                    write!(f, "'")?;
                }
                Ok(())
            }
            _ => write!(f, "m{}", self.copy()),
        }
    }
}

/// A color/rank pair as it appears on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Face {
    pub color: Color,
    pub rank: u8,
}

impl Face {
    pub fn new(color: Color, rank: u8) -> Self {
        Face { color, rank }
    }

    /// Dense index 0..52, color-major
    pub fn index(&self) -> usize {
        self.color as usize * MAX_RANK as usize + (self.rank as usize - 1)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.letter(), self.rank)
    }
}

/// The round's wildcard (okey) face, one above the indicator tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WildcardFace {
    pub color: Color,
    pub rank: u8,
}

impl WildcardFace {
    pub fn new(color: Color, rank: u8) -> Self {
        assert!((1..=MAX_RANK).contains(&rank), "Rank must be 1-13");
        WildcardFace { color, rank }
    }

    /// Derive the wildcard face from the indicator, wrapping 13 -> 1.
    pub fn from_indicator(indicator: Tile) -> EngineResult<Self> {
        match (indicator.color(), indicator.rank()) {
            (Some(color), Some(rank)) => Ok(WildcardFace {
                color,
                rank: next_rank(rank),
            }),
            _ => Err(EngineError::precondition("a mimic tile cannot be the indicator")),
        }
    }

    pub fn face(&self) -> Face {
        Face::new(self.color, self.rank)
    }
}

/// Multiset of faces; the counting primitive behind pair and bucket accounting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaceTally(BTreeMap<Face, u8>);

impl FaceTally {
    pub fn new() -> Self {
        FaceTally(BTreeMap::new())
    }

    /// Tally every tile by face, wild or not
    pub fn of_all(tiles: &[Tile], wildcard: WildcardFace) -> Self {
        let mut tally = FaceTally::new();
        for tile in tiles {
            tally.add(tile.face(wildcard));
        }
        tally
    }

    /// Tally the non-wild tiles and return the wildcard count alongside
    pub fn of_normals(tiles: &[Tile], wildcard: WildcardFace) -> (Self, usize) {
        let mut tally = FaceTally::new();
        let mut wilds = 0;
        for tile in tiles {
            if tile.is_wild(wildcard) {
                wilds += 1;
            } else {
                tally.add(tile.face(wildcard));
            }
        }
        (tally, wilds)
    }

    pub fn add(&mut self, face: Face) {
        *self.0.entry(face).or_insert(0) += 1;
    }

    /// Remove one occurrence of a face
    pub fn remove(&mut self, face: &Face) -> bool {
        if let Some(count) = self.0.get_mut(face) {
            if *count > 0 {
                *count -= 1;
                if *count == 0 {
                    self.0.remove(face);
                }
                return true;
            }
        }
        false
    }

    pub fn count(&self, face: &Face) -> u8 {
        self.0.get(face).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Face, &u8)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Σ⌊count/2⌋ over all faces
    pub fn pair_count(&self) -> usize {
        self.0.values().map(|&c| c as usize / 2).sum()
    }

    /// Number of faces held an odd number of times
    pub fn odd_faces(&self) -> usize {
        self.0.values().filter(|&&c| c % 2 == 1).count()
    }
}

/// Shape of a meld
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeldKind {
    /// Consecutive ranks of one color, 13 -> 1 allowed only as the last step
    Run,
    /// One rank, 3-4 distinct colors
    Set,
    /// Two tiles of one face, or one wildcard completing a real tile
    Pair,
}

/// A group of tiles forming one meld
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meld {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
}

impl Meld {
    pub fn new(kind: MeldKind, tiles: Vec<Tile>) -> Self {
        Meld { kind, tiles }
    }

    /// Check this meld's shape on its own. Run tiles are read in order.
    pub fn is_valid(&self, wildcard: WildcardFace) -> bool {
        match self.kind {
            MeldKind::Run => run_matches(&self.tiles, wildcard),
            MeldKind::Set => set_matches(&self.tiles, wildcard),
            MeldKind::Pair => pair_matches(&self.tiles, wildcard),
        }
    }
}

/// A covering of a whole hand by melds
pub type Partition = Vec<Meld>;

/// Rank at `offset` within a run window starting at `start`.
///
/// Returns None when the window would step past 13 anywhere but its final
/// position, or past 1 after wrapping.
pub(crate) fn run_rank_at(start: u8, len: usize, offset: usize) -> Option<u8> {
    let raw = start as usize + offset;
    if raw <= MAX_RANK as usize {
        Some(raw as u8)
    } else if raw == MAX_RANK as usize + 1 && offset + 1 == len {
        Some(1)
    } else {
        None
    }
}

/// Ordered run check: tiles left to right encode consecutive ranks of one
/// color, wildcards fill any position.
pub fn run_matches(tiles: &[Tile], wildcard: WildcardFace) -> bool {
    let len = tiles.len();
    if !(3..=MAX_RANK as usize).contains(&len) {
        return false;
    }
    let faces: Vec<Option<Face>> = tiles
        .iter()
        .map(|t| (!t.is_wild(wildcard)).then(|| t.face(wildcard)))
        .collect();

    let Some(color) = faces.iter().flatten().map(|f| f.color).next() else {
        return false;
    };
    if faces.iter().flatten().any(|f| f.color != color) {
        return false;
    }

    (1..=MAX_RANK).any(|start| {
        faces.iter().enumerate().all(|(i, face)| match run_rank_at(start, len, i) {
            None => false,
            Some(expected) => face.is_none_or(|f| f.rank == expected),
        })
    })
}

/// Order-free set check: one rank, distinct colors, 3-4 tiles.
pub fn set_matches(tiles: &[Tile], wildcard: WildcardFace) -> bool {
    if !(3..=4).contains(&tiles.len()) {
        return false;
    }
    let faces: Vec<Face> = tiles
        .iter()
        .filter(|t| !t.is_wild(wildcard))
        .map(|t| t.face(wildcard))
        .collect();
    let Some(rank) = faces.first().map(|f| f.rank) else {
        return false;
    };
    let colors: HashSet<Color> = faces.iter().map(|f| f.color).collect();
    faces.iter().all(|f| f.rank == rank) && colors.len() == faces.len()
}

/// Two tiles of one face, or a wildcard paired with a non-wild tile.
pub fn pair_matches(tiles: &[Tile], wildcard: WildcardFace) -> bool {
    let [a, b] = tiles else {
        return false;
    };
    a.face(wildcard) == b.face(wildcard) || (a.is_wild(wildcard) != b.is_wild(wildcard))
}

/// Reject hands of the wrong size or holding the same physical tile twice.
pub(crate) fn ensure_hand(tiles: &[Tile], expected: usize) -> EngineResult<()> {
    if tiles.len() != expected {
        return Err(EngineError::precondition(format!(
            "expected {} tiles, got {}",
            expected,
            tiles.len()
        )));
    }
    ensure_distinct(tiles)
}

pub(crate) fn ensure_distinct(tiles: &[Tile]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(tiles.len());
    for tile in tiles {
        if !seen.insert(*tile) {
            return Err(EngineError::precondition(format!(
                "tile {} appears more than once",
                tile
            )));
        }
    }
    Ok(())
}

/// Parse a whitespace-separated list of tiles, e.g. "r1 r2 r3 m0"
pub fn parse_tiles(input: &str) -> EngineResult<Vec<Tile>> {
    input.split_whitespace().map(Tile::from_string).collect()
}

#[cfg(test)]
pub(crate) fn tiles(input: &str) -> Vec<Tile> {
    parse_tiles(input).unwrap()
}
