use crate::{EngineConfig, EngineError, EngineResult, GameMode, Tile};
use log::{debug, info};

pub const SEATS: usize = 4;

/// Ticket for a deferred automated action.
///
/// A ticket only stays current until the session schedules another action,
/// cancels, starts a round or resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    generation: u64,
    pub delay_ms: u64,
}

/// Score and dealer bookkeeping that outlives a single round.
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    scores: [u32; SEATS],
    next_dealer: usize,
    generation: u64,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Session {
            config,
            scores: [0; SEATS],
            next_dealer: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scores(&self) -> [u32; SEATS] {
        self.scores
    }

    /// Zero all scores and hand the deal back to seat 0.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.scores = [0; SEATS];
        self.next_dealer = 0;
        info!("session reset");
    }

    /// Start a round: drop any outstanding action, return this round's
    /// dealer and rotate the deal.
    pub fn begin_round(&mut self) -> usize {
        self.cancel_pending();
        let dealer = self.next_dealer;
        self.next_dealer = (dealer + 1) % SEATS;
        debug!("round dealt by seat {}", dealer);
        dealer
    }

    pub fn schedule_bot_action(&mut self) -> PendingAction {
        self.generation += 1;
        PendingAction {
            generation: self.generation,
            delay_ms: self.config.bot_delay_ms,
        }
    }

    pub fn cancel_pending(&mut self) {
        self.generation += 1;
    }

    /// A stale ticket must never act.
    pub fn is_current(&self, action: &PendingAction) -> bool {
        action.generation == self.generation
    }

    pub fn points_for_win(&self, mode: GameMode, discarded_wildcard: bool) -> u32 {
        let config = EngineConfig {
            mode,
            ..self.config.clone()
        };
        config.points_for_win(discarded_wildcard)
    }

    /// Credit `seat` for winning under the configured mode; returns the points.
    pub fn award_win(&mut self, seat: usize, discarded_wildcard: bool) -> EngineResult<u32> {
        ensure_seat(seat)?;
        let points = self.config.points_for_win(discarded_wildcard);
        self.scores[seat] += points;
        info!("seat {} wins {} points", seat, points);
        Ok(points)
    }

    /// Credit the deal-time bonus to each seat holding the indicator tile.
    pub fn award_indicator_bonus(
        &mut self,
        hands: &[Vec<Tile>],
        indicator: Tile,
    ) -> EngineResult<Vec<usize>> {
        if hands.len() > SEATS {
            return Err(EngineError::precondition(format!(
                "{} hands dealt, the table seats {}",
                hands.len(),
                SEATS
            )));
        }
        let seats = indicator_bonus_seats(hands, indicator);
        for &seat in &seats {
            self.scores[seat] += self.config.indicator_bonus_points;
        }
        Ok(seats)
    }
}

fn ensure_seat(seat: usize) -> EngineResult<()> {
    if seat >= SEATS {
        return Err(EngineError::precondition(format!(
            "seat {} is out of range, the table seats {}",
            seat, SEATS
        )));
    }
    Ok(())
}

impl Default for Session {
    fn default() -> Self {
        Session::new(EngineConfig::default())
    }
}

/// Seats whose hand holds a tile with the indicator's printed color and rank.
/// Mimic tiles never count.
pub fn indicator_bonus_seats(hands: &[Vec<Tile>], indicator: Tile) -> Vec<usize> {
    if indicator.is_mimic() {
        return Vec::new();
    }
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| {
            hand.iter().any(|t| {
                !t.is_mimic() && t.color() == indicator.color() && t.rank() == indicator.rank()
            })
        })
        .map(|(seat, _)| seat)
        .collect()
}
