use crate::board::{BOARD_COLS, BOARD_ROWS};
use crate::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which win rule a round is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Runs and sets (or seven exact pairs)
    #[default]
    #[serde(rename = "standard", alias = "human", alias = "bots")]
    Standard,
    /// Seven pairs only, wildcards may complete a pair
    #[serde(rename = "pairs")]
    Pairs,
}

impl FromStr for GameMode {
    type Err = EngineError;

    /// "human" and "bots" are seat arrangements that both play standard rules.
    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "standard" | "human" | "bots" => Ok(GameMode::Standard),
            "pairs" => Ok(GameMode::Pairs),
            _ => Err(EngineError::parse(s, "Unknown game mode")),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Standard => write!(f, "standard"),
            GameMode::Pairs => write!(f, "pairs"),
        }
    }
}

/// Tunables shared by the session, the board helpers and the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: GameMode,
    /// Delay before an automated seat acts, in milliseconds
    pub bot_delay_ms: u64,
    pub board_rows: usize,
    pub board_cols: usize,
    /// Points for an ordinary standard-mode win
    pub win_points: u32,
    /// Points for a standard-mode win finished by discarding a wildcard
    pub wildcard_discard_win_points: u32,
    pub pairs_win_points: u32,
    /// Awarded at deal time to every seat holding an indicator-faced tile
    pub indicator_bonus_points: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: GameMode::Standard,
            bot_delay_ms: 350,
            board_rows: BOARD_ROWS,
            board_cols: BOARD_COLS,
            win_points: 2,
            wildcard_discard_win_points: 4,
            pairs_win_points: 4,
            indicator_bonus_points: 1,
        }
    }
}

impl EngineConfig {
    /// Load a config from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if config.board_rows == 0 || config.board_cols == 0 {
            return Err(EngineError::precondition("board dimensions must be non-zero"));
        }
        if config.board_rows * config.board_cols < 14 {
            return Err(EngineError::precondition(format!(
                "a {}x{} board cannot hold 14 tiles",
                config.board_rows, config.board_cols
            )));
        }
        Ok(config)
    }

    /// Points awarded for a win under the configured mode.
    pub fn points_for_win(&self, discarded_wildcard: bool) -> u32 {
        match self.mode {
            GameMode::Pairs => self.pairs_win_points,
            GameMode::Standard if discarded_wildcard => self.wildcard_discard_win_points,
            GameMode::Standard => self.win_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_mode_from_str() {
        assert_eq!("standard".parse::<GameMode>().unwrap(), GameMode::Standard);
        assert_eq!("human".parse::<GameMode>().unwrap(), GameMode::Standard);
        assert_eq!("bots".parse::<GameMode>().unwrap(), GameMode::Standard);
        assert_eq!("pairs".parse::<GameMode>().unwrap(), GameMode::Pairs);
        assert!("poker".parse::<GameMode>().is_err());
    }

    #[test]
    fn test_game_mode_serde() {
        assert_eq!(serde_json::to_string(&GameMode::Pairs).unwrap(), "\"pairs\"");
        let mode: GameMode = serde_json::from_str("\"bots\"").unwrap();
        assert_eq!(mode, GameMode::Standard);
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config = EngineConfig::from_json(r#"{"mode":"pairs","bot_delay_ms":0}"#).unwrap();
        assert_eq!(config.mode, GameMode::Pairs);
        assert_eq!(config.bot_delay_ms, 0);
        assert_eq!(config.board_rows, 2);
        assert_eq!(config.board_cols, 12);
    }

    #[test]
    fn test_config_rejects_small_board() {
        assert!(EngineConfig::from_json(r#"{"board_rows":1,"board_cols":12}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"board_cols":0}"#).is_err());
    }

    #[test]
    fn test_points_for_win() {
        let mut config = EngineConfig::default();
        assert_eq!(config.points_for_win(false), 2);
        assert_eq!(config.points_for_win(true), 4);
        config.mode = GameMode::Pairs;
        assert_eq!(config.points_for_win(false), 4);
    }
}
