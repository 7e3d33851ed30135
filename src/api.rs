//! JSON boundary shared by the wasm exports and the CLI.
//!
//! Every function takes plain strings and returns a JSON document. Tiles use
//! the text format of [`Tile::from_string`]; the round's wildcard is given by
//! its indicator tile. Failures come back as `{"ok":false,"error":"..."}`.

use crate::board::{Board, validate_board as validate_board_cells};
use crate::solver::WinShape;
use crate::{EngineConfig, EngineResult, GameMode, Meld, MeldKind, Tile, WildcardFace};
use crate::{bot, display, pairs, solver};
use log::warn;
use serde::{Deserialize, Serialize};

/// JSON-serializable representation of a meld
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeldJson {
    Run { tiles: Vec<String> },
    Set { tiles: Vec<String> },
    Pair { tiles: Vec<String> },
}

impl From<&Meld> for MeldJson {
    fn from(meld: &Meld) -> Self {
        let tiles = tile_strings(&meld.tiles);
        match meld.kind {
            MeldKind::Run => MeldJson::Run { tiles },
            MeldKind::Set => MeldJson::Set { tiles },
            MeldKind::Pair => MeldJson::Pair { tiles },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub ok: bool,
    pub wins: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<WinShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<Vec<MeldJson>>,
}

#[derive(Debug, Serialize)]
pub struct PairsResponse {
    pub ok: bool,
    pub wins: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<Vec<MeldJson>>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub ok: bool,
    pub wins: bool,
}

#[derive(Debug, Serialize)]
pub struct BoardLayoutResponse {
    pub ok: bool,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub ok: bool,
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TakeDiscardResponse {
    pub ok: bool,
    pub take: bool,
}

#[derive(Debug, Serialize)]
pub struct DiscardIndexResponse {
    pub ok: bool,
    pub index: usize,
    pub tile: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

/// Standard-mode win check for a JSON array of 14 tiles.
pub fn evaluate_hand(tiles_json: &str, indicator: &str) -> String {
    respond(evaluate_hand_internal(tiles_json, indicator))
}

fn evaluate_hand_internal(tiles_json: &str, indicator: &str) -> EngineResult<EvaluateResponse> {
    let tiles = parse_tile_json(tiles_json)?;
    let wildcard = parse_indicator(indicator)?;
    let result = solver::evaluate_hand(&tiles, wildcard)?;
    Ok(EvaluateResponse {
        ok: true,
        wins: result.wins,
        shape: result.shape,
        partition: result.partition.as_deref().map(melds_json),
    })
}

/// Pairs-mode win check for a JSON array of 14 tiles.
pub fn evaluate_pairs_hand(tiles_json: &str, indicator: &str) -> String {
    respond(evaluate_pairs_internal(tiles_json, indicator))
}

fn evaluate_pairs_internal(tiles_json: &str, indicator: &str) -> EngineResult<PairsResponse> {
    let tiles = parse_tile_json(tiles_json)?;
    let wildcard = parse_indicator(indicator)?;
    let result = pairs::evaluate_pairs_hand(&tiles, wildcard)?;
    Ok(PairsResponse {
        ok: true,
        wins: result.wins,
        pairing: result.pairing.as_deref().map(melds_json),
    })
}

/// Check a laid-out board. `cells_json` is a row-major array with one entry
/// per slot, each a tile string or null. The board size comes from
/// `config_json`; an empty string means the default 2x12 board.
pub fn validate_board(cells_json: &str, indicator: &str, config_json: &str) -> String {
    respond(validate_board_internal(cells_json, indicator, config_json))
}

fn validate_board_internal(
    cells_json: &str,
    indicator: &str,
    config_json: &str,
) -> EngineResult<BoardResponse> {
    let config = parse_config(config_json)?;
    let raw: Vec<Option<String>> = serde_json::from_str(cells_json)?;
    let cells = raw
        .iter()
        .map(|cell| cell.as_deref().map(Tile::from_string).transpose())
        .collect::<EngineResult<Vec<_>>>()?;
    let board = Board::from_cells(config.board_rows, config.board_cols, cells)?;
    let wildcard = parse_indicator(indicator)?;
    Ok(BoardResponse {
        ok: true,
        wins: validate_board_cells(&board, wildcard)?,
    })
}

/// Group a hand and lay it out on the board described by `config_json`,
/// under the configured mode.
pub fn display_board(
    tiles_json: &str,
    indicator: &str,
    config_json: &str,
    confirmed_win: bool,
) -> String {
    respond(display_board_internal(tiles_json, indicator, config_json, confirmed_win))
}

fn display_board_internal(
    tiles_json: &str,
    indicator: &str,
    config_json: &str,
    confirmed_win: bool,
) -> EngineResult<BoardLayoutResponse> {
    let config = parse_config(config_json)?;
    let tiles = parse_tile_json(tiles_json)?;
    let wildcard = parse_indicator(indicator)?;
    let board = display::display_board(&tiles, wildcard, &config, confirmed_win);
    Ok(BoardLayoutResponse {
        ok: true,
        rows: board.rows(),
        cols: board.cols(),
        cells: board.cells().iter().map(|c| c.map(|t| t.to_string())).collect(),
    })
}

/// Display grouping for any number of tiles.
pub fn group_for_display(
    tiles_json: &str,
    indicator: &str,
    mode: &str,
    confirmed_win: bool,
) -> String {
    respond(group_internal(tiles_json, indicator, mode, confirmed_win))
}

fn group_internal(
    tiles_json: &str,
    indicator: &str,
    mode: &str,
    confirmed_win: bool,
) -> EngineResult<GroupResponse> {
    let tiles = parse_tile_json(tiles_json)?;
    let wildcard = parse_indicator(indicator)?;
    let mode: GameMode = mode.parse()?;
    let groups = display::group_for_display(&tiles, wildcard, mode, confirmed_win);
    Ok(GroupResponse {
        ok: true,
        groups: groups.iter().map(|g| tile_strings(g)).collect(),
    })
}

/// Should an automated seat holding `hand_json` take `discard`?
pub fn choose_take_discard(
    hand_json: &str,
    discard: &str,
    indicator: &str,
    mode: &str,
) -> String {
    respond(take_discard_internal(hand_json, discard, indicator, mode))
}

fn take_discard_internal(
    hand_json: &str,
    discard: &str,
    indicator: &str,
    mode: &str,
) -> EngineResult<TakeDiscardResponse> {
    let hand = parse_tile_json(hand_json)?;
    let discard = Tile::from_string(discard)?;
    let wildcard = parse_indicator(indicator)?;
    let mode: GameMode = mode.parse()?;
    Ok(TakeDiscardResponse {
        ok: true,
        take: bot::choose_take_discard(&hand, discard, wildcard, mode)?,
    })
}

/// Which of 15 held tiles an automated seat discards.
pub fn choose_discard_index(hand_json: &str, indicator: &str, mode: &str) -> String {
    respond(discard_index_internal(hand_json, indicator, mode))
}

fn discard_index_internal(
    hand_json: &str,
    indicator: &str,
    mode: &str,
) -> EngineResult<DiscardIndexResponse> {
    let hand = parse_tile_json(hand_json)?;
    let wildcard = parse_indicator(indicator)?;
    let mode: GameMode = mode.parse()?;
    let index = bot::choose_discard_index(&hand, wildcard, mode)?;
    Ok(DiscardIndexResponse {
        ok: true,
        index,
        tile: hand[index].to_string(),
    })
}

/// Parse a JSON array of tile strings
pub fn parse_tile_json(json: &str) -> EngineResult<Vec<Tile>> {
    let strs: Vec<String> = serde_json::from_str(json)?;
    strs.iter().map(|s| Tile::from_string(s)).collect()
}

fn parse_config(json: &str) -> EngineResult<EngineConfig> {
    if json.trim().is_empty() {
        Ok(EngineConfig::default())
    } else {
        EngineConfig::from_json(json)
    }
}

fn parse_indicator(indicator: &str) -> EngineResult<WildcardFace> {
    WildcardFace::from_indicator(Tile::from_string(indicator)?)
}

fn tile_strings(tiles: &[Tile]) -> Vec<String> {
    tiles.iter().map(|t| t.to_string()).collect()
}

fn melds_json(melds: &[Meld]) -> Vec<MeldJson> {
    melds.iter().map(MeldJson::from).collect()
}

fn respond<T: Serialize>(result: EngineResult<T>) -> String {
    let encoded = match result {
        Ok(body) => serde_json::to_string(&body),
        Err(err) => {
            warn!("request rejected: {}", err);
            serde_json::to_string(&ErrorResponse {
                ok: false,
                error: err.to_string(),
            })
        }
    };
    encoded.unwrap_or_else(|e| {
        format!(r#"{{"ok":false,"error":"Serialization error: {}"}}"#, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    // Indicator b7 makes b8 the wildcard
    const INDICATOR: &str = "b7";

    fn hand_json(hand: &str) -> String {
        let strs: Vec<&str> = hand.split_whitespace().collect();
        serde_json::to_string(&strs).unwrap()
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_evaluate_winning_hand() {
        let hand = hand_json("r1 b1 k1 r2 r3 r4 r5 y6 k6 b6 k10 k11 k12 k13");
        let out = parse(&evaluate_hand(&hand, INDICATOR));
        assert_eq!(out["ok"], true);
        assert_eq!(out["wins"], true);
        assert_eq!(out["shape"], "melds");
        assert_eq!(out["partition"].as_array().unwrap().len(), 4);
        assert!(out.get("error").is_none());
    }

    #[test]
    fn test_evaluate_seven_pairs_shape() {
        let hand = hand_json("r1 r1' b4 b4' k7 k7' y9 y9' r13 r13' k2 k2' y5 y5'");
        let out = parse(&evaluate_hand(&hand, INDICATOR));
        assert_eq!(out["shape"], "seven_pairs");
        assert_eq!(out["partition"][0]["type"], "pair");
    }

    #[test]
    fn test_losing_hand_omits_partition() {
        let hand = hand_json("r1 b3 k5 r7 r9 r11 y2 y4 k8 b10 k12 b13 y13 r13");
        let out = parse(&evaluate_hand(&hand, INDICATOR));
        assert_eq!(out["ok"], true);
        assert_eq!(out["wins"], false);
        assert!(out.get("partition").is_none());
        assert!(out.get("shape").is_none());
    }

    #[test]
    fn test_bad_input_reports_error() {
        let out = parse(&evaluate_hand(&hand_json("r1 r2 r3"), INDICATOR));
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().contains("Precondition"));

        let out = parse(&evaluate_hand("not json", INDICATOR));
        assert_eq!(out["ok"], false);

        let out = parse(&evaluate_hand(&hand_json("r1 x2"), INDICATOR));
        assert!(out["error"].as_str().unwrap().contains("Parse error"));

        let hand = hand_json("r1 b1 k1 r2 r3 r4 r5 y6 k6 b6 k10 k11 k12 k13");
        let out = parse(&evaluate_hand(&hand, "m0"));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn test_pairs_endpoint() {
        let hand = hand_json("r1 r1' b4 b4' k7 k7' y9 y9' r13 r13' k2 k2' b8 b8'");
        let out = parse(&evaluate_pairs_hand(&hand, INDICATOR));
        assert_eq!(out["wins"], true);
        assert_eq!(out["pairing"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_validate_board_endpoint() {
        let mut cells: Vec<Option<&str>> = vec![None; 24];
        let layout = [
            (0, "r1"),
            (1, "b1"),
            (2, "k1"),
            (4, "r2"),
            (5, "r3"),
            (6, "r4"),
            (7, "r5"),
            (12, "y6"),
            (13, "k6"),
            (14, "b6"),
            (16, "k10"),
            (17, "k11"),
            (18, "k12"),
            (19, "k13"),
        ];
        for (index, tile) in layout {
            cells[index] = Some(tile);
        }
        let json = serde_json::to_string(&cells).unwrap();
        let out = parse(&validate_board(&json, INDICATOR, ""));
        assert_eq!(out["ok"], true);
        assert_eq!(out["wins"], true);

        let out = parse(&validate_board("[null, \"r1\"]", INDICATOR, ""));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn test_validate_board_uses_configured_size() {
        // The same four melds on a 3x7 rack
        let mut cells: Vec<Option<&str>> = vec![None; 21];
        let layout = [
            (0, "r1"),
            (1, "b1"),
            (2, "k1"),
            (4, "y6"),
            (5, "k6"),
            (6, "b6"),
            (7, "r2"),
            (8, "r3"),
            (9, "r4"),
            (10, "r5"),
            (14, "k10"),
            (15, "k11"),
            (16, "k12"),
            (17, "k13"),
        ];
        for (index, tile) in layout {
            cells[index] = Some(tile);
        }
        let json = serde_json::to_string(&cells).unwrap();
        let config = r#"{"board_rows":3,"board_cols":7}"#;
        let out = parse(&validate_board(&json, INDICATOR, config));
        assert_eq!(out["ok"], true);
        assert_eq!(out["wins"], true);

        // 21 cells do not fit the default 2x12 rack
        let out = parse(&validate_board(&json, INDICATOR, ""));
        assert_eq!(out["ok"], false);

        let out = parse(&validate_board(&json, INDICATOR, r#"{"board_rows":0}"#));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn test_display_board_endpoint() {
        let hand = hand_json("r1 b1 k1 r2 r3 r4 r5 y6 k6 b6 k10 k11 k12 k13");
        let config = r#"{"board_rows":3,"board_cols":8}"#;
        let out = parse(&display_board(&hand, INDICATOR, config, true));
        assert_eq!(out["ok"], true);
        assert_eq!(out["rows"], 3);
        assert_eq!(out["cols"], 8);
        let cells = out["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 24);
        assert_eq!(cells.iter().filter(|c| !c.is_null()).count(), 14);

        let out = parse(&display_board(&hand, INDICATOR, "", false));
        assert_eq!(out["cells"].as_array().unwrap().len(), 24);
        assert_eq!(out["cols"], 12);
    }

    #[test]
    fn test_group_endpoint() {
        let hand = hand_json("r1 r2 r3 r4 k9 y9 b9 b2");
        let out = parse(&group_for_display(&hand, INDICATOR, "standard", false));
        assert_eq!(out["groups"][0], serde_json::json!(["r1", "r2", "r3", "r4"]));
        assert_eq!(out["groups"][1].as_array().unwrap().len(), 3);

        let out = parse(&group_for_display(&hand, INDICATOR, "chess", false));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn test_bot_endpoints() {
        let hand = hand_json("r1 r2 r3 b5 k5 y9 y10 k12 r13 b13' y3 k7 r7 b2");
        let out = parse(&choose_take_discard(&hand, "y5", INDICATOR, "bots"));
        assert_eq!(out["take"], true);

        let hand = hand_json("r1 r2 r3 b5 k5 y5 k10 k11 k12 b8 r7 r8 r9 y1 y13");
        let out = parse(&choose_discard_index(&hand, INDICATOR, "standard"));
        assert_eq!(out["index"], 14);
        assert_eq!(out["tile"], "y13");
    }
}
