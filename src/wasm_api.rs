use crate::api;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Standard-mode win check
///
/// # Arguments
/// * `tiles` - JSON array of 14 tile strings (e.g., ["r1", "b5'", "m0"])
/// * `indicator` - The round's indicator tile; the wildcard is the next rank
///
/// # Returns
/// JSON string with `ok`, `wins`, and when winning `shape` and `partition`
#[wasm_bindgen(js_name = evaluateHand)]
pub fn evaluate_hand(tiles: &str, indicator: &str) -> String {
    api::evaluate_hand(tiles, indicator)
}

/// Pairs-mode win check, returns `ok`, `wins` and `pairing`
#[wasm_bindgen(js_name = evaluatePairsHand)]
pub fn evaluate_pairs_hand(tiles: &str, indicator: &str) -> String {
    api::evaluate_pairs_hand(tiles, indicator)
}

/// Validate a board given as row-major cells (tile string or null)
///
/// `config` is an `EngineConfig` JSON object; pass "" for the default 2x12 board.
#[wasm_bindgen(js_name = validateBoard)]
pub fn validate_board(cells: &str, indicator: &str, config: &str) -> String {
    api::validate_board(cells, indicator, config)
}

/// Group a hand and lay it out on the configured board
#[wasm_bindgen(js_name = displayBoard)]
pub fn display_board(tiles: &str, indicator: &str, config: &str, confirmed_win: bool) -> String {
    api::display_board(tiles, indicator, config, confirmed_win)
}

#[wasm_bindgen(js_name = groupForDisplay)]
pub fn group_for_display(tiles: &str, indicator: &str, mode: &str, confirmed_win: bool) -> String {
    api::group_for_display(tiles, indicator, mode, confirmed_win)
}

#[wasm_bindgen(js_name = chooseTakeDiscard)]
pub fn choose_take_discard(hand: &str, discard: &str, indicator: &str, mode: &str) -> String {
    api::choose_take_discard(hand, discard, indicator, mode)
}

#[wasm_bindgen(js_name = chooseDiscardIndex)]
pub fn choose_discard_index(hand: &str, indicator: &str, mode: &str) -> String {
    api::choose_discard_index(hand, indicator, mode)
}

/// Get the crate version this WASM module was built from
#[wasm_bindgen(js_name = engineVersion)]
pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
