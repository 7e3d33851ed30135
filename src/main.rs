use log::error;
use okey_engine::{GameMode, api};
use std::process::ExitCode;

const USAGE: &str = "usage: okey-engine <evaluate|pairs|group> <indicator> <tile>...";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [command, indicator, tiles @ ..] = args.as_slice() else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    let tiles_json = match serde_json::to_string(tiles) {
        Ok(json) => json,
        Err(err) => {
            error!("could not encode tiles: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let output = match command.as_str() {
        "evaluate" => api::evaluate_hand(&tiles_json, indicator),
        "pairs" => api::evaluate_pairs_hand(&tiles_json, indicator),
        "group" => {
            let mode = GameMode::Standard.to_string();
            api::group_for_display(&tiles_json, indicator, &mode, false)
        }
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", output);
    ExitCode::SUCCESS
}
