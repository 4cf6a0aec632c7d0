use std::path::PathBuf;
use std::process::ExitCode;

use protocol_engine::config::Config;
use protocol_engine::input::load_score_inputs;
use protocol_engine::logging::init_tracing;
use protocol_engine::scoring::compute_composite;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config);

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let inputs = match load_score_inputs(path.as_deref()) {
        Ok(inputs) => inputs,
        Err(err) => {
            tracing::error!(error = %err, "could not load score inputs");
            return ExitCode::FAILURE;
        }
    };

    let result = compute_composite(&inputs).rounded();
    let rendered = if config.pretty_json {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };

    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "could not serialize result");
            ExitCode::FAILURE
        }
    }
}
