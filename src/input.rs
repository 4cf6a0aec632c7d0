use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::scoring::ScoreInputs;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid score inputs: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a JSON `ScoreInputs` document from `path`, or stdin when `None`.
pub fn load_score_inputs(path: Option<&Path>) -> Result<ScoreInputs, InputError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InputError::Io {
            source_name: path.display().to_string(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| InputError::Io {
                    source_name: "stdin".to_string(),
                    source,
                })?;
            buf
        }
    };
    parse_score_inputs(&raw)
}

pub fn parse_score_inputs(raw: &str) -> Result<ScoreInputs, InputError> {
    Ok(serde_json::from_str(raw)?)
}
