use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logs: false,
            log_dir: PathBuf::from("./logs"),
            pretty_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or garbled values fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_level = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.log_level);

        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|value| parse_flag(&value))
            .unwrap_or(defaults.file_logs);

        let log_dir = lookup("LOG_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let pretty_json = lookup("PRETTY_JSON")
            .map(|value| parse_flag(&value))
            .unwrap_or(defaults.pretty_json);

        Self {
            log_level,
            file_logs,
            log_dir,
            pretty_json,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
