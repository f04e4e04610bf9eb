//! Process configuration read from the environment.
//!
//! Every setting has a default; values that fail to parse are reported with
//! a warning and replaced by the default so a typo never prevents start-up.

use weddingdesk_guests::ImportOptions;
use weddingdesk_observability::{LogConfig, LogFormat};

pub const CSV_DELIMITER_VAR: &str = "WEDDINGDESK_CSV_DELIMITER";
pub const LOG_FORMAT_VAR: &str = "WEDDINGDESK_LOG_FORMAT";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeddingDeskConfig {
    pub import: ImportOptions,
    pub log: LogConfig,
}

impl WeddingDeskConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let delimiter = match lookup(CSV_DELIMITER_VAR) {
            None => defaults.import.delimiter,
            Some(raw) => parse_delimiter(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    var = CSV_DELIMITER_VAR,
                    value = %raw,
                    "expected a single character; using default delimiter"
                );
                defaults.import.delimiter
            }),
        };

        let format = match lookup(LOG_FORMAT_VAR) {
            None => defaults.log.format,
            Some(raw) => raw.parse::<LogFormat>().unwrap_or_else(|err| {
                tracing::warn!(var = LOG_FORMAT_VAR, error = %err, "using default log format");
                defaults.log.format
            }),
        };

        let filter = lookup(LOG_FILTER_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.log.filter);

        Self {
            import: ImportOptions { delimiter },
            log: LogConfig { filter, format },
        }
    }
}

/// A delimiter is exactly one character; `\t` is accepted for tab.
fn parse_delimiter(raw: &str) -> Option<char> {
    if raw == "\\t" {
        return Some('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '"' && c != '\n' && c != '\r' => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> WeddingDeskConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WeddingDeskConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.import.delimiter, ',');
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn reads_all_settings() {
        let config = config_from(&[
            (CSV_DELIMITER_VAR, ";"),
            (LOG_FORMAT_VAR, "pretty"),
            (LOG_FILTER_VAR, "weddingdesk_guests=debug"),
        ]);
        assert_eq!(config.import.delimiter, ';');
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.filter, "weddingdesk_guests=debug");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            (CSV_DELIMITER_VAR, ";;"),
            (LOG_FORMAT_VAR, "xml"),
            (LOG_FILTER_VAR, "  "),
        ]);
        assert_eq!(config, WeddingDeskConfig::default());
    }

    #[test]
    fn escaped_tab_is_a_delimiter() {
        assert_eq!(config_from(&[(CSV_DELIMITER_VAR, "\\t")]).import.delimiter, '\t');
        assert_eq!(config_from(&[(CSV_DELIMITER_VAR, "\"")]).import.delimiter, ',');
    }
}
