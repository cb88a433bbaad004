//! Engine settings
//!
//! Read once at startup from the process environment (after `.env` has been
//! loaded by the binary). A variable that is missing or unparsable falls back
//! to its default with a warning; settings never abort startup.
//!
//! | Variable                     | Field                       | Default                  |
//! |------------------------------|-----------------------------|--------------------------|
//! | `CHRONICLE_AUTO_RESOLVE`     | `simultaneous_auto_resolve` | `true`                   |
//! | `CHRONICLE_MAX_TURN_HISTORY` | `max_turn_history`          | `200`                    |
//! | `CHRONICLE_DEFAULT_MASTERY`  | `default_skill_mastery`     | `1`                      |
//! | `RUST_LOG`                   | `log_filter`                | `chronicle_engine=info`  |

use serde::{Deserialize, Serialize};

pub const ENV_AUTO_RESOLVE: &str = "CHRONICLE_AUTO_RESOLVE";
pub const ENV_MAX_TURN_HISTORY: &str = "CHRONICLE_MAX_TURN_HISTORY";
pub const ENV_DEFAULT_MASTERY: &str = "CHRONICLE_DEFAULT_MASTERY";
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

pub const DEFAULT_LOG_FILTER: &str = "chronicle_engine=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Resolve a simultaneous round as soon as the last roster player submits.
    pub simultaneous_auto_resolve: bool,
    /// Journal entries kept on the world model; older entries are dropped.
    pub max_turn_history: usize,
    /// Mastery assumed for an active skill with no mastery record.
    pub default_skill_mastery: u32,
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            simultaneous_auto_resolve: true,
            max_turn_history: 200,
            default_skill_mastery: 1,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            simultaneous_auto_resolve: read(&lookup, ENV_AUTO_RESOLVE, parse_bool)
                .unwrap_or(defaults.simultaneous_auto_resolve),
            max_turn_history: read(&lookup, ENV_MAX_TURN_HISTORY, |raw| {
                raw.parse::<usize>().ok().filter(|cap| *cap > 0)
            })
            .unwrap_or(defaults.max_turn_history),
            default_skill_mastery: read(&lookup, ENV_DEFAULT_MASTERY, |raw| raw.parse().ok())
                .unwrap_or(defaults.default_skill_mastery),
            log_filter: lookup(ENV_LOG_FILTER)
                .filter(|raw| !raw.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}

fn read<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(variable = key, value = %raw, "Ignoring unparsable setting, using default");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
