#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! The host's configuration object seeds the frame rates, the debug overlay,
//! and the default view ordering. Values can come from code, from the
//! environment, or (with the `serde` feature) from any serde format.
//!
//! # Env Var Contract
//!
//! - `STAGECRAFT_FPS` - target tick rate while focused (integer >= 1)
//! - `STAGECRAFT_FPS_MIN` - degraded tick rate while unfocused (integer >= 1)
//! - `STAGECRAFT_DEBUG` - `1`/`true` enables diagnostics and the overlay
//! - `STAGECRAFT_OVERLAP` - `1`/`true` inserts incoming views before the
//!   outgoing exit transition finishes
//!
//! Unparsable values are ignored (with a warning) and the default is kept.
//! Range checks happen in [`EngineConfig::validate`], never by clamping.

use std::env;

use stagecraft_core::error::{EngineError, EngineResult};

pub const ENV_FPS: &str = "STAGECRAFT_FPS";
pub const ENV_FPS_MIN: &str = "STAGECRAFT_FPS_MIN";
pub const ENV_DEBUG: &str = "STAGECRAFT_DEBUG";
pub const ENV_OVERLAP: &str = "STAGECRAFT_OVERLAP";

/// Frame-rate, debug, and ordering settings for a [`Stage`](crate::stage::Stage).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Ticks per second while the host window has focus.
    pub target_rate: u32,
    /// Ticks per second while unfocused.
    pub degraded_rate: u32,
    /// Enables the diagnostics sampler and the debug overlay layer.
    pub debug: bool,
    /// Default ordering for view switches: `true` inserts the incoming view
    /// beneath the outgoing one before its exit transition finishes.
    pub overlap_order: bool,
    /// Most ticks a single host pulse may release; the rest of the debt
    /// carries to later pulses.
    pub max_ticks_per_pulse: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_rate: 60,
            degraded_rate: 12,
            debug: false,
            overlap_order: true,
            max_ticks_per_pulse: crate::clock::DEFAULT_MAX_TICKS_PER_PULSE,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_target_rate(mut self, rate: u32) -> Self {
        self.target_rate = rate;
        self
    }

    #[must_use]
    pub fn with_degraded_rate(mut self, rate: u32) -> Self {
        self.degraded_rate = rate;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_overlap_order(mut self, overlap: bool) -> Self {
        self.overlap_order = overlap;
        self
    }

    #[must_use]
    pub fn with_max_ticks_per_pulse(mut self, max: u32) -> Self {
        self.max_ticks_per_pulse = max;
        self
    }

    /// Reject rates below one tick per second and a zero catch-up limit.
    pub fn validate(&self) -> EngineResult<()> {
        if self.target_rate < 1 {
            return Err(EngineError::invalid_argument(format!(
                "target rate must be >= 1, got {}",
                self.target_rate
            )));
        }
        if self.degraded_rate < 1 {
            return Err(EngineError::invalid_argument(format!(
                "degraded rate must be >= 1, got {}",
                self.degraded_rate
            )));
        }
        if self.max_ticks_per_pulse < 1 {
            return Err(EngineError::invalid_argument(
                "max ticks per pulse must be >= 1, got 0",
            ));
        }
        Ok(())
    }

    /// Defaults overlaid with the `STAGECRAFT_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by env var name.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(rate) = parse_var(&lookup, ENV_FPS, |v| v.parse::<u32>().ok()) {
            config.target_rate = rate;
        }
        if let Some(rate) = parse_var(&lookup, ENV_FPS_MIN, |v| v.parse::<u32>().ok()) {
            config.degraded_rate = rate;
        }
        if let Some(debug) = parse_var(&lookup, ENV_DEBUG, parse_flag) {
            config.debug = debug;
        }
        if let Some(overlap) = parse_var(&lookup, ENV_OVERLAP, parse_flag) {
            config.overlap_order = overlap;
        }
        config
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparsable config value");
    }
    parsed
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.target_rate, 60);
        assert_eq!(config.degraded_rate, 12);
        assert!(!config.debug);
        assert!(config.overlap_order);
        assert_eq!(config.max_ticks_per_pulse, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_rates_fail_validation() {
        let err = EngineConfig::new().with_target_rate(0).validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        let err = EngineConfig::new().with_degraded_rate(0).validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        let err = EngineConfig::new()
            .with_max_ticks_per_pulse(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn env_values_overlay_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_FPS, "144"),
            (ENV_FPS_MIN, " 5 "),
            (ENV_DEBUG, "TRUE"),
            (ENV_OVERLAP, "0"),
        ]));
        assert_eq!(config.target_rate, 144);
        assert_eq!(config.degraded_rate, 5);
        assert!(config.debug);
        assert!(!config.overlap_order);
    }

    #[test]
    fn unparsable_env_values_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_FPS, "fast"),
            (ENV_DEBUG, "maybe"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn env_zero_rate_is_left_for_validate() {
        let config = EngineConfig::from_lookup(lookup(&[(ENV_FPS_MIN, "0")]));
        assert_eq!(config.degraded_rate, 0);
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_fills_missing_fields_from_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"target_rate": 30}"#).unwrap();
        assert_eq!(config.target_rate, 30);
        assert_eq!(config.degraded_rate, 12);
    }
}
