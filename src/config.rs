//! Environment-variable overrides for HandsOn
//!
//! Each variable optionally overrides the matching setting from the config
//! file (see config_file module). Invalid values are logged and ignored.
//!
//! Environment variables (all optional):
//! - HANDS_ON_WPM_MIN: Lower bound of the typing speed range
//! - HANDS_ON_WPM_MAX: Upper bound of the typing speed range
//! - HANDS_ON_ERROR_RATE: Typo probability per word (0.0-1.0)
//! - HANDS_ON_URGENT_MODE: Type at full speed without mistakes (true/false)

use crate::config_file::Config;
use crate::constants::WPM_LIMIT;
use log::{debug, info, warn};
use std::env;

pub const WPM_MIN_VAR: &str = "HANDS_ON_WPM_MIN";
pub const WPM_MAX_VAR: &str = "HANDS_ON_WPM_MAX";
pub const ERROR_RATE_VAR: &str = "HANDS_ON_ERROR_RATE";
pub const URGENT_MODE_VAR: &str = "HANDS_ON_URGENT_MODE";

fn parse_wpm(var: &str) -> Option<u32> {
    match env::var(var) {
        Ok(val) => match val.trim().parse::<u32>() {
            Ok(wpm) if (1..=WPM_LIMIT).contains(&wpm) => {
                info!("{} set via environment variable: {}", var, wpm);
                Some(wpm)
            }
            Ok(wpm) => {
                warn!(
                    "Invalid {}: {} (must be 1-{}). Using config file.",
                    var, wpm, WPM_LIMIT
                );
                None
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using config file.", var, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", var);
            None
        }
    }
}

fn parse_rate(var: &str) -> Option<f64> {
    match env::var(var) {
        Ok(val) => match val.trim().parse::<f64>() {
            Ok(rate) if (0.0..=1.0).contains(&rate) => {
                info!("{} set via environment variable: {}", var, rate);
                Some(rate)
            }
            Ok(rate) => {
                warn!(
                    "Invalid {}: {} (must be 0.0-1.0). Using config file.",
                    var, rate
                );
                None
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using config file.", var, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", var);
            None
        }
    }
}

fn parse_flag(var: &str) -> Option<bool> {
    let val = match env::var(var) {
        Ok(val) => val,
        Err(_) => {
            debug!("{} not set.", var);
            return None;
        }
    };
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => {
            info!("{} enabled via environment variable", var);
            Some(true)
        }
        "0" | "false" | "no" | "off" => {
            info!("{} disabled via environment variable", var);
            Some(false)
        }
        other => {
            warn!(
                "Invalid {}: '{}' (expected true/false). Using config file.",
                var, other
            );
            None
        }
    }
}

/// Parse the HANDS_ON_WPM_MIN environment variable (1-400)
pub fn parse_wpm_min() -> Option<u32> {
    parse_wpm(WPM_MIN_VAR)
}

/// Parse the HANDS_ON_WPM_MAX environment variable (1-400)
pub fn parse_wpm_max() -> Option<u32> {
    parse_wpm(WPM_MAX_VAR)
}

/// Parse the HANDS_ON_ERROR_RATE environment variable (0.0-1.0)
pub fn parse_error_rate() -> Option<f64> {
    parse_rate(ERROR_RATE_VAR)
}

/// Parse the HANDS_ON_URGENT_MODE environment variable
pub fn parse_urgent_mode() -> Option<bool> {
    parse_flag(URGENT_MODE_VAR)
}

/// Overlay every valid environment override onto `config`.
///
/// A WPM override that would invert the range is dropped.
pub fn apply_env_overrides(config: &mut Config) {
    let wpm_min = parse_wpm_min().unwrap_or(config.wpm_min);
    let wpm_max = parse_wpm_max().unwrap_or(config.wpm_max);
    if wpm_min <= wpm_max {
        config.wpm_min = wpm_min;
        config.wpm_max = wpm_max;
    } else {
        warn!(
            "WPM overrides give an inverted range ({}-{}). Keeping {}-{}.",
            wpm_min, wpm_max, config.wpm_min, config.wpm_max
        );
    }
    if let Some(rate) = parse_error_rate() {
        config.error_rate = rate;
    }
    if let Some(urgent) = parse_urgent_mode() {
        config.urgent_mode = urgent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its variable names so parallel tests never race

    #[test]
    fn test_parse_wpm_valid_values() {
        let var = "HANDS_ON_TEST_WPM_VALID";
        env::set_var(var, "1");
        assert_eq!(parse_wpm(var), Some(1), "Should accept 1");

        env::set_var(var, "65");
        assert_eq!(parse_wpm(var), Some(65), "Should accept 65");

        env::set_var(var, " 120 ");
        assert_eq!(parse_wpm(var), Some(120), "Should trim whitespace");

        env::set_var(var, "400");
        assert_eq!(parse_wpm(var), Some(400), "Should accept the limit");

        env::remove_var(var);
    }

    #[test]
    fn test_parse_wpm_invalid_values() {
        let var = "HANDS_ON_TEST_WPM_INVALID";
        env::set_var(var, "0");
        assert_eq!(parse_wpm(var), None, "Should reject 0");

        env::set_var(var, "401");
        assert_eq!(parse_wpm(var), None, "Should reject above limit");

        env::set_var(var, "-5");
        assert_eq!(parse_wpm(var), None, "Should reject negative value");

        env::set_var(var, "fast");
        assert_eq!(parse_wpm(var), None, "Should reject non-numeric value");

        env::set_var(var, "");
        assert_eq!(parse_wpm(var), None, "Should reject empty string");

        env::remove_var(var);
        assert_eq!(parse_wpm(var), None, "Should return None when not set");
    }

    #[test]
    fn test_parse_rate_boundaries() {
        let var = "HANDS_ON_TEST_RATE";
        env::set_var(var, "0");
        assert_eq!(parse_rate(var), Some(0.0));

        env::set_var(var, "1.0");
        assert_eq!(parse_rate(var), Some(1.0));

        env::set_var(var, "0.05");
        assert_eq!(parse_rate(var), Some(0.05));

        env::set_var(var, "1.01");
        assert_eq!(parse_rate(var), None, "Should reject above 1.0");

        env::set_var(var, "-0.1");
        assert_eq!(parse_rate(var), None, "Should reject negative");

        env::set_var(var, "NaN");
        assert_eq!(parse_rate(var), None, "Should reject NaN");

        env::remove_var(var);
    }

    #[test]
    fn test_parse_flag_values() {
        let var = "HANDS_ON_TEST_FLAG";
        for truthy in ["1", "true", "TRUE", "yes", "on"] {
            env::set_var(var, truthy);
            assert_eq!(parse_flag(var), Some(true), "{} should enable", truthy);
        }
        for falsy in ["0", "false", "No", "off"] {
            env::set_var(var, falsy);
            assert_eq!(parse_flag(var), Some(false), "{} should disable", falsy);
        }
        env::set_var(var, "maybe");
        assert_eq!(parse_flag(var), None);

        env::remove_var(var);
        assert_eq!(parse_flag(var), None);
    }
}
