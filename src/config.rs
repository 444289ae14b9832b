pub mod router_config;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;

pub use router_config::{EndpointSpec, InterfaceSpec, LinkSpec, RouterSpec, TopologySpec};

pub const DEFAULT_UPDATE_PERIOD: u32 = 30;
pub const DEFAULT_INVALID_TIMEOUT: u32 = 180;
pub const DEFAULT_FLUSH_TIMEOUT: u32 = 120;

/// What happens to the metric-16 announcements a router queues for its own
/// networks when one of its links goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectPoisonPolicy {
    /// Announced in the next serviced update, then dropped.
    #[default]
    OneShot,
    /// Announced in every update until the router sees another link event.
    UntilNextLinkEvent,
}

/// How the driver picks each router's first periodic update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupOffset {
    /// Uniform in `[1, update_period]`, drawn from the simulation RNG.
    #[default]
    Uniform,
    /// Every router starts with the same countdown (clamped to at least 1).
    Fixed(u32),
}

/// Protocol settings shared by every router of a simulation.
///
/// Routers never hold on to a copy: the driver hands the current snapshot to
/// every call that needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub update_period: u32,
    pub invalid_timeout: u32,
    pub flush_timeout: u32,
    pub split_horizon: bool,
    pub poison_reverse: bool,
    pub triggered_updates: bool,
    pub direct_poison: DirectPoisonPolicy,
    pub startup_offset: StartupOffset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_period: DEFAULT_UPDATE_PERIOD,
            invalid_timeout: DEFAULT_INVALID_TIMEOUT,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            split_horizon: true,
            poison_reverse: false,
            triggered_updates: true,
            direct_poison: DirectPoisonPolicy::OneShot,
            startup_offset: StartupOffset::Uniform,
        }
    }
}

impl Settings {
    /// Enforce the invariants every consumer relies on: timers are positive
    /// and poison reverse is off whenever split horizon is off.
    pub fn normalized(mut self) -> Self {
        if self.update_period == 0 {
            warn!("update_period must be positive, using {}", DEFAULT_UPDATE_PERIOD);
            self.update_period = DEFAULT_UPDATE_PERIOD;
        }
        if self.invalid_timeout == 0 {
            warn!("invalid_timeout must be positive, using {}", DEFAULT_INVALID_TIMEOUT);
            self.invalid_timeout = DEFAULT_INVALID_TIMEOUT;
        }
        if self.flush_timeout == 0 {
            warn!("flush_timeout must be positive, using {}", DEFAULT_FLUSH_TIMEOUT);
            self.flush_timeout = DEFAULT_FLUSH_TIMEOUT;
        }
        if !self.split_horizon {
            self.poison_reverse = false;
        }
        self
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path))?;
        Ok(settings.normalized())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing settings to {}", path))?;
        Ok(())
    }
}

/// Settings as typed by an operator: numeric fields are raw text.
///
/// Empty timer text falls back to the default timers, and the toggles default
/// to the same values as [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub update_period: String,
    pub invalid_timeout: String,
    pub flush_timeout: String,
    pub split_horizon: bool,
    pub poison_reverse: bool,
    pub triggered_updates: bool,
    pub direct_poison: DirectPoisonPolicy,
    pub startup_offset: StartupOffset,
}

impl Default for RawSettings {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            update_period: String::new(),
            invalid_timeout: String::new(),
            flush_timeout: String::new(),
            split_horizon: defaults.split_horizon,
            poison_reverse: defaults.poison_reverse,
            triggered_updates: defaults.triggered_updates,
            direct_poison: defaults.direct_poison,
            startup_offset: defaults.startup_offset,
        }
    }
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Settings {
            update_period: parse_seconds("update_period", &raw.update_period, DEFAULT_UPDATE_PERIOD),
            invalid_timeout: parse_seconds("invalid_timeout", &raw.invalid_timeout, DEFAULT_INVALID_TIMEOUT),
            flush_timeout: parse_seconds("flush_timeout", &raw.flush_timeout, DEFAULT_FLUSH_TIMEOUT),
            split_horizon: raw.split_horizon,
            poison_reverse: raw.poison_reverse,
            triggered_updates: raw.triggered_updates,
            direct_poison: raw.direct_poison,
            startup_offset: raw.startup_offset,
        }
        .normalized()
    }
}

/// Parse a positive number of seconds, falling back to `default` for
/// anything else.
pub fn parse_seconds(field: &str, input: &str, default: u32) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => {
            warn!("{}: cannot use {:?}, falling back to {}s", field, input, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ripng_timers() {
        let settings = Settings::default();
        assert_eq!(settings.update_period, 30);
        assert_eq!(settings.invalid_timeout, 180);
        assert_eq!(settings.flush_timeout, 120);
        assert!(settings.split_horizon);
        assert!(!settings.poison_reverse);
        assert!(settings.triggered_updates);
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let raw = RawSettings {
            update_period: "abc".into(),
            invalid_timeout: "".into(),
            flush_timeout: "0".into(),
            split_horizon: true,
            ..Default::default()
        };
        let settings = Settings::from(raw);
        assert_eq!(settings.update_period, DEFAULT_UPDATE_PERIOD);
        assert_eq!(settings.invalid_timeout, DEFAULT_INVALID_TIMEOUT);
        assert_eq!(settings.flush_timeout, DEFAULT_FLUSH_TIMEOUT);
    }

    #[test]
    fn parses_valid_numbers_with_whitespace() {
        let raw = RawSettings {
            update_period: " 10 ".into(),
            invalid_timeout: "60".into(),
            flush_timeout: "40".into(),
            ..Default::default()
        };
        let settings = Settings::from(raw);
        assert_eq!(settings.update_period, 10);
        assert_eq!(settings.invalid_timeout, 60);
        assert_eq!(settings.flush_timeout, 40);
    }

    #[test]
    fn disabling_split_horizon_forces_poison_reverse_off() {
        let settings = Settings {
            split_horizon: false,
            poison_reverse: true,
            ..Settings::default()
        }
        .normalized();
        assert!(!settings.poison_reverse);

        let raw = RawSettings {
            split_horizon: false,
            poison_reverse: true,
            ..Default::default()
        };
        assert!(!Settings::from(raw).poison_reverse);
    }

    #[test]
    fn poison_reverse_survives_with_split_horizon() {
        let settings = Settings {
            poison_reverse: true,
            ..Settings::default()
        }
        .normalized();
        assert!(settings.poison_reverse);
    }

    #[test]
    fn empty_raw_settings_convert_to_defaults() {
        let raw = RawSettings::default();
        assert!(raw.split_horizon);
        assert!(raw.triggered_updates);
        assert_eq!(Settings::from(raw), Settings::default());

        let partial: RawSettings = serde_json::from_str(r#"{"update_period": "12"}"#).unwrap();
        let settings = Settings::from(partial);
        assert_eq!(settings.update_period, 12);
        assert!(settings.split_horizon);
        assert!(settings.triggered_updates);
    }

    #[test]
    fn saved_settings_load_back() {
        let path = std::env::temp_dir().join(format!("ripng-sim-settings-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        let settings = Settings {
            update_period: 7,
            poison_reverse: true,
            direct_poison: DirectPoisonPolicy::UntilNextLinkEvent,
            startup_offset: StartupOffset::Fixed(3),
            ..Settings::default()
        };
        settings.save(path).unwrap();
        let loaded = Settings::load(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn settings_json_fills_missing_fields() {
        let settings: Settings =
            serde_json::from_str(r#"{"update_period": 5, "direct_poison": "until_next_link_event"}"#).unwrap();
        assert_eq!(settings.update_period, 5);
        assert_eq!(settings.invalid_timeout, DEFAULT_INVALID_TIMEOUT);
        assert_eq!(settings.direct_poison, DirectPoisonPolicy::UntilNextLinkEvent);
    }
}
