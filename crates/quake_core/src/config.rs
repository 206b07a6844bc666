use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{MagnitudeThreshold, TimeRangeSelector};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "quake.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub feed_base_url: String,
    pub search_url: String,
    pub plate_boundaries_url: String,
    pub default_range: TimeRangeSelector,
    pub default_min_magnitude: MagnitudeThreshold,
    pub recenter_zoom: u8,
    pub recenter_duration_secs: f64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_base_url: "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary".into(),
            search_url: "https://earthquake.usgs.gov/fdsnws/event/1/query".into(),
            plate_boundaries_url:
                "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json"
                    .into(),
            default_range: TimeRangeSelector::Day,
            default_min_magnitude: MagnitudeThreshold::default(),
            recenter_zoom: 6,
            recenter_duration_secs: 2.0,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Defaults, then the optional TOML file, then `QUAKE__*` environment variables.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            for (key, value) in file_cfg {
                let value = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                apply_setting(&mut settings, &key, &value);
            }
        }
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
        Err(_) => {}
    }

    for (key, value) in std::env::vars() {
        if let Some(key) = key.strip_prefix("QUAKE__") {
            apply_setting(&mut settings, &key.to_ascii_lowercase(), &value);
        }
    }

    Ok(settings)
}

fn apply_setting(settings: &mut Settings, key: &str, value: &str) {
    match key {
        "feed_base_url" => settings.feed_base_url = value.trim_end_matches('/').to_string(),
        "search_url" => settings.search_url = value.to_string(),
        "plate_boundaries_url" => settings.plate_boundaries_url = value.to_string(),
        "default_range" => match value.parse::<TimeRangeSelector>() {
            Ok(range) => settings.default_range = range,
            Err(err) => warn!("ignoring setting {key}: {err}"),
        },
        "default_min_magnitude" => match value.parse::<f64>() {
            Ok(parsed) => match MagnitudeThreshold::new(parsed) {
                Ok(threshold) => settings.default_min_magnitude = threshold,
                Err(err) => warn!("ignoring setting {key}: {err}"),
            },
            Err(err) => warn!("ignoring setting {key}: {err}"),
        },
        "recenter_zoom" => match value.parse::<u8>() {
            Ok(parsed) => settings.recenter_zoom = parsed,
            Err(err) => warn!("ignoring setting {key}: {err}"),
        },
        "recenter_duration_secs" => match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => {
                settings.recenter_duration_secs = parsed
            }
            _ => warn!("ignoring setting {key}: expected a non-negative number"),
        },
        "request_timeout_secs" => match value.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => warn!("ignoring setting {key}: {err}"),
        },
        other => warn!("unknown setting {other}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
