//! Config-driven tuning for the threat map.
//!
//! Settings are loaded once from `config/graph_settings.yaml` (or the path in
//! `ONGUARD_GRAPH_SETTINGS`) and fall back to compiled-in defaults when the
//! file is missing or malformed. Access via [`global_config`].

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

/// Default settings path, relative to the working directory.
const SETTINGS_PATH: &str = "config/graph_settings.yaml";

// =============================================================================
// SETTINGS TYPES
// =============================================================================

/// Spring parameters as they appear in the YAML file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpringConfigYaml {
    /// Stiffness (higher = faster response). Typical: 80-300
    pub stiffness: f32,
    /// Damping ratio: 1.0 = critically damped, < 1.0 bouncy, > 1.0 sluggish
    pub damping: f32,
}

/// Animation tuning: named spring presets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub springs: HashMap<String, SpringConfigYaml>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let mut springs = HashMap::new();
        springs.insert("fast".into(), SpringConfigYaml { stiffness: 300.0, damping: 1.0 });
        springs.insert("medium".into(), SpringConfigYaml { stiffness: 170.0, damping: 1.0 });
        springs.insert("slow".into(), SpringConfigYaml { stiffness: 80.0, damping: 1.0 });
        springs.insert("bouncy".into(), SpringConfigYaml { stiffness: 200.0, damping: 0.6 });
        springs.insert("camera".into(), SpringConfigYaml { stiffness: 120.0, damping: 1.0 });
        springs.insert("camera_touch".into(), SpringConfigYaml { stiffness: 90.0, damping: 1.0 });
        Self { springs }
    }
}

impl AnimationConfig {
    /// Look up a spring preset by name, falling back to `medium` defaults.
    pub fn spring(&self, name: &str) -> SpringConfigYaml {
        self.springs.get(name).copied().unwrap_or(SpringConfigYaml {
            stiffness: 170.0,
            damping: 1.0,
        })
    }
}

/// Feed scheduling defaults for the mock data source.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between incremental emission attempts.
    pub update_interval_secs: f32,
    /// Probability that an attempt actually emits a delta.
    pub emit_probability: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 15.0,
            emit_probability: 0.2,
        }
    }
}

/// Top-level settings for the threat map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub animation: AnimationConfig,
    pub feed: FeedConfig,
}

// =============================================================================
// GLOBAL ACCESS
// =============================================================================

/// Global settings, loaded on first access.
pub fn global_config() -> &'static GraphSettings {
    static CONFIG: OnceLock<GraphSettings> = OnceLock::new();
    CONFIG.get_or_init(load_settings)
}

fn load_settings() -> GraphSettings {
    let path = std::env::var("ONGUARD_GRAPH_SETTINGS").unwrap_or_else(|_| SETTINGS_PATH.into());

    match std::fs::read_to_string(&path) {
        Ok(text) => match serde_yaml::from_str(&text) {
            Ok(settings) => {
                tracing::debug!(path, "loaded graph settings");
                settings
            }
            Err(err) => {
                tracing::warn!(path, %err, "malformed graph settings, using defaults");
                GraphSettings::default()
            }
        },
        Err(_) => GraphSettings::default(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_presets_present() {
        let config = AnimationConfig::default();
        for name in ["fast", "medium", "slow", "bouncy", "camera", "camera_touch"] {
            assert!(config.springs.contains_key(name), "missing preset {name}");
        }
    }

    #[test]
    fn unknown_preset_falls_back_to_medium() {
        let config = AnimationConfig::default();
        let spring = config.spring("no_such_preset");
        assert_eq!(spring.stiffness, 170.0);
        assert_eq!(spring.damping, 1.0);
    }

    #[test]
    fn settings_parse_partial_yaml() {
        let yaml = r#"
feed:
  update_interval_secs: 5.0
"#;
        let settings: GraphSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.feed.update_interval_secs, 5.0);
        // Unspecified fields keep their defaults
        assert_eq!(settings.feed.emit_probability, 0.2);
        assert!(settings.animation.springs.contains_key("camera"));
    }
}
