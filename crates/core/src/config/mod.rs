use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CardError, Result};

/// Top-level configuration structure for the presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capabilities: Capabilities,
    /// Number of content pages in the book. Fixed for the lifetime of a
    /// presentation.
    pub pages: usize,
    pub songs: Vec<SongOption>,
    pub cues: CueConfig,
    pub effects: EffectTuning,
    /// Seed for the effect rng. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            pages: 4,
            songs: vec![
                SongOption::new("Our Song", "music/our-song.mp3"),
                SongOption::new("First Dance", "music/first-dance.mp3"),
                SongOption::new("Slow Morning", "music/slow-morning.mp3"),
            ],
            cues: CueConfig::default(),
            effects: EffectTuning::default(),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Parses a JSON document. Missing fields fall back to their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pages == 0 {
            return Err(CardError::InvalidConfig(
                "the book needs at least one page".to_string(),
            ));
        }
        if self.songs.is_empty() {
            return Err(CardError::InvalidConfig(
                "at least one song option is required".to_string(),
            ));
        }
        let probability = self.effects.spawn_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(CardError::InvalidConfig(format!(
                "spawn probability {probability} is outside [0, 1]"
            )));
        }
        Ok(())
    }

    /// Effect values resolved against the startup capabilities.
    pub fn profile(&self) -> EffectProfile {
        self.effects.profile(&self.capabilities)
    }
}

/// Device class hint read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Full,
    Constrained,
}

/// Startup capability gate. Never re-evaluated once a presentation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub device: DeviceClass,
    pub reduced_motion: bool,
}

impl Capabilities {
    pub fn is_constrained(&self) -> bool {
        self.device == DeviceClass::Constrained
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongOption {
    pub title: String,
    pub source: String,
}

impl SongOption {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
        }
    }
}

/// Sources for the one-shot sounds played by the final overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    pub yes: String,
    pub cute: String,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            yes: "sounds/yes.mp3".to_string(),
            cute: "sounds/cute.mp3".to_string(),
        }
    }
}

/// Policy values for every effect, split by device class where they differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    pub ambience_cadence_ms: u64,
    pub constrained_ambience_cadence_ms: u64,
    pub spawn_probability: f64,
    pub opening_burst: usize,
    pub constrained_opening_burst: usize,
    pub opening_burst_step_ms: u64,
    pub hearts: usize,
    pub constrained_hearts: usize,
    pub heart_step_ms: u64,
    pub butterflies: usize,
    pub butterfly_lifetime_ms: u64,
    pub overlay_delay_ms: u64,
    pub romantic_burst: usize,
    pub cute_burst: usize,
    pub celebration_step_ms: u64,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            ambience_cadence_ms: 800,
            constrained_ambience_cadence_ms: 1500,
            spawn_probability: 0.7,
            opening_burst: 15,
            constrained_opening_burst: 10,
            opening_burst_step_ms: 100,
            hearts: 10,
            constrained_hearts: 5,
            heart_step_ms: 300,
            butterflies: 6,
            butterfly_lifetime_ms: 30_000,
            overlay_delay_ms: 1000,
            romantic_burst: 50,
            cute_burst: 30,
            celebration_step_ms: 100,
        }
    }
}

impl EffectTuning {
    pub fn profile(&self, capabilities: &Capabilities) -> EffectProfile {
        let constrained = capabilities.is_constrained();
        let pick = |full: usize, reduced: usize| if constrained { reduced } else { full };

        EffectProfile {
            reduced_motion: capabilities.reduced_motion,
            ambience_cadence: Duration::from_millis(if constrained {
                self.constrained_ambience_cadence_ms
            } else {
                self.ambience_cadence_ms
            }),
            spawn_probability: self.spawn_probability.clamp(0.0, 1.0),
            opening_burst: pick(self.opening_burst, self.constrained_opening_burst),
            opening_burst_step: Duration::from_millis(self.opening_burst_step_ms),
            hearts: pick(self.hearts, self.constrained_hearts),
            heart_step: Duration::from_millis(self.heart_step_ms),
            butterflies: pick(self.butterflies, 0),
            butterfly_lifetime: Duration::from_millis(self.butterfly_lifetime_ms),
            overlay_delay: Duration::from_millis(self.overlay_delay_ms),
            romantic_burst: self.romantic_burst,
            cute_burst: self.cute_burst,
            celebration_step: Duration::from_millis(self.celebration_step_ms),
        }
    }
}

/// [`EffectTuning`] resolved for one device class.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProfile {
    pub reduced_motion: bool,
    pub ambience_cadence: Duration,
    pub spawn_probability: f64,
    pub opening_burst: usize,
    pub opening_burst_step: Duration,
    pub hearts: usize,
    pub heart_step: Duration,
    pub butterflies: usize,
    pub butterfly_lifetime: Duration,
    pub overlay_delay: Duration,
    pub romantic_burst: usize,
    pub cute_burst: usize,
    pub celebration_step: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrained_devices_get_reduced_effects() {
        let config = AppConfig {
            capabilities: Capabilities {
                device: DeviceClass::Constrained,
                reduced_motion: false,
            },
            ..Default::default()
        };

        let profile = config.profile();
        assert_eq!(profile.ambience_cadence, Duration::from_millis(1500));
        assert_eq!(profile.hearts, 5);
        assert_eq!(profile.opening_burst, 10);
        assert_eq!(profile.butterflies, 0);

        let full = AppConfig::default().profile();
        assert_eq!(full.ambience_cadence, Duration::from_millis(800));
        assert_eq!(full.hearts, 10);
        assert_eq!(full.opening_burst, 15);
        assert_eq!(full.butterflies, 6);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "pages": 6, "capabilities": { "reduced_motion": true } }"#,
        )
        .unwrap();

        assert_eq!(config.pages, 6);
        assert!(config.capabilities.reduced_motion);
        assert_eq!(config.capabilities.device, DeviceClass::Full);
        assert_eq!(config.effects.spawn_probability, 0.7);
        assert_eq!(config.songs.len(), 3);
    }

    #[test]
    fn rejects_unusable_values() {
        let err = AppConfig::from_json_str(r#"{ "pages": 0 }"#).unwrap_err();
        assert!(matches!(err, CardError::InvalidConfig(_)));

        let err =
            AppConfig::from_json_str(r#"{ "effects": { "spawn_probability": 1.5 } }"#).unwrap_err();
        assert!(format!("{err}").contains("1.5"));

        let err = AppConfig::from_json_str("{ pages: ").unwrap_err();
        assert!(matches!(err, CardError::Json(_)));
    }
}
