//! Configuration management.
//!
//! One TOML file with three sections.  Every field has a default, so an empty
//! file (or none at all) is a valid configuration.
//!
//! ```toml
//! [gestures]
//! cooldown_ms = 600
//!
//! [detector]
//! kind = "process"
//! command = ["python3", "hand_stream.py"]
//!
//! [player]
//! volume_step = 0.15
//! ```

use std::path::Path;

use gesture_core::GestureConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

/// Full deck configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Recognition thresholds, passed through to `gesture_core`.
    pub gestures: GestureConfig,
    pub detector: DetectorConfig,
    pub player:   PlayerConfig,
}

/// Which landmark source feeds the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Keyboard + mouse driven synthetic hand.
    Sim,
    /// External program streaming JSON landmark lines.
    Process,
    /// LeapMotion controller (`leap` feature).
    Leap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub kind:              DetectorKind,
    /// Program and arguments for the `process` detector.
    pub command:           Vec<String>,
    /// Frame pacing of the simulator.
    pub frame_interval_ms: u64,
    /// Hands scored below this by the external detector are ignored.
    pub min_score:         f32,
    /// How long to wait for the detector's ready handshake at startup.
    pub ready_timeout_ms:  u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            kind:              DetectorKind::Sim,
            command:           Vec::new(),
            frame_interval_ms: 33,
            min_score:         0.5,
            ready_timeout_ms:  10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume change per vertical swipe.
    pub volume_step:          f32,
    pub initial_volume:       f32,
    /// General MIDI program 0–127.
    pub instrument:           u8,
    pub channel:              u8,
    /// "Previous" restarts the current track once it has played this long.
    pub restart_threshold_ms: u64,
    /// Substring of the preferred MIDI output port name.
    pub port_hint:            Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            volume_step:          0.15,
            initial_volume:       0.8,
            instrument:           0,
            channel:              0,
            restart_threshold_ms: 3000,
            port_hint:            None,
        }
    }
}

impl DeckConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.gestures.validate()?;

        let p = &self.player;
        if !(p.volume_step > 0.0 && p.volume_step <= 1.0) {
            return Err(DeckError::Config(format!(
                "volume_step must be in (0, 1], got {}", p.volume_step
            )));
        }
        if !(0.0..=1.0).contains(&p.initial_volume) {
            return Err(DeckError::Config(format!(
                "initial_volume must be in [0, 1], got {}", p.initial_volume
            )));
        }
        if p.instrument > 127 {
            return Err(DeckError::Config(format!("instrument must be 0–127, got {}", p.instrument)));
        }
        if p.channel > 15 {
            return Err(DeckError::Config(format!("channel must be 0–15, got {}", p.channel)));
        }

        let d = &self.detector;
        if d.frame_interval_ms == 0 {
            return Err(DeckError::Config("frame_interval_ms must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&d.min_score) {
            return Err(DeckError::Config(format!(
                "min_score must be in [0, 1], got {}", d.min_score
            )));
        }
        if d.kind == DetectorKind::Process && d.command.is_empty() {
            return Err(DeckError::Config(
                "detector.command is required for the process detector".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| DeckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DeckError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DeckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.kind, DetectorKind::Sim);
        assert_eq!(config.player.volume_step, 0.15);
        assert_eq!(config.gestures.cooldown_ms, 600);
    }

    #[test]
    fn test_config_serialization() {
        let toml = DeckConfig::default().to_toml().unwrap();
        assert!(toml.contains("[gestures]"));
        assert!(toml.contains("[detector]"));
        assert!(toml.contains("[player]"));
        assert!(toml.contains("kind = \"sim\""));
    }

    #[test]
    fn test_config_roundtrip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deck.toml");

        let mut config = DeckConfig::default();
        config.player.port_hint = Some("fluid".to_string());
        config.gestures.pinch_threshold = 0.05;
        config.save(&path).unwrap();

        let loaded = DeckConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.toml");
        std::fs::write(&path, "[player]\nvolume_step = 0.1\n").unwrap();

        let loaded = DeckConfig::load(&path).unwrap();
        assert_eq!(loaded.player.volume_step, 0.1);
        assert_eq!(loaded.player.initial_volume, 0.8);
        assert_eq!(loaded.gestures, GestureConfig::default());
    }

    #[test]
    fn test_process_detector_needs_command() {
        let mut config = DeckConfig::default();
        config.detector.kind = DetectorKind::Process;
        assert!(matches!(config.validate(), Err(DeckError::Config(_))));
        config.detector.command = vec!["hand_stream".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_gesture_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.toml");
        std::fs::write(&path, "[gestures]\nsmoothing = 2.0\n").unwrap();
        assert!(matches!(DeckConfig::load(&path), Err(DeckError::Tracking(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = DeckConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DeckError::Io(_)));
    }
}
