//! Command-Line Interface

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DeckConfig, DetectorKind};
use crate::error::Result;

/// Gesture Deck - control a music playlist with hand gestures
#[derive(Parser, Debug)]
#[command(name = "gesture_deck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Landmark source, overriding the config file
    #[arg(short, long, value_enum)]
    pub detector: Option<DetectorKind>,

    /// Detector program and arguments (implies `--detector process`)
    #[arg(last = true)]
    pub command: Vec<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<DeckConfig> {
        let mut cfg = match &self.config {
            Some(path) => DeckConfig::load(path)?,
            None       => DeckConfig::default(),
        };
        if !self.command.is_empty() {
            cfg.detector.kind    = DetectorKind::Process;
            cfg.detector.command = self.command.clone();
        }
        if let Some(kind) = self.detector {
            cfg.detector.kind = kind;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeckError;

    #[test]
    fn defaults_to_simulation() {
        let cli = Cli::try_parse_from(["gesture_deck"]).unwrap();
        let cfg = cli.resolve_config().unwrap();
        assert_eq!(cfg.detector.kind, DetectorKind::Sim);
        assert!(!cli.verbose);
    }

    #[test]
    fn trailing_command_selects_process_detector() {
        let cli = Cli::try_parse_from(["gesture_deck", "-v", "--", "python3", "hands.py"]).unwrap();
        let cfg = cli.resolve_config().unwrap();
        assert_eq!(cfg.detector.kind, DetectorKind::Process);
        assert_eq!(cfg.detector.command, vec!["python3", "hands.py"]);
        assert!(cli.verbose);
    }

    #[test]
    fn process_without_command_is_rejected() {
        let cli = Cli::try_parse_from(["gesture_deck", "--detector", "process"]).unwrap();
        assert!(matches!(cli.resolve_config(), Err(DeckError::Config(_))));
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("deck.toml");
        std::fs::write(&path, "[gestures]\ncooldown_ms = 900\n").unwrap();
        let cli = Cli::try_parse_from(["gesture_deck", "--config", path.to_str().unwrap()]).unwrap();
        assert_eq!(cli.resolve_config().unwrap().gestures.cooldown_ms, 900);
    }
}
