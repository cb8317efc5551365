use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Engine configuration. Every section defaults so an empty TOML file (or
/// `AnalysisConfig::default()`) yields the stock thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub deauth: DeauthConfig,

    #[serde(default)]
    pub probe_privacy: ProbePrivacyConfig,
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))
    }
}

/// How the orchestrator picks detectors for pass 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Profile-driven selection (high suggestions, medium backfill).
    #[default]
    Auto,
    /// Run the complete fixed detector set regardless of profile.
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub mode: SelectionMode,

    /// Medium-priority suggestions are added until at least this many
    /// detectors are selected (or the suggestions run out).
    #[serde(default = "default_min_detectors")]
    pub min_detectors: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Auto,
            min_detectors: default_min_detectors(),
        }
    }
}

fn default_min_detectors() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeauthConfig {
    /// Sliding window for burst detection, in seconds of processing time.
    #[serde(default = "default_burst_window")]
    pub burst_window_secs: u64,

    /// Deauth/disassoc events within the window that constitute a burst.
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: usize,
}

impl Default for DeauthConfig {
    fn default() -> Self {
        Self {
            burst_window_secs: default_burst_window(),
            burst_threshold: default_burst_threshold(),
        }
    }
}

fn default_burst_window() -> u64 {
    10
}

fn default_burst_threshold() -> usize {
    40
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbePrivacyConfig {
    /// Stations probing for at least this many distinct SSIDs are flagged
    /// as high privacy-leak risk.
    #[serde(default = "default_pnl_threshold")]
    pub flag_threshold: usize,
}

impl Default for ProbePrivacyConfig {
    fn default() -> Self {
        Self {
            flag_threshold: default_pnl_threshold(),
        }
    }
}

fn default_pnl_threshold() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.deauth.burst_window_secs, 10);
        assert_eq!(cfg.deauth.burst_threshold, 40);
        assert_eq!(cfg.probe_privacy.flag_threshold, 5);
        assert_eq!(cfg.selection.mode, SelectionMode::Auto);
        assert_eq!(cfg.selection.min_detectors, 3);
    }

    #[test]
    fn partial_override() {
        let cfg = AnalysisConfig::from_toml_str(
            "[deauth]\nburst_threshold = 20\n\n[selection]\nmode = \"full\"\n",
        )
        .unwrap();
        assert_eq!(cfg.deauth.burst_threshold, 20);
        assert_eq!(cfg.deauth.burst_window_secs, 10);
        assert_eq!(cfg.selection.mode, SelectionMode::Full);
    }
}
