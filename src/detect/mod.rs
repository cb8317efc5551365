//! Stateful security heuristics (pass 2).
//!
//! Each detector consumes every decoded 802.11 frame once, keeps its own
//! per-run state, and produces one report at the end. Findings are always
//! suspicions, never confirmations.

pub mod deauth;
pub mod evil_twin;
pub mod handshake;
pub mod probe_privacy;
pub mod weak_security;

pub use deauth::{DeauthBurstDetector, DeauthReport};
pub use evil_twin::{EvilTwinDetector, EvilTwinReport};
pub use handshake::{HandshakeCaptureDetector, HandshakeReport};
pub use probe_privacy::{ProbePrivacyDetector, ProbePrivacyReport};
pub use weak_security::{WeakSecurityDetector, WeakSecurityReport};

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::ieee80211::Ieee80211Frame;

/// The closed set of detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    DeauthBurst,
    EvilTwin,
    ProbePrivacy,
    WeakSecurity,
    HandshakeCapture,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 5] = [
        DetectorKind::DeauthBurst,
        DetectorKind::EvilTwin,
        DetectorKind::ProbePrivacy,
        DetectorKind::WeakSecurity,
        DetectorKind::HandshakeCapture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::DeauthBurst => "deauth_burst",
            DetectorKind::EvilTwin => "evil_twin",
            DetectorKind::ProbePrivacy => "probe_privacy",
            DetectorKind::WeakSecurity => "weak_security",
            DetectorKind::HandshakeCapture => "handshake_capture",
        }
    }

    /// Instantiate with the run's configuration.
    pub fn build(&self, config: &AnalysisConfig) -> Box<dyn Detector> {
        match self {
            DetectorKind::DeauthBurst => Box::new(DeauthBurstDetector::new(&config.deauth)),
            DetectorKind::EvilTwin => Box::new(EvilTwinDetector::new()),
            DetectorKind::ProbePrivacy => {
                Box::new(ProbePrivacyDetector::new(&config.probe_privacy))
            }
            DetectorKind::WeakSecurity => Box::new(WeakSecurityDetector::new()),
            DetectorKind::HandshakeCapture => Box::new(HandshakeCaptureDetector::new()),
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detector's finished output.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetectorReport {
    DeauthBurst(DeauthReport),
    EvilTwin(EvilTwinReport),
    ProbePrivacy(ProbePrivacyReport),
    WeakSecurity(WeakSecurityReport),
    HandshakeCapture(HandshakeReport),
}

/// Streaming detector contract. `on_frame` mutates state only;
/// `finalize` is pure and may be called more than once with identical
/// output.
pub trait Detector: Send {
    fn kind(&self) -> DetectorKind;
    fn on_frame(&mut self, frame: &Ieee80211Frame);
    fn finalize(&self) -> DetectorReport;
}
