//! Traffic profiling and detector selection.
//!
//! The frame mix from pass 1 is enough to tell a deauth flood from a
//! wardriving trace from a quiet overnight monitor. The profile maps to a
//! ranked list of detector suggestions; the selector turns the list into
//! the concrete detector set for pass 2.

use serde::Serialize;

use crate::classify::FrameCategory;
use crate::config::{SelectionConfig, SelectionMode};
use crate::detect::DetectorKind;
use crate::stats::StreamStats;

/// Capture character inferred from frame percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficProfile {
    Empty,
    DeauthAttack,
    ActiveScanning,
    PassiveMonitoring,
    ClientActivity,
    NormalMixed,
}

impl TrafficProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficProfile::Empty => "empty",
            TrafficProfile::DeauthAttack => "deauth_attack",
            TrafficProfile::ActiveScanning => "active_scanning",
            TrafficProfile::PassiveMonitoring => "passive_monitoring",
            TrafficProfile::ClientActivity => "client_activity",
            TrafficProfile::NormalMixed => "normal_mixed",
        }
    }

    fn interpretation(&self) -> &'static str {
        match self {
            TrafficProfile::Empty => "The capture contains no frames.",
            TrafficProfile::DeauthAttack => {
                "This capture appears to contain deauthentication attack activity. \
                 High levels of deauth/disassoc frames suggest potential DoS or \
                 evil twin attacks."
            }
            TrafficProfile::ActiveScanning => {
                "This capture shows intensive WiFi scanning activity. High probe \
                 request rates indicate active network discovery."
            }
            TrafficProfile::PassiveMonitoring => {
                "This capture appears to be from passive WiFi monitoring. High \
                 beacon percentage suggests background AP discovery."
            }
            TrafficProfile::ClientActivity => {
                "This capture shows significant client-side activity with probe \
                 requests and potential authentication attempts."
            }
            TrafficProfile::NormalMixed => {
                "This capture shows typical mixed WiFi traffic with balanced \
                 frame types."
            }
        }
    }
}

impl std::fmt::Display for TrafficProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectorSuggestion {
    pub detector: DetectorKind,
    pub priority: Priority,
    pub reason: &'static str,
}

/// Security concern visible in the mix alone, independent of the profile.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityIndicator {
    pub kind: &'static str,
    pub severity: Priority,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub profile: TrafficProfile,
    pub interpretation: &'static str,
    pub suggestions: Vec<DetectorSuggestion>,
    pub indicators: Vec<SecurityIndicator>,
}

/// Classify the mix and rank detector suggestions. Pure function of the
/// pass-1 snapshot.
pub fn profile_traffic(stats: &StreamStats) -> ProfileReport {
    if stats.total_packets == 0 {
        return ProfileReport {
            profile: TrafficProfile::Empty,
            interpretation: TrafficProfile::Empty.interpretation(),
            suggestions: Vec::new(),
            indicators: Vec::new(),
        };
    }

    let deauth = stats.percent(FrameCategory::Deauth);
    let disassoc = stats.percent(FrameCategory::Disassoc);
    let beacon = stats.percent(FrameCategory::Beacon);
    let probe_req = stats.percent(FrameCategory::ProbeReq);

    let profile = if deauth > 10.0 || disassoc > 5.0 {
        TrafficProfile::DeauthAttack
    } else if probe_req > 30.0 {
        TrafficProfile::ActiveScanning
    } else if beacon > 60.0 && probe_req < 10.0 {
        TrafficProfile::PassiveMonitoring
    } else if probe_req > 15.0 && beacon < 40.0 {
        TrafficProfile::ClientActivity
    } else {
        TrafficProfile::NormalMixed
    };

    let suggestions = suggest(profile);

    let mut indicators = Vec::new();
    if deauth > 5.0 {
        indicators.push(SecurityIndicator {
            kind: "deauth_flood",
            severity: Priority::High,
            description: format!("{deauth:.1}% deauth frames - possible DoS attack"),
        });
    }
    if probe_req > 40.0 {
        indicators.push(SecurityIndicator {
            kind: "excessive_probing",
            severity: Priority::Medium,
            description: format!("{probe_req:.1}% probe requests - intensive scanning"),
        });
    }

    ProfileReport {
        profile,
        interpretation: profile.interpretation(),
        suggestions,
        indicators,
    }
}

fn suggest(profile: TrafficProfile) -> Vec<DetectorSuggestion> {
    use DetectorKind::*;
    use Priority::*;

    match profile {
        TrafficProfile::DeauthAttack => vec![
            DetectorSuggestion {
                detector: DeauthBurst,
                priority: High,
                reason: "High deauth/disassoc activity detected",
            },
            DetectorSuggestion {
                detector: EvilTwin,
                priority: Medium,
                reason: "Potential evil twin attacks",
            },
        ],
        TrafficProfile::ActiveScanning => vec![
            DetectorSuggestion {
                detector: ProbePrivacy,
                priority: High,
                reason: "High probe request activity",
            },
            DetectorSuggestion {
                detector: EvilTwin,
                priority: Medium,
                reason: "Check for honeypot APs",
            },
        ],
        TrafficProfile::PassiveMonitoring => vec![
            DetectorSuggestion {
                detector: WeakSecurity,
                priority: High,
                reason: "Good beacon coverage for AP analysis",
            },
            DetectorSuggestion {
                detector: EvilTwin,
                priority: Medium,
                reason: "Compare AP configurations",
            },
        ],
        TrafficProfile::ClientActivity => vec![
            DetectorSuggestion {
                detector: ProbePrivacy,
                priority: High,
                reason: "Client behavior analysis",
            },
            DetectorSuggestion {
                detector: HandshakeCapture,
                priority: Medium,
                reason: "Potential authentication activity",
            },
        ],
        TrafficProfile::NormalMixed => vec![
            DetectorSuggestion {
                detector: WeakSecurity,
                priority: Medium,
                reason: "General security assessment",
            },
            DetectorSuggestion {
                detector: ProbePrivacy,
                priority: Low,
                reason: "Privacy analysis",
            },
        ],
        TrafficProfile::Empty => Vec::new(),
    }
}

/// Why each detector was or was not chosen.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReasoning {
    pub mode: SelectionMode,
    pub selected: Vec<DetectorKind>,
    pub details: Vec<String>,
    /// Suggested detectors that did not make the cut, with the reason.
    pub skipped: Vec<String>,
}

/// Turn ranked suggestions into the pass-2 detector set.
///
/// High suggestions always run; medium ones backfill up to the configured
/// floor; low ones never run automatically. An empty outcome falls back to
/// the weak-security baseline. `Full` mode skips all of this and runs
/// everything.
pub fn select_detectors(report: &ProfileReport, config: &SelectionConfig) -> SelectionReasoning {
    if config.mode == SelectionMode::Full {
        return SelectionReasoning {
            mode: SelectionMode::Full,
            selected: DetectorKind::ALL.to_vec(),
            details: vec!["full mode: running the complete detector set".to_string()],
            skipped: Vec::new(),
        };
    }

    let mut selected: Vec<DetectorKind> = Vec::new();
    let mut details = Vec::new();

    for s in &report.suggestions {
        if s.priority == Priority::High && !selected.contains(&s.detector) {
            selected.push(s.detector);
            details.push(format!("{}: high priority ({})", s.detector, s.reason));
        }
    }

    if selected.len() < config.min_detectors {
        for s in &report.suggestions {
            if selected.len() >= config.min_detectors {
                break;
            }
            if s.priority == Priority::Medium && !selected.contains(&s.detector) {
                selected.push(s.detector);
                details.push(format!("{}: medium backfill ({})", s.detector, s.reason));
            }
        }
    }

    if selected.is_empty() {
        selected.push(DetectorKind::WeakSecurity);
        details.push("no suggestions: defaulting to weak_security".to_string());
    }

    let mut skipped = Vec::new();
    for s in &report.suggestions {
        if !selected.contains(&s.detector) {
            let why = match s.priority {
                Priority::Medium => "medium priority, floor already met",
                Priority::Low => "low priority, never auto-selected",
                Priority::High => "duplicate suggestion",
            };
            skipped.push(format!("{}: {why}", s.detector));
        }
    }

    SelectionReasoning {
        mode: SelectionMode::Auto,
        selected,
        details,
        skipped,
    }
}
