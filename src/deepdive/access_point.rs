//! Access point deep dive over beacon frames.
//!
//! Accumulates one record per BSSID, then derives a security score,
//! performance tier and device-type estimate per AP, plus run-level
//! distributions and a suspicious-behavior rollup.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ieee80211::frame::MacAddr;
use crate::ieee80211::management::{Capability, ElementSummary};
use crate::ieee80211::{Ieee80211Frame, ManagementFrame, SecurityInfo, Ssid};

/// Streaming per-BSSID accumulator.
#[derive(Default)]
pub struct ApProfileBuilder {
    beacon_count: u64,
    aps: BTreeMap<MacAddr, ApState>,
}

struct ApState {
    first_seen: u64,
    last_seen: u64,
    beacon_count: u64,
    channels_seen: BTreeSet<u8>,
    ssids_seen: BTreeSet<String>,
    /// Ordered distinct security labels, appended on change only.
    security_evolution: Vec<String>,
    vendor_fingerprints: BTreeSet<&'static str>,
    capability: Capability,
    summary: ElementSummary,
    security: SecurityInfo,
}

impl ApProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `index` is the frame's position in the capture; it becomes the
    /// first/last-seen marker on the record.
    pub fn on_frame(&mut self, index: u64, frame: &Ieee80211Frame) {
        let Some(ManagementFrame::Beacon(body)) = frame.management() else {
            return;
        };
        self.beacon_count += 1;
        let Some(bssid) = frame.bssid() else {
            return;
        };

        let security = body.security();
        let ap = self.aps.entry(bssid).or_insert_with(|| ApState {
            first_seen: index,
            last_seen: index,
            beacon_count: 0,
            channels_seen: BTreeSet::new(),
            ssids_seen: BTreeSet::new(),
            security_evolution: Vec::new(),
            vendor_fingerprints: BTreeSet::new(),
            capability: body.capability,
            summary: body.summary.clone(),
            security,
        });

        ap.last_seen = index;
        ap.beacon_count += 1;

        if let Some(channel) = body.summary.channel {
            ap.channels_seen.insert(channel);
        }
        if let Some(name) = body.summary.ssid.as_ref().and_then(Ssid::as_name) {
            ap.ssids_seen.insert(name.to_string());
        }

        let label = security.label();
        if ap.security_evolution.last() != Some(&label) {
            ap.security_evolution.push(label);
        }

        for v in &body.summary.vendors {
            if v.vendor != "Unknown" {
                ap.vendor_fingerprints.insert(v.vendor);
            }
        }

        // Latest beacon wins for the snapshot fields.
        ap.capability = body.capability;
        ap.summary = body.summary.clone();
        ap.security = security;
    }

    pub fn finalize(&self) -> ApAnalysis {
        let mut records = Vec::with_capacity(self.aps.len());
        let mut channel_usage: BTreeMap<u8, u32> = BTreeMap::new();
        let mut security_distribution = SecurityDistribution::default();
        let mut standards_distribution = StandardsDistribution::default();
        let mut vendor_distribution: BTreeMap<String, u32> = BTreeMap::new();
        let mut suspicious = Vec::new();

        for (bssid, ap) in &self.aps {
            for &channel in &ap.channels_seen {
                *channel_usage.entry(channel).or_insert(0) += 1;
            }
            security_distribution.tally(&ap.security);
            standards_distribution.tally(&ap.summary);
            for &vendor in &ap.vendor_fingerprints {
                *vendor_distribution.entry(vendor.to_string()).or_insert(0) += 1;
            }

            let bssid_str = bssid.to_string();
            let behavior = BehaviorAnalysis {
                channel_hopping: ap.channels_seen.len() > 1,
                ssid_changes: ap.ssids_seen.len() > 1,
                security_changes: ap.security_evolution.len() > 1,
                vendor_diversity: ap.vendor_fingerprints.len(),
                beacon_frequency: if self.beacon_count > 0 {
                    ap.beacon_count as f64 / self.beacon_count as f64
                } else {
                    0.0
                },
            };

            if behavior.channel_hopping {
                suspicious.push(SuspiciousBehavior {
                    ap: bssid_str.clone(),
                    behavior: "Channel hopping",
                    details: format!("Seen on channels {:?}", ap.channels_seen),
                });
            }
            if behavior.ssid_changes {
                suspicious.push(SuspiciousBehavior {
                    ap: bssid_str.clone(),
                    behavior: "SSID changes",
                    details: format!("SSIDs: {:?}", ap.ssids_seen),
                });
            }
            if behavior.security_changes {
                suspicious.push(SuspiciousBehavior {
                    ap: bssid_str.clone(),
                    behavior: "Security changes",
                    details: format!("Evolution: {}", ap.security_evolution.join(" -> ")),
                });
            }

            records.push(AccessPointRecord {
                bssid: bssid_str,
                ssid: ap
                    .summary
                    .ssid
                    .as_ref()
                    .map(|s| s.label().to_string())
                    .unwrap_or_else(|| "<hidden>".to_string()),
                first_seen: ap.first_seen,
                last_seen: ap.last_seen,
                beacon_count: ap.beacon_count,
                channels_seen: ap.channels_seen.iter().copied().collect(),
                ssids_seen: ap.ssids_seen.iter().cloned().collect(),
                security_evolution: ap.security_evolution.clone(),
                vendor_fingerprints: ap
                    .vendor_fingerprints
                    .iter()
                    .map(|v| v.to_string())
                    .collect(),
                analysis: behavior,
                estimated_device_type: estimate_device_type(ap),
                security_assessment: assess_security(ap),
                performance_profile: analyze_performance(&ap.summary),
            });
        }

        let most_active_channel = channel_usage
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&channel, _)| channel);

        let modern = standards_distribution.ac + standards_distribution.ax;
        let legacy = standards_distribution.legacy + standards_distribution.n;

        ApAnalysis {
            beacon_count: self.beacon_count,
            unique_aps: records.len(),
            insights: ApInsights {
                most_active_channel,
                security_issues: SecurityIssueRollup {
                    open_networks: security_distribution.open,
                    wep_networks: security_distribution.wep,
                    legacy_security: security_distribution.wep + security_distribution.wpa,
                },
                modern_standards: modern,
                legacy_standards: legacy,
                suspicious_behaviors: suspicious,
            },
            statistics: ApStatistics {
                channel_usage,
                security_distribution,
                standards_distribution,
                vendor_distribution,
            },
            access_points: records,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApAnalysis {
    pub beacon_count: u64,
    pub unique_aps: usize,
    pub access_points: Vec<AccessPointRecord>,
    pub statistics: ApStatistics,
    pub insights: ApInsights,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessPointRecord {
    pub bssid: String,
    /// Latest advertised name.
    pub ssid: String,
    /// Capture index of the first/last sighting.
    pub first_seen: u64,
    pub last_seen: u64,
    pub beacon_count: u64,
    pub channels_seen: Vec<u8>,
    pub ssids_seen: Vec<String>,
    pub security_evolution: Vec<String>,
    pub vendor_fingerprints: Vec<String>,
    pub analysis: BehaviorAnalysis,
    pub estimated_device_type: &'static str,
    pub security_assessment: SecurityAssessment,
    pub performance_profile: PerformanceProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorAnalysis {
    pub channel_hopping: bool,
    pub ssid_changes: bool,
    pub security_changes: bool,
    pub vendor_diversity: usize,
    /// Share of all beacons in the capture that came from this AP.
    pub beacon_frequency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityAssessment {
    /// 0-100.
    pub overall_score: u8,
    pub issues: Vec<&'static str>,
    pub strengths: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceProfile {
    pub standards_supported: Vec<&'static str>,
    pub channel_width: &'static str,
    pub max_theoretical_speed: &'static str,
    pub performance_tier: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityDistribution {
    pub open: u32,
    pub wep: u32,
    pub wpa: u32,
    pub wpa2: u32,
    pub wpa3: u32,
    pub enterprise: u32,
}

impl SecurityDistribution {
    fn tally(&mut self, security: &SecurityInfo) {
        if security.open {
            self.open += 1;
        }
        if security.wep {
            self.wep += 1;
        }
        if security.wpa {
            self.wpa += 1;
        }
        if security.wpa2 {
            self.wpa2 += 1;
        }
        if security.wpa3 {
            self.wpa3 += 1;
        }
        if security.enterprise {
            self.enterprise += 1;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StandardsDistribution {
    pub legacy: u32,
    pub n: u32,
    pub ac: u32,
    pub ax: u32,
}

impl StandardsDistribution {
    fn tally(&mut self, summary: &ElementSummary) {
        if summary.he {
            self.ax += 1;
        } else if summary.vht {
            self.ac += 1;
        } else if summary.ht {
            self.n += 1;
        } else {
            self.legacy += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApStatistics {
    pub channel_usage: BTreeMap<u8, u32>,
    pub security_distribution: SecurityDistribution,
    pub standards_distribution: StandardsDistribution,
    pub vendor_distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApInsights {
    pub most_active_channel: Option<u8>,
    pub security_issues: SecurityIssueRollup,
    pub modern_standards: u32,
    pub legacy_standards: u32,
    pub suspicious_behaviors: Vec<SuspiciousBehavior>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityIssueRollup {
    pub open_networks: u32,
    pub wep_networks: u32,
    pub legacy_security: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousBehavior {
    pub ap: String,
    pub behavior: &'static str,
    pub details: String,
}

const ENTERPRISE_VENDORS: [&str; 4] = ["Cisco", "Aruba", "Ruckus", "Meraki"];
const CONSUMER_VENDORS: [&str; 4] = ["Netgear", "Linksys", "D-Link", "TP-Link"];
const MOBILE_VENDORS: [&str; 3] = ["Apple", "Samsung", "Google"];

fn estimate_device_type(ap: &ApState) -> &'static str {
    let mut enterprise_indicators = 0;
    if ap.capability.spectrum_mgmt() {
        enterprise_indicators += 1;
    }
    if ap.capability.radio_measurement() {
        enterprise_indicators += 1;
    }
    if ap.security.enterprise {
        enterprise_indicators += 2;
    }
    if ap.summary.country.is_some() {
        enterprise_indicators += 1;
    }
    if ap.summary.power_constraint.is_some() {
        enterprise_indicators += 1;
    }

    let mut high_end_indicators = 0;
    if ap.summary.vht {
        high_end_indicators += 1;
    }
    if ap.summary.he {
        high_end_indicators += 2;
    }
    if ap.summary.ht_40mhz {
        high_end_indicators += 1;
    }

    let mut vendor_type = "unknown";
    for &vendor in &ap.vendor_fingerprints {
        if ENTERPRISE_VENDORS.iter().any(|ev| vendor.contains(ev)) {
            vendor_type = "enterprise";
            break;
        } else if CONSUMER_VENDORS.iter().any(|cv| vendor.contains(cv)) {
            vendor_type = "consumer";
        } else if MOBILE_VENDORS.iter().any(|mv| vendor.contains(mv)) {
            vendor_type = "mobile";
        }
    }

    if enterprise_indicators >= 3 || vendor_type == "enterprise" {
        "enterprise_ap"
    } else if vendor_type == "mobile" {
        "mobile_hotspot"
    } else if high_end_indicators >= 2 {
        "high_end_consumer_ap"
    } else if vendor_type == "consumer" {
        "consumer_ap"
    } else if ap.capability.ibss() {
        "ad_hoc_device"
    } else {
        "unknown_ap"
    }
}

fn assess_security(ap: &ApState) -> SecurityAssessment {
    let mut score: u32 = 0;
    let mut issues = Vec::new();
    let mut strengths = Vec::new();
    let mut recommendations = Vec::new();

    let security = &ap.security;
    if security.wpa3 {
        score += 40;
        strengths.push("WPA3 support (latest security)");
    } else if security.wpa2 {
        score += 30;
        strengths.push("WPA2 support");
    } else if security.wpa {
        score += 15;
        issues.push("Using legacy WPA (deprecated)");
        recommendations.push("Upgrade to WPA2 or WPA3");
    } else if security.wep {
        score += 5;
        issues.push("Using WEP (critically vulnerable)");
        recommendations.push("Immediately upgrade to WPA2/WPA3");
    } else if security.open {
        issues.push("Open network (no encryption)");
        recommendations.push("Enable WPA2/WPA3 encryption");
    }

    if security.enterprise {
        score += 20;
        strengths.push("Enterprise authentication (802.1X)");
    }

    if ap.capability.privacy() {
        score += 10;
    }

    // Modern standards indicate recent firmware.
    if ap.summary.he {
        score += 15;
        strengths.push("WiFi 6 support (recent firmware)");
    } else if ap.summary.vht {
        score += 10;
        strengths.push("WiFi 5 support");
    }

    if ap.capability.spectrum_mgmt() {
        score += 5;
        strengths.push("Spectrum management enabled");
    }

    SecurityAssessment {
        overall_score: score.min(100) as u8,
        issues,
        strengths,
        recommendations,
    }
}

fn analyze_performance(summary: &ElementSummary) -> PerformanceProfile {
    let mut standards = Vec::new();
    let mut tier = "basic";

    if summary.he {
        standards.push("802.11ax (WiFi 6)");
        tier = "premium";
    }
    if summary.vht {
        standards.push("802.11ac (WiFi 5)");
        if tier == "basic" {
            tier = "high_end";
        }
    }
    if summary.ht {
        standards.push("802.11n (WiFi 4)");
        if tier == "basic" {
            tier = "standard";
        }
    }

    let channel_width = match summary.vht_channel_width {
        Some(1) => "80MHz",
        Some(2) => "160MHz",
        Some(3) => "80+80MHz",
        _ if summary.ht_40mhz => "40MHz",
        _ => "20MHz",
    };

    let max_theoretical_speed = if summary.he {
        match channel_width {
            "160MHz" => "2.4+ Gbps",
            "80MHz" | "80+80MHz" => "1.2+ Gbps",
            _ => "600+ Mbps",
        }
    } else if summary.vht {
        match channel_width {
            "160MHz" => "1.7+ Gbps",
            "80MHz" | "80+80MHz" => "867+ Mbps",
            _ => "433+ Mbps",
        }
    } else if summary.ht {
        if channel_width == "40MHz" {
            "300+ Mbps"
        } else {
            "150+ Mbps"
        }
    } else {
        "54 Mbps or less"
    };

    PerformanceProfile {
        standards_supported: standards,
        channel_width,
        max_theoretical_speed,
        performance_tier: tier,
    }
}
