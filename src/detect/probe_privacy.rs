//! Probe request privacy leakage.
//!
//! Stations probing for their preferred network list broadcast a history
//! of where they have been. A long distinct-SSID list per station is the
//! leak.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::ProbePrivacyConfig;
use crate::ieee80211::{Ieee80211Frame, MacAddr, ManagementFrame};

use super::{Detector, DetectorKind, DetectorReport};

#[derive(Debug, Clone, Serialize)]
pub struct StationProbes {
    pub station: String,
    pub ssids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbePrivacyReport {
    pub stations_seen: usize,
    pub probe_requests: u64,
    /// Stations whose distinct probed-SSID count met the threshold.
    pub high_risk: Vec<StationProbes>,
    pub flag_threshold: usize,
}

pub struct ProbePrivacyDetector {
    flag_threshold: usize,
    probe_requests: u64,
    per_station: BTreeMap<MacAddr, BTreeSet<String>>,
}

impl ProbePrivacyDetector {
    pub fn new(config: &ProbePrivacyConfig) -> Self {
        Self {
            flag_threshold: config.flag_threshold,
            probe_requests: 0,
            per_station: BTreeMap::new(),
        }
    }
}

impl Detector for ProbePrivacyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ProbePrivacy
    }

    fn on_frame(&mut self, frame: &Ieee80211Frame) {
        let Some(ManagementFrame::ProbeRequest(body)) = frame.management() else {
            return;
        };
        self.probe_requests += 1;

        // Wildcard (hidden/empty) probes carry no PNL information.
        let Some(name) = body.summary.ssid.as_ref().and_then(|s| s.as_name()) else {
            return;
        };
        let Some(station) = frame.source() else {
            return;
        };

        self.per_station
            .entry(station)
            .or_default()
            .insert(name.to_string());
    }

    fn finalize(&self) -> DetectorReport {
        let high_risk = self
            .per_station
            .iter()
            .filter(|(_, ssids)| ssids.len() >= self.flag_threshold)
            .map(|(station, ssids)| StationProbes {
                station: station.to_string(),
                ssids: ssids.iter().cloned().collect(),
            })
            .collect();

        DetectorReport::ProbePrivacy(ProbePrivacyReport {
            stations_seen: self.per_station.len(),
            probe_requests: self.probe_requests,
            high_risk,
            flag_threshold: self.flag_threshold,
        })
    }
}
