//! Pass 1: aggregate counts over one forward traversal.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::classify::{classify_decoded, FrameCategory};
use crate::decode::Decoded;
use crate::ieee80211::{MacAddr, ManagementFrame};

/// Accumulates totals, identity sets and the frame-mix histogram.
#[derive(Debug, Default)]
pub struct StreamStatsCollector {
    total_packets: u64,
    frame_mix: BTreeMap<FrameCategory, u64>,
    devices: HashSet<MacAddr>,
    access_points: HashSet<MacAddr>,
    clients: HashSet<MacAddr>,
    ssids: HashSet<String>,
}

impl StreamStatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one capture record and return its category. Undecodable
    /// records still count toward the total and the mix.
    pub fn record(&mut self, decoded: &Decoded) -> FrameCategory {
        self.total_packets += 1;
        let category = classify_decoded(decoded);
        *self.frame_mix.entry(category).or_insert(0) += 1;

        if let Some(frame) = decoded.frame() {
            self.devices.extend(frame.addresses());

            match frame.management() {
                Some(ManagementFrame::Beacon(body)) => {
                    if let Some(src) = frame.source() {
                        self.access_points.insert(src);
                    }
                    self.note_ssid(body.summary.ssid.as_ref());
                }
                Some(ManagementFrame::ProbeResponse(body)) => {
                    self.note_ssid(body.summary.ssid.as_ref());
                }
                Some(ManagementFrame::ProbeRequest(body)) => {
                    if let Some(src) = frame.source() {
                        self.clients.insert(src);
                    }
                    self.note_ssid(body.summary.ssid.as_ref());
                }
                Some(ManagementFrame::AssocRequest(_))
                | Some(ManagementFrame::ReassocRequest(_)) => {
                    if let Some(src) = frame.source() {
                        self.clients.insert(src);
                    }
                }
                // Directionality heuristic: the station authenticates
                // toward the AP.
                Some(ManagementFrame::Authentication(_)) => {
                    if let Some(dst) = frame.destination() {
                        if !dst.is_multicast() {
                            self.access_points.insert(dst);
                        }
                    }
                    if let Some(src) = frame.source() {
                        self.clients.insert(src);
                    }
                }
                _ => {}
            }
        }

        category
    }

    fn note_ssid(&mut self, ssid: Option<&crate::ieee80211::Ssid>) {
        if let Some(name) = ssid.and_then(|s| s.as_name()) {
            self.ssids.insert(name.to_string());
        }
    }

    pub fn finish(self) -> StreamStats {
        StreamStats {
            total_packets: self.total_packets,
            unique_devices: self.devices.len(),
            unique_access_points: self.access_points.len(),
            unique_clients: self.clients.len(),
            unique_ssids: self.ssids.len(),
            frame_mix: self.frame_mix,
        }
    }
}

/// Immutable pass-1 snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StreamStats {
    pub total_packets: u64,
    pub unique_devices: usize,
    pub unique_access_points: usize,
    pub unique_clients: usize,
    pub unique_ssids: usize,
    pub frame_mix: BTreeMap<FrameCategory, u64>,
}

impl StreamStats {
    pub fn count(&self, category: FrameCategory) -> u64 {
        self.frame_mix.get(&category).copied().unwrap_or(0)
    }

    /// Share of the total, in percent. Zero for an empty capture.
    pub fn percent(&self, category: FrameCategory) -> f64 {
        if self.total_packets == 0 {
            0.0
        } else {
            self.count(category) as f64 / self.total_packets as f64 * 100.0
        }
    }
}
