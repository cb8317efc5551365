//! Evil twin heuristic.
//!
//! A rogue AP advertising a legitimate network's name usually differs from
//! the real one somewhere: an open clone of a secured network, or the same
//! name advertised from multiple channels. Sightings come from beacons and
//! probe responses; a clone answering directed probes never has to beacon.
//! Both patterns only ever yield a suspicion.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ieee80211::{Ieee80211Frame, ManagementFrame, SecurityClass};

use super::{Detector, DetectorKind, DetectorReport};

#[derive(Debug, Clone, Serialize)]
pub struct Sighting {
    pub bssid: String,
    pub channel: Option<u8>,
    pub security: SecurityClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuspectNetwork {
    pub ssid: String,
    pub reason: &'static str,
    pub sightings: Vec<Sighting>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvilTwinReport {
    pub networks_seen: usize,
    /// Suspected only; the heuristic cannot confirm impersonation.
    pub suspects: Vec<SuspectNetwork>,
}

#[derive(Default)]
pub struct EvilTwinDetector {
    sightings: BTreeMap<String, Vec<Sighting>>,
}

impl EvilTwinDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Detector for EvilTwinDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::EvilTwin
    }

    fn on_frame(&mut self, frame: &Ieee80211Frame) {
        let body = match frame.management() {
            Some(ManagementFrame::Beacon(body)) | Some(ManagementFrame::ProbeResponse(body)) => {
                body
            }
            _ => return,
        };
        let Some(name) = body.summary.ssid.as_ref().and_then(|s| s.as_name()) else {
            return;
        };
        let Some(bssid) = frame.bssid() else {
            return;
        };

        self.sightings
            .entry(name.to_string())
            .or_default()
            .push(Sighting {
                bssid: bssid.to_string(),
                channel: body.summary.channel,
                security: body.security().class(),
            });
    }

    fn finalize(&self) -> DetectorReport {
        let mut suspects = Vec::new();

        for (ssid, sightings) in &self.sightings {
            let open = sightings
                .iter()
                .any(|s| s.security == SecurityClass::Open);
            let secured = sightings
                .iter()
                .any(|s| s.security != SecurityClass::Open);

            let channels: std::collections::BTreeSet<u8> =
                sightings.iter().filter_map(|s| s.channel).collect();

            let reason = if open && secured {
                Some("open+secure mismatch")
            } else if channels.len() >= 2 && sightings.len() >= 2 {
                Some("channel discrepancy")
            } else {
                None
            };

            if let Some(reason) = reason {
                suspects.push(SuspectNetwork {
                    ssid: ssid.clone(),
                    reason,
                    sightings: sightings.clone(),
                });
            }
        }

        DetectorReport::EvilTwin(EvilTwinReport {
            networks_seen: self.sightings.len(),
            suspects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::Ieee80211Frame;

    fn advert(fc0: u8, ssid: &str, bssid: u8, channel: u8, privacy: bool) -> Ieee80211Frame {
        let mut buf = vec![fc0, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&[0xff; 6]);
        buf.extend_from_slice(&[0x02, 0, 0, 0, 0, bssid]);
        buf.extend_from_slice(&[0x02, 0, 0, 0, 0, bssid]);
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(&[0u8; 10]); // timestamp + interval
        buf.extend_from_slice(&if privacy { [0x11, 0x00] } else { [0x01, 0x00] });
        buf.push(0);
        buf.push(ssid.len() as u8);
        buf.extend_from_slice(ssid.as_bytes());
        buf.extend_from_slice(&[3, 1, channel]);
        Ieee80211Frame::parse(&buf).unwrap()
    }

    fn beacon(ssid: &str, bssid: u8, channel: u8, privacy: bool) -> Ieee80211Frame {
        advert(0x80, ssid, bssid, channel, privacy)
    }

    fn probe_response(ssid: &str, bssid: u8, channel: u8, privacy: bool) -> Ieee80211Frame {
        advert(0x50, ssid, bssid, channel, privacy)
    }

    fn report(det: &EvilTwinDetector) -> EvilTwinReport {
        match det.finalize() {
            DetectorReport::EvilTwin(r) => r,
            _ => unreachable!(),
        }
    }

    #[test]
    fn open_plus_secure_mismatch_is_one_suspect() {
        let mut det = EvilTwinDetector::new();
        det.on_frame(&beacon("Cafe", 1, 6, false));
        det.on_frame(&beacon("Cafe", 2, 6, true));
        let r = report(&det);
        assert_eq!(r.suspects.len(), 1);
        assert_eq!(r.suspects[0].ssid, "Cafe");
        assert_eq!(r.suspects[0].reason, "open+secure mismatch");
    }

    #[test]
    fn channel_spread_is_suspect() {
        let mut det = EvilTwinDetector::new();
        det.on_frame(&beacon("Office", 1, 1, true));
        det.on_frame(&beacon("Office", 1, 11, true));
        let r = report(&det);
        assert_eq!(r.suspects.len(), 1);
        assert_eq!(r.suspects[0].reason, "channel discrepancy");
    }

    #[test]
    fn open_clone_seen_only_in_probe_responses_is_flagged() {
        let mut det = EvilTwinDetector::new();
        det.on_frame(&beacon("Cafe", 1, 6, true));
        det.on_frame(&probe_response("Cafe", 2, 6, false));
        let r = report(&det);
        assert_eq!(r.suspects.len(), 1);
        assert_eq!(r.suspects[0].reason, "open+secure mismatch");
        assert_eq!(r.suspects[0].sightings.len(), 2);
    }

    #[test]
    fn consistent_network_is_clean() {
        let mut det = EvilTwinDetector::new();
        det.on_frame(&beacon("Home", 1, 6, true));
        det.on_frame(&beacon("Home", 1, 6, true));
        let r = report(&det);
        assert!(r.suspects.is_empty());
        assert_eq!(r.networks_seen, 1);
    }
}
