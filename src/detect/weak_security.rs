//! Weak security posture per advertised network.
//!
//! Keeps the latest beacon-observed security class per BSSID; open
//! networks are reported as weak.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ieee80211::{Ieee80211Frame, MacAddr, ManagementFrame, SecurityClass, Ssid};

use super::{Detector, DetectorKind, DetectorReport};

#[derive(Debug, Clone, Serialize)]
pub struct WeakNetwork {
    pub bssid: String,
    pub ssid: String,
    pub security: SecurityClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeakSecurityReport {
    pub networks_seen: usize,
    pub weak: Vec<WeakNetwork>,
}

#[derive(Default)]
pub struct WeakSecurityDetector {
    latest: BTreeMap<MacAddr, (Ssid, SecurityClass)>,
}

impl WeakSecurityDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Detector for WeakSecurityDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::WeakSecurity
    }

    fn on_frame(&mut self, frame: &Ieee80211Frame) {
        let Some(ManagementFrame::Beacon(body)) = frame.management() else {
            return;
        };
        let Some(bssid) = frame.bssid() else {
            return;
        };
        let ssid = body.summary.ssid.clone().unwrap_or(Ssid::Hidden);
        self.latest.insert(bssid, (ssid, body.security().class()));
    }

    fn finalize(&self) -> DetectorReport {
        let weak = self
            .latest
            .iter()
            .filter(|(_, (_, class))| *class == SecurityClass::Open)
            .map(|(bssid, (ssid, class))| WeakNetwork {
                bssid: bssid.to_string(),
                ssid: ssid.label().to_string(),
                security: *class,
            })
            .collect();

        DetectorReport::WeakSecurity(WeakSecurityReport {
            networks_seen: self.latest.len(),
            weak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon(bssid: u8, privacy: bool, ssid: &str) -> Ieee80211Frame {
        let mut buf = vec![0x80, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&[0xff; 6]);
        buf.extend_from_slice(&[0x02, 0, 0, 0, 0, bssid]);
        buf.extend_from_slice(&[0x02, 0, 0, 0, 0, bssid]);
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(&[0u8; 10]);
        buf.extend_from_slice(&if privacy { [0x11, 0x00] } else { [0x01, 0x00] });
        buf.push(0);
        buf.push(ssid.len() as u8);
        buf.extend_from_slice(ssid.as_bytes());
        Ieee80211Frame::parse(&buf).unwrap()
    }

    fn report(det: &WeakSecurityDetector) -> WeakSecurityReport {
        match det.finalize() {
            DetectorReport::WeakSecurity(r) => r,
            _ => unreachable!(),
        }
    }

    #[test]
    fn open_networks_are_weak() {
        let mut det = WeakSecurityDetector::new();
        det.on_frame(&beacon(1, false, "FreeWifi"));
        det.on_frame(&beacon(2, true, "Secured"));
        let r = report(&det);
        assert_eq!(r.networks_seen, 2);
        assert_eq!(r.weak.len(), 1);
        assert_eq!(r.weak[0].ssid, "FreeWifi");
    }

    #[test]
    fn latest_beacon_wins() {
        let mut det = WeakSecurityDetector::new();
        det.on_frame(&beacon(1, false, "Net"));
        det.on_frame(&beacon(1, true, "Net"));
        assert!(report(&det).weak.is_empty());
    }
}
