//! Four-way handshake capture.
//!
//! EAPOL-Key frames between a station and its AP are recorded and
//! classified by message number. Nothing is derived from the key material;
//! the detector only reports which exchange messages (and PMKIDs) the
//! capture contains.
//!
//! Message inference from the key-info bits cannot tell message 2 from a
//! message 4 whose secure bit is clear; the reported number is a best
//! effort.

use std::collections::HashSet;

use serde::Serialize;

use crate::ieee80211::{EapolKey, Ieee80211Frame, MacAddr};

use super::{Detector, DetectorKind, DetectorReport};

#[derive(Debug, Clone, Serialize)]
pub struct HandshakeMessage {
    pub bssid: String,
    pub station: String,
    /// 1..=4, best-effort from the key-info bits.
    pub message: u8,
    pub replay_counter: u64,
    /// Hex nonce when non-zero.
    pub nonce: Option<String>,
    /// Hex PMKID from the message-1 key data, when advertised.
    pub pmkid: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandshakeReport {
    pub eapol_frames: u64,
    pub messages: Vec<HandshakeMessage>,
    pub pmkids_seen: u64,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct DedupKey {
    bssid: MacAddr,
    station: MacAddr,
    message: u8,
    mic: [u8; 16],
    replay_counter: u64,
    iv: [u8; 16],
}

/// Dedup state is owned by the instance; nothing is shared across runs.
#[derive(Default)]
pub struct HandshakeCaptureDetector {
    eapol_frames: u64,
    seen: HashSet<DedupKey>,
    messages: Vec<HandshakeMessage>,
}

impl HandshakeCaptureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, bssid: MacAddr, station: MacAddr, key: &EapolKey) {
        let Some(message) = key.key_info.message_number() else {
            return;
        };

        let dedup = DedupKey {
            bssid,
            station,
            message,
            mic: key.mic,
            replay_counter: key.replay_counter,
            iv: key.iv,
        };
        if !self.seen.insert(dedup) {
            return;
        }

        let pmkid = if message == 1 {
            key.pmkid().map(hex)
        } else {
            None
        };

        self.messages.push(HandshakeMessage {
            bssid: bssid.to_string(),
            station: station.to_string(),
            message,
            replay_counter: key.replay_counter,
            nonce: key.has_nonce().then(|| hex(key.nonce)),
            pmkid,
        });
    }
}

fn hex<const N: usize>(bytes: [u8; N]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl Detector for HandshakeCaptureDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::HandshakeCapture
    }

    fn on_frame(&mut self, frame: &Ieee80211Frame) {
        let Some(data) = frame.data() else {
            return;
        };
        let Some(key) = &data.eapol_key else {
            return;
        };
        self.eapol_frames += 1;

        let Some(bssid) = frame.bssid() else {
            return;
        };
        // The station is whichever endpoint is not the BSSID.
        let station = if key.key_info.ack {
            frame.destination()
        } else {
            frame.source()
        };
        let Some(station) = station else {
            return;
        };

        self.record(bssid, station, key);
    }

    fn finalize(&self) -> DetectorReport {
        DetectorReport::HandshakeCapture(HandshakeReport {
            eapol_frames: self.eapol_frames,
            messages: self.messages.clone(),
            pmkids_seen: self.messages.iter().filter(|m| m.pmkid.is_some()).count() as u64,
        })
    }
}
