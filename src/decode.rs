//! Capture-record decoding ladder.
//!
//! Monitor-mode captures normally wrap each frame in a radiotap header, but
//! raw 802.11 link types and the odd corrupted record show up too. The
//! ladder tries radiotap first, then a direct MAC header parse, and never
//! aborts: records nothing can make sense of still get counted under a
//! diagnostic category.

use crate::ieee80211::Ieee80211Frame;
use crate::radiotap::RadiotapHeader;

/// Outcome of decoding one capture record.
#[derive(Debug, Clone)]
pub enum Decoded {
    /// A usable 802.11 frame, radiotap-wrapped or bare.
    Dot11(Ieee80211Frame),
    /// A valid radiotap header whose payload did not parse as 802.11.
    RadiotapOnly,
    /// Neither radiotap nor a bare MAC header.
    Undecodable,
}

impl Decoded {
    pub fn frame(&self) -> Option<&Ieee80211Frame> {
        match self {
            Decoded::Dot11(f) => Some(f),
            _ => None,
        }
    }
}

pub fn decode(data: &[u8]) -> Decoded {
    if let Some(rt) = RadiotapHeader::parse(data) {
        return match Ieee80211Frame::parse(rt.payload(data)) {
            Some(frame) => Decoded::Dot11(frame),
            None => Decoded::RadiotapOnly,
        };
    }

    match Ieee80211Frame::parse(data) {
        Some(frame) => Decoded::Dot11(frame),
        None => Decoded::Undecodable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bare deauth header: fc, duration, three addresses, seq, reason.
    fn deauth_bytes() -> Vec<u8> {
        let mut buf = vec![0xc0, 0x00, 0x3a, 0x01];
        buf.extend_from_slice(&[0xff; 6]);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(&[0x07, 0x00]);
        buf
    }

    #[test]
    fn bare_frame_decodes_without_radiotap() {
        let decoded = decode(&deauth_bytes());
        assert!(decoded.frame().is_some());
    }

    #[test]
    fn radiotap_wrapped_frame_decodes() {
        let mut buf = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&deauth_bytes());
        let decoded = decode(&buf);
        assert!(decoded.frame().is_some());
    }

    #[test]
    fn radiotap_with_garbage_payload() {
        // Valid radiotap header, payload too short for a MAC header.
        let buf = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0];
        assert!(matches!(decode(&buf), Decoded::RadiotapOnly));
    }

    #[test]
    fn garbage_is_undecodable() {
        assert!(matches!(decode(&[0x07, 0x03, 0x01]), Decoded::Undecodable));
    }
}
