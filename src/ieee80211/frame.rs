//! 802.11 MAC header and frame control fields.

use serde::{Serialize, Serializer};

use super::control::ControlFrame;
use super::data::DataFrame;
use super::management::ManagementFrame;

/// MAC address (6 bytes). Serializes as the usual colon-separated hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&data[..6]);
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Frame type (2 bits of the frame control field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Management,
    Control,
    Data,
    Extension,
}

impl From<u8> for FrameType {
    fn from(val: u8) -> Self {
        match val & 0x03 {
            0 => FrameType::Management,
            1 => FrameType::Control,
            2 => FrameType::Data,
            _ => FrameType::Extension,
        }
    }
}

/// Management frame subtypes the engine distinguishes. Control and data
/// subtypes are classified from the raw 4-bit value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSubtype {
    AssocRequest,
    AssocResponse,
    ReassocRequest,
    ReassocResponse,
    ProbeRequest,
    ProbeResponse,
    Beacon,
    Atim,
    Disassociation,
    Authentication,
    Deauthentication,
    Action,
    Other,
}

impl FrameSubtype {
    pub fn from_management(subtype: u8) -> Self {
        match subtype & 0x0f {
            0 => FrameSubtype::AssocRequest,
            1 => FrameSubtype::AssocResponse,
            2 => FrameSubtype::ReassocRequest,
            3 => FrameSubtype::ReassocResponse,
            4 => FrameSubtype::ProbeRequest,
            5 => FrameSubtype::ProbeResponse,
            8 => FrameSubtype::Beacon,
            9 => FrameSubtype::Atim,
            10 => FrameSubtype::Disassociation,
            11 => FrameSubtype::Authentication,
            12 => FrameSubtype::Deauthentication,
            13 | 14 => FrameSubtype::Action,
            _ => FrameSubtype::Other,
        }
    }
}

/// Decoded frame control field (first 2 bytes of the MAC header).
#[derive(Debug, Clone, Copy)]
pub struct FrameControl {
    pub protocol_version: u8,
    pub frame_type: FrameType,
    /// Raw 4-bit subtype, kept for the generic classification table.
    pub subtype_raw: u8,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_fragments: bool,
    pub retry: bool,
    pub protected: bool,
    pub order: bool,
}

impl FrameControl {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }
        let fc0 = data[0];
        let fc1 = data[1];
        Some(Self {
            protocol_version: fc0 & 0x03,
            frame_type: FrameType::from((fc0 >> 2) & 0x03),
            subtype_raw: (fc0 >> 4) & 0x0f,
            to_ds: fc1 & 0x01 != 0,
            from_ds: fc1 & 0x02 != 0,
            more_fragments: fc1 & 0x04 != 0,
            retry: fc1 & 0x08 != 0,
            protected: fc1 & 0x40 != 0,
            order: fc1 & 0x80 != 0,
        })
    }

    pub fn management_subtype(&self) -> Option<FrameSubtype> {
        if self.frame_type == FrameType::Management {
            Some(FrameSubtype::from_management(self.subtype_raw))
        } else {
            None
        }
    }

    /// QoS data subtypes (8..=15 with the QoS bit set in the subtype).
    pub fn is_qos_data(&self) -> bool {
        self.frame_type == FrameType::Data && self.subtype_raw & 0x08 != 0
    }
}

/// One decoded 802.11 frame. Lives only for the duration of processing; no
/// cross-frame ownership.
#[derive(Debug, Clone)]
pub struct Ieee80211Frame {
    pub frame_control: FrameControl,
    pub duration: u16,
    /// Receiver address; always present.
    pub addr1: MacAddr,
    pub addr2: Option<MacAddr>,
    pub addr3: Option<MacAddr>,
    pub seq_control: Option<u16>,
    /// WDS fourth address.
    pub addr4: Option<MacAddr>,
    pub body: FrameBody,
}

#[derive(Debug, Clone)]
pub enum FrameBody {
    Management(ManagementFrame),
    Control(ControlFrame),
    Data(DataFrame),
    /// Body bytes the engine does not interpret.
    Opaque,
}

impl Ieee80211Frame {
    /// Parse a MAC header plus frame body. Returns `None` when even the
    /// minimal header (frame control + duration + addr1) is missing.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 10 {
            return None;
        }

        let frame_control = FrameControl::parse(data)?;
        // Protocol version is 0 for every deployed 802.11 amendment; other
        // values mean we are looking at something else entirely.
        if frame_control.protocol_version != 0 {
            return None;
        }
        let duration = u16::from_le_bytes([data[2], data[3]]);
        let addr1 = MacAddr::from_slice(&data[4..])?;

        let (addr2, addr3, seq_control, addr4, body_offset) = match frame_control.frame_type {
            FrameType::Control => control_header(data, &frame_control),
            FrameType::Management | FrameType::Data => full_header(data, &frame_control),
            FrameType::Extension => (None, None, None, None, 10),
        };

        let body_data = data.get(body_offset..).unwrap_or(&[]);
        let body = match frame_control.frame_type {
            FrameType::Management => {
                let subtype = FrameSubtype::from_management(frame_control.subtype_raw);
                match ManagementFrame::parse(subtype, body_data) {
                    Some(mgmt) => FrameBody::Management(mgmt),
                    None => FrameBody::Opaque,
                }
            }
            FrameType::Control => {
                FrameBody::Control(ControlFrame::from_subtype(frame_control.subtype_raw))
            }
            FrameType::Data => FrameBody::Data(DataFrame::parse(
                body_data,
                frame_control.protected,
            )),
            FrameType::Extension => FrameBody::Opaque,
        };

        Some(Self {
            frame_control,
            duration,
            addr1,
            addr2,
            addr3,
            seq_control,
            addr4,
            body,
        })
    }

    /// BSSID position depends on the DS bits.
    pub fn bssid(&self) -> Option<MacAddr> {
        match (self.frame_control.to_ds, self.frame_control.from_ds) {
            (false, false) => self.addr3,
            (false, true) => self.addr2,
            (true, false) => Some(self.addr1),
            (true, true) => None,
        }
    }

    pub fn source(&self) -> Option<MacAddr> {
        match (self.frame_control.to_ds, self.frame_control.from_ds) {
            (false, false) | (true, false) => self.addr2,
            (false, true) => self.addr3,
            (true, true) => self.addr4,
        }
    }

    pub fn destination(&self) -> Option<MacAddr> {
        match (self.frame_control.to_ds, self.frame_control.from_ds) {
            (false, false) | (false, true) => Some(self.addr1),
            (true, false) | (true, true) => self.addr3,
        }
    }

    /// All non-null hardware addresses carried by the header.
    pub fn addresses(&self) -> impl Iterator<Item = MacAddr> + '_ {
        std::iter::once(Some(self.addr1))
            .chain([self.addr2, self.addr3, self.addr4])
            .flatten()
    }

    pub fn management(&self) -> Option<&ManagementFrame> {
        match &self.body {
            FrameBody::Management(m) => Some(m),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&DataFrame> {
        match &self.body {
            FrameBody::Data(d) => Some(d),
            _ => None,
        }
    }
}

fn control_header(
    data: &[u8],
    fc: &FrameControl,
) -> (
    Option<MacAddr>,
    Option<MacAddr>,
    Option<u16>,
    Option<MacAddr>,
    usize,
) {
    // CTS and ACK carry only the receiver address; most other control
    // subtypes add a transmitter address.
    match fc.subtype_raw {
        12 | 13 => (None, None, None, None, 10),
        8 | 9 | 10 | 11 | 14 | 15 => {
            if data.len() >= 16 {
                (MacAddr::from_slice(&data[10..]), None, None, None, 16)
            } else {
                (None, None, None, None, 10)
            }
        }
        _ => (None, None, None, None, 10),
    }
}

fn full_header(
    data: &[u8],
    fc: &FrameControl,
) -> (
    Option<MacAddr>,
    Option<MacAddr>,
    Option<u16>,
    Option<MacAddr>,
    usize,
) {
    if data.len() < 24 {
        return (None, None, None, None, 10);
    }

    let addr2 = MacAddr::from_slice(&data[10..]);
    let addr3 = MacAddr::from_slice(&data[16..]);
    let seq_control = Some(u16::from_le_bytes([data[22], data[23]]));

    let mut offset = 24;
    let mut addr4 = None;

    if fc.to_ds && fc.from_ds && data.len() >= 30 {
        addr4 = MacAddr::from_slice(&data[24..]);
        offset = 30;
    }

    if fc.is_qos_data() && data.len() >= offset + 2 {
        offset += 2;
    }

    (addr2, addr3, seq_control, addr4, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_display_and_flags() {
        let mac = MacAddr::new([0xaa, 0xbb, 0x00, 0x11, 0x22, 0x33]);
        assert_eq!(mac.to_string(), "aa:bb:00:11:22:33");
        assert!(!mac.is_broadcast());
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert!(MacAddr::new([0x01, 0, 0, 0, 0, 0]).is_multicast());
    }

    #[test]
    fn frame_control_bits() {
        // Beacon: type 0, subtype 8 -> fc0 = 0x80.
        let fc = FrameControl::parse(&[0x80, 0x00]).unwrap();
        assert_eq!(fc.frame_type, FrameType::Management);
        assert_eq!(fc.subtype_raw, 8);
        assert_eq!(fc.management_subtype(), Some(FrameSubtype::Beacon));

        // QoS data: type 2, subtype 8 -> fc0 = 0x88.
        let fc = FrameControl::parse(&[0x88, 0x41]).unwrap();
        assert_eq!(fc.frame_type, FrameType::Data);
        assert!(fc.is_qos_data());
        assert!(fc.to_ds);
        assert!(fc.protected);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(Ieee80211Frame::parse(&[0x80, 0x00, 0x00]).is_none());
    }
}
