//! Frame classification.
//!
//! Every capture record gets exactly one category tag out of a closed set;
//! the frame-mix counts over these tags drive traffic profiling and
//! detector selection. Undecodable records get diagnostic tags rather than
//! being dropped, so the mix always sums to the packet total.

use serde::{Serialize, Serializer};

use crate::decode::Decoded;
use crate::ieee80211::{ControlFrame, FrameType, Ieee80211Frame, ManagementFrame};

/// Closed set of frame categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameCategory {
    // Management
    Auth,
    AssocReq,
    AssocResp,
    ReassocReq,
    ReassocResp,
    Beacon,
    ProbeReq,
    ProbeResp,
    Deauth,
    Disassoc,
    Atim,
    MgmtOther,
    // Control
    Rts,
    Cts,
    Ack,
    PsPoll,
    CfEnd,
    CfEndAck,
    ControlOther,
    // Data
    QosData,
    Data,
    DataCfAck,
    DataCfPoll,
    DataCfAckPoll,
    NullData,
    CfAck,
    CfPoll,
    CfAckPoll,
    DataOther,
    // Neither
    Reserved,
    RadiotapNoDot11,
    Non80211,
}

impl FrameCategory {
    pub fn as_str(&self) -> &'static str {
        use FrameCategory::*;
        match self {
            Auth => "auth",
            AssocReq => "assoc_req",
            AssocResp => "assoc_resp",
            ReassocReq => "reassoc_req",
            ReassocResp => "reassoc_resp",
            Beacon => "beacon",
            ProbeReq => "probe_req",
            ProbeResp => "probe_resp",
            Deauth => "deauth",
            Disassoc => "disassoc",
            Atim => "atim",
            MgmtOther => "mgmt_other",
            Rts => "rts",
            Cts => "cts",
            Ack => "ack",
            PsPoll => "ps_poll",
            CfEnd => "cf_end",
            CfEndAck => "cf_end_ack",
            ControlOther => "control_other",
            QosData => "qos_data",
            Data => "data",
            DataCfAck => "data_cf_ack",
            DataCfPoll => "data_cf_poll",
            DataCfAckPoll => "data_cf_ack_poll",
            NullData => "null_data",
            CfAck => "cf_ack",
            CfPoll => "cf_poll",
            CfAckPoll => "cf_ack_poll",
            DataOther => "data_other",
            Reserved => "reserved",
            RadiotapNoDot11 => "radiotap_no_dot11",
            Non80211 => "non_802_11",
        }
    }
}

impl std::fmt::Display for FrameCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FrameCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Tag one decode outcome.
pub fn classify_decoded(decoded: &Decoded) -> FrameCategory {
    match decoded {
        Decoded::Dot11(frame) => classify(frame),
        Decoded::RadiotapOnly => FrameCategory::RadiotapNoDot11,
        Decoded::Undecodable => FrameCategory::Non80211,
    }
}

/// Tag a decoded 802.11 frame. Named management subtypes win; QoS data is
/// split out from plain data; everything else falls through the per-type
/// subtype tables.
pub fn classify(frame: &Ieee80211Frame) -> FrameCategory {
    use FrameCategory::*;

    if let Some(mgmt) = frame.management() {
        match mgmt {
            ManagementFrame::Authentication(_) => return Auth,
            ManagementFrame::AssocRequest(_) => return AssocReq,
            ManagementFrame::AssocResponse(_) => return AssocResp,
            ManagementFrame::ReassocRequest(_) => return ReassocReq,
            ManagementFrame::ReassocResponse(_) => return ReassocResp,
            ManagementFrame::Beacon(_) => return Beacon,
            ManagementFrame::ProbeRequest(_) => return ProbeReq,
            ManagementFrame::ProbeResponse(_) => return ProbeResp,
            ManagementFrame::Deauthentication(_) => return Deauth,
            ManagementFrame::Disassociation(_) => return Disassoc,
            ManagementFrame::Atim => return Atim,
            ManagementFrame::Other => {}
        }
    }

    if frame.frame_control.is_qos_data() {
        return QosData;
    }

    match frame.frame_control.frame_type {
        FrameType::Management => MgmtOther,
        FrameType::Control => match ControlFrame::from_subtype(frame.frame_control.subtype_raw) {
            ControlFrame::Rts => Rts,
            ControlFrame::Cts => Cts,
            ControlFrame::Ack => Ack,
            ControlFrame::PsPoll => PsPoll,
            ControlFrame::CfEnd => CfEnd,
            ControlFrame::CfEndAck => CfEndAck,
            ControlFrame::Other => ControlOther,
        },
        FrameType::Data => match frame.frame_control.subtype_raw {
            0 => Data,
            1 => DataCfAck,
            2 => DataCfPoll,
            3 => DataCfAckPoll,
            4 => NullData,
            5 => CfAck,
            6 => CfPoll,
            7 => CfAckPoll,
            _ => DataOther,
        },
        FrameType::Extension => Reserved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn frame_from(fc0: u8, fc1: u8, body: &[u8]) -> Ieee80211Frame {
        let mut buf = vec![fc0, fc1, 0x00, 0x00];
        for _ in 0..3 {
            buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        }
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(body);
        Ieee80211Frame::parse(&buf).expect("frame")
    }

    #[test]
    fn management_subtypes_get_named_tags() {
        // Deauth: subtype 12 -> fc0 0xc0, body = reason code.
        let deauth = frame_from(0xc0, 0x00, &[0x07, 0x00]);
        assert_eq!(classify(&deauth), FrameCategory::Deauth);

        // Probe request: subtype 4 -> fc0 0x40, empty element chain.
        let probe = frame_from(0x40, 0x00, &[]);
        assert_eq!(classify(&probe), FrameCategory::ProbeReq);
    }

    #[test]
    fn truncated_management_body_falls_to_generic_tag() {
        // Beacon with only 2 body bytes cannot carry its fixed fields.
        let beacon = frame_from(0x80, 0x00, &[0x00, 0x00]);
        assert_eq!(classify(&beacon), FrameCategory::MgmtOther);
    }

    #[test]
    fn qos_data_beats_the_data_table() {
        let qos = frame_from(0x88, 0x00, &[0x00, 0x00]);
        assert_eq!(classify(&qos), FrameCategory::QosData);
        let null = frame_from(0x48, 0x00, &[]);
        assert_eq!(classify(&null), FrameCategory::NullData);
    }

    #[test]
    fn control_table() {
        // RTS: type 1 subtype 11 -> fc0 0xb4; 16-byte header.
        let mut buf = vec![0xb4, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);
        let rts = Ieee80211Frame::parse(&buf).unwrap();
        assert_eq!(classify(&rts), FrameCategory::Rts);
    }

    #[test]
    fn diagnostic_tags_for_undecodable_records() {
        assert_eq!(
            classify_decoded(&decode(&[0x07, 0x03])),
            FrameCategory::Non80211
        );
        let rt_only = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];
        assert_eq!(
            classify_decoded(&decode(&rt_only)),
            FrameCategory::RadiotapNoDot11
        );
    }

    #[test]
    fn category_strings_are_stable() {
        assert_eq!(FrameCategory::Non80211.as_str(), "non_802_11");
        assert_eq!(FrameCategory::CfEndAck.as_str(), "cf_end_ack");
        assert_eq!(FrameCategory::ProbeReq.to_string(), "probe_req");
    }
}
