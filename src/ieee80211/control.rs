//! Control frames carry no body the engine interprets; the subtype alone
//! drives classification.

/// Control frame subtypes the engine names individually. Everything else
/// (block-ack, trigger, wrapper subtypes) lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFrame {
    PsPoll,
    Rts,
    Cts,
    Ack,
    CfEnd,
    CfEndAck,
    Other,
}

impl ControlFrame {
    pub fn from_subtype(subtype: u8) -> Self {
        match subtype & 0x0f {
            8 => ControlFrame::CfEndAck,
            9 => ControlFrame::CfEnd,
            10 => ControlFrame::PsPoll,
            11 => ControlFrame::Rts,
            12 => ControlFrame::Cts,
            13 => ControlFrame::Ack,
            _ => ControlFrame::Other,
        }
    }
}
