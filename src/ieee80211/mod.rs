//! 802.11 frame structures.
//!
//! MAC header, management frame bodies with their information elements,
//! control frames, and data frames carrying EAPOL key exchanges.

pub mod control;
pub mod data;
pub mod frame;
pub mod management;

pub use control::ControlFrame;
pub use data::{DataFrame, EapolKey, KeyInfo};
pub use frame::{FrameBody, FrameControl, FrameSubtype, FrameType, Ieee80211Frame, MacAddr};
pub use management::{
    parse_elements, InformationElement, ManagementFrame, SecurityClass, SecurityInfo, Ssid,
};
