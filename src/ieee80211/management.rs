//! 802.11 management frame bodies and information elements.
//!
//! The tagged-element chain is the interesting part: variable-length
//! (id, len, payload) records that carry the SSID, channel, rates, security
//! configuration, and vendor fingerprints the detectors feed on. Parsing is
//! strictly tolerant: a malformed length stops the walk for that frame and
//! keeps whatever was already parsed.

use serde::Serialize;

// Element ids the engine interprets.
pub const ELEM_SSID: u8 = 0;
pub const ELEM_SUPPORTED_RATES: u8 = 1;
pub const ELEM_DS_PARAMETER: u8 = 3;
pub const ELEM_COUNTRY: u8 = 7;
pub const ELEM_POWER_CONSTRAINT: u8 = 32;
pub const ELEM_POWER_CAPABILITY: u8 = 33;
pub const ELEM_SUPPORTED_CHANNELS: u8 = 36;
pub const ELEM_HT_CAPABILITIES: u8 = 45;
pub const ELEM_RSN: u8 = 48;
pub const ELEM_EXTENDED_RATES: u8 = 50;
pub const ELEM_HT_OPERATION: u8 = 61;
pub const ELEM_VHT_CAPABILITIES: u8 = 191;
pub const ELEM_VHT_OPERATION: u8 = 192;
pub const ELEM_VENDOR: u8 = 221;
pub const ELEM_EXTENSION: u8 = 255;
pub const EXT_HE_CAPABILITIES: u8 = 35;

/// One tagged field from a management frame body.
#[derive(Debug, Clone)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// Walk the element chain. Stops (without error) at the first element whose
/// declared length runs past the buffer; elements parsed up to that point
/// are returned.
pub fn parse_elements(data: &[u8]) -> Vec<InformationElement> {
    let mut elements = Vec::new();
    let mut pos = 0;

    while pos + 2 <= data.len() {
        let id = data[pos];
        let len = data[pos + 1] as usize;
        pos += 2;

        if pos + len > data.len() {
            break;
        }

        elements.push(InformationElement {
            id,
            data: data[pos..pos + len].to_vec(),
        });
        pos += len;
    }

    elements
}

/// A decoded network name. The decode ladder never fails: strict UTF-8,
/// then printable Latin-1, then lossy UTF-8 (replacement characters mark
/// the damage), then a hex escape. A zero-length element is the distinct
/// hidden-network sentinel, which is not the same thing as the element
/// being absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "encoding", content = "name", rename_all = "snake_case")]
pub enum Ssid {
    Utf8(String),
    Latin1(String),
    Lossy(String),
    Hex(String),
    Hidden,
}

impl Ssid {
    pub fn decode(data: &[u8]) -> Ssid {
        if data.is_empty() {
            return Ssid::Hidden;
        }

        if let Ok(s) = std::str::from_utf8(data) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Ssid::Utf8(trimmed.to_string());
            }
        }

        // Latin-1: every byte maps to a char; accept only if nothing lands
        // in the control ranges.
        let latin1: String = data.iter().map(|&b| b as char).collect();
        if latin1.chars().all(is_latin1_printable) {
            let trimmed = latin1.trim();
            if !trimmed.is_empty() {
                return Ssid::Latin1(trimmed.to_string());
            }
        }

        let lossy = String::from_utf8_lossy(data);
        let legible: String = lossy
            .chars()
            .filter(|&c| c != '\u{FFFD}' && !c.is_control())
            .collect();
        if !legible.trim().is_empty() {
            return Ssid::Lossy(lossy.trim().to_string());
        }

        let hex: String = data.iter().map(|b| format!("{b:02x}")).collect();
        Ssid::Hex(format!("<hex:{hex}>"))
    }

    /// The usable name, or `None` for a hidden/empty element. Stations and
    /// networks are never keyed on the hidden sentinel.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Ssid::Utf8(s) | Ssid::Latin1(s) | Ssid::Lossy(s) | Ssid::Hex(s) => Some(s),
            Ssid::Hidden => None,
        }
    }

    pub fn label(&self) -> &str {
        self.as_name().unwrap_or("<hidden>")
    }
}

fn is_latin1_printable(c: char) -> bool {
    let v = c as u32;
    !(v < 0x20 || (0x7f..0xa0).contains(&v))
}

/// One advertised rate: low 7 bits in 500 kbps units, high bit marks it
/// basic/mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rate {
    pub mbps: f32,
    pub basic: bool,
}

pub fn parse_rates(data: &[u8]) -> Vec<Rate> {
    data.iter()
        .map(|&b| Rate {
            mbps: (b & 0x7f) as f32 * 0.5,
            basic: b & 0x80 != 0,
        })
        .collect()
}

/// What the RSN element (id 48) tells us beyond "not open": the AKM suite
/// selectors for 802.1X and SAE are matched as raw byte patterns anywhere
/// in the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsnInfo {
    pub enterprise: bool,
    pub sae: bool,
}

const AKM_DOT1X: [u8; 4] = [0x00, 0x0f, 0xac, 0x01];
const AKM_SAE: [u8; 4] = [0x00, 0x0f, 0xac, 0x08];

impl RsnInfo {
    pub fn parse(data: &[u8]) -> RsnInfo {
        RsnInfo {
            enterprise: contains_pattern(data, &AKM_DOT1X),
            sae: contains_pattern(data, &AKM_SAE),
        }
    }
}

fn contains_pattern(haystack: &[u8], needle: &[u8; 4]) -> bool {
    haystack.windows(4).any(|w| w == needle)
}

/// Vendor-specific element (id 221): OUI plus optional type byte.
#[derive(Debug, Clone, Serialize)]
pub struct VendorElement {
    pub oui: [u8; 3],
    pub oui_type: Option<u8>,
    pub vendor: &'static str,
}

impl VendorElement {
    pub fn parse(data: &[u8]) -> Option<VendorElement> {
        if data.len() < 3 {
            return None;
        }
        let oui = [data[0], data[1], data[2]];
        Some(VendorElement {
            oui,
            oui_type: data.get(3).copied(),
            vendor: vendor_name(&oui),
        })
    }

    /// Legacy WPA rides in a Microsoft vendor element with OUI type 1.
    pub fn is_wpa(&self) -> bool {
        self.oui == [0x00, 0x50, 0xf2] && self.oui_type == Some(1)
    }
}

/// Static OUI table for the vendors the fingerprinting cares about.
pub fn vendor_name(oui: &[u8; 3]) -> &'static str {
    match oui {
        [0x00, 0x50, 0xf2] => "Microsoft",
        [0x00, 0x03, 0x7f] => "Atheros",
        [0x00, 0x10, 0x18] => "Broadcom",
        [0x00, 0x0f, 0xac] => "Wi-Fi Alliance",
        [0x00, 0x17, 0xf2] => "Apple",
        [0x00, 0x1c, 0xf0] => "Intel",
        [0x00, 0x40, 0xf4] => "Motorola",
        [0x00, 0x1a, 0x11] => "Google",
        _ => "Unknown",
    }
}

/// Capability information field (2 bytes in beacons, probe responses and
/// association frames).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Capability(pub u16);

macro_rules! cap_flags {
    ($(($method:ident, $name:literal, $bit:literal)),+ $(,)?) => {
        impl Capability {
            $(pub fn $method(&self) -> bool { self.0 & $bit != 0 })+

            /// Names of the set flags, in bit order; used for device
            /// fingerprint signatures.
            pub fn flag_names(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(if self.$method() { names.push($name); })+
                names
            }
        }
    };
}

cap_flags!(
    (ess, "ess", 0x0001),
    (ibss, "ibss", 0x0002),
    (cf_pollable, "cf_pollable", 0x0004),
    (cf_poll_request, "cf_poll_req", 0x0008),
    (privacy, "privacy", 0x0010),
    (short_preamble, "short_preamble", 0x0020),
    (pbcc, "pbcc", 0x0040),
    (channel_agility, "channel_agility", 0x0080),
    (spectrum_mgmt, "spectrum_mgmt", 0x0100),
    (qos, "qos", 0x0200),
    (short_slot_time, "short_slot_time", 0x0400),
    (apsd, "apsd", 0x0800),
    (radio_measurement, "radio_measurement", 0x1000),
    (dsss_ofdm, "dsss_ofdm", 0x2000),
    (delayed_block_ack, "delayed_block_ack", 0x4000),
    (immediate_block_ack, "immediate_block_ack", 0x8000),
);

/// Everything the engine extracts from an element chain. Scalar fields
/// follow first-occurrence-wins for repeated tags; vendor elements
/// accumulate.
#[derive(Debug, Clone, Default)]
pub struct ElementSummary {
    pub ssid: Option<Ssid>,
    pub channel: Option<u8>,
    pub rates: Vec<Rate>,
    pub extended_rates: Vec<Rate>,
    pub rsn: Option<RsnInfo>,
    pub ht: bool,
    pub ht_40mhz: bool,
    pub ht_primary_channel: Option<u8>,
    pub vht: bool,
    pub vht_channel_width: Option<u8>,
    pub he: bool,
    pub vendors: Vec<VendorElement>,
    pub country: Option<String>,
    pub power_constraint: Option<u8>,
    pub power_capability: Option<(i8, i8)>,
    pub supported_channels: Vec<(u8, u8)>,
}

impl ElementSummary {
    pub fn from_elements(elements: &[InformationElement]) -> Self {
        let mut s = ElementSummary::default();

        for elem in elements {
            match elem.id {
                ELEM_SSID => {
                    if s.ssid.is_none() {
                        s.ssid = Some(Ssid::decode(&elem.data));
                    }
                }
                ELEM_SUPPORTED_RATES => {
                    if s.rates.is_empty() {
                        s.rates = parse_rates(&elem.data);
                    }
                }
                ELEM_EXTENDED_RATES => {
                    if s.extended_rates.is_empty() {
                        s.extended_rates = parse_rates(&elem.data);
                    }
                }
                ELEM_DS_PARAMETER => {
                    if s.channel.is_none() && !elem.data.is_empty() {
                        s.channel = Some(elem.data[0]);
                    }
                }
                ELEM_RSN => {
                    if s.rsn.is_none() {
                        s.rsn = Some(RsnInfo::parse(&elem.data));
                    }
                }
                ELEM_HT_CAPABILITIES => {
                    s.ht = true;
                    if elem.data.len() >= 2 {
                        let info = u16::from_le_bytes([elem.data[0], elem.data[1]]);
                        s.ht_40mhz = s.ht_40mhz || info & 0x0002 != 0;
                    }
                }
                ELEM_HT_OPERATION => {
                    if s.ht_primary_channel.is_none() && !elem.data.is_empty() {
                        s.ht_primary_channel = Some(elem.data[0]);
                    }
                }
                ELEM_VHT_CAPABILITIES => {
                    s.vht = true;
                }
                ELEM_VHT_OPERATION => {
                    if s.vht_channel_width.is_none() && !elem.data.is_empty() {
                        s.vht_channel_width = Some(elem.data[0]);
                    }
                }
                ELEM_EXTENSION => {
                    if elem.data.first() == Some(&EXT_HE_CAPABILITIES) {
                        s.he = true;
                    }
                }
                ELEM_VENDOR => {
                    if let Some(v) = VendorElement::parse(&elem.data) {
                        s.vendors.push(v);
                    }
                }
                ELEM_COUNTRY => {
                    if s.country.is_none() && elem.data.len() >= 2 {
                        s.country = std::str::from_utf8(&elem.data[..2])
                            .ok()
                            .map(|c| c.to_string());
                    }
                }
                ELEM_POWER_CONSTRAINT => {
                    if s.power_constraint.is_none() && !elem.data.is_empty() {
                        s.power_constraint = Some(elem.data[0]);
                    }
                }
                ELEM_POWER_CAPABILITY => {
                    if s.power_capability.is_none() && elem.data.len() >= 2 {
                        s.power_capability = Some((elem.data[0] as i8, elem.data[1] as i8));
                    }
                }
                ELEM_SUPPORTED_CHANNELS => {
                    if s.supported_channels.is_empty() {
                        s.supported_channels = elem
                            .data
                            .chunks_exact(2)
                            .map(|c| (c[0], c[1]))
                            .collect();
                    }
                }
                _ => {}
            }
        }

        s
    }

    pub fn vendor_wpa(&self) -> bool {
        self.vendors.iter().any(|v| v.is_wpa())
    }

    /// All advertised rates, base plus extended.
    pub fn all_rates(&self) -> impl Iterator<Item = &Rate> {
        self.rates.iter().chain(self.extended_rates.iter())
    }
}

/// Security posture derived from the capability field and the element
/// chain. Flags can overlap (an RSN element advertising SAE sets both wpa2
/// and wpa3); `class()` collapses them to the strongest.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SecurityInfo {
    pub open: bool,
    pub wep: bool,
    pub wpa: bool,
    pub wpa2: bool,
    pub wpa3: bool,
    pub enterprise: bool,
}

/// Collapsed security class, strongest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityClass {
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa3,
}

impl SecurityInfo {
    pub fn derive(capability: Capability, summary: &ElementSummary) -> Self {
        let privacy = capability.privacy();
        let rsn = summary.rsn;
        let wpa = summary.vendor_wpa();
        let wpa2 = rsn.is_some();
        let wpa3 = rsn.map(|r| r.sae).unwrap_or(false);
        // Privacy bit with no WPA/RSN element means pre-RSN encryption.
        let wep = privacy && !wpa2 && !wpa;
        SecurityInfo {
            open: !privacy && !wpa2 && !wpa,
            wep,
            wpa,
            wpa2,
            wpa3,
            enterprise: rsn.map(|r| r.enterprise).unwrap_or(false),
        }
    }

    pub fn class(&self) -> SecurityClass {
        if self.wpa3 {
            SecurityClass::Wpa3
        } else if self.wpa2 {
            SecurityClass::Wpa2
        } else if self.wpa {
            SecurityClass::Wpa
        } else if self.wep {
            SecurityClass::Wep
        } else {
            SecurityClass::Open
        }
    }

    /// Sorted comma-joined active flags, used for the security-evolution
    /// trail on access point records.
    pub fn label(&self) -> String {
        let mut names = Vec::new();
        if self.open {
            names.push("open");
        }
        if self.wep {
            names.push("wep");
        }
        if self.wpa {
            names.push("wpa");
        }
        if self.wpa2 {
            names.push("wpa2");
        }
        if self.wpa3 {
            names.push("wpa3");
        }
        if self.enterprise {
            names.push("enterprise");
        }
        names.sort_unstable();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(",")
        }
    }
}

/// Management frame variants.
#[derive(Debug, Clone)]
pub enum ManagementFrame {
    Beacon(BeaconBody),
    ProbeRequest(ProbeRequestBody),
    ProbeResponse(BeaconBody),
    Authentication(AuthBody),
    Deauthentication(ReasonBody),
    Disassociation(ReasonBody),
    AssocRequest(AssocRequestBody),
    AssocResponse(AssocResponseBody),
    ReassocRequest(AssocRequestBody),
    ReassocResponse(AssocResponseBody),
    Atim,
    Other,
}

impl ManagementFrame {
    /// Parse a management body for the given subtype. `None` means the body
    /// was too short to carry its fixed fields; the caller downgrades the
    /// frame to an opaque body and the classifier files it under the
    /// generic management tag.
    pub fn parse(subtype: super::frame::FrameSubtype, data: &[u8]) -> Option<Self> {
        use super::frame::FrameSubtype as S;
        match subtype {
            S::Beacon => BeaconBody::parse(data).map(ManagementFrame::Beacon),
            S::ProbeResponse => BeaconBody::parse(data).map(ManagementFrame::ProbeResponse),
            S::ProbeRequest => Some(ManagementFrame::ProbeRequest(ProbeRequestBody::parse(data))),
            S::Authentication => AuthBody::parse(data).map(ManagementFrame::Authentication),
            S::Deauthentication => ReasonBody::parse(data).map(ManagementFrame::Deauthentication),
            S::Disassociation => ReasonBody::parse(data).map(ManagementFrame::Disassociation),
            S::AssocRequest => AssocRequestBody::parse(data, false).map(ManagementFrame::AssocRequest),
            S::ReassocRequest => {
                AssocRequestBody::parse(data, true).map(ManagementFrame::ReassocRequest)
            }
            S::AssocResponse => AssocResponseBody::parse(data).map(ManagementFrame::AssocResponse),
            S::ReassocResponse => {
                AssocResponseBody::parse(data).map(ManagementFrame::ReassocResponse)
            }
            S::Atim => Some(ManagementFrame::Atim),
            S::Action | S::Other => Some(ManagementFrame::Other),
        }
    }
}

/// Beacon / probe response body: 12 fixed bytes then the element chain.
#[derive(Debug, Clone)]
pub struct BeaconBody {
    /// TSF timestamp in microseconds.
    pub timestamp: u64,
    /// Beacon interval in time units (1 TU = 1024 us).
    pub interval: u16,
    pub capability: Capability,
    pub elements: Vec<InformationElement>,
    pub summary: ElementSummary,
}

impl BeaconBody {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }
        let timestamp = u64::from_le_bytes(data[..8].try_into().ok()?);
        let interval = u16::from_le_bytes([data[8], data[9]]);
        let capability = Capability(u16::from_le_bytes([data[10], data[11]]));
        let elements = parse_elements(&data[12..]);
        let summary = ElementSummary::from_elements(&elements);
        Some(Self {
            timestamp,
            interval,
            capability,
            elements,
            summary,
        })
    }

    pub fn security(&self) -> SecurityInfo {
        SecurityInfo::derive(self.capability, &self.summary)
    }
}

/// Probe request body: element chain only.
#[derive(Debug, Clone)]
pub struct ProbeRequestBody {
    pub elements: Vec<InformationElement>,
    pub summary: ElementSummary,
}

impl ProbeRequestBody {
    pub fn parse(data: &[u8]) -> Self {
        let elements = parse_elements(data);
        let summary = ElementSummary::from_elements(&elements);
        Self { elements, summary }
    }
}

/// Authentication body fixed fields.
#[derive(Debug, Clone, Copy)]
pub struct AuthBody {
    /// 0 = open system, 1 = shared key, 3 = SAE.
    pub algorithm: u16,
    pub sequence: u16,
    pub status: u16,
}

impl AuthBody {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            algorithm: u16::from_le_bytes([data[0], data[1]]),
            sequence: u16::from_le_bytes([data[2], data[3]]),
            status: u16::from_le_bytes([data[4], data[5]]),
        })
    }
}

/// Deauthentication / disassociation body: just the reason code.
#[derive(Debug, Clone, Copy)]
pub struct ReasonBody {
    pub reason_code: u16,
}

impl ReasonBody {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }
        Some(Self {
            reason_code: u16::from_le_bytes([data[0], data[1]]),
        })
    }
}

/// Association / reassociation request body.
#[derive(Debug, Clone)]
pub struct AssocRequestBody {
    pub capability: Capability,
    pub listen_interval: u16,
    /// Reassociation requests name the AP the station is moving from.
    pub current_ap: Option<super::frame::MacAddr>,
    pub elements: Vec<InformationElement>,
    pub summary: ElementSummary,
}

impl AssocRequestBody {
    pub fn parse(data: &[u8], reassoc: bool) -> Option<Self> {
        let fixed = if reassoc { 10 } else { 4 };
        if data.len() < fixed {
            return None;
        }
        let capability = Capability(u16::from_le_bytes([data[0], data[1]]));
        let listen_interval = u16::from_le_bytes([data[2], data[3]]);
        let current_ap = if reassoc {
            super::frame::MacAddr::from_slice(&data[4..10])
        } else {
            None
        };
        let elements = parse_elements(&data[fixed..]);
        let summary = ElementSummary::from_elements(&elements);
        Some(Self {
            capability,
            listen_interval,
            current_ap,
            elements,
            summary,
        })
    }
}

/// Association / reassociation response body.
#[derive(Debug, Clone)]
pub struct AssocResponseBody {
    pub capability: Capability,
    pub status: u16,
    pub aid: u16,
    pub elements: Vec<InformationElement>,
    pub summary: ElementSummary,
}

impl AssocResponseBody {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        let capability = Capability(u16::from_le_bytes([data[0], data[1]]));
        let status = u16::from_le_bytes([data[2], data[3]]);
        let aid = u16::from_le_bytes([data[4], data[5]]) & 0x3fff;
        let elements = parse_elements(&data[6..]);
        let summary = ElementSummary::from_elements(&elements);
        Some(Self {
            capability,
            status,
            aid,
            elements,
            summary,
        })
    }
}
