//! Data frame payloads, as far as the engine looks into them: the LLC/SNAP
//! encapsulation and EAPOL-Key frames of the 4-way handshake.

const LLC_SNAP: [u8; 3] = [0xaa, 0xaa, 0x03];
const ETHERTYPE_EAPOL: u16 = 0x888e;
const EAPOL_TYPE_KEY: u8 = 3;

/// A data frame body. Encrypted payloads are opaque; unencrypted ones are
/// checked for an EAPOL-Key frame.
#[derive(Debug, Clone)]
pub struct DataFrame {
    pub protected: bool,
    pub eapol_key: Option<EapolKey>,
}

impl DataFrame {
    pub fn parse(body: &[u8], protected: bool) -> Self {
        let eapol_key = if protected {
            None
        } else {
            extract_eapol_key(body)
        };
        Self {
            protected,
            eapol_key,
        }
    }
}

fn extract_eapol_key(body: &[u8]) -> Option<EapolKey> {
    // LLC/SNAP: dsap/ssap/control, 3-byte OUI, 2-byte ethertype.
    if body.len() < 8 || body[..3] != LLC_SNAP {
        return None;
    }
    let ethertype = u16::from_be_bytes([body[6], body[7]]);
    if ethertype != ETHERTYPE_EAPOL {
        return None;
    }
    EapolKey::parse(&body[8..])
}

/// EAPOL-Key frame fields the handshake detector uses. Multi-byte fields
/// are big-endian per 802.1X.
#[derive(Debug, Clone)]
pub struct EapolKey {
    /// 2 = RC4 (WPA), 254 = WPA, 2/254 both seen in the wild for RSN.
    pub descriptor_type: u8,
    pub key_info: KeyInfo,
    pub key_length: u16,
    pub replay_counter: u64,
    pub nonce: [u8; 32],
    pub iv: [u8; 16],
    pub mic: [u8; 16],
    pub key_data: Vec<u8>,
}

impl EapolKey {
    /// Parse from the EAPOL packet (starting at the 802.1X header).
    pub fn parse(data: &[u8]) -> Option<Self> {
        // EAPOL header: version, packet type, body length.
        if data.len() < 4 || data[1] != EAPOL_TYPE_KEY {
            return None;
        }
        let body = &data[4..];
        // Key descriptor fixed part is 95 bytes up to the key data length.
        if body.len() < 95 {
            return None;
        }

        let descriptor_type = body[0];
        let key_info = KeyInfo::from_u16(u16::from_be_bytes([body[1], body[2]]));
        let key_length = u16::from_be_bytes([body[3], body[4]]);
        let replay_counter = u64::from_be_bytes(body[5..13].try_into().ok()?);

        let mut nonce = [0u8; 32];
        nonce.copy_from_slice(&body[13..45]);
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&body[45..61]);
        // rsc (8) and id (8) sit between the IV and the MIC.
        let mut mic = [0u8; 16];
        mic.copy_from_slice(&body[77..93]);

        let key_data_len = u16::from_be_bytes([body[93], body[94]]) as usize;
        let key_data = body
            .get(95..95 + key_data_len)
            .map(|d| d.to_vec())
            .unwrap_or_default();

        Some(Self {
            descriptor_type,
            key_info,
            key_length,
            replay_counter,
            nonce,
            iv,
            mic,
            key_data,
        })
    }

    pub fn has_nonce(&self) -> bool {
        self.nonce.iter().any(|&b| b != 0)
    }

    /// PMKID from the key data KDE list: vendor tag 0xdd wrapping the
    /// Wi-Fi Alliance OUI with data type 4. APs that support caching put
    /// it in message 1.
    pub fn pmkid(&self) -> Option<[u8; 16]> {
        let data = &self.key_data;
        let mut pos = 0;
        while pos + 2 <= data.len() {
            let tag = data[pos];
            let len = data[pos + 1] as usize;
            pos += 2;
            if pos + len > data.len() {
                break;
            }
            if tag == 0xdd
                && len >= 20
                && data[pos..pos + 4] == [0x00, 0x0f, 0xac, 0x04]
            {
                let mut pmkid = [0u8; 16];
                pmkid.copy_from_slice(&data[pos + 4..pos + 20]);
                return Some(pmkid);
            }
            pos += len;
        }
        None
    }
}

/// Decoded Key Information field.
#[derive(Debug, Clone, Copy)]
pub struct KeyInfo {
    pub raw: u16,
    pub pairwise: bool,
    pub install: bool,
    pub ack: bool,
    pub mic: bool,
    pub secure: bool,
}

impl KeyInfo {
    pub fn from_u16(raw: u16) -> Self {
        Self {
            raw,
            pairwise: raw & 0x0008 != 0,
            install: raw & 0x0040 != 0,
            ack: raw & 0x0080 != 0,
            mic: raw & 0x0100 != 0,
            secure: raw & 0x0200 != 0,
        }
    }

    /// Position in the 4-way handshake, from the (ack, mic, secure,
    /// install) bit pattern. Message 2 and a message 4 with a zeroed
    /// secure bit share a pattern; the nonce disambiguates downstream.
    pub fn message_number(&self) -> Option<u8> {
        match (self.ack, self.mic, self.secure, self.install) {
            (true, false, false, false) => Some(1),
            (false, true, false, false) => Some(2),
            (true, true, true, true) => Some(3),
            (false, true, true, false) => Some(4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_eapol_key(key_info: u16, replay: u64, key_data: &[u8]) -> Vec<u8> {
        let mut llc = LLC_SNAP.to_vec();
        llc.extend_from_slice(&[0x00, 0x00, 0x00]);
        llc.extend_from_slice(&ETHERTYPE_EAPOL.to_be_bytes());

        let mut body = vec![0x02]; // descriptor type
        body.extend_from_slice(&key_info.to_be_bytes());
        body.extend_from_slice(&16u16.to_be_bytes()); // key length
        body.extend_from_slice(&replay.to_be_bytes());
        body.extend_from_slice(&[0xab; 32]); // nonce
        body.extend_from_slice(&[0u8; 16]); // iv
        body.extend_from_slice(&[0u8; 16]); // rsc + id
        body.extend_from_slice(&[0xcd; 16]); // mic
        body.extend_from_slice(&(key_data.len() as u16).to_be_bytes());
        body.extend_from_slice(key_data);

        llc.extend_from_slice(&[0x02, EAPOL_TYPE_KEY]);
        llc.extend_from_slice(&(body.len() as u16).to_be_bytes());
        llc.extend_from_slice(&body);
        llc
    }

    #[test]
    fn message_numbers_from_key_info() {
        assert_eq!(KeyInfo::from_u16(0x008a).message_number(), Some(1));
        assert_eq!(KeyInfo::from_u16(0x010a).message_number(), Some(2));
        assert_eq!(KeyInfo::from_u16(0x13ca).message_number(), Some(3));
        assert_eq!(KeyInfo::from_u16(0x030a).message_number(), Some(4));
        assert_eq!(KeyInfo::from_u16(0x0000).message_number(), None);
    }

    #[test]
    fn eapol_key_extraction() {
        let body = build_eapol_key(0x008a, 7, &[]);
        let frame = DataFrame::parse(&body, false);
        let key = frame.eapol_key.expect("eapol key");
        assert_eq!(key.key_info.message_number(), Some(1));
        assert_eq!(key.replay_counter, 7);
        assert!(key.has_nonce());
        assert_eq!(key.mic, [0xcd; 16]);
    }

    #[test]
    fn protected_payload_is_opaque() {
        let body = build_eapol_key(0x008a, 1, &[]);
        assert!(DataFrame::parse(&body, true).eapol_key.is_none());
    }

    #[test]
    fn pmkid_kde_scan() {
        let mut kde = vec![0xdd, 20];
        kde.extend_from_slice(&[0x00, 0x0f, 0xac, 0x04]);
        kde.extend_from_slice(&[0x11; 16]);
        let body = build_eapol_key(0x008a, 1, &kde);
        let key = DataFrame::parse(&body, false).eapol_key.unwrap();
        assert_eq!(key.pmkid(), Some([0x11; 16]));
    }

    #[test]
    fn non_eapol_llc_is_ignored() {
        let mut body = LLC_SNAP.to_vec();
        body.extend_from_slice(&[0x00, 0x00, 0x00, 0x08, 0x00]); // IPv4
        body.extend_from_slice(&[0u8; 40]);
        assert!(DataFrame::parse(&body, false).eapol_key.is_none());
    }
}
