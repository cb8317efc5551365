//! Radiotap header parsing.
//!
//! Monitor-mode captures usually prepend a radiotap header to each 802.11
//! frame. The engine only needs the header length to find the MAC header;
//! the per-field radio metadata is not consumed by any detector.
//!
//! Reference: https://www.radiotap.org/

/// Fixed radiotap header (8 bytes, little-endian).
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiotapHeader {
    /// Header version, always 0.
    pub version: u8,
    /// Total header length including optional fields.
    pub length: u16,
    /// Bitmap of present optional fields.
    pub present: u32,
}

impl RadiotapHeader {
    /// Parse the fixed header. Returns `None` for anything that is not a
    /// plausible version-0 radiotap header covering its own length.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        if data[0] != 0 {
            return None;
        }
        let length = u16::from_le_bytes([data[2], data[3]]);
        if (length as usize) < 8 || (length as usize) > data.len() {
            return None;
        }
        let present = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Some(Self {
            version: data[0],
            length,
            present,
        })
    }

    /// The frame body following the radiotap header.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.length as usize..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_header() {
        let data = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        let hdr = RadiotapHeader::parse(&data).unwrap();
        assert_eq!(hdr.version, 0);
        assert_eq!(hdr.length, 8);
        assert_eq!(hdr.present, 0);
        assert!(hdr.payload(&data).is_empty());
    }

    #[test]
    fn reject_bad_version_and_short_length() {
        assert!(RadiotapHeader::parse(&[0x01, 0, 8, 0, 0, 0, 0, 0]).is_none());
        assert!(RadiotapHeader::parse(&[0x00, 0, 4, 0, 0, 0, 0, 0]).is_none());
        // Claimed length exceeds the buffer.
        assert!(RadiotapHeader::parse(&[0x00, 0, 0xff, 0, 0, 0, 0, 0]).is_none());
    }
}
