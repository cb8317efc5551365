//! Synthetic 802.11 frame builders for integration tests.

#![allow(dead_code)]

/// Prepend a minimal radiotap header.
pub fn radiotap(frame: Vec<u8>) -> Vec<u8> {
    let mut buf = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&frame);
    buf
}

pub fn mac(last: u8) -> [u8; 6] {
    [0x02, 0x00, 0x00, 0x00, 0x00, last]
}

fn mgmt_header(fc0: u8, addr1: [u8; 6], addr2: [u8; 6], addr3: [u8; 6]) -> Vec<u8> {
    let mut buf = vec![fc0, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&addr1);
    buf.extend_from_slice(&addr2);
    buf.extend_from_slice(&addr3);
    buf.extend_from_slice(&[0x00, 0x00]);
    buf
}

fn ssid_element(ssid: &str) -> Vec<u8> {
    let mut e = vec![0, ssid.len() as u8];
    e.extend_from_slice(ssid.as_bytes());
    e
}

/// Beacon with an SSID and DS channel element. `privacy` sets the WEP/WPA
/// capability bit; `extra_ies` is appended verbatim.
pub fn beacon(bssid: u8, ssid: &str, channel: u8, privacy: bool, extra_ies: &[u8]) -> Vec<u8> {
    let mut buf = mgmt_header(0x80, [0xff; 6], mac(bssid), mac(bssid));
    buf.extend_from_slice(&[0u8; 10]); // timestamp + interval
    buf.extend_from_slice(&if privacy { [0x11, 0x00] } else { [0x01, 0x00] });
    buf.extend_from_slice(&ssid_element(ssid));
    buf.extend_from_slice(&[3, 1, channel]);
    buf.extend_from_slice(extra_ies);
    buf
}

/// RSN element advertising PSK (and optionally SAE for WPA3).
pub fn rsn_element(sae: bool) -> Vec<u8> {
    let mut payload = vec![0x01, 0x00];
    payload.extend_from_slice(&[0x00, 0x0f, 0xac, 0x04]); // group cipher
    payload.extend_from_slice(&[0x01, 0x00]);
    payload.extend_from_slice(&[0x00, 0x0f, 0xac, 0x04]); // pairwise cipher
    payload.extend_from_slice(&[0x01, 0x00]);
    payload.extend_from_slice(&[0x00, 0x0f, 0xac, if sae { 0x08 } else { 0x02 }]);
    let mut e = vec![48, payload.len() as u8];
    e.extend_from_slice(&payload);
    e
}

pub fn probe_request(station: u8, ssid: &str) -> Vec<u8> {
    let mut buf = mgmt_header(0x40, [0xff; 6], mac(station), [0xff; 6]);
    buf.extend_from_slice(&ssid_element(ssid));
    buf
}

pub fn deauth(src: u8, dst: [u8; 6]) -> Vec<u8> {
    let mut buf = mgmt_header(0xc0, dst, mac(src), mac(src));
    buf.extend_from_slice(&[0x07, 0x00]); // reason: class 3 frame
    buf
}

pub fn authentication(client: u8, ap: u8) -> Vec<u8> {
    let mut buf = mgmt_header(0xb0, mac(ap), mac(client), mac(ap));
    buf.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x00, 0x00]); // open, seq 1, success
    buf
}

pub fn assoc_request(client: u8, ap: u8, ssid: &str, rates: &[u8]) -> Vec<u8> {
    let mut buf = mgmt_header(0x00, mac(ap), mac(client), mac(ap));
    buf.extend_from_slice(&[0x01, 0x02]); // capability: ess + qos
    buf.extend_from_slice(&[0x0a, 0x00]); // listen interval
    buf.extend_from_slice(&ssid_element(ssid));
    let mut rate_elem = vec![1, rates.len() as u8];
    rate_elem.extend_from_slice(rates);
    buf.extend_from_slice(&rate_elem);
    buf
}

pub fn qos_data(src: u8, dst: u8) -> Vec<u8> {
    // to-DS data frame with a QoS control field and opaque payload.
    let mut buf = vec![0x88, 0x01, 0x00, 0x00];
    buf.extend_from_slice(&mac(dst));
    buf.extend_from_slice(&mac(src));
    buf.extend_from_slice(&mac(dst));
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&[0x00, 0x00]); // qos control
    buf.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    buf
}

/// EAPOL-Key data frame. `from_ap` controls the DS bits and address
/// layout; the AP is 02::01 and the station 02::02.
pub fn eapol_key(from_ap: bool, key_info: u16, replay: u64, key_data: &[u8]) -> Vec<u8> {
    let fc1 = if from_ap { 0x02 } else { 0x01 };
    let mut buf = vec![0x08, fc1, 0x00, 0x00];
    if from_ap {
        buf.extend_from_slice(&mac(0x02));
        buf.extend_from_slice(&mac(0x01));
        buf.extend_from_slice(&mac(0x01));
    } else {
        buf.extend_from_slice(&mac(0x01));
        buf.extend_from_slice(&mac(0x02));
        buf.extend_from_slice(&mac(0x01));
    }
    buf.extend_from_slice(&[0x00, 0x00]);

    buf.extend_from_slice(&[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0x8e]);
    let mut body = vec![0x02];
    body.extend_from_slice(&key_info.to_be_bytes());
    body.extend_from_slice(&16u16.to_be_bytes());
    body.extend_from_slice(&replay.to_be_bytes());
    body.extend_from_slice(&[0xab; 32]); // nonce
    body.extend_from_slice(&[0u8; 16]); // iv
    body.extend_from_slice(&[0u8; 16]); // rsc + id
    body.extend_from_slice(&[0xcd; 16]); // mic
    body.extend_from_slice(&(key_data.len() as u16).to_be_bytes());
    body.extend_from_slice(key_data);

    buf.extend_from_slice(&[0x02, 0x03]);
    buf.extend_from_slice(&(body.len() as u16).to_be_bytes());
    buf.extend_from_slice(&body);
    buf
}
