//! Association request deep dive.
//!
//! Association requests carry the richest per-client capability
//! advertisement in the air. Each request is summarized and stations are
//! bucketed by a capability signature string, which groups identical
//! device models together.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ieee80211::management::AssocRequestBody;
use crate::ieee80211::{Ieee80211Frame, ManagementFrame, Ssid};

#[derive(Default)]
pub struct AssociationProfileBuilder {
    assoc_req_count: u64,
    details: Vec<AssociationDetail>,
}

/// One summarized association request.
#[derive(Debug, Clone, Serialize)]
pub struct AssociationDetail {
    pub client: String,
    pub ap: String,
    pub bssid: Option<String>,
    pub ssid: Option<String>,
    pub channel: Option<u8>,
    /// Names of the set capability flags.
    pub capabilities: Vec<&'static str>,
    pub supported_rates: Vec<f32>,
    pub extended_rates: Vec<f32>,
    pub power_capability: Option<(i8, i8)>,
    pub supported_channels: Vec<(u8, u8)>,
    pub ht: bool,
    pub vht: bool,
    pub vendors: Vec<&'static str>,
    /// Bucket key: rates + capability flags + HT/VHT presence.
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FingerprintBucket {
    pub count: u64,
    pub unique_clients: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssociationAnalysis {
    pub assoc_req_count: u64,
    pub association_details: Vec<AssociationDetail>,
    pub device_fingerprints: BTreeMap<String, FingerprintBucket>,
    pub unique_device_types: usize,
}

impl AssociationProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_frame(&mut self, frame: &Ieee80211Frame) {
        let Some(ManagementFrame::AssocRequest(body)) = frame.management() else {
            return;
        };
        self.assoc_req_count += 1;

        let Some(client) = frame.addr2 else {
            return;
        };
        self.details.push(summarize(frame, &client.to_string(), body));
    }

    pub fn finalize(&self) -> AssociationAnalysis {
        let mut buckets: BTreeMap<String, (u64, BTreeSet<&str>)> = BTreeMap::new();
        for detail in &self.details {
            let entry = buckets
                .entry(detail.fingerprint.clone())
                .or_insert_with(|| (0, BTreeSet::new()));
            entry.0 += 1;
            entry.1.insert(&detail.client);
        }

        let device_fingerprints: BTreeMap<String, FingerprintBucket> = buckets
            .into_iter()
            .map(|(fp, (count, clients))| {
                (
                    fp,
                    FingerprintBucket {
                        count,
                        unique_clients: clients.len(),
                    },
                )
            })
            .collect();

        AssociationAnalysis {
            assoc_req_count: self.assoc_req_count,
            association_details: self.details.clone(),
            unique_device_types: device_fingerprints.len(),
            device_fingerprints,
        }
    }
}

fn summarize(frame: &Ieee80211Frame, client: &str, body: &AssocRequestBody) -> AssociationDetail {
    let summary = &body.summary;
    let capabilities = body.capability.flag_names();

    let supported_rates: Vec<f32> = summary.rates.iter().map(|r| r.mbps).collect();
    let extended_rates: Vec<f32> = summary.extended_rates.iter().map(|r| r.mbps).collect();

    let mut signature = Vec::new();
    if !supported_rates.is_empty() {
        let rates: Vec<String> = supported_rates.iter().map(|r| format!("{r:.1}")).collect();
        signature.push(format!("rates:{}", rates.join(",")));
    }
    if !capabilities.is_empty() {
        signature.push(format!("caps:{}", capabilities.join(",")));
    }
    if summary.ht {
        signature.push("ht:yes".to_string());
    }
    if summary.vht {
        signature.push("vht:yes".to_string());
    }

    AssociationDetail {
        client: client.to_string(),
        ap: frame.addr1.to_string(),
        bssid: frame.addr3.map(|a| a.to_string()),
        ssid: summary.ssid.as_ref().and_then(Ssid::as_name).map(String::from),
        channel: summary.channel,
        capabilities,
        supported_rates,
        extended_rates,
        power_capability: summary.power_capability,
        supported_channels: summary.supported_channels.clone(),
        ht: summary.ht,
        vht: summary.vht,
        vendors: summary.vendors.iter().map(|v| v.vendor).collect(),
        fingerprint: signature.join("|"),
    }
}
