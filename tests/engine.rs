//! End-to-end runs over synthetic captures.

mod common;

use airsift::config::SelectionConfig;
use airsift::{
    analyze, AnalysisConfig, AnalysisOrchestrator, CancelToken, DetectorKind, FrameCategory,
    MemorySource, SelectionMode, TrafficProfile,
};

use common::*;

fn full_config() -> AnalysisConfig {
    AnalysisConfig {
        selection: SelectionConfig {
            mode: SelectionMode::Full,
            min_detectors: 3,
        },
        ..AnalysisConfig::default()
    }
}

#[test]
fn frame_mix_sums_to_total_including_garbage() {
    let mut source = MemorySource::new(vec![
        radiotap(beacon(1, "Net", 6, true, &[])),
        beacon(1, "Net", 6, true, &[]),
        probe_request(2, "Net"),
        vec![0x07, 0x03, 0x01], // undecodable
        radiotap(vec![0xc0]),   // radiotap without a MAC header
    ]);
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.stats.total_packets, 5);
    let mix_sum: u64 = result.stats.frame_mix.values().sum();
    assert_eq!(mix_sum, result.stats.total_packets);
    assert_eq!(result.stats.count(FrameCategory::Beacon), 2);
    assert_eq!(result.stats.count(FrameCategory::Non80211), 1);
    assert_eq!(result.stats.count(FrameCategory::RadiotapNoDot11), 1);
    assert!(
        result.stats.unique_devices
            >= result
                .stats
                .unique_access_points
                .max(result.stats.unique_clients)
    );
    assert!(!result.truncated);
}

#[test]
fn deauth_heavy_capture_profiles_as_attack() {
    let mut frames = Vec::new();
    for _ in 0..15 {
        frames.push(deauth(0x0a, [0xff; 6]));
    }
    for _ in 0..50 {
        frames.push(beacon(1, "Net", 6, true, &[]));
    }
    for _ in 0..35 {
        frames.push(qos_data(2, 1));
    }

    let mut source = MemorySource::new(frames);
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.traffic_profile.profile, TrafficProfile::DeauthAttack);
    let indicator = &result.traffic_profile.indicators[0];
    assert_eq!(indicator.kind, "deauth_flood");

    assert_eq!(result.selection.selected[0], DetectorKind::DeauthBurst);
    let deauth_report = result.deauth_burst.expect("deauth report");
    assert_eq!(deauth_report.deauth_count, 15);
    assert_eq!(deauth_report.top_sources[0].source, "02:00:00:00:00:0a");
    // Not selected for this profile.
    assert!(result.weak_security.is_none());
}

#[test]
fn evil_twin_mismatch_detected_in_full_mode() {
    let mut source = MemorySource::new(vec![
        beacon(1, "Cafe", 6, false, &[]),
        beacon(2, "Cafe", 6, true, &rsn_element(false)),
    ]);
    let result = analyze(&mut source, &full_config()).unwrap();

    let report = result.evil_twin.expect("evil twin report");
    assert_eq!(report.suspects.len(), 1);
    assert_eq!(report.suspects[0].ssid, "Cafe");
    assert_eq!(report.suspects[0].reason, "open+secure mismatch");

    // The open clone also shows up as weak.
    let weak = result.weak_security.expect("weak security report");
    assert_eq!(weak.weak.len(), 1);
    assert_eq!(weak.weak[0].bssid, "02:00:00:00:00:01");
}

#[test]
fn probe_privacy_threshold_is_exact() {
    let mut frames = Vec::new();
    for i in 0..5 {
        frames.push(probe_request(0x0a, &format!("net-{i}")));
    }
    for i in 0..4 {
        frames.push(probe_request(0x0b, &format!("net-{i}")));
    }

    let mut source = MemorySource::new(frames);
    let result = analyze(&mut source, &full_config()).unwrap();

    let report = result.probe_privacy.expect("probe privacy report");
    assert_eq!(report.high_risk.len(), 1);
    assert_eq!(report.high_risk[0].station, "02:00:00:00:00:0a");
}

#[test]
fn handshake_messages_captured_in_order() {
    let mut pmkid_kde = vec![0xdd, 20];
    pmkid_kde.extend_from_slice(&[0x00, 0x0f, 0xac, 0x04]);
    pmkid_kde.extend_from_slice(&[0x42; 16]);

    let mut source = MemorySource::new(vec![
        eapol_key(true, 0x008a, 1, &pmkid_kde), // msg 1 with PMKID
        eapol_key(false, 0x010a, 1, &[]),       // msg 2
        eapol_key(true, 0x13ca, 2, &[]),        // msg 3
        eapol_key(false, 0x030a, 2, &[]),       // msg 4
    ]);
    let result = analyze(&mut source, &full_config()).unwrap();

    let report = result.handshake_capture.expect("handshake report");
    assert_eq!(report.eapol_frames, 4);
    let numbers: Vec<u8> = report.messages.iter().map(|m| m.message).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(report.pmkids_seen, 1);
    assert_eq!(report.messages[0].bssid, "02:00:00:00:00:01");
    assert_eq!(report.messages[0].station, "02:00:00:00:00:02");
}

#[test]
fn deep_dives_run_only_when_fed() {
    let mut source = MemorySource::new(vec![
        beacon(1, "Office", 6, true, &rsn_element(false)),
        assoc_request(2, 1, "Office", &[0x82, 0x84]),
    ]);
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();

    let aps = result.access_points.expect("ap analysis");
    assert_eq!(aps.unique_aps, 1);
    assert_eq!(aps.access_points[0].ssid, "Office");
    assert!(aps.access_points[0].security_assessment.overall_score >= 40);

    let assocs = result.associations.expect("association analysis");
    assert_eq!(assocs.assoc_req_count, 1);
    assert_eq!(assocs.unique_device_types, 1);

    // No association requests: the section stays absent.
    let mut source = MemorySource::new(vec![beacon(1, "Office", 6, true, &[])]);
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();
    assert!(result.access_points.is_some());
    assert!(result.associations.is_none());
}

#[test]
fn ap_sightings_carry_capture_positions() {
    let mut source = MemorySource::new(vec![
        probe_request(9, "Elsewhere"),
        beacon(1, "Net", 6, true, &[]),
        probe_request(9, "Elsewhere"),
        beacon(1, "Net", 6, true, &[]),
    ]);
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();

    let aps = result.access_points.expect("ap analysis");
    assert_eq!(aps.access_points[0].first_seen, 1);
    assert_eq!(aps.access_points[0].last_seen, 3);
    assert_eq!(aps.access_points[0].beacon_count, 2);
}

#[test]
fn empty_capture_yields_empty_profile_and_default_selection() {
    let mut source = MemorySource::new(Vec::new());
    let result = analyze(&mut source, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.stats.total_packets, 0);
    assert_eq!(result.traffic_profile.profile, TrafficProfile::Empty);
    assert_eq!(result.selection.selected, vec![DetectorKind::WeakSecurity]);
    assert!(result.access_points.is_none());
    assert!(result.associations.is_none());
}

#[test]
fn cancellation_tags_the_result_truncated() {
    let token = CancelToken::new();
    token.cancel();
    let orchestrator = AnalysisOrchestrator::with_cancel(AnalysisConfig::default(), token);

    let mut source = MemorySource::new(vec![beacon(1, "Net", 6, true, &[]); 100]);
    let result = orchestrator.run(&mut source).unwrap();

    assert!(result.truncated);
    assert_eq!(result.stats.total_packets, 0);
    assert!(result.access_points.is_none());
}

#[test]
fn result_serializes_to_json() {
    let mut source = MemorySource::new(vec![
        beacon(1, "Net", 6, true, &rsn_element(true)),
        probe_request(2, "Net"),
        deauth(3, [0xff; 6]),
    ]);
    let result = analyze(&mut source, &full_config()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["stats"]["frame_mix"]["beacon"].is_u64());
    assert_eq!(json["traffic_profile"]["profile"], "deauth_attack");
    assert!(json["duration_ms"].is_u64());
}
