//! Deauthentication/disassociation burst detection.
//!
//! A spoofed deauth flood knocks stations off an AP faster than they can
//! rejoin. The detector counts all deauth/disassoc frames and keeps a
//! sliding window over their processing-time arrivals; filling the window
//! past the threshold emits one burst record attributed to the most
//! frequent in-window source.
//!
//! The window runs on processing time, not the frame's capture timestamp.
//! Replayed captures therefore compress into analysis speed; the clock is
//! injectable so tests (or a future capture-time mode) can control it.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use serde::Serialize;

use crate::config::DeauthConfig;
use crate::ieee80211::{Ieee80211Frame, MacAddr, ManagementFrame};

use super::{Detector, DetectorKind, DetectorReport};

pub type Clock = Box<dyn Fn() -> Instant + Send>;

pub struct DeauthBurstDetector {
    window_secs: u64,
    threshold: usize,
    clock: Clock,

    deauth_count: u64,
    disassoc_count: u64,
    per_source: HashMap<MacAddr, u64>,
    broadcast_count: u64,
    window: VecDeque<(Instant, MacAddr)>,
    bursts: Vec<BurstRecord>,
}

/// One detected burst.
#[derive(Debug, Clone, Serialize)]
pub struct BurstRecord {
    /// Most frequent source inside the window when it filled.
    pub source: String,
    /// Events attributed to that source within the window.
    pub source_events: usize,
    /// Total events in the window.
    pub window_events: usize,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeauthReport {
    pub deauth_count: u64,
    pub disassoc_count: u64,
    pub broadcast_count: u64,
    /// Top sources by event count, at most five.
    pub top_sources: Vec<SourceCount>,
    pub bursts: Vec<BurstRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub events: u64,
}

impl DeauthBurstDetector {
    pub fn new(config: &DeauthConfig) -> Self {
        Self::with_clock(config, Box::new(Instant::now))
    }

    pub fn with_clock(config: &DeauthConfig, clock: Clock) -> Self {
        Self {
            window_secs: config.burst_window_secs,
            threshold: config.burst_threshold,
            clock,
            deauth_count: 0,
            disassoc_count: 0,
            per_source: HashMap::new(),
            broadcast_count: 0,
            window: VecDeque::new(),
            bursts: Vec::new(),
        }
    }

    fn record_event(&mut self, frame: &Ieee80211Frame) {
        if frame.addr1.is_broadcast() {
            self.broadcast_count += 1;
        }

        let Some(source) = frame.source() else {
            return;
        };
        *self.per_source.entry(source).or_insert(0) += 1;

        let now = (self.clock)();
        self.window.push_back((now, source));
        while let Some(&(oldest, _)) = self.window.front() {
            if now.duration_since(oldest).as_secs() >= self.window_secs {
                self.window.pop_front();
            } else {
                break;
            }
        }

        if self.window.len() >= self.threshold {
            self.emit_burst();
            self.window.clear();
        }
    }

    fn emit_burst(&mut self) {
        let mut in_window: HashMap<MacAddr, usize> = HashMap::new();
        for &(_, src) in &self.window {
            *in_window.entry(src).or_insert(0) += 1;
        }
        let Some((&source, &count)) = in_window.iter().max_by_key(|(_, &c)| c) else {
            return;
        };
        self.bursts.push(BurstRecord {
            source: source.to_string(),
            source_events: count,
            window_events: self.window.len(),
            window_secs: self.window_secs,
        });
    }
}

impl Detector for DeauthBurstDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::DeauthBurst
    }

    fn on_frame(&mut self, frame: &Ieee80211Frame) {
        match frame.management() {
            Some(ManagementFrame::Deauthentication(_)) => {
                self.deauth_count += 1;
                self.record_event(frame);
            }
            Some(ManagementFrame::Disassociation(_)) => {
                self.disassoc_count += 1;
                self.record_event(frame);
            }
            _ => {}
        }
    }

    fn finalize(&self) -> DetectorReport {
        let mut top: Vec<SourceCount> = self
            .per_source
            .iter()
            .map(|(src, &events)| SourceCount {
                source: src.to_string(),
                events,
            })
            .collect();
        top.sort_by(|a, b| b.events.cmp(&a.events).then(a.source.cmp(&b.source)));
        top.truncate(5);

        DetectorReport::DeauthBurst(DeauthReport {
            deauth_count: self.deauth_count,
            disassoc_count: self.disassoc_count,
            broadcast_count: self.broadcast_count,
            top_sources: top,
            bursts: self.bursts.clone(),
        })
    }
}
