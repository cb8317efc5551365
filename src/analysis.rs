//! Run orchestration.
//!
//! Sequences the passes: stats, profiling, detector selection, detection,
//! and the conditional deep dives. Any fault inside a detector or deep
//! dive is contained to that section; the run continues and the section is
//! absent from the result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::classify::FrameCategory;
use crate::config::AnalysisConfig;
use crate::decode::{decode, Decoded};
use crate::deepdive::{ApAnalysis, ApProfileBuilder, AssociationAnalysis, AssociationProfileBuilder};
use crate::detect::{
    DeauthReport, Detector, DetectorReport, EvilTwinReport, HandshakeReport, ProbePrivacyReport,
    WeakSecurityReport,
};
use crate::error::Result;
use crate::ieee80211::Ieee80211Frame;
use crate::profile::{profile_traffic, select_detectors, ProfileReport, SelectionReasoning};
use crate::source::FrameSource;
use crate::stats::{StreamStats, StreamStatsCollector};

/// Cooperative cancellation flag, checked at frame boundaries. Triggering
/// it yields a partial result tagged `truncated` instead of an error.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Terminal, immutable output of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub stats: StreamStats,
    pub traffic_profile: ProfileReport,
    pub selection: SelectionReasoning,

    pub deauth_burst: Option<DeauthReport>,
    pub evil_twin: Option<EvilTwinReport>,
    pub probe_privacy: Option<ProbePrivacyReport>,
    pub weak_security: Option<WeakSecurityReport>,
    pub handshake_capture: Option<HandshakeReport>,

    pub access_points: Option<ApAnalysis>,
    pub associations: Option<AssociationAnalysis>,

    /// True when cancellation cut the run short; whatever was complete at
    /// that point is still populated.
    pub truncated: bool,
    pub duration_ms: u64,
}

pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    cancel: CancelToken,
}

impl AnalysisOrchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(config: AnalysisConfig, cancel: CancelToken) -> Self {
        Self { config, cancel }
    }

    /// Run the full pipeline over the source. The only error is a source
    /// that cannot be opened or read at all.
    pub fn run(&self, source: &mut dyn FrameSource) -> Result<AnalysisResult> {
        let started = Instant::now();
        info!("analysis starting");

        let mut truncated = false;

        // Pass 1: stats.
        let mut collector = StreamStatsCollector::new();
        for raw in source.frames()? {
            if self.cancel.is_cancelled() {
                truncated = true;
                break;
            }
            collector.record(&decode(&raw.data));
        }
        let stats = collector.finish();
        info!(
            total_packets = stats.total_packets,
            unique_devices = stats.unique_devices,
            unique_access_points = stats.unique_access_points,
            "pass 1 complete"
        );

        let traffic_profile = profile_traffic(&stats);
        let selection = select_detectors(&traffic_profile, &self.config.selection);
        info!(
            profile = %traffic_profile.profile,
            detectors = ?selection.selected,
            "traffic profiled"
        );

        let mut result = AnalysisResult {
            stats,
            traffic_profile,
            selection,
            deauth_burst: None,
            evil_twin: None,
            probe_privacy: None,
            weak_security: None,
            handshake_capture: None,
            access_points: None,
            associations: None,
            truncated,
            duration_ms: 0,
        };

        if !truncated {
            truncated = self.run_detectors(source, &mut result)?;
        }

        if !truncated {
            truncated = self.run_deep_dives(source, &mut result)?;
        }

        result.truncated = truncated;
        result.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            duration_ms = result.duration_ms,
            truncated = result.truncated,
            "analysis complete"
        );
        Ok(result)
    }

    /// Pass 2: feed every 802.11-bearing frame to the selected detectors.
    /// Returns whether cancellation fired.
    fn run_detectors(
        &self,
        source: &mut dyn FrameSource,
        result: &mut AnalysisResult,
    ) -> Result<bool> {
        let mut detectors: Vec<(Box<dyn Detector>, bool)> = result
            .selection
            .selected
            .iter()
            .map(|kind| (kind.build(&self.config), true))
            .collect();

        let mut truncated = false;
        for raw in source.frames()? {
            if self.cancel.is_cancelled() {
                truncated = true;
                break;
            }
            let Decoded::Dot11(frame) = decode(&raw.data) else {
                continue;
            };
            for (detector, alive) in detectors.iter_mut() {
                if !*alive {
                    continue;
                }
                let caught =
                    catch_unwind(AssertUnwindSafe(|| detector.on_frame(&frame)));
                if caught.is_err() {
                    warn!(detector = %detector.kind(), index = raw.index, "detector fault, disabling");
                    *alive = false;
                }
            }
        }

        for (detector, alive) in &detectors {
            if !alive {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| detector.finalize())) {
                Ok(report) => store_report(result, report),
                Err(_) => {
                    warn!(detector = %detector.kind(), "detector fault at finalize, report omitted")
                }
            }
        }

        info!("pass 2 complete");
        Ok(truncated)
    }

    /// Passes 3 and 4, each conditional on pass-1 counts.
    fn run_deep_dives(
        &self,
        source: &mut dyn FrameSource,
        result: &mut AnalysisResult,
    ) -> Result<bool> {
        if result.stats.count(FrameCategory::Beacon) > 0 {
            let (analysis, truncated) = self.deep_dive(
                source,
                "access point",
                ApProfileBuilder::new(),
                |builder, index, frame| builder.on_frame(index, frame),
                |builder| builder.finalize(),
            )?;
            result.access_points = analysis;
            if truncated {
                return Ok(true);
            }
        }

        if result.stats.count(FrameCategory::AssocReq) > 0 {
            let (analysis, truncated) = self.deep_dive(
                source,
                "association",
                AssociationProfileBuilder::new(),
                |builder, _, frame| builder.on_frame(frame),
                |builder| builder.finalize(),
            )?;
            result.associations = analysis;
            if truncated {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// One extra streaming pass feeding decoded frames to a builder, with
    /// the same fault isolation as detectors. Frames are never buffered;
    /// the builder sees each one as it is decoded.
    fn deep_dive<B, T>(
        &self,
        source: &mut dyn FrameSource,
        name: &str,
        mut builder: B,
        mut feed: impl FnMut(&mut B, u64, &Ieee80211Frame),
        finish: impl FnOnce(&B) -> T,
    ) -> Result<(Option<T>, bool)> {
        let mut iter = source.frames()?;
        let mut truncated = false;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            for raw in &mut iter {
                if self.cancel.is_cancelled() {
                    truncated = true;
                    break;
                }
                if let Decoded::Dot11(frame) = decode(&raw.data) {
                    feed(&mut builder, raw.index, &frame);
                }
            }
            finish(&builder)
        }));

        match outcome {
            Ok(analysis) => {
                info!(section = name, "deep dive complete");
                Ok((Some(analysis), truncated))
            }
            Err(_) => {
                warn!(section = name, "deep dive fault, section omitted");
                Ok((None, truncated))
            }
        }
    }
}

fn store_report(result: &mut AnalysisResult, report: DetectorReport) {
    match report {
        DetectorReport::DeauthBurst(r) => result.deauth_burst = Some(r),
        DetectorReport::EvilTwin(r) => result.evil_twin = Some(r),
        DetectorReport::ProbePrivacy(r) => result.probe_privacy = Some(r),
        DetectorReport::WeakSecurity(r) => result.weak_security = Some(r),
        DetectorReport::HandshakeCapture(r) => result.handshake_capture = Some(r),
    }
}

/// Convenience entry point: run with the given config and source.
pub fn analyze(
    source: &mut dyn FrameSource,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    AnalysisOrchestrator::new(config.clone()).run(source)
}
