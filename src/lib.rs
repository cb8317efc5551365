//! Streaming 802.11 capture analysis.
//!
//! Decodes raw link-layer frames from a finite capture, classifies them,
//! and runs an adaptive pipeline of security heuristics: a first pass
//! gathers the frame mix, a traffic profile picks the detectors worth
//! running, a second pass feeds them, and conditional deep dives profile
//! access points and associating clients. The caller supplies a
//! [`source::FrameSource`] and owns persistence of the returned
//! [`analysis::AnalysisResult`].
//!
//! ```no_run
//! use airsift::{analyze, AnalysisConfig, PcapFileSource};
//!
//! # fn main() -> airsift::Result<()> {
//! let mut source = PcapFileSource::new("capture.pcap");
//! let result = analyze(&mut source, &AnalysisConfig::default())?;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod classify;
pub mod config;
pub mod decode;
pub mod deepdive;
pub mod detect;
pub mod error;
pub mod ieee80211;
pub mod profile;
pub mod radiotap;
pub mod source;
pub mod stats;

pub use analysis::{analyze, AnalysisOrchestrator, AnalysisResult, CancelToken};
pub use classify::{classify, classify_decoded, FrameCategory};
pub use config::{AnalysisConfig, SelectionMode};
pub use decode::{decode, Decoded};
pub use detect::{Detector, DetectorKind, DetectorReport};
pub use error::{AnalysisError, Result};
pub use profile::{profile_traffic, select_detectors, ProfileReport, TrafficProfile};
pub use source::{FrameSource, MemorySource, PcapFileSource, RawFrame};
pub use stats::{StreamStats, StreamStatsCollector};
