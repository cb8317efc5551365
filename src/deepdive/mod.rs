//! Conditional deep-dive passes.
//!
//! These run only when pass 1 saw the frames they feed on: the AP profile
//! needs beacons, the association profile needs association requests.

pub mod access_point;
pub mod association;

pub use access_point::{AccessPointRecord, ApAnalysis, ApProfileBuilder};
pub use association::{AssociationAnalysis, AssociationProfileBuilder};
