//! Integration module for connecting object detection backends with the counter.
//!
//! This module provides the detector seam, detector-side filtering, and a
//! pipeline that feeds filtered detections into a `LineCounter` one frame at
//! a time.

mod detector;
mod filter;
mod pipeline;

pub use detector::{DetectionSource, IntoDetections};
pub use filter::DetectionFilter;
pub use pipeline::CountingPipeline;
