//! Vehicle counting on a user-defined line.
//!
//! Detections from any object detector are turned into de-duplicated
//! line-crossing counts. There is no real tracker: each detection is given a
//! pseudo-identity from its class and a quantized center point, and a crossing
//! is a change of side of the line under the same identity.

pub mod counter;
pub mod detection;
mod error;
pub mod geometry;
pub mod integration;

pub use counter::{
    CountResult, CounterConfig, Crossing, Direction, GridResolver, IdentityResolver, LineCounter,
    TrackedVehicle, VehicleKey,
};
pub use detection::{Detection, DetectionBuilder, Rect};
pub use error::{Error, Result};
pub use geometry::{CountingLine, FrameSize, LineEquation, LinePosition, Side};
pub use integration::{CountingPipeline, DetectionFilter, DetectionSource, IntoDetections};

#[cfg(feature = "overlay")]
pub use geometry::OverlayRenderer;
