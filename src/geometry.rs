//! Line geometry: side-of-line tests and overlay rendering.

mod frame;
mod line;
#[cfg(feature = "overlay")]
mod overlay;

pub use frame::FrameSize;
pub use line::{CountingLine, LineEquation, LineGeometry, LinePosition, ON_LINE_EPSILON, Side};

#[cfg(feature = "overlay")]
pub use overlay::OverlayRenderer;
