//! Seam between an external object detector and the counter.

use crate::detection::Detection;

/// Anything that turns a raw frame into vehicle detections.
///
/// Boxes are in pixel coordinates of the frame passed in; the counter projects
/// its line onto the same frame size before testing sides.
///
/// ```ignore
/// use std::time::Instant;
/// use linecross_rs::{CounterConfig, Detection, DetectionSource, FrameSize, IntoDetections, LineCounter};
///
/// struct YoloRows {
///     session: MySession,
/// }
///
/// impl DetectionSource for YoloRows {
///     type Error = MySessionError;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // `[x1, y1, x2, y2, confidence, class]` per row
///         let rows: Vec<[f32; 6]> = self.session.run(input, width, height)?;
///         Ok(rows.into_detections())
///     }
/// }
///
/// let mut counter = LineCounter::new(CounterConfig::default())?;
/// let detections = detector.detect(&frame, 1280, 720)?;
/// let result = counter.update(&detections, FrameSize::new(1280, 720), Instant::now());
/// ```
pub trait DetectionSource {
    type Error;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Conversion from model output layouts into detections.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Rows of `[x1, y1, x2, y2, confidence, class]`, the usual YOLO layout.
/// Class values that are negative or not finite become `u32::MAX`, which no
/// class filter accepts.
impl IntoDetections for Vec<[f32; 6]> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|[x1, y1, x2, y2, confidence, class]| {
                let class_id = if class.is_finite() && class >= 0.0 {
                    class as u32
                } else {
                    u32::MAX
                };
                Detection::new(x1, y1, x2, y2, confidence, class_id)
            })
            .collect()
    }
}
