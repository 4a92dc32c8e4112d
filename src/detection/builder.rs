//! Builder for creating Detection objects from various input formats.

use crate::detection::Detection;

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    class_id: u32,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set a `size`-pixel square box centered on (cx, cy).
    pub fn centered(self, cx: f32, cy: f32, size: f32) -> Self {
        self.xywh(cx, cy, size, size)
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn class_id(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn build(self) -> Detection {
        Detection::new(
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.confidence,
            self.class_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .centered(100.0, 150.0, 40.0)
            .confidence(0.95)
            .class_id(7)
            .build();

        assert_eq!(det.confidence, 0.95);
        assert_eq!(det.class_id, 7);
        assert_eq!(det.bbox.to_tlbr(), [80.0, 130.0, 120.0, 170.0]);
        assert_eq!(det.center(), Some(Point2::new(100.0, 150.0)));
    }
}
