//! Detector output consumed by the counter.

mod builder;
mod class;
mod rect;

pub use builder::DetectionBuilder;
pub use class::{VEHICLE_CLASSES, class_name};
pub use rect::Rect;

use nalgebra::Point2;

/// A single detection from the external detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLBR order as received; not validated.
    pub bbox: Rect,
    /// Detection confidence score
    pub confidence: f32,
    /// Detector class id (COCO ids for stock YOLO models)
    pub class_id: u32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: u32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            confidence,
            class_id,
        }
    }

    pub fn from_rect(bbox: Rect, confidence: f32, class_id: u32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }

    /// Box midpoint, or `None` when any coordinate is not finite.
    pub fn center(&self) -> Option<Point2<f64>> {
        let (cx, cy) = self.bbox.center();
        let center = Point2::new(cx as f64, cy as f64);
        (center.x.is_finite() && center.y.is_finite()).then_some(center)
    }
}
