//! Detector-side filtering applied before detections reach the counter.

use std::collections::HashSet;

use nalgebra::Point2;

use crate::detection::{Detection, VEHICLE_CLASSES};
use crate::error::{Error, Result};

/// Confidence, class and region-of-interest filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFilter {
    confidence_threshold: f32,
    classes: Option<HashSet<u32>>,
    region: Option<Vec<Point2<f64>>>,
}

impl Default for DetectionFilter {
    /// Confidence 0.5, COCO vehicle classes, no region.
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            classes: Some(VEHICLE_CLASSES.into_iter().collect()),
            region: None,
        }
    }
}

impl DetectionFilter {
    /// Filter that accepts every detection with a finite center.
    pub fn accept_all() -> Self {
        Self {
            confidence_threshold: 0.0,
            classes: None,
            region: None,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_classes(mut self, classes: impl IntoIterator<Item = u32>) -> Self {
        self.classes = Some(classes.into_iter().collect());
        self
    }

    pub fn with_any_class(mut self) -> Self {
        self.classes = None;
        self
    }

    /// Only keep detections whose center lies inside the polygon (pixels).
    pub fn with_region(mut self, points: &[[f64; 2]]) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::geometry(format!(
                "region needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::geometry("region points must be finite"));
        }
        self.region = Some(points.iter().map(|p| Point2::new(p[0], p[1])).collect());
        Ok(self)
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        if detection.confidence.is_nan() || detection.confidence < self.confidence_threshold {
            return false;
        }
        if let Some(classes) = &self.classes {
            if !classes.contains(&detection.class_id) {
                return false;
            }
        }
        let Some(center) = detection.center() else {
            return false;
        };
        match &self.region {
            Some(polygon) => contains(polygon, &center),
            None => true,
        }
    }

    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections.into_iter().filter(|d| self.accepts(d)).collect()
    }
}

/// Even-odd ray casting test.
fn contains(polygon: &[Point2<f64>], point: &Point2<f64>) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionBuilder;

    fn det(cx: f32, cy: f32, confidence: f32, class_id: u32) -> Detection {
        DetectionBuilder::new()
            .centered(cx, cy, 10.0)
            .confidence(confidence)
            .class_id(class_id)
            .build()
    }

    #[test]
    fn test_default_filter() {
        let filter = DetectionFilter::default();
        assert!(filter.accepts(&det(10.0, 10.0, 0.9, 2)));
        assert!(filter.accepts(&det(10.0, 10.0, 0.5, 7)));
        assert!(!filter.accepts(&det(10.0, 10.0, 0.49, 2)));
        // Person
        assert!(!filter.accepts(&det(10.0, 10.0, 0.9, 0)));
        assert!(!filter.accepts(&det(10.0, 10.0, f32::NAN, 2)));
    }

    #[test]
    fn test_region_of_interest() {
        let filter = DetectionFilter::accept_all()
            .with_region(&[[100.0, 100.0], [300.0, 100.0], [300.0, 300.0], [100.0, 300.0]])
            .unwrap();

        let kept = filter.apply(vec![det(200.0, 200.0, 0.9, 2), det(50.0, 200.0, 0.9, 2)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].center(), Some(Point2::new(200.0, 200.0)));
    }

    #[test]
    fn test_region_needs_three_points() {
        let res = DetectionFilter::default().with_region(&[[0.0, 0.0], [1.0, 1.0]]);
        assert!(matches!(res, Err(Error::InvalidGeometry { .. })));
    }

    #[test]
    fn test_malformed_box_dropped() {
        let filter = DetectionFilter::accept_all();
        let bad = Detection::new(f32::NAN, 0.0, 10.0, 10.0, 0.9, 2);
        assert!(!filter.accepts(&bad));
        assert!(filter.accepts(&det(0.0, 0.0, 0.0, 42)));
    }
}
