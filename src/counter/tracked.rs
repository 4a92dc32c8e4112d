//! Per-identity state held by the counter.

use std::time::{Duration, Instant};

use nalgebra::Point2;

use crate::geometry::Side;

/// One pseudo-identity seen by the counter.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedVehicle {
    /// Detector class id at first sight
    pub class_id: u32,
    /// Last center point, in pixels of the frame it was seen in
    pub position: Point2<f64>,
    /// Last side of the line off the line itself
    pub side: Side,
    /// Set once this identity has produced a counted crossing
    pub crossed: bool,
    pub first_seen: Instant,
    pub last_seen: Instant,
    /// Number of detections matched to this identity
    pub observations: u32,
}

impl TrackedVehicle {
    pub fn new(class_id: u32, position: Point2<f64>, side: Side, now: Instant) -> Self {
        Self {
            class_id,
            position,
            side,
            crossed: false,
            first_seen: now,
            last_seen: now,
            observations: 1,
        }
    }

    /// Record a new detection. A reading exactly on the line keeps the
    /// previous side so the next off-line reading can still be compared.
    pub fn observe(&mut self, position: Point2<f64>, side: Side, now: Instant) {
        self.position = position;
        self.last_seen = now;
        self.observations = self.observations.saturating_add(1);
        if !side.is_on_line() {
            self.side = side;
        }
    }

    pub fn is_stale(&self, now: Instant, stale_after: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > stale_after
    }

    /// Time since first sight.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.first_seen)
    }
}
