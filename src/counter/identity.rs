//! Pseudo-identities for detections.
//!
//! The counter only needs a stable key per physical vehicle across
//! consecutive frames. `GridResolver` approximates one from class and a
//! quantized center point. A real tracker can replace it by implementing
//! `IdentityResolver` and returning its track ids.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::detection::Detection;
use crate::error::{Error, Result};

/// Default quantization cell, in pixels.
pub const DEFAULT_CELL_SIZE: f64 = 20.0;

/// Maps a detection to the key of the identity it belongs to.
pub trait IdentityResolver {
    type Key: Clone + Eq + Hash + Ord + fmt::Debug;

    /// Key for this detection, or `None` to skip it.
    fn resolve(&mut self, detection: &Detection) -> Option<Self::Key>;

    /// Drop any internal state. Called when the counter resets.
    fn reset(&mut self) {}
}

/// Key produced by `GridResolver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VehicleKey {
    pub class_id: u32,
    pub cell_x: i64,
    pub cell_y: i64,
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.cell_x, self.cell_y, self.class_id)
    }
}

/// Positional-bucket resolver.
///
/// Small cells split one vehicle into several identities when the detector
/// jitters; large cells merge neighbouring vehicles of the same class. A
/// vehicle is only counted if it changes side while staying in one cell, so
/// the cell must straddle the line for a crossing to register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridResolver {
    cell_size: f64,
}

impl Default for GridResolver {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl GridResolver {
    pub fn new(cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidCellSize(cell_size));
        }
        Ok(Self { cell_size })
    }

    /// One-pixel cells: the key is the integer center itself.
    pub fn per_pixel() -> Self {
        Self { cell_size: 1.0 }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }
}

impl IdentityResolver for GridResolver {
    type Key = VehicleKey;

    fn resolve(&mut self, detection: &Detection) -> Option<VehicleKey> {
        let center = detection.center()?;
        Some(VehicleKey {
            class_id: detection.class_id,
            cell_x: (center.x / self.cell_size).floor() as i64,
            cell_y: (center.y / self.cell_size).floor() as i64,
        })
    }
}
