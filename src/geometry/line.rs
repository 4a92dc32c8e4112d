//! Counting line representations.
//!
//! The line is stored once, as fractions of the frame size, and projected to
//! pixels for whatever frame is being processed. The side test and the overlay
//! both go through the same projection.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::FrameSize;

/// Distances below this are treated as lying on the line.
pub const ON_LINE_EPSILON: f64 = 1e-9;

/// Which half-plane of a line a point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Negative = -1,
    On = 0,
    Positive = 1,
}

impl Side {
    #[inline]
    pub fn sign(self) -> i8 {
        self as i8
    }

    #[inline]
    pub fn is_on_line(self) -> bool {
        self == Side::On
    }
}

/// Implicit line `a·x + b·y + c = 0` through two pixel points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEquation {
    a: f64,
    b: f64,
    c: f64,
    norm: f64,
}

impl LineEquation {
    /// Line through `p1` and `p2`. Fails when the points coincide.
    pub fn through(p1: Point2<f64>, p2: Point2<f64>) -> Result<Self> {
        let a = p2.y - p1.y;
        let b = p1.x - p2.x;
        let c = p2.x * p1.y - p1.x * p2.y;
        let norm = (a * a + b * b).sqrt();

        if !norm.is_finite() || norm == 0.0 || !c.is_finite() {
            return Err(Error::geometry(format!(
                "line endpoints ({}, {}) and ({}, {}) do not define a line",
                p1.x, p1.y, p2.x, p2.y
            )));
        }

        Ok(Self { a, b, c, norm })
    }

    /// Coefficients `(a, b, c)`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    #[inline]
    pub fn signed_distance(&self, point: &Point2<f64>) -> f64 {
        (self.a * point.x + self.b * point.y + self.c) / self.norm
    }

    /// Side of the infinite line the point falls on.
    pub fn side_of(&self, point: &Point2<f64>) -> Side {
        let d = self.signed_distance(point);
        if !d.is_finite() || d.abs() < ON_LINE_EPSILON {
            Side::On
        } else if d > 0.0 {
            Side::Positive
        } else {
            Side::Negative
        }
    }

    /// Unit normal pointing into the positive half-plane.
    pub fn unit_normal(&self) -> Vector2<f64> {
        Vector2::new(self.a, self.b) / self.norm
    }
}

/// Line position as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "units", rename_all = "snake_case")]
pub enum LinePosition {
    /// Pixel endpoints drawn on a frame of the given size.
    Pixels {
        points: [[f64; 2]; 2],
        frame: FrameSize,
    },
    /// Endpoints as fractions of frame width and height.
    Fractions { points: [[f64; 2]; 2] },
}

impl Default for LinePosition {
    fn default() -> Self {
        LinePosition::Fractions {
            points: [[0.0, 0.5], [1.0, 0.5]],
        }
    }
}

/// A validated counting line in fractional coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountingLine {
    start: Point2<f64>,
    end: Point2<f64>,
}

impl CountingLine {
    pub fn from_fractions(start: [f64; 2], end: [f64; 2]) -> Result<Self> {
        let start = Point2::new(start[0], start[1]);
        let end = Point2::new(end[0], end[1]);

        if !(start.x.is_finite() && start.y.is_finite() && end.x.is_finite() && end.y.is_finite())
        {
            return Err(Error::geometry("line endpoints must be finite"));
        }
        // Scaling onto a frame of at least 1x1 never shortens the direction,
        // so a line that is valid in fractions is valid at every resolution.
        LineEquation::through(start, end)?;

        Ok(Self { start, end })
    }

    /// Build from pixel endpoints drawn on a frame of size `reference`.
    pub fn from_pixels(start: [f64; 2], end: [f64; 2], reference: FrameSize) -> Result<Self> {
        let reference = reference.validate()?;
        let w = reference.width as f64;
        let h = reference.height as f64;
        Self::from_fractions([start[0] / w, start[1] / h], [end[0] / w, end[1] / h])
    }

    /// Fractional endpoints.
    pub fn fractions(&self) -> [[f64; 2]; 2] {
        [[self.start.x, self.start.y], [self.end.x, self.end.y]]
    }

    /// Pixel endpoints for a frame of the given size.
    pub fn to_pixels(&self, frame: FrameSize) -> (Point2<f64>, Point2<f64>) {
        let w = frame.width as f64;
        let h = frame.height as f64;
        (
            Point2::new(self.start.x * w, self.start.y * h),
            Point2::new(self.end.x * w, self.end.y * h),
        )
    }

    pub fn equation(&self, frame: FrameSize) -> Result<LineEquation> {
        let frame = frame.validate()?;
        let (p1, p2) = self.to_pixels(frame);
        LineEquation::through(p1, p2)
    }

    pub fn to_position(&self) -> LinePosition {
        LinePosition::Fractions {
            points: self.fractions(),
        }
    }
}

impl TryFrom<&LinePosition> for CountingLine {
    type Error = Error;

    fn try_from(position: &LinePosition) -> Result<Self> {
        match position {
            LinePosition::Pixels { points, frame } => {
                CountingLine::from_pixels(points[0], points[1], *frame)
            }
            LinePosition::Fractions { points } => CountingLine::from_fractions(points[0], points[1]),
        }
    }
}

/// Counting line plus the equation cached for the last frame size seen.
#[derive(Debug, Clone)]
pub struct LineGeometry {
    line: CountingLine,
    cached: Option<(FrameSize, LineEquation)>,
}

impl LineGeometry {
    pub fn new(line: CountingLine) -> Self {
        Self { line, cached: None }
    }

    pub fn line(&self) -> &CountingLine {
        &self.line
    }

    /// Swap the line. The cached equation is dropped.
    pub fn set_line(&mut self, line: CountingLine) {
        self.line = line;
        self.cached = None;
    }

    /// Equation in pixel coordinates of `frame`, recomputed only when the
    /// frame size changes.
    pub fn equation_for(&mut self, frame: FrameSize) -> Result<LineEquation> {
        if let Some((size, equation)) = self.cached {
            if size == frame {
                return Ok(equation);
            }
        }
        let equation = self.line.equation(frame)?;
        self.cached = Some((frame, equation));
        Ok(equation)
    }
}
