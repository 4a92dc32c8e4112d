//! Overlay rendering onto RGB frames.
//!
//! The line is re-projected from its fractional coordinates for every frame,
//! so the overlay follows resolution changes between setup and runtime.

use std::fmt;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut,
};
use imageproc::rect::Rect as PixelRect;
use nalgebra::{Point2, Rotation2, Vector2};

use crate::counter::{CountResult, Direction, IdentityResolver, LineCounter};
use crate::detection::{Detection, class_name};
use crate::error::{Error, Result};
use crate::geometry::{CountingLine, FrameSize};

const LINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const PANEL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const ARROW_LENGTH: f64 = 30.0;
const ARROW_HEAD_LENGTH: f64 = 9.0;
const MARKER_RADIUS: i32 = 10;

/// Box colour per vehicle class.
fn class_color(class_id: u32) -> Rgb<u8> {
    match class_id {
        3 => Rgb([0, 0, 255]),
        5 => Rgb([255, 0, 0]),
        7 => Rgb([0, 255, 255]),
        _ => Rgb([0, 255, 0]),
    }
}

/// Draws the counting line, direction arrow, count panel and markers.
///
/// Text is only drawn when a font has been supplied.
#[derive(Clone)]
pub struct OverlayRenderer {
    font: Option<FontArc>,
    thickness: u32,
    text_scale: f32,
}

impl fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("has_font", &self.font.is_some())
            .field("thickness", &self.thickness)
            .field("text_scale", &self.text_scale)
            .finish()
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            font: None,
            thickness: 2,
            text_scale: 22.0,
        }
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a TrueType/OpenType font for labels.
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| Error::InvalidFont)?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Stroke width in pixels, at least 1.
    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness.max(1);
        self
    }

    pub fn with_text_scale(mut self, scale: f32) -> Self {
        self.text_scale = scale;
        self
    }

    /// Draw everything for the frame: line, arrow, count panel and markers
    /// for the identities that crossed in `result`. Nothing is drawn while
    /// the counter is disabled.
    pub fn render<R: IdentityResolver>(
        &self,
        frame: &mut RgbImage,
        counter: &LineCounter<R>,
        result: &CountResult<R::Key>,
    ) -> Result<()> {
        if !counter.is_enabled() {
            return Ok(());
        }
        self.draw_line(frame, counter.line(), counter.direction())?;
        self.draw_count(frame, counter.total_count(), counter.direction());
        for key in &result.new_vehicle_ids {
            if let Some(vehicle) = counter.vehicle(key) {
                self.draw_crossing_marker(frame, vehicle.position, vehicle.class_id);
            }
        }
        Ok(())
    }

    /// Draw the counting line and, unless `direction` is `Both`, an arrow
    /// toward the side a counted vehicle moves into.
    pub fn draw_line(
        &self,
        frame: &mut RgbImage,
        line: &CountingLine,
        direction: Direction,
    ) -> Result<()> {
        let size = FrameSize::new(frame.width(), frame.height());
        let equation = line.equation(size)?;
        let (start, end) = line.to_pixels(size);
        let normal = equation.unit_normal();

        self.stroke(frame, start, end, normal, LINE_COLOR);

        let towards = match direction {
            Direction::Both => return Ok(()),
            // Up counts positive -> negative moves.
            Direction::Up => -normal,
            Direction::Down => normal,
        };
        let mid = Point2::from((start.coords + end.coords) / 2.0);
        let tip = mid + towards * ARROW_LENGTH;
        self.stroke(frame, mid, tip, normal_of(&towards), LINE_COLOR);

        let back = -towards * ARROW_HEAD_LENGTH;
        for angle in [std::f64::consts::FRAC_PI_6, -std::f64::consts::FRAC_PI_6] {
            let barb = Rotation2::new(angle) * back;
            self.stroke(frame, tip, tip + barb, normal_of(&barb), LINE_COLOR);
        }
        Ok(())
    }

    /// Running count panel in the top-left corner.
    pub fn draw_count(&self, frame: &mut RgbImage, total: u64, direction: Direction) {
        draw_filled_rect_mut(frame, PixelRect::at(10, 10).of_size(190, 40), PANEL_COLOR);
        if let Some(font) = &self.font {
            let text = format!("Count {}: {}", direction, total);
            draw_text_mut(
                frame,
                TEXT_COLOR,
                20,
                18,
                PxScale::from(self.text_scale),
                font,
                &text,
            );
        }
    }

    /// Filled marker where a vehicle crossed, labelled with its class.
    /// Positions farther than the marker radius outside the frame are skipped.
    pub fn draw_crossing_marker(&self, frame: &mut RgbImage, position: Point2<f64>, class_id: u32) {
        let reach = MARKER_RADIUS as f64;
        let inside = position.x >= -reach
            && position.x <= frame.width() as f64 + reach
            && position.y >= -reach
            && position.y <= frame.height() as f64 + reach;
        if !inside {
            return;
        }
        let center = (position.x.round() as i32, position.y.round() as i32);
        draw_filled_circle_mut(frame, center, MARKER_RADIUS, MARKER_COLOR);
        if let Some(font) = &self.font {
            let label = format!("{} crossed", class_name(class_id).unwrap_or("Vehicle"));
            draw_text_mut(
                frame,
                MARKER_COLOR,
                center.0.saturating_sub(50),
                center.1.saturating_sub(20 + self.text_scale as i32),
                PxScale::from(self.text_scale),
                font,
                &label,
            );
        }
    }

    /// Detection boxes coloured by class. Inverted, empty and off-frame
    /// boxes are skipped; boxes reaching past the frame edge are cut just
    /// outside it so the hidden edges stay hidden.
    pub fn draw_detections(&self, frame: &mut RgbImage, detections: &[Detection]) {
        let margin = self.thickness as f32 + 1.0;
        let (width, height) = (frame.width() as f32, frame.height() as f32);
        for det in detections {
            let bbox = det.bbox;
            if !bbox.is_well_formed() || bbox.width < 1.0 || bbox.height < 1.0 {
                continue;
            }
            let [x1, y1, x2, y2] = bbox.to_tlbr();
            if x2 < 0.0 || y2 < 0.0 || x1 >= width || y1 >= height {
                continue;
            }
            let (x1, y1) = (x1.max(-margin), y1.max(-margin));
            let (x2, y2) = (x2.min(width + margin), y2.min(height + margin));

            let color = class_color(det.class_id);
            let x = x1.round() as i32;
            let y = y1.round() as i32;
            let w = (x2 - x1).round() as u32;
            let h = (y2 - y1).round() as u32;
            for inset in 0..self.thickness.min(w / 2).min(h / 2).max(1) {
                let rect = PixelRect::at(x + inset as i32, y + inset as i32)
                    .of_size(w - 2 * inset, h - 2 * inset);
                draw_hollow_rect_mut(frame, rect, color);
            }
            if let Some(font) = &self.font {
                let label = match class_name(det.class_id) {
                    Some(name) => format!("{} {:.2}", name, det.confidence),
                    None => format!("Class {} {:.2}", det.class_id, det.confidence),
                };
                draw_text_mut(
                    frame,
                    color,
                    x,
                    y.saturating_sub(self.text_scale as i32 + 2),
                    PxScale::from(self.text_scale),
                    font,
                    &label,
                );
            }
        }
    }

    /// Segment widened to `thickness` by drawing parallel copies along
    /// `normal`, clipped to the frame first.
    fn stroke(
        &self,
        frame: &mut RgbImage,
        from: Point2<f64>,
        to: Point2<f64>,
        normal: Vector2<f64>,
        color: Rgb<u8>,
    ) {
        let bounds = Vector2::new(frame.width() as f64, frame.height() as f64);
        let half = (self.thickness - 1) as f64 / 2.0;
        for i in 0..self.thickness {
            let offset = normal * (i as f64 - half);
            let Some((a, b)) = clip_segment(from + offset, to + offset, bounds) else {
                continue;
            };
            draw_line_segment_mut(
                frame,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            );
        }
    }
}

/// Liang-Barsky clip of a segment to `[-1, bounds + 1]` on both axes.
/// Returns `None` when nothing of the segment is left or it is not finite.
fn clip_segment(
    from: Point2<f64>,
    to: Point2<f64>,
    bounds: Vector2<f64>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    if !(from.coords.iter().chain(to.coords.iter()).all(|v| v.is_finite())) {
        return None;
    }
    let delta = to - from;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for axis in 0..2 {
        let (lo, hi) = (-1.0, bounds[axis] + 1.0);
        let (p, d) = (from[axis], delta[axis]);
        if d == 0.0 {
            if p < lo || p > hi {
                return None;
            }
            continue;
        }
        let (mut enter, mut leave) = ((lo - p) / d, (hi - p) / d);
        if enter > leave {
            std::mem::swap(&mut enter, &mut leave);
        }
        t0 = t0.max(enter);
        t1 = t1.min(leave);
        if t0 > t1 {
            return None;
        }
    }
    Some((from + delta * t0, from + delta * t1))
}

/// Unit vector perpendicular to `v`.
fn normal_of(v: &Vector2<f64>) -> Vector2<f64> {
    let n = Vector2::new(-v.y, v.x);
    let len = n.norm();
    if len > 0.0 { n / len } else { n }
}
