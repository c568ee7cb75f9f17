//! The 2D page surface every renderer and distortion effect draws on.
//!
//! RULE: Code that changes paint state must bracket it in
//! `save_state()` / `restore_state()`. Whatever a caller set before
//! a call must still be in effect after it returns.
//!
//! Coordinates are PDF points with a bottom-left origin.

use kurbo::{Affine, BezPath, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f64) -> Self {
        Self::new(level, level, level)
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Add `offset` to every channel, clamped at 1.0.
    pub fn lighten(self, offset: f64) -> Self {
        Self::new(
            (self.r + offset).min(1.0),
            (self.g + offset).min(1.0),
            (self.b + offset).min(1.0),
        )
    }
}

/// The five base-14 faces invoices are set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Helvetica,
    TimesRoman,
    Courier,
    HelveticaBold,
    TimesBold,
}

impl FontFamily {
    pub const ALL: [FontFamily; 5] = [
        FontFamily::Helvetica,
        FontFamily::TimesRoman,
        FontFamily::Courier,
        FontFamily::HelveticaBold,
        FontFamily::TimesBold,
    ];

    /// PostScript name of the standard Type1 font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::TimesRoman => "Times-Roman",
            Self::Courier => "Courier",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesBold => "Times-Bold",
        }
    }
}

/// Every attribute a drawing call can leave behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintState {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub fill_alpha: f64,
    pub stroke_alpha: f64,
    pub line_width: f64,
    pub font: Option<(FontFamily, f64)>,
    pub ctm: Affine,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            line_width: 1.0,
            font: None,
            ctm: Affine::IDENTITY,
        }
    }
}

/// Current paint state plus the saved stack. Both surfaces embed one.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: PaintState,
    saved: Vec<PaintState>,
}

impl StateStack {
    pub fn current(&self) -> &PaintState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut PaintState {
        &mut self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Panics on an unbalanced restore; that is always a bug in the caller.
    pub fn restore(&mut self) {
        self.current = self
            .saved
            .pop()
            .unwrap_or_else(|| panic!("restore_state() without matching save_state()"));
    }

    /// `m` applies before the current CTM, the way the `cm` operator does.
    pub fn concat(&mut self, m: Affine) {
        self.current.ctm = self.current.ctm * m;
    }
}

/// Drawing contract shared by the PDF backend and the recorder.
pub trait Surface {
    fn paint_state(&self) -> PaintState;

    fn save_state(&mut self);
    fn restore_state(&mut self);

    fn set_fill_color(&mut self, color: Rgb);
    fn set_stroke_color(&mut self, color: Rgb);
    fn set_fill_alpha(&mut self, alpha: f64);
    fn set_stroke_alpha(&mut self, alpha: f64);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: FontFamily, size: f64);

    /// Pre-multiply the current transform by `m`.
    fn concat(&mut self, m: Affine);

    fn line(&mut self, from: Point, to: Point);
    /// Filled circle.
    fn circle(&mut self, center: Point, radius: f64);
    /// Filled axis-aligned rectangle, `origin` is the lower-left corner.
    fn rect(&mut self, origin: Point, width: f64, height: f64);
    fn fill_path(&mut self, path: &BezPath);
    fn draw_text(&mut self, at: Point, text: &str);

    /// Rotate the coordinate frame about `center`, so content near the
    /// center stays put regardless of page size.
    fn rotate_about(&mut self, center: Point, degrees: f64) {
        self.concat(Affine::rotate_about(degrees.to_radians(), center));
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.concat(Affine::translate((dx, dy)));
    }

    fn rotate_degrees(&mut self, degrees: f64) {
        self.concat(Affine::rotate(degrees.to_radians()));
    }
}

/// One recorded call against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    FillColor(Rgb),
    StrokeColor(Rgb),
    FillAlpha(f64),
    StrokeAlpha(f64),
    LineWidth(f64),
    Font(FontFamily, f64),
    Transform(Affine),
    Line { from: Point, to: Point },
    Circle { center: Point, radius: f64 },
    Rect { origin: Point, width: f64, height: f64 },
    FillPath(BezPath),
    Text { at: Point, text: String },
}

impl DrawCommand {
    /// Whether the command puts marks on the page.
    pub fn is_mark(&self) -> bool {
        matches!(
            self,
            Self::Line { .. }
                | Self::Circle { .. }
                | Self::Rect { .. }
                | Self::FillPath(_)
                | Self::Text { .. }
        )
    }
}

/// In-memory surface that keeps every call; used by tests and dry runs.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    state: StateStack,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            state: StateStack::default(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn mark_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_mark()).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }
}

impl Surface for RecordingSurface {
    fn paint_state(&self) -> PaintState {
        *self.state.current()
    }

    fn save_state(&mut self) {
        self.state.save();
        self.commands.push(DrawCommand::Save);
    }

    fn restore_state(&mut self) {
        self.state.restore();
        self.commands.push(DrawCommand::Restore);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.state.current_mut().fill = color;
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.state.current_mut().stroke = color;
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_fill_alpha(&mut self, alpha: f64) {
        self.state.current_mut().fill_alpha = alpha;
        self.commands.push(DrawCommand::FillAlpha(alpha));
    }

    fn set_stroke_alpha(&mut self, alpha: f64) {
        self.state.current_mut().stroke_alpha = alpha;
        self.commands.push(DrawCommand::StrokeAlpha(alpha));
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.current_mut().line_width = width;
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_font(&mut self, font: FontFamily, size: f64) {
        self.state.current_mut().font = Some((font, size));
        self.commands.push(DrawCommand::Font(font, size));
    }

    fn concat(&mut self, m: Affine) {
        self.state.concat(m);
        self.commands.push(DrawCommand::Transform(m));
    }

    fn line(&mut self, from: Point, to: Point) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn circle(&mut self, center: Point, radius: f64) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    fn rect(&mut self, origin: Point, width: f64, height: f64) {
        self.commands.push(DrawCommand::Rect {
            origin,
            width,
            height,
        });
    }

    fn fill_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::FillPath(path.clone()));
    }

    fn draw_text(&mut self, at: Point, text: &str) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_brings_back_saved_state() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        let before = s.paint_state();
        s.save_state();
        s.set_fill_alpha(0.02);
        s.set_stroke_color(Rgb::gray(0.8));
        s.rotate_degrees(3.0);
        s.restore_state();
        assert_eq!(s.paint_state(), before);
    }

    #[test]
    #[should_panic(expected = "without matching save_state")]
    fn unbalanced_restore_panics() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.restore_state();
    }

    #[test]
    fn rotation_about_center_fixes_center() {
        let mut s = RecordingSurface::new(612.0, 792.0);
        let center = Point::new(306.0, 396.0);
        s.rotate_about(center, 0.8);
        let mapped = s.paint_state().ctm * center;
        assert!((mapped.x - center.x).abs() < 1e-9);
        assert!((mapped.y - center.y).abs() < 1e-9);

        // The corner moves, but only by the arc of the small angle.
        let corner = s.paint_state().ctm * Point::ZERO;
        assert!(corner.x.abs() > 0.1);
    }

    #[test]
    fn lighten_clamps_at_one() {
        let c = Rgb::new(0.9, 0.1, 0.5).lighten(0.3);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.4).abs() < 1e-12);
        assert!((c.b - 0.8).abs() < 1e-12);
    }

    #[test]
    fn translate_then_rotate_composes_like_cm() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        s.translate(10.0, 20.0);
        s.rotate_degrees(90.0);
        // (1, 0) rotates to (0, 1) first, then moves by the translation.
        let p = s.paint_state().ctm * Point::new(1.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 21.0).abs() < 1e-9);
        assert_eq!(s.commands().len(), 2);
    }
}
