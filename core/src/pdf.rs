//! lopdf-backed page surface.
//!
//! Every Surface call becomes one or more content-stream operators.
//! Transparency has no direct operator in PDF, so each distinct alpha
//! value gets its own ExtGState resource, named by its value quantized
//! to thousandths.

use std::collections::BTreeMap;
use std::path::Path as FsPath;

use kurbo::{Affine, BezPath, Circle, PathEl, Point, QuadBez, Shape};
use lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object,
};

use crate::{
    error::ForgeResult,
    surface::{FontFamily, PaintState, Rgb, StateStack, Surface},
};

/// Flattening tolerance for circles, in points.
const CIRCLE_TOLERANCE: f64 = 0.1;

/// Font used by `draw_text` when nothing was set.
const FALLBACK_FONT: (FontFamily, f64) = (FontFamily::Helvetica, 12.0);

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

/// Clamp to [0, 1] and quantize to 1/1000.
pub fn quantize_alpha(alpha: f64) -> u32 {
    (alpha.clamp(0.0, 1.0) * 1000.0).round() as u32
}

fn font_resource_name(font: FontFamily) -> String {
    let index = FontFamily::ALL
        .iter()
        .position(|f| *f == font)
        .unwrap_or_default();
    format!("F{}", index + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum AlphaTarget {
    Fill,
    Stroke,
}

impl AlphaTarget {
    fn key(&self) -> &'static str {
        match self {
            Self::Fill => "ca",
            Self::Stroke => "CA",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Fill => "Af",
            Self::Stroke => "As",
        }
    }
}

/// A single-page PDF under construction.
pub struct PdfSurface {
    width: f64,
    height: f64,
    state: StateStack,
    operations: Vec<Operation>,
    alpha_states: BTreeMap<(AlphaTarget, u32), String>,
}

impl PdfSurface {
    pub fn new(width: f64, height: f64) -> Self {
        assert!(width >= 1.0 && height >= 1.0, "page must be at least 1x1");
        Self {
            width,
            height,
            state: StateStack::default(),
            operations: Vec::new(),
            alpha_states: BTreeMap::new(),
        }
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn push_curve(&mut self, c1: Point, c2: Point, to: Point) {
        self.push(
            "c",
            vec![real(c1.x), real(c1.y), real(c2.x), real(c2.y), real(to.x), real(to.y)],
        );
    }

    /// PDF has no quadratic operator, so quads are raised to cubics.
    fn emit_path(&mut self, elements: impl IntoIterator<Item = PathEl>) {
        let (mut start, mut last) = (Point::ZERO, Point::ZERO);
        for el in elements {
            match el {
                PathEl::MoveTo(p) => {
                    self.push("m", vec![real(p.x), real(p.y)]);
                    (start, last) = (p, p);
                }
                PathEl::LineTo(p) => {
                    self.push("l", vec![real(p.x), real(p.y)]);
                    last = p;
                }
                PathEl::QuadTo(q, p) => {
                    let cubic = QuadBez::new(last, q, p).raise();
                    self.push_curve(cubic.p1, cubic.p2, cubic.p3);
                    last = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    self.push_curve(c1, c2, p);
                    last = p;
                }
                PathEl::ClosePath => {
                    self.push("h", vec![]);
                    last = start;
                }
            }
        }
    }

    fn set_alpha(&mut self, target: AlphaTarget, alpha: f64) {
        let quantized = quantize_alpha(alpha);
        let next_index = self.alpha_states.len();
        let gs_name = self
            .alpha_states
            .entry((target, quantized))
            .or_insert_with(|| format!("{}{}", target.prefix(), next_index))
            .clone();
        self.push("gs", vec![name(&gs_name)]);
    }

    fn resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for font in FontFamily::ALL {
            fonts.set(
                font_resource_name(font),
                Object::Dictionary(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                }),
            );
        }

        let mut ext_g_states = Dictionary::new();
        for ((target, quantized), gs_name) in &self.alpha_states {
            let mut gs = Dictionary::new();
            gs.set("Type", name("ExtGState"));
            gs.set(target.key(), real(*quantized as f64 / 1000.0));
            ext_g_states.set(gs_name.as_str(), Object::Dictionary(gs));
        }

        dictionary! {
            "Font" => Object::Dictionary(fonts),
            "ExtGState" => Object::Dictionary(ext_g_states),
        }
    }

    /// Finish the page into a one-page document.
    ///
    /// Panics when a `save_state()` is still open.
    pub fn into_document(self) -> ForgeResult<Document> {
        assert_eq!(
            self.state.depth(),
            0,
            "page finished with unbalanced save_state()"
        );

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let resources_id = doc.add_object(self.resources());
        let content = Content {
            operations: self.operations,
        };
        let content_id = doc.add_object(lopdf::Stream::new(Dictionary::new(), content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![0.into(), 0.into(), real(self.width), real(self.height)],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        Ok(doc)
    }

    pub fn to_bytes(self) -> ForgeResult<Vec<u8>> {
        let mut doc = self.into_document()?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    pub fn save(self, path: &FsPath) -> ForgeResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Surface for PdfSurface {
    fn paint_state(&self) -> PaintState {
        *self.state.current()
    }

    fn save_state(&mut self) {
        self.state.save();
        self.push("q", vec![]);
    }

    fn restore_state(&mut self) {
        self.state.restore();
        self.push("Q", vec![]);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.state.current_mut().fill = color;
        self.push("rg", vec![real(color.r), real(color.g), real(color.b)]);
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.state.current_mut().stroke = color;
        self.push("RG", vec![real(color.r), real(color.g), real(color.b)]);
    }

    fn set_fill_alpha(&mut self, alpha: f64) {
        self.state.current_mut().fill_alpha = alpha;
        self.set_alpha(AlphaTarget::Fill, alpha);
    }

    fn set_stroke_alpha(&mut self, alpha: f64) {
        self.state.current_mut().stroke_alpha = alpha;
        self.set_alpha(AlphaTarget::Stroke, alpha);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.current_mut().line_width = width;
        self.push("w", vec![real(width)]);
    }

    // Font is only tracked here; draw_text emits Tf with each run so a
    // page that never sets one still gets the fallback.
    fn set_font(&mut self, font: FontFamily, size: f64) {
        self.state.current_mut().font = Some((font, size));
    }

    fn concat(&mut self, m: Affine) {
        self.state.concat(m);
        self.push("cm", m.as_coeffs().iter().map(|v| real(*v)).collect());
    }

    fn line(&mut self, from: Point, to: Point) {
        self.push("m", vec![real(from.x), real(from.y)]);
        self.push("l", vec![real(to.x), real(to.y)]);
        self.push("S", vec![]);
    }

    fn circle(&mut self, center: Point, radius: f64) {
        self.emit_path(Circle::new(center, radius).path_elements(CIRCLE_TOLERANCE));
        self.push("f", vec![]);
    }

    fn rect(&mut self, origin: Point, width: f64, height: f64) {
        self.push(
            "re",
            vec![real(origin.x), real(origin.y), real(width), real(height)],
        );
        self.push("f", vec![]);
    }

    fn fill_path(&mut self, path: &BezPath) {
        if path.elements().is_empty() {
            return;
        }
        self.emit_path(path.iter());
        self.push("f", vec![]);
    }

    fn draw_text(&mut self, at: Point, text: &str) {
        let (font, size) = self.state.current().font.unwrap_or(FALLBACK_FONT);
        self.push("BT", vec![]);
        self.push("Tf", vec![name(&font_resource_name(font)), real(size)]);
        self.push("Td", vec![real(at.x), real(at.y)]);
        self.push("Tj", vec![Object::string_literal(text)]);
        self.push("ET", vec![]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded_operators(bytes: &[u8]) -> Vec<Operation> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content).unwrap().operations
    }

    #[test]
    fn quantize_clamps_and_rounds() {
        assert_eq!(quantize_alpha(0.0235), 24);
        assert_eq!(quantize_alpha(-1.0), 0);
        assert_eq!(quantize_alpha(3.0), 1000);
    }

    #[test]
    fn written_page_parses_back() {
        let mut s = PdfSurface::new(612.0, 792.0);
        s.save_state();
        s.set_fill_color(Rgb::new(0.6, 0.0, 0.0));
        s.set_fill_alpha(0.1);
        s.rect(Point::new(10.0, 10.0), 20.0, 30.0);
        s.restore_state();
        s.set_font(FontFamily::Courier, 10.0);
        s.draw_text(Point::new(56.0, 680.0), "INVOICE");

        let ops = decoded_operators(&s.to_bytes().unwrap());
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names.first(), Some(&"q"));
        assert!(names.contains(&"gs"));
        assert!(names.contains(&"re"));
        assert!(names.contains(&"Tj"));
        let text = ops
            .iter()
            .find(|o| o.operator == "Tj")
            .and_then(|o| o.operands.first())
            .and_then(|o| o.as_str().ok())
            .unwrap();
        assert_eq!(text, b"INVOICE".as_slice());
    }

    #[test]
    fn alpha_states_are_shared_per_value() {
        let mut s = PdfSurface::new(100.0, 100.0);
        s.set_fill_alpha(0.02);
        s.set_fill_alpha(0.0201);
        s.set_stroke_alpha(0.02);
        assert_eq!(s.alpha_states.len(), 2);

        let bytes = s.to_bytes().unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn paint_state_tracks_like_the_recorder() {
        let mut s = PdfSurface::new(612.0, 792.0);
        let before = s.paint_state();
        s.save_state();
        s.rotate_about(Point::new(306.0, 396.0), 0.5);
        s.set_line_width(2.0);
        s.restore_state();
        assert_eq!(s.paint_state(), before);
    }

    #[test]
    fn circles_and_quads_become_filled_cubics() {
        let mut s = PdfSurface::new(100.0, 100.0);
        s.set_fill_alpha(0.02);
        s.circle(Point::new(50.0, 50.0), 2.0);
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.quad_to((5.0, 10.0), (10.0, 0.0));
        path.close_path();
        s.fill_path(&path);

        let ops = decoded_operators(&s.to_bytes().unwrap());
        let count = |op: &str| ops.iter().filter(|o| o.operator == op).count();
        assert_eq!(count("f"), 2);
        assert_eq!(count("m"), 2);
        assert!(count("c") >= 5);
        assert_eq!(count("h"), 2);

        // The raised quad keeps its endpoint.
        let last_curve = ops.iter().filter(|o| o.operator == "c").last().unwrap();
        let end: Vec<f32> = last_curve.operands[4..]
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect();
        assert_eq!(end, vec![10.0, 0.0]);
    }

    #[test]
    fn concat_writes_affine_coefficients() {
        let mut s = PdfSurface::new(100.0, 100.0);
        s.translate(3.0, 4.0);
        let ops = decoded_operators(&s.to_bytes().unwrap());
        let cm = ops.iter().find(|o| o.operator == "cm").unwrap();
        let coeffs: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(coeffs, vec![1.0, 0.0, 0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "unbalanced save_state")]
    fn finishing_with_open_save_panics() {
        let mut s = PdfSurface::new(100.0, 100.0);
        s.save_state();
        let _ = s.into_document();
    }
}
