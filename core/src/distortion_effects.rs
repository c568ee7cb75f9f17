//! Individual page degradation effects.
//!
//! Each effect draws straight onto the page with low opacity (mostly
//! 0.01 to 0.1) and brackets its work in save/restore. Parameters are
//! drawn fresh on every call and returned only as a summary for the run
//! manifest.

use std::f64::consts::TAU;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{irregular_blob, smooth_closed_path, BlobSpec},
    rng::StreamRng,
    surface::{Rgb, Surface},
};

/// Near-white paper fibres.
const PAPER_COLORS: [(u8, u8, u8); 3] = [(250, 250, 250), (245, 245, 240), (248, 248, 245)];
const PAPER_ALPHA: f64 = 0.02;

/// Brown/tan shades with their fixed alpha out of 255.
const COFFEE_COLORS: [(u8, u8, u8, u8); 4] = [
    (139, 69, 19, 30),
    (160, 82, 45, 25),
    (101, 67, 33, 20),
    (210, 180, 140, 15),
];
const SPLATTER_ALPHA_FACTOR: f64 = 0.7;

/// Near-black inks.
const INK_COLORS: [(u8, u8, u8); 3] = [(5, 5, 5), (20, 20, 40), (30, 10, 10)];
const INK_PASSES: usize = 3;

const CREASE_GRAY: f64 = 0.8;
const PRINTER_GRAY: f64 = 0.2;
const PRINTER_FADE_ALPHA: f64 = 0.03;

pub const SKEW_MIN_DEGREES: f64 = 0.1;
pub const SKEW_MAX_DEGREES: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// What one effect invocation did, for the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum AppliedEffect {
    PaperTexture { spots: usize },
    FoldCrease { orientation: Orientation, position: f64, shadow_lines: usize },
    CoffeeStain { center: Point, size: f64, points: usize, splatters: usize },
    PrinterLines { streaks: usize },
    InkBleed { center: Point, size: f64, points: usize },
}

impl AppliedEffect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaperTexture { .. } => "paper_texture",
            Self::FoldCrease { .. } => "fold_crease",
            Self::CoffeeStain { .. } => "coffee_stain",
            Self::PrinterLines { .. } => "printer_lines",
            Self::InkBleed { .. } => "ink_bleed",
        }
    }
}

/// Page sizes below one point are a caller bug, not something to clamp.
pub(crate) fn check_page(width: f64, height: f64) {
    assert!(
        width >= 1.0 && height >= 1.0,
        "page must be at least 1x1, got {width}x{height}"
    );
}

fn rgb(c: (u8, u8, u8)) -> Rgb {
    Rgb::from_u8(c.0, c.1, c.2)
}

/// Uniform integer coordinate in [lo, hi] of a truncated page size.
fn int_coord(rng: &mut StreamRng, lo: i64, hi: i64) -> f64 {
    rng.range_inclusive(lo, hi) as f64
}

pub fn apply_paper_texture(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    rng: &mut StreamRng,
) -> AppliedEffect {
    check_page(width, height);
    let (w, h) = (width as i64, height as i64);
    let spots = rng.count_between(1000, 2000);

    surface.save_state();
    surface.set_fill_alpha(PAPER_ALPHA);
    for _ in 0..spots {
        let x = int_coord(rng, 0, w);
        let y = int_coord(rng, 0, h);
        let radius = rng.uniform(0.2, 0.8);
        surface.set_fill_color(rgb(*rng.pick(&PAPER_COLORS)));
        surface.circle(Point::new(x, y), radius);
    }
    surface.restore_state();

    AppliedEffect::PaperTexture { spots }
}

pub fn apply_fold_crease(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    rng: &mut StreamRng,
) -> AppliedEffect {
    check_page(width, height);
    let orientation = if rng.chance(0.5) {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    let extent = match orientation {
        Orientation::Horizontal => height,
        Orientation::Vertical => width,
    };
    let position = extent * rng.uniform(0.3, 0.7);

    let crease = |offset: f64| match orientation {
        Orientation::Horizontal => (
            Point::new(0.0, position + offset),
            Point::new(width, position + offset),
        ),
        Orientation::Vertical => (
            Point::new(position + offset, 0.0),
            Point::new(position + offset, height),
        ),
    };

    surface.save_state();
    surface.set_stroke_color(Rgb::gray(CREASE_GRAY));
    surface.set_stroke_alpha(0.1);
    surface.set_line_width(0.5);
    let (from, to) = crease(0.0);
    surface.line(from, to);

    // Shadow lines fade with distance from the fold.
    let shadow_lines = rng.count_between(3, 5);
    for _ in 0..shadow_lines {
        let offset = rng.uniform(-2.0, 2.0);
        surface.set_stroke_alpha(0.05 - offset.abs() * 0.01);
        let (from, to) = crease(offset);
        surface.line(from, to);
    }
    surface.restore_state();

    AppliedEffect::FoldCrease {
        orientation,
        position,
        shadow_lines,
    }
}

pub fn apply_coffee_stain(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    rng: &mut StreamRng,
) -> AppliedEffect {
    check_page(width, height);
    let (w, h) = (width as i64, height as i64);
    let center = Point::new(int_coord(rng, w / 4, 3 * w / 4), int_coord(rng, h / 4, 3 * h / 4));
    let size = rng.range_inclusive(30, 50) as f64;

    let outline = irregular_blob(
        rng,
        &BlobSpec {
            center,
            size,
            points: 12..=16,
            jitter: (0.7, 1.3),
        },
    );
    let path = smooth_closed_path(&outline);

    surface.save_state();
    for (r, g, b, a) in COFFEE_COLORS {
        surface.set_fill_color(rgb((r, g, b)));
        surface.set_fill_alpha(a as f64 / 255.0);
        surface.fill_path(&path);
    }

    let splatters = rng.count_between(5, 8);
    for _ in 0..splatters {
        let angle = rng.uniform(0.0, TAU);
        let distance = rng.uniform(size * 0.8, size * 1.5);
        let radius = rng.uniform(2.0, 5.0);
        let (r, g, b, a) = *rng.pick(&COFFEE_COLORS);
        surface.set_fill_color(rgb((r, g, b)));
        surface.set_fill_alpha(a as f64 / 255.0 * SPLATTER_ALPHA_FACTOR);
        surface.circle(center + Vec2::from_angle(angle) * distance, radius);
    }
    surface.restore_state();

    AppliedEffect::CoffeeStain {
        center,
        size,
        points: outline.len(),
        splatters,
    }
}

pub fn apply_printer_lines(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    rng: &mut StreamRng,
) -> AppliedEffect {
    check_page(width, height);
    let (w, h) = (width.trunc(), height.trunc());
    let streaks = rng.count_between(1, 2);
    let section_width = w / streaks as f64;

    surface.save_state();
    surface.set_stroke_color(Rgb::gray(PRINTER_GRAY));
    for i in 0..streaks {
        let x = i as f64 * section_width + rng.uniform(0.0, section_width / 2.0);
        surface.set_line_width(rng.uniform(0.3, 0.8));
        surface.set_stroke_alpha(rng.uniform(0.05, 0.1));

        // Mechanical waviness: each segment leans by a small jitter.
        let segments = rng.count_between(10, 15);
        let segment_height = h / segments as f64;
        for j in 0..segments {
            let y1 = j as f64 * segment_height;
            let y2 = (j + 1) as f64 * segment_height;
            let offset = rng.uniform(-0.5, 0.5);
            surface.line(Point::new(x + offset, y1), Point::new(x - offset, y2));
        }

        // Print head fading in and out.
        surface.set_stroke_alpha(PRINTER_FADE_ALPHA);
        surface.line(Point::new(x, 0.0), Point::new(x, h / 10.0));
        surface.line(Point::new(x, h * 0.9), Point::new(x, h));
    }
    surface.restore_state();

    AppliedEffect::PrinterLines { streaks }
}

/// A small ink blot centered at `center`. `size` is the base radius.
pub fn apply_ink_bleeding(
    surface: &mut dyn Surface,
    center: Point,
    size: f64,
    rng: &mut StreamRng,
) -> AppliedEffect {
    let outline = irregular_blob(
        rng,
        &BlobSpec {
            center,
            size,
            points: 8..=12,
            jitter: (0.7, 1.3),
        },
    );
    let path = smooth_closed_path(&outline);

    surface.save_state();
    for _ in 0..INK_PASSES {
        surface.set_fill_color(rgb(*rng.pick(&INK_COLORS)));
        surface.set_fill_alpha(rng.uniform(0.01, 0.03));
        surface.fill_path(&path);
    }
    surface.restore_state();

    AppliedEffect::InkBleed {
        center,
        size,
        points: outline.len(),
    }
}

/// Signed whole-page rotation in degrees, magnitude in [0.1, 0.8].
/// Callers rotate about the page center, never the corner.
pub fn page_skew(rng: &mut StreamRng) -> f64 {
    let direction = rng.sign();
    direction * rng.uniform(SKEW_MIN_DEGREES, SKEW_MAX_DEGREES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn paper_texture_spot_count_and_alpha() {
        let mut s = RecordingSurface::new(612.0, 792.0);
        let mut rng = StreamRng::from_seed(40);
        let AppliedEffect::PaperTexture { spots } = apply_paper_texture(&mut s, 612.0, 792.0, &mut rng)
        else {
            panic!("wrong effect");
        };
        assert!((1000..=2000).contains(&spots));
        let circles: Vec<_> = s
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle { center, radius } => Some((*center, *radius)),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), spots);
        for (c, r) in circles {
            assert!((0.2..0.8).contains(&r));
            assert!((0.0..=612.0).contains(&c.x) && (0.0..=792.0).contains(&c.y));
        }
        assert!(s.commands().contains(&DrawCommand::FillAlpha(PAPER_ALPHA)));
    }

    #[test]
    fn crease_shadow_alpha_falls_with_offset() {
        let mut rng = StreamRng::from_seed(41);
        for _ in 0..50 {
            let mut s = RecordingSurface::new(612.0, 792.0);
            apply_fold_crease(&mut s, 612.0, 792.0, &mut rng);
            let alphas: Vec<f64> = s
                .commands()
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::StrokeAlpha(a) => Some(*a),
                    _ => None,
                })
                .collect();
            assert_eq!(alphas[0], 0.1);
            assert!((4..=6).contains(&alphas.len()));
            for a in &alphas[1..] {
                assert!(*a >= 0.03 - 1e-12 && *a <= 0.05, "shadow alpha {a}");
            }
        }
    }

    #[test]
    fn crease_position_in_middle_band() {
        let mut rng = StreamRng::from_seed(42);
        for _ in 0..100 {
            let mut s = RecordingSurface::new(600.0, 800.0);
            match apply_fold_crease(&mut s, 600.0, 800.0, &mut rng) {
                AppliedEffect::FoldCrease { orientation, position, .. } => {
                    let extent = match orientation {
                        Orientation::Horizontal => 800.0,
                        Orientation::Vertical => 600.0,
                    };
                    assert!(position >= 0.3 * extent && position < 0.7 * extent);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn coffee_stain_draws_four_layers_then_splatters() {
        let mut s = RecordingSurface::new(612.0, 792.0);
        let mut rng = StreamRng::from_seed(43);
        let effect = apply_coffee_stain(&mut s, 612.0, 792.0, &mut rng);
        let AppliedEffect::CoffeeStain { center, size, points, splatters } = effect else {
            panic!("wrong effect");
        };
        assert!((153.0..=459.0).contains(&center.x));
        assert!((198.0..=594.0).contains(&center.y));
        assert!((30.0..=50.0).contains(&size));
        assert!((12..=16).contains(&points));
        assert!((5..=8).contains(&splatters));

        let paths = s
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath(_)))
            .count();
        assert_eq!(paths, 4);

        for c in s.commands() {
            if let DrawCommand::Circle { center: p, .. } = c {
                let d = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
                assert!(d >= 0.8 * size - 1e-9 && d <= 1.5 * size + 1e-9);
            }
        }
    }

    #[test]
    fn printer_line_alphas_in_band() {
        let mut rng = StreamRng::from_seed(44);
        let mut s = RecordingSurface::new(612.0, 792.0);
        apply_printer_lines(&mut s, 612.0, 792.0, &mut rng);
        for c in s.commands() {
            if let DrawCommand::StrokeAlpha(a) = c {
                assert!(*a == PRINTER_FADE_ALPHA || (0.05..0.1).contains(a), "alpha {a}");
            }
            if let DrawCommand::Line { from, to } = c {
                assert!((from.x - to.x).abs() <= 1.0, "streak leans too far");
            }
        }
    }

    #[test]
    fn ink_bleed_layers_are_faint() {
        let mut rng = StreamRng::from_seed(45);
        let mut s = RecordingSurface::new(100.0, 100.0);
        apply_ink_bleeding(&mut s, Point::new(50.0, 50.0), 2.0, &mut rng);
        let alphas: Vec<f64> = s
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillAlpha(a) => Some(*a),
                _ => None,
            })
            .collect();
        assert_eq!(alphas.len(), INK_PASSES);
        assert!(alphas.iter().all(|a| (0.01..0.03).contains(a)));
    }

    #[test]
    fn skew_magnitude_bounded_both_signs_seen() {
        let mut rng = StreamRng::from_seed(46);
        let mut positive = false;
        let mut negative = false;
        for _ in 0..5_000 {
            let skew = page_skew(&mut rng);
            assert!((SKEW_MIN_DEGREES..=SKEW_MAX_DEGREES).contains(&skew.abs()));
            positive |= skew > 0.0;
            negative |= skew < 0.0;
        }
        assert!(positive && negative);
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn zero_sized_page_fails_fast() {
        let mut s = RecordingSurface::new(0.0, 10.0);
        apply_paper_texture(&mut s, 0.0, 10.0, &mut StreamRng::from_seed(1));
    }
}
