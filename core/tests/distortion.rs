//! Distortion gating frequencies and paint-state hygiene.

use invoice_forge_core::{
    distortion::{apply_distortions, DocumentDistorter},
    distortion_effects::{
        apply_coffee_stain, apply_fold_crease, apply_ink_bleeding, apply_paper_texture,
        apply_printer_lines, page_skew, SKEW_MAX_DEGREES, SKEW_MIN_DEGREES,
    },
    rng::StreamRng,
    surface::{FontFamily, PaintState, RecordingSurface, Rgb, StateStack, Surface},
    types::Percent,
};
use kurbo::{Affine, BezPath, Point};
use proptest::prelude::*;

/// Tracks paint state but throws marks away, for high-volume trials.
#[derive(Default)]
struct NullSurface {
    state: StateStack,
    marks: usize,
}

impl Surface for NullSurface {
    fn paint_state(&self) -> PaintState {
        *self.state.current()
    }
    fn save_state(&mut self) {
        self.state.save();
    }
    fn restore_state(&mut self) {
        self.state.restore();
    }
    fn set_fill_color(&mut self, color: Rgb) {
        self.state.current_mut().fill = color;
    }
    fn set_stroke_color(&mut self, color: Rgb) {
        self.state.current_mut().stroke = color;
    }
    fn set_fill_alpha(&mut self, alpha: f64) {
        self.state.current_mut().fill_alpha = alpha;
    }
    fn set_stroke_alpha(&mut self, alpha: f64) {
        self.state.current_mut().stroke_alpha = alpha;
    }
    fn set_line_width(&mut self, width: f64) {
        self.state.current_mut().line_width = width;
    }
    fn set_font(&mut self, font: FontFamily, size: f64) {
        self.state.current_mut().font = Some((font, size));
    }
    fn concat(&mut self, m: Affine) {
        self.state.concat(m);
    }
    fn line(&mut self, _: Point, _: Point) {
        self.marks += 1;
    }
    fn circle(&mut self, _: Point, _: f64) {
        self.marks += 1;
    }
    fn rect(&mut self, _: Point, _: f64, _: f64) {
        self.marks += 1;
    }
    fn fill_path(&mut self, _: &BezPath) {
        self.marks += 1;
    }
    fn draw_text(&mut self, _: Point, _: &str) {
        self.marks += 1;
    }
}

/// A caller state that differs from the default in every field.
fn dirty_caller_state(surface: &mut dyn Surface) {
    surface.set_fill_color(Rgb::new(0.6, 0.0, 0.0));
    surface.set_stroke_color(Rgb::new(0.0, 0.4, 0.0));
    surface.set_fill_alpha(0.5);
    surface.set_stroke_alpha(0.25);
    surface.set_line_width(3.0);
    surface.set_font(FontFamily::Courier, 11.0);
    surface.translate(5.0, 7.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn effects_restore_caller_state(w in 1u32..=1200, h in 1u32..=1600, seed in any::<u64>()) {
        let (w, h) = (w as f64, h as f64);
        let mut rng = StreamRng::from_seed(seed);
        let mut s = NullSurface::default();
        dirty_caller_state(&mut s);
        let before = s.paint_state();

        apply_paper_texture(&mut s, w, h, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        apply_fold_crease(&mut s, w, h, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        apply_coffee_stain(&mut s, w, h, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        apply_printer_lines(&mut s, w, h, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        apply_ink_bleeding(&mut s, Point::new(w / 2.0, h / 2.0), 2.0, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        apply_distortions(&mut s, w, h, &mut rng);
        prop_assert_eq!(s.paint_state(), before);
        prop_assert_eq!(s.state.depth(), 0);
    }

    #[test]
    fn skew_magnitude_is_bounded(seed in any::<u64>()) {
        let mut rng = StreamRng::from_seed(seed);
        for _ in 0..100 {
            let skew = page_skew(&mut rng);
            prop_assert!(skew.abs() >= SKEW_MIN_DEGREES && skew.abs() < SKEW_MAX_DEGREES);
        }
    }
}

#[test]
fn smallest_page_does_not_panic() {
    let mut rng = StreamRng::from_seed(9);
    let mut s = RecordingSurface::new(1.0, 1.0);
    let plan = apply_distortions(&mut s, 1.0, 1.0, &mut rng);
    assert_eq!(plan.effects[0].name(), "paper_texture");
    assert_eq!(s.save_depth(), 0);
}

#[test]
#[should_panic(expected = "at least 1x1")]
fn zero_width_page_is_a_bug() {
    let mut rng = StreamRng::from_seed(9);
    let mut s = RecordingSurface::new(0.0, 10.0);
    apply_distortions(&mut s, 0.0, 10.0, &mut rng);
}

#[test]
fn zero_dirty_rate_never_distorts() {
    let distorter = DocumentDistorter::new(Percent::ZERO);
    let mut rng = StreamRng::from_seed(10);
    let mut s = NullSurface::default();
    for _ in 0..1_000 {
        assert!(distorter.maybe_distort(&mut s, 612.0, 792.0, &mut rng).is_none());
    }
    assert_eq!(s.marks, 0);
}

#[test]
fn full_dirty_rate_effect_frequencies() {
    const TRIALS: usize = 10_000;
    let distorter = DocumentDistorter::new(Percent::FULL);
    let mut rng = StreamRng::from_seed(0x5eed);

    let (mut texture, mut crease, mut stain, mut printer) = (0, 0, 0, 0);
    for _ in 0..TRIALS {
        let mut s = NullSurface::default();
        let plan = distorter
            .maybe_distort(&mut s, 612.0, 792.0, &mut rng)
            .expect("full dirty rate always distorts");
        texture += plan.contains("paper_texture") as usize;
        crease += plan.contains("fold_crease") as usize;
        stain += plan.contains("coffee_stain") as usize;
        printer += plan.contains("printer_lines") as usize;
        assert!(plan.skew_degrees.abs() >= SKEW_MIN_DEGREES);
        assert!(plan.skew_degrees.abs() < SKEW_MAX_DEGREES);
    }

    let rate = |n: usize| n as f64 / TRIALS as f64;
    assert_eq!(texture, TRIALS);
    assert!((rate(crease) - 0.3).abs() < 0.03, "crease rate {}", rate(crease));
    assert!((rate(stain) - 0.4).abs() < 0.03, "stain rate {}", rate(stain));
    assert!((rate(printer) - 0.3).abs() < 0.03, "printer rate {}", rate(printer));
}

#[test]
fn partial_dirty_rate_gates_whole_documents() {
    let distorter = DocumentDistorter::new(Percent::new("dirty_rate", 25.0).unwrap());
    let mut rng = StreamRng::from_seed(11);
    let dirty = (0..4_000)
        .filter(|_| {
            let mut s = NullSurface::default();
            distorter.maybe_distort(&mut s, 612.0, 792.0, &mut rng).is_some()
        })
        .count();
    let rate = dirty as f64 / 4_000.0;
    assert!((rate - 0.25).abs() < 0.04, "dirty rate {rate}");
}
