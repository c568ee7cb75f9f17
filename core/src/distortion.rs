//! Distortion orchestration.
//!
//! Two levels of gating, never collapsed into one probability:
//!   1. Document gate: a page is distorted at all with p = dirty_rate/100.
//!   2. Effect gates inside a distorted page, each an independent trial:
//!        paper texture   always, first (base layer)
//!        fold crease     0.30
//!        coffee stain    0.40
//!        printer lines   0.30
//!        ink bleeds      always, 2–4 spots
//!
//! A distorted page always gets the full stack; there is no partial
//! intensity.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::{
    distortion_effects::{
        apply_coffee_stain, apply_fold_crease, apply_ink_bleeding, apply_paper_texture,
        apply_printer_lines, check_page, page_skew, AppliedEffect,
    },
    rng::StreamRng,
    surface::Surface,
    types::Percent,
};

pub const FOLD_CREASE_PROBABILITY: f64 = 0.3;
pub const COFFEE_STAIN_PROBABILITY: f64 = 0.4;
pub const PRINTER_LINES_PROBABILITY: f64 = 0.3;

/// Everything applied to one page, in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionPlan {
    pub effects: Vec<AppliedEffect>,
    /// Signed rotation of the whole page, degrees.
    pub skew_degrees: f64,
}

impl DistortionPlan {
    pub fn contains(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name() == name)
    }
}

/// Draw the randomized effect stack as a background layer.
///
/// Wrapped in its own save/restore; paint state on return equals paint
/// state on entry. The returned plan carries a zero skew; page rotation
/// is [`DocumentDistorter::distort_page`]'s job.
pub fn apply_distortions(
    surface: &mut dyn Surface,
    width: f64,
    height: f64,
    rng: &mut StreamRng,
) -> DistortionPlan {
    check_page(width, height);
    let (w, h) = (width.trunc(), height.trunc());
    let mut effects = Vec::with_capacity(8);

    surface.save_state();

    effects.push(apply_paper_texture(surface, w, h, rng));

    if rng.chance(FOLD_CREASE_PROBABILITY) {
        effects.push(apply_fold_crease(surface, w, h, rng));
    }
    if rng.chance(COFFEE_STAIN_PROBABILITY) {
        effects.push(apply_coffee_stain(surface, w, h, rng));
    }
    if rng.chance(PRINTER_LINES_PROBABILITY) {
        effects.push(apply_printer_lines(surface, w, h, rng));
    }

    let bleeds = rng.count_between(2, 4);
    for _ in 0..bleeds {
        let center = Point::new(
            rng.range_inclusive(0, w as i64) as f64,
            rng.range_inclusive(0, h as i64) as f64,
        );
        let size = rng.uniform(1.0, 3.0);
        effects.push(apply_ink_bleeding(surface, center, size, rng));
    }

    surface.restore_state();

    log::debug!(
        "distortion: applied [{}]",
        effects.iter().map(AppliedEffect::name).collect::<Vec<_>>().join(", ")
    );

    DistortionPlan {
        effects,
        skew_degrees: 0.0,
    }
}

/// Per-document gate around [`apply_distortions`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentDistorter {
    dirty_rate: Percent,
}

impl DocumentDistorter {
    pub fn new(dirty_rate: Percent) -> Self {
        Self { dirty_rate }
    }

    /// Coin flip for the whole document. A zero rate never draws.
    pub fn should_distort(&self, rng: &mut StreamRng) -> bool {
        !self.dirty_rate.is_zero() && rng.chance(self.dirty_rate.probability())
    }

    /// Skew the page frame about its center, then paint the background
    /// stack inside that frame, so stains and creases tilt together with
    /// the content drawn afterwards. The rotation stays in effect on
    /// return; callers that want it scoped wrap this in save/restore.
    pub fn distort_page(
        &self,
        surface: &mut dyn Surface,
        width: f64,
        height: f64,
        rng: &mut StreamRng,
    ) -> DistortionPlan {
        check_page(width, height);
        let skew_degrees = page_skew(rng);
        surface.rotate_about(Point::new(width / 2.0, height / 2.0), skew_degrees);

        surface.save_state();
        let mut plan = apply_distortions(surface, width, height, rng);
        surface.restore_state();

        plan.skew_degrees = skew_degrees;
        plan
    }

    /// Gate, then distort. `None` means the page stays clean.
    pub fn maybe_distort(
        &self,
        surface: &mut dyn Surface,
        width: f64,
        height: f64,
        rng: &mut StreamRng,
    ) -> Option<DistortionPlan> {
        if self.should_distort(rng) {
            Some(self.distort_page(surface, width, height, rng))
        } else {
            None
        }
    }
}
