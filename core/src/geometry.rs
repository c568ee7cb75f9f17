//! Procedural shape primitives shared by the distortion effects.

use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use kurbo::{BezPath, Point, Vec2};

use crate::rng::StreamRng;

/// Parameters of an irregular blob: `points` vertices at evenly spaced
/// angles, each at `size × U[jitter]` from the center.
#[derive(Debug, Clone)]
pub struct BlobSpec {
    pub center: Point,
    pub size: f64,
    pub points: RangeInclusive<usize>,
    pub jitter: (f64, f64),
}

/// Even angles, random radii. The stain and ink-bleed outlines both
/// come from here.
pub fn irregular_blob(rng: &mut StreamRng, blob: &BlobSpec) -> Vec<Point> {
    let n = rng.count_between(*blob.points.start(), *blob.points.end());
    (0..n)
        .map(|i| {
            let angle = (i as f64 / n as f64) * TAU;
            let r = rng.uniform(blob.jitter.0, blob.jitter.1) * blob.size;
            blob.center + Vec2::from_angle(angle) * r
        })
        .collect()
}

/// Closed outline through `points` using a cubic whose two control
/// points both sit at the midpoint of each consecutive pair.
pub fn smooth_closed_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for pair in points.windows(2) {
        let mid = pair[0].midpoint(pair[1]);
        path.curve_to(mid, mid, pair[1]);
    }
    path.close_path();
    path
}

/// Straight-edged closed outline through `points`.
pub fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    path
}
