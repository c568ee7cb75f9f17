//! Per-invoice visual variety: text style and a procedural logo.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::polygon_path,
    rng::StreamRng,
    surface::{FontFamily, Rgb, Surface},
};

pub const BASE_FONT_SIZES: [f64; 4] = [9.0, 10.0, 11.0, 12.0];
pub const LOGO_SIZE: f64 = 30.0;
const ACCENT_OFFSET: f64 = 0.3;
const ABSTRACT_LINES: usize = 5;

const LOGO_HUES: [Rgb; 5] = [
    Rgb::new(0.1, 0.3, 0.5), // blue
    Rgb::new(0.5, 0.1, 0.1), // red
    Rgb::new(0.1, 0.5, 0.2), // green
    Rgb::new(0.4, 0.2, 0.5), // purple
    Rgb::new(0.5, 0.3, 0.1), // orange
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    Black,
    DarkGrey,
    DarkRed,
    DarkGreen,
}

impl TextColor {
    pub const ALL: [TextColor; 4] = [
        TextColor::Black,
        TextColor::DarkGrey,
        TextColor::DarkRed,
        TextColor::DarkGreen,
    ];

    pub fn rgb(&self) -> Rgb {
        match self {
            Self::Black => Rgb::BLACK,
            Self::DarkGrey => Rgb::gray(0.2),
            Self::DarkRed => Rgb::new(0.6, 0.0, 0.0),
            Self::DarkGreen => Rgb::new(0.0, 0.4, 0.0),
        }
    }
}

/// Held fixed for a whole page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub font: FontFamily,
    pub color: TextColor,
    pub base_size: f64,
    pub header_size: f64,
    pub small_size: f64,
}

pub fn pick_style(rng: &mut StreamRng) -> Style {
    let base_size = *rng.pick(&BASE_FONT_SIZES);
    let font = *rng.pick(&FontFamily::ALL);
    let color = *rng.pick(&TextColor::ALL);
    Style {
        font,
        color,
        base_size,
        header_size: base_size + 2.0,
        small_size: base_size - 2.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoKind {
    Geometric,
    Abstract,
    Initials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Main,
    Accent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogoShape {
    Circle { center: Point, radius: f64, tone: Tone },
    Polygon { points: Vec<Point>, tone: Tone },
    Rect { origin: Point, width: f64, height: f64, tone: Tone },
    Line { from: Point, to: Point, width: f64, tone: Tone },
}

/// A logo in its own `size × size` box, origin bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub kind: LogoKind,
    pub main: Rgb,
    pub accent: Rgb,
    pub shapes: Vec<LogoShape>,
}

impl Logo {
    fn color(&self, tone: Tone) -> Rgb {
        match tone {
            Tone::Main => self.main,
            Tone::Accent => self.accent,
        }
    }
}

pub fn pick_logo(rng: &mut StreamRng) -> Logo {
    pick_logo_sized(rng, LOGO_SIZE, LOGO_SIZE)
}

fn pick_logo_sized(rng: &mut StreamRng, width: f64, height: f64) -> Logo {
    let kind = *rng.pick(&[LogoKind::Geometric, LogoKind::Abstract, LogoKind::Initials]);
    let main = *rng.pick(&LOGO_HUES);
    let accent = main.lighten(ACCENT_OFFSET);

    let shapes = match kind {
        LogoKind::Geometric => vec![
            LogoShape::Circle {
                center: Point::new(width / 2.0, height / 2.0),
                radius: width / 2.5,
                tone: Tone::Main,
            },
            LogoShape::Polygon {
                points: vec![
                    Point::new(width / 2.0, height),
                    Point::new(0.0, height / 3.0),
                    Point::new(width / 2.0, 0.0),
                    Point::new(width, height / 3.0),
                ],
                tone: Tone::Accent,
            },
        ],
        LogoKind::Abstract => {
            let mut shapes = vec![LogoShape::Rect {
                origin: Point::new(0.0, 0.0),
                width,
                height,
                tone: Tone::Main,
            }];
            let (w, h) = (width as i64, height as i64);
            for _ in 0..ABSTRACT_LINES {
                let from = Point::new(rng.range_inclusive(0, w) as f64, rng.range_inclusive(0, h) as f64);
                let to = Point::new(rng.range_inclusive(0, w) as f64, rng.range_inclusive(0, h) as f64);
                shapes.push(LogoShape::Line {
                    from,
                    to,
                    width: 2.0,
                    tone: Tone::Accent,
                });
            }
            shapes
        }
        LogoKind::Initials => vec![
            LogoShape::Circle {
                center: Point::new(width / 2.0, height / 2.0),
                radius: width / 2.0,
                tone: Tone::Main,
            },
            LogoShape::Rect {
                origin: Point::new(width / 3.0, height / 4.0),
                width: width / 6.0,
                height: height / 2.0,
                tone: Tone::Accent,
            },
            LogoShape::Rect {
                origin: Point::new(width / 4.0, height / 2.2),
                width: width / 2.0,
                height: height / 6.0,
                tone: Tone::Accent,
            },
        ],
    };

    Logo {
        kind,
        main,
        accent,
        shapes,
    }
}

/// Draw `logo` with its box's lower-left corner at `origin`.
pub fn draw_logo(surface: &mut dyn Surface, logo: &Logo, origin: Point) {
    surface.save_state();
    surface.translate(origin.x, origin.y);
    for shape in &logo.shapes {
        match shape {
            LogoShape::Circle { center, radius, tone } => {
                surface.set_fill_color(logo.color(*tone));
                surface.circle(*center, *radius);
            }
            LogoShape::Polygon { points, tone } => {
                surface.set_fill_color(logo.color(*tone));
                surface.fill_path(&polygon_path(points));
            }
            LogoShape::Rect { origin, width, height, tone } => {
                surface.set_fill_color(logo.color(*tone));
                surface.rect(*origin, *width, *height);
            }
            LogoShape::Line { from, to, width, tone } => {
                surface.set_stroke_color(logo.color(*tone));
                surface.set_line_width(*width);
                surface.line(*from, *to);
            }
        }
    }
    surface.restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn style_sizes_derive_from_base() {
        let mut rng = StreamRng::from_seed(60);
        for _ in 0..100 {
            let style = pick_style(&mut rng);
            assert!(BASE_FONT_SIZES.contains(&style.base_size));
            assert_eq!(style.header_size, style.base_size + 2.0);
            assert_eq!(style.small_size, style.base_size - 2.0);
        }
    }

    #[test]
    fn every_font_and_color_gets_picked() {
        let mut rng = StreamRng::from_seed(61);
        let styles: Vec<Style> = (0..500).map(|_| pick_style(&mut rng)).collect();
        for font in FontFamily::ALL {
            assert!(styles.iter().any(|s| s.font == font), "{font:?} never picked");
        }
        for color in TextColor::ALL {
            assert!(styles.iter().any(|s| s.color == color), "{color:?} never picked");
        }
    }

    #[test]
    fn logos_have_at_least_two_shapes_and_lighter_accent() {
        let mut rng = StreamRng::from_seed(62);
        let mut kinds = Vec::new();
        for _ in 0..200 {
            let logo = pick_logo(&mut rng);
            assert!(logo.shapes.len() >= 2);
            assert!(LOGO_HUES.contains(&logo.main));
            assert!(logo.accent.r >= logo.main.r && logo.accent.r <= 1.0);
            assert!((logo.accent.g - (logo.main.g + 0.3).min(1.0)).abs() < 1e-12);
            if !kinds.contains(&logo.kind) {
                kinds.push(logo.kind);
            }
        }
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn drawing_a_logo_restores_state() {
        let mut rng = StreamRng::from_seed(63);
        let mut s = RecordingSurface::new(612.0, 792.0);
        let before = s.paint_state();
        for _ in 0..10 {
            let logo = pick_logo(&mut rng);
            draw_logo(&mut s, &logo, Point::new(56.0, 700.0));
        }
        assert_eq!(s.paint_state(), before);
        assert!(s.mark_count() >= 20);
    }
}
