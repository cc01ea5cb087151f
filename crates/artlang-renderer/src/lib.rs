//! Turns engine draw commands into screen-space primitives.
//!
//! Shapes arrive in user space with the transform that was current when they
//! were drawn. Everything here bakes that transform into pixel coordinates so
//! a backend only has to fill polygons, stroke polylines and place text.

use artlang_lang::types::mat::{M3, m3_apply, m3_linear_scale};
use artlang_lang::{Color, DrawCommand, ShapeData, ShapeDesc, Style, TextBaseline};

/// Vertices used for a full ellipse.
pub const ELLIPSE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Closed outline, filled and/or stroked.
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Open path, stroked only.
    Polyline { points: Vec<(f64, f64)>, stroke: Stroke },
    Text {
        text: String,
        /// Left end of the baseline (or of the middle line, see `baseline`).
        pos: (f64, f64),
        size: f64,
        /// Clockwise rotation in radians.
        angle: f64,
        baseline: TextBaseline,
        color: Color,
    },
}

/// Tessellates one shape. Commands that paint nothing yield an empty list.
pub fn tessellate(data: &ShapeData) -> Vec<Primitive> {
    let m = &data.transform;
    let fill = data.style.fill;
    let stroke = screen_stroke(&data.style, m);

    let polygon = |points: Vec<(f64, f64)>| {
        if fill.is_none() && stroke.is_none() {
            return vec![];
        }
        vec![Primitive::Polygon { points, fill, stroke }]
    };

    match &data.desc {
        ShapeDesc::Rect { x, y, w, h } => polygon(apply_all(m, &[
            (*x, *y),
            (x + w, *y),
            (x + w, y + h),
            (*x, y + h),
        ])),
        ShapeDesc::Triangle(pts) => polygon(apply_all(m, pts)),
        ShapeDesc::Quad(pts) => polygon(apply_all(m, pts)),
        ShapeDesc::Ellipse { center, size } => {
            let pts = arc_points(*center, *size, 0.0, std::f64::consts::TAU, ELLIPSE_SEGMENTS, false);
            polygon(apply_all(m, &pts))
        }
        ShapeDesc::Line { from, to } => match stroke {
            Some(stroke) => vec![Primitive::Polyline { points: apply_all(m, &[*from, *to]), stroke }],
            None => vec![],
        },
        ShapeDesc::Arc { center, size, start, stop } => {
            let Some(stroke) = stroke else { return vec![] };
            let sweep = stop - start;
            if !(sweep.is_finite() && sweep > 0.0) {
                return vec![];
            }
            // more than one turn retraces the same outline
            let sweep = sweep.min(std::f64::consts::TAU);
            let segments = ((sweep / std::f64::consts::TAU) * ELLIPSE_SEGMENTS as f64).ceil().max(1.0) as usize;
            let pts = arc_points(*center, *size, *start, start + sweep, segments, true);
            vec![Primitive::Polyline { points: apply_all(m, &pts), stroke }]
        }
        // a point is a dot of the stroke color, as wide as the stroke
        ShapeDesc::Point(p) => match stroke {
            Some(stroke) => {
                let c = m3_apply(m, *p);
                let d = stroke.width.max(1.0);
                let points = arc_points(c, (d, d), 0.0, std::f64::consts::TAU, 16, false);
                vec![Primitive::Polygon { points, fill: Some(stroke.color), stroke: None }]
            }
            None => vec![],
        },
        ShapeDesc::Text { text, at, size, baseline } => match fill {
            Some(color) => vec![Primitive::Text {
                text: text.clone(),
                pos: m3_apply(m, *at),
                size: size * m3_linear_scale(m),
                angle: m[3].atan2(m[0]),
                baseline: *baseline,
                color,
            }],
            None => vec![],
        },
    }
}

fn screen_stroke(style: &Style, m: &M3) -> Option<Stroke> {
    let color = style.stroke?;
    let width = style.stroke_weight * m3_linear_scale(m);
    (width > 0.0).then_some(Stroke { width, color })
}

fn apply_all(m: &M3, pts: &[(f64, f64)]) -> Vec<(f64, f64)> {
    pts.iter().map(|p| m3_apply(m, *p)).collect()
}

/// Points on the ellipse with diameters `size` from `start` to `stop`
/// radians. `inclusive` adds the end point, for open arcs.
fn arc_points(
    center: (f64, f64),
    size: (f64, f64),
    start: f64,
    stop: f64,
    segments: usize,
    inclusive: bool,
) -> Vec<(f64, f64)> {
    let (rx, ry) = (size.0 / 2.0, size.1 / 2.0);
    let count = if inclusive { segments + 1 } else { segments };
    (0..count)
        .map(|i| {
            let t = start + (stop - start) * i as f64 / segments as f64;
            (center.0 + rx * t.cos(), center.1 + ry * t.sin())
        })
        .collect()
}

// ─── Scene ────────────────────────────────────────────────────────────────────

/// What is currently on the canvas.
///
/// Drawing accumulates until a `Clear`, which covers the whole surface, so
/// everything before it is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, background: Color::WHITE, primitives: Vec::new() }
    }

    pub fn apply(&mut self, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Clear { width, height, color } => {
                self.width = *width;
                self.height = *height;
                self.background = *color;
                self.primitives.clear();
            }
            DrawCommand::Shape(data) => self.primitives.extend(tessellate(data)),
        }
    }

    pub fn extend<'a>(&mut self, cmds: impl IntoIterator<Item = &'a DrawCommand>) {
        for cmd in cmds {
            self.apply(cmd);
        }
    }

    /// Blank canvas of a new size.
    pub fn resize(&mut self, width: f64, height: f64) {
        *self = Self::new(width, height);
    }
}
