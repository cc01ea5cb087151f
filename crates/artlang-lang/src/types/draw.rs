use crate::types::mat::{M3, m3_identity};

// ─── Color ────────────────────────────────────────────────────────────────────

/// RGB channels in 0..=255, alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 255.0, g: 255.0, b: 255.0, a: 1.0 };

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) },
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn gray(v: f64) -> Self {
        Self::rgb(v, v, v)
    }

    /// 8-bit channels with alpha scaled to 0..=255.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }
}

fn clamp_channel(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
}

// ─── Style ────────────────────────────────────────────────────────────────────

/// Paint state snapshotted into every shape. `None` disables that paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_weight: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: Some(Color::BLACK), stroke: Some(Color::BLACK), stroke_weight: 1.0 }
    }
}

// ─── Shape description ────────────────────────────────────────────────────────

/// Semantic shape in user space. The renderer applies the transform and
/// tessellates at draw time.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDesc {
    /// Top-left corner plus size.
    Rect { x: f64, y: f64, w: f64, h: f64 },
    /// Center plus full diameters.
    Ellipse { center: (f64, f64), size: (f64, f64) },
    Line { from: (f64, f64), to: (f64, f64) },
    Point((f64, f64)),
    Triangle([(f64, f64); 3]),
    Quad([(f64, f64); 4]),
    /// Open arc outline from `start` to `stop` radians, stroked only.
    Arc { center: (f64, f64), size: (f64, f64), start: f64, stop: f64 },
    /// `at` is the left end of the text, `size` in pixels.
    Text { text: String, at: (f64, f64), size: f64, baseline: TextBaseline },
}

/// Which part of the text `at.1` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
}

impl ShapeDesc {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rect { .. }    => "rect",
            Self::Ellipse { .. } => "ellipse",
            Self::Line { .. }    => "line",
            Self::Point(_)       => "point",
            Self::Triangle(_)    => "triangle",
            Self::Quad(_)        => "quad",
            Self::Arc { .. }     => "arc",
            Self::Text { .. }    => "text",
        }
    }
}

// ─── Shape data ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    pub desc: ShapeDesc,
    pub style: Style,
    /// User space to canvas pixels.
    pub transform: M3,
}

impl ShapeData {
    pub fn new(desc: ShapeDesc, style: Style) -> Self {
        Self { desc, style, transform: m3_identity() }
    }

    pub fn with_transform(mut self, transform: M3) -> Self {
        self.transform = transform;
        self
    }
}

// ─── Draw command ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole `width` x `height` surface with `color`.
    Clear { width: f64, height: f64, color: Color },
    Shape(ShapeData),
}
