//! Output element types — one design node per detected region.
//!
//! Text-only attributes live on `TextElement`, so a rectangle can never
//! carry them.

use crate::geometry::AbsoluteBox;
use serde::Serialize;

/// Solid color, each channel in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);
    pub const LIGHT_GRAY: Rgba = Rgba::opaque(0.9, 0.9, 0.9);

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `#rrggbb`, alpha ignored.
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl HorizontalAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlign::Left => "LEFT",
            HorizontalAlign::Center => "CENTER",
            HorizontalAlign::Right => "RIGHT",
        }
    }
}

impl VerticalAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "TOP",
            VerticalAlign::Center => "CENTER",
            VerticalAlign::Bottom => "BOTTOM",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleElement {
    pub geometry: AbsoluteBox,
    pub fill: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub geometry: AbsoluteBox,
    pub fill: Rgba,
    pub content: String,
    /// Derived from box height, not a measured glyph size.
    pub font_size: f64,
    pub font_family: String,
    pub align_horizontal: HorizontalAlign,
    pub align_vertical: VerticalAlign,
}

/// A synthesized design element.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputElement {
    Rectangle(RectangleElement),
    Text(TextElement),
}

impl OutputElement {
    /// Stable node type string (`TEXT` / `RECTANGLE`).
    pub fn element_type(&self) -> &'static str {
        match self {
            OutputElement::Rectangle(_) => "RECTANGLE",
            OutputElement::Text(_) => "TEXT",
        }
    }

    pub fn geometry(&self) -> &AbsoluteBox {
        match self {
            OutputElement::Rectangle(r) => &r.geometry,
            OutputElement::Text(t) => &t.geometry,
        }
    }

    pub fn fill(&self) -> &Rgba {
        match self {
            OutputElement::Rectangle(r) => &r.fill,
            OutputElement::Text(t) => &t.fill,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            OutputElement::Text(t) => Some(t),
            OutputElement::Rectangle(_) => None,
        }
    }
}
