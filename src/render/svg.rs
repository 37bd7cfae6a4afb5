//! SVG serializer.
//!
//! Rectangles keep their geometry as-is. Text is anchored with its
//! baseline on the bottom edge of the detected box.

use super::{escape_xml, format_number};
use crate::geometry::Canvas;
use crate::synth::{OutputElement, RectangleElement, TextElement};
use std::fmt::Write;

const RECT_STROKE: &str = "#999999";
const RECT_STROKE_WIDTH: &str = "1";

/// Render elements as a standalone SVG document, in sequence order.
pub fn render(canvas: &Canvas, elements: &[OutputElement]) -> String {
    let width = format_number(canvas.width());
    let height = format_number(canvas.height());

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    for element in elements {
        match element {
            OutputElement::Rectangle(rect) => write_rect(&mut svg, rect),
            OutputElement::Text(text) => write_text(&mut svg, text),
        }
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_rect(svg: &mut String, rect: &RectangleElement) {
    let g = &rect.geometry;
    let _ = writeln!(
        svg,
        r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"{} stroke="{}" stroke-width="{}"/>"#,
        format_number(g.x),
        format_number(g.y),
        format_number(g.width),
        format_number(g.height),
        rect.fill.to_hex(),
        opacity_attr(rect.fill.a),
        RECT_STROKE,
        RECT_STROKE_WIDTH,
    );
}

fn write_text(svg: &mut String, text: &TextElement) {
    let g = &text.geometry;
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}"{}>{}</text>"#,
        format_number(g.x),
        format_number(g.y + g.height),
        escape_xml(&text.font_family),
        format_number(text.font_size),
        text.fill.to_hex(),
        opacity_attr(text.fill.a),
        escape_xml(&text.content),
    );
}

fn opacity_attr(alpha: f64) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" fill-opacity="{}""#, format_number(alpha))
    }
}
