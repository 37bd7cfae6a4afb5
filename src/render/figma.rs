//! Figma node serializer.
//!
//! Produces the component document POSTed to `/files/{fileKey}/nodes`.
//! Text-only fields are omitted from rectangle nodes, never sent as
//! empty strings.

use crate::error::ExportError;
use crate::geometry::Canvas;
use crate::synth::{OutputElement, Rgba};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Root document sent to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigmaDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub width: f64,
    pub height: f64,
    pub children: Vec<FigmaNodeSpec>,
}

/// One child node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNodeSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fills: Vec<SolidFill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_vertical: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolidFill {
    #[serde(rename = "type")]
    pub fill_type: &'static str,
    pub color: Rgba,
}

impl SolidFill {
    fn solid(color: Rgba) -> Self {
        Self {
            fill_type: "SOLID",
            color,
        }
    }
}

/// Document name for an export started at `now`.
///
/// Millisecond resolution; two exports in the same millisecond collide.
pub fn export_name(now: DateTime<Utc>) -> String {
    format!("Screenshot Import {}", now.format("%Y-%m-%d %H:%M:%S%.3f"))
}

/// Build the node document. Children follow element order.
pub fn document(canvas: &Canvas, elements: &[OutputElement], name: &str) -> FigmaDocument {
    let mut text_count = 0usize;
    let mut rect_count = 0usize;

    let children = elements
        .iter()
        .map(|element| {
            let g = element.geometry();
            let mut node = FigmaNodeSpec {
                name: String::new(),
                node_type: element.element_type(),
                x: g.x,
                y: g.y,
                width: g.width,
                height: g.height,
                fills: vec![SolidFill::solid(*element.fill())],
                characters: None,
                font_size: None,
                font_family: None,
                text_align_horizontal: None,
                text_align_vertical: None,
            };
            match element {
                OutputElement::Text(text) => {
                    text_count += 1;
                    node.name = format!("Text {}", text_count);
                    node.characters = Some(text.content.clone());
                    node.font_size = Some(text.font_size);
                    node.font_family = Some(text.font_family.clone());
                    node.text_align_horizontal = Some(text.align_horizontal.as_str());
                    node.text_align_vertical = Some(text.align_vertical.as_str());
                }
                OutputElement::Rectangle(_) => {
                    rect_count += 1;
                    node.name = format!("Rectangle {}", rect_count);
                }
            }
            node
        })
        .collect();

    FigmaDocument {
        name: name.to_string(),
        node_type: "COMPONENT",
        width: canvas.width(),
        height: canvas.height(),
        children,
    }
}

/// Serialize the node document to JSON.
pub fn render(canvas: &Canvas, elements: &[OutputElement], name: &str) -> Result<String, ExportError> {
    let doc = document(canvas, elements, name);
    serde_json::to_string(&doc)
        .map_err(|e| ExportError::Serialization(format!("Figma document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::synthesize;
    use crate::vision::{DetectedRegion, NormalizedBox};
    use chrono::TimeZone;
    use serde_json::Value;

    fn sample() -> (Canvas, Vec<OutputElement>) {
        let canvas = Canvas::new(1000.0, 500.0).unwrap();
        let regions = vec![
            DetectedRegion::rect(NormalizedBox::new(0.0, 0.0, 0.5, 0.5)),
            DetectedRegion::text(NormalizedBox::new(0.1, 0.8, 0.2, 0.1), "OK"),
        ];
        let elements = synthesize(&regions, &canvas);
        (canvas, elements)
    }

    fn parsed(canvas: &Canvas, elements: &[OutputElement]) -> Value {
        serde_json::from_str(&render(canvas, elements, "Test Export").unwrap()).unwrap()
    }

    #[test]
    fn document_has_name_and_children() {
        let (canvas, elements) = sample();
        let json = parsed(&canvas, &elements);
        assert_eq!(json["name"], "Test Export");
        assert_eq!(json["type"], "COMPONENT");
        assert_eq!(json["children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn rectangle_nodes_omit_text_fields() {
        let (canvas, elements) = sample();
        let json = parsed(&canvas, &elements);
        let rect = json["children"][0].as_object().unwrap();
        assert_eq!(rect["type"], "RECTANGLE");
        for key in ["characters", "fontSize", "fontFamily", "textAlignHorizontal", "textAlignVertical"] {
            assert!(!rect.contains_key(key), "rectangle carries {}", key);
        }
        assert_eq!(rect["fills"][0]["type"], "SOLID");
        assert_eq!(rect["fills"][0]["color"]["a"], 1.0);
    }

    #[test]
    fn text_nodes_carry_text_fields() {
        let (canvas, elements) = sample();
        let json = parsed(&canvas, &elements);
        let text = &json["children"][1];
        assert_eq!(text["type"], "TEXT");
        assert_eq!(text["name"], "Text 1");
        assert_eq!(text["characters"], "OK");
        assert_eq!(text["fontFamily"], "Inter");
        assert_eq!(text["textAlignHorizontal"], "LEFT");
        assert_eq!(text["textAlignVertical"], "TOP");
        assert!((text["fontSize"].as_f64().unwrap() - 40.0).abs() < 1e-6);
        assert!((text["x"].as_f64().unwrap() - 100.0).abs() < 1e-6);
        assert!((text["y"].as_f64().unwrap() - 50.0).abs() < 1e-6);
        assert_eq!(text["fills"][0]["color"]["r"], 0.0);
    }

    #[test]
    fn output_is_deterministic() {
        let (canvas, elements) = sample();
        assert_eq!(
            render(&canvas, &elements, "n").unwrap(),
            render(&canvas, &elements, "n").unwrap()
        );
    }

    #[test]
    fn export_name_uses_millisecond_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 5).unwrap();
        assert_eq!(export_name(now), "Screenshot Import 2026-10-19 08:30:05.000");
    }
}
