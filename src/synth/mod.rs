//! Element synthesis — detected regions to design elements.
//!
//! Pure data mapping. Output order equals input order (later elements sit
//! on top). The only region ever dropped is a text region whose best
//! candidate string is empty. Overlapping detections are kept as-is.

pub mod types;

pub use types::{
    HorizontalAlign, OutputElement, RectangleElement, Rgba, TextElement, VerticalAlign,
};

use crate::geometry::{to_absolute, Canvas};
use crate::vision::DetectedRegion;

/// Font size per pixel of box height.
pub const FONT_SIZE_RATIO: f64 = 0.8;

/// Family assigned to every text element.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Map each region to an element, preserving order.
pub fn synthesize(regions: &[DetectedRegion], canvas: &Canvas) -> Vec<OutputElement> {
    let elements: Vec<OutputElement> = regions
        .iter()
        .filter_map(|region| synthesize_one(region, canvas))
        .collect();

    let dropped = regions.len() - elements.len();
    if dropped > 0 {
        log::debug!("[SYNTH] Skipped {} empty text regions", dropped);
    }
    elements
}

fn synthesize_one(region: &DetectedRegion, canvas: &Canvas) -> Option<OutputElement> {
    match region {
        DetectedRegion::Text { bbox, text } => {
            if text.is_empty() {
                return None;
            }
            let geometry = to_absolute(bbox, canvas);
            Some(OutputElement::Text(TextElement {
                geometry,
                fill: Rgba::BLACK,
                content: text.clone(),
                font_size: geometry.height * FONT_SIZE_RATIO,
                font_family: DEFAULT_FONT_FAMILY.to_string(),
                align_horizontal: HorizontalAlign::Left,
                align_vertical: VerticalAlign::Top,
            }))
        }
        DetectedRegion::Box { bbox } => Some(OutputElement::Rectangle(RectangleElement {
            geometry: to_absolute(bbox, canvas),
            fill: Rgba::LIGHT_GRAY,
        })),
    }
}
