//! Vision domain — detected regions and the analyzer seam.
//!
//! The platform vision service (text recognition + rectangle detection)
//! lives outside this crate. It reports boxes normalized to [0,1] with a
//! bottom-left origin and Y increasing upward. External code should only
//! use the types and trait exported here.

mod detections;

pub use detections::DetectionFile;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Bounding box as fractions of the image size, bottom-left origin.
///
/// Values are not clamped: the vision service occasionally reports boxes
/// that spill slightly past the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBox {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.origin_x.is_finite()
            && self.origin_y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Text,
    Box,
}

/// One finding from the vision service.
///
/// Text regions carry only the top-confidence candidate string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetectedRegion {
    Text {
        #[serde(rename = "box")]
        bbox: NormalizedBox,
        text: String,
    },
    Box {
        #[serde(rename = "box")]
        bbox: NormalizedBox,
    },
}

impl DetectedRegion {
    pub fn text(bbox: NormalizedBox, text: impl Into<String>) -> Self {
        DetectedRegion::Text {
            bbox,
            text: text.into(),
        }
    }

    pub fn rect(bbox: NormalizedBox) -> Self {
        DetectedRegion::Box { bbox }
    }

    pub fn kind(&self) -> RegionKind {
        match self {
            DetectedRegion::Text { .. } => RegionKind::Text,
            DetectedRegion::Box { .. } => RegionKind::Box,
        }
    }

    pub fn bbox(&self) -> &NormalizedBox {
        match self {
            DetectedRegion::Text { bbox, .. } | DetectedRegion::Box { bbox } => bbox,
        }
    }
}

/// A recognized text block as reported by the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObservation {
    #[serde(rename = "box")]
    pub bbox: NormalizedBox,
    pub text: String,
}

/// A detected rectangle as reported by the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectObservation {
    #[serde(rename = "box")]
    pub bbox: NormalizedBox,
}

/// Complete result of one analysis call: two ordered lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionAnalysis {
    #[serde(default)]
    pub rectangles: Vec<RectObservation>,
    #[serde(default)]
    pub text: Vec<TextObservation>,
}

impl VisionAnalysis {
    /// Parse the detections JSON format (`{"rectangles": [...], "text": [...]}`).
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("Invalid detections JSON: {}", e))
    }

    pub fn region_count(&self) -> usize {
        self.rectangles.len() + self.text.len()
    }

    /// Flatten into pipeline order: rectangles first, then text.
    ///
    /// Later regions are drawn on top, so text ends up above the boxes
    /// that contain it.
    pub fn into_regions(self) -> Vec<DetectedRegion> {
        let mut regions = Vec::with_capacity(self.region_count());
        regions.extend(
            self.rectangles
                .into_iter()
                .map(|r| DetectedRegion::rect(r.bbox)),
        );
        regions.extend(
            self.text
                .into_iter()
                .map(|t| DetectedRegion::text(t.bbox, t.text)),
        );
        regions
    }
}

/// The vision collaborator: one awaited call per image.
pub trait VisionAnalyzer {
    fn analyze(
        &self,
        image: &DynamicImage,
    ) -> impl Future<Output = Result<VisionAnalysis, String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detection_json_with_camel_case_boxes() {
        let raw = r#"{
            "rectangles": [{"box": {"originX": 0.0, "originY": 0.0, "width": 0.5, "height": 0.5}}],
            "text": [{"box": {"originX": 0.1, "originY": 0.8, "width": 0.2, "height": 0.1}, "text": "OK"}]
        }"#;
        let analysis = VisionAnalysis::from_json(raw).unwrap();
        assert_eq!(analysis.region_count(), 2);
        assert_eq!(analysis.text[0].text, "OK");
        assert_eq!(analysis.text[0].bbox.origin_y, 0.8);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let analysis = VisionAnalysis::from_json(r#"{"text": []}"#).unwrap();
        assert!(analysis.rectangles.is_empty());
    }

    #[test]
    fn regions_put_rectangles_before_text() {
        let analysis = VisionAnalysis {
            rectangles: vec![RectObservation {
                bbox: NormalizedBox::new(0.0, 0.0, 1.0, 1.0),
            }],
            text: vec![TextObservation {
                bbox: NormalizedBox::new(0.1, 0.1, 0.2, 0.2),
                text: "hi".to_string(),
            }],
        };
        let kinds: Vec<RegionKind> = analysis.into_regions().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![RegionKind::Box, RegionKind::Text]);
    }

    #[test]
    fn region_json_is_tagged_by_kind() {
        let region = DetectedRegion::text(NormalizedBox::new(0.0, 0.0, 0.5, 0.5), "A");
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["box"]["originX"], 0.0);
    }

    #[test]
    fn non_finite_box_is_detected() {
        assert!(!NormalizedBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(NormalizedBox::new(-0.01, 0.0, 1.02, 1.0).is_finite());
    }
}
