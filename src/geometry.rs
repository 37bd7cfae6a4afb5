//! Canvas and coordinate conversion.
//!
//! Converts vision-space boxes (normalized, bottom-left origin, Y up) into
//! pixel boxes with a top-left origin and Y down, which is what SVG, Figma
//! and screen layout all expect.

use crate::error::ExportError;
use crate::vision::NormalizedBox;
use image::DynamicImage;
use std::path::Path;

/// Pixel dimensions of the image the regions were detected against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
}

impl Canvas {
    /// Both dimensions must be positive and finite.
    pub fn new(width: f64, height: f64) -> Result<Self, ExportError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ExportError::Serialization(format!(
                "invalid canvas size {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Canvas matching a decoded image.
    pub fn from_image(image: &DynamicImage) -> Result<Self, ExportError> {
        Self::new(image.width() as f64, image.height() as f64)
    }

    /// Read only the image header to get its pixel size.
    pub fn from_image_path(path: &Path) -> Result<Self, ExportError> {
        let (w, h) = image::image_dimensions(path).map_err(|e| {
            log::warn!("[CANVAS] Cannot read {}: {}", path.display(), e);
            ExportError::NoInput
        })?;
        Self::new(w as f64, h as f64)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Pixel box, top-left origin, Y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a normalized box onto the canvas, flipping the Y axis.
///
/// No clamping: boxes that spill past the canvas stay that way.
pub fn to_absolute(bbox: &NormalizedBox, canvas: &Canvas) -> AbsoluteBox {
    AbsoluteBox {
        x: bbox.origin_x * canvas.width,
        y: (1.0 - bbox.origin_y - bbox.height) * canvas.height,
        width: bbox.width * canvas.width,
        height: bbox.height * canvas.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_box(actual: AbsoluteBox, x: f64, y: f64, w: f64, h: f64) {
        assert!(
            approx(actual.x, x) && approx(actual.y, y) && approx(actual.width, w) && approx(actual.height, h),
            "expected ({}, {}, {}, {}), got {:?}",
            x, y, w, h, actual
        );
    }

    #[test]
    fn full_canvas_box_maps_to_itself() {
        for (w, h) in [(1.0, 1.0), (1000.0, 500.0), (1440.0, 900.0), (33.3, 77.7)] {
            let canvas = Canvas::new(w, h).unwrap();
            let abs = to_absolute(&NormalizedBox::new(0.0, 0.0, 1.0, 1.0), &canvas);
            assert_box(abs, 0.0, 0.0, w, h);
        }
    }

    #[test]
    fn y_axis_is_flipped() {
        let canvas = Canvas::new(1000.0, 500.0).unwrap();
        let abs = to_absolute(&NormalizedBox::new(0.1, 0.8, 0.2, 0.1), &canvas);
        assert_box(abs, 100.0, 50.0, 200.0, 50.0);
    }

    #[test]
    fn bottom_left_quadrant_lands_at_bottom() {
        let canvas = Canvas::new(200.0, 100.0).unwrap();
        let abs = to_absolute(&NormalizedBox::new(0.0, 0.0, 0.5, 0.5), &canvas);
        assert_box(abs, 0.0, 50.0, 100.0, 50.0);
    }

    #[test]
    fn out_of_range_boxes_are_not_clamped() {
        let canvas = Canvas::new(100.0, 100.0).unwrap();
        let abs = to_absolute(&NormalizedBox::new(-0.05, 0.95, 0.2, 0.1), &canvas);
        assert_box(abs, -5.0, -5.0, 20.0, 10.0);
    }

    #[test]
    fn canvas_rejects_non_positive_dimensions() {
        assert!(Canvas::new(0.0, 10.0).is_err());
        assert!(Canvas::new(10.0, -1.0).is_err());
        assert!(Canvas::new(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn canvas_from_missing_file_is_no_input() {
        let err = Canvas::from_image_path(Path::new("/nonexistent/shot.png")).unwrap_err();
        assert!(matches!(err, ExportError::NoInput));
    }

    #[test]
    fn canvas_from_undecodable_file_is_no_input() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), b"definitely not a png").unwrap();
        let err = Canvas::from_image_path(file.path()).unwrap_err();
        assert!(matches!(err, ExportError::NoInput));
    }

    #[test]
    fn canvas_from_decoded_image() {
        let img = DynamicImage::new_rgba8(64, 32);
        let canvas = Canvas::from_image(&img).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (64.0, 32.0));
    }
}
