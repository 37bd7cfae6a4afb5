//! Precomputed detections loaded from a JSON file.
//!
//! The macOS vision helper writes its results in the `VisionAnalysis`
//! JSON format; this analyzer replays them for any image.

use super::{VisionAnalysis, VisionAnalyzer};
use image::DynamicImage;
use std::path::PathBuf;

/// Analyzer backed by a detections JSON file on disk.
#[derive(Debug, Clone)]
pub struct DetectionFile {
    path: PathBuf,
}

impl DetectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and parse the file synchronously.
    pub fn load(&self) -> Result<VisionAnalysis, String> {
        self.parse(std::fs::read_to_string(&self.path))
    }

    fn parse(&self, read: std::io::Result<String>) -> Result<VisionAnalysis, String> {
        let raw = read.map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;
        VisionAnalysis::from_json(&raw)
    }
}

impl VisionAnalyzer for DetectionFile {
    async fn analyze(&self, image: &DynamicImage) -> Result<VisionAnalysis, String> {
        let start = std::time::Instant::now();
        let analysis = self.parse(tokio::fs::read_to_string(&self.path).await)?;
        log::info!(
            "[VISION] Loaded {} rectangles + {} text regions for {}x{} image in {}ms",
            analysis.rectangles.len(),
            analysis.text.len(),
            image.width(),
            image.height(),
            start.elapsed().as_millis()
        );
        Ok(analysis)
    }
}
