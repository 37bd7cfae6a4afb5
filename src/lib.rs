//! Figsnap — screenshot detections to design elements.
//!
//! This is the crate root that wires the domains together. The pipeline:
//!   vision    — detected regions (normalized, bottom-left origin)
//!   geometry  — canvas + conversion to top-left pixel boxes
//!   synth     — regions → TEXT / RECTANGLE elements
//!   render    — elements → SVG markup or Figma node JSON
//!   delivery  — clipboard or Figma REST sink
//!   export    — the orchestrator and its status state machine
//!
//! `cli.rs` is the thin command-line surface; `run()` is its entry point.

pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod geometry;
pub mod render;
pub mod synth;
pub mod vision;

pub use delivery::{ClipboardSink, DeliveryReceipt, DeliverySink, FigmaNode, FigmaSink};
pub use error::{DeliveryError, ErrorKind, ExportError};
pub use export::{ExportStatus, Exporter, RetryPolicy};
pub use geometry::{AbsoluteBox, Canvas};
pub use synth::OutputElement;
pub use vision::{DetectedRegion, NormalizedBox, VisionAnalysis, VisionAnalyzer};

use clap::Parser;
use std::process::ExitCode;

/// Entry point — called by the `figsnap` binary.
pub fn run() -> ExitCode {
    // .env.local wins over .env; the first one found is the only one loaded.
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let cli = cli::Cli::parse();
    match cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("figsnap: {}", e);
            ExitCode::FAILURE
        }
    }
}
