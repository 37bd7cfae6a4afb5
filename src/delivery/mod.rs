//! Delivery domain — where a serialized export ends up.
//!
//! Sinks:
//!   - clipboard.rs — SVG text onto the system clipboard (arboard)
//!   - figma.rs     — node document POSTed to the Figma REST API (reqwest)

mod clipboard;
mod figma;

pub use clipboard::ClipboardSink;
pub use figma::{FigmaNode, FigmaSink};

use crate::error::{DeliveryError, ExportError};
use serde::Serialize;
use std::future::Future;

/// Which serializer a sink consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Svg,
    FigmaNodes,
}

/// Proof of a successful delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "sink", rename_all = "snake_case")]
pub enum DeliveryReceipt {
    Clipboard { chars: usize },
    Figma(FigmaNode),
}

/// A destination for one serialized payload.
pub trait DeliverySink {
    fn format(&self) -> PayloadFormat;

    /// Validate destination settings. Called before any I/O.
    fn check_config(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Whether dropping `deliver` mid-flight leaves no side effect behind.
    /// Sinks that hand work to a thread they cannot stop return false.
    fn cancellable(&self) -> bool {
        true
    }

    fn deliver(
        &self,
        payload: String,
    ) -> impl Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send;
}
