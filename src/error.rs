//! Error types for the export pipeline.
//!
//! Every failure ends an export in `failed(reason)` where `reason` is the
//! `Display` text below. `ExportError::kind()` gives callers a stable,
//! machine-readable category on top of that.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoInput,
    Configuration,
    Serialization,
    Analysis,
    Delivery,
    Cancelled,
    Busy,
}

/// Errors surfaced by `Exporter`.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No canvas or image was supplied.
    #[error("no image")]
    NoInput,

    /// Destination identifier or credential missing or left at a placeholder.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed region input, or a serializer failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The vision collaborator failed to produce detections.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// The delivery sink rejected or failed to receive the payload.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// The in-flight delivery was cancelled.
    #[error("cancelled")]
    Cancelled,

    /// Another export is already in flight on this exporter.
    #[error("an export is already in progress")]
    Busy,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::NoInput => ErrorKind::NoInput,
            ExportError::Configuration(_) => ErrorKind::Configuration,
            ExportError::Serialization(_) => ErrorKind::Serialization,
            ExportError::Analysis(_) => ErrorKind::Analysis,
            ExportError::Delivery(_) => ErrorKind::Delivery,
            ExportError::Cancelled => ErrorKind::Cancelled,
            ExportError::Busy => ErrorKind::Busy,
        }
    }
}

/// Failures reported by a delivery sink.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with anything other than 200.
    #[error("Figma API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The 200 response body was not the expected node map.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The system clipboard could not be opened or written.
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl DeliveryError {
    /// Transport failures and 5xx responses may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            DeliveryError::Transport(_) => true,
            DeliveryError::Status { status, .. } => *status >= 500,
            DeliveryError::Decode(_) | DeliveryError::Clipboard(_) => false,
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DeliveryError::Decode(e.to_string())
        } else {
            DeliveryError::Transport(e.to_string())
        }
    }
}
