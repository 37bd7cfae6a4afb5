//! Clipboard sink.
//!
//! Uses arboard for native clipboard access. The write runs on a blocking
//! thread that cannot be interrupted, so this sink opts out of cancellation.

use super::{DeliveryReceipt, DeliverySink, PayloadFormat};
use crate::error::DeliveryError;

/// Puts the SVG markup on the system clipboard as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardSink;

impl ClipboardSink {
    pub fn new() -> Self {
        Self
    }
}

impl DeliverySink for ClipboardSink {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::Svg
    }

    fn cancellable(&self) -> bool {
        false
    }

    async fn deliver(&self, payload: String) -> Result<DeliveryReceipt, DeliveryError> {
        let chars = payload.chars().count();
        // arboard blocks on some platforms while it negotiates clipboard ownership
        tokio::task::spawn_blocking(move || -> Result<(), DeliveryError> {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| DeliveryError::Clipboard(e.to_string()))?;
            clipboard
                .set_text(payload)
                .map_err(|e| DeliveryError::Clipboard(e.to_string()))
        })
        .await
        .map_err(|e| DeliveryError::Clipboard(e.to_string()))??;

        log::info!("[DELIVERY] Copied {} chars of SVG to clipboard", chars);
        Ok(DeliveryReceipt::Clipboard { chars })
    }
}
