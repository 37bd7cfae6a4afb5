//! Figma REST sink — `POST /files/{fileKey}/nodes`.
//!
//! Success is HTTP 200 with a JSON object keyed by generated node IDs.
//! The first node in response order is returned.

use super::{DeliveryReceipt, DeliverySink, PayloadFormat};
use crate::config::FigmaConfig;
use crate::error::{DeliveryError, ExportError};
use serde::{Deserialize, Serialize};

/// A node created by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigmaNode {
    pub id: String,
    pub name: String,
}

/// Sends node documents to one Figma file.
#[derive(Debug, Clone)]
pub struct FigmaSink {
    config: FigmaConfig,
    client: reqwest::Client,
}

impl FigmaSink {
    /// Fails if the HTTP client (TLS backend, timeout) cannot be set up.
    pub fn new(config: FigmaConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { config, client })
    }
}

/// Pick the first entry, in response order, that carries both `id` and `name`.
pub(crate) fn parse_nodes_response(body: &str) -> Result<FigmaNode, DeliveryError> {
    let nodes: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(body).map_err(|e| DeliveryError::Decode(e.to_string()))?;
    nodes
        .into_iter()
        .find_map(|(_, value)| serde_json::from_value::<FigmaNode>(value).ok())
        .ok_or_else(|| DeliveryError::Decode("response contained no node with id and name".to_string()))
}

impl DeliverySink for FigmaSink {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::FigmaNodes
    }

    fn check_config(&self) -> Result<(), ExportError> {
        self.config.validate()
    }

    async fn deliver(&self, payload: String) -> Result<DeliveryReceipt, DeliveryError> {
        let url = self.config.nodes_url();
        let start = std::time::Instant::now();
        log::info!("[DELIVERY] POST {} ({} bytes)", url, payload.len());

        let response = self
            .client
            .post(&url)
            .header("X-Token", &self.config.token)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::info!(
            "[DELIVERY] Figma API answered {} in {}ms",
            status,
            start.elapsed().as_millis()
        );

        if status != reqwest::StatusCode::OK {
            log::error!("[DELIVERY] Figma API returned {}: {}", status, body);
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let node = parse_nodes_response(&body)?;
        log::info!("[DELIVERY] Created node {} ({})", node.id, node.name);
        Ok(DeliveryReceipt::Figma(node))
    }
}
