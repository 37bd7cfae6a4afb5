//! Export orchestration — analyze → convert → upload.
//!
//! State machine per exporter:
//!   idle → analyzing → converting → uploading → completed | failed(reason)
//!
//! One export at a time: a request that arrives while another is in flight
//! is refused with `ExportError::Busy` and leaves the current status alone.
//! Terminal states persist until the next request (or `reset()`).
//!
//! Status is published two ways: a single-slot `watch` channel for
//! whoever wants the latest value, and observer callbacks that see every
//! transition in order.

use crate::delivery::{DeliveryReceipt, DeliverySink, PayloadFormat};
use crate::error::{DeliveryError, ExportError};
use crate::geometry::Canvas;
use crate::render::{figma, svg};
use crate::synth::synthesize;
use crate::vision::{DetectedRegion, VisionAnalyzer};
use image::DynamicImage;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{watch, Notify};

/// Progress of the current (or last) export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum ExportStatus {
    Idle,
    Analyzing,
    Converting,
    Uploading,
    Completed,
    Failed(String),
}

impl ExportStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ExportStatus::Analyzing | ExportStatus::Converting | ExportStatus::Uploading
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Completed | ExportStatus::Failed(_))
    }
}

/// Retry settings for transient delivery failures.
///
/// The default makes a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

type Observer = Box<dyn Fn(&ExportStatus) + Send + Sync>;

/// Runs exports and tracks their status.
pub struct Exporter {
    status: watch::Sender<ExportStatus>,
    observers: Vec<Observer>,
    retry: RetryPolicy,
    cancel: Notify,
    upload_cancellable: AtomicBool,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        let (status, _) = watch::channel(ExportStatus::Idle);
        Self {
            status,
            observers: Vec::new(),
            retry: RetryPolicy::default(),
            cancel: Notify::new(),
            upload_cancellable: AtomicBool::new(false),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Register a callback invoked on every status transition.
    pub fn with_observer(mut self, observer: impl Fn(&ExportStatus) + Send + Sync + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn status(&self) -> ExportStatus {
        self.status.borrow().clone()
    }

    /// Receiver that always holds the latest status.
    pub fn subscribe(&self) -> watch::Receiver<ExportStatus> {
        self.status.subscribe()
    }

    /// Move a terminal status back to idle. Returns false if nothing changed.
    pub fn reset(&self) -> bool {
        let reset = self.status.send_if_modified(|status| {
            if status.is_terminal() {
                *status = ExportStatus::Idle;
                true
            } else {
                false
            }
        });
        if reset {
            self.notify_observers(&ExportStatus::Idle);
        }
        reset
    }

    /// Abort an in-flight delivery. Only has an effect while uploading to
    /// a sink that supports cancellation.
    pub fn cancel(&self) -> bool {
        if *self.status.borrow() != ExportStatus::Uploading {
            return false;
        }
        if !self.upload_cancellable.load(Ordering::SeqCst) {
            log::warn!("[EXPORT] Cancel ignored: this sink cannot be interrupted");
            return false;
        }
        log::info!("[EXPORT] Cancel requested during upload");
        self.cancel.notify_waiters();
        true
    }

    /// Export already-detected regions against `canvas`.
    ///
    /// `None` for the canvas means no image was supplied and fails with
    /// `NoInput` without touching the sink.
    pub async fn export<S: DeliverySink>(
        &self,
        canvas: Option<Canvas>,
        regions: &[DetectedRegion],
        sink: &S,
    ) -> Result<DeliveryReceipt, ExportError> {
        self.begin()?;
        let result = match canvas {
            Some(canvas) => self.convert_and_deliver(canvas, regions, sink).await,
            None => Err(ExportError::NoInput),
        };
        self.finish(result)
    }

    /// Full pipeline from a decoded image: run the analyzer, then export.
    pub async fn export_image<A: VisionAnalyzer, S: DeliverySink>(
        &self,
        image: Option<&DynamicImage>,
        analyzer: &A,
        sink: &S,
    ) -> Result<DeliveryReceipt, ExportError> {
        self.begin()?;
        let result = async {
            let image = image.ok_or(ExportError::NoInput)?;
            let canvas = Canvas::from_image(image)?;

            let start = Instant::now();
            let analysis = analyzer.analyze(image).await.map_err(ExportError::Analysis)?;
            log::info!(
                "[EXPORT] Analysis found {} regions in {}ms",
                analysis.region_count(),
                start.elapsed().as_millis()
            );

            let regions = analysis.into_regions();
            self.convert_and_deliver(canvas, &regions, sink).await
        }
        .await;
        self.finish(result)
    }

    // ── Stages ──────────────────────────────────────────────────────

    async fn convert_and_deliver<S: DeliverySink>(
        &self,
        canvas: Canvas,
        regions: &[DetectedRegion],
        sink: &S,
    ) -> Result<DeliveryReceipt, ExportError> {
        validate_regions(regions)?;
        let elements = synthesize(regions, &canvas);
        log::info!(
            "[EXPORT] Synthesized {} elements from {} regions",
            elements.len(),
            regions.len()
        );

        self.transition(ExportStatus::Converting);
        sink.check_config()?;

        let render_start = Instant::now();
        let payload = match sink.format() {
            PayloadFormat::Svg => svg::render(&canvas, &elements),
            PayloadFormat::FigmaNodes => {
                let name = figma::export_name(chrono::Utc::now());
                figma::render(&canvas, &elements, &name)?
            }
        };
        log::info!(
            "[RENDER] {:?} payload: {} bytes in {}ms",
            sink.format(),
            payload.len(),
            render_start.elapsed().as_millis()
        );

        // Register for cancellation before anyone can observe `uploading`.
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();
        let cancellable = sink.cancellable();
        self.upload_cancellable.store(cancellable, Ordering::SeqCst);

        self.transition(ExportStatus::Uploading);
        let delivery = self.deliver_with_retry(sink, payload);
        if !cancellable {
            return delivery.await.map_err(ExportError::from);
        }
        tokio::select! {
            biased;
            _ = &mut cancelled => Err(ExportError::Cancelled),
            result = delivery => result.map_err(ExportError::from),
        }
    }

    async fn deliver_with_retry<S: DeliverySink>(
        &self,
        sink: &S,
        payload: String,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match sink.deliver(payload.clone()).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    log::warn!(
                        "[EXPORT] Delivery attempt {}/{} failed: {} (retrying in {}ms)",
                        attempt,
                        max_attempts,
                        e,
                        self.retry.backoff.as_millis()
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ── Status bookkeeping ──────────────────────────────────────────

    /// Claim the exporter for a new request, or refuse with `Busy`.
    fn begin(&self) -> Result<(), ExportError> {
        let mut previous = ExportStatus::Idle;
        let accepted = self.status.send_if_modified(|status| {
            if status.is_in_flight() {
                return false;
            }
            previous = std::mem::replace(status, ExportStatus::Analyzing);
            true
        });
        if !accepted {
            log::warn!("[EXPORT] Rejected: an export is already in progress");
            return Err(ExportError::Busy);
        }
        if previous != ExportStatus::Idle {
            self.notify_observers(&ExportStatus::Idle);
        }
        log::info!("[EXPORT] idle → analyzing");
        self.notify_observers(&ExportStatus::Analyzing);
        Ok(())
    }

    fn finish(
        &self,
        result: Result<DeliveryReceipt, ExportError>,
    ) -> Result<DeliveryReceipt, ExportError> {
        match &result {
            Ok(_) => self.transition(ExportStatus::Completed),
            Err(e) => {
                log::error!("[EXPORT] Failed ({:?}): {}", e.kind(), e);
                self.transition(ExportStatus::Failed(e.to_string()));
            }
        }
        result
    }

    fn transition(&self, next: ExportStatus) {
        let previous = self.status.send_replace(next.clone());
        log::info!("[EXPORT] {:?} → {:?}", previous, next);
        self.notify_observers(&next);
    }

    fn notify_observers(&self, status: &ExportStatus) {
        for observer in &self.observers {
            observer(status);
        }
    }
}

/// Non-finite boxes have no defined geometry.
fn validate_regions(regions: &[DetectedRegion]) -> Result<(), ExportError> {
    match regions.iter().position(|r| !r.bbox().is_finite()) {
        Some(index) => Err(ExportError::Serialization(format!(
            "region {} has non-finite geometry: {:?}",
            index,
            regions[index].bbox()
        ))),
        None => Ok(()),
    }
}
