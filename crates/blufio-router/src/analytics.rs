// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only JSONL sink for routing events.
//!
//! Each [`AnalyticsLogger`] owns an unbounded queue drained by a single
//! background task, so events land in the file in the order they were
//! recorded and [`AnalyticsLogger::record`] never waits on I/O. Failures are
//! logged and dropped; analytics is best-effort.
//!
//! Loggers are shared per output path through an [`AnalyticsRegistry`] owned
//! by the host, which drains every writer on shutdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use blufio_core::BlufioError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::classifier::IntentComplexity;
use crate::router::RoutingDecision;
use crate::tier::{estimate_input_cost_usd, ModelTier};

/// Event type written to the `event` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventKind {
    Route,
    Complete,
    Fallback,
    BudgetDowngrade,
    Override,
}

/// One line of the analytics file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub ts: DateTime<Utc>,
    pub event: AnalyticsEventKind,
    pub intent: IntentComplexity,
    pub confidence: f32,
    pub tier: ModelTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_tier: Option<ModelTier>,
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub message_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size: Option<usize>,
    /// Always written; `null` when nothing is billed or the tier is bypassed.
    pub estimated_cost_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_reason: Option<String>,
    pub prompt_adapted: bool,
}

impl AnalyticsEvent {
    /// Build an event describing `decision`.
    pub fn from_decision(
        kind: AnalyticsEventKind,
        decision: &RoutingDecision,
        endpoint: Option<&str>,
    ) -> Self {
        let message_length = decision.context.message_length;
        let estimated_cost_usd = if decision.bypassed {
            None
        } else {
            estimate_input_cost_usd(decision.tier, message_length)
        };

        Self {
            ts: Utc::now(),
            event: kind,
            intent: decision.classification.intent,
            confidence: decision.classification.confidence,
            tier: decision.tier,
            original_tier: Some(decision.original_tier),
            provider: decision.model.provider.clone(),
            model: decision.model.model.clone(),
            endpoint: endpoint.map(str::to_string),
            session_id: decision.context.session_id.as_ref().map(ToString::to_string),
            channel: decision.context.channel.clone(),
            message_length,
            latency_ms: None,
            response_size: None,
            estimated_cost_usd,
            classifier_reason: Some(decision.classification.reason.to_string()),
            prompt_adapted: decision.adapted_prompt.was_adapted,
        }
    }

    pub fn with_completion(mut self, latency_ms: u64, response_size: usize) -> Self {
        self.latency_ms = Some(latency_ms);
        self.response_size = Some(response_size);
        self
    }
}

/// Fire-and-forget writer for one analytics file.
pub struct AnalyticsLogger {
    path: PathBuf,
    tx: Mutex<Option<mpsc::UnboundedSender<AnalyticsEvent>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl AnalyticsLogger {
    /// Start a logger for `path` on the current Tokio runtime.
    ///
    /// Outside a runtime the logger is created disabled and drops every event.
    /// The file and its parent directories are created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let Ok(handle) = Handle::try_current() else {
            debug!(path = %path.display(), "no tokio runtime, routing analytics disabled");
            return Self::disabled(path);
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = handle.spawn(run_writer(path.clone(), rx));
        debug!(path = %path.display(), "routing analytics logger started");

        Self {
            path,
            tx: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
        }
    }

    fn disabled(path: PathBuf) -> Self {
        Self {
            path,
            tx: Mutex::new(None),
            writer: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether events are still being accepted.
    pub fn is_active(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Queue an event. Never blocks and never fails.
    pub fn record(&self, event: AnalyticsEvent) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = tx.as_ref() else {
            debug!(event = ?event.event, "routing analytics inactive, event dropped");
            return;
        };
        if tx.send(event).is_err() {
            debug!(path = %self.path.display(), "routing analytics writer gone, event dropped");
        }
    }

    /// Stop accepting events and wait until everything queued is written.
    pub async fn shutdown(&self) {
        // Dropping the sender lets the writer finish once the queue is empty.
        drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(writer) = writer
            && let Err(e) = writer.await
        {
            warn!(path = %self.path.display(), error = %e, "routing analytics writer task failed");
        }
    }
}

impl std::fmt::Debug for AnalyticsLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsLogger")
            .field("path", &self.path)
            .field("active", &self.is_active())
            .finish()
    }
}

async fn run_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<AnalyticsEvent>) {
    let mut file: Option<File> = None;
    while let Some(event) = rx.recv().await {
        let mut line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize routing analytics event");
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = append_line(&path, &mut file, line.as_bytes()).await {
            warn!(error = %e, "failed to write routing analytics event");
            // Reopen on the next event.
            file = None;
        }
    }
}

async fn append_line(path: &Path, file: &mut Option<File>, bytes: &[u8]) -> Result<(), BlufioError> {
    if file.is_none() {
        *file = Some(open_sink(path).await?);
    }
    let Some(sink) = file.as_mut() else {
        return Err(BlufioError::Internal("analytics sink not open".into()));
    };
    sink.write_all(bytes)
        .await
        .map_err(|e| BlufioError::analytics(path, e))?;
    sink.flush().await.map_err(|e| BlufioError::analytics(path, e))
}

async fn open_sink(path: &Path) -> Result<File, BlufioError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BlufioError::analytics(path, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| BlufioError::analytics(path, e))
}

/// Host-owned table of loggers, one per output path.
#[derive(Debug, Default)]
pub struct AnalyticsRegistry {
    loggers: Mutex<HashMap<PathBuf, Arc<AnalyticsLogger>>>,
}

impl AnalyticsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logger for `path`, created on first use.
    pub fn logger_for(&self, path: impl AsRef<Path>) -> Arc<AnalyticsLogger> {
        let path = path.as_ref();
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            loggers
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(AnalyticsLogger::open(path))),
        )
    }

    pub fn len(&self) -> usize {
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain and close every logger. Later `logger_for` calls start fresh ones.
    pub async fn shutdown(&self) {
        let loggers: Vec<Arc<AnalyticsLogger>> = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, logger)| logger)
            .collect();
        for logger in loggers {
            logger.shutdown().await;
        }
    }
}
