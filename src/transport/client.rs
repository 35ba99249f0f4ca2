//! Caller-side transport client.
//!
//! Owns the pending-request map and the reconnect schedule. A request first
//! rides the persistent channel; if that path is down or fails it falls
//! back to a one-shot call, and as a last resort a synchronous inline
//! keyword scan keeps the user from seeing a bare failure.

use super::channel::{Connector, Link};
use super::error::{ConnectorError, TransportError};
use super::protocol::{Envelope, ErrorCode, ExplainPayload, ResponseBody};
use super::state::ChannelState;
use crate::analyzer;
use crate::config::TransportConfig;
use crate::orchestrator::MIN_TEXT_LEN;
use crate::provider::{AnalysisOptions, AnalysisResult, ProviderId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The only failures ever surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplainFailure {
    #[error("{0}")]
    InputTooShort(String),

    #[error("Analysis is temporarily unavailable, please try again")]
    Unavailable,
}

/// A request awaiting its matched response. Lives from send to matched
/// response or timeout; the oneshot sender guarantees exactly one
/// resolution.
struct PendingSlot {
    resolve: oneshot::Sender<ResponseBody>,
    started_at: Instant,
}

struct ClientInner {
    pending: Mutex<HashMap<Uuid, PendingSlot>>,
    state: Mutex<ChannelState>,
    link: Mutex<Option<mpsc::Sender<Envelope>>>,
    /// Serializes connection establishment so concurrent first requests
    /// share one link instead of racing to open several.
    connect_lock: tokio::sync::Mutex<()>,
    reconnecting: AtomicBool,
}

/// Caller-side handle to the analysis host.
pub struct TransportClient {
    connector: Arc<dyn Connector>,
    config: TransportConfig,
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

impl TransportClient {
    pub fn new(connector: Arc<dyn Connector>, config: TransportConfig) -> Self {
        let inner = Arc::new(ClientInner {
            pending: Mutex::new(HashMap::new()),
            state: Mutex::new(ChannelState::new(config.backoff_floor_ms)),
            link: Mutex::new(None),
            connect_lock: tokio::sync::Mutex::new(()),
            reconnecting: AtomicBool::new(false),
        });
        Self {
            connector,
            config,
            inner,
            cancel: CancellationToken::new(),
        }
    }

    /// Current channel state snapshot.
    pub fn channel_state(&self) -> ChannelState {
        *self.inner.state.lock().expect("poisoned lock")
    }

    /// Number of requests currently awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().expect("poisoned lock").len()
    }

    /// Obtain a plain-language explanation for `text`.
    ///
    /// Too-short input is rejected before any channel is touched. Transport
    /// failures degrade from the persistent channel to a one-shot call to
    /// the inline keyword scan; only when all three are exhausted does the
    /// user see a generic failure.
    pub async fn explain(
        &self,
        text: &str,
        context: Option<&str>,
        options: AnalysisOptions,
    ) -> Result<AnalysisResult, ExplainFailure> {
        let started = Instant::now();
        let len = text.trim().chars().count();
        if len < MIN_TEXT_LEN {
            return Err(ExplainFailure::InputTooShort(format!(
                "Selected text is too short to analyze ({len} characters, minimum {MIN_TEXT_LEN})"
            )));
        }

        let payload = ExplainPayload {
            text: text.to_string(),
            context: context.map(str::to_string),
            options,
        };

        match self.via_persistent(&payload).await {
            Ok(body) => match interpret(body) {
                Outcome::Done(result) => return Ok(result),
                Outcome::TooShort(message) => {
                    return Err(ExplainFailure::InputTooShort(message))
                }
                Outcome::Broken(message) => {
                    tracing::warn!(error = %message, "host error on persistent path");
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "persistent path failed, falling back to one-shot");
            }
        }

        match self.via_one_shot(&payload).await {
            Ok(body) => match interpret(body) {
                Outcome::Done(result) => return Ok(result),
                Outcome::TooShort(message) => {
                    return Err(ExplainFailure::InputTooShort(message))
                }
                Outcome::Broken(message) => {
                    tracing::warn!(error = %message, "host error on one-shot path");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "one-shot path failed");
            }
        }

        match inline_fallback(text, started) {
            Some(result) => Ok(result),
            None => Err(ExplainFailure::Unavailable),
        }
    }

    async fn via_persistent(
        &self,
        payload: &ExplainPayload,
    ) -> Result<ResponseBody, TransportError> {
        let tx = self.ensure_connected().await?;

        let correlation_id = Uuid::new_v4();
        let (resolve, resolved) = oneshot::channel();
        self.inner
            .pending
            .lock()
            .expect("poisoned lock")
            .insert(
                correlation_id,
                PendingSlot {
                    resolve,
                    started_at: Instant::now(),
                },
            );

        let envelope = Envelope::ExplainText {
            correlation_id,
            payload: payload.clone(),
        };
        if tx.send(envelope).await.is_err() {
            self.remove_pending(correlation_id);
            return Err(TransportError::Send(
                "persistent channel closed".to_string(),
            ));
        }

        let timeout = Duration::from_millis(self.config.request_timeout_ms);
        match tokio::time::timeout(timeout, resolved).await {
            Ok(Ok(body)) => Ok(body),
            // The pending map was drained on disconnect.
            Ok(Err(_)) => Err(TransportError::Disconnected),
            Err(_) => {
                self.remove_pending(correlation_id);
                Err(TransportError::Timeout(self.config.request_timeout_ms))
            }
        }
    }

    fn remove_pending(&self, correlation_id: Uuid) {
        self.inner
            .pending
            .lock()
            .expect("poisoned lock")
            .remove(&correlation_id);
    }

    async fn ensure_connected(&self) -> Result<mpsc::Sender<Envelope>, TransportError> {
        if let Some(tx) = self.inner.link.lock().expect("poisoned lock").clone() {
            return Ok(tx);
        }
        if self.inner.reconnecting.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(
                "reconnect in progress".to_string(),
            ));
        }

        let _guard = self.inner.connect_lock.lock().await;
        // Another request may have connected while we waited for the guard.
        if let Some(tx) = self.inner.link.lock().expect("poisoned lock").clone() {
            return Ok(tx);
        }

        match self.connector.connect().await {
            Ok(link) => Ok(install_link(
                &self.inner,
                &self.connector,
                &self.config,
                &self.cancel,
                link,
            )),
            Err(e) => {
                begin_reconnect(&self.inner, &self.connector, &self.config, &self.cancel);
                Err(TransportError::Unavailable(e.to_string()))
            }
        }
    }

    async fn via_one_shot(&self, payload: &ExplainPayload) -> Result<ResponseBody, TransportError> {
        let correlation_id = Uuid::new_v4();
        let envelope = Envelope::ExplainText {
            correlation_id,
            payload: payload.clone(),
        };
        let timeout = Duration::from_millis(self.config.request_timeout_ms);

        match tokio::time::timeout(timeout, self.connector.one_shot(envelope.clone())).await {
            Ok(Ok(response)) => extract_body(response, correlation_id),
            Ok(Err(ConnectorError::ContextInvalidated)) => {
                // Probe liveness, then retry exactly once after a short
                // delay; a second failure surfaces as a transport error.
                tracing::debug!("one-shot context invalidated, probing and retrying once");
                let probe = Envelope::Ping {
                    correlation_id: Uuid::new_v4(),
                };
                let _ = tokio::time::timeout(timeout, self.connector.one_shot(probe)).await;
                tokio::time::sleep(Duration::from_millis(
                    self.config.invalidated_retry_delay_ms,
                ))
                .await;

                match tokio::time::timeout(timeout, self.connector.one_shot(envelope)).await {
                    Ok(Ok(response)) => extract_body(response, correlation_id),
                    Ok(Err(e)) => Err(TransportError::Unavailable(e.to_string())),
                    Err(_) => Err(TransportError::Timeout(self.config.request_timeout_ms)),
                }
            }
            Ok(Err(e)) => Err(TransportError::Unavailable(e.to_string())),
            Err(_) => Err(TransportError::Timeout(self.config.request_timeout_ms)),
        }
    }
}

impl Drop for TransportClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

enum Outcome {
    Done(AnalysisResult),
    TooShort(String),
    Broken(String),
}

fn interpret(body: ResponseBody) -> Outcome {
    if let Some(analysis) = body.analysis {
        return Outcome::Done(analysis);
    }
    match body.error_code {
        Some(ErrorCode::InputTooShort) => Outcome::TooShort(
            body.error
                .unwrap_or_else(|| "Selected text is too short to analyze".to_string()),
        ),
        _ => Outcome::Broken(
            body.error
                .unwrap_or_else(|| "response carried neither analysis nor error".to_string()),
        ),
    }
}

fn extract_body(envelope: Envelope, expected: Uuid) -> Result<ResponseBody, TransportError> {
    match envelope {
        Envelope::Response {
            correlation_id,
            body,
        } if correlation_id == expected => Ok(*body),
        _ => Err(TransportError::Send(
            "mismatched one-shot response".to_string(),
        )),
    }
}

/// Last-resort synchronous keyword scan, run when both transport paths are
/// down. Returns None only when no financial vocabulary is present.
fn inline_fallback(text: &str, started: Instant) -> Option<AnalysisResult> {
    let terms = analyzer::quick_keyword_scan(text);
    if terms.is_empty() {
        return None;
    }
    tracing::info!(terms = terms.len(), "serving inline keyword fallback");
    Some(AnalysisResult {
        explanation_text: format!(
            "The analysis service is unreachable right now, but the selection mentions: {}. \
             Try again shortly for a full explanation.",
            terms.join(", ")
        ),
        confidence: 0.3,
        source: ProviderId::Local,
        complexity: analyzer::classify_complexity(text),
        sentiment: None,
        topics: Vec::new(),
        entities: Vec::new(),
        cached: false,
        processing_time_ms: started.elapsed().as_millis() as u64,
    })
}

fn install_link(
    inner: &Arc<ClientInner>,
    connector: &Arc<dyn Connector>,
    config: &TransportConfig,
    cancel: &CancellationToken,
    link: Link,
) -> mpsc::Sender<Envelope> {
    let Link { tx, rx } = link;
    *inner.link.lock().expect("poisoned lock") = Some(tx.clone());
    inner
        .state
        .lock()
        .expect("poisoned lock")
        .on_connect(config.backoff_floor_ms);
    tracing::debug!("persistent channel connected");

    tokio::spawn(read_loop(
        Arc::clone(inner),
        Arc::clone(connector),
        config.clone(),
        cancel.clone(),
        rx,
    ));
    tx
}

/// Drains the persistent link, resolving pending requests by correlation
/// ID. Unmatched or already-resolved IDs are dropped. When the link closes,
/// every still-pending request is rejected immediately and a reconnect is
/// scheduled.
async fn read_loop(
    inner: Arc<ClientInner>,
    connector: Arc<dyn Connector>,
    config: TransportConfig,
    cancel: CancellationToken,
    mut rx: mpsc::Receiver<Envelope>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            maybe = rx.recv() => match maybe {
                Some(Envelope::Response { correlation_id, body }) => {
                    let slot = inner
                        .pending
                        .lock()
                        .expect("poisoned lock")
                        .remove(&correlation_id);
                    match slot {
                        Some(slot) => {
                            tracing::trace!(
                                %correlation_id,
                                elapsed_ms = slot.started_at.elapsed().as_millis() as u64,
                                "matched response"
                            );
                            let _ = slot.resolve.send(*body);
                        }
                        None => tracing::trace!(
                            %correlation_id,
                            "unmatched or already-resolved response dropped"
                        ),
                    }
                }
                Some(_) => {}
                None => break,
            }
        }
    }

    // Disconnected: dropping the slots rejects every pending request at
    // once, so callers can fall back without waiting out their timeouts.
    let rejected = {
        let mut pending = inner.pending.lock().expect("poisoned lock");
        let n = pending.len();
        pending.clear();
        n
    };
    inner.link.lock().expect("poisoned lock").take();
    tracing::warn!(rejected, "persistent channel disconnected");
    begin_reconnect(&inner, &connector, &config, &cancel);
}

/// Start the reconnect schedule unless one is already running.
fn begin_reconnect(
    inner: &Arc<ClientInner>,
    connector: &Arc<dyn Connector>,
    config: &TransportConfig,
    cancel: &CancellationToken,
) {
    if inner
        .reconnecting
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    let inner = Arc::clone(inner);
    let connector = Arc::clone(connector);
    let config = config.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        loop {
            let delay = inner
                .state
                .lock()
                .expect("poisoned lock")
                .on_disconnect(config.backoff_ceiling_ms);
            tracing::debug!(delay_ms = delay, "scheduling reconnect attempt");

            tokio::select! {
                _ = cancel.cancelled() => {
                    inner.reconnecting.store(false, Ordering::SeqCst);
                    return;
                }
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }

            match connector.connect().await {
                Ok(link) => {
                    install_link(&inner, &connector, &config, &cancel, link);
                    inner.reconnecting.store(false, Ordering::SeqCst);
                    return;
                }
                Err(e) => tracing::debug!(error = %e, "reconnect attempt failed"),
            }
        }
    });
}
