//! Mock host for testing.
//!
//! Scripts replies per operation, captures requests for verification, and
//! lets tests emit host events on demand.

use super::{HostTransport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use webbridge_types::{CorrelationId, FailureKind, HostEvent, Operation, Reply, Request};

/// Mock host bridge runtime.
///
/// Clones share state, so a test can keep one handle while the client owns
/// another.
///
/// Reply resolution for a request, in order:
/// 1. forced failure (`fail_next_request`) or unreachable host
/// 2. a one-shot reply queued with `queue_reply`
/// 3. a scripted result (`respond_with_result`): replies with a fresh
///    correlation id and emits the `…Result` event carrying it
/// 4. a persistent reply set with `respond`
/// 5. otherwise `unknownOperation`
///
/// With an event delay set, scripted result events are emitted from a
/// spawned task after the delay, so the reply reaches the caller first.
#[derive(Debug)]
pub struct MockHost {
    inner: Arc<Mutex<MockHostInner>>,
    events_tx: Arc<EventSender>,
    events_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<HostEvent>>>,
}

#[derive(Debug, Default)]
struct MockHostInner {
    unreachable: bool,
    requests: Vec<Request>,
    replies: HashMap<Operation, Reply>,
    queued: HashMap<Operation, VecDeque<Reply>>,
    results: HashMap<Operation, Value>,
    issued_ids: Vec<CorrelationId>,
    fail_next_request: Option<String>,
    event_delay: Duration,
}

type EventSender = Mutex<Option<mpsc::UnboundedSender<HostEvent>>>;

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a new mock host with an open event channel and no scripts.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Mutex::new(MockHostInner::default())),
            events_tx: Arc::new(Mutex::new(Some(tx))),
            events_rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockHostInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Always reply to `operation` with `value`.
    pub fn respond(&self, operation: Operation, value: Value) {
        self.state().replies.insert(operation, Reply::ok(value));
    }

    /// Always fail `operation` with `kind`.
    pub fn fail(&self, operation: Operation, kind: FailureKind) {
        self.state()
            .replies
            .insert(operation, Reply::failure(kind, None));
    }

    /// Answer the next request for `operation` with `reply`, once.
    pub fn queue_reply(&self, operation: Operation, reply: Reply) {
        self.state()
            .queued
            .entry(operation)
            .or_default()
            .push_back(reply);
    }

    /// For a correlated operation, reply with a fresh correlation id and emit
    /// `body` (plus the id) as its result event.
    pub fn respond_with_result(&self, operation: Operation, body: Value) {
        self.state().results.insert(operation, body);
    }

    /// Stop answering `operation` (it becomes unknown to the host).
    pub fn forget(&self, operation: Operation) {
        let mut inner = self.state();
        inner.replies.remove(&operation);
        inner.queued.remove(&operation);
        inner.results.remove(&operation);
    }

    /// Make the host unreachable (or reachable again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Delay scripted result events by `delay` after their reply.
    pub fn set_event_delay(&self, delay: Duration) {
        self.state().event_delay = delay;
    }

    /// Cause the next request to fail at the transport level.
    pub fn fail_next_request(&self, error: &str) {
        self.state().fail_next_request = Some(error.to_string());
    }

    /// Emit an event on the event channel.
    ///
    /// Returns false if the channel was closed.
    pub fn emit(&self, name: &str, payload: Value) -> bool {
        self.send_event(HostEvent::new(name, payload))
    }

    fn send_event(&self, event: HostEvent) -> bool {
        send_on(&self.events_tx, event)
    }

    /// Close the event channel. Already emitted events are still delivered.
    pub fn close_events(&self) {
        self.events_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.state().requests.last().cloned()
    }

    /// Requests received for `operation`.
    pub fn requests_for(&self, operation: Operation) -> Vec<Request> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    /// Correlation ids issued by scripted results, in order.
    pub fn issued_ids(&self) -> Vec<CorrelationId> {
        self.state().issued_ids.clone()
    }

    /// Clear scripts, captured requests and failure flags.
    ///
    /// The event channel is left as it is.
    pub fn reset(&self) {
        *self.state() = MockHostInner::default();
    }
}

impl Clone for MockHost {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            events_tx: Arc::clone(&self.events_tx),
            events_rx: Arc::clone(&self.events_rx),
        }
    }
}

fn send_on(events_tx: &EventSender, event: HostEvent) -> bool {
    let tx = events_tx.lock().unwrap_or_else(PoisonError::into_inner);
    match tx.as_ref() {
        Some(tx) => tx.send(event).is_ok(),
        None => false,
    }
}

fn with_id(body: &Value, id: CorrelationId) -> Value {
    let mut body = body.clone();
    if let Value::Object(fields) = &mut body {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    body
}

#[async_trait]
impl HostTransport for MockHost {
    async fn request(&self, request: Request) -> Result<Reply, TransportError> {
        let operation = request.operation;
        let (reply, event, delay) = {
            let mut inner = self.state();
            let delay = inner.event_delay;

            // Check for forced failure
            if let Some(error) = inner.fail_next_request.take() {
                return Err(TransportError::SendFailed(error));
            }
            if inner.unreachable {
                return Err(TransportError::Unavailable);
            }

            inner.requests.push(request);

            let (reply, event) = if let Some(reply) =
                inner.queued.get_mut(&operation).and_then(VecDeque::pop_front)
            {
                (reply, None)
            } else if let (Some(body), Some(name)) =
                (inner.results.get(&operation), operation.result_event())
            {
                let id = CorrelationId::new();
                let event = HostEvent::new(name, with_id(body, id));
                inner.issued_ids.push(id);
                (Reply::ok(Value::String(id.to_string())), Some(event))
            } else if let Some(reply) = inner.replies.get(&operation) {
                (reply.clone(), None)
            } else {
                (
                    Reply::failure(
                        FailureKind::UnknownOperation,
                        Some(format!("no handler for {operation}")),
                    ),
                    None,
                )
            };
            (reply, event, delay)
        };

        match event {
            Some(event) if delay.is_zero() => {
                self.send_event(event);
            }
            Some(event) => {
                let events_tx = Arc::clone(&self.events_tx);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    send_on(&events_tx, event);
                });
            }
            None => {}
        }
        Ok(reply)
    }

    async fn recv_event(&self) -> Result<HostEvent, TransportError> {
        let mut rx = self.events_rx.lock().await;
        rx.recv().await.ok_or(TransportError::ConnectionClosed)
    }

    fn is_available(&self) -> bool {
        !self.state().unreachable
    }
}
