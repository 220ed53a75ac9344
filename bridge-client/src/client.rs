//! BridgeClient - the typed proxy for the host bridge runtime.
//!
//! # Architecture
//!
//! ```text
//! Surface → BridgeClient → HostTransport → Host
//!               ↓
//!          webbridge-core (listener registry, result tracker, option merge)
//! ```
//!
//! The client is an ordinary value: construct it once with its transport and
//! share it (`Arc<BridgeClient<T>>`) with everything that needs the bridge.
//!
//! Two kinds of traffic cross it:
//!
//! - calls: one [`Request`] and one [`Reply`], decoded into the operation's
//!   declared output
//! - events: pulled from the transport by [`dispatch_next`] or
//!   [`run_events`] and fanned out to every subscribed listener
//!
//! Operations such as `readNfcTag` resolve with a [`CorrelationId`]; their
//! result arrives as the `…Result` event carrying that id. Either subscribe
//! to the event or [`await_result`] the id while an event loop runs.
//!
//! [`dispatch_next`]: BridgeClient::dispatch_next
//! [`run_events`]: BridgeClient::run_events
//! [`await_result`]: BridgeClient::await_result
//!
//! # Example
//!
//! ```ignore
//! use webbridge_client::{BridgeClient, MockHost};
//!
//! let host = MockHost::new();
//! host.respond(Operation::SupportNfc, json!(true));
//! let client = BridgeClient::new(host);
//!
//! assert!(client.support_nfc().await?);
//! let sub = client.subscribe("readNfcTagResult", |payload| println!("{payload}"));
//! ```

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use webbridge_core::{
    merge_edit_options, merge_pick_options, Completion, ListenerRegistry, OptionsError,
    PickDefaults, ResultTracker, DEFAULT_MAX_PARKED,
};
use webbridge_types::ops::{self, BridgeOperation, NoInput, OperationResult, ResultOperation};
use webbridge_types::{
    ColorScheme, CorrelationId, EditPhotoOptions, FailureKind, HostEvent, HostFailure, Operation,
    PickImageOptions, QueryInput, QueryOutput, Reply, Request, ScaledSize, SyncPayload,
};

use crate::subscription::{Handler, SharedRegistry, Subscription};
use crate::transport::{HostTransport, TransportError};

/// Client errors.
///
/// None of these is fatal: the same call may simply be retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Input could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The host does not implement the operation.
    #[error("host does not know operation {0}")]
    UnknownOperation(Operation),

    /// The host answered with a value that does not fit the declared output.
    #[error("{operation} reply does not match its declared shape: {source}")]
    ShapeMismatch {
        /// Operation that was called
        operation: Operation,
        /// Decode failure
        source: serde_json::Error,
    },

    /// The capability is absent on this host.
    #[error("{0} is not supported by this host")]
    Unsupported(Operation),

    /// The user aborted the host-side flow.
    #[error("{0} was cancelled")]
    Cancelled(Operation),

    /// A permission was denied.
    #[error("{0} permission denied")]
    PermissionDenied(Operation),

    /// Any other host-side failure.
    #[error("{operation} failed on host: {message}")]
    Host {
        /// Operation that was called
        operation: Operation,
        /// Host-provided detail
        message: String,
    },

    /// Photo options rejected before sending.
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    /// No result event arrived in time.
    #[error("no result for {0} before timeout")]
    ResultTimeout(CorrelationId),

    /// The result was discarded before it could be delivered.
    #[error("result for {0} was discarded")]
    ResultAbandoned(CorrelationId),
}

impl ClientError {
    fn from_failure(operation: Operation, failure: HostFailure) -> Self {
        match failure.kind {
            FailureKind::UnknownOperation => ClientError::UnknownOperation(operation),
            FailureKind::Unsupported => ClientError::Unsupported(operation),
            FailureKind::Cancelled => ClientError::Cancelled(operation),
            FailureKind::PermissionDenied => ClientError::PermissionDenied(operation),
            FailureKind::Internal => ClientError::Host {
                operation,
                message: failure.message.unwrap_or_else(|| "unknown error".to_string()),
            },
        }
    }
}

/// Configuration for BridgeClient.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long `await_result` waits for a result event.
    pub result_timeout: Duration,
    /// Result events kept for ids nobody waits for yet.
    pub max_parked_results: usize,
    /// Defaults merged into every photo request.
    pub photo_defaults: PickDefaults,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            result_timeout: Duration::from_secs(60),
            max_parked_results: DEFAULT_MAX_PARKED,
            photo_defaults: PickDefaults::default(),
        }
    }
}

impl ClientConfig {
    /// Set the result timeout.
    pub fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    /// Set the bound on parked results.
    pub fn with_max_parked_results(mut self, max: usize) -> Self {
        self.max_parked_results = max;
        self
    }

    /// Set the photo defaults.
    pub fn with_photo_defaults(mut self, defaults: PickDefaults) -> Self {
        self.photo_defaults = defaults;
        self
    }
}

type Waiters = ResultTracker<oneshot::Sender<Value>, Value>;

/// The bridge client.
pub struct BridgeClient<T: HostTransport> {
    config: ClientConfig,
    transport: T,
    listeners: SharedRegistry,
    results: Mutex<Waiters>,
}

impl<T: HostTransport> BridgeClient<T> {
    /// Create a client with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(ClientConfig::default(), transport)
    }

    /// Create a client.
    pub fn with_config(config: ClientConfig, transport: T) -> Self {
        let results = Mutex::new(ResultTracker::new(config.max_parked_results));
        Self {
            config,
            transport,
            listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
            results,
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check if the host channel is up.
    pub fn is_available(&self) -> bool {
        self.transport.is_available()
    }

    fn registry(&self) -> MutexGuard<'_, ListenerRegistry<Handler>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn waiters(&self) -> MutexGuard<'_, Waiters> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===========================================
    // Calls
    // ===========================================

    /// Call `operation` with an already-encoded input.
    pub async fn call_raw(&self, operation: Operation, input: Value) -> Result<Value, ClientError> {
        tracing::debug!(%operation, "calling host");

        let reply = match self.transport.request(Request::new(operation, input)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(%operation, error = %e, "call failed");
                return Err(e.into());
            }
        };

        match reply {
            Reply::Value { value } => Ok(value),
            Reply::Failure(failure) => {
                tracing::warn!(%operation, kind = ?failure.kind, "host refused call");
                Err(ClientError::from_failure(operation, failure))
            }
        }
    }

    /// Call a typed operation and decode its declared output.
    pub async fn call<O: BridgeOperation>(&self, input: &O::Input) -> Result<O::Output, ClientError> {
        let operation = O::OPERATION;
        let input =
            serde_json::to_value(input).map_err(|e| ClientError::Serialization(e.to_string()))?;
        let value = self.call_raw(operation, input).await?;
        serde_json::from_value(value).map_err(|source| {
            tracing::warn!(%operation, error = %source, "reply shape mismatch");
            ClientError::ShapeMismatch { operation, source }
        })
    }

    /// Run a query against the synced tables.
    pub async fn query(&self, input: &QueryInput) -> Result<QueryOutput, ClientError> {
        self.call::<ops::Query>(input).await
    }

    /// Read the host's color scheme.
    pub async fn color_scheme(&self) -> Result<ColorScheme, ClientError> {
        self.call::<ops::GetColorScheme>(&NoInput {}).await
    }

    /// Read the scaled device metrics.
    pub async fn dimensions(&self) -> Result<ScaledSize, ClientError> {
        self.call::<ops::GetDimensions>(&NoInput {}).await
    }

    /// Check for NFC hardware.
    pub async fn support_nfc(&self) -> Result<bool, ClientError> {
        self.call::<ops::SupportNfc>(&NoInput {}).await
    }

    /// Start a barcode scan. The value arrives as `scanBarcodeResult`.
    pub async fn scan_barcode(&self) -> Result<CorrelationId, ClientError> {
        self.call::<ops::ScanBarcode>(&NoInput {}).await
    }

    /// Start a code scan. The value arrives as `scanCodeResult`.
    pub async fn scan_code(&self) -> Result<CorrelationId, ClientError> {
        self.call::<ops::ScanCode>(&NoInput {}).await
    }

    /// Start reading an NFC tag. The value arrives as `readNfcTagResult`.
    pub async fn read_nfc_tag(&self) -> Result<CorrelationId, ClientError> {
        self.call::<ops::ReadNfcTag>(&NoInput {}).await
    }

    /// Start picking photos. The assets arrive as `pickPhotoResult`.
    ///
    /// `options` are layered over the configured photo defaults first.
    pub async fn pick_photo(&self, options: PickImageOptions) -> Result<CorrelationId, ClientError> {
        let merged = merge_pick_options(&self.config.photo_defaults, options)?;
        self.call::<ops::PickPhoto>(&merged).await
    }

    /// Start editing a photo. The edited asset arrives as `editPhotoResult`.
    pub async fn edit_photo(&self, options: EditPhotoOptions) -> Result<CorrelationId, ClientError> {
        let merged = merge_edit_options(&self.config.photo_defaults, options)?;
        self.call::<ops::EditPhoto>(&merged).await
    }

    /// Push the sync payload to the host.
    pub async fn set_sync_payload(&self, payload: &SyncPayload) -> Result<(), ClientError> {
        tracing::info!(version = payload.version(), database = payload.database(), "pushing sync payload");
        self.call::<ops::SetSyncPayload>(payload).await
    }

    // ===========================================
    // Events
    // ===========================================

    /// Register `handler` for every future firing of `event`.
    ///
    /// Registration is additive; earlier listeners stay registered.
    pub fn subscribe<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.registry().add(event, Arc::new(handler));
        tracing::debug!(event, id = id.value(), "listener added");
        Subscription::new(id, event, &self.listeners)
    }

    /// Register a typed handler for the result event of `O`.
    ///
    /// Payloads that do not decode are logged and skipped.
    pub fn subscribe_result<O, F>(&self, handler: F) -> Subscription
    where
        O: ResultOperation + 'static,
        F: Fn(OperationResult<O::Result>) + Send + Sync + 'static,
    {
        let event = O::result_event();
        self.subscribe(event, move |payload| {
            match serde_json::from_value::<OperationResult<O::Result>>(payload.clone()) {
                Ok(result) => handler(result),
                Err(e) => tracing::warn!(event, error = %e, "skipping undecodable result event"),
            }
        })
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry().count(event)
    }

    /// Deliver `event` to its listeners, in registration order.
    ///
    /// Listeners added or removed by a handler take effect from the next
    /// delivery. Returns the number of listeners invoked.
    ///
    /// A result event goes to its `await_result` waiter first. It is parked
    /// for a later `await_result` only if nobody waits and no listener
    /// receives it.
    pub fn dispatch(&self, event: &HostEvent) -> usize {
        let handlers = self.registry().snapshot(&event.name);
        if event.result_of().is_some() {
            self.complete_result(event, handlers.is_empty());
        }

        for handler in &handlers {
            handler(&event.payload);
        }
        tracing::debug!(event = %event.name, listeners = handlers.len(), "event dispatched");
        handlers.len()
    }

    /// Receive one event from the transport and dispatch it.
    pub async fn dispatch_next(&self) -> Result<usize, ClientError> {
        let event = self.transport.recv_event().await?;
        Ok(self.dispatch(&event))
    }

    /// Dispatch events until the host closes the event channel.
    pub async fn run_events(&self) -> Result<(), ClientError> {
        loop {
            match self.transport.recv_event().await {
                Ok(event) => {
                    self.dispatch(&event);
                }
                Err(TransportError::ConnectionClosed) => {
                    tracing::debug!("event channel closed");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "event loop stopped");
                    return Err(e.into());
                }
            }
        }
    }

    // ===========================================
    // Correlated results
    // ===========================================

    fn complete_result(&self, event: &HostEvent, park: bool) {
        let Some(id) = event
            .payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<CorrelationId>().ok())
        else {
            return;
        };

        let value = event.payload.clone();
        if !park {
            let claimed = self.waiters().claim(id, value);
            if let Ok((waiter, value)) = claimed {
                if waiter.send(value).is_err() {
                    tracing::debug!(%id, "result waiter went away");
                }
            }
            return;
        }

        let completion = self.waiters().complete(id, value);
        match completion {
            Completion::Claimed(waiter, value) => {
                if waiter.send(value).is_err() {
                    tracing::debug!(%id, "result waiter went away");
                }
            }
            Completion::Parked { evicted: Some(old) } => {
                tracing::debug!(%old, "dropped unclaimed result");
            }
            Completion::Parked { evicted: None } => {}
        }
    }

    /// Wait for the result event of `id`.
    ///
    /// Something must be dispatching events meanwhile (`run_events` on
    /// another task). A result that arrived before this call is returned at
    /// once, unless a listener for its event already received it. Gives up
    /// after the configured result timeout.
    pub async fn await_result<O: ResultOperation>(
        &self,
        id: CorrelationId,
    ) -> Result<O::Result, ClientError> {
        let rx = {
            let mut waiters = self.waiters();
            if let Some(value) = waiters.take_parked(&id) {
                return decode_result::<O>(value);
            }
            let (tx, rx) = oneshot::channel();
            waiters.expect(id, tx);
            rx
        };

        match tokio::time::timeout(self.config.result_timeout, rx).await {
            Ok(Ok(value)) => decode_result::<O>(value),
            Ok(Err(_)) => Err(ClientError::ResultAbandoned(id)),
            Err(_) => {
                self.waiters().forget(&id);
                let operation = O::OPERATION;
                tracing::warn!(%id, %operation, "result timed out");
                Err(ClientError::ResultTimeout(id))
            }
        }
    }

    /// Call `O` and wait for its result event.
    pub async fn call_for_result<O: ResultOperation>(
        &self,
        input: &O::Input,
    ) -> Result<O::Result, ClientError> {
        let id = self.call::<O>(input).await?;
        self.await_result::<O>(id).await
    }

    /// Stop waiting for `id` and drop its result if it already arrived.
    ///
    /// This is the only cancellation there is; the host is not told.
    pub fn forget_result(&self, id: &CorrelationId) -> bool {
        self.waiters().forget(id)
    }
}

fn decode_result<O: ResultOperation>(value: Value) -> Result<O::Result, ClientError> {
    serde_json::from_value::<OperationResult<O::Result>>(value)
        .map(|result| result.body)
        .map_err(|source| ClientError::ShapeMismatch {
            operation: O::OPERATION,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockHost;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use webbridge_types::{NfcTagResult, PickSource, Setting, SyncPayloadV2};

    fn client() -> (MockHost, BridgeClient<MockHost>) {
        let host = MockHost::new();
        let client = BridgeClient::new(host.clone());
        (host, client)
    }

    fn recorder() -> Arc<StdMutex<Vec<String>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    // ===========================================
    // Configuration Tests
    // ===========================================

    #[test]
    fn config_builder_pattern() {
        let config = ClientConfig::default()
            .with_result_timeout(Duration::from_secs(5))
            .with_max_parked_results(8);

        assert_eq!(config.result_timeout, Duration::from_secs(5));
        assert_eq!(config.max_parked_results, 8);
        assert_eq!(config.photo_defaults, PickDefaults::default());
    }

    // ===========================================
    // Call Tests
    // ===========================================

    #[tokio::test]
    async fn support_nfc_false_is_a_value_not_a_failure() {
        let (host, client) = client();
        host.respond(Operation::SupportNfc, json!(false));

        assert!(!client.support_nfc().await.unwrap());
        let request = host.last_request().unwrap();
        assert_eq!(request.operation, Operation::SupportNfc);
        assert_eq!(request.input, json!({}));
    }

    #[tokio::test]
    async fn conformant_replies_decode() {
        let (host, client) = client();
        host.respond(Operation::GetColorScheme, json!("dark"));
        host.respond(Operation::GetDimensions, json!({"width": 390.0, "height": 844.0}));
        host.respond(Operation::Query, json!({"rows": [{"id": 1}]}));

        assert_eq!(client.color_scheme().await.unwrap(), ColorScheme::Dark);
        assert_eq!(client.dimensions().await.unwrap(), ScaledSize::new(390.0, 844.0));
        let output = client.query(&QueryInput::table("location")).await.unwrap();
        assert_eq!(output.rows.len(), 1);
    }

    #[tokio::test]
    async fn non_conformant_reply_is_shape_mismatch() {
        let (host, client) = client();
        host.respond(Operation::GetColorScheme, json!(42));
        host.respond(Operation::SupportNfc, json!("yes"));

        assert!(matches!(
            client.color_scheme().await,
            Err(ClientError::ShapeMismatch { operation: Operation::GetColorScheme, .. })
        ));
        assert!(matches!(
            client.support_nfc().await,
            Err(ClientError::ShapeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn host_failures_map_to_errors() {
        let (host, client) = client();
        host.fail(Operation::SupportNfc, FailureKind::Unsupported);
        host.fail(Operation::ScanBarcode, FailureKind::Cancelled);
        host.fail(Operation::PickPhoto, FailureKind::PermissionDenied);
        host.queue_reply(
            Operation::GetDimensions,
            Reply::failure(FailureKind::Internal, Some("display gone".to_string())),
        );

        assert!(matches!(
            client.support_nfc().await,
            Err(ClientError::Unsupported(Operation::SupportNfc))
        ));
        assert!(matches!(
            client.scan_barcode().await,
            Err(ClientError::Cancelled(Operation::ScanBarcode))
        ));
        assert!(matches!(
            client.pick_photo(PickImageOptions::new(PickSource::Camera)).await,
            Err(ClientError::PermissionDenied(Operation::PickPhoto))
        ));
        match client.dimensions().await {
            Err(ClientError::Host { message, .. }) => assert_eq!(message, "display gone"),
            other => panic!("expected host error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_operation_fails() {
        let (_host, client) = client();
        assert!(matches!(
            client.query(&QueryInput::table("location")).await,
            Err(ClientError::UnknownOperation(Operation::Query))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_fails_with_transport_error() {
        let (host, client) = client();
        host.respond(Operation::SupportNfc, json!(true));
        host.set_unreachable(true);

        assert!(!client.is_available());
        assert!(matches!(
            client.support_nfc().await,
            Err(ClientError::Transport(TransportError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn failed_call_can_be_retried() {
        let (host, client) = client();
        host.respond(Operation::GetColorScheme, json!("light"));
        host.fail_next_request("bridge detached");

        assert!(client.color_scheme().await.is_err());
        assert_eq!(client.color_scheme().await.unwrap(), ColorScheme::Light);
    }

    #[tokio::test]
    async fn concurrent_calls_resolve_independently() {
        let (host, client) = client();
        host.respond(Operation::SupportNfc, json!(true));
        host.fail(Operation::GetColorScheme, FailureKind::Unsupported);

        let (nfc, scheme) = tokio::join!(client.support_nfc(), client.color_scheme());

        assert!(nfc.unwrap());
        assert!(scheme.is_err());
        assert_eq!(host.requests().len(), 2);
    }

    #[tokio::test]
    async fn pick_photo_sends_merged_options() {
        let (host, client) = client();
        host.respond_with_result(Operation::PickPhoto, json!({"assets": []}));

        let options = PickImageOptions::new(PickSource::ImageLibrary).editing_type(Setting::Unset);
        client.pick_photo(options).await.unwrap();

        let input = host.last_request().unwrap().input;
        assert_eq!(input["type"], json!("imageLibrary"));
        assert_eq!(input["cameraType"], json!("back"));
        assert_eq!(input["quality"], json!(1.0));
        assert!(input.get("editingType").is_none());
    }

    #[tokio::test]
    async fn invalid_pick_options_are_not_sent() {
        let (host, client) = client();

        let result = client.pick_photo(PickImageOptions::default()).await;

        assert!(matches!(
            result,
            Err(ClientError::InvalidOptions(OptionsError::MissingSource))
        ));
        assert!(host.requests().is_empty());
    }

    #[tokio::test]
    async fn set_sync_payload_sends_versioned_object() {
        let (host, client) = client();
        host.respond(Operation::SetSyncPayload, Value::Null);
        let payload = SyncPayload::V2(SyncPayloadV2 {
            database: "database/database.zip".into(),
            tables: vec!["location".into()],
            maps: vec![],
        });

        client.set_sync_payload(&payload).await.unwrap();

        assert_eq!(
            host.last_request().unwrap().input,
            json!({"version": 2, "database": "database/database.zip", "tables": ["location"], "maps": []})
        );
    }

    // ===========================================
    // Subscription Tests
    // ===========================================

    #[test]
    fn all_listeners_invoked_once_in_order() {
        let (_host, client) = client();
        let seen = recorder();
        for n in 0..3 {
            let seen = Arc::clone(&seen);
            client.subscribe("tick", move |_| seen.lock().unwrap().push(format!("h{n}")));
        }

        let invoked = client.dispatch(&HostEvent::new("tick", json!(null)));

        assert_eq!(invoked, 3);
        assert_eq!(*seen.lock().unwrap(), vec!["h0", "h1", "h2"]);
    }

    #[test]
    fn unsubscribe_excludes_only_that_listener() {
        let (_host, client) = client();
        let seen = recorder();
        let mut subs = Vec::new();
        for n in 0..3 {
            let seen = Arc::clone(&seen);
            subs.push(client.subscribe("tick", move |_| seen.lock().unwrap().push(format!("h{n}"))));
        }

        assert!(subs.remove(1).unsubscribe());
        client.dispatch(&HostEvent::new("tick", json!(null)));

        assert_eq!(*seen.lock().unwrap(), vec!["h0", "h2"]);
        assert_eq!(client.listener_count("tick"), 2);
    }

    #[test]
    fn nfc_result_handler_called_once_with_payload() {
        let (_host, client) = client();
        let payloads = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&payloads);
        client.subscribe("readNfcTagResult", move |p| sink.lock().unwrap().push(p.clone()));

        client.dispatch(&HostEvent::new("readNfcTagResult", json!({"value": "04A3F2"})));

        assert_eq!(*payloads.lock().unwrap(), vec![json!({"value": "04A3F2"})]);
    }

    #[test]
    fn other_event_names_are_not_delivered() {
        let (_host, client) = client();
        let seen = recorder();
        let sink = Arc::clone(&seen);
        client.subscribe("scanBarcodeResult", move |_| sink.lock().unwrap().push("scan".into()));

        assert_eq!(client.dispatch(&HostEvent::new("scanCodeResult", json!({}))), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn same_handler_registered_twice_fires_twice() {
        let (_host, client) = client();
        let seen = recorder();
        let handler = {
            let seen = Arc::clone(&seen);
            move |_: &Value| seen.lock().unwrap().push("h".into())
        };
        client.subscribe("tick", handler.clone());
        client.subscribe("tick", handler);

        client.dispatch(&HostEvent::new("tick", json!(null)));

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn subscribing_during_dispatch_applies_next_time() {
        let host = MockHost::new();
        let client = Arc::new(BridgeClient::new(host));
        let seen = recorder();

        let inner_client = Arc::clone(&client);
        let inner_seen = Arc::clone(&seen);
        client.subscribe("tick", move |_| {
            let seen = Arc::clone(&inner_seen);
            inner_client.subscribe("tick", move |_| seen.lock().unwrap().push("late".into()));
        });

        assert_eq!(client.dispatch(&HostEvent::new("tick", json!(null))), 1);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(client.dispatch(&HostEvent::new("tick", json!(null))), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn concurrent_subscribes_keep_per_name_order() {
        let (_host, client) = client();
        let client = Arc::new(client);
        let seen = Arc::new(StdMutex::new(Vec::<(usize, usize)>::new()));

        let threads: Vec<_> = (0..8)
            .map(|lane| {
                let client = Arc::clone(&client);
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || {
                    for k in 0..25 {
                        let sink = Arc::clone(&seen);
                        client.subscribe(&format!("lane{lane}"), move |_| {
                            sink.lock().unwrap().push((lane, k))
                        });
                        client.subscribe("shared", |_| {});
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(client.listener_count("shared"), 200);
        for lane in 0..8 {
            let name = format!("lane{lane}");
            assert_eq!(client.listener_count(&name), 25);

            seen.lock().unwrap().clear();
            assert_eq!(client.dispatch(&HostEvent::new(name.as_str(), json!(null))), 25);
            let expected: Vec<_> = (0..25).map(|k| (lane, k)).collect();
            assert_eq!(*seen.lock().unwrap(), expected);
        }
        assert_eq!(client.dispatch(&HostEvent::new("shared", json!(null))), 200);
    }

    #[test]
    fn unsubscribe_twice_or_after_drop_is_false() {
        let (_host, client) = client();
        let sub = client.subscribe("tick", |_| {});
        let id = sub.id();
        assert_eq!(sub.event(), "tick");
        assert!(sub.unsubscribe());

        let again = Subscription::new(id, "tick", &client.listeners);
        assert!(!again.unsubscribe());

        let orphan = client.subscribe("tick", |_| {});
        drop(client);
        assert!(!orphan.unsubscribe());
    }

    #[test]
    fn typed_result_subscription_skips_bad_payloads() {
        let (_host, client) = client();
        let tags = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&tags);
        client.subscribe_result::<ops::ReadNfcTag, _>(move |result| {
            sink.lock().unwrap().push(result.body)
        });

        client.dispatch(&HostEvent::new("readNfcTagResult", json!({"value": 7})));
        client.dispatch(&HostEvent::new("readNfcTagResult", json!({"value": "04A3F2"})));

        assert_eq!(
            *tags.lock().unwrap(),
            vec![NfcTagResult { value: "04A3F2".into() }]
        );
    }

    // ===========================================
    // Event Loop Tests
    // ===========================================

    #[tokio::test]
    async fn dispatch_next_pulls_from_transport() {
        let (host, client) = client();
        let seen = recorder();
        let sink = Arc::clone(&seen);
        client.subscribe("ping", move |_| sink.lock().unwrap().push("ping".into()));

        host.emit("ping", json!(null));

        assert_eq!(client.dispatch_next().await.unwrap(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_events_ends_when_channel_closes() {
        let (host, client) = client();
        let seen = recorder();
        let sink = Arc::clone(&seen);
        client.subscribe("ping", move |_| sink.lock().unwrap().push("ping".into()));

        host.emit("ping", json!(null));
        host.emit("ping", json!(null));
        host.close_events();

        client.run_events().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    // ===========================================
    // Correlated Result Tests
    // ===========================================

    #[tokio::test]
    async fn early_result_is_parked_for_await() {
        let (host, client) = client();
        host.respond_with_result(Operation::ReadNfcTag, json!({"value": "04A3F2"}));

        let id = client.read_nfc_tag().await.unwrap();
        client.dispatch_next().await.unwrap();

        let tag = client.await_result::<ops::ReadNfcTag>(id).await.unwrap();
        assert_eq!(tag.value, "04A3F2");
    }

    #[tokio::test]
    async fn call_for_result_with_event_loop() {
        let host = MockHost::new();
        host.respond_with_result(
            Operation::ScanBarcode,
            json!({"value": "4006381333931", "format": "ean13"}),
        );
        let client = Arc::new(BridgeClient::new(host.clone()));

        let pump = Arc::clone(&client);
        let events = tokio::spawn(async move { pump.run_events().await });

        let scan = client
            .call_for_result::<ops::ScanBarcode>(&NoInput {})
            .await
            .unwrap();
        assert_eq!(scan.value, "4006381333931");

        host.close_events();
        events.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn await_result_times_out() {
        let host = MockHost::new();
        let config = ClientConfig::default().with_result_timeout(Duration::from_secs(2));
        let client = BridgeClient::with_config(config, host);
        let id = CorrelationId::new();

        let result = client.await_result::<ops::ScanCode>(id).await;

        assert!(matches!(result, Err(ClientError::ResultTimeout(t)) if t == id));
        assert!(!client.forget_result(&id));
    }

    #[tokio::test]
    async fn forgotten_result_is_not_returned() {
        let (host, client) = client();
        host.respond_with_result(Operation::ReadNfcTag, json!({"value": "04A3F2"}));

        let id = client.read_nfc_tag().await.unwrap();
        client.dispatch_next().await.unwrap();

        assert!(client.forget_result(&id));
        assert!(!client.forget_result(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn result_handled_by_listener_is_not_parked() {
        let host = MockHost::new();
        host.respond_with_result(Operation::ReadNfcTag, json!({"value": "04A3F2"}));
        let config = ClientConfig::default().with_result_timeout(Duration::from_secs(1));
        let client = BridgeClient::with_config(config, host);
        let _listener = client.subscribe("readNfcTagResult", |_| {});

        let id = client.read_nfc_tag().await.unwrap();
        assert_eq!(client.dispatch_next().await.unwrap(), 1);

        assert!(!client.forget_result(&id));
        let result = client.await_result::<ops::ReadNfcTag>(id).await;
        assert!(matches!(result, Err(ClientError::ResultTimeout(_))));
    }

    #[tokio::test]
    async fn waiter_and_listener_both_receive_result() {
        let host = MockHost::new();
        host.respond_with_result(Operation::ScanCode, json!({"value": "WO-1182"}));
        let client = Arc::new(BridgeClient::new(host.clone()));
        let seen = recorder();
        let sink = Arc::clone(&seen);
        client.subscribe("scanCodeResult", move |_| sink.lock().unwrap().push("scan".into()));

        let pump = Arc::clone(&client);
        let events = tokio::spawn(async move { pump.run_events().await });

        let scan = client
            .call_for_result::<ops::ScanCode>(&NoInput {})
            .await
            .unwrap();
        assert_eq!(scan.value, "WO-1182");

        host.close_events();
        events.await.unwrap().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["scan"]);
    }

    #[tokio::test]
    async fn malformed_result_is_shape_mismatch() {
        let (_host, client) = client();
        let id = CorrelationId::new();
        client.dispatch(&HostEvent::new(
            "pickPhotoResult",
            json!({"id": id.to_string(), "assets": "nope"}),
        ));

        assert!(matches!(
            client.await_result::<ops::PickPhoto>(id).await,
            Err(ClientError::ShapeMismatch { operation: Operation::PickPhoto, .. })
        ));
    }
}
