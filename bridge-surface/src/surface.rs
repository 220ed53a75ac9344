//! The demo page wired to a bridge client.
//!
//! Holds no bridge of its own: the client is injected and may be shared with
//! other components.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use webbridge_client::{BridgeClient, ClientError, HostTransport, Subscription};
use webbridge_core::{build_current_payload, PayloadConfig};
use webbridge_types::ops::{self, OperationResult, ResultOperation};
use webbridge_types::{
    ColorScheme, CorrelationId, EditPhotoOptions, PhotoResult, PickImageOptions, QueryInput,
    QueryOutput, ScaledSize, SyncPayload,
};

use crate::error::SurfaceError;
use crate::state::SurfaceState;

/// Configuration for [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct SurfaceConfig {
    /// Assets announced to the host on mount.
    pub payload: PayloadConfig,
}

/// The demo page.
pub struct Surface<T: HostTransport> {
    client: Arc<BridgeClient<T>>,
    config: SurfaceConfig,
    state: Arc<Mutex<SurfaceState>>,
    subscriptions: Mutex<Vec<Subscription>>,
    // Set from the start of a mount until unmount.
    claimed: AtomicBool,
}

impl<T: HostTransport> Surface<T> {
    /// Create an unmounted surface.
    pub fn new(client: Arc<BridgeClient<T>>, config: SurfaceConfig) -> Self {
        Self {
            client,
            config,
            state: Arc::new(Mutex::new(SurfaceState::default())),
            subscriptions: Mutex::new(Vec::new()),
            claimed: AtomicBool::new(false),
        }
    }

    /// The shared bridge client.
    pub fn client(&self) -> &Arc<BridgeClient<T>> {
        &self.client
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SurfaceState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SurfaceState> {
        lock(&self.state)
    }

    /// True once `mount` succeeded.
    pub fn is_mounted(&self) -> bool {
        !lock(&self.subscriptions).is_empty()
    }

    /// Push the sync payload and start listening for results.
    ///
    /// The payload goes out once per mount; mounting a surface that is
    /// mounted or mounting does nothing and returns false. If the push fails
    /// the surface stays unmounted and `mount` may be retried.
    pub async fn mount(&self) -> Result<bool, SurfaceError> {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        let payload = SyncPayload::V2(build_current_payload(&self.config.payload));
        let pushed = self.client.set_sync_payload(&payload).await;
        if let Err(e) = self.record(pushed) {
            self.claimed.store(false, Ordering::Release);
            return Err(e);
        }

        let subscriptions = vec![
            self.on_result::<ops::ScanBarcode, _>(|state, scan| state.last_scan = Some(scan)),
            self.on_result::<ops::ScanCode, _>(|state, scan| state.last_scan = Some(scan)),
            self.on_result::<ops::ReadNfcTag, _>(|state, tag| state.last_tag = Some(tag)),
            self.on_result::<ops::PickPhoto, _>(|state, photos: PhotoResult| {
                state.photos = photos.assets
            }),
            self.on_result::<ops::EditPhoto, _>(|state, photos: PhotoResult| {
                state.photos = photos.assets
            }),
        ];

        *lock(&self.subscriptions) = subscriptions;
        self.lock_state().payload_pushed = true;
        tracing::info!(database = payload.database(), "surface mounted");
        Ok(true)
    }

    /// Stop listening for results. The next `mount` pushes the payload again.
    ///
    /// Does nothing while a mount is still pushing.
    pub fn unmount(&self) {
        let subscriptions = std::mem::take(&mut *lock(&self.subscriptions));
        if subscriptions.is_empty() {
            return;
        }
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        self.lock_state().payload_pushed = false;
        self.claimed.store(false, Ordering::Release);
    }

    fn on_result<O, F>(&self, apply: F) -> Subscription
    where
        O: ResultOperation + 'static,
        F: Fn(&mut SurfaceState, O::Result) + Send + Sync + 'static,
    {
        let state = Arc::clone(&self.state);
        self.client
            .subscribe_result::<O, _>(move |result: OperationResult<O::Result>| {
                let mut state = lock(&state);
                state.settle(O::OPERATION, result.id);
                apply(&mut state, result.body);
            })
    }

    fn record<R>(&self, result: Result<R, ClientError>) -> Result<R, SurfaceError> {
        match result {
            Ok(value) => {
                self.lock_state().last_error = None;
                Ok(value)
            }
            Err(e) => {
                let err = SurfaceError::from(e);
                self.lock_state().last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn record_started<O: ResultOperation>(
        &self,
        result: Result<CorrelationId, ClientError>,
    ) -> Result<CorrelationId, SurfaceError> {
        let id = self.record(result)?;
        self.lock_state().start(O::OPERATION, id);
        Ok(id)
    }

    // ===========================================
    // Actions
    // ===========================================

    /// Ask the host for its color scheme.
    pub async fn refresh_color_scheme(&self) -> Result<ColorScheme, SurfaceError> {
        let scheme = self.record(self.client.color_scheme().await)?;
        self.lock_state().color_scheme = Some(scheme);
        Ok(scheme)
    }

    /// Ask the host for its window metrics.
    pub async fn refresh_dimensions(&self) -> Result<ScaledSize, SurfaceError> {
        let size = self.record(self.client.dimensions().await)?;
        self.lock_state().dimensions = Some(size);
        Ok(size)
    }

    /// Check for NFC hardware.
    pub async fn check_nfc(&self) -> Result<bool, SurfaceError> {
        let supported = self.record(self.client.support_nfc().await)?;
        self.lock_state().nfc_supported = Some(supported);
        Ok(supported)
    }

    /// Start a barcode scan.
    pub async fn scan_barcode(&self) -> Result<CorrelationId, SurfaceError> {
        let started = self.client.scan_barcode().await;
        self.record_started::<ops::ScanBarcode>(started)
    }

    /// Start a code scan.
    pub async fn scan_code(&self) -> Result<CorrelationId, SurfaceError> {
        let started = self.client.scan_code().await;
        self.record_started::<ops::ScanCode>(started)
    }

    /// Start reading an NFC tag.
    pub async fn read_nfc_tag(&self) -> Result<CorrelationId, SurfaceError> {
        let started = self.client.read_nfc_tag().await;
        self.record_started::<ops::ReadNfcTag>(started)
    }

    /// Start picking photos.
    pub async fn pick_photo(
        &self,
        options: PickImageOptions,
    ) -> Result<CorrelationId, SurfaceError> {
        let started = self.client.pick_photo(options).await;
        self.record_started::<ops::PickPhoto>(started)
    }

    /// Start editing a photo.
    pub async fn edit_photo(
        &self,
        options: EditPhotoOptions,
    ) -> Result<CorrelationId, SurfaceError> {
        let started = self.client.edit_photo(options).await;
        self.record_started::<ops::EditPhoto>(started)
    }

    /// Query a synced table.
    pub async fn query(&self, input: &QueryInput) -> Result<QueryOutput, SurfaceError> {
        let output = self.record(self.client.query(input).await)?;
        self.lock_state().rows = output.rows.clone();
        Ok(output)
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
