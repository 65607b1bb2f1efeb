use std::os::raw::c_void;
use std::sync::{Arc, Mutex};

use libloading::{Library, Symbol};

use crate::stream::error::StreamError;
use crate::types::RunMode;

/// One reading from the platform proximity driver. Drivers either report a
/// real distance or only a near/far flag, never both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityReading {
    pub distance_cm: Option<f64>,
    pub near: Option<bool>,
}

impl ProximityReading {
    pub fn distance(cm: f64) -> Self {
        Self {
            distance_cm: Some(cm),
            near: None,
        }
    }

    pub fn near_flag(near: bool) -> Self {
        Self {
            distance_cm: None,
            near: Some(near),
        }
    }

    /// Normalize to centimeters. A numeric distance passes through; a bare
    /// near flag maps `true -> 0`, `false` or absent `-> 100`. Kept
    /// bit-for-bit compatible with the existing device app.
    pub fn value_cm(&self) -> f64 {
        match self.distance_cm {
            Some(cm) => cm,
            None => {
                if self.near.unwrap_or(false) {
                    0.0
                } else {
                    100.0
                }
            }
        }
    }
}

pub type ReadingHandler = Box<dyn FnMut(ProximityReading) + Send + 'static>;

/// Capability seam for the optional proximity sensor. Selected once at
/// startup by `probe_provider`; components never probe the platform ad hoc.
pub trait ProximityProvider: Send + Sync {
    fn is_available(&self) -> bool;

    /// Register a handler invoked at the driver's own cadence. The handler
    /// stays alive until the returned handle is unsubscribed or dropped.
    fn subscribe(&self, handler: ReadingHandler) -> Result<SubscriptionHandle, StreamError>;
}

/// Owns the teardown of one sensor subscription. `unsubscribe` is idempotent
/// and infallible; dropping the handle unsubscribes as well.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Stand-in provider for platforms without the native module. Never errors
/// anywhere except `subscribe`, which callers are expected not to reach once
/// they have seen `is_available() == false`.
pub struct UnavailableSensorProvider;

impl ProximityProvider for UnavailableSensorProvider {
    fn is_available(&self) -> bool {
        false
    }

    fn subscribe(&self, _handler: ReadingHandler) -> Result<SubscriptionHandle, StreamError> {
        Err(StreamError::ModuleUnavailable)
    }
}

type RawReadingCallback = unsafe extern "C" fn(f64, i32, *mut c_void);
type FnSubscribe = unsafe extern "C" fn(RawReadingCallback, *mut c_void) -> i32;
type FnUnsubscribe = unsafe extern "C" fn(i32) -> i32;

const SYM_SUBSCRIBE: &[u8] = b"ds_proximity_subscribe";
const SYM_UNSUBSCRIBE: &[u8] = b"ds_proximity_unsubscribe";

/// Bridge from the driver's C callback to the boxed Rust handler. A negative
/// distance means the driver only knows the near/far flag.
unsafe extern "C" fn reading_trampoline(distance_cm: f64, near: i32, user: *mut c_void) {
    let handler = &mut *(user as *mut ReadingHandler);
    let reading = if distance_cm >= 0.0 {
        ProximityReading::distance(distance_cm)
    } else {
        ProximityReading::near_flag(near != 0)
    };
    handler(reading);
}

/// Provider backed by the platform proximity module, loaded dynamically.
pub struct NativeSensorProvider {
    lib: Arc<Library>,
}

impl NativeSensorProvider {
    /// Load the native module and resolve both entry points up front.
    /// Any failure is `ModuleUnavailable`; this never panics.
    pub fn load() -> Result<Self, StreamError> {
        unsafe {
            let lib = Library::new("deepspectrum_proximity.dll")
                .or_else(|_| Library::new("libdeepspectrum_proximity.so"))
                .map_err(|_| StreamError::ModuleUnavailable)?;
            lib.get::<FnSubscribe>(SYM_SUBSCRIBE)
                .map_err(|_| StreamError::ModuleUnavailable)?;
            lib.get::<FnUnsubscribe>(SYM_UNSUBSCRIBE)
                .map_err(|_| StreamError::ModuleUnavailable)?;
            Ok(Self { lib: Arc::new(lib) })
        }
    }
}

impl ProximityProvider for NativeSensorProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&self, handler: ReadingHandler) -> Result<SubscriptionHandle, StreamError> {
        // The handler is leaked across the C boundary for the lifetime of the
        // subscription and reclaimed in the cancel closure. The driver must
        // not invoke the callback after unsubscribe returns.
        let subscribe: Symbol<FnSubscribe> = unsafe { self.lib.get(SYM_SUBSCRIBE) }
            .map_err(|e| StreamError::Subscription(e.to_string()))?;
        let user = Box::into_raw(Box::new(handler)) as usize;
        let id = unsafe { subscribe(reading_trampoline, user as *mut c_void) };
        if id < 0 {
            unsafe { drop(Box::from_raw(user as *mut ReadingHandler)) };
            return Err(StreamError::Subscription(format!("driver returned {id}")));
        }
        let lib = Arc::clone(&self.lib);
        Ok(SubscriptionHandle::new(move || unsafe {
            if let Ok(unsubscribe) = lib.get::<FnUnsubscribe>(SYM_UNSUBSCRIBE) {
                unsubscribe(id);
            }
            drop(Box::from_raw(user as *mut ReadingHandler));
        }))
    }
}

/// In-memory provider useful for tests and deterministic playback.
#[derive(Clone, Default)]
pub struct ManualProvider {
    slot: Arc<Mutex<Option<ReadingHandler>>>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a reading to the current subscriber, if any.
    pub fn emit(&self, reading: ProximityReading) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(handler) = slot.as_mut() {
                handler(reading);
            }
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl ProximityProvider for ManualProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&self, handler: ReadingHandler) -> Result<SubscriptionHandle, StreamError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(handler);
        }
        let slot = Arc::clone(&self.slot);
        Ok(SubscriptionHandle::new(move || {
            if let Ok(mut slot) = slot.lock() {
                slot.take();
            }
        }))
    }
}

/// Perform the platform probe exactly once at startup. Demo mode never
/// touches the native module; live mode downgrades gracefully when the
/// module is missing or incompatible.
pub fn probe_provider(run_mode: RunMode) -> Arc<dyn ProximityProvider> {
    match run_mode {
        RunMode::Demo => Arc::new(UnavailableSensorProvider),
        RunMode::Live => match NativeSensorProvider::load() {
            Ok(provider) => {
                log::info!("proximity module loaded");
                Arc::new(provider)
            }
            Err(err) => {
                log::warn!("proximity module unavailable: {err}");
                Arc::new(UnavailableSensorProvider)
            }
        },
    }
}
