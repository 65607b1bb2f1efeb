use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::stream::generator::{synthetic_sample, wall_clock_tick};
use crate::stream::sensor::{ProximityProvider, ProximityReading, SubscriptionHandle};
use crate::stream::window::SlidingWindow;
use crate::types::{Readout, WidgetKind};

/// Default cadence of the synthetic stream.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(600);
/// Default sliding-window capacity.
pub const DEFAULT_CAPACITY: usize = 40;

/// Which resource is driving the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// Repeating timer feeding generator samples.
    Synthetic,
    /// Live subscription to the proximity driver.
    Sensor,
    /// Proximity was requested but the module is missing or refused the
    /// subscription; nothing drives the window.
    SensorUnavailable,
}

enum StreamEvent {
    Synthetic(f64),
    Sensor(ProximityReading),
}

enum SessionResource {
    Timer {
        stop_tx: Sender<()>,
        worker: JoinHandle<()>,
    },
    Sensor(SubscriptionHandle),
    None,
}

/// One live acquisition: exactly one exists per visible real-time widget.
struct AcquisitionSession {
    mode: AcquisitionMode,
    active: Arc<AtomicBool>,
    rx: Receiver<StreamEvent>,
    resource: SessionResource,
}

/// Orchestrates acquisition across widget visibility transitions. Owns the
/// sliding window; all pushes go through `pump`, so they are serialized in
/// arrival order no matter which thread produced the event.
pub struct AcquisitionController {
    provider: Arc<dyn ProximityProvider>,
    capacity: usize,
    period: Duration,
    session: Option<AcquisitionSession>,
    window: Option<SlidingWindow>,
    readout: Readout,
    pushes: u64,
}

impl AcquisitionController {
    pub fn new(provider: Arc<dyn ProximityProvider>, capacity: usize, period: Duration) -> Self {
        Self {
            provider,
            capacity,
            period,
            session: None,
            window: None,
            readout: Readout::Idle,
            pushes: 0,
        }
    }

    /// The widget became visible. Closes any prior session first, so opening
    /// the same widget twice can never stack timers or subscriptions.
    pub fn on_visible(&mut self, kind: WidgetKind) {
        self.on_hidden();
        if !kind.is_real_time() {
            return;
        }

        self.window = Some(SlidingWindow::seeded(self.capacity));
        self.pushes = 0;

        let active = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();

        let session = if kind == WidgetKind::Proximity {
            self.open_sensor_session(active, tx, rx)
        } else {
            self.open_synthetic_session(active, tx, rx)
        };
        log::debug!("acquisition session opened: {:?}", session.mode);
        self.session = Some(session);
    }

    fn open_synthetic_session(
        &mut self,
        active: Arc<AtomicBool>,
        tx: Sender<StreamEvent>,
        rx: Receiver<StreamEvent>,
    ) -> AcquisitionSession {
        let (stop_tx, stop_rx) = mpsc::channel();
        let flag = Arc::clone(&active);
        let period = self.period;
        let worker = thread::spawn(move || loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    let value = synthetic_sample(wall_clock_tick());
                    if tx.send(StreamEvent::Synthetic(value)).is_err() {
                        break;
                    }
                }
                // Stop requested, or the session was dropped.
                _ => break,
            }
        });
        AcquisitionSession {
            mode: AcquisitionMode::Synthetic,
            active,
            rx,
            resource: SessionResource::Timer { stop_tx, worker },
        }
    }

    fn open_sensor_session(
        &mut self,
        active: Arc<AtomicBool>,
        tx: Sender<StreamEvent>,
        rx: Receiver<StreamEvent>,
    ) -> AcquisitionSession {
        self.readout = Readout::NotAvailable;
        if !self.provider.is_available() {
            log::warn!("proximity module not available, widget shows sentinel");
            return AcquisitionSession {
                mode: AcquisitionMode::SensorUnavailable,
                active,
                rx,
                resource: SessionResource::None,
            };
        }

        let flag = Arc::clone(&active);
        let handler = Box::new(move |reading: ProximityReading| {
            if !flag.load(Ordering::Acquire) {
                return;
            }
            let _ = tx.send(StreamEvent::Sensor(reading));
        });
        match self.provider.subscribe(handler) {
            Ok(handle) => AcquisitionSession {
                mode: AcquisitionMode::Sensor,
                active,
                rx,
                resource: SessionResource::Sensor(handle),
            },
            Err(err) => {
                log::warn!("proximity subscription failed: {err}");
                AcquisitionSession {
                    mode: AcquisitionMode::SensorUnavailable,
                    active,
                    rx,
                    resource: SessionResource::None,
                }
            }
        }
    }

    /// The widget was closed or the controller is being torn down. Flips the
    /// active flag before releasing the resource, so in-flight events are
    /// dropped instead of landing in a dead window. No-op without a session.
    pub fn on_hidden(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.active.store(false, Ordering::Release);
        match session.resource {
            SessionResource::Timer { stop_tx, worker } => {
                let _ = stop_tx.send(());
                let _ = worker.join();
            }
            SessionResource::Sensor(mut handle) => handle.unsubscribe(),
            SessionResource::None => {}
        }
        self.window = None;
        self.readout = Readout::Idle;
        log::debug!("acquisition session closed");
    }

    /// Drain pending events into the window. Called from the UI thread once
    /// per frame; the single consumer keeps pushes strictly ordered.
    pub fn pump(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        while let Ok(event) = session.rx.try_recv() {
            if !session.active.load(Ordering::Acquire) {
                break;
            }
            match event {
                StreamEvent::Synthetic(value) => {
                    if let Some(window) = &mut self.window {
                        window.push(value);
                        self.pushes += 1;
                    }
                    self.readout = Readout::Synthetic(value);
                }
                StreamEvent::Sensor(reading) => {
                    let raw = reading.value_cm();
                    if let Some(window) = &mut self.window {
                        // The window stores the rounded value; the readout
                        // keeps the raw one.
                        window.push(raw.round());
                        self.pushes += 1;
                    }
                    self.readout = Readout::Proximity(raw);
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<AcquisitionMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    /// Owned copy of the current window, oldest first.
    pub fn snapshot(&self) -> Option<Vec<f64>> {
        self.window.as_ref().map(|w| w.to_vec())
    }

    /// `[index, value]` pairs for plotting, when a session is live.
    pub fn plot_points(&self) -> Option<Vec<[f64; 2]>> {
        self.window.as_ref().map(|w| w.points())
    }

    /// Samples applied to the window since the session opened.
    pub fn push_count(&self) -> u64 {
        self.pushes
    }
}

impl Drop for AcquisitionController {
    fn drop(&mut self) {
        self.on_hidden();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sensor::{
        ManualProvider, ReadingHandler, SubscriptionHandle, UnavailableSensorProvider,
    };
    use crate::stream::error::StreamError;

    const TEST_PERIOD: Duration = Duration::from_millis(30);

    fn synthetic_controller() -> AcquisitionController {
        AcquisitionController::new(Arc::new(UnavailableSensorProvider), 40, TEST_PERIOD)
    }

    #[test]
    fn synthetic_session_streams_into_the_window() {
        let mut controller = synthetic_controller();
        controller.on_visible(WidgetKind::RealTime);
        assert_eq!(controller.mode(), Some(AcquisitionMode::Synthetic));

        thread::sleep(TEST_PERIOD * 4);
        controller.pump();

        let snapshot = controller.snapshot().expect("window exists");
        assert_eq!(snapshot.len(), 40);
        assert!(controller.push_count() >= 2);
        let last = *snapshot.last().unwrap();
        assert_eq!(last.fract(), 0.0);
        assert!((0.0..=100.0).contains(&last));
        assert!(matches!(controller.readout(), Readout::Synthetic(_)));

        controller.on_hidden();
    }

    #[test]
    fn deactivation_tears_the_session_down() {
        let mut controller = synthetic_controller();
        controller.on_visible(WidgetKind::RealTime);
        controller.on_hidden();

        // on_hidden joins the worker, so by now there is no timer left.
        thread::sleep(TEST_PERIOD * 2);
        controller.pump();
        assert!(controller.snapshot().is_none());
        assert_eq!(controller.readout(), Readout::Idle);
        assert!(!controller.is_active());
    }

    #[test]
    fn double_activation_does_not_stack_timers() {
        let mut controller = synthetic_controller();
        controller.on_visible(WidgetKind::RealTime);
        controller.on_visible(WidgetKind::RealTime);

        // Roughly 10 periods; two live timers would double the push count.
        thread::sleep(TEST_PERIOD * 10);
        controller.pump();
        assert!(
            controller.push_count() <= 13,
            "unexpected push count {}",
            controller.push_count()
        );

        controller.on_hidden();
    }

    #[test]
    fn missing_sensor_pins_the_sentinel_and_never_mutates_the_window() {
        let mut controller = synthetic_controller();
        controller.on_visible(WidgetKind::Proximity);
        assert_eq!(controller.mode(), Some(AcquisitionMode::SensorUnavailable));

        let seeded = controller.snapshot().expect("window exists");
        thread::sleep(TEST_PERIOD * 3);
        controller.pump();

        assert_eq!(controller.readout(), Readout::NotAvailable);
        assert_eq!(controller.snapshot().unwrap(), seeded);
        assert_eq!(controller.push_count(), 0);

        controller.on_hidden();
    }

    #[test]
    fn sensor_readings_flow_through_with_normalization() {
        let provider = ManualProvider::new();
        let mut controller =
            AcquisitionController::new(Arc::new(provider.clone()), 40, TEST_PERIOD);
        controller.on_visible(WidgetKind::Proximity);
        assert_eq!(controller.mode(), Some(AcquisitionMode::Sensor));
        // No reading yet: the display must not invent one.
        assert_eq!(controller.readout(), Readout::NotAvailable);

        provider.emit(ProximityReading::distance(12.4));
        controller.pump();
        assert_eq!(controller.readout(), Readout::Proximity(12.4));
        assert_eq!(controller.snapshot().unwrap().last(), Some(&12.0));

        provider.emit(ProximityReading::near_flag(true));
        controller.pump();
        assert_eq!(controller.readout(), Readout::Proximity(0.0));
        assert_eq!(controller.snapshot().unwrap().last(), Some(&0.0));

        controller.on_hidden();
        assert!(!provider.has_subscriber());
    }

    #[test]
    fn late_sensor_callback_after_teardown_is_dropped() {
        // A provider whose unsubscribe is a no-op, so the handler outlives
        // the session like a straggling driver callback would.
        struct StickyProvider(ManualProvider);
        impl ProximityProvider for StickyProvider {
            fn is_available(&self) -> bool {
                true
            }
            fn subscribe(
                &self,
                handler: ReadingHandler,
            ) -> Result<SubscriptionHandle, StreamError> {
                // Keep the inner registration alive past unsubscribe.
                std::mem::forget(self.0.subscribe(handler)?);
                Ok(SubscriptionHandle::new(|| {}))
            }
        }

        let inner = ManualProvider::new();
        let provider = Arc::new(StickyProvider(inner.clone()));
        let mut controller = AcquisitionController::new(provider, 40, TEST_PERIOD);
        controller.on_visible(WidgetKind::Proximity);
        controller.on_hidden();

        // The active flag is down; the handler must swallow this silently.
        inner.emit(ProximityReading::distance(5.0));
        controller.pump();
        assert!(controller.snapshot().is_none());
        assert_eq!(controller.readout(), Readout::Idle);
    }

    #[test]
    fn non_realtime_kinds_open_no_session() {
        let mut controller = synthetic_controller();
        controller.on_visible(WidgetKind::Recorded);
        assert!(controller.mode().is_none());
        assert!(controller.snapshot().is_none());

        controller.on_visible(WidgetKind::Generic);
        assert!(controller.mode().is_none());
    }

    #[test]
    fn reopening_reseeds_the_window() {
        let provider = ManualProvider::new();
        let mut controller =
            AcquisitionController::new(Arc::new(provider.clone()), 8, TEST_PERIOD);

        controller.on_visible(WidgetKind::Proximity);
        let seeded = controller.snapshot().unwrap();
        provider.emit(ProximityReading::distance(1.0));
        controller.pump();
        assert_ne!(controller.snapshot().unwrap(), seeded);

        controller.on_hidden();
        controller.on_visible(WidgetKind::Proximity);
        assert_eq!(controller.snapshot().unwrap(), seeded);

        controller.on_hidden();
    }

    #[test]
    fn hidden_without_a_session_is_a_no_op() {
        let mut controller = synthetic_controller();
        controller.on_hidden();
        controller.on_hidden();
        assert!(!controller.is_active());
    }

    #[test]
    fn drop_releases_the_session() {
        let provider = ManualProvider::new();
        {
            let mut controller =
                AcquisitionController::new(Arc::new(provider.clone()), 40, TEST_PERIOD);
            controller.on_visible(WidgetKind::Proximity);
            assert!(provider.has_subscriber());
        }
        assert!(!provider.has_subscriber());
    }
}
