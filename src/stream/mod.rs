// src/stream/mod.rs
pub mod error;
pub mod generator;
pub mod plot;
pub mod recorded;
pub mod sensor;
pub mod session;
pub mod window;

pub use error::StreamError;
pub use generator::{synthetic_sample, wall_clock_tick};
pub use plot::{render_recorded_png, render_stream_png, PlotStyle};
pub use recorded::{
    bar_projection, build_sample, scatter_projection, table_projection, RecordedSample,
    RecordedView,
};
pub use sensor::{
    probe_provider, ManualProvider, NativeSensorProvider, ProximityProvider, ProximityReading,
    ReadingHandler, SubscriptionHandle, UnavailableSensorProvider,
};
pub use session::{AcquisitionController, AcquisitionMode, DEFAULT_CAPACITY, DEFAULT_PERIOD};
pub use window::SlidingWindow;
