use std::fmt;

use serde::{Deserialize, Serialize};

/// How the app was composed at startup. Demo never probes platform
/// capabilities or backends; live performs the real probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Demo,
    Live,
}

impl RunMode {
    pub fn from_str_loose(value: &str) -> Option<RunMode> {
        match value.to_ascii_lowercase().as_str() {
            "demo" => Some(RunMode::Demo),
            "live" => Some(RunMode::Live),
            _ => None,
        }
    }
}

/// Widget classification driving the acquisition mode. Derived from the
/// widget title the host supplies, matching on substrings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetKind {
    /// Live stream fed by the synthetic generator.
    RealTime,
    /// Live stream fed by the proximity sensor, when present.
    Proximity,
    /// Static recorded dataset with projection views; no acquisition.
    Recorded,
    /// Plain preview; no acquisition.
    Generic,
}

impl WidgetKind {
    pub fn classify(title: &str) -> WidgetKind {
        let t = title.to_ascii_lowercase();
        let real_time =
            t.contains("real-time") || t.contains("real time") || t.contains("live");
        if real_time {
            if t.contains("proximity") {
                WidgetKind::Proximity
            } else {
                WidgetKind::RealTime
            }
        } else if ["recorded", "previous", "history", "data"]
            .iter()
            .any(|needle| t.contains(needle))
        {
            WidgetKind::Recorded
        } else {
            WidgetKind::Generic
        }
    }

    pub fn is_real_time(self) -> bool {
        matches!(self, WidgetKind::RealTime | WidgetKind::Proximity)
    }
}

/// The headline value shown next to a live plot. Sensor sessions stay at
/// `NotAvailable` until the first reading arrives; a missing module keeps
/// them there forever instead of fabricating a number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Readout {
    Idle,
    /// Arbitrary intensity units from the synthetic generator.
    Synthetic(f64),
    /// Raw (un-rounded) centimeters from the sensor.
    Proximity(f64),
    NotAvailable,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Idle => write!(f, "--"),
            Readout::Synthetic(v) => write!(f, "{v:.0} AU"),
            Readout::Proximity(v) => write!(f, "{v} cm"),
            Readout::NotAvailable => write!(f, "Not available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_classify_like_the_device_app() {
        assert_eq!(
            WidgetKind::classify("Real-Time Spectral"),
            WidgetKind::RealTime
        );
        assert_eq!(
            WidgetKind::classify("Real-Time Proximity"),
            WidgetKind::Proximity
        );
        assert_eq!(WidgetKind::classify("Live Intensity"), WidgetKind::RealTime);
        assert_eq!(
            WidgetKind::classify("Recorded Measurements"),
            WidgetKind::Recorded
        );
        assert_eq!(
            WidgetKind::classify("Previous Sessions"),
            WidgetKind::Recorded
        );
        assert_eq!(WidgetKind::classify("Device Status"), WidgetKind::Generic);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(WidgetKind::classify("REAL TIME FEED"), WidgetKind::RealTime);
        assert_eq!(WidgetKind::classify("Sync HISTORY"), WidgetKind::Recorded);
    }

    #[test]
    fn proximity_without_live_marker_is_not_a_stream() {
        // The device app only treats proximity widgets as live when the
        // title also carries a real-time marker.
        assert_eq!(
            WidgetKind::classify("Proximity Settings"),
            WidgetKind::Generic
        );
    }

    #[test]
    fn readout_renders_sentinels() {
        assert_eq!(Readout::NotAvailable.to_string(), "Not available");
        assert_eq!(Readout::Idle.to_string(), "--");
        assert_eq!(Readout::Synthetic(42.0).to_string(), "42 AU");
        assert_eq!(Readout::Proximity(12.5).to_string(), "12.5 cm");
    }

    #[test]
    fn run_mode_parses_loosely() {
        assert_eq!(RunMode::from_str_loose("Demo"), Some(RunMode::Demo));
        assert_eq!(RunMode::from_str_loose("LIVE"), Some(RunMode::Live));
        assert_eq!(RunMode::from_str_loose("prod"), None);
    }
}
