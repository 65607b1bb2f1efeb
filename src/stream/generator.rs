use std::time::{SystemTime, UNIX_EPOCH};

/// Deterministic pseudo-periodic sample used for placeholder streams.
///
/// `round(50 + 40*sin(t/6) + 10*sin(t/3))`, which keeps every value inside
/// 0..=100 arbitrary intensity units.
pub fn synthetic_sample(tick: f64) -> f64 {
    (50.0 + 40.0 * (tick / 6.0).sin() + 10.0 * (tick / 3.0).sin()).round()
}

/// Tick source for live cadence samples: UNIX time in fractional seconds.
pub fn wall_clock_tick() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_deterministic() {
        for tick in [0.0, 1.0, 7.5, 1234.25] {
            assert_eq!(synthetic_sample(tick), synthetic_sample(tick));
        }
    }

    #[test]
    fn zero_tick_is_midscale() {
        assert_eq!(synthetic_sample(0.0), 50.0);
    }

    #[test]
    fn values_are_rounded_and_in_range() {
        for i in 0..200 {
            let v = synthetic_sample(i as f64 * 0.37);
            assert_eq!(v.fract(), 0.0);
            assert!((0.0..=100.0).contains(&v), "out of range: {v}");
        }
    }
}
