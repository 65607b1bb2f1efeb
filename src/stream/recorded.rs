//! Static recorded-measurement dataset and its presentation projections.
//!
//! Everything here is pure data shaping: the dataset is built once per
//! widget mount and the three views are derived on demand without touching
//! the samples.

/// One point of the recorded dataset. `index` is 1-based to match the
/// device app's tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedSample {
    pub index: u32,
    pub value: i32,
}

/// `round(30 + 70*abs(sin(i/4)))` for `i in 0..n`; values stay in 0..=100.
pub fn build_sample(n: usize) -> Vec<RecordedSample> {
    (0..n)
        .map(|i| RecordedSample {
            index: i as u32 + 1,
            value: (30.0 + 70.0 * (i as f64 / 4.0).sin().abs()).round() as i32,
        })
        .collect()
}

// Chart space of the device app's recorded widget: a 320x220 canvas with
// the plot origin at x=40, a 260-wide x span, the baseline at y=200 and
// 160 px of height for the 0..120 value range.
pub const CHART_WIDTH: f32 = 320.0;
pub const CHART_HEIGHT: f32 = 220.0;
pub const PLOT_ORIGIN_X: f32 = 40.0;
pub const PLOT_SPAN_X: f32 = 260.0;
pub const BASELINE_Y: f32 = 200.0;
pub const VALUE_SPAN_Y: f32 = 160.0;
pub const VALUE_RANGE: f32 = 120.0;
pub const BAR_WIDTH: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarShape {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// Which presentation of the recorded dataset is showing. Switching views
/// is pure UI state; the dataset itself never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedView {
    Scatter,
    Bar,
    Table,
}

fn x_position(i: usize, count: usize) -> f32 {
    let step = PLOT_SPAN_X / (count.saturating_sub(1).max(1)) as f32;
    PLOT_ORIGIN_X + i as f32 * step
}

fn y_position(value: i32) -> f32 {
    BASELINE_Y - (value as f32 / VALUE_RANGE) * VALUE_SPAN_Y
}

/// Point positions in the fixed chart space.
pub fn scatter_projection(samples: &[RecordedSample]) -> Vec<ScatterPoint> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| ScatterPoint {
            x: x_position(i, samples.len()),
            y: y_position(s.value),
        })
        .collect()
}

/// Value-proportional bars anchored at the baseline.
pub fn bar_projection(samples: &[RecordedSample]) -> Vec<BarShape> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| BarShape {
            x: x_position(i, samples.len()),
            width: BAR_WIDTH,
            height: (s.value as f32 / VALUE_RANGE) * VALUE_SPAN_Y,
        })
        .collect()
}

/// Raw index/value rows for the table view.
pub fn table_projection(samples: &[RecordedSample]) -> Vec<(u32, i32)> {
    samples.iter().map(|s| (s.index, s.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_shape_and_range() {
        let samples = build_sample(30);
        assert_eq!(samples.len(), 30);
        for (i, s) in samples.iter().enumerate() {
            assert_eq!(s.index, i as u32 + 1);
            assert!((0..=100).contains(&s.value), "out of range: {}", s.value);
        }
    }

    #[test]
    fn dataset_is_pure() {
        assert_eq!(build_sample(30), build_sample(30));
        assert!(build_sample(0).is_empty());
    }

    #[test]
    fn scatter_points_stay_in_chart_space() {
        let samples = build_sample(30);
        let points = scatter_projection(&samples);
        assert_eq!(points.len(), samples.len());
        for p in &points {
            assert!(p.x >= PLOT_ORIGIN_X && p.x <= CHART_WIDTH);
            assert!(p.y >= 0.0 && p.y <= BASELINE_Y);
        }
        assert_eq!(points[0].x, PLOT_ORIGIN_X);
        let last = points.last().unwrap();
        assert!((last.x - (PLOT_ORIGIN_X + PLOT_SPAN_X)).abs() < 1e-3);
    }

    #[test]
    fn bar_heights_are_value_proportional() {
        let samples = build_sample(10);
        let bars = bar_projection(&samples);
        for (bar, sample) in bars.iter().zip(&samples) {
            let expected = (sample.value as f32 / VALUE_RANGE) * VALUE_SPAN_Y;
            assert!((bar.height - expected).abs() < 1e-4);
            assert_eq!(bar.width, BAR_WIDTH);
        }
    }

    #[test]
    fn table_rows_match_samples() {
        let samples = build_sample(5);
        let rows = table_projection(&samples);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], (1, samples[0].value));
        assert_eq!(rows[4], (5, samples[4].value));
    }

    #[test]
    fn projections_leave_the_dataset_untouched() {
        let samples = build_sample(30);
        let before = samples.clone();
        let _ = scatter_projection(&samples);
        let _ = bar_projection(&samples);
        let _ = table_projection(&samples);
        assert_eq!(samples, before);
    }

    #[test]
    fn single_sample_projects_at_the_origin() {
        let samples = build_sample(1);
        let points = scatter_projection(&samples);
        assert_eq!(points[0].x, PLOT_ORIGIN_X);
    }
}
