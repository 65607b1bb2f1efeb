use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::stream::error::StreamError;
use crate::stream::recorded::{RecordedSample, RecordedView, VALUE_RANGE};

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub accent: RGBColor,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 15),
            accent: CYAN,
        }
    }
}

/// Render the live sliding window as a line chart PNG.
pub fn render_stream_png(values: &[f64], style: PlotStyle) -> Result<Vec<u8>, StreamError> {
    if values.is_empty() {
        return Err(StreamError::Plot("stream window has no samples".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption("Live Stream", ("sans-serif", 20).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0f64..values.len() as f64, 0f64..VALUE_RANGE as f64)?;
        chart
            .configure_mesh()
            .light_line_style(&WHITE.mix(0.1))
            .draw()?;
        let series = values.iter().enumerate().map(|(i, v)| (i as f64, *v));
        chart.draw_series(LineSeries::new(series, &style.accent))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

/// Render the recorded dataset in its scatter or bar view. The table view
/// has no chart form and is rejected.
pub fn render_recorded_png(
    samples: &[RecordedSample],
    view: RecordedView,
    style: PlotStyle,
) -> Result<Vec<u8>, StreamError> {
    if samples.is_empty() {
        return Err(StreamError::Plot("recorded dataset is empty".into()));
    }
    if view == RecordedView::Table {
        return Err(StreamError::Plot("table view is not exportable".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let x_max = samples.last().map(|s| s.index as f64).unwrap_or(1.0);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                "Recorded Measurements",
                ("sans-serif", 20).into_font().color(&WHITE),
            )
            .set_label_area_size(LabelAreaPosition::Left, 45)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0f64..x_max + 1.0, 0f64..VALUE_RANGE as f64)?;
        chart
            .configure_mesh()
            .light_line_style(&WHITE.mix(0.1))
            .draw()?;
        match view {
            RecordedView::Scatter => {
                chart.draw_series(LineSeries::new(
                    samples.iter().map(|s| (s.index as f64, s.value as f64)),
                    &style.accent,
                ))?;
                chart.draw_series(samples.iter().map(|s| {
                    Circle::new((s.index as f64, s.value as f64), 3, style.accent.filled())
                }))?;
            }
            RecordedView::Bar => {
                chart.draw_series(samples.iter().map(|s| {
                    let x = s.index as f64;
                    Rectangle::new(
                        [(x - 0.3, 0.0), (x + 0.3, s.value as f64)],
                        style.accent.filled(),
                    )
                }))?;
            }
            RecordedView::Table => unreachable!(),
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, StreamError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| StreamError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::recorded::build_sample;
    use crate::stream::window::SlidingWindow;

    #[test]
    fn stream_render_produces_png() {
        let window = SlidingWindow::seeded(40);
        let png = render_stream_png(&window.to_vec(), PlotStyle::default()).unwrap();
        assert!(!png.is_empty());
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn recorded_chart_views_produce_png() {
        let samples = build_sample(30);
        for view in [RecordedView::Scatter, RecordedView::Bar] {
            let png = render_recorded_png(&samples, view, PlotStyle::default()).unwrap();
            assert!(!png.is_empty());
        }
    }

    #[test]
    fn empty_and_table_inputs_are_rejected() {
        assert!(render_stream_png(&[], PlotStyle::default()).is_err());
        assert!(render_recorded_png(&[], RecordedView::Scatter, PlotStyle::default()).is_err());
        let samples = build_sample(5);
        assert!(render_recorded_png(&samples, RecordedView::Table, PlotStyle::default()).is_err());
    }
}
