// src/gui.rs
use std::sync::Arc;
use std::time::SystemTime;

use eframe::egui;
use egui::Color32;
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::config::AppConfig;
use crate::stream::recorded::{self, RecordedSample, RecordedView};
use crate::stream::{
    render_recorded_png, render_stream_png, AcquisitionController, AcquisitionMode, PlotStyle,
    ProximityProvider,
};
use crate::types::{RunMode, WidgetKind};

/// Widget catalog offered by the dashboard.
const WIDGETS: [&str; 4] = [
    "Real-Time Spectral",
    "Real-Time Proximity",
    "Recorded Measurements",
    "Device Status",
];

pub struct DeepSpectrumApp {
    config: AppConfig,
    provider_available: bool,
    controller: AcquisitionController,

    // Currently open widget (modal), if any.
    active_widget: Option<String>,
    // Recorded dataset, built once per widget mount.
    recorded: Option<Vec<RecordedSample>>,
    record_view: RecordedView,

    log_messages: Vec<String>,
}

impl DeepSpectrumApp {
    pub fn new(config: AppConfig, provider: Arc<dyn ProximityProvider>) -> Self {
        let provider_available = provider.is_available();
        let controller = AcquisitionController::new(
            provider,
            config.window_capacity,
            config.stream_period(),
        );
        Self {
            config,
            provider_available,
            controller,
            active_widget: None,
            recorded: None,
            record_view: RecordedView::Scatter,
            log_messages: vec!["DeepSpectrum demo v0.1 Ready.".to_owned()],
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    fn open_widget(&mut self, title: &str) {
        self.close_widget();
        let kind = WidgetKind::classify(title);
        self.controller.on_visible(kind);
        if kind == WidgetKind::Recorded {
            self.recorded = Some(recorded::build_sample(self.config.recorded_points));
            self.record_view = RecordedView::Scatter;
        }
        self.active_widget = Some(title.to_owned());
        self.log(&format!("Opened: {title}"));
    }

    fn close_widget(&mut self) {
        if let Some(title) = self.active_widget.take() {
            self.controller.on_hidden();
            self.recorded = None;
            self.log(&format!("Closed: {title}"));
        }
    }

    fn export_stream(&mut self) {
        let Some(values) = self.controller.snapshot() else {
            return;
        };
        match render_stream_png(&values, PlotStyle::default()) {
            Ok(png) => self.write_export("stream", &png),
            Err(err) => self.log(&format!("Export failed: {err}")),
        }
    }

    fn export_recorded(&mut self) {
        let Some(samples) = self.recorded.clone() else {
            return;
        };
        match render_recorded_png(&samples, self.record_view, PlotStyle::default()) {
            Ok(png) => self.write_export("recorded", &png),
            Err(err) => self.log(&format!("Export failed: {err}")),
        }
    }

    fn write_export(&mut self, label: &str, png: &[u8]) {
        let timestamp = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let filename = format!("deepspectrum_{label}_{timestamp}.png");
        match std::fs::write(&filename, png) {
            Ok(()) => self.log(&format!("Saved {filename}")),
            Err(err) => self.log(&format!("Write failed: {err}")),
        }
    }

    fn show_realtime(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_top(|ui| {
            let points = self.controller.plot_points().unwrap_or_default();
            Plot::new("stream_plot")
                .width(ui.available_width() - 180.0)
                .height(220.0)
                .include_y(0.0)
                .include_y(120.0)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::new(points))
                            .color(Color32::from_rgb(0, 255, 255))
                            .name("stream"),
                    );
                });

            ui.vertical(|ui| {
                let proximity = matches!(
                    self.controller.mode(),
                    Some(AcquisitionMode::Sensor | AcquisitionMode::SensorUnavailable)
                );
                ui.label(if proximity { "Proximity" } else { "Current" });
                ui.label(
                    egui::RichText::new(self.controller.readout().to_string())
                        .size(26.0)
                        .strong()
                        .color(Color32::from_rgb(0, 255, 255)),
                );
                let caption = match self.controller.mode() {
                    Some(AcquisitionMode::Sensor) => "Source: device sensor",
                    Some(AcquisitionMode::SensorUnavailable) => {
                        "Proximity native module not available"
                    }
                    Some(AcquisitionMode::Synthetic) => "Integration: 100 ms",
                    None => "",
                };
                ui.small(caption);
                ui.add_space(8.0);
                ui.small(format!("{} samples this session", self.controller.push_count()));
                if ui.button("EXPORT PNG").clicked() {
                    self.export_stream();
                }
            });
        });
    }

    fn show_recorded(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.record_view, RecordedView::Scatter, "Scatter");
            ui.selectable_value(&mut self.record_view, RecordedView::Bar, "Bar");
            ui.selectable_value(&mut self.record_view, RecordedView::Table, "Table");
            if self.record_view != RecordedView::Table && ui.button("EXPORT PNG").clicked() {
                self.export_recorded();
            }
        });

        let Some(samples) = self.recorded.clone() else {
            return;
        };
        match self.record_view {
            RecordedView::Scatter => {
                // Projection coordinates are screen-space (y down); flip
                // into plot space.
                let points: Vec<[f64; 2]> = recorded::scatter_projection(&samples)
                    .iter()
                    .map(|p| [p.x as f64, (recorded::CHART_HEIGHT - p.y) as f64])
                    .collect();
                Plot::new("recorded_scatter")
                    .height(260.0)
                    .include_x(0.0)
                    .include_x(recorded::CHART_WIDTH as f64)
                    .include_y(0.0)
                    .include_y(recorded::CHART_HEIGHT as f64)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .show(ui, |plot_ui| {
                        plot_ui.line(
                            Line::new(PlotPoints::new(points.clone()))
                                .color(Color32::from_rgb(0, 255, 255)),
                        );
                        plot_ui.points(
                            Points::new(PlotPoints::new(points))
                                .radius(3.0)
                                .color(Color32::from_rgb(0, 255, 255)),
                        );
                    });
            }
            RecordedView::Bar => {
                let bars: Vec<Bar> = recorded::bar_projection(&samples)
                    .iter()
                    .map(|b| {
                        Bar::new(b.x as f64, b.height as f64)
                            .width(b.width as f64)
                            .fill(Color32::from_rgb(0, 255, 255))
                    })
                    .collect();
                Plot::new("recorded_bars")
                    .height(260.0)
                    .include_x(0.0)
                    .include_x(recorded::CHART_WIDTH as f64)
                    .include_y(0.0)
                    .include_y(recorded::VALUE_SPAN_Y as f64)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .show(ui, |plot_ui| {
                        plot_ui.bar_chart(BarChart::new(bars));
                    });
            }
            RecordedView::Table => {
                egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    egui::Grid::new("recorded_table")
                        .striped(true)
                        .min_col_width(60.0)
                        .show(ui, |ui| {
                            ui.strong("Index");
                            ui.strong("Value");
                            ui.end_row();
                            for (index, value) in recorded::table_projection(&samples) {
                                ui.label(index.to_string());
                                ui.label(value.to_string());
                                ui.end_row();
                            }
                        });
                });
            }
        }
    }
}

impl eframe::App for DeepSpectrumApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply pending stream events before drawing.
        self.controller.pump();

        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("L").min_width(240.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("DeepSpectrum demo v0.1");
            ui.label("Spectrometer Companion");
            ui.separator();

            let mode = match self.config.run_mode {
                RunMode::Demo => "DEMO",
                RunMode::Live => "LIVE",
            };
            ui.label(format!("Run mode: {mode}"));
            ui.label(if self.provider_available {
                "Proximity sensor: detected"
            } else {
                "Proximity sensor: not available"
            });

            ui.add_space(10.0);
            ui.label("WIDGETS");
            let mut clicked: Option<&str> = None;
            for title in WIDGETS {
                let selected = self.active_widget.as_deref() == Some(title);
                if ui.selectable_label(selected, title).clicked() {
                    clicked = Some(title);
                }
            }
            if let Some(title) = clicked {
                self.open_widget(title);
            }
            if self.active_widget.is_some() && ui.button("CLOSE WIDGET").clicked() {
                self.close_widget();
            }

            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(title) = self.active_widget.clone() else {
                ui.label("Open a widget from the dashboard.");
                return;
            };
            ui.heading(&title);
            ui.separator();
            match WidgetKind::classify(&title) {
                WidgetKind::RealTime | WidgetKind::Proximity => self.show_realtime(ui),
                WidgetKind::Recorded => self.show_recorded(ui),
                WidgetKind::Generic => {
                    ui.label("Preview content for this widget.");
                }
            }
        });

        // Keep repainting while a stream is live; an unavailable sensor
        // session has nothing to animate.
        if matches!(
            self.controller.mode(),
            Some(AcquisitionMode::Synthetic | AcquisitionMode::Sensor)
        ) {
            ctx.request_repaint();
        }
    }
}
