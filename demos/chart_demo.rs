//! Chart demo showing the line chart with zoom, pan and timeframes.
//!
//! Run with: cargo run --example chart_demo --features gui

use eframe::egui;
use rand::Rng;

use smart_trader::chart::ChartWidget;
use smart_trader::market::PriceSeries;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_title("SmartTrader - Chart Demo"),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Demo",
        options,
        Box::new(|_cc| Ok(Box::new(ChartDemoApp::new()))),
    )
}

struct ChartDemoApp {
    chart: ChartWidget,
    series: PriceSeries,
    auto_update: bool,
    last_ts: i64,
}

impl ChartDemoApp {
    fn new() -> Self {
        let mut app = Self {
            chart: ChartWidget::new(),
            series: PriceSeries::new(1200),
            auto_update: false,
            last_ts: chrono::Utc::now().timestamp_millis(),
        };
        app.reload(300);
        app
    }

    /// Regenerate the series as a random walk of `count` points.
    fn reload(&mut self, count: usize) {
        let mut rng = rand::rng();
        let tick_millis: i64 = 60_000;
        let now = chrono::Utc::now().timestamp_millis();

        let mut prices = Vec::with_capacity(count);
        let mut times = Vec::with_capacity(count);
        let mut price = 100.0 + rng.random_range(0.0..100.0);
        for i in 0..count {
            price *= 1.0 + (rng.random_range(0.0..1.0) - 0.5) / 80.0;
            prices.push(price);
            times.push(now - (count as i64 - 1 - i as i64) * tick_millis);
        }

        self.series.replace(times, prices);
        self.last_ts = now;
    }

    fn push_tick(&mut self) {
        let mut rng = rand::rng();
        let last = self.series.last_price().unwrap_or(100.0);
        let next = last * (1.0 + (rng.random_range(0.0..1.0) - 0.5) / 100.0);
        self.last_ts += 1_000;
        self.series.push_tick(self.last_ts, next);
    }
}

impl eframe::App for ChartDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.auto_update {
            self.push_tick();
            ctx.request_repaint_after(std::time::Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Line Chart Demo");
                ui.separator();

                if ui.button("Add tick").clicked() {
                    self.push_tick();
                }

                ui.checkbox(&mut self.auto_update, "Auto update");

                ui.separator();

                if ui.button("Reload").clicked() {
                    self.reload(300);
                }

                ui.separator();

                ui.label(format!(
                    "points: {}  last: {:.2}",
                    self.series.len(),
                    self.series.last_price().unwrap_or(0.0)
                ));
            });

            ui.horizontal(|ui| {
                ui.label("Drag to pan, scroll to zoom, hover for the crosshair.");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            // Timeframe clicks regenerate data at the timeframe's window size,
            // standing in for a series refetch.
            if let Some(tf) = self.chart.show(ui, &self.series) {
                self.reload(tf.target_window());
            }
        });
    }
}
