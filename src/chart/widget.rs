//! Line chart widget with crosshair, zoom and pan support.

use egui::{Color32, Pos2, Rect, Response, Sense, Stroke, StrokeKind, Ui, Vec2};

use crate::market::object::PriceSeries;
use super::timeframe::Timeframe;
use super::viewport::ViewportState;

// Chart colors
const LINE_COLOR: Color32 = Color32::from_rgb(0, 255, 163);
const GRID_COLOR: Color32 = Color32::from_gray(60);
const TEXT_COLOR: Color32 = Color32::from_gray(200);
const CURSOR_COLOR: Color32 = Color32::from_rgba_premultiplied(128, 128, 128, 128);
const LABEL_BG_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 200);

// Layout constants
const MARGIN: f32 = 5.0;
const AXIS_X_HEIGHT: f32 = 24.0;
const PLOT_PAD_Y: f32 = 5.0;
const GRID_SPACING_PX: f32 = 120.0;

/// Main chart widget: owns the viewport state and hover position, renders
/// the visible slice of whatever series it is shown with.
pub struct ChartWidget {
    viewport: ViewportState,
    timeframe: Timeframe,
    hover: Option<usize>,
}

impl Default for ChartWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartWidget {
    /// Create a new chart widget
    pub fn new() -> Self {
        Self {
            viewport: ViewportState::default(),
            timeframe: Timeframe::default(),
            hover: None,
        }
    }

    /// Get the current timeframe
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Select a timeframe: the viewport resets to the timeframe's target
    /// window, anchored to the newest point. The caller refetches the series.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.viewport = ViewportState::for_timeframe(timeframe);
        self.hover = None;
    }

    /// Zoom in (`direction > 0`) or out (`direction < 0`).
    pub fn zoom(&mut self, direction: i32, len: usize) {
        self.viewport.zoom(direction, len);
    }

    /// Show the chart. Returns the newly selected timeframe when the user
    /// clicked one of the timeframe buttons; the caller refetches.
    pub fn show(&mut self, ui: &mut Ui, series: &PriceSeries) -> Option<Timeframe> {
        let selected = self.draw_toolbar(ui, series.len());
        if let Some(tf) = selected {
            self.select_timeframe(tf);
        }

        self.draw_plot(ui, series);
        selected
    }

    /// Draw the timeframe button row with the zoom buttons.
    fn draw_toolbar(&mut self, ui: &mut Ui, len: usize) -> Option<Timeframe> {
        let mut selected = None;

        ui.horizontal_wrapped(|ui| {
            for tf in Timeframe::all() {
                if ui
                    .selectable_label(self.timeframe == tf, tf.label())
                    .clicked()
                {
                    selected = Some(tf);
                }
            }

            ui.separator();

            if ui.button("−").clicked() {
                self.zoom(-1, len);
            }
            if ui.button("+").clicked() {
                self.zoom(1, len);
            }
        });

        selected
    }

    /// Draw the plot area: polyline, gridlines, crosshair.
    fn draw_plot(&mut self, ui: &mut Ui, series: &PriceSeries) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        let plot_rect = Rect::from_min_max(
            Pos2::new(rect.left() + MARGIN, rect.top() + MARGIN),
            Pos2::new(rect.right() - MARGIN, rect.bottom() - MARGIN - AXIS_X_HEIGHT),
        );

        painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, GRID_COLOR), StrokeKind::Inside);

        // Empty series: border only, nothing to slice.
        if series.is_empty() {
            self.hover = None;
            return;
        }

        self.handle_scroll(ui, &response, plot_rect, series.len());
        self.handle_drag(&response, plot_rect, series.len());

        let vp = self.viewport.compute(series.len());
        if vp.view == 0 {
            return;
        }

        let prices = &series.prices()[vp.start..=vp.end];
        let times = &series.times()[vp.start..=vp.end];

        // One visible point: a flat reference line, no range scaling.
        if prices.len() == 1 {
            let y = plot_rect.center().y;
            painter.line_segment(
                [Pos2::new(plot_rect.left(), y), Pos2::new(plot_rect.right(), y)],
                Stroke::new(2.0, LINE_COLOR),
            );
            return;
        }

        let (min, max) = price_range(prices, series.last_price().unwrap_or(0.0));

        let xstep = plot_rect.width() / (prices.len() - 1) as f32;
        let y_of = |v: f64| -> f32 {
            let norm = ((v - min) / (max - min + 1e-9)) as f32;
            plot_rect.bottom() - PLOT_PAD_Y - norm * (plot_rect.height() - 2.0 * PLOT_PAD_Y)
        };

        self.draw_gridlines(&painter, plot_rect, times);

        let points: Vec<Pos2> = prices
            .iter()
            .enumerate()
            .map(|(i, &v)| Pos2::new(plot_rect.left() + i as f32 * xstep, y_of(v)))
            .collect();
        painter.add(egui::Shape::line(points, Stroke::new(2.0, LINE_COLOR)));

        self.update_hover(&response, plot_rect, xstep, prices.len());
        if let Some(ix) = self.hover {
            self.draw_crosshair(ui, plot_rect, xstep, y_of(prices[ix]), ix, prices[ix], times[ix]);
        }
    }

    /// Mouse wheel zooms around the cursor position.
    fn handle_scroll(&mut self, ui: &Ui, response: &Response, plot_rect: Rect, len: usize) {
        if !response.hovered() {
            return;
        }

        let scroll_delta = ui.input(|i| i.raw_scroll_delta);
        if scroll_delta.y == 0.0 {
            return;
        }

        let anchor = response
            .hover_pos()
            .map(|pos| ((pos.x - plot_rect.left()) / plot_rect.width().max(1.0)).clamp(0.0, 1.0))
            .unwrap_or(1.0);

        // Scroll down zooms in, scroll up zooms out.
        let direction = if scroll_delta.y < 0.0 { 1 } else { -1 };
        self.viewport.zoom_at(direction, len, anchor);
    }

    /// Drag pans the window; the content follows the cursor.
    fn handle_drag(&mut self, response: &Response, plot_rect: Rect, len: usize) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.x != 0.0 {
                self.viewport.pan(delta.x, plot_rect.width(), len);
            }
        }
    }

    /// Track which visible point the pointer is over.
    fn update_hover(&mut self, response: &Response, plot_rect: Rect, xstep: f32, view_len: usize) {
        self.hover = response.hover_pos().and_then(|pos| {
            if !plot_rect.contains(pos) {
                return None;
            }
            let ix = ((pos.x - plot_rect.left()) / xstep.max(f32::EPSILON)).round() as usize;
            Some(ix.min(view_len - 1))
        });
    }

    /// Periodic vertical gridlines with time labels from the visible slice.
    fn draw_gridlines(&self, painter: &egui::Painter, plot_rect: Rect, times: &[i64]) {
        let num_ticks = ((plot_rect.width() / GRID_SPACING_PX) as usize).max(2);
        let last = times.len() - 1;

        for i in 0..=num_ticks {
            let ix = (i * last) / num_ticks;
            let frac = ix as f32 / last.max(1) as f32;
            let x = plot_rect.left() + frac * plot_rect.width();

            painter.line_segment(
                [Pos2::new(x, plot_rect.top()), Pos2::new(x, plot_rect.bottom())],
                Stroke::new(1.0, GRID_COLOR),
            );

            painter.text(
                Pos2::new(x, plot_rect.bottom() + 4.0),
                egui::Align2::CENTER_TOP,
                format_time_label(times[ix]),
                egui::FontId::proportional(10.0),
                TEXT_COLOR,
            );
        }
    }

    /// Crosshair line, marker dot and price/time label box at the hovered
    /// visible index.
    #[allow(clippy::too_many_arguments)]
    fn draw_crosshair(
        &self,
        ui: &Ui,
        plot_rect: Rect,
        xstep: f32,
        y: f32,
        ix: usize,
        price: f64,
        ts_millis: i64,
    ) {
        let painter = ui.painter();
        let x = plot_rect.left() + ix as f32 * xstep;
        let stroke = Stroke::new(1.0, CURSOR_COLOR);

        painter.line_segment(
            [Pos2::new(x, plot_rect.top()), Pos2::new(x, plot_rect.bottom())],
            stroke,
        );
        painter.circle_filled(Pos2::new(x, y), 3.5, LINE_COLOR);

        let label = format!("{:.2}  {}", price, format_time_label(ts_millis));
        let label_size = Vec2::new(7.0 * label.len() as f32, 18.0);

        // Keep the box inside the plot, flipping sides near the right edge.
        let label_x = if x + 8.0 + label_size.x > plot_rect.right() {
            x - 8.0 - label_size.x
        } else {
            x + 8.0
        };
        let label_y = (y - label_size.y - 4.0).max(plot_rect.top());
        let label_rect = Rect::from_min_size(Pos2::new(label_x, label_y), label_size);

        painter.rect_filled(label_rect, 4.0, LABEL_BG_COLOR);
        painter.text(
            Pos2::new(label_rect.left() + 4.0, label_rect.center().y),
            egui::Align2::LEFT_CENTER,
            label,
            egui::FontId::proportional(11.0),
            TEXT_COLOR,
        );
    }
}

/// Visible price range, with a synthetic band around the last price when the
/// slice is flat or degenerate.
fn price_range(prices: &[f64], last_price: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &p in prices {
        min = min.min(p);
        max = max.max(p);
    }

    if !min.is_finite() || !max.is_finite() || min == max {
        (last_price - 1.0, last_price + 1.0)
    } else {
        (min, max)
    }
}

/// Render an epoch-millisecond timestamp as a short axis label.
fn format_time_label(ts_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts_millis)
        .map(|dt| dt.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_flat_slice_gets_synthetic_band() {
        // A flat [10, 10, 10] slice must not divide by zero when scaled.
        let (min, max) = price_range(&[10.0, 10.0, 10.0], 10.0);
        assert_eq!((min, max), (9.0, 11.0));
        assert!(max - min > 0.0);
    }

    #[test]
    fn test_price_range_non_finite_falls_back() {
        let (min, max) = price_range(&[f64::NAN, f64::INFINITY], 42.0);
        assert_eq!((min, max), (41.0, 43.0));
    }

    #[test]
    fn test_price_range_normal_slice() {
        let (min, max) = price_range(&[3.0, 1.0, 2.0], 2.0);
        assert_eq!((min, max), (1.0, 3.0));
    }

    #[test]
    fn test_select_timeframe_resets_viewport() {
        let mut widget = ChartWidget::new();
        widget.viewport.offset_from_end = 40;

        widget.select_timeframe(Timeframe::W1);
        assert_eq!(widget.viewport.offset_from_end, 0);
        assert_eq!(widget.viewport.window_size, Timeframe::W1.target_window());
        assert_eq!(widget.timeframe(), Timeframe::W1);
    }

    #[test]
    fn test_time_label_formatting() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_time_label(1_700_000_000_000), "11-14 22:13");
        assert_eq!(format_time_label(i64::MAX), "");
    }
}
