//! Chart module - viewport engine and timeframe mapping.
//!
//! The viewport math is pure and always available; the egui widget that
//! renders it is gated behind the `gui` feature.

pub mod timeframe;
pub mod viewport;

#[cfg(feature = "gui")]
pub mod widget;

pub use timeframe::{CandleQuery, Resolution, Timeframe};
pub use viewport::{Viewport, ViewportState, MIN_VIEW};

#[cfg(feature = "gui")]
pub use widget::ChartWidget;
