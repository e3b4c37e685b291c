//! Market module - core dashboard state and plumbing.
//!
//! - **constant**: region, trade-side and alert-condition enums
//! - **object**: quote, series, position, alert and news data structures
//! - **engine**: application-state controller
//! - **poller**: periodic quote refresh loop
//! - **setting**: global settings management
//! - **logger**: logging setup
//! - **utility**: paths, JSON helpers, money/percent formatting

pub mod constant;
pub mod engine;
pub mod logger;
pub mod object;
pub mod poller;
pub mod setting;
pub mod utility;

// Re-exports for convenience
pub use constant::{AlertCondition, MarketRegion, TradeSide};
pub use engine::{MarketEngine, MarketSlot, DEFAULT_SYMBOLS};
pub use logger::init_logger;
pub use object::{
    AlertData, NewsItem, PositionData, PriceSeries, QuoteData, QuoteResult, TradeFill,
};
pub use poller::QuotePoller;
pub use setting::{SettingValue, Settings, SETTINGS};
pub use utility::{format_money, format_pct, get_file_path, get_folder_path, APP_DIR, TEMP_DIR};
