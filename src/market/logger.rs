//! Logging setup for the dashboard engine.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::setting::SETTINGS;
use super::utility::get_folder_path;

/// Initialize the logger from global settings.
///
/// `log.level` names the default directive ("debug", "info", ...); the
/// `RUST_LOG` environment variable still overrides it. Console output is on
/// by default, with an optional daily log file under the app directory.
pub fn init_logger() {
    if !SETTINGS.get_bool("log.active").unwrap_or(true) {
        return;
    }

    let level = SETTINGS.get_string("log.level").unwrap_or_else(|| "info".to_string());
    let log_console = SETTINGS.get_bool("log.console").unwrap_or(true);
    let log_file = SETTINGS.get_bool("log.file").unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match (log_console, log_file) {
        (true, true) => {
            let fmt_layer = fmt::layer().with_target(true).with_ansi(true);
            let file_layer = fmt::layer()
                .with_writer(std::sync::Mutex::new(open_log_file()))
                .with_ansi(false);
            subscriber.with(fmt_layer).with(file_layer).init();
        }
        (true, false) => {
            let fmt_layer = fmt::layer().with_target(true).with_ansi(true);
            subscriber.with(fmt_layer).init();
        }
        (false, true) => {
            let file_layer = fmt::layer()
                .with_writer(std::sync::Mutex::new(open_log_file()))
                .with_ansi(false);
            subscriber.with(file_layer).init();
        }
        (false, false) => {}
    }
}

/// Open (creating if needed) today's log file.
fn open_log_file() -> std::fs::File {
    let log_path = get_log_file_path();

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file")
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    let today = Local::now().format("%Y%m%d").to_string();
    let filename = format!("st_{}.log", today);
    log_folder.join(filename)
}
