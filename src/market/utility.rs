//! General utility functions: application paths, JSON helpers and the
//! money/percent formatting used by the dashboard.

use serde_json;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::constant::MarketRegion;

/// Get application directory, preferring a `.smart_trader` folder in the
/// working directory over the home directory.
fn get_app_dir(temp_name: &str) -> (PathBuf, PathBuf) {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let temp_path = cwd.join(temp_name);

    if temp_path.exists() {
        return (cwd, temp_path);
    }

    let home_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let temp_path = home_path.join(temp_name);

    if !temp_path.exists() {
        let _ = fs::create_dir_all(&temp_path);
    }

    (home_path, temp_path)
}

/// Application directory
pub static APP_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let (app_dir, _) = get_app_dir(".smart_trader");
    app_dir
});

/// Temp directory for settings and logs
pub static TEMP_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let (_, temp_dir) = get_app_dir(".smart_trader");
    temp_dir
});

/// Get path for temp file with filename
pub fn get_file_path(filename: &str) -> PathBuf {
    TEMP_DIR.join(filename)
}

/// Get path for temp folder with folder name
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = TEMP_DIR.join(folder_name);
    if !folder_path.exists() {
        let _ = fs::create_dir_all(&folder_path);
    }
    folder_path
}

/// Load data from JSON file in temp path
pub fn load_json(filename: &str) -> HashMap<String, serde_json::Value> {
    let filepath = get_file_path(filename);

    if filepath.exists() {
        if let Ok(content) = fs::read_to_string(&filepath) {
            if let Ok(data) = serde_json::from_str(&content) {
                return data;
            }
        }
    }

    HashMap::new()
}

/// Save data into JSON file in temp path
pub fn save_json(filename: &str, data: &HashMap<String, serde_json::Value>) {
    let filepath = get_file_path(filename);
    if let Ok(json) = serde_json::to_string_pretty(data) {
        let _ = fs::write(filepath, json);
    }
}

/// Format a signed fractional change as a percent string: `+1.20%`.
pub fn format_pct(chg: f64) -> String {
    let chg = if chg.is_finite() { chg } else { 0.0 };
    format!("{}{:.2}%", if chg >= 0.0 { "+" } else { "" }, chg * 100.0)
}

/// Format a price in the region's currency.
///
/// US prices render as `$1,234.56`; Brazilian prices as `R$ 1.234,56`
/// (comma decimal separator, dot thousands separator). Negative values carry
/// a leading minus outside the currency symbol.
pub fn format_money(region: MarketRegion, value: f64) -> String {
    if !value.is_finite() {
        return match region {
            MarketRegion::Us => "$ —".to_string(),
            MarketRegion::Br => "R$ —".to_string(),
        };
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    // Carry when the cent rounding overflows (e.g. 1.999 -> 2.00).
    let (whole, cents) = if cents >= 100 { (whole + 1, 0) } else { (whole, cents) };

    match region {
        MarketRegion::Us => {
            format!("{}${}.{:02}", sign, group_thousands(whole, ','), cents)
        }
        MarketRegion::Br => {
            format!("{}R$ {},{:02}", sign, group_thousands(whole, '.'), cents)
        }
    }
}

/// Insert a thousands separator into an integer's decimal rendering.
fn group_thousands(value: u64, sep: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Epoch milliseconds for the current instant.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
