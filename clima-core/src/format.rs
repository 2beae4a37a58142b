//! Text rendering for display fields.

use chrono::NaiveDateTime;

/// Timestamp layout used by the forecast endpoint (`yyyy-MM-dd HH:mm:ss`).
pub const FORECAST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Weekday plus hour, e.g. `Mon 15:00`.
pub const FORECAST_LABEL_FORMAT: &str = "%a %H:%M";

/// Whole degrees, truncated toward zero.
pub fn temperature(celsius: f64) -> String {
    format!("{}°C", celsius.trunc() as i64)
}

pub fn humidity(pct: u8) -> String {
    format!("{pct}%")
}

pub fn wind_speed(speed: f64) -> String {
    format!("{} km/h", speed.trunc() as i64)
}

/// Re-renders a forecast timestamp as weekday + hour. Strings that do not
/// parse come back unchanged.
pub fn forecast_label(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, FORECAST_TIMESTAMP_FORMAT) {
        Ok(dt) => dt.format(FORECAST_LABEL_FORMAT).to_string(),
        Err(_) => timestamp.to_string(),
    }
}
