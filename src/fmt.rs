//! Text formatting for metric values handed to a display layer.

/// Fixed six-decimal rendering, e.g. `55.555556`.
pub fn format_decimal(value: f64) -> String {
    format!("{:.6}", value)
}

/// Percent rendering; degenerate results print as `n/a`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format_decimal(v),
        _ => "n/a".to_string(),
    }
}

/// `HH:MM:SS`, prefixed with `Nd ` once a day has passed.
///
/// Negative inputs (a process that started "after" the uptime reading) are
/// rendered as zero.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}
