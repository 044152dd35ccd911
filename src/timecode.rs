/// Format an offset in seconds as a WebVTT timestamp (HH:MM:SS.mmm)
///
/// Negative and non-finite offsets clamp to zero. Hours are not wrapped, so
/// offsets past 99 hours simply widen the hour field.
pub fn format_time(seconds: f64) -> String {
    let total_milliseconds = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
