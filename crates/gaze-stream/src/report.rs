//! Human-readable receive reports

use std::fmt;
use std::time::Duration;

use crate::receiver::ReceiveReport;

const UNITS: [(&str, f64); 5] = [
    ("week", 7.0 * 24.0 * 3600.0),
    ("day", 24.0 * 3600.0),
    ("hour", 3600.0),
    ("minute", 60.0),
    ("second", 1.0),
];

/// At most this many units are shown; smaller remainders are dropped.
const MAX_UNITS: usize = 3;

/// Format a span like `"0.5 seconds"`, `"1 second"` or `"2 minutes and 3.5 seconds"`.
pub fn format_timespan(span: Duration) -> String {
    // Round to the displayed precision first so 59.999 s reads as "1 minute".
    let secs = (span.as_secs_f64() * 100.0).round() / 100.0;
    if secs < 60.0 {
        return pluralize(secs, "second");
    }

    let mut remaining = secs;
    let mut parts = Vec::new();
    for (name, size) in UNITS {
        let amount = if size == 1.0 {
            remaining
        } else {
            (remaining / size).floor()
        };
        remaining -= amount * size;
        if amount > 0.0 {
            parts.push(pluralize(amount, name));
        }
    }
    parts.truncate(MAX_UNITS);
    // Rounding can leave "0 seconds" behind.
    parts.retain(|p| p != "0 seconds");
    concatenate(parts)
}

fn pluralize(amount: f64, unit: &str) -> String {
    let shown = round_number(amount);
    if shown == "1" {
        format!("{} {}", shown, unit)
    } else {
        format!("{} {}s", shown, unit)
    }
}

/// Two decimals at most, trailing zeros stripped.
fn round_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn concatenate(mut parts: Vec<String>) -> String {
    match parts.len() {
        0 => "0 seconds".to_string(),
        1 => parts.remove(0),
        _ => {
            let last = parts.pop().unwrap_or_default();
            format!("{} and {}", parts.join(", "), last)
        }
    }
}

impl fmt::Display for ReceiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Received {} entries in {}",
            self.entry_count,
            format_timespan(self.elapsed)
        )?;
        write!(f, "Throughput: {}Hz", self.throughput_hz().round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::ReceiveAnomaly;
    use gaze_config::CountingMode;

    #[test]
    fn test_short_spans() {
        assert_eq!(format_timespan(Duration::from_millis(500)), "0.5 seconds");
        assert_eq!(format_timespan(Duration::from_secs(1)), "1 second");
        assert_eq!(format_timespan(Duration::from_millis(59_994)), "59.99 seconds");
        assert_eq!(format_timespan(Duration::ZERO), "0 seconds");
    }

    #[test]
    fn test_long_spans() {
        assert_eq!(
            format_timespan(Duration::from_millis(123_500)),
            "2 minutes and 3.5 seconds"
        );
        assert_eq!(format_timespan(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_timespan(Duration::from_micros(59_999_999)), "1 minute");
        assert_eq!(
            format_timespan(Duration::from_secs(3600 + 60 + 1)),
            "1 hour, 1 minute and 1 second"
        );
        // Only the three largest units survive.
        assert_eq!(
            format_timespan(Duration::from_secs(86_400 + 3600 + 60 + 1)),
            "1 day, 1 hour and 1 minute"
        );
    }

    #[test]
    fn test_report_display() {
        let report = ReceiveReport {
            entry_count: 5,
            elapsed: Duration::from_millis(500),
            mode: CountingMode::Chunks,
            anomaly: None,
            rejected_frames: 0,
        };
        assert_eq!(
            report.to_string(),
            "Received 5 entries in 0.5 seconds\nThroughput: 10Hz"
        );

        let empty = ReceiveReport {
            entry_count: 0,
            elapsed: Duration::ZERO,
            mode: CountingMode::Chunks,
            anomaly: Some(ReceiveAnomaly::MissingSessionEnd),
            rejected_frames: 0,
        };
        assert!(empty.to_string().ends_with("Throughput: 0Hz"));
    }
}
