//! Human-readable formatting helpers shared by the monitor and the lister.

use std::time::Duration;

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with binary-multiple units and two decimals.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0.00 B".to_string();
    }
    let exp = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exp = exp.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exp as i32);
    format!("{value:.2} {}", SIZE_UNITS[exp])
}

/// Format a duration as its largest applicable units down to whole seconds.
///
/// Zero units are omitted; anything under a second renders as `< 1s`.
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_secs();
    if remaining == 0 {
        return "< 1s".to_string();
    }

    let years = remaining / 31_536_000;
    remaining %= 31_536_000;
    let days = remaining / 86_400;
    remaining %= 86_400;
    let hours = remaining / 3_600;
    remaining %= 3_600;
    let minutes = remaining / 60;
    let seconds = remaining % 60;

    let mut parts = Vec::new();
    for (value, suffix) in [(years, "y"), (days, "d"), (hours, "h"), (minutes, "m")] {
        if value > 0 {
            parts.push(format!("{value}{suffix}"));
        }
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

/// Count with a pluralized unit name: `1 item`, `3 items`.
pub fn unit(value: usize, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00 B")]
    #[case(1, "1.00 B")]
    #[case(1023, "1023.00 B")]
    #[case(1024, "1.00 KB")]
    #[case(1536, "1.50 KB")]
    #[case(1024 * 1024, "1.00 MB")]
    #[case(5 * 1024 * 1024 * 1024, "5.00 GB")]
    fn sizes(#[case] bytes: u64, #[case] rendered: &str) {
        assert_eq!(format_size(bytes), rendered);
    }

    #[rstest]
    #[case(0, "< 1s")]
    #[case(1, "1s")]
    #[case(59, "59s")]
    #[case(60, "1m 0s")]
    #[case(3723, "1h 2m 3s")]
    #[case(3605, "1h 5s")]
    #[case(90_061, "1d 1h 1m 1s")]
    #[case(31_536_000, "1y 0s")]
    fn durations(#[case] secs: u64, #[case] rendered: &str) {
        assert_eq!(format_duration(Duration::from_secs(secs)), rendered);
    }

    #[test]
    fn pluralization() {
        assert_eq!(unit(0, "item"), "0 items");
        assert_eq!(unit(1, "item"), "1 item");
        assert_eq!(unit(3, "item"), "3 items");
    }
}
