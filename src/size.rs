//! Human-readable byte sizes for the file selection label.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: f64 = 1024.0;

/// Format a byte count with binary (1024-based) units, rounded to two decimals.
///
/// The unit is the largest of Bytes/KB/MB/GB for which the value is at least 1;
/// sizes beyond the GB range stay in GB. Zero renders as `"0 Bytes"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_spelled_out() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn whole_units_drop_the_fraction() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1_048_576), "1 MB");
        assert_eq!(format_size(1_073_741_824), "1 GB");
    }

    #[test]
    fn fractions_round_to_two_places() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1000), "1000 Bytes");
        // 1234567 / 1024^2 = 1.17737...
        assert_eq!(format_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn upload_ceiling_renders_as_hundred_megabytes() {
        assert_eq!(format_size(100 * 1024 * 1024), "100 MB");
    }

    #[test]
    fn terabytes_stay_in_gigabytes() {
        assert_eq!(format_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }
}
