use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Round half up, the way a browser's `Math.round` does.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// `[████░░░░] 50%` with `width` cells. The filled part is clamped to the
/// bar, so a value larger than the total renders as a full bar.
pub fn progress_bar(value: u64, total: u64, width: usize) -> String {
    let (filled, pct) = if total > 0 {
        let ratio = value as f64 / total as f64;
        let filled = round_half_up(ratio * width as f64).clamp(0, width as i64) as usize;
        (filled, round_half_up(ratio * 100.0))
    } else {
        (0, 0)
    };
    format!(
        "[{}{}] {pct}%",
        "█".repeat(filled),
        "░".repeat(width - filled)
    )
}

/// Coloured circle for a percentage, in eighths.
pub fn pie_glyph(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 87.5 => "🟢",
        p if p >= 75.0 => "🔵",
        p if p >= 62.5 => "🟡",
        p if p >= 37.5 => "🟠",
        p if p >= 12.5 => "🔴",
        _ => "⚪",
    }
}

/// Elapsed time between two RFC 3339 timestamps in its largest unit plus
/// one remainder unit: `2d 3h`, `1h`, `4m 10s`, `9s`.
///
/// Unparsable timestamps or a negative span yield `N/A`.
pub fn format_duration(start: &str, end: &str) -> String {
    let (Some(start), Some(end)) = (parse_instant(start), parse_instant(end)) else {
        return "N/A".to_string();
    };
    let diff = end - start;
    if diff.is_negative() {
        return "N/A".to_string();
    }

    let seconds = diff.whole_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let with_rest = |major: String, rest: i64, unit: &str| {
        if rest > 0 {
            format!("{major} {rest}{unit}")
        } else {
            major
        }
    };
    if days > 0 {
        with_rest(format!("{days}d"), hours % 24, "h")
    } else if hours > 0 {
        with_rest(format!("{hours}h"), minutes % 60, "m")
    } else if minutes > 0 {
        with_rest(format!("{minutes}m"), seconds % 60, "s")
    } else {
        format!("{seconds}s")
    }
}

/// `Jan 5, 03:04 PM` in UTC; the input is returned unchanged if it does not parse.
pub fn format_timestamp(timestamp: &str) -> String {
    let fmt = format_description!(
        "[month repr:short] [day padding:none], [hour repr:12]:[minute] [period]"
    );
    parse_instant(timestamp)
        .and_then(|t| t.to_offset(UtcOffset::UTC).format(&fmt).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` without an offset read as UTC.
fn parse_instant(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    OffsetDateTime::parse(s, &Rfc3339).ok().or_else(|| {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
        .ok()
        .map(PrimitiveDateTime::assume_utc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_matches_browser() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn progress_bar_basic() {
        assert_eq!(progress_bar(5, 10, 4), "[██░░] 50%");
        assert_eq!(progress_bar(0, 0, 3), "[░░░] 0%");
    }

    #[test]
    fn progress_bar_clamps_overflow() {
        assert_eq!(progress_bar(15, 10, 4), "[████] 150%");
    }

    #[test]
    fn pie_glyph_thresholds() {
        assert_eq!(pie_glyph(100.0), "🟢");
        assert_eq!(pie_glyph(80.0), "🔵");
        assert_eq!(pie_glyph(62.5), "🟡");
        assert_eq!(pie_glyph(50.0), "🟠");
        assert_eq!(pie_glyph(40.0), "🟠");
        assert_eq!(pie_glyph(20.0), "🔴");
        assert_eq!(pie_glyph(0.0), "⚪");
    }

    #[test]
    fn duration_units() {
        let t0 = "2024-01-01T00:00:00Z";
        assert_eq!(format_duration(t0, "2024-01-03T03:00:00Z"), "2d 3h");
        assert_eq!(format_duration(t0, "2024-01-02T00:00:00Z"), "1d");
        assert_eq!(format_duration(t0, "2024-01-01T05:30:00Z"), "5h 30m");
        assert_eq!(format_duration(t0, "2024-01-01T02:00:00Z"), "2h");
        assert_eq!(format_duration(t0, "2024-01-01T00:04:10Z"), "4m 10s");
        assert_eq!(format_duration(t0, "2024-01-01T00:00:09Z"), "9s");
        assert_eq!(format_duration(t0, t0), "0s");
    }

    #[test]
    fn duration_malformed_or_negative() {
        assert_eq!(format_duration("yesterday", "2024-01-01T00:00:00Z"), "N/A");
        assert_eq!(
            format_duration("2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z"),
            "N/A"
        );
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp("2024-01-05T15:04:00Z"), "Jan 5, 03:04 PM");
        assert_eq!(format_timestamp("2024-01-05T17:04:00+02:00"), "Jan 5, 03:04 PM");
        assert_eq!(format_timestamp("not a time"), "not a time");
    }

    #[test]
    fn space_separated_timestamps_read_as_utc() {
        assert_eq!(
            format_duration("2024-01-01 00:00:00", "2024-01-01T01:30:00Z"),
            "1h 30m"
        );
        assert_eq!(format_timestamp("2024-01-05 15:04:00"), "Jan 5, 03:04 PM");
    }
}
