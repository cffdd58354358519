/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make serialized JSON safe to embed inside a `<script>` element.
pub fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn badge_class(value: f64, high: f64, mid: f64) -> &'static str {
    if value >= high {
        "badge-success"
    } else if value >= mid {
        "badge-warning"
    } else {
        "badge-info"
    }
}

/// Progress fill width in percent, limited to the bar.
pub fn fill_width(percent: f64) -> String {
    format!("{:.1}", percent.clamp(0.0, 100.0))
}

/// First `max` characters, with `...` appended when anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Last path component, or the whole path when it has none.
pub fn file_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn script_json_cannot_close_the_tag() {
        let json = r#"{"message":"</script><script>alert(1)"}"#;
        let safe = escape_script_json(json);
        assert!(!safe.contains("</script>"));
        let back: serde_json::Value = serde_json::from_str(&safe).unwrap();
        assert_eq!(back["message"], "</script><script>alert(1)");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-12345), "-12,345");
    }

    #[test]
    fn badges_and_fill() {
        assert_eq!(badge_class(80.0, 80.0, 60.0), "badge-success");
        assert_eq!(badge_class(60.0, 80.0, 60.0), "badge-warning");
        assert_eq!(badge_class(10.0, 80.0, 60.0), "badge-info");
        assert_eq!(fill_width(140.0), "100.0");
        assert_eq!(fill_width(-3.0), "0.0");
    }

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("ééééé", 3), "ééé...");
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name("src/a/b.rs"), "b.rs");
        assert_eq!(file_name("b.rs"), "b.rs");
        assert_eq!(file_name("dir/"), "dir/");
    }
}
