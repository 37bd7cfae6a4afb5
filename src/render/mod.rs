//! Output serializers.
//!
//! Two independent renderers over the same element list:
//!   - svg.rs   — SVG markup for the clipboard
//!   - figma.rs — Figma node document for the REST API
//!
//! Both are deterministic: identical input gives byte-identical output.

pub mod figma;
pub mod svg;

/// Escape XML special characters for text content and attribute values.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format a pixel value rounded to two decimals, trailing zeros trimmed.
pub(crate) fn format_number(value: f64) -> String {
    // `+ 0.0` turns -0.0 into 0.0
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
