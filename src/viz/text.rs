//! Text size estimation and truncation.

/// Heuristic: estimate pixel width of a single line (plotters has no text measuring on the SVG path).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> f64 {
    ((text.chars().count() as f64) * (font_px as f64) * 0.60).ceil()
}

/// Line box height for a font size.
pub fn line_height_px(font_px: u32) -> f64 {
    (font_px as f64 * 1.2).ceil()
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: f64) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{out}{ch}…");
        if estimate_text_width_px(&candidate, font_px) > max_px {
            break;
        }
        out.push(ch);
    }
    if out.is_empty() {
        return String::new();
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Q1", 12, 100.0), "Q1");
    }

    #[test]
    fn long_text_gets_ellipsis_and_fits() {
        let s = truncate_to_width("Operating expenses", 12, 60.0);
        assert!(s.ends_with('…'));
        assert!(estimate_text_width_px(&s, 12) <= 60.0);
    }

    #[test]
    fn nothing_fits() {
        assert_eq!(truncate_to_width("Revenue", 12, 5.0), "");
    }
}
