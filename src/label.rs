//! Label settings shared by arrows and totals, the anchor math that places a
//! measured text box against a reference rectangle, and label text formatting.

use crate::geometry::{Point2D, Rect, Size};
use crate::viz::util::map_locale;
use num_format::ToFormattedString;
use serde::{Deserialize, Serialize};

/// Nine reference points of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    LeftTop,
    #[default]
    CenterTop,
    RightTop,
    LeftCenter,
    Center,
    RightCenter,
    LeftBottom,
    CenterBottom,
    RightBottom,
}

impl Anchor {
    /// Fractions of width/height from the top-left corner.
    fn fractions(self) -> (f64, f64) {
        match self {
            Anchor::LeftTop => (0.0, 0.0),
            Anchor::CenterTop => (0.5, 0.0),
            Anchor::RightTop => (1.0, 0.0),
            Anchor::LeftCenter => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::RightCenter => (1.0, 0.5),
            Anchor::LeftBottom => (0.0, 1.0),
            Anchor::CenterBottom => (0.5, 1.0),
            Anchor::RightBottom => (1.0, 1.0),
        }
    }

    /// The point of `rect` this anchor names.
    pub fn point_in(self, rect: &Rect) -> Point2D {
        let (fx, fy) = self.fractions();
        Point2D::new(rect.left + rect.width * fx, rect.top + rect.height * fy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    pub enabled: bool,
    /// Text template; see [`format_label`] for the tokens.
    pub format: String,
    /// Point of the reference rectangle the label is attached to.
    pub position: Anchor,
    /// Point of the text box placed on `position`.
    pub anchor: Anchor,
    pub offset_x: f64,
    pub offset_y: f64,
    pub font_size: u32,
    pub font_color: String,
    pub font_family: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "{%Value}".to_string(),
            position: Anchor::CenterTop,
            anchor: Anchor::CenterBottom,
            offset_x: 0.0,
            offset_y: 0.0,
            font_size: 12,
            font_color: "#7c868e".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

impl LabelSettings {
    /// Top-left corner of a `size` text box attached to `bounds`.
    pub fn text_position(&self, bounds: &Rect, size: Size) -> Point2D {
        text_position(
            bounds,
            size,
            self.position,
            self.anchor,
            Point2D::new(self.offset_x, self.offset_y),
        )
    }

    /// Rectangle a `size` text box occupies when attached to `bounds`.
    pub fn text_bounds(&self, bounds: &Rect, size: Size) -> Rect {
        let p = self.text_position(bounds, size);
        Rect::new(p.x, p.y, size.width, size.height)
    }
}

/// Place a text box so that its `anchor` point sits on the `position` point of `bounds`.
pub fn text_position(
    bounds: &Rect,
    size: Size,
    position: Anchor,
    anchor: Anchor,
    offset: Point2D,
) -> Point2D {
    let target = position.point_in(bounds);
    let (fx, fy) = anchor.fractions();
    Point2D::new(
        target.x - size.width * fx + offset.x,
        target.y - size.height * fy + offset.y,
    )
}

/// Format a number for labels: locale thousands separator, at most two decimals,
/// trailing zeros trimmed.
pub fn format_number(value: f64, locale_tag: &str) -> String {
    if !value.is_finite() {
        return "NA".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    let rounded = (value * 100.0).round() / 100.0;
    let abs = rounded.abs();
    let int_part = abs.trunc() as i64;
    let frac = ((abs - abs.trunc()) * 100.0).round() as i64;

    let mut out = int_part.to_formatted_string(locale);
    if frac > 0 {
        let digits = format!("{frac:02}");
        out.push(dec_sep);
        out.push_str(digits.trim_end_matches('0'));
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Replace `{%Token}` placeholders in `format` with the given values.
/// Unknown tokens are kept verbatim.
pub fn format_label(format: &str, tokens: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(start) = rest.find("{%") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match tokens.iter().find(|(k, _)| *k == name) {
                    Some((_, v)) => out.push_str(v),
                    None => {
                        out.push_str("{%");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_bottom_anchor_sits_on_top_edge() {
        let bounds = Rect::new(100.0, 50.0, 200.0, 6.0);
        let p = text_position(
            &bounds,
            Size::new(40.0, 14.0),
            Anchor::CenterTop,
            Anchor::CenterBottom,
            Point2D::default(),
        );
        assert_eq!(p, Point2D::new(180.0, 36.0));
    }

    #[test]
    fn formats_with_locale() {
        assert_eq!(format_number(1234567.0, "en"), "1,234,567");
        assert_eq!(format_number(-1234.5, "de"), "-1.234,5");
        assert_eq!(format_number(0.004, "en"), "0");
        assert_eq!(format_number(2.25, "en"), "2.25");
    }

    #[test]
    fn replaces_known_tokens_only() {
        let s = format_label(
            "{%From} -> {%To}: {%Value} {%Nope}",
            &[
                ("From", "Q1".into()),
                ("To", "Q3".into()),
                ("Value", "+5".into()),
            ],
        );
        assert_eq!(s, "Q1 -> Q3: +5 {%Nope}");
    }

    #[test]
    fn unterminated_token_is_kept() {
        assert_eq!(format_label("abc {%Value", &[]), "abc {%Value");
    }
}
