//! Stroke, fill and hatch settings for arrows and totals, plus the small
//! color helpers needed to turn them into backend colors.
//!
//! Strokes accept the compact string form used by chart configs
//! (`"#545f69 2"`, `"red"`, `"none"`) as well as an explicit object
//! (`{"color": "#545f69", "thickness": 2, "dash": "4 2"}`).

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };

    /// Parse `#RRGGBB`, `#RGB` or one of a handful of named colors.
    pub fn parse(s: &str) -> Result<Rgb8, LayoutError> {
        let t = s.trim();
        let named = match t.to_ascii_lowercase().as_str() {
            "black" => Some(Rgb8::BLACK),
            "white" => Some(Rgb8 { r: 255, g: 255, b: 255 }),
            "red" => Some(Rgb8 { r: 255, g: 0, b: 0 }),
            "green" => Some(Rgb8 { r: 0, g: 128, b: 0 }),
            "blue" => Some(Rgb8 { r: 0, g: 0, b: 255 }),
            "gray" | "grey" => Some(Rgb8 { r: 128, g: 128, b: 128 }),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }
        let hex = t
            .strip_prefix('#')
            .ok_or_else(|| LayoutError::InvalidColor(s.to_string()))?;
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(LayoutError::InvalidColor(s.to_string())),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| LayoutError::InvalidColor(s.to_string()))
        };
        Ok(Rgb8 {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Line style of a stroke; `dash` keeps the raw dash array string.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub thickness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: "#545f69".to_string(),
            thickness: 1.0,
            dash: None,
        }
    }
}

impl Stroke {
    pub fn new(color: impl Into<String>, thickness: f64) -> Self {
        Self {
            color: color.into(),
            thickness,
            dash: None,
        }
    }

    pub fn none() -> Self {
        Stroke::new("none", 0.0)
    }

    /// `"none"` strokes draw nothing and take no room.
    pub fn is_none(&self) -> bool {
        self.color.eq_ignore_ascii_case("none") || self.thickness <= 0.0
    }

    /// Thickness used for bounds math; hidden strokes contribute nothing.
    pub fn extract_thickness(&self) -> f64 {
        if self.is_none() { 0.0 } else { self.thickness }
    }

    pub fn rgb(&self) -> Rgb8 {
        Rgb8::parse(&self.color).unwrap_or(Rgb8::BLACK)
    }
}

impl FromStr for Stroke {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let color = parts
            .next()
            .ok_or_else(|| LayoutError::InvalidStroke(s.to_string()))?;
        if color.eq_ignore_ascii_case("none") {
            return Ok(Stroke::none());
        }
        Rgb8::parse(color).map_err(|_| LayoutError::InvalidStroke(s.to_string()))?;
        let thickness = match parts.next() {
            Some(t) => t
                .parse::<f64>()
                .map_err(|_| LayoutError::InvalidStroke(s.to_string()))?,
            None => 1.0,
        };
        let rest: Vec<&str> = parts.collect();
        let dash = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };
        Ok(Stroke {
            color: color.to_string(),
            thickness,
            dash,
        })
    }
}

/// Serde helper: accept a stroke either as a compact string or as an object.
impl<'de> Deserialize<'de> for Stroke {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        struct StrokeVisitor;

        impl<'de> Visitor<'de> for StrokeVisitor {
            type Value = Stroke;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a stroke string like \"#333 2\" or a stroke object")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                s.parse::<Stroke>().map_err(E::custom)
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut stroke = Stroke::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "color" => stroke.color = map.next_value()?,
                        "thickness" => stroke.thickness = map.next_value()?,
                        "dash" => stroke.dash = map.next_value()?,
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(stroke)
            }
        }

        deserializer.deserialize_any(StrokeVisitor)
    }
}

/// Solid fill; `"none"` disables filling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fill(pub String);

impl Fill {
    pub fn new(color: impl Into<String>) -> Self {
        Fill(color.into())
    }

    pub fn rgb(&self) -> Option<Rgb8> {
        if self.0.eq_ignore_ascii_case("none") {
            None
        } else {
            Rgb8::parse(&self.0).ok()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HatchKind {
    BackwardDiagonal,
    ForwardDiagonal,
    Horizontal,
    Vertical,
    Cross,
}

/// Hatch pattern drawn on top of a fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchFill {
    #[serde(rename = "type")]
    pub kind: HatchKind,
    #[serde(default = "default_hatch_color")]
    pub color: String,
    #[serde(default = "default_hatch_thickness")]
    pub thickness: f64,
    #[serde(default = "default_hatch_size")]
    pub size: f64,
}

fn default_hatch_color() -> String {
    "#000000".to_string()
}

fn default_hatch_thickness() -> f64 {
    1.0
}

fn default_hatch_size() -> f64 {
    10.0
}
