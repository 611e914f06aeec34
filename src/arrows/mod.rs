//! Connector arrows between two categories of a waterfall.
//!
//! [`engine`] validates arrows and computes their geometry, [`render`] turns
//! the geometry into surface paths and texts, and [`controller`] owns the
//! collection and drives the passes.

pub mod controller;
pub mod engine;
pub mod render;

use crate::geometry::{Point2D, Rect, Size};
use crate::label::LabelSettings;
use crate::models::CategoryKey;
use crate::style::Stroke;
use serde::{Deserialize, Serialize};

/// Stable identity of an arrow inside its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrowId(pub u64);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectorSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// User-facing configuration record of one arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowConfig {
    pub from: CategoryKey,
    pub to: CategoryKey,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Stroke of the head, and of the connector unless `connector.stroke` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default)]
    pub label: LabelSettings,
    #[serde(default)]
    pub connector: ConnectorSettings,
}

impl ArrowConfig {
    pub fn new(from: impl Into<CategoryKey>, to: impl Into<CategoryKey>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            enabled: true,
            stroke: None,
            label: LabelSettings::default(),
            connector: ConnectorSettings::default(),
        }
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_label(mut self, label: LabelSettings) -> Self {
        self.label = label;
        self
    }

    pub fn head_stroke(&self) -> Stroke {
        self.stroke.clone().unwrap_or_default()
    }

    pub fn connector_stroke(&self) -> Stroke {
        self.connector
            .stroke
            .clone()
            .or_else(|| self.stroke.clone())
            .unwrap_or_default()
    }
}

/// Why an arrow was left out of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidReason {
    Disabled,
    UnresolvedFrom,
    UnresolvedTo,
    SelfLoop,
    Duplicate,
}

/// Outcome of validation, computed once per recalculation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "reason")]
pub enum Validity {
    /// Not validated since the last structural change.
    #[default]
    Pending,
    Valid,
    Invalid(InvalidReason),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Resolved geometry of one arrow, in category/value space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSettings {
    pub from_point: Point2D,
    pub to_point: Point2D,
    /// Value-axis coordinate of the connector's middle segment.
    pub horizontal_y: f64,
    pub is_up: bool,
}

/// Layout knobs shared by all arrows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Clearance between a stack edge and the connector's middle segment.
    pub minimal_gap: f64,
    /// Room kept around the connector line when computing its bounds.
    pub connector_padding: f64,
    pub head_size: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            minimal_gap: 15.0,
            connector_padding: 2.0,
            head_size: 10.0,
        }
    }
}

/// One arrow as held by the controller: its config plus the state of the
/// last pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    id: ArrowId,
    config: ArrowConfig,
    validity: Validity,
    label_text: String,
    /// Measured pixel size of the label text.
    label_size: Size,
    draw_settings: Option<DrawSettings>,
    bounds: Option<Rect>,
}

impl Arrow {
    pub(crate) fn new(id: ArrowId, config: ArrowConfig) -> Self {
        Self {
            id,
            config,
            validity: Validity::Pending,
            label_text: String::new(),
            label_size: Size::ZERO,
            draw_settings: None,
            bounds: None,
        }
    }

    pub fn id(&self) -> ArrowId {
        self.id
    }

    pub fn config(&self) -> &ArrowConfig {
        &self.config
    }

    pub fn from(&self) -> &str {
        &self.config.from
    }

    pub fn to(&self) -> &str {
        &self.config.to
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    pub fn label_size(&self) -> Size {
        self.label_size
    }

    /// `None` unless the arrow was valid in the last recalculation.
    pub fn draw_settings(&self) -> Option<DrawSettings> {
        self.draw_settings
    }

    /// Connector plus label bounds, category/value space.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Whether the label takes part in layout and rendering.
    pub fn has_label(&self) -> bool {
        self.config.label.enabled && !self.label_text.is_empty()
    }

    pub(crate) fn config_mut(&mut self) -> &mut ArrowConfig {
        &mut self.config
    }

    pub(crate) fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
    }

    pub(crate) fn set_label_text(&mut self, text: String) {
        self.label_text = text;
    }

    pub(crate) fn set_label_size(&mut self, size: Size) {
        self.label_size = size;
    }

    pub(crate) fn set_placement(&mut self, placement: Option<(DrawSettings, Rect)>) {
        self.draw_settings = placement.map(|p| p.0);
        self.bounds = placement.map(|p| p.1);
    }
}
