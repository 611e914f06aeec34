//! Total bars: aggregate points inserted right after an anchor category.

pub mod aggregate;
pub mod storage;

use crate::label::LabelSettings;
use crate::models::CategoryKey;
use crate::style::{Fill, HatchFill, Stroke};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TotalId(pub u64);

/// Configuration record of one total. `category` is accepted for `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalConfig {
    #[serde(alias = "category")]
    pub x: CategoryKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hatch_fill: Option<HatchFill>,
    #[serde(default)]
    pub label: LabelSettings,
}

impl TotalConfig {
    pub fn new(category: impl Into<CategoryKey>) -> Self {
        Self {
            x: category.into(),
            name: None,
            fill: None,
            stroke: None,
            hatch_fill: None,
            label: LabelSettings::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Total {
    id: TotalId,
    config: TotalConfig,
    value: Option<f64>,
}

impl Total {
    pub(crate) fn new(id: TotalId, config: TotalConfig) -> Self {
        Self {
            id,
            config,
            value: None,
        }
    }

    pub fn id(&self) -> TotalId {
        self.id
    }

    pub fn config(&self) -> &TotalConfig {
        &self.config
    }

    /// Anchor category the total is inserted after.
    pub fn category(&self) -> &str {
        &self.config.x
    }

    /// Display name, `"Total <category>"` unless configured.
    pub fn name(&self) -> String {
        self.config
            .name
            .clone()
            .unwrap_or_else(|| format!("Total {}", self.config.x))
    }

    /// Value of the last `calculate`; `None` if the anchor was missing.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub(crate) fn config_mut(&mut self) -> &mut TotalConfig {
        &mut self.config
    }

    pub(crate) fn set_value(&mut self, value: Option<f64>) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_alias_and_default_name() {
        let cfg: TotalConfig = serde_json::from_str(r#"{"category":"Q2"}"#).unwrap();
        assert_eq!(cfg.x, "Q2");
        let t = Total::new(TotalId(1), cfg);
        assert_eq!(t.name(), "Total Q2");
        assert_eq!(t.value(), None);
    }
}
