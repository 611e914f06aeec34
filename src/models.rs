use serde::{Deserialize, Serialize};

/// Discrete category-axis identifier a data point, arrow end or total is anchored to.
pub type CategoryKey = String;

/// One observation of a series: a category and its (possibly missing) delta value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataRow {
    pub x: CategoryKey,
    #[serde(default)]
    pub value: Option<f64>,
}

impl DataRow {
    pub fn new(x: impl Into<CategoryKey>, value: f64) -> Self {
        Self {
            x: x.into(),
            value: Some(value),
        }
    }

    pub fn missing(x: impl Into<CategoryKey>) -> Self {
        Self {
            x: x.into(),
            value: None,
        }
    }
}

/// A named dataset, rows in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub data: Vec<DataRow>,
}

impl Series {
    pub fn new(name: impl Into<String>, data: Vec<DataRow>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Convenience constructor from `(category, value)` pairs.
    pub fn from_pairs<K: Into<CategoryKey>>(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(x, v)| DataRow::new(x, v))
                .collect(),
        )
    }
}
