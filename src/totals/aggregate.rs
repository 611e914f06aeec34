//! Combining series into a category table and splicing total rows into it.

use super::{Total, TotalId};
use crate::models::{CategoryKey, Series};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// Per-category values, one slot per series in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CombinedData {
    /// First-seen order across all series.
    pub categories: Vec<CategoryKey>,
    pub values: Vec<Vec<f64>>,
}

impl CombinedData {
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }
}

/// Build the category table. Missing cells are `0`; repeated rows of one
/// series at one category add up.
pub fn combine(datasets: &[Series]) -> CombinedData {
    let width = datasets.len();
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut out = CombinedData::default();

    for (s, series) in datasets.iter().enumerate() {
        for row in &series.data {
            let i = *index.entry(row.x.as_str()).or_insert_with(|| {
                out.categories.push(row.x.clone());
                out.values.push(vec![0.0; width]);
                out.categories.len() - 1
            });
            out.values[i][s] += row.value.unwrap_or(0.0);
        }
    }
    out
}

/// Sum of every cell from the first category through `anchor`, inclusive.
pub fn compute_total_value(combined: &CombinedData, anchor: usize) -> f64 {
    combined
        .values
        .iter()
        .take(anchor + 1)
        .flatten()
        .sum()
}

/// A synthetic total point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRow {
    /// Axis key, never equal to a real category.
    pub x: String,
    pub category: CategoryKey,
    pub name: String,
    pub value: f64,
    pub total: TotalId,
}

/// One slot of the final axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SeriesRow {
    Category { x: CategoryKey },
    Total(TotalRow),
}

impl SeriesRow {
    pub fn key(&self) -> &str {
        match self {
            SeriesRow::Category { x } => x,
            SeriesRow::Total(t) => &t.x,
        }
    }

    pub fn as_total(&self) -> Option<&TotalRow> {
        match self {
            SeriesRow::Total(t) => Some(t),
            SeriesRow::Category { .. } => None,
        }
    }
}

fn unique_key(base: String, taken: &AHashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base} #{n}"))
        .find(|k| !taken.contains(k))
        .unwrap_or(base)
}

/// Category rows with a total row spliced after each anchor present in
/// `combined`. Totals whose anchor is missing are left out.
pub fn build_synthetic_rows(totals: &[Total], combined: &CombinedData) -> Vec<SeriesRow> {
    let mut rows: Vec<SeriesRow> = combined
        .categories
        .iter()
        .map(|c| SeriesRow::Category { x: c.clone() })
        .collect();
    let mut taken: AHashSet<String> = combined.categories.iter().cloned().collect();

    let mut anchored: Vec<(usize, &Total)> = Vec::with_capacity(totals.len());
    for total in totals {
        match combined.index_of(total.category()) {
            Some(i) => anchored.push((i, total)),
            None => log::debug!(
                "total {:?} excluded: category {:?} not present",
                total.name(),
                total.category()
            ),
        }
    }
    anchored.sort_by_key(|(i, _)| *i);

    for (inserted, (anchor, total)) in anchored.into_iter().enumerate() {
        let x = unique_key(format!("Total {}", total.category()), &taken);
        taken.insert(x.clone());
        let row = TotalRow {
            x,
            category: total.category().to_string(),
            name: total.name(),
            value: compute_total_value(combined, anchor),
            total: total.id(),
        };
        rows.insert(anchor + 1 + inserted, SeriesRow::Total(row));
    }
    rows
}
