//! Owner of the totals collection and of the last computed total rows.

use super::aggregate::{CombinedData, SeriesRow, build_synthetic_rows, combine};
use super::{Total, TotalConfig, TotalId};
use crate::models::Series;

#[derive(Debug, Clone, Default)]
pub struct TotalsStorage {
    totals: Vec<Total>,
    next_id: u64,
    dirty: bool,
    combined: CombinedData,
    rows: Vec<SeriesRow>,
}

impl TotalsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a total, or return the one already anchored at the same category.
    pub fn add_total(&mut self, config: TotalConfig) -> TotalId {
        if let Some(existing) = self.totals.iter().find(|t| t.category() == config.x) {
            return existing.id();
        }
        self.next_id += 1;
        let id = TotalId(self.next_id);
        self.totals.push(Total::new(id, config));
        self.dirty = true;
        id
    }

    pub fn remove_total_at(&mut self, index: usize) -> bool {
        if index >= self.totals.len() {
            return false;
        }
        self.totals.remove(index);
        self.dirty = true;
        true
    }

    pub fn remove_total(&mut self, id: TotalId) -> bool {
        match self.totals.iter().position(|t| t.id() == id) {
            Some(i) => self.remove_total_at(i),
            None => false,
        }
    }

    pub fn total_at(&self, index: usize) -> Option<&Total> {
        self.totals.get(index)
    }

    pub fn total(&self, id: TotalId) -> Option<&Total> {
        self.totals.iter().find(|t| t.id() == id)
    }

    /// Snapshot of every total.
    pub fn all_totals(&self) -> Vec<Total> {
        self.totals.clone()
    }

    /// Edit a total's config. Returns `false` for an unknown id, or when the
    /// edit would move it onto a category another total already uses; the
    /// total is left untouched then.
    pub fn configure_total(&mut self, id: TotalId, edit: impl FnOnce(&mut TotalConfig)) -> bool {
        let Some(index) = self.totals.iter().position(|t| t.id() == id) else {
            return false;
        };
        let before = self.totals[index].config();
        let mut edited = before.clone();
        edit(&mut edited);
        if edited == *before {
            return true;
        }
        if edited.x != before.x
            && self
                .totals
                .iter()
                .any(|t| t.id() != id && t.category() == edited.x)
        {
            return false;
        }
        *self.totals[index].config_mut() = edited;
        self.dirty = true;
        true
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Whether totals changed since the last `calculate`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Data changed outside the storage.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Recompute the axis rows from `datasets` and stamp every total's value.
    pub fn calculate(&mut self, datasets: &[Series]) -> &[SeriesRow] {
        self.combined = combine(datasets);
        self.rows = build_synthetic_rows(&self.totals, &self.combined);
        for total in &mut self.totals {
            let value = self
                .rows
                .iter()
                .filter_map(SeriesRow::as_total)
                .find(|r| r.total == total.id())
                .map(|r| r.value);
            total.set_value(value);
        }
        self.dirty = false;
        &self.rows
    }

    /// Rows of the last `calculate`.
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    /// Category table of the last `calculate`.
    pub fn combined(&self) -> &CombinedData {
        &self.combined
    }

    pub fn serialize(&self) -> Vec<TotalConfig> {
        self.totals.iter().map(|t| t.config().clone()).collect()
    }

    pub fn setup_by_config(&mut self, configs: impl IntoIterator<Item = TotalConfig>) {
        for config in configs {
            self.add_total(config);
        }
    }
}
