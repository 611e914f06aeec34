//! Chart-facing entry point: arrows and totals of one waterfall.

use crate::arrows::controller::ArrowsController;
use crate::arrows::{Arrow, ArrowConfig, ArrowId, LayoutOptions};
use crate::chart::ChartLayout;
use crate::error::Result;
use crate::models::Series;
use crate::scene::Surface;
use crate::totals::aggregate::SeriesRow;
use crate::totals::storage::TotalsStorage;
use crate::totals::{Total, TotalConfig, TotalId};
use serde::{Deserialize, Serialize};

/// Flat serializable form of all annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    pub arrows: Vec<ArrowConfig>,
    pub totals: Vec<TotalConfig>,
}

pub struct Annotations<S: Surface> {
    arrows: ArrowsController<S>,
    totals: TotalsStorage,
}

impl<S: Surface> Annotations<S> {
    pub fn new(surface: S) -> Self {
        Self {
            arrows: ArrowsController::new(surface),
            totals: TotalsStorage::new(),
        }
    }

    pub fn with_options(surface: S, options: LayoutOptions) -> Self {
        let mut a = Self::new(surface);
        a.arrows.set_options(options);
        a
    }

    pub fn arrows(&self) -> &ArrowsController<S> {
        &self.arrows
    }

    pub fn arrows_mut(&mut self) -> &mut ArrowsController<S> {
        &mut self.arrows
    }

    pub fn totals(&self) -> &TotalsStorage {
        &self.totals
    }

    pub fn add_arrow(&mut self, config: ArrowConfig) -> ArrowId {
        self.arrows.add_arrow(config)
    }

    pub fn remove_arrow_at(&mut self, index: usize) -> bool {
        self.arrows.remove_arrow_at(index)
    }

    pub fn remove_arrow(&mut self, id: ArrowId) -> bool {
        self.arrows.remove_arrow(id)
    }

    pub fn get_arrow(&self, index: usize) -> Option<&Arrow> {
        self.arrows.get_arrow(index)
    }

    pub fn get_all_arrows(&self) -> Vec<Arrow> {
        self.arrows.get_all_arrows()
    }

    /// Structural: the axis gains or loses a category.
    pub fn add_total(&mut self, config: TotalConfig) -> TotalId {
        let before = self.totals.len();
        let id = self.totals.add_total(config);
        if self.totals.len() != before {
            self.arrows.invalidate_layout();
        }
        id
    }

    pub fn remove_total_at(&mut self, index: usize) -> bool {
        let removed = self.totals.remove_total_at(index);
        if removed {
            self.arrows.invalidate_layout();
        }
        removed
    }

    pub fn remove_total(&mut self, id: TotalId) -> bool {
        let removed = self.totals.remove_total(id);
        if removed {
            self.arrows.invalidate_layout();
        }
        removed
    }

    /// Edit a total. Moving it to another category reshapes the axis.
    pub fn configure_total(&mut self, id: TotalId, edit: impl FnOnce(&mut TotalConfig)) -> bool {
        let Some(before) = self.totals.total(id).map(|t| t.category().to_string()) else {
            return false;
        };
        let applied = self.totals.configure_total(id, edit);
        if applied && self.totals.total(id).is_some_and(|t| t.category() != before) {
            self.arrows.invalidate_layout();
        }
        applied
    }

    pub fn get_total_at(&self, index: usize) -> Option<&Total> {
        self.totals.total_at(index)
    }

    pub fn get_all_totals(&self) -> Vec<Total> {
        self.totals.all_totals()
    }

    /// Recompute total rows for `datasets`. Arrow geometry goes stale when
    /// the category table or the axis rows differ from the last pass.
    pub fn calculate(&mut self, datasets: &[Series]) -> &[SeriesRow] {
        let combined = self.totals.combined().clone();
        let rows = self.totals.rows().to_vec();
        self.totals.calculate(datasets);
        if *self.totals.combined() != combined || self.totals.rows() != rows.as_slice() {
            self.arrows.invalidate_layout();
        }
        self.totals.rows()
    }

    /// The chart was laid out anew.
    pub fn invalidate_layout(&mut self) {
        self.arrows.invalidate_layout();
    }

    /// Lay out and paint arrows against `chart`. No-op with no annotations.
    pub fn draw<C: ChartLayout + ?Sized>(&mut self, chart: &C) -> Result<()> {
        if self.arrows.is_empty() && self.totals.is_empty() {
            return Ok(());
        }
        self.arrows.draw(chart)
    }

    pub fn to_config(&self) -> AnnotationsConfig {
        AnnotationsConfig {
            arrows: self.arrows.serialize(),
            totals: self.totals.serialize(),
        }
    }

    /// Add everything in `config` on top of the current annotations.
    pub fn apply_config(&mut self, config: AnnotationsConfig) {
        self.arrows.setup_by_config(config.arrows);
        for total in config.totals {
            self.add_total(total);
        }
    }

    pub fn surface(&self) -> &S {
        self.arrows.surface()
    }
}
