//! Arrow collection and the recalculation/appearance passes.

use super::engine::{self, ArrowGeometryEngine};
use super::render::{ArrowGraphics, ArrowRenderer};
use super::{Arrow, ArrowConfig, ArrowId, LayoutOptions};
use crate::chart::ChartLayout;
use crate::error::Result;
use crate::geometry::Size;
use crate::label::{format_label, format_number};
use crate::measure::{MeasureId, MeasureRequest, MeasurementBatcher, MeasurementTargetProvider};
use crate::scene::Surface;
use ahash::AHashMap;
use bitflags::bitflags;

bitflags! {
    /// Independent stale flags of the controller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        const NONE = 0b00;
        /// Geometry must be recomputed.
        const RECALCULATION = 0b01;
        /// Graphics must be redrawn.
        const APPEARANCE = 0b10;
        const ALL = Self::RECALCULATION.bits() | Self::APPEARANCE.bits();
    }
}

/// Label texts of a set of arrows, as measurement targets.
struct ArrowLabels<'a>(&'a [Arrow]);

impl MeasurementTargetProvider for ArrowLabels<'_> {
    fn collect_measurement_targets(&self) -> Vec<MeasureRequest> {
        self.0
            .iter()
            .filter(|a| a.has_label())
            .map(|a| MeasureRequest {
                id: MeasureId(a.id().0),
                text: a.label_text().to_string(),
                font_px: a.config().label.font_size,
            })
            .collect()
    }
}

/// Owns the arrows of a chart and the surface they are drawn on.
pub struct ArrowsController<S: Surface> {
    arrows: Vec<Arrow>,
    graphics: AHashMap<ArrowId, ArrowGraphics>,
    surface: S,
    batcher: MeasurementBatcher,
    options: LayoutOptions,
    locale: String,
    next_id: u64,
    state: Invalidation,
    in_pass: bool,
}

impl<S: Surface> ArrowsController<S> {
    pub fn new(surface: S) -> Self {
        Self::with_batcher(surface, MeasurementBatcher::default())
    }

    pub fn with_batcher(surface: S, batcher: MeasurementBatcher) -> Self {
        Self {
            arrows: Vec::new(),
            graphics: AHashMap::new(),
            surface,
            batcher,
            options: LayoutOptions::default(),
            locale: "en".to_string(),
            next_id: 0,
            state: Invalidation::NONE,
            in_pass: false,
        }
    }

    fn assert_idle(&self) {
        assert!(
            !self.in_pass,
            "arrows mutated while a layout pass is in progress"
        );
    }

    fn invalidate(&mut self, states: Invalidation) {
        self.state.insert(states);
    }

    pub fn invalidation(&self) -> Invalidation {
        self.state
    }

    /// Chart bounds, categories or data changed.
    pub fn invalidate_layout(&mut self) {
        self.assert_idle();
        self.invalidate(Invalidation::ALL);
    }

    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.assert_idle();
        if self.options != options {
            self.options = options;
            self.invalidate(Invalidation::ALL);
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.assert_idle();
        let locale = locale.into();
        if self.locale != locale {
            self.locale = locale;
            self.invalidate(Invalidation::ALL);
        }
    }

    /// Append a new arrow. Duplicates are accepted here and filtered at layout time.
    pub fn add_arrow(&mut self, config: ArrowConfig) -> ArrowId {
        self.assert_idle();
        self.next_id += 1;
        let id = ArrowId(self.next_id);
        self.arrows.push(Arrow::new(id, config));
        self.invalidate(Invalidation::ALL);
        id
    }

    /// Remove the arrow at `index` and release its graphics.
    pub fn remove_arrow_at(&mut self, index: usize) -> bool {
        self.assert_idle();
        if index >= self.arrows.len() {
            return false;
        }
        let arrow = self.arrows.remove(index);
        if let Some(g) = self.graphics.remove(&arrow.id()) {
            g.dispose(&mut self.surface);
        }
        self.invalidate(Invalidation::ALL);
        true
    }

    pub fn remove_arrow(&mut self, id: ArrowId) -> bool {
        match self.index_of(id) {
            Some(i) => self.remove_arrow_at(i),
            None => false,
        }
    }

    pub fn index_of(&self, id: ArrowId) -> Option<usize> {
        self.arrows.iter().position(|a| a.id() == id)
    }

    pub fn get_arrow(&self, index: usize) -> Option<&Arrow> {
        self.arrows.get(index)
    }

    pub fn arrow(&self, id: ArrowId) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.id() == id)
    }

    /// Snapshot of every arrow; changes to it do not reach the controller.
    pub fn get_all_arrows(&self) -> Vec<Arrow> {
        self.arrows.clone()
    }

    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    /// Edit an arrow's config. Changes that move geometry invalidate the
    /// layout; color-only changes only the appearance.
    pub fn configure_arrow(&mut self, id: ArrowId, edit: impl FnOnce(&mut ArrowConfig)) -> bool {
        self.assert_idle();
        let Some(arrow) = self.arrows.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        let before = arrow.config().clone();
        edit(arrow.config_mut());
        let after = arrow.config();
        if before == *after {
            return true;
        }
        let states = if affects_geometry(&before, after) {
            Invalidation::ALL
        } else {
            Invalidation::APPEARANCE
        };
        self.invalidate(states);
        true
    }

    /// Configs of all arrows, in order.
    pub fn serialize(&self) -> Vec<ArrowConfig> {
        self.arrows.iter().map(|a| a.config().clone()).collect()
    }

    /// Add one arrow per config record.
    pub fn setup_by_config(&mut self, configs: impl IntoIterator<Item = ArrowConfig>) {
        for config in configs {
            self.add_arrow(config);
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn measurement_flushes(&self) -> usize {
        self.batcher.flush_count()
    }

    /// Run whatever passes are stale. No-op without arrows.
    pub fn draw<C: ChartLayout + ?Sized>(&mut self, chart: &C) -> Result<()> {
        self.assert_idle();
        if self.arrows.is_empty() {
            return Ok(());
        }

        if self.state.contains(Invalidation::RECALCULATION) {
            self.in_pass = true;
            let res = self.recalculate(chart);
            self.in_pass = false;
            res?;
            self.state.remove(Invalidation::RECALCULATION);
            // New geometry always needs a repaint.
            self.state.insert(Invalidation::APPEARANCE);
        }

        if self.state.contains(Invalidation::APPEARANCE) {
            self.in_pass = true;
            self.redraw(chart);
            self.in_pass = false;
            self.state.remove(Invalidation::APPEARANCE);
        }
        Ok(())
    }

    fn recalculate<C: ChartLayout + ?Sized>(&mut self, chart: &C) -> Result<()> {
        log::trace!("arrows: recalculation of {} arrows", self.arrows.len());
        let validity = engine::validate(&self.arrows, chart);
        for (arrow, v) in self.arrows.iter_mut().zip(&validity) {
            arrow.set_validity(*v);
            let text = if v.is_valid() {
                label_text(arrow, chart, &self.locale)
            } else {
                String::new()
            };
            arrow.set_label_text(text);
        }

        // Nothing below may read label sizes before this flush.
        self.batcher.collect(&ArrowLabels(&self.arrows));
        let measurements = self.batcher.flush();
        for arrow in &mut self.arrows {
            let size = measurements
                .get(MeasureId(arrow.id().0))
                .unwrap_or(Size::ZERO);
            arrow.set_label_size(size);
        }

        let engine = ArrowGeometryEngine::new(chart, self.options)?;
        let placements = engine.layout(&self.arrows, &validity)?;
        for (arrow, placement) in self.arrows.iter_mut().zip(placements) {
            arrow.set_placement(placement.map(|p| (p.settings, p.bounds)));
        }
        log::trace!("arrows: recalculation done");
        Ok(())
    }

    fn redraw<C: ChartLayout + ?Sized>(&mut self, chart: &C) {
        log::trace!("arrows: appearance pass");
        let renderer = ArrowRenderer::for_chart(chart, self.options);
        for arrow in &self.arrows {
            let graphics = *self
                .graphics
                .entry(arrow.id())
                .or_insert_with(|| ArrowGraphics::create(&mut self.surface));
            renderer.draw(&mut self.surface, &graphics, arrow);
        }
    }
}

impl<S: Surface> MeasurementTargetProvider for ArrowsController<S> {
    fn collect_measurement_targets(&self) -> Vec<MeasureRequest> {
        ArrowLabels(&self.arrows).collect_measurement_targets()
    }
}

fn affects_geometry(before: &ArrowConfig, after: &ArrowConfig) -> bool {
    let (l0, l1) = (&before.label, &after.label);
    before.from != after.from
        || before.to != after.to
        || before.enabled != after.enabled
        || before.connector_stroke().extract_thickness()
            != after.connector_stroke().extract_thickness()
        || l0.enabled != l1.enabled
        || l0.format != l1.format
        || l0.position != l1.position
        || l0.anchor != l1.anchor
        || l0.offset_x != l1.offset_x
        || l0.offset_y != l1.offset_y
        || l0.font_size != l1.font_size
        || l0.font_family != l1.font_family
}

/// Label text of a valid arrow with its value tokens filled in.
fn label_text<C: ChartLayout + ?Sized>(arrow: &Arrow, chart: &C, locale: &str) -> String {
    let label = &arrow.config().label;
    if !label.enabled {
        return String::new();
    }
    let (Some(from), Some(to)) = (
        chart.index_by_value(arrow.from()),
        chart.index_by_value(arrow.to()),
    ) else {
        return String::new();
    };
    let from_value = chart.stack_value(from);
    let to_value = chart.stack_value(to);
    format_label(
        &label.format,
        &[
            ("Value", format_number(to_value - from_value, locale)),
            ("FromValue", format_number(from_value, locale)),
            ("ToValue", format_number(to_value, locale)),
            ("From", arrow.from().to_string()),
            ("To", arrow.to().to_string()),
        ],
    )
}
