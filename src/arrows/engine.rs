//! Arrow validation and geometry.
//!
//! A pass runs strictly in order: validate, compute base settings, shift each
//! connector clear of the stacks and of the arrows placed before it, then
//! spread arrows that share a stack across that stack's width. All geometry
//! is in category/value space (see [`crate::chart`]).

use super::{Arrow, DrawSettings, InvalidReason, LayoutOptions, Validity};
use crate::chart::ChartLayout;
use crate::error::{LayoutError, Result};
use crate::geometry::{Point2D, Rect, Size};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Validate `arrows` in declaration order. The first enabled arrow of a
/// `(from, to)` pair wins; later copies are duplicates.
pub fn validate<C: ChartLayout + ?Sized>(arrows: &[Arrow], chart: &C) -> Vec<Validity> {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    let mut out = Vec::with_capacity(arrows.len());

    for arrow in arrows {
        let validity = if !arrow.config().enabled {
            Validity::Invalid(InvalidReason::Disabled)
        } else {
            let pair = (arrow.from(), arrow.to());
            let v = if chart.index_by_value(pair.0).is_none() {
                Validity::Invalid(InvalidReason::UnresolvedFrom)
            } else if chart.index_by_value(pair.1).is_none() {
                Validity::Invalid(InvalidReason::UnresolvedTo)
            } else if pair.0 == pair.1 {
                Validity::Invalid(InvalidReason::SelfLoop)
            } else if seen.contains(&pair) {
                Validity::Invalid(InvalidReason::Duplicate)
            } else {
                Validity::Valid
            };
            seen.push(pair);
            v
        };

        if let Validity::Invalid(reason) = validity {
            log::debug!(
                "arrow {} -> {} skipped: {:?}",
                arrow.from(),
                arrow.to(),
                reason
            );
        }
        out.push(validity);
    }
    out
}

/// Rectangle around the middle segment of a connector drawn `thickness` wide.
pub fn connector_rect(settings: &DrawSettings, thickness: f64, padding: f64) -> Rect {
    let half = thickness / 2.0 + padding;
    let left = settings.from_point.x.min(settings.to_point.x);
    let width = (settings.to_point.x - settings.from_point.x).abs();
    Rect::new(left, settings.horizontal_y - half, width, half * 2.0)
}

/// Geometry of one valid arrow after a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub settings: DrawSettings,
    pub bounds: Rect,
}

/// Stateless geometry over one chart snapshot.
pub struct ArrowGeometryEngine<'a, C: ChartLayout + ?Sized> {
    chart: &'a C,
    options: LayoutOptions,
    normal_up: bool,
    normal_right: bool,
    /// Full bounds of every stack, indexed like the category axis.
    stacks: Vec<Rect>,
}

impl<'a, C: ChartLayout + ?Sized> ArrowGeometryEngine<'a, C> {
    /// Snapshot the chart. Fails if a stack index has no bounds.
    pub fn new(chart: &'a C, options: LayoutOptions) -> Result<Self> {
        let mut engine = Self {
            chart,
            options,
            normal_up: chart.normal_up_direction(),
            normal_right: chart.normal_right_direction(),
            stacks: Vec::with_capacity(chart.stacks_count()),
        };
        for i in 0..chart.stacks_count() {
            let full = engine.stack_full_bounds(i)?;
            engine.stacks.push(full);
        }
        Ok(engine)
    }

    pub fn normal_up(&self) -> bool {
        self.normal_up
    }

    pub fn normal_right(&self) -> bool {
        self.normal_right
    }

    pub fn stacks(&self) -> &[Rect] {
        &self.stacks
    }

    fn raw_stack_bounds(&self, index: usize) -> Result<Rect> {
        self.chart
            .stack_bounds(index)
            .ok_or(LayoutError::MissingStackBounds { index })
    }

    /// Pixel label rectangles moved into category/value space.
    fn fix_label_bounds(&self, r: Rect) -> Rect {
        if self.chart.is_vertical() {
            r.transposed()
        } else {
            r
        }
    }

    /// Stack bounds with non-negative extent, grown to cover its data labels.
    pub fn stack_full_bounds(&self, index: usize) -> Result<Rect> {
        let mut bounds = self.raw_stack_bounds(index)?.normalized();
        for series in 0..self.chart.series_count() {
            if let Some(label) = self.chart.series_label_bounds(series, index) {
                bounds = bounds.bounding_rect(&self.fix_label_bounds(label));
            }
        }
        if let Some(label) = self.chart.stack_label_bounds(index) {
            bounds = bounds.bounding_rect(&self.fix_label_bounds(label));
        }
        Ok(bounds)
    }

    fn resolve(&self, arrow: &Arrow) -> Option<(usize, usize)> {
        Some((
            self.chart.index_by_value(arrow.from())?,
            self.chart.index_by_value(arrow.to())?,
        ))
    }

    fn is_up(&self, from_index: usize) -> bool {
        self.chart.stack_diff(from_index) >= 0.0
    }

    /// Anchor points and the starting connector line of an arrow.
    pub fn base_settings(&self, from_index: usize, to_index: usize) -> Result<DrawSettings> {
        let from = self.full(from_index)?;
        let to = self.full(to_index)?;
        let is_up = self.is_up(from_index);
        let towards_top = is_up == self.normal_up;

        let edge = |r: &Rect| if towards_top { r.top } else { r.bottom() };
        let from_point = Point2D::new(from.center_x(), edge(&from));
        let to_point = Point2D::new(to.center_x(), edge(&to));

        let gap = self.options.minimal_gap;
        let horizontal_y = if towards_top {
            from_point.y.min(to_point.y) - gap
        } else {
            from_point.y.max(to_point.y) + gap
        };

        Ok(DrawSettings {
            from_point,
            to_point,
            horizontal_y,
            is_up,
        })
    }

    fn full(&self, index: usize) -> Result<Rect> {
        self.stacks
            .get(index)
            .copied()
            .ok_or(LayoutError::MissingStackBounds { index })
    }

    /// Label size in category/value space.
    fn label_size(&self, arrow: &Arrow) -> Size {
        if self.chart.is_vertical() {
            arrow.label_size().transposed()
        } else {
            arrow.label_size()
        }
    }

    /// Rectangle around the connector's middle segment.
    pub fn connector_bounds(&self, settings: &DrawSettings, arrow: &Arrow) -> Rect {
        connector_rect(
            settings,
            arrow.config().connector_stroke().extract_thickness(),
            self.options.connector_padding,
        )
    }

    /// Where the label text box sits for `settings`.
    pub fn label_bounds(&self, settings: &DrawSettings, arrow: &Arrow) -> Option<Rect> {
        if !arrow.has_label() {
            return None;
        }
        let connector = self.connector_bounds(settings, arrow);
        Some(
            arrow
                .config()
                .label
                .text_bounds(&connector, self.label_size(arrow)),
        )
    }

    /// Connector bounds united with the label box.
    pub fn arrow_bounds(&self, settings: &DrawSettings, arrow: &Arrow) -> Rect {
        let connector = self.connector_bounds(settings, arrow);
        match self.label_bounds(settings, arrow) {
            Some(label) => connector.bounding_rect(&label),
            None => connector,
        }
    }

    /// Shift that makes `free` flush with `fixed`, zero if they do not touch.
    pub fn intersection_delta(&self, fixed: &Rect, free: &Rect, is_up: bool) -> f64 {
        if !fixed.intersects(free) {
            return 0.0;
        }
        if is_up == self.normal_up {
            fixed.top - free.bottom()
        } else {
            fixed.bottom() - free.top
        }
    }

    /// Greedy single sweep over `fixed`, nearest obstacle in the travel
    /// direction last. Returns the settings with the accumulated shift.
    pub fn resolve_collisions(
        &self,
        base: DrawSettings,
        arrow: &Arrow,
        fixed: &mut [Rect],
    ) -> DrawSettings {
        let towards_top = base.is_up == self.normal_up;
        fixed.sort_by(|a, b| {
            if towards_top {
                b.bottom().partial_cmp(&a.bottom()).unwrap_or(Ordering::Equal)
            } else {
                a.top.partial_cmp(&b.top).unwrap_or(Ordering::Equal)
            }
        });

        let mut settings = base;
        let mut free = self.arrow_bounds(&settings, arrow);
        for obstacle in fixed.iter() {
            let delta = self.intersection_delta(obstacle, &free, settings.is_up);
            if delta != 0.0 {
                log::debug!(
                    "arrow {} -> {} shifted by {:.1} off {:?}",
                    arrow.from(),
                    arrow.to(),
                    delta,
                    obstacle
                );
                settings.horizontal_y += delta;
                free = self.arrow_bounds(&settings, arrow);
            }
        }
        settings
    }

    fn is_going_right_from_stack(from: usize, to: usize, stack: usize) -> bool {
        from.min(to).min(stack) == stack
    }

    /// Place every valid arrow. The result is aligned with `arrows`; entries
    /// for arrows that are not valid in `validity` are `None`.
    pub fn layout(&self, arrows: &[Arrow], validity: &[Validity]) -> Result<Vec<Option<Placement>>> {
        let mut settings: Vec<Option<DrawSettings>> = vec![None; arrows.len()];
        let mut indexes: Vec<Option<(usize, usize)>> = vec![None; arrows.len()];
        let mut placed_bounds: Vec<Rect> = Vec::new();
        let mut groups: Vec<VecDeque<usize>> = vec![VecDeque::new(); self.stacks.len()];

        for (i, arrow) in arrows.iter().enumerate() {
            if !validity.get(i).is_some_and(Validity::is_valid) {
                continue;
            }
            let Some((from, to)) = self.resolve(arrow) else {
                continue;
            };
            let base = self.base_settings(from, to)?;

            let mut fixed: Vec<Rect> = placed_bounds
                .iter()
                .chain(self.stacks.iter())
                .copied()
                .collect();
            let resolved = self.resolve_collisions(base, arrow, &mut fixed);

            if to > from {
                groups[from].push_back(i);
                groups[to].push_front(i);
            } else {
                groups[from].push_front(i);
                groups[to].push_back(i);
            }

            placed_bounds.push(self.arrow_bounds(&resolved, arrow));
            settings[i] = Some(resolved);
            indexes[i] = Some((from, to));
        }

        for (stack, group) in groups.iter().enumerate() {
            if group.len() < 2 {
                continue;
            }
            let (up, down): (Vec<usize>, Vec<usize>) = group
                .iter()
                .copied()
                .partition(|&i| settings[i].is_some_and(|s| s.is_up));
            self.spread_points(up, stack, &mut settings, &indexes)?;
            self.spread_points(down, stack, &mut settings, &indexes)?;
        }

        Ok(arrows
            .iter()
            .zip(settings)
            .map(|(arrow, s)| {
                s.map(|settings| Placement {
                    settings,
                    bounds: self.arrow_bounds(&settings, arrow),
                })
            })
            .collect())
    }

    /// Distribute the anchor `x` of arrows touching `stack` evenly across it.
    fn spread_points(
        &self,
        mut group: Vec<usize>,
        stack: usize,
        settings: &mut [Option<DrawSettings>],
        indexes: &[Option<(usize, usize)>],
    ) -> Result<()> {
        if group.is_empty() {
            return Ok(());
        }
        let bounds = self.raw_stack_bounds(stack)?;
        let step = bounds.width / (group.len() as f64 + 1.0);

        let going_right = |i: usize| {
            indexes[i].is_some_and(|(f, t)| Self::is_going_right_from_stack(f, t, stack))
        };
        group.sort_by(|&prev, &next| {
            let prev_right = going_right(prev);
            if prev_right != going_right(next) {
                return if prev_right == self.normal_right {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            let (Some(p), Some(n)) = (settings[prev], settings[next]) else {
                return Ordering::Equal;
            };
            let ord = p
                .horizontal_y
                .partial_cmp(&n.horizontal_y)
                .unwrap_or(Ordering::Equal);
            if p.is_up == self.normal_up { ord } else { ord.reverse() }
        });

        for (slot, &i) in group.iter().enumerate() {
            let x = bounds.left + (slot as f64 + 1.0) * step;
            let is_from = indexes[i].is_some_and(|(f, _)| f == stack);
            if let Some(s) = settings[i].as_mut() {
                if is_from {
                    s.from_point.x = x;
                } else {
                    s.to_point.x = x;
                }
            }
        }
        Ok(())
    }
}
