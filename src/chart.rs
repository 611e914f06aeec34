//! The chart side of the layout: the [`ChartLayout`] collaborator trait the
//! annotation engine reads, and two implementations of it.
//!
//! Stack bounds are reported in *category/value space*: `x` runs along the
//! category axis and `y` along the value axis, in pixels. On a horizontal chart
//! this is plain pixel space; on a transposed (vertical) chart the two axes are
//! swapped. Label bounds, on the other hand, come straight from the text
//! renderer and are always in pixel space.

use crate::geometry::{Point2D, Rect, Size};
use crate::label::format_number;
use crate::measure::{HeuristicMeasurer, TextMeasurer};
use crate::totals::aggregate::{CombinedData, SeriesRow};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Narrow view of a rendered waterfall chart.
pub trait ChartLayout {
    /// Axis index of a category key, `None` if the key is not on the axis.
    fn index_by_value(&self, key: &str) -> Option<usize>;

    fn stacks_count(&self) -> usize;

    /// Bounds of the bar(s) at `index`. Height may be negative.
    fn stack_bounds(&self, index: usize) -> Option<Rect>;

    /// Signed sum of the deltas stacked at `index`.
    fn stack_diff(&self, index: usize) -> f64;

    /// Absolute value reached by the stack at `index`.
    fn stack_value(&self, index: usize) -> f64;

    fn series_count(&self) -> usize;

    /// Pixel bounds of the data label of `series` at `index`, if one is drawn.
    fn series_label_bounds(&self, series: usize, index: usize) -> Option<Rect>;

    /// Pixel bounds of the stack total label at `index`, if one is drawn.
    fn stack_label_bounds(&self, _index: usize) -> Option<Rect> {
        None
    }

    fn is_vertical(&self) -> bool;

    fn y_inverted(&self) -> bool;

    fn x_inverted(&self) -> bool;

    /// Whether a larger value means a smaller `y` in category/value space.
    fn normal_up_direction(&self) -> bool {
        self.is_vertical() == self.y_inverted()
    }

    /// Whether a larger category index means a larger `x` in category/value space.
    fn normal_right_direction(&self) -> bool {
        self.is_vertical() == self.x_inverted()
    }
}

/// Axis orientation flags of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Orientation {
    /// Categories run along the vertical pixel axis.
    pub vertical: bool,
    pub y_inverted: bool,
    pub x_inverted: bool,
}

impl Orientation {
    pub fn normal_up_direction(&self) -> bool {
        self.vertical == self.y_inverted
    }

    pub fn normal_right_direction(&self) -> bool {
        self.vertical == self.x_inverted
    }

    /// Category/value space to pixel space for a point.
    pub fn to_pixel(&self, p: Point2D) -> Point2D {
        if self.vertical { p.transposed() } else { p }
    }

    /// Category/value space to pixel space for a rectangle (and back, it is an involution).
    pub fn to_pixel_rect(&self, r: &Rect) -> Rect {
        if self.vertical { r.transposed() } else { *r }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StaticStack {
    key: String,
    bounds: Rect,
    diff: f64,
    value: f64,
    series_labels: Vec<Option<Rect>>,
    stack_label: Option<Rect>,
}

/// A chart whose stacks are given explicitly. Handy when the host renderer has
/// already laid out the bars and only the annotations are computed here.
#[derive(Debug, Clone, Default)]
pub struct StaticChart {
    stacks: Vec<StaticStack>,
    index: AHashMap<String, usize>,
    series_count: usize,
    orientation: Orientation,
}

impl StaticChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category with its stack bounds and delta. The stack value
    /// defaults to the running sum of deltas.
    pub fn with_stack(mut self, key: impl Into<String>, bounds: Rect, diff: f64) -> Self {
        let key = key.into();
        let value = self.stacks.last().map(|s| s.value).unwrap_or(0.0) + diff;
        self.index.insert(key.clone(), self.stacks.len());
        self.stacks.push(StaticStack {
            key,
            bounds,
            diff,
            value,
            series_labels: Vec::new(),
            stack_label: None,
        });
        self
    }

    /// Attach a pixel-space data label rectangle of `series` to the stack at `index`.
    pub fn with_series_label(mut self, index: usize, series: usize, bounds: Rect) -> Self {
        if let Some(stack) = self.stacks.get_mut(index) {
            if stack.series_labels.len() <= series {
                stack.series_labels.resize(series + 1, None);
            }
            stack.series_labels[series] = Some(bounds);
            self.series_count = self.series_count.max(series + 1);
        }
        self
    }

    pub fn with_stack_label(mut self, index: usize, bounds: Rect) -> Self {
        if let Some(stack) = self.stacks.get_mut(index) {
            stack.stack_label = Some(bounds);
        }
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_series_count(mut self, count: usize) -> Self {
        self.series_count = self.series_count.max(count);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stacks.iter().map(|s| s.key.as_str())
    }
}

impl ChartLayout for StaticChart {
    fn index_by_value(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn stacks_count(&self) -> usize {
        self.stacks.len()
    }

    fn stack_bounds(&self, index: usize) -> Option<Rect> {
        self.stacks.get(index).map(|s| s.bounds)
    }

    fn stack_diff(&self, index: usize) -> f64 {
        self.stacks.get(index).map(|s| s.diff).unwrap_or(0.0)
    }

    fn stack_value(&self, index: usize) -> f64 {
        self.stacks.get(index).map(|s| s.value).unwrap_or(0.0)
    }

    fn series_count(&self) -> usize {
        self.series_count
    }

    fn series_label_bounds(&self, series: usize, index: usize) -> Option<Rect> {
        self.stacks
            .get(index)
            .and_then(|s| s.series_labels.get(series).copied().flatten())
    }

    fn stack_label_bounds(&self, index: usize) -> Option<Rect> {
        self.stacks.get(index).and_then(|s| s.stack_label)
    }

    fn is_vertical(&self) -> bool {
        self.orientation.vertical
    }

    fn y_inverted(&self) -> bool {
        self.orientation.y_inverted
    }

    fn x_inverted(&self) -> bool {
        self.orientation.x_inverted
    }
}

/// Input of one category column of a waterfall.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Per-series deltas stacked on the running sum.
    Delta(Vec<f64>),
    /// Absolute bar from zero.
    Total(f64),
}

/// Text drawn next to a column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnLabel {
    /// The value the stack reaches.
    #[default]
    Value,
    Custom(String),
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub kind: ColumnKind,
    pub label: ColumnLabel,
}

impl Column {
    /// Columns in axis order from combined series data and the row list produced by
    /// [`crate::totals::aggregate::build_synthetic_rows`].
    pub fn from_rows(combined: &CombinedData, rows: &[SeriesRow]) -> Vec<Column> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                SeriesRow::Category { x: key } => {
                    let values = combined
                        .index_of(key)
                        .and_then(|i| combined.values.get(i))
                        .cloned()
                        .unwrap_or_default();
                    out.push(Column {
                        key: key.clone(),
                        kind: ColumnKind::Delta(values),
                        label: ColumnLabel::Value,
                    });
                }
                SeriesRow::Total(t) => out.push(Column {
                    key: t.x.clone(),
                    kind: ColumnKind::Total(t.value),
                    label: ColumnLabel::Value,
                }),
            }
        }
        out
    }
}

/// One stacked segment of a column, in value units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// `None` for total bars.
    pub series: Option<usize>,
    pub start: f64,
    pub end: f64,
}

/// Computed geometry of one column, in category/value space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGeometry {
    pub key: String,
    pub is_total: bool,
    pub segments: Vec<Segment>,
    pub diff: f64,
    pub value: f64,
    /// Band the column occupies along the category axis (left, width).
    pub band: (f64, f64),
    pub bounds: Rect,
    pub label_text: Option<String>,
    pub label_bounds: Option<Rect>,
}

/// Options for [`BarChartLayout::build`].
#[derive(Debug, Clone)]
pub struct BarLayoutOptions {
    pub orientation: Orientation,
    /// Fraction of the category band covered by the bar.
    pub bar_width: f64,
    /// Draw the reached value next to every stack.
    pub stack_labels: bool,
    pub label_font_px: u32,
    pub locale: String,
}

impl Default for BarLayoutOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            bar_width: 0.6,
            stack_labels: true,
            label_font_px: 11,
            locale: "en".to_string(),
        }
    }
}

/// Waterfall bar layout computed from columns for a pixel plot area.
#[derive(Debug, Clone)]
pub struct BarChartLayout {
    columns: Vec<ColumnGeometry>,
    index: AHashMap<String, usize>,
    series_count: usize,
    orientation: Orientation,
    plot: Rect,
    value_range: (f64, f64),
}

const LABEL_GAP: f64 = 4.0;

impl BarChartLayout {
    /// Lay out `columns` inside the pixel rectangle `plot`.
    pub fn build(columns: &[Column], plot: Rect, opts: &BarLayoutOptions) -> Self {
        let orientation = opts.orientation;
        let series_count = columns
            .iter()
            .map(|c| match &c.kind {
                ColumnKind::Delta(v) => v.len(),
                ColumnKind::Total(_) => 0,
            })
            .max()
            .unwrap_or(0);

        // Pass 1: stack values.
        let mut running = 0.0;
        let mut stacked: Vec<(Vec<Segment>, f64, f64, bool)> = Vec::with_capacity(columns.len());
        for col in columns {
            match &col.kind {
                ColumnKind::Delta(values) => {
                    let mut cur = running;
                    let mut segments = Vec::with_capacity(values.len());
                    for (s, v) in values.iter().enumerate() {
                        segments.push(Segment {
                            series: Some(s),
                            start: cur,
                            end: cur + v,
                        });
                        cur += v;
                    }
                    let diff = cur - running;
                    running = cur;
                    stacked.push((segments, diff, cur, false));
                }
                ColumnKind::Total(v) => {
                    let seg = Segment {
                        series: None,
                        start: 0.0,
                        end: *v,
                    };
                    stacked.push((vec![seg], *v, *v, true));
                }
            }
        }

        let (mut vmin, mut vmax) = (0.0_f64, 0.0_f64);
        for (segments, _, _, _) in &stacked {
            for s in segments {
                vmin = vmin.min(s.start.min(s.end));
                vmax = vmax.max(s.start.max(s.end));
            }
        }
        if (vmax - vmin).abs() < f64::EPSILON {
            vmax += 1.0;
        }
        // Leave room beyond the bars for arrows and labels.
        let pad = (vmax - vmin) * 0.2;
        let value_range = (if vmin < 0.0 { vmin - pad } else { vmin }, vmax + pad);

        let logical_plot = orientation.to_pixel_rect(&plot);
        let n = columns.len().max(1) as f64;
        let band_w = logical_plot.width / n;
        let measurer = HeuristicMeasurer;

        let mut layout = Self {
            columns: Vec::with_capacity(columns.len()),
            index: AHashMap::with_capacity(columns.len()),
            series_count,
            orientation,
            plot,
            value_range,
        };

        // Pass 2: pixels.
        for (i, (col, (segments, diff, value, is_total))) in
            columns.iter().zip(stacked).enumerate()
        {
            let band_left = if orientation.normal_right_direction() {
                logical_plot.left + i as f64 * band_w
            } else {
                logical_plot.right() - (i as f64 + 1.0) * band_w
            };
            let bar_w = band_w * opts.bar_width;
            let bar_left = band_left + (band_w - bar_w) / 2.0;

            let lo = segments
                .iter()
                .map(|s| s.start.min(s.end))
                .fold(f64::INFINITY, f64::min);
            let hi = segments
                .iter()
                .map(|s| s.start.max(s.end))
                .fold(f64::NEG_INFINITY, f64::max);
            let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 0.0) };
            let y_lo = layout.value_to_y(lo);
            let y_hi = layout.value_to_y(hi);
            let bounds = Rect::new(bar_left, y_lo, bar_w, y_hi - y_lo);

            let text = match &col.label {
                _ if !opts.stack_labels => None,
                ColumnLabel::Value => Some(format_number(value, &opts.locale)),
                ColumnLabel::Custom(t) if !t.is_empty() => Some(t.clone()),
                ColumnLabel::Custom(_) | ColumnLabel::Hidden => None,
            };
            let (label_text, label_bounds) = if let Some(text) = text {
                let pixel_size = measurer.measure(&text, opts.label_font_px);
                let size = if orientation.vertical {
                    pixel_size.transposed()
                } else {
                    pixel_size
                };
                let rect = layout.label_rect(&bounds, size, diff >= 0.0);
                (Some(text), Some(orientation.to_pixel_rect(&rect)))
            } else {
                (None, None)
            };

            layout.index.insert(col.key.clone(), i);
            layout.columns.push(ColumnGeometry {
                key: col.key.clone(),
                is_total,
                segments,
                diff,
                value,
                band: (band_left, band_w),
                bounds,
                label_text,
                label_bounds,
            });
        }
        layout
    }

    /// Category/value space `y` of a value.
    pub fn value_to_y(&self, v: f64) -> f64 {
        let logical_plot = self.orientation.to_pixel_rect(&self.plot);
        let (vmin, vmax) = self.value_range;
        let t = (v - vmin) / (vmax - vmin);
        if self.orientation.normal_up_direction() {
            logical_plot.bottom() - t * logical_plot.height
        } else {
            logical_plot.top + t * logical_plot.height
        }
    }

    /// Label box just beyond the stack end the bar grows towards.
    fn label_rect(&self, bounds: &Rect, size: Size, rising: bool) -> Rect {
        let b = bounds.normalized();
        let left = b.center_x() - size.width / 2.0;
        let towards_smaller_y = rising == self.orientation.normal_up_direction();
        let top = if towards_smaller_y {
            b.top - LABEL_GAP - size.height
        } else {
            b.bottom() + LABEL_GAP
        };
        Rect::new(left, top, size.width, size.height)
    }

    pub fn columns(&self) -> &[ColumnGeometry] {
        &self.columns
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn plot(&self) -> Rect {
        self.plot
    }

    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }
}

impl ChartLayout for BarChartLayout {
    fn index_by_value(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn stacks_count(&self) -> usize {
        self.columns.len()
    }

    fn stack_bounds(&self, index: usize) -> Option<Rect> {
        self.columns.get(index).map(|c| c.bounds)
    }

    fn stack_diff(&self, index: usize) -> f64 {
        self.columns.get(index).map(|c| c.diff).unwrap_or(0.0)
    }

    fn stack_value(&self, index: usize) -> f64 {
        self.columns.get(index).map(|c| c.value).unwrap_or(0.0)
    }

    fn series_count(&self) -> usize {
        self.series_count
    }

    fn series_label_bounds(&self, _series: usize, _index: usize) -> Option<Rect> {
        None
    }

    fn stack_label_bounds(&self, index: usize) -> Option<Rect> {
        self.columns.get(index).and_then(|c| c.label_bounds)
    }

    fn is_vertical(&self) -> bool {
        self.orientation.vertical
    }

    fn y_inverted(&self) -> bool {
        self.orientation.y_inverted
    }

    fn x_inverted(&self) -> bool {
        self.orientation.x_inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column {
                key: "A".into(),
                kind: ColumnKind::Delta(vec![10.0]),
                label: ColumnLabel::Value,
            },
            Column {
                key: "B".into(),
                kind: ColumnKind::Delta(vec![-4.0]),
                label: ColumnLabel::Hidden,
            },
            Column {
                key: "Total B".into(),
                kind: ColumnKind::Total(6.0),
                label: ColumnLabel::Custom("Total: 6".into()),
            },
        ]
    }

    #[test]
    fn horizontal_bars_grow_upwards() {
        let plot = Rect::new(0.0, 0.0, 300.0, 200.0);
        let layout = BarChartLayout::build(&columns(), plot, &BarLayoutOptions::default());
        assert_eq!(layout.stacks_count(), 3);
        let a = layout.stack_bounds(0).unwrap();
        // Rising bar: top edge at the larger value, i.e. negative raw height.
        assert!(a.height < 0.0);
        assert!(layout.value_to_y(10.0) < layout.value_to_y(0.0));
        assert_eq!(layout.stack_value(1), 6.0);
        assert_eq!(layout.stack_diff(1), -4.0);
        assert_eq!(layout.index_by_value("Total B"), Some(2));
        assert!(layout.normal_up_direction());
        assert!(layout.stack_label_bounds(0).is_some());
        assert!(layout.stack_label_bounds(1).is_none());
        assert_eq!(layout.columns()[2].label_text.as_deref(), Some("Total: 6"));
    }

    #[test]
    fn vertical_layout_puts_first_category_at_the_bottom() {
        let plot = Rect::new(0.0, 0.0, 300.0, 300.0);
        let opts = BarLayoutOptions {
            orientation: Orientation {
                vertical: true,
                ..Orientation::default()
            },
            ..BarLayoutOptions::default()
        };
        let layout = BarChartLayout::build(&columns(), plot, &opts);
        let first = layout.stack_bounds(0).unwrap();
        let last = layout.stack_bounds(2).unwrap();
        // Category axis is pixel y here; index 0 sits lower on screen.
        assert!(first.left > last.left);
        assert!(!layout.normal_up_direction());
        assert!(!layout.normal_right_direction());
    }

    #[test]
    fn static_chart_running_value() {
        let chart = StaticChart::new()
            .with_stack("A", Rect::new(0.0, 100.0, 20.0, 50.0), 5.0)
            .with_stack("B", Rect::new(40.0, 80.0, 20.0, 20.0), -2.0)
            .with_series_label(1, 0, Rect::new(40.0, 60.0, 20.0, 12.0));
        assert_eq!(chart.stack_value(1), 3.0);
        assert_eq!(chart.series_count(), 1);
        assert!(chart.series_label_bounds(0, 0).is_none());
        assert!(chart.series_label_bounds(0, 1).is_some());
    }
}
