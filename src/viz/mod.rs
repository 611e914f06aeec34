//! Visualization: render a waterfall with its totals and arrows to **SVG**.
//!
//! - Bars stacked per series (Microsoft Office palette), rises and falls colored apart for single-series data
//! - Total bars with optional fill, stroke and hatch pattern
//! - Locale-aware value labels (`30,000` vs `30.000`)
//! - Horizontal or transposed (vertical) charts, optionally inverted axes
//! - Arrow annotations painted from the retained [`Scene`]

pub mod text;
pub mod util;

use crate::annotations::Annotations;
use crate::chart::{BarChartLayout, BarLayoutOptions, ChartLayout, Column, ColumnLabel};
use crate::geometry::{Point2D, Rect};
use crate::label::{format_label, format_number};
use crate::scene::{PathCommand, Scene};
use crate::storage::ChartConfig;
use crate::style::{Fill, HatchFill, HatchKind, Rgb8};
use crate::totals::aggregate::{CombinedData, SeriesRow};
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_svg::SVGBackend;

use std::path::Path;

use text::{estimate_text_width_px, line_height_px, truncate_to_width};
use util::{DECREASE_COLOR, office_color, px, to_plotters};

const MARGIN: f64 = 16.0;
const TITLE_FONT_PX: u32 = 20;
const AXIS_FONT_PX: u32 = 12;
const AXIS_GAP: f64 = 6.0;

/// Everything computed for one chart before painting.
pub struct Prepared {
    pub layout: BarChartLayout,
    pub annotations: Annotations<Scene>,
    /// Axis rows, totals spliced in.
    pub rows: Vec<SeriesRow>,
    pub combined: CombinedData,
}

/// Text shown on the category axis for a row.
fn axis_label(row: &SeriesRow) -> &str {
    match row {
        SeriesRow::Category { x } => x,
        SeriesRow::Total(t) => &t.name,
    }
}

/// Pixel rectangle left for bars after the title and axis gutters.
fn plot_rect(cfg: &ChartConfig, width: u32, height: u32, axis_labels: &[&str]) -> Rect {
    let (w, h) = (width as f64, height as f64);
    let top = MARGIN
        + if cfg.title.is_some() {
            line_height_px(TITLE_FONT_PX) + 8.0
        } else {
            0.0
        };
    if cfg.vertical {
        let widest = axis_labels
            .iter()
            .map(|l| estimate_text_width_px(l, AXIS_FONT_PX))
            .fold(0.0, f64::max);
        let gutter = (widest + 2.0 * AXIS_GAP).clamp(40.0, w * 0.3);
        Rect::new(
            MARGIN + gutter,
            top,
            (w - 2.0 * MARGIN - gutter).max(1.0),
            (h - top - MARGIN).max(1.0),
        )
    } else {
        let gutter = line_height_px(AXIS_FONT_PX) + 2.0 * AXIS_GAP;
        Rect::new(
            MARGIN,
            top,
            (w - 2.0 * MARGIN).max(1.0),
            (h - top - MARGIN - gutter).max(1.0),
        )
    }
}

/// Compute totals, bar geometry and arrow layout for `cfg` at the given size.
pub fn prepare(cfg: &ChartConfig, width: u32, height: u32) -> Result<Prepared> {
    let mut annotations = Annotations::with_options(Scene::new(), cfg.layout);
    annotations.arrows_mut().set_locale(cfg.locale.clone());
    annotations.apply_config(cfg.annotations());

    let rows = annotations.calculate(&cfg.series).to_vec();
    let combined = annotations.totals().combined().clone();

    let mut columns = Column::from_rows(&combined, &rows);
    for (col, row) in columns.iter_mut().zip(&rows) {
        let Some(t) = row.as_total() else { continue };
        let Some(total) = annotations.totals().total(t.total) else {
            continue;
        };
        let label = &total.config().label;
        col.label = if label.enabled {
            ColumnLabel::Custom(format_label(
                &label.format,
                &[
                    ("Value", format_number(t.value, &cfg.locale)),
                    ("Name", t.name.clone()),
                ],
            ))
        } else {
            ColumnLabel::Hidden
        };
    }

    let labels: Vec<&str> = rows.iter().map(axis_label).collect();
    let plot = plot_rect(cfg, width, height, &labels);
    let opts = BarLayoutOptions {
        orientation: cfg.orientation(),
        locale: cfg.locale.clone(),
        ..BarLayoutOptions::default()
    };
    let layout = BarChartLayout::build(&columns, plot, &opts);
    annotations.draw(&layout)?;

    Ok(Prepared {
        layout,
        annotations,
        rows,
        combined,
    })
}

/// Render `cfg` as an SVG file.
pub fn render_waterfall<P: AsRef<Path>>(
    cfg: &ChartConfig,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if cfg.series.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let out_path = out_path.as_ref();
    if out_path.extension().and_then(|s| s.to_str()) != Some("svg") {
        return Err(anyhow!(
            "unsupported output format: {} (only .svg)",
            out_path.display()
        ));
    }
    let prepared = prepare(cfg, width, height)?;
    let path_string = out_path.to_string_lossy().into_owned();
    let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
    draw_waterfall(&root, &prepared, cfg)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Render `cfg` to an in-memory SVG document.
pub fn render_waterfall_to_string(cfg: &ChartConfig, width: u32, height: u32) -> Result<String> {
    if cfg.series.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let prepared = prepare(cfg, width, height)?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_waterfall(&root, &prepared, cfg)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(svg)
}

fn to_pair(p: Point2D) -> (i32, i32) {
    (px(p.x), px(p.y))
}

fn rect_corners(r: &Rect) -> [(i32, i32); 2] {
    [(px(r.left), px(r.top)), (px(r.right()), px(r.bottom()))]
}

fn draw_waterfall<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    prepared: &Prepared,
    cfg: &ChartConfig,
) -> Result<()> {
    let layout = &prepared.layout;
    let o = layout.orientation();

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    if let Some(title) = &cfg.title {
        root.draw(&Text::new(
            title.clone(),
            (px(MARGIN), px(MARGIN)),
            TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
                .pos(Pos::new(HPos::Left, VPos::Top)),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    // Zero line across the category axis.
    let logical_plot = o.to_pixel_rect(&layout.plot());
    let zero = layout.value_to_y(0.0);
    let a = o.to_pixel(Point2D::new(logical_plot.left, zero));
    let b = o.to_pixel(Point2D::new(logical_plot.right(), zero));
    root.draw(&PathElement::new(
        vec![to_pair(a), to_pair(b)],
        BLACK.mix(0.6).stroke_width(1),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let single_series = layout.series_count() <= 1;
    for (col, row) in layout.columns().iter().zip(&prepared.rows) {
        let total_cfg = row
            .as_total()
            .and_then(|t| prepared.annotations.totals().total(t.total))
            .map(|t| t.config());

        for seg in &col.segments {
            let logical = Rect::from_corners(
                Point2D::new(col.bounds.left, layout.value_to_y(seg.start)),
                Point2D::new(col.bounds.right(), layout.value_to_y(seg.end)),
            );
            let r = o.to_pixel_rect(&logical);
            let color = match seg.series {
                None => total_cfg
                    .and_then(|c| c.fill.as_ref())
                    .and_then(Fill::rgb)
                    .map(to_plotters)
                    .unwrap_or(office_color(2)),
                Some(_) if single_series => {
                    if seg.end >= seg.start {
                        office_color(0)
                    } else {
                        DECREASE_COLOR
                    }
                }
                Some(s) => office_color(s),
            };
            root.draw(&Rectangle::new(rect_corners(&r), color.filled()))
                .map_err(|e| anyhow!("{:?}", e))?;

            if let Some(c) = total_cfg {
                if let Some(h) = &c.hatch_fill {
                    draw_hatch(root, &r, h)?;
                }
                if let Some(s) = c.stroke.as_ref().filter(|s| !s.is_none()) {
                    let w = s.thickness.round().max(1.0) as u32;
                    root.draw(&Rectangle::new(
                        rect_corners(&r),
                        to_plotters(s.rgb()).stroke_width(w),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }

        // Category axis label.
        let (band_left, band_w) = col.band;
        let center = band_left + band_w / 2.0;
        let label = axis_label(row);
        let (text, pos, style_pos) = if o.vertical {
            let max_w = layout.plot().left - MARGIN - AXIS_GAP;
            (
                truncate_to_width(label, AXIS_FONT_PX, max_w),
                (px(layout.plot().left - AXIS_GAP), px(center)),
                Pos::new(HPos::Right, VPos::Center),
            )
        } else {
            (
                truncate_to_width(label, AXIS_FONT_PX, band_w),
                (px(center), px(layout.plot().bottom() + AXIS_GAP)),
                Pos::new(HPos::Center, VPos::Top),
            )
        };
        if !text.is_empty() {
            root.draw(&Text::new(
                text,
                pos,
                TextStyle::from((FontFamily::SansSerif, AXIS_FONT_PX)).pos(style_pos),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }

        // Stack label.
        if let (Some(t), Some(b)) = (&col.label_text, col.label_bounds) {
            root.draw(&Text::new(
                t.clone(),
                (px(b.left), px(b.top)),
                TextStyle::from((FontFamily::SansSerif, BarLayoutOptions::default().label_font_px))
                    .color(&RGBColor(80, 80, 80))
                    .pos(Pos::new(HPos::Left, VPos::Top)),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    paint_scene(root, prepared.annotations.surface())
}

/// Draw every live path and text of `scene`, lower layers first.
pub fn paint_scene<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &Scene) -> Result<()> {
    for (_, node) in scene.paths() {
        let mut pts: Vec<(i32, i32)> = node
            .commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(to_pair(*p)),
                PathCommand::Close => None,
            })
            .collect();
        if pts.len() < 2 {
            continue;
        }
        let closed = node.commands.contains(&PathCommand::Close);

        if closed && let Some(c) = node.fill.as_ref().and_then(Fill::rgb) {
            root.draw(&Polygon::new(pts.clone(), to_plotters(c).filled()))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        if let Some(stroke) = node.stroke.as_ref().filter(|s| !s.is_none()) {
            if closed {
                pts.push(pts[0]);
            }
            let w = stroke.thickness.round().max(1.0) as u32;
            root.draw(&PathElement::new(
                pts,
                to_plotters(stroke.rgb()).stroke_width(w),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    for (_, node) in scene.texts() {
        let Some(content) = &node.content else {
            continue;
        };
        let color = Rgb8::parse(&node.style.font_color)
            .map(to_plotters)
            .unwrap_or(BLACK);
        let style = TextStyle::from((
            FontFamily::from(node.style.font_family.as_str()),
            node.style.font_size,
        ))
        .color(&color)
        .pos(Pos::new(HPos::Left, VPos::Top));
        let line_h = line_height_px(node.style.font_size);
        for (i, line) in content.lines().enumerate() {
            let y = node.bounds.top + i as f64 * line_h;
            root.draw(&Text::new(
                line.to_string(),
                (px(node.bounds.left), px(y)),
                style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}

type Segment = ((f64, f64), (f64, f64));

/// Hatch line segments clipped to `r`, spaced `step` apart.
fn hatch_segments(r: &Rect, kind: HatchKind, step: f64) -> Vec<Segment> {
    let step = step.max(2.0);
    let (l, t, rt, b) = (r.left, r.top, r.right(), r.bottom());
    let mut out = Vec::new();
    let horizontal = |out: &mut Vec<Segment>| {
        let mut y = t + step;
        while y < b {
            out.push(((l, y), (rt, y)));
            y += step;
        }
    };
    let vertical = |out: &mut Vec<Segment>| {
        let mut x = l + step;
        while x < rt {
            out.push(((x, t), (x, b)));
            x += step;
        }
    };
    match kind {
        HatchKind::Horizontal => horizontal(&mut out),
        HatchKind::Vertical => vertical(&mut out),
        HatchKind::Cross => {
            horizontal(&mut out);
            vertical(&mut out);
        }
        HatchKind::ForwardDiagonal => {
            // x + y = c
            let mut c = l + t + step;
            while c < rt + b {
                let x0 = l.max(c - b);
                let x1 = rt.min(c - t);
                if x1 > x0 {
                    out.push(((x0, c - x0), (x1, c - x1)));
                }
                c += step;
            }
        }
        HatchKind::BackwardDiagonal => {
            // y - x = c
            let mut c = t - rt + step;
            while c < b - l {
                let x0 = l.max(t - c);
                let x1 = rt.min(b - c);
                if x1 > x0 {
                    out.push(((x0, x0 + c), (x1, x1 + c)));
                }
                c += step;
            }
        }
    }
    out
}

fn draw_hatch<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    r: &Rect,
    hatch: &HatchFill,
) -> Result<()> {
    let color = Rgb8::parse(&hatch.color)
        .map(to_plotters)
        .unwrap_or(BLACK);
    let w = hatch.thickness.round().max(1.0) as u32;
    for (a, b) in hatch_segments(r, hatch.kind, hatch.size) {
        root.draw(&PathElement::new(
            vec![(px(a.0), px(a.1)), (px(b.0), px(b.1))],
            color.stroke_width(w),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
