//! Paints resolved arrows onto a [`Surface`].

use super::engine::connector_rect;
use super::{Arrow, DrawSettings, LayoutOptions};
use crate::chart::ChartLayout;
use crate::geometry::Rect;
use crate::scene::{
    ARROW_LABELS_LAYER_Z, ARROWS_LAYER_Z, OrientedPath, PathId, Surface, TextId, TextStyle,
};
use crate::style::Fill;

/// Surface handles owned by one arrow. Created once, cleared and redrawn on
/// every appearance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowGraphics {
    pub connector: PathId,
    pub head: PathId,
    pub label: TextId,
}

impl ArrowGraphics {
    pub fn create<S: Surface + ?Sized>(surface: &mut S) -> Self {
        Self {
            connector: surface.create_path(ARROWS_LAYER_Z),
            head: surface.create_path(ARROWS_LAYER_Z),
            label: surface.create_text(ARROW_LABELS_LAYER_Z),
        }
    }

    pub fn clear<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear_path(self.connector);
        surface.clear_path(self.head);
        surface.clear_text(self.label);
    }

    pub fn dispose<S: Surface + ?Sized>(self, surface: &mut S) {
        surface.dispose_path(self.connector);
        surface.dispose_path(self.head);
        surface.dispose_text(self.label);
    }
}

/// Orientation-aware arrow painter.
#[derive(Debug, Clone, Copy)]
pub struct ArrowRenderer {
    vertical: bool,
    normal_up: bool,
    options: LayoutOptions,
}

impl ArrowRenderer {
    pub fn new(vertical: bool, normal_up: bool, options: LayoutOptions) -> Self {
        Self {
            vertical,
            normal_up,
            options,
        }
    }

    pub fn for_chart<C: ChartLayout + ?Sized>(chart: &C, options: LayoutOptions) -> Self {
        Self::new(chart.is_vertical(), chart.normal_up_direction(), options)
    }

    /// Redraw `arrow` into its handles. Arrows without geometry end up hidden.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, graphics: &ArrowGraphics, arrow: &Arrow) {
        graphics.clear(surface);
        let Some(settings) = arrow.draw_settings() else {
            return;
        };
        if !arrow.is_valid() {
            return;
        }
        self.draw_connector(surface, graphics.connector, arrow, &settings);
        self.draw_head(surface, graphics.head, arrow, &settings);
        self.draw_label(surface, graphics.label, arrow, &settings);
    }

    /// Elbow polyline: up from the source, across, down into the target.
    pub fn draw_connector<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        id: PathId,
        arrow: &Arrow,
        s: &DrawSettings,
    ) {
        let stroke = arrow.config().connector_stroke();
        surface.set_stroke(id, &stroke);
        surface.set_fill(id, None);
        if stroke.is_none() {
            return;
        }
        OrientedPath::new(surface, id, self.vertical)
            .move_to(s.from_point.x, s.from_point.y)
            .line_to(s.from_point.x, s.horizontal_y)
            .line_to(s.to_point.x, s.horizontal_y)
            .line_to(s.to_point.x, s.to_point.y);
    }

    /// Filled triangle with its tip on the target anchor.
    pub fn draw_head<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        id: PathId,
        arrow: &Arrow,
        s: &DrawSettings,
    ) {
        let stroke = arrow.config().head_stroke();
        surface.set_stroke(id, &stroke);
        if stroke.is_none() {
            surface.set_fill(id, None);
            return;
        }
        surface.set_fill(id, Some(&Fill::new(stroke.color.clone())));

        let size = self.options.head_size;
        let half = size / 2.0;
        let tip = s.to_point;
        let base_y = if s.is_up == self.normal_up {
            tip.y - size
        } else {
            tip.y + size
        };
        OrientedPath::new(surface, id, self.vertical)
            .move_to(tip.x - half, base_y)
            .line_to(tip.x, tip.y)
            .line_to(tip.x + half, base_y)
            .close();
    }

    /// Pixel rectangle of the label, placed against the connector.
    pub fn label_rect(&self, arrow: &Arrow, s: &DrawSettings) -> Rect {
        let connector = connector_rect(
            s,
            arrow.config().connector_stroke().extract_thickness(),
            self.options.connector_padding,
        );
        let size = if self.vertical {
            arrow.label_size().transposed()
        } else {
            arrow.label_size()
        };
        let logical = arrow.config().label.text_bounds(&connector, size);
        if self.vertical {
            logical.transposed()
        } else {
            logical
        }
    }

    pub fn draw_label<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        id: TextId,
        arrow: &Arrow,
        s: &DrawSettings,
    ) {
        if !arrow.has_label() {
            return;
        }
        let label = &arrow.config().label;
        let style = TextStyle {
            font_size: label.font_size,
            font_color: label.font_color.clone(),
            font_family: label.font_family.clone(),
        };
        surface.set_text(id, arrow.label_text(), self.label_rect(arrow, s), &style);
    }
}
