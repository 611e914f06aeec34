//! Retained graphics surface the annotation renderer draws into.
//!
//! Handles are created once and then cleared and redrawn, so a backend can
//! keep its nodes alive between passes. [`Scene`] is the in-memory
//! implementation; the SVG exporter in [`crate::viz`] paints it.

use crate::geometry::{Point2D, Rect};
use crate::style::{Fill, Stroke};
use std::collections::BTreeMap;

/// z-index of the layer holding connectors and heads.
pub const ARROWS_LAYER_Z: i32 = 41;
/// z-index of the layer holding arrow labels.
pub const ARROW_LABELS_LAYER_Z: i32 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2D),
    LineTo(Point2D),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub font_color: String,
    pub font_family: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12,
            font_color: "#7c868e".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Minimal retained drawing API. All coordinates are pixels.
pub trait Surface {
    fn create_path(&mut self, z: i32) -> PathId;
    fn clear_path(&mut self, id: PathId);
    fn move_to(&mut self, id: PathId, p: Point2D);
    fn line_to(&mut self, id: PathId, p: Point2D);
    fn close_path(&mut self, id: PathId);
    fn set_stroke(&mut self, id: PathId, stroke: &Stroke);
    fn set_fill(&mut self, id: PathId, fill: Option<&Fill>);
    fn dispose_path(&mut self, id: PathId);

    fn create_text(&mut self, z: i32) -> TextId;
    /// Show `content` in the pixel box `bounds`.
    fn set_text(&mut self, id: TextId, content: &str, bounds: Rect, style: &TextStyle);
    fn clear_text(&mut self, id: TextId);
    fn dispose_text(&mut self, id: TextId);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub z: i32,
    pub commands: Vec<PathCommand>,
    pub stroke: Option<Stroke>,
    pub fill: Option<Fill>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub z: i32,
    pub content: Option<String>,
    pub bounds: Rect,
    pub style: TextStyle,
}

/// In-memory [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    next_id: u64,
    created: usize,
    paths: BTreeMap<PathId, PathNode>,
    texts: BTreeMap<TextId, TextNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created; stays flat when passes reuse handles.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn path(&self, id: PathId) -> Option<&PathNode> {
        self.paths.get(&id)
    }

    pub fn text(&self, id: TextId) -> Option<&TextNode> {
        self.texts.get(&id)
    }

    /// Live paths sorted by z, then creation order.
    pub fn paths(&self) -> Vec<(PathId, &PathNode)> {
        let mut v: Vec<_> = self.paths.iter().map(|(k, n)| (*k, n)).collect();
        v.sort_by_key(|(id, n)| (n.z, *id));
        v
    }

    /// Live texts sorted by z, then creation order.
    pub fn texts(&self) -> Vec<(TextId, &TextNode)> {
        let mut v: Vec<_> = self.texts.iter().map(|(k, n)| (*k, n)).collect();
        v.sort_by_key(|(id, n)| (n.z, *id));
        v
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.created += 1;
        self.next_id
    }
}

impl Surface for Scene {
    fn create_path(&mut self, z: i32) -> PathId {
        let id = PathId(self.next());
        self.paths.insert(
            id,
            PathNode {
                z,
                commands: Vec::new(),
                stroke: None,
                fill: None,
            },
        );
        id
    }

    fn clear_path(&mut self, id: PathId) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.commands.clear();
        }
    }

    fn move_to(&mut self, id: PathId, p: Point2D) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.commands.push(PathCommand::MoveTo(p));
        }
    }

    fn line_to(&mut self, id: PathId, p: Point2D) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.commands.push(PathCommand::LineTo(p));
        }
    }

    fn close_path(&mut self, id: PathId) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.commands.push(PathCommand::Close);
        }
    }

    fn set_stroke(&mut self, id: PathId, stroke: &Stroke) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.stroke = Some(stroke.clone());
        }
    }

    fn set_fill(&mut self, id: PathId, fill: Option<&Fill>) {
        if let Some(node) = self.paths.get_mut(&id) {
            node.fill = fill.cloned();
        }
    }

    fn dispose_path(&mut self, id: PathId) {
        self.paths.remove(&id);
    }

    fn create_text(&mut self, z: i32) -> TextId {
        let id = TextId(self.next());
        self.texts.insert(
            id,
            TextNode {
                z,
                content: None,
                bounds: Rect::default(),
                style: TextStyle::default(),
            },
        );
        id
    }

    fn set_text(&mut self, id: TextId, content: &str, bounds: Rect, style: &TextStyle) {
        if let Some(node) = self.texts.get_mut(&id) {
            node.content = Some(content.to_string());
            node.bounds = bounds;
            node.style = style.clone();
        }
    }

    fn clear_text(&mut self, id: TextId) {
        if let Some(node) = self.texts.get_mut(&id) {
            node.content = None;
        }
    }

    fn dispose_text(&mut self, id: TextId) {
        self.texts.remove(&id);
    }
}

/// Path writer taking category/value coordinates and emitting pixels, so
/// callers never branch on chart orientation themselves.
pub struct OrientedPath<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    id: PathId,
    vertical: bool,
}

impl<'a, S: Surface + ?Sized> OrientedPath<'a, S> {
    pub fn new(surface: &'a mut S, id: PathId, vertical: bool) -> Self {
        Self {
            surface,
            id,
            vertical,
        }
    }

    fn map(&self, x: f64, y: f64) -> Point2D {
        if self.vertical {
            Point2D::new(y, x)
        } else {
            Point2D::new(x, y)
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let p = self.map(x, y);
        self.surface.move_to(self.id, p);
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let p = self.map(x, y);
        self.surface.line_to(self.id, p);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.surface.close_path(self.id);
        self
    }
}
