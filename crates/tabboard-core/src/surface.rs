//! Retained model of the mounted dashboard.
//!
//! The surface is what a front end paints: one [`WidgetNode`] per live
//! widget with its live frame, style, and renderer-filled content. Drag and
//! resize sessions mutate node frames directly; nothing here is persisted.

use crate::config::DashboardConfig;
use crate::geometry::Rgba;
use crate::widget::{Appearance, HitTarget, VisualEffect, WidgetId, WidgetKind, hit_test_frame};
use kurbo::{Point, Rect, Size};
use std::collections::HashMap;

/// Visual style derived from a widget's appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub background: Rgba,
    pub effect: VisualEffect,
    pub auto_hide: bool,
}

impl From<&Appearance> for NodeStyle {
    fn from(appearance: &Appearance) -> Self {
        Self {
            background: appearance.background(),
            effect: appearance.effect,
            auto_hide: appearance.auto_hide,
        }
    }
}

/// One piece of renderer output.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading(String),
    Text(String),
    /// An editable text area bound to a namespaced field.
    Editor { field: String, text: String },
    /// Shown for widget kinds without a renderer.
    Placeholder(String),
}

/// The content container handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetContent {
    pub blocks: Vec<ContentBlock>,
}

impl WidgetContent {
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Text of the editor bound to `field`, if any.
    pub fn editor_text(&self, field: &str) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::Editor { field: f, text } if f == field => Some(text.as_str()),
            _ => None,
        })
    }

    /// Replace the text of the editor bound to `field`. Returns whether one existed.
    pub fn set_editor_text(&mut self, field: &str, value: &str) -> bool {
        for block in &mut self.blocks {
            match block {
                ContentBlock::Editor { field: f, text } if f == field => {
                    *text = value.to_string();
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

/// A mounted widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetNode {
    pub kind: WidgetKind,
    pub origin: Point,
    pub size: Size,
    pub style: NodeStyle,
    pub content: WidgetContent,
}

impl WidgetNode {
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

/// All mounted widgets, their stacking order and the container size.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    nodes: HashMap<WidgetId, WidgetNode>,
    /// Back to front.
    z_order: Vec<WidgetId>,
    viewport: Size,
}

impl Surface {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Mount a node, replacing any node with the same id. New nodes go on top.
    pub fn mount(&mut self, id: WidgetId, node: WidgetNode) {
        if self.nodes.insert(id.clone(), node).is_none() {
            self.z_order.push(id);
        }
    }

    /// Remove a node. Returns whether it was mounted.
    pub fn unmount(&mut self, id: &WidgetId) -> bool {
        self.z_order.retain(|other| other != id);
        self.nodes.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.z_order.clear();
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    pub fn content_mut(&mut self, id: &WidgetId) -> Option<&mut WidgetContent> {
        self.nodes.get_mut(id).map(|node| &mut node.content)
    }

    pub fn frame(&self, id: &WidgetId) -> Option<Rect> {
        self.nodes.get(id).map(WidgetNode::frame)
    }

    /// Move a node. Returns `false` if it is not mounted.
    pub fn set_origin(&mut self, id: &WidgetId, origin: Point) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.origin = origin;
                true
            }
            None => false,
        }
    }

    pub fn set_size(&mut self, id: &WidgetId, size: Size) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.size = size;
                true
            }
            None => false,
        }
    }

    pub fn apply_style(&mut self, id: &WidgetId, style: NodeStyle) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.style = style;
                true
            }
            None => false,
        }
    }

    pub fn bring_to_front(&mut self, id: &WidgetId) {
        if let Some(index) = self.z_order.iter().position(|other| other == id) {
            let id = self.z_order.remove(index);
            self.z_order.push(id);
        }
    }

    /// Ids from back to front.
    pub fn z_order(&self) -> &[WidgetId] {
        &self.z_order
    }

    /// Nodes from back to front, the order to paint them in.
    pub fn iter(&self) -> impl Iterator<Item = (&WidgetId, &WidgetNode)> {
        self.z_order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// What lies under `point`, testing the front-most node first.
    pub fn hit_test(&self, point: Point, config: &DashboardConfig) -> HitTarget {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| {
                let node = self.nodes.get(id)?;
                hit_test_frame(id, node.frame(), point, config)
            })
            .next()
            .unwrap_or(HitTarget::Background)
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Whether the front end has reported a usable container size yet.
    /// Geometry is not clamped against an unknown viewport.
    pub fn has_viewport(&self) -> bool {
        self.viewport.width > 0.0 && self.viewport.height > 0.0
    }

    /// Clamp an origin for a node of `size` into the viewport, if known.
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        if self.has_viewport() {
            crate::geometry::clamp_origin(origin, size, self.viewport)
        } else {
            origin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Appearance;

    fn node(x: f64, y: f64) -> WidgetNode {
        WidgetNode {
            kind: WidgetKind::Clock,
            origin: Point::new(x, y),
            size: Size::new(200.0, 150.0),
            style: NodeStyle::from(&Appearance::default()),
            content: WidgetContent::default(),
        }
    }

    #[test]
    fn test_mount_and_unmount() {
        let mut surface = Surface::new(Size::new(1000.0, 800.0));
        let id = WidgetId::from("w-a");
        surface.mount(id.clone(), node(0.0, 0.0));
        assert!(surface.contains(&id));
        assert!(surface.unmount(&id));
        assert!(!surface.unmount(&id));
        assert!(surface.z_order().is_empty());
    }

    #[test]
    fn test_hit_test_prefers_front_most() {
        let config = DashboardConfig::default();
        let mut surface = Surface::new(Size::new(1000.0, 800.0));
        let a = WidgetId::from("w-a");
        let b = WidgetId::from("w-b");
        surface.mount(a.clone(), node(0.0, 0.0));
        surface.mount(b.clone(), node(50.0, 0.0));

        let p = Point::new(100.0, 10.0);
        assert_eq!(surface.hit_test(p, &config), HitTarget::DragHandle(b.clone()));

        surface.bring_to_front(&a);
        assert_eq!(surface.hit_test(p, &config), HitTarget::DragHandle(a));
        assert_eq!(surface.z_order().last(), Some(&WidgetId::from("w-a")));
        assert_eq!(
            surface.hit_test(Point::new(900.0, 700.0), &config),
            HitTarget::Background
        );
    }

    #[test]
    fn test_remount_keeps_stacking() {
        let mut surface = Surface::default();
        let a = WidgetId::from("w-a");
        surface.mount(a.clone(), node(0.0, 0.0));
        surface.mount(WidgetId::from("w-b"), node(0.0, 0.0));
        surface.mount(a.clone(), node(10.0, 10.0));
        assert_eq!(surface.z_order().len(), 2);
        assert_eq!(surface.frame(&a).map(|r| r.origin()), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_editor_text() {
        let mut content = WidgetContent::default();
        content.push(ContentBlock::Heading("Notes".into()));
        content.push(ContentBlock::Editor {
            field: "notes".into(),
            text: String::new(),
        });
        assert!(content.set_editor_text("notes", "milk"));
        assert!(!content.set_editor_text("other", "x"));
        assert_eq!(content.editor_text("notes"), Some("milk"));
    }
}
