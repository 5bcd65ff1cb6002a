//! Renderer capability and the kind-to-renderer map.
//!
//! A renderer fills a widget's content container from the record's
//! type-specific state and the instance's namespaced storage. The registry
//! never looks inside that state.

use super::{WidgetId, WidgetKind};
use crate::storage::{BoxFuture, Namespace};
use crate::surface::{ContentBlock, WidgetContent};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Namespaced field the notes renderer keeps its text in.
pub const NOTES_FIELD: &str = "notes";

/// Renderer errors.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Render failed: {0}")]
    Failed(String),
}

/// Everything a renderer may read.
#[derive(Clone)]
pub struct RenderContext {
    pub id: WidgetId,
    pub kind: WidgetKind,
    /// Type-specific fields of the persisted record.
    pub type_state: Map<String, Value>,
    /// Storage scoped to this instance.
    pub namespace: Namespace,
}

impl RenderContext {
    fn title(&self) -> String {
        self.type_state
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.kind.display_name())
            .to_string()
    }
}

/// Fills a widget's content container.
///
/// Rendering twice into the same container must produce the same content,
/// so implementations start by clearing it.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait WidgetRenderer: Send + Sync {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: &'a mut WidgetContent,
    ) -> BoxFuture<'a, Result<(), RenderError>>;
}

/// Fills a widget's content container (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait WidgetRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: &'a mut WidgetContent,
    ) -> BoxFuture<'a, Result<(), RenderError>>;
}

/// Shown for kinds with no registered renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl WidgetRenderer for PlaceholderRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: &'a mut WidgetContent,
    ) -> BoxFuture<'a, Result<(), RenderError>> {
        Box::pin(async move {
            content.clear();
            content.push(ContentBlock::Placeholder(format!(
                "Widget type \"{}\" is not available",
                ctx.kind
            )));
            Ok(())
        })
    }
}

/// A title with an optional caption, both taken from type state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelRenderer;

impl WidgetRenderer for LabelRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: &'a mut WidgetContent,
    ) -> BoxFuture<'a, Result<(), RenderError>> {
        Box::pin(async move {
            content.clear();
            content.push(ContentBlock::Heading(ctx.title()));
            if let Some(caption) = ctx.type_state.get("caption").and_then(Value::as_str) {
                content.push(ContentBlock::Text(caption.to_string()));
            }
            Ok(())
        })
    }
}

/// A free-text note persisted under the instance's `notes` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotesRenderer;

impl WidgetRenderer for NotesRenderer {
    fn render<'a>(
        &'a self,
        ctx: &'a RenderContext,
        content: &'a mut WidgetContent,
    ) -> BoxFuture<'a, Result<(), RenderError>> {
        Box::pin(async move {
            let text: String = ctx.namespace.get_or(NOTES_FIELD, String::new()).await;
            content.clear();
            content.push(ContentBlock::Heading(ctx.title()));
            content.push(ContentBlock::Editor {
                field: NOTES_FIELD.to_string(),
                text,
            });
            Ok(())
        })
    }
}

/// Explicit map from widget kind to renderer, resolved at startup.
pub struct RendererRegistry {
    renderers: HashMap<WidgetKind, Box<dyn WidgetRenderer>>,
    fallback: PlaceholderRenderer,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RendererRegistry {
    /// A registry with no renderers; every kind falls back to the placeholder.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: PlaceholderRenderer,
        }
    }

    /// Notes get an editor; every other known kind gets a label.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for kind in WidgetKind::ALL {
            if kind == WidgetKind::Notes {
                registry.register(kind, NotesRenderer);
            } else {
                registry.register(kind, LabelRenderer);
            }
        }
        registry
    }

    pub fn register(&mut self, kind: WidgetKind, renderer: impl WidgetRenderer + 'static) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    pub fn is_registered(&self, kind: &WidgetKind) -> bool {
        self.renderers.contains_key(kind)
    }

    /// Renderer for `kind`, or the placeholder.
    pub fn get(&self, kind: &WidgetKind) -> &dyn WidgetRenderer {
        match self.renderers.get(kind) {
            Some(renderer) => renderer.as_ref(),
            None => &self.fallback,
        }
    }

    pub fn fallback(&self) -> &dyn WidgetRenderer {
        &self.fallback
    }
}
