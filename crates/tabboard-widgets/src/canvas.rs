//! The dashboard canvas.
//!
//! [`DashboardView`] paints the surface in stacking order and collects what
//! the user did this frame into a [`CanvasOutput`]. It only reads the
//! dashboard; the host feeds the output back through the dashboard's async
//! operations, so all persistence stays in one place.

use egui::{
    Align, Align2, Color32, CornerRadius, CursorIcon, Layout, Pos2, Rect, Sense, Stroke,
    StrokeKind, Ui, UiBuilder, vec2,
};
use kurbo::{Point, Size};
use tabboard_core::surface::{ContentBlock, WidgetNode};
use tabboard_core::widget::{self, ControlKind};
use tabboard_core::{
    Dashboard, DashboardConfig, HitTarget, Key, Modifiers, PointerEvent, PointerId,
    VisualEffect, WidgetId,
};

use crate::colors::rgba_to_color32;
use crate::{sizing, theme};

/// A text editor changed this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorChange {
    pub id: WidgetId,
    pub field: String,
    pub text: String,
}

/// Everything the canvas observed in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasOutput {
    /// Canvas size in points.
    pub viewport: Size,
    pub pointer: Vec<PointerEvent>,
    pub keys: Vec<Key>,
    pub edits: Vec<EditorChange>,
    /// Editors that lost focus, as `(widget, field)`.
    pub closed: Vec<(WidgetId, String)>,
}

fn to_point(pos: Pos2, origin: Pos2) -> Point {
    Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64)
}

fn to_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.ctrl,
        alt: modifiers.alt,
        meta: modifiers.mac_cmd,
    }
}

fn to_rect(rect: kurbo::Rect, origin: Pos2) -> Rect {
    Rect::from_min_max(
        origin + vec2(rect.x0 as f32, rect.y0 as f32),
        origin + vec2(rect.x1 as f32, rect.y1 as f32),
    )
}

/// Convert raw egui input into dashboard pointer events, with positions
/// relative to `origin`. Only the primary mouse button counts.
pub fn translate_events(events: &[egui::Event], origin: Pos2) -> Vec<PointerEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::PointerMoved(pos) => Some(PointerEvent::Move {
                pointer: PointerId::Mouse,
                position: to_point(*pos, origin),
            }),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                modifiers,
            } => {
                let position = to_point(*pos, origin);
                Some(if *pressed {
                    PointerEvent::Down {
                        pointer: PointerId::Mouse,
                        position,
                        modifiers: to_modifiers(*modifiers),
                    }
                } else {
                    PointerEvent::Up {
                        pointer: PointerId::Mouse,
                        position,
                    }
                })
            }
            egui::Event::Touch { id, phase, pos, .. } => {
                let pointer = PointerId::Touch(id.0);
                let position = to_point(*pos, origin);
                Some(match phase {
                    egui::TouchPhase::Start => PointerEvent::Down {
                        pointer,
                        position,
                        modifiers: Modifiers::default(),
                    },
                    egui::TouchPhase::Move => PointerEvent::Move { pointer, position },
                    egui::TouchPhase::End => PointerEvent::Up { pointer, position },
                    egui::TouchPhase::Cancel => PointerEvent::Cancel { pointer },
                })
            }
            egui::Event::WindowFocused(false) => Some(PointerEvent::Cancel {
                pointer: PointerId::Mouse,
            }),
            _ => None,
        })
        .collect()
}

/// Dashboard shortcuts pressed this frame. Chorded keys are left to the
/// host.
pub fn translate_keys(events: &[egui::Event]) -> Vec<Key> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::Key {
                key,
                pressed: true,
                repeat: false,
                modifiers,
                ..
            } if !modifiers.command && !modifiers.ctrl && !modifiers.alt => match key {
                egui::Key::Escape => Some(Key::Escape),
                egui::Key::Delete => Some(Key::Delete),
                egui::Key::E if modifiers.shift => Some(Key::Char('E')),
                egui::Key::E => Some(Key::Char('e')),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Paints a dashboard and gathers its input.
pub struct DashboardView<'a> {
    dashboard: &'a Dashboard,
}

impl<'a> DashboardView<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self { dashboard }
    }

    /// Fill the remaining space of `ui` with the dashboard.
    pub fn show(self, ui: &mut Ui) -> CanvasOutput {
        let rect = ui.available_rect_before_wrap();
        let _ = ui.allocate_rect(rect, Sense::hover());
        ui.painter().rect_filled(rect, CornerRadius::ZERO, theme::BACKDROP);

        let mut output = CanvasOutput {
            viewport: Size::new(rect.width() as f64, rect.height() as f64),
            ..CanvasOutput::default()
        };

        let events = ui.input(|i| i.events.clone());
        let over_window = ui.ctx().is_pointer_over_area();
        let viewport = kurbo::Rect::from_origin_size(Point::ZERO, output.viewport);
        output.pointer = translate_events(&events, rect.min)
            .into_iter()
            .filter(|event| match event {
                PointerEvent::Down { position, .. } => !over_window && viewport.contains(*position),
                _ => true,
            })
            .collect();
        if !ui.ctx().wants_keyboard_input() {
            output.keys = translate_keys(&events);
        }

        let surface = self.dashboard.surface();
        let config = self.dashboard.config();
        for (id, node) in surface.iter() {
            self.paint_node(ui, rect.min, id, node, &mut output);
        }

        if self.dashboard.is_editing() && !over_window {
            if let Some(pos) = ui.ctx().pointer_hover_pos().filter(|pos| rect.contains(*pos)) {
                match surface.hit_test(to_point(pos, rect.min), config) {
                    HitTarget::DragHandle(_) => ui.ctx().set_cursor_icon(CursorIcon::Grab),
                    HitTarget::ResizeHandle(_) => {
                        ui.ctx().set_cursor_icon(CursorIcon::ResizeNwSe)
                    }
                    HitTarget::Control(..) => ui.ctx().set_cursor_icon(CursorIcon::PointingHand),
                    HitTarget::Content(_) | HitTarget::Background => {}
                }
            }
        }
        output
    }

    fn paint_node(
        &self,
        ui: &mut Ui,
        origin: Pos2,
        id: &WidgetId,
        node: &WidgetNode,
        output: &mut CanvasOutput,
    ) {
        let config = self.dashboard.config();
        let editing = self.dashboard.is_editing();
        let frame = node.frame();
        let rect = to_rect(frame, origin);
        let corner = CornerRadius::same(sizing::PANEL_RADIUS);
        let painter = ui.painter().clone();

        if node.style.effect == VisualEffect::Shadow {
            painter.add(
                egui::epaint::Shadow {
                    offset: [0, 4],
                    blur: 16,
                    spread: 0,
                    color: Color32::from_black_alpha(140),
                }
                .as_shape(rect, corner),
            );
        }
        painter.rect_filled(rect, corner, rgba_to_color32(node.style.background));
        match node.style.effect {
            VisualEffect::Glass => {
                painter.rect_filled(rect, corner, Color32::from_white_alpha(12));
                painter.rect_stroke(
                    rect,
                    corner,
                    Stroke::new(1.0, Color32::from_white_alpha(40)),
                    StrokeKind::Inside,
                );
            }
            VisualEffect::Blur => {
                painter.rect_filled(rect, corner, Color32::from_white_alpha(6));
            }
            VisualEffect::None | VisualEffect::Shadow => {}
        }

        let selected = self.dashboard.edit_mode().is_selected(id);
        if selected {
            painter.rect_stroke(rect, corner, Stroke::new(2.0, theme::ACCENT), StrokeKind::Outside);
        } else if editing {
            painter.rect_stroke(rect, corner, Stroke::new(1.0, theme::BORDER), StrokeKind::Inside);
        }

        let title = node
            .content
            .blocks
            .iter()
            .find_map(|block| match block {
                ContentBlock::Heading(text) => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or(node.kind.display_name());
        let show_header = editing || !node.style.auto_hide || ui.rect_contains_pointer(rect);
        if show_header {
            self.paint_header(&painter, origin, frame, title, config);
        }

        let body = Rect::from_min_max(
            rect.min + vec2(10.0, config.header_height as f32),
            rect.max - vec2(10.0, 10.0),
        );
        if body.is_positive() {
            self.body_ui(ui, body, id, node, output);
        }
    }

    fn paint_header(
        &self,
        painter: &egui::Painter,
        origin: Pos2,
        frame: kurbo::Rect,
        title: &str,
        config: &DashboardConfig,
    ) {
        let header = to_rect(widget::header_rect(frame, config), origin);
        painter.text(
            Pos2::new(header.left() + 10.0, header.center().y),
            Align2::LEFT_CENTER,
            title,
            egui::FontId::proportional(13.0),
            theme::TEXT,
        );
        if !self.dashboard.is_editing() {
            return;
        }
        for (kind, glyph) in [(ControlKind::Settings, "⚙"), (ControlKind::Delete, "×")] {
            let button = to_rect(widget::control_rect(frame, kind, config), origin);
            let color = match kind {
                ControlKind::Delete => theme::DANGER,
                ControlKind::Settings => theme::TEXT_MUTED,
            };
            painter.text(
                button.center(),
                Align2::CENTER_CENTER,
                glyph,
                egui::FontId::proportional(14.0),
                color,
            );
        }
        let grip = to_rect(widget::resize_handle_rect(frame, config), origin).shrink(3.0);
        let stroke = Stroke::new(1.5, theme::TEXT_MUTED);
        painter.line_segment([grip.left_bottom(), grip.right_top()], stroke);
        painter.line_segment([grip.center_bottom(), grip.right_center()], stroke);
    }

    fn body_ui(
        &self,
        ui: &mut Ui,
        body: Rect,
        id: &WidgetId,
        node: &WidgetNode,
        output: &mut CanvasOutput,
    ) {
        let builder = UiBuilder::new()
            .id_salt(("widget-body", id.as_str()))
            .max_rect(body)
            .layout(Layout::top_down(Align::Min));
        ui.scope_builder(builder, |ui| {
            ui.set_clip_rect(body.intersect(ui.clip_rect()));
            let mut headings = 0;
            for block in &node.content.blocks {
                match block {
                    ContentBlock::Heading(text) => {
                        // The first heading is the header title.
                        headings += 1;
                        if headings > 1 {
                            ui.label(egui::RichText::new(text).strong().color(theme::TEXT));
                        }
                    }
                    ContentBlock::Text(text) => {
                        ui.label(egui::RichText::new(text).color(theme::TEXT));
                    }
                    ContentBlock::Placeholder(text) => {
                        ui.label(egui::RichText::new(text).italics().color(theme::TEXT_MUTED));
                    }
                    ContentBlock::Editor { field, text } => {
                        let mut edited = text.clone();
                        let response = ui.add_sized(
                            ui.available_size(),
                            egui::TextEdit::multiline(&mut edited)
                                .id_salt(("editor", id.as_str(), field.as_str()))
                                .frame(false)
                                .text_color(theme::TEXT)
                                .hint_text("Write something..."),
                        );
                        if response.changed() {
                            output.edits.push(EditorChange {
                                id: id.clone(),
                                field: field.clone(),
                                text: edited,
                            });
                        }
                        if response.lost_focus() {
                            output.closed.push((id.clone(), field.clone()));
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabboard_core::widget::WidgetOverrides;
    use tabboard_core::{Store, WidgetKind};

    fn press(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: Pos2::new(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    fn key(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn test_mouse_events_are_relative_to_canvas() {
        let events = [
            press(110.0, 60.0, true),
            egui::Event::PointerMoved(Pos2::new(150.0, 80.0)),
            press(150.0, 80.0, false),
        ];
        let translated = translate_events(&events, Pos2::new(10.0, 40.0));
        assert_eq!(
            translated,
            vec![
                PointerEvent::Down {
                    pointer: PointerId::Mouse,
                    position: Point::new(100.0, 20.0),
                    modifiers: Modifiers::default(),
                },
                PointerEvent::Move {
                    pointer: PointerId::Mouse,
                    position: Point::new(140.0, 40.0),
                },
                PointerEvent::Up {
                    pointer: PointerId::Mouse,
                    position: Point::new(140.0, 40.0),
                },
            ]
        );
    }

    #[test]
    fn test_secondary_button_ignored() {
        let events = [egui::Event::PointerButton {
            pos: Pos2::new(10.0, 10.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::default(),
        }];
        assert!(translate_events(&events, Pos2::ZERO).is_empty());
    }

    #[test]
    fn test_touches_keep_their_id() {
        let touch = |phase| egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(7),
            phase,
            pos: Pos2::new(5.0, 5.0),
            force: None,
        };
        let translated = translate_events(
            &[touch(egui::TouchPhase::Start), touch(egui::TouchPhase::Cancel)],
            Pos2::ZERO,
        );
        assert_eq!(translated[0].pointer(), PointerId::Touch(7));
        assert_eq!(translated[1], PointerEvent::Cancel { pointer: PointerId::Touch(7) });
    }

    #[test]
    fn test_shift_survives_translation() {
        let events = [egui::Event::PointerButton {
            pos: Pos2::new(1.0, 1.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::SHIFT,
        }];
        let PointerEvent::Down { modifiers, .. } = translate_events(&events, Pos2::ZERO)[0] else {
            panic!("expected a press");
        };
        assert!(modifiers.shift);
    }

    #[test]
    fn test_key_translation() {
        let plain = egui::Modifiers::default();
        let keys = translate_keys(&[
            key(egui::Key::Escape, plain),
            key(egui::Key::Backspace, plain),
            key(egui::Key::Delete, plain),
            key(egui::Key::E, plain),
            key(egui::Key::E, egui::Modifiers::SHIFT),
            key(egui::Key::E, egui::Modifiers::COMMAND),
            key(egui::Key::A, plain),
        ]);
        assert_eq!(
            keys,
            vec![Key::Escape, Key::Delete, Key::Char('e'), Key::Char('E')]
        );
    }

    fn run_frame(dashboard: &Dashboard, events: Vec<egui::Event>) -> CanvasOutput {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 800.0))),
            events,
            ..Default::default()
        };
        let mut output = CanvasOutput::default();
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::new())
                .show(ctx, |ui| {
                    output = DashboardView::new(dashboard).show(ui);
                });
        });
        output
    }

    #[test]
    fn test_view_reports_viewport_and_presses() {
        let mut dashboard = Dashboard::with_store(Store::memory(), DashboardConfig::default());
        pollster::block_on(dashboard.create(WidgetKind::Notes, WidgetOverrides::default()));

        let output = run_frame(&dashboard, vec![press(150.0, 120.0, true)]);
        assert_eq!(output.viewport, Size::new(1000.0, 800.0));
        assert_eq!(output.pointer.len(), 1);
        assert!(output.edits.is_empty());
    }

    #[test]
    fn test_presses_outside_canvas_dropped() {
        let dashboard = Dashboard::with_store(Store::memory(), DashboardConfig::default());
        let output = run_frame(
            &dashboard,
            vec![press(1200.0, 50.0, true), press(1200.0, 50.0, false)],
        );
        assert_eq!(
            output.pointer,
            vec![PointerEvent::Up {
                pointer: PointerId::Mouse,
                position: Point::new(1200.0, 50.0),
            }]
        );
    }
}
