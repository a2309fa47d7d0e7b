// ui_canvas.rs
use egui::{Color32, CursorIcon, Event, Mesh, Painter, Pos2, Rect, Response, Shape, Stroke, TouchPhase, Ui, Vec2, emath::Rot2, pos2};
use crate::interaction::{Cursor, Feedback, PointerPhase, PointerSample};
use crate::overlay::ImageTransform;
use crate::sprites::SpriteStore;
use crate::stage::Stage;
use crate::surface::{ImageHandle, RenderSurface};

/// Paints stage-local coordinates into the allocated canvas rect.
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    rect: Rect,
    sprites: &'a SpriteStore,
    clear_color: Color32,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, rect: Rect, sprites: &'a SpriteStore, clear_color: Color32) -> Self {
        Self { painter, rect, sprites, clear_color }
    }

    fn to_screen(&self, p: Pos2) -> Pos2 { p + self.rect.min.to_vec2() }
    fn rect_to_screen(&self, r: Rect) -> Rect { r.translate(self.rect.min.to_vec2()) }
}

impl RenderSurface for EguiSurface<'_> {
    fn clear_rect(&mut self, rect: Rect) {
        self.painter.rect_filled(self.rect_to_screen(rect), 0.0, self.clear_color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(self.rect_to_screen(rect), 0.0, color);
    }

    fn stroke_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.painter.line_segment([self.to_screen(from), self.to_screen(to)], stroke);
    }

    fn stroke_circle(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.painter.circle_stroke(self.to_screen(center), radius, stroke);
    }

    fn draw_image(&mut self, image: ImageHandle, t: &ImageTransform) {
        let Some(texture) = self.sprites.texture_id(image) else { return };
        let origin = self.to_screen(t.translate);
        let mut mesh = Mesh::with_texture(texture);
        mesh.add_rect_with_uv(Rect::from_min_size(origin + t.offset, t.size),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)), Color32::WHITE);
        mesh.rotate(Rot2::from_angle(t.rotation), origin);
        self.painter.add(Shape::mesh(mesh));
    }

    fn bounding_box(&self) -> Rect { self.rect }
}

/// Translates this frame's raw egui input into neutral pointer samples. Touches arrive twice in
/// egui (as emulated pointer events and as `Touch`); only cancellation needs the touch stream.
pub fn pointer_samples(events: &[Event]) -> Vec<PointerSample> {
    events.iter().filter_map(|e| match *e {
        Event::PointerButton { pos, button: egui::PointerButton::Primary, pressed, .. } =>
            Some(PointerSample::new(pos, if pressed { PointerPhase::Down } else { PointerPhase::Up })),
        Event::PointerMoved(pos) => Some(PointerSample::new(pos, PointerPhase::Move)),
        Event::Touch { phase: TouchPhase::Cancel, pos, .. } => PointerSample::touch(&[pos], PointerPhase::Cancel),
        _ => None,
    }).collect()
}

fn cursor_icon(cursor: Cursor) -> CursorIcon {
    match cursor { Cursor::Default => CursorIcon::Default, Cursor::Pointer => CursorIcon::PointingHand }
}

/// Allocates a canvas of the stage's size, feeds it this frame's input, then paints it.
pub fn draw_stage_canvas(ui: &mut Ui, stage: &mut Stage, sprites: &SpriteStore, size: Vec2) -> (Response, Feedback) {
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;

    let events = ui.input(|i| i.events.clone());
    let mut feedback = Feedback { redraw: false, cursor: stage.controller().cursor() };
    for sample in pointer_samples(&events) {
        // presses outside the canvas belong to other widgets; moves and releases always count
        if sample.phase == PointerPhase::Down && !rect.contains(sample.pos) { continue; }
        let fb = stage.handle(sample, rect);
        feedback = Feedback { redraw: feedback.redraw | fb.redraw, cursor: fb.cursor };
    }
    if response.hovered() || stage.controller().grabbed().is_some() {
        ui.ctx().set_cursor_icon(cursor_icon(feedback.cursor));
    }

    let mut surface = EguiSurface::new(&painter, rect, sprites, ui.visuals().extreme_bg_color);
    stage.draw(&mut surface, sprites);
    (response, feedback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egui_events_map_to_pointer_phases() {
        let events = vec![
            Event::PointerMoved(pos2(1.0, 1.0)),
            Event::PointerButton { pos: pos2(2.0, 2.0), button: egui::PointerButton::Primary,
                pressed: true, modifiers: Default::default() },
            Event::PointerButton { pos: pos2(3.0, 3.0), button: egui::PointerButton::Secondary,
                pressed: true, modifiers: Default::default() },
            Event::PointerButton { pos: pos2(4.0, 4.0), button: egui::PointerButton::Primary,
                pressed: false, modifiers: Default::default() },
            Event::Touch { device_id: egui::TouchDeviceId(0), id: egui::TouchId(0),
                phase: TouchPhase::Cancel, pos: pos2(5.0, 5.0), force: None },
            Event::Touch { device_id: egui::TouchDeviceId(0), id: egui::TouchId(0),
                phase: TouchPhase::Move, pos: pos2(6.0, 6.0), force: None },
        ];
        let phases: Vec<_> = pointer_samples(&events).iter().map(|s| (s.phase, s.pos.x)).collect();
        assert_eq!(phases, [
            (PointerPhase::Move, 1.0), (PointerPhase::Down, 2.0),
            (PointerPhase::Up, 4.0), (PointerPhase::Cancel, 5.0),
        ]);
    }
}
