// surface.rs — capabilities the rig draws through; egui implements them in ui_canvas.rs / sprites.rs.
use egui::{Color32, Pos2, Rect, Stroke};
use crate::overlay::ImageTransform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// A 2D canvas in its own local coordinates (top-left = 0,0).
pub trait RenderSurface {
    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn stroke_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn stroke_circle(&mut self, center: Pos2, radius: f32, stroke: Stroke);
    fn draw_image(&mut self, image: ImageHandle, transform: &ImageTransform);
    /// On-screen placement of the surface; `min` is subtracted from client coordinates.
    fn bounding_box(&self) -> Rect;
}

/// Images load in the background; anything not yet ready is skipped at draw time.
pub trait AssetProvider {
    fn request(&mut self, path: &str) -> ImageHandle;
    fn is_ready(&self, image: ImageHandle) -> bool;
}
