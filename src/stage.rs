// stage.rs — the canvas manager: one rig, one pointer controller, one set of draw toggles.
use egui::{Color32, Rect, Stroke};
use crate::error::RigError;
use crate::interaction::{Feedback, InteractionController, PointerSample};
use crate::json_loader::{OverlaySetDef, RigDef, StageDef, color32};
use crate::skeleton::Skeleton;
use crate::surface::{AssetProvider, RenderSurface};

/// Everything a frame needs to know about how to paint, passed into each draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub bone_visible:  bool,
    pub joint_visible: bool,
    pub bone_stroke:   Stroke,
    pub joint_stroke:  Stroke,
    pub background:    Color32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bone_visible: true, joint_visible: true,
            bone_stroke:  Stroke::new(3.0, Color32::from_rgba_unmultiplied(255, 255, 255, 84)),
            joint_stroke: Stroke::new(4.0, Color32::from_rgba_unmultiplied(180, 180, 255, 168)),
            background:   Color32::from_rgb(237, 242, 251),
        }
    }
}

impl RenderConfig {
    pub fn from_def(def: &StageDef) -> Self {
        Self {
            bone_stroke: def.bone_stroke.stroke(),
            joint_stroke: def.joint_stroke.stroke(),
            background: color32(def.background),
            ..Self::default()
        }
    }
}

pub struct Stage {
    pub skeleton: Skeleton,
    pub config:   RenderConfig,
    controller:   InteractionController,
    scale:        f32,
}

impl Stage {
    /// Scales the rig so its design width maps onto `canvas_width`.
    pub fn new(stage: &StageDef, rig: &RigDef, overlays: &OverlaySetDef, parts_dir: &str,
        assets: &mut dyn AssetProvider, canvas_width: f32) -> Result<Self, RigError>
    {
        let scale = canvas_width / rig.design_width;
        let mut skeleton = Skeleton::from_def(rig, scale)?;
        skeleton.bind_overlays(overlays, assets, parts_dir, scale)?;
        Ok(Self { skeleton, config: RenderConfig::from_def(stage), controller: InteractionController::default(), scale })
    }

    /// The embedded humanoid with its sprites and stage styling.
    pub fn embedded(assets: &mut dyn AssetProvider, parts_dir: &str, canvas_width: f32) -> Result<Self, RigError> {
        use crate::json_loader::load;
        Self::new(&load("stage.json")?, &load("rig.json")?, &load("overlays.json")?, parts_dir, assets, canvas_width)
    }

    pub fn scale(&self) -> f32 { self.scale }
    pub fn controller(&self) -> &InteractionController { &self.controller }

    pub fn draw(&self, surface: &mut dyn RenderSurface, assets: &dyn AssetProvider) {
        let bounds = Rect::from_min_size(egui::Pos2::ZERO, surface.bounding_box().size());
        surface.clear_rect(bounds);
        surface.fill_rect(bounds, self.config.background);
        self.skeleton.draw(surface, assets, &self.config);
    }

    pub fn handle(&mut self, sample: PointerSample, surface_bounds: Rect) -> Feedback {
        self.controller.handle(sample, surface_bounds, &mut self.skeleton)
    }

    pub fn toggle_bones(&mut self) -> Feedback {
        self.config.bone_visible = !self.config.bone_visible;
        self.repaint()
    }

    pub fn toggle_joints(&mut self) -> Feedback {
        self.config.joint_visible = !self.config.joint_visible;
        self.repaint()
    }

    pub fn reset_pose(&mut self) -> Feedback {
        self.skeleton.reset_pose();
        self.repaint()
    }

    fn repaint(&self) -> Feedback { Feedback { redraw: true, cursor: self.controller.cursor() } }
}
