use egui::{CentralPanel, Context, RichText, TopBottomPanel, vec2};
use crate::{error::RigError, json_loader::{OverlaySetDef, StageDef}, sprites::SpriteStore, stage::Stage,
    ui_canvas::draw_stage_canvas};

/// Overrides the sprite directory named in overlays.json.
pub const PARTS_ENV: &str = "RIGPUPPET_PARTS";

pub struct RigPuppetApp {
    pub stage:      Result<Stage, String>,
    pub sprites:    SpriteStore,
    pub canvas:     egui::Vec2,
}

fn build_stage(sprites: &mut SpriteStore) -> Result<(Stage, egui::Vec2), RigError> {
    let stage_def: StageDef = crate::json_loader::load("stage.json")?;
    let overlays: OverlaySetDef = crate::json_loader::load("overlays.json")?;
    let parts_dir = std::env::var(PARTS_ENV).unwrap_or_else(|_| overlays.parts_dir.clone());
    let canvas = vec2(stage_def.canvas[0], stage_def.canvas[1]);
    let stage = Stage::new(&stage_def, &crate::json_loader::load("rig.json")?, &overlays,
        &parts_dir, sprites, canvas.x)?;
    log::info!("stage ready: {}x{} canvas, sprites from '{parts_dir}'", canvas.x, canvas.y);
    Ok((stage, canvas))
}

impl Default for RigPuppetApp {
    fn default() -> Self {
        let mut sprites = SpriteStore::default();
        match build_stage(&mut sprites) {
            Ok((stage, canvas)) => Self { stage: Ok(stage), sprites, canvas },
            Err(e) => {
                log::error!("{e}");
                Self { stage: Err(e.to_string()), sprites, canvas: vec2(600.0, 800.0) }
            }
        }
    }
}

fn toolbar(ctx: &Context, stage: &mut Stage) -> bool {
    let mut redraw = false;
    TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let label = |on: bool, what: &str| format!("{} {what}", if on { "Hide" } else { "Show" });
            if ui.button(label(stage.config.bone_visible, "bones")).clicked()   { redraw |= stage.toggle_bones().redraw; }
            if ui.button(label(stage.config.joint_visible, "joints")).clicked() { redraw |= stage.toggle_joints().redraw; }
            ui.separator();
            if ui.button("↺ Reset pose").clicked() { redraw |= stage.reset_pose().redraw; }
        });
    });
    redraw
}

impl eframe::App for RigPuppetApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if self.sprites.poll(ctx) { ctx.request_repaint(); }
        if self.sprites.pending() > 0 { ctx.request_repaint_after(std::time::Duration::from_millis(100)); }

        let stage = match &mut self.stage {
            Ok(stage) => stage,
            Err(msg) => {
                CentralPanel::default().show(ctx, |ui| {
                    ui.label(RichText::new(format!("❌ Could not build the rig: {msg}")).color(egui::Color32::RED));
                });
                return;
            }
        };

        let mut redraw = toolbar(ctx, stage);
        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let (_, feedback) = draw_stage_canvas(ui, stage, &self.sprites, self.canvas);
                redraw |= feedback.redraw;
            });
        });
        if redraw { ctx.request_repaint(); }
    }
}
