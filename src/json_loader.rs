// json_loader.rs — rig topology, sprite bindings and stage styling, embedded at compile time.
use serde::Deserialize;
use egui::{Color32, Stroke};
use crate::error::RigError;

#[derive(Debug, Deserialize, Clone)]
pub struct RigDef {
    /// Canvas width the offsets were authored for; the rig scales by `canvas / design_width`.
    pub design_width: f32,
    pub bones: Vec<BoneDef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoneDef {
    pub name: String,
    #[serde(default)] pub parent: Option<String>,
    pub offset: [f32; 2],
    pub length: f32,
    /// Degrees.
    pub angle: f32,
    #[serde(default = "default_anchor")]
    pub anchor: bool,
}

fn default_anchor() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct OverlaySetDef {
    pub parts_dir: String,
    pub image_size: [f32; 2],
    pub overlays: Vec<OverlayDef>,
}

/// Listed in draw order, back to front.
#[derive(Debug, Deserialize, Clone)]
pub struct OverlayDef {
    pub image: String,
    pub bone: String,
    pub pivot: [f32; 2],
    /// Degrees.
    #[serde(default)] pub angle: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrokeDef { pub width: f32, pub color: [u8; 4] }

impl StrokeDef {
    pub fn stroke(&self) -> Stroke { Stroke::new(self.width, color32(self.color)) }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StageDef {
    pub canvas: [f32; 2],
    pub background: [u8; 4],
    pub bone_stroke: StrokeDef,
    pub joint_stroke: StrokeDef,
}

pub fn color32(c: [u8; 4]) -> Color32 { Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]) }

// include_str! requires compile-time paths; all assets must be listed here.
fn asset(name: &str) -> Result<&'static str, RigError> {
    match name {
        "rig.json"      => Ok(include_str!("../assets/rig.json")),
        "overlays.json" => Ok(include_str!("../assets/overlays.json")),
        "stage.json"    => Ok(include_str!("../assets/stage.json")),
        _ => Err(RigError::MissingAsset(name.to_string())),
    }
}

pub fn load<T: for<'de> Deserialize<'de>>(name: &str) -> Result<T, RigError> {
    parse(name, asset(name)?)
}

pub fn parse<T: for<'de> Deserialize<'de>>(name: &str, json: &str) -> Result<T, RigError> {
    serde_json::from_str(json).map_err(|source| RigError::Parse { name: name.to_string(), source })
}
