//! Pose a sprite-dressed 2D bone rig by dragging its joints.
//!
//! [`skeleton::Skeleton`] holds the bones in an arena and propagates placements from the root
//! down; [`interaction::InteractionController`] turns pointer samples into grabs and drags;
//! [`stage::Stage`] ties the two to a [`surface::RenderSurface`]. The egui frontend lives in
//! [`app`], [`ui_canvas`] and [`sprites`].

pub mod app;
pub mod bone;
pub mod error;
pub mod interaction;
pub mod json_loader;
pub mod overlay;
pub mod skeleton;
pub mod sprites;
pub mod stage;
pub mod surface;
pub mod ui_canvas;

pub use bone::{Bone, BoneId, HANDLE_RADIUS};
pub use error::RigError;
pub use skeleton::Skeleton;
pub use stage::{RenderConfig, Stage};
