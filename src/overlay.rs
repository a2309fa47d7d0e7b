// overlay.rs
use egui::{Pos2, Vec2};
use crate::{bone::BoneId, skeleton::Skeleton, surface::ImageHandle};

/// A sprite pinned to a bone. `pivot` is the image-space point that sits on the bone's
/// origin; `native_angle_deg` is the direction the bone points in the unrotated image.
#[derive(Clone, Debug)]
pub struct Overlay {
    pub image: ImageHandle,
    pub bone: BoneId,
    pub pivot: Vec2,
    pub native_angle_deg: f32,
    pub size: Vec2,
}

/// Translate to `translate`, rotate by `rotation`, then draw the image's top-left at
/// `offset` (in the rotated frame) with the given `size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageTransform {
    pub translate: Pos2,
    pub rotation: f32,
    pub offset: Vec2,
    pub size: Vec2,
}

impl ImageTransform {
    /// Maps a point of the drawn image rect (rotated frame) into surface coordinates.
    pub fn apply(&self, local: Vec2) -> Pos2 {
        let (sin, cos) = self.rotation.sin_cos();
        self.translate + Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
    }
}

impl Overlay {
    pub fn transform(&self, skeleton: &Skeleton) -> ImageTransform {
        let bone = skeleton.bone(self.bone);
        ImageTransform {
            translate: bone.origin(),
            rotation: bone.absolute_angle() - self.native_angle_deg.to_radians(),
            offset: -self.pivot,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::Bone;
    use egui::{pos2, vec2};

    #[test]
    fn pivot_lands_on_bone_origin() {
        let mut sk = Skeleton::new();
        let root = sk.push("root", Bone::new(vec2(40.0, 60.0), 10.0, 1.0, true)).unwrap();
        sk.recompute_all();
        let overlay = Overlay {
            image: ImageHandle(0), bone: root, pivot: vec2(25.0, 5.0),
            native_angle_deg: 90.0, size: vec2(50.0, 50.0),
        };
        let t = overlay.transform(&sk);
        assert_eq!(t.translate, pos2(40.0, 60.0));
        assert!((t.rotation - (1.0 - std::f32::consts::FRAC_PI_2)).abs() < 1e-6);
        assert!((t.apply(t.offset + overlay.pivot) - pos2(40.0, 60.0)).length() < 1e-4);
    }

    #[test]
    fn aligned_sprite_is_not_rotated() {
        let mut sk = Skeleton::new();
        let root = sk.push("root", Bone::new(Vec2::ZERO, 10.0, 270f32.to_radians(), true)).unwrap();
        sk.recompute_all();
        let overlay = Overlay {
            image: ImageHandle(0), bone: root, pivot: Vec2::ZERO,
            native_angle_deg: 270.0, size: vec2(8.0, 8.0),
        };
        assert!(overlay.transform(&sk).rotation.abs() < 1e-6);
    }
}
