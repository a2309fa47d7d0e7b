// skeleton.rs — arena of bones in construction order, plus the sprites pinned to them.
use std::collections::HashMap;
use egui::{Pos2, vec2};
use crate::bone::{Bone, BoneId, HANDLE_RADIUS};
use crate::error::RigError;
use crate::json_loader::{OverlaySetDef, RigDef};
use crate::overlay::Overlay;
use crate::stage::RenderConfig;
use crate::surface::{AssetProvider, RenderSurface};

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones:    Vec<Bone>,
    names:    Vec<String>,
    by_name:  HashMap<String, BoneId>,
    root:     Option<BoneId>,
    overlays: Vec<Overlay>,
}

impl Skeleton {
    pub fn new() -> Self { Self::default() }

    /// The stock humanoid from the embedded `rig.json`.
    pub fn humanoid(scale: f32) -> Result<Self, RigError> {
        Self::from_def(&crate::json_loader::load("rig.json")?, scale)
    }

    /// Builds the rig bone by bone in definition order; a parent must be defined before its
    /// children. Offsets and lengths are multiplied by `scale`.
    pub fn from_def(def: &RigDef, scale: f32) -> Result<Self, RigError> {
        let mut sk = Self::new();
        for b in &def.bones {
            let bone = Bone::new(vec2(b.offset[0], b.offset[1]) * scale, b.length * scale,
                b.angle.to_radians(), b.anchor);
            match &b.parent {
                Some(parent) => {
                    let parent_id = sk.id(parent).ok_or_else(|| RigError::UnknownParent {
                        bone: b.name.clone(), parent: parent.clone(),
                    })?;
                    sk.attach(parent_id, &b.name, bone)?;
                }
                None => {
                    if let Some(root) = sk.root {
                        return Err(RigError::MultipleRoots {
                            first: sk.name(root).to_string(), second: b.name.clone(),
                        });
                    }
                    sk.push(&b.name, bone)?;
                }
            }
        }
        if sk.root.is_none() { return Err(RigError::NoRoot); }
        sk.recompute_all();
        log::info!("built rig with {} bones at scale {scale:.3}", sk.len());
        Ok(sk)
    }

    /// Registers a bone. The first bone pushed becomes the root.
    pub fn push(&mut self, name: &str, bone: Bone) -> Result<BoneId, RigError> {
        if self.by_name.contains_key(name) { return Err(RigError::DuplicateBone(name.to_string())); }
        let id = BoneId(self.bones.len());
        self.bones.push(bone);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        if self.root.is_none() { self.root = Some(id); }
        Ok(id)
    }

    /// Wires `child` under `parent`. The child must not already have a parent.
    pub fn add_child(&mut self, parent: BoneId, child: BoneId) {
        debug_assert!(self.bones[child.0].parent.is_none(), "bone {child:?} is already parented");
        debug_assert_ne!(parent, child);
        self.bones[child.0].parent = Some(parent);
        self.bones[parent.0].children.push(child);
    }

    pub fn attach(&mut self, parent: BoneId, name: &str, bone: Bone) -> Result<BoneId, RigError> {
        let id = self.push(name, bone)?;
        self.add_child(parent, id);
        Ok(id)
    }

    /// Re-places `id` from its parent's current frame, then its subtree, parents first.
    pub fn recompute_from(&mut self, id: BoneId) {
        let parent = self.bones[id.0].parent.map(|p| self.bones[p.0].frame());
        self.bones[id.0].place(parent);
        for i in 0..self.bones[id.0].children.len() {
            let child = self.bones[id.0].children[i];
            self.recompute_from(child);
        }
    }

    pub fn recompute_all(&mut self) {
        if let Some(root) = self.root { self.recompute_from(root); }
    }

    /// Turns an anchor bone so its end points at `target`; ancestors stay put. Non-anchor
    /// bones keep their angle but still refresh their subtree.
    pub fn point_toward(&mut self, id: BoneId, target: Pos2) {
        let bone = &self.bones[id.0];
        if bone.is_anchor() {
            let d = target - bone.origin();
            let mut angle = d.y.atan2(d.x);
            if let Some(p) = bone.parent { angle -= self.bones[p.0].absolute_angle(); }
            self.bones[id.0].set_local_angle(angle);
        }
        self.recompute_from(id);
    }

    pub fn reset_pose(&mut self) {
        self.bones.iter_mut().for_each(Bone::restore_rest_angle);
        self.recompute_all();
    }

    pub fn bone(&self, id: BoneId) -> &Bone { &self.bones[id.0] }
    pub fn get(&self, id: BoneId) -> Option<&Bone> { self.bones.get(id.0) }
    pub fn id(&self, name: &str) -> Option<BoneId> { self.by_name.get(name).copied() }
    pub fn name(&self, id: BoneId) -> &str { &self.names[id.0] }
    pub fn by_name(&self, name: &str) -> Option<&Bone> { self.id(name).map(|id| self.bone(id)) }
    pub fn root(&self) -> Option<BoneId> { self.root }
    pub fn len(&self) -> usize { self.bones.len() }
    pub fn is_empty(&self) -> bool { self.bones.is_empty() }
    pub fn overlays(&self) -> &[Overlay] { &self.overlays }

    /// Registry order, i.e. construction order.
    pub fn bones(&self) -> impl Iterator<Item = (BoneId, &Bone)> {
        self.bones.iter().enumerate().map(|(i, b)| (BoneId(i), b))
    }

    pub fn find(&self, mut pred: impl FnMut(&Bone) -> bool) -> Option<BoneId> {
        self.bones().find(|&(_, b)| pred(b)).map(|(id, _)| id)
    }

    /// First bone in registry order whose end handle contains `p`.
    pub fn hit(&self, p: Pos2) -> Option<BoneId> { self.find(|b| b.hit_test(p)) }

    /// Resolves each sprite's bone by name and requests its image. Pivots and sizes are
    /// authored at design width and scaled like the bones.
    pub fn bind_overlays(&mut self, def: &OverlaySetDef, assets: &mut dyn AssetProvider,
        parts_dir: &str, scale: f32) -> Result<(), RigError>
    {
        let size = vec2(def.image_size[0], def.image_size[1]) * scale;
        let overlays = def.overlays.iter().map(|o| {
            let bone = self.id(&o.bone).ok_or_else(|| RigError::UnknownBone(o.bone.clone()))?;
            Ok(Overlay {
                image: assets.request(&format!("{parts_dir}/{}", o.image)),
                bone,
                pivot: vec2(o.pivot[0], o.pivot[1]) * scale,
                native_angle_deg: o.angle,
                size,
            })
        }).collect::<Result<Vec<_>, RigError>>()?;
        self.overlays.extend(overlays);
        Ok(())
    }

    /// Sprites first, then the bone lines and joint circles on top.
    pub fn draw(&self, surface: &mut dyn RenderSurface, assets: &dyn AssetProvider, config: &RenderConfig) {
        for overlay in self.overlays.iter().filter(|o| assets.is_ready(o.image)) {
            surface.draw_image(overlay.image, &overlay.transform(self));
        }
        if let Some(root) = self.root { self.draw_bone(root, surface, config); }
    }

    fn draw_bone(&self, id: BoneId, surface: &mut dyn RenderSurface, config: &RenderConfig) {
        let bone = &self.bones[id.0];
        if config.bone_visible {
            surface.stroke_line(bone.origin(), bone.end(), config.bone_stroke);
        }
        if bone.is_anchor() && config.joint_visible {
            surface.stroke_circle(bone.end(), HANDLE_RADIUS, config.joint_stroke);
        }
        for &child in bone.children() { self.draw_bone(child, surface, config); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{FakeAssets, RecordingSurface};
    use egui::{Rect, Vec2, pos2};
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-3;

    fn close(a: Pos2, b: Pos2) -> bool { (a - b).length() < EPS }

    fn arm() -> (Skeleton, BoneId, BoneId, BoneId) {
        let mut sk = Skeleton::new();
        let upper = sk.push("upper", Bone::new(vec2(10.0, 20.0), 100.0, 0.25, true)).unwrap();
        let lower = sk.attach(upper, "lower", Bone::new(Vec2::ZERO, 60.0, -0.5, true)).unwrap();
        let hand  = sk.attach(lower, "hand", Bone::new(vec2(0.0, 5.0), 20.0, 0.1, true)).unwrap();
        sk.recompute_all();
        (sk, upper, lower, hand)
    }

    #[test]
    fn absolute_angle_accumulates_down_the_chain() {
        let (sk, upper, lower, hand) = arm();
        assert_eq!(sk.bone(upper).absolute_angle(), 0.25);
        assert_eq!(sk.bone(lower).absolute_angle(), sk.bone(lower).local_angle() + sk.bone(upper).absolute_angle());
        assert_eq!(sk.bone(hand).absolute_angle(), sk.bone(hand).local_angle() + sk.bone(lower).absolute_angle());
        assert!(close(sk.bone(lower).origin(), sk.bone(upper).end()));
    }

    #[test]
    fn recompute_is_idempotent() {
        let (mut sk, ..) = arm();
        let before: Vec<_> = sk.bones().map(|(_, b)| (b.origin(), b.end(), b.absolute_angle())).collect();
        sk.recompute_all();
        let after: Vec<_> = sk.bones().map(|(_, b)| (b.origin(), b.end(), b.absolute_angle())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn child_of_vertical_parent_hangs_downward() {
        let mut sk = Skeleton::new();
        let parent = sk.push("p", Bone::new(vec2(100.0, -100.0), 100.0, FRAC_PI_2, true)).unwrap();
        let child = sk.attach(parent, "c", Bone::new(Vec2::ZERO, 50.0, 0.0, true)).unwrap();
        sk.recompute_all();
        assert!(close(sk.bone(parent).end(), pos2(100.0, 0.0)));
        assert!(close(sk.bone(child).origin(), pos2(100.0, 0.0)));
        assert!(close(sk.bone(child).end(), pos2(100.0, 50.0)));
    }

    #[test]
    fn point_toward_aims_the_end_at_the_target() {
        let (mut sk, _, lower, hand) = arm();
        let target = pos2(-40.0, 300.0);
        sk.point_toward(lower, target);
        let b = sk.bone(lower);
        let aimed = (b.end().y - b.origin().y).atan2(b.end().x - b.origin().x);
        let wanted = (target.y - b.origin().y).atan2(target.x - b.origin().x);
        assert!((aimed - wanted).abs() < 1e-4);
        // the subtree follows
        let mut expected = sk.bone(hand).clone();
        expected.place(Some(sk.bone(lower).frame()));
        assert_eq!(expected.origin(), sk.bone(hand).origin());
    }

    #[test]
    fn point_toward_leaves_ancestors_alone() {
        let (mut sk, upper, _, hand) = arm();
        let before = (sk.bone(upper).local_angle(), sk.bone(upper).end());
        sk.point_toward(hand, pos2(500.0, -500.0));
        assert_eq!(before, (sk.bone(upper).local_angle(), sk.bone(upper).end()));
    }

    #[test]
    fn leaf_pointed_at_origin_faces_lower_left() {
        let mut sk = Skeleton::new();
        let root = sk.push("root", Bone::new(vec2(10.0, 10.0), 30.0, 0.0, true)).unwrap();
        sk.point_toward(root, Pos2::ZERO);
        let angle = sk.bone(root).absolute_angle().rem_euclid(2.0 * PI).to_degrees();
        assert!((angle - 225.0).abs() < 1e-3);
        let end = sk.bone(root).end();
        assert!(end.x < 10.0 && end.y < 10.0);
    }

    #[test]
    fn point_toward_subtracts_parent_angle() {
        let mut sk = Skeleton::new();
        let parent = sk.push("p", Bone::new(Vec2::ZERO, 10.0, FRAC_PI_2, true)).unwrap();
        let child = sk.attach(parent, "c", Bone::new(Vec2::ZERO, 10.0, 0.0, true)).unwrap();
        sk.recompute_all();
        // child origin is (0, 10); aim straight right
        sk.point_toward(child, pos2(50.0, 10.0));
        assert!((sk.bone(child).local_angle() + FRAC_PI_2).abs() < 1e-5);
        assert!(sk.bone(child).absolute_angle().abs() < 1e-5);
    }

    #[test]
    fn non_anchor_keeps_angle_but_refreshes_subtree() {
        let mut sk = Skeleton::new();
        let root = sk.push("root", Bone::new(Vec2::ZERO, 50.0, 0.0, true)).unwrap();
        let shoulder = sk.attach(root, "shoulder", Bone::new(Vec2::ZERO, 20.0, 0.4, false)).unwrap();
        let arm = sk.attach(shoulder, "arm", Bone::new(Vec2::ZERO, 20.0, 0.2, true)).unwrap();
        sk.recompute_all();

        // move an ancestor without recomputing, then poke the non-anchor
        sk.bones[root.0].set_local_angle(1.0);
        sk.bones[root.0].place(None);
        sk.point_toward(shoulder, pos2(-100.0, -100.0));

        assert_eq!(sk.bone(shoulder).local_angle(), 0.4);
        assert!((sk.bone(shoulder).absolute_angle() - 1.4).abs() < 1e-6);
        assert!((sk.bone(arm).absolute_angle() - 1.6).abs() < 1e-6);
        assert!(close(sk.bone(arm).origin(), sk.bone(shoulder).end()));
    }

    #[test]
    fn hit_returns_first_match_in_registry_order() {
        let mut sk = Skeleton::new();
        let a = sk.push("a", Bone::new(Vec2::ZERO, 10.0, 0.0, true)).unwrap();
        let _b = sk.attach(a, "b", Bone::new(vec2(-10.0, 0.0), 0.0, 0.0, true)).unwrap();
        sk.recompute_all();
        // both ends sit at (10, 0) and (20, 0); (15, 0) is inside both boxes
        assert_eq!(sk.hit(pos2(15.0, 0.0)), Some(a));
        assert_eq!(sk.hit(pos2(100.0, 100.0)), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut sk = Skeleton::new();
        sk.push("a", Bone::new(Vec2::ZERO, 1.0, 0.0, true)).unwrap();
        assert!(matches!(sk.push("a", Bone::new(Vec2::ZERO, 1.0, 0.0, true)), Err(RigError::DuplicateBone(_))));
    }

    #[test]
    fn humanoid_registry_follows_definition_order() {
        let sk = Skeleton::humanoid(1.0).unwrap();
        let names: Vec<_> = sk.bones().map(|(id, _)| sk.name(id)).collect();
        assert_eq!(names, [
            "chest", "head", "halo", "front_hair", "side_hair",
            "left_shoulder", "left_arm", "right_shoulder", "right_arm",
            "left_pelvis", "left_leg", "right_pelvis", "right_leg",
        ]);
        let chest = sk.by_name("chest").unwrap();
        assert!(close(chest.origin(), pos2(300.0, 410.0)));
        assert!(close(chest.end(), pos2(300.0, 310.0)));
        let non_anchors: Vec<_> = sk.bones().filter(|(_, b)| !b.is_anchor()).map(|(id, _)| sk.name(id)).collect();
        assert_eq!(non_anchors, ["front_hair", "left_shoulder", "right_shoulder", "left_pelvis", "right_pelvis"]);
    }

    #[test]
    fn humanoid_scales_uniformly() {
        let full = Skeleton::humanoid(1.0).unwrap();
        let half = Skeleton::humanoid(0.5).unwrap();
        for ((_, a), (_, b)) in full.bones().zip(half.bones()) {
            assert!(close(pos2(a.end().x * 0.5, a.end().y * 0.5), b.end()));
            assert_eq!(a.absolute_angle(), b.absolute_angle());
        }
    }

    #[test]
    fn bad_definitions_are_rejected() {
        let parse = |json| crate::json_loader::parse::<RigDef>("test", json).unwrap();
        let orphan = parse(r#"{"design_width":600,"bones":[
            {"name":"a","offset":[0,0],"length":1,"angle":0},
            {"name":"b","parent":"zzz","offset":[0,0],"length":1,"angle":0}]}"#);
        assert!(matches!(Skeleton::from_def(&orphan, 1.0), Err(RigError::UnknownParent { .. })));

        let twins = parse(r#"{"design_width":600,"bones":[
            {"name":"a","offset":[0,0],"length":1,"angle":0},
            {"name":"b","offset":[0,0],"length":1,"angle":0}]}"#);
        assert!(matches!(Skeleton::from_def(&twins, 1.0), Err(RigError::MultipleRoots { .. })));

        let empty = parse(r#"{"design_width":600,"bones":[]}"#);
        assert!(matches!(Skeleton::from_def(&empty, 1.0), Err(RigError::NoRoot)));
    }

    #[test]
    fn overlays_bind_to_named_bones_in_draw_order() {
        let mut sk = Skeleton::humanoid(1.0).unwrap();
        let mut assets = FakeAssets::default();
        let def: OverlaySetDef = crate::json_loader::load("overlays.json").unwrap();
        sk.bind_overlays(&def, &mut assets, "parts", 1.0).unwrap();
        let bound: Vec<_> = sk.overlays().iter().map(|o| sk.name(o.bone)).collect();
        assert_eq!(bound, [
            "halo", "head", "left_leg", "right_leg", "chest", "head", "head", "head",
            "front_hair", "side_hair", "left_arm", "right_arm",
        ]);
        assert_eq!(assets.requested[0], "parts/0_halo.png");
        assert_eq!(assets.requested.len(), 12);
    }

    #[test]
    fn overlay_with_unknown_bone_fails() {
        let mut sk = Skeleton::humanoid(1.0).unwrap();
        let def: OverlaySetDef = crate::json_loader::parse("test",
            r#"{"parts_dir":"p","image_size":[1,1],"overlays":[{"image":"x.png","bone":"tail","pivot":[0,0]}]}"#).unwrap();
        let err = sk.bind_overlays(&def, &mut FakeAssets::default(), "p", 1.0).unwrap_err();
        assert!(matches!(err, RigError::UnknownBone(b) if b == "tail"));
    }

    #[test]
    fn draw_puts_ready_sprites_under_the_skeleton() {
        let mut sk = Skeleton::humanoid(1.0).unwrap();
        let mut assets = FakeAssets::default();
        let def: OverlaySetDef = crate::json_loader::load("overlays.json").unwrap();
        sk.bind_overlays(&def, &mut assets, "parts", 1.0).unwrap();
        assets.ready = vec!["parts/3_body.png".into(), "parts/eye.png".into()];

        let mut surface = RecordingSurface::new(Rect::from_min_size(Pos2::ZERO, vec2(600.0, 800.0)));
        sk.draw(&mut surface, &assets, &RenderConfig::default());

        assert_eq!(surface.images().len(), 2);
        let first_line = surface.calls.iter().position(|c| matches!(c, crate::surface::testing::Call::Line(..))).unwrap();
        assert_eq!(first_line, 2);
        assert_eq!(surface.lines(), 13);
        assert_eq!(surface.circles(), 8);
    }

    #[test]
    fn reset_pose_restores_authored_angles() {
        let mut sk = Skeleton::humanoid(1.0).unwrap();
        let rest: Vec<_> = sk.bones().map(|(_, b)| b.end()).collect();
        let arm = sk.id("left_arm").unwrap();
        sk.point_toward(arm, pos2(0.0, 0.0));
        assert_ne!(sk.bone(arm).end(), rest[arm.index()]);
        sk.reset_pose();
        let after: Vec<_> = sk.bones().map(|(_, b)| b.end()).collect();
        assert_eq!(rest, after);
    }
}
