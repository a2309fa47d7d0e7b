// bone.rs — one rigid segment of the rig; geometry only, wiring lives in skeleton.rs.
use egui::{Pos2, Vec2, pos2, vec2};

/// Half-size of the square grab box around a bone's end, also the joint circle radius.
pub const HANDLE_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub usize);

impl BoneId {
    pub fn index(self) -> usize { self.0 }
}

/// Snapshot of a parent's absolute placement, all a child needs to place itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame { pub end: Pos2, pub angle: f32 }

#[derive(Clone, Debug)]
pub struct Bone {
    offset:      Vec2,
    length:      f32,
    local_angle: f32,
    rest_angle:  f32,
    is_anchor:   bool,

    origin:         Pos2,
    absolute_angle: f32,
    end:            Pos2,

    pub(crate) parent:   Option<BoneId>,
    pub(crate) children: Vec<BoneId>,
}

impl Bone {
    /// Angles in radians. Derived fields are computed as if the bone had no parent;
    /// the owning skeleton recomputes once the bone is wired in.
    pub fn new(offset: Vec2, length: f32, local_angle: f32, is_anchor: bool) -> Self {
        let mut bone = Self {
            offset, length, local_angle, rest_angle: local_angle, is_anchor,
            origin: Pos2::ZERO, absolute_angle: 0.0, end: Pos2::ZERO,
            parent: None, children: Vec::new(),
        };
        bone.place(None);
        bone
    }

    /// Recomputes this bone's absolute placement from its parent's current frame.
    pub fn place(&mut self, parent: Option<Frame>) {
        self.absolute_angle = self.local_angle;
        self.origin = match parent {
            Some(p) => {
                self.absolute_angle += p.angle;
                let (sin, cos) = p.angle.sin_cos();
                let (x, y) = (self.offset.x, self.offset.y);
                p.end - vec2(x * cos - y * sin, x * sin + y * cos)
            }
            None => pos2(self.offset.x, self.offset.y),
        };
        let (sin, cos) = self.absolute_angle.sin_cos();
        self.end = self.origin + vec2(cos, sin) * self.length;
    }

    pub fn hit_test(&self, p: Pos2) -> bool {
        (p.x - self.end.x).abs() <= HANDLE_RADIUS && (p.y - self.end.y).abs() <= HANDLE_RADIUS
    }

    pub(crate) fn set_local_angle(&mut self, angle: f32) { self.local_angle = angle; }
    pub(crate) fn restore_rest_angle(&mut self) { self.local_angle = self.rest_angle; }

    pub fn frame(&self) -> Frame { Frame { end: self.end, angle: self.absolute_angle } }

    pub fn origin(&self)         -> Pos2 { self.origin }
    pub fn end(&self)            -> Pos2 { self.end }
    pub fn absolute_angle(&self) -> f32  { self.absolute_angle }
    pub fn local_angle(&self)    -> f32  { self.local_angle }
    pub fn rest_angle(&self)     -> f32  { self.rest_angle }
    pub fn offset(&self)         -> Vec2 { self.offset }
    pub fn length(&self)         -> f32  { self.length }
    pub fn is_anchor(&self)      -> bool { self.is_anchor }
    pub fn parent(&self)         -> Option<BoneId> { self.parent }
    pub fn children(&self)       -> &[BoneId] { &self.children }
}
