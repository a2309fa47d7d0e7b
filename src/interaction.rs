// interaction.rs — pointer/touch input to hover, grab and drag.
use egui::{Pos2, Rect};
use crate::bone::BoneId;
use crate::skeleton::Skeleton;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase { Down, Move, Up, Cancel }

/// One pointer or touch event in client (window) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample { pub pos: Pos2, pub phase: PointerPhase }

impl PointerSample {
    pub fn new(pos: Pos2, phase: PointerPhase) -> Self { Self { pos, phase } }

    /// Touch events carry every active point; only the first one steers.
    pub fn touch(points: &[Pos2], phase: PointerPhase) -> Option<Self> {
        points.first().map(|&pos| Self { pos, phase })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Hovering(BoneId),
    Dragging(BoneId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor { #[default] Default, Pointer }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Feedback { pub redraw: bool, pub cursor: Cursor }

pub fn to_local(client: Pos2, surface_bounds: Rect) -> Pos2 { client - surface_bounds.min.to_vec2() }

#[derive(Debug, Default)]
pub struct InteractionController { state: DragState }

impl InteractionController {
    pub fn state(&self) -> DragState { self.state }

    pub fn grabbed(&self) -> Option<BoneId> {
        match self.state { DragState::Dragging(b) => Some(b), _ => None }
    }

    pub fn cursor(&self) -> Cursor {
        match self.state { DragState::Idle => Cursor::Default, _ => Cursor::Pointer }
    }

    pub fn handle(&mut self, sample: PointerSample, surface_bounds: Rect, skeleton: &mut Skeleton) -> Feedback {
        let p = to_local(sample.pos, surface_bounds);
        let mut redraw = false;
        self.state = match (sample.phase, self.state) {
            (PointerPhase::Down, _) => match skeleton.hit(p) {
                Some(b) => {
                    log::debug!("grabbed '{}' at ({:.1}, {:.1})", skeleton.name(b), p.x, p.y);
                    DragState::Dragging(b)
                }
                None => DragState::Idle,
            },
            (PointerPhase::Move, DragState::Dragging(b)) => {
                skeleton.point_toward(b, p);
                redraw = true;
                DragState::Dragging(b)
            }
            (PointerPhase::Move, _) => skeleton.hit(p).map_or(DragState::Idle, DragState::Hovering),
            (PointerPhase::Up | PointerPhase::Cancel, state) => {
                if let DragState::Dragging(b) = state { log::debug!("released '{}'", skeleton.name(b)); }
                DragState::Idle
            }
        };
        Feedback { redraw, cursor: self.cursor() }
    }
}
