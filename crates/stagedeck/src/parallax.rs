use eframe::egui::{Pos2, Rect};

use crate::anim::{Ease, Prop, Target, Timeline, TweenSpec};

/// Background orbs and their travel (pixels per unit of pointer offset).
const ORBS: [(u8, f32); 2] = [(1, 100.0), (2, -80.0)];
const ORB_DURATION: f32 = 2.0;
const GRID_TRAVEL: f32 = 30.0;
const GRID_DURATION: f32 = 3.0;
const CARD_TILT: f32 = 10.0;
const CARD_DURATION: f32 = 1.0;

/// Pointer position as an offset from the viewport centre, each axis in
/// `[-0.5, 0.5]`.
pub fn normalized_offset(pos: Pos2, viewport: Rect) -> (f32, f32) {
    let norm = |v: f32, min: f32, size: f32| {
        if size <= 0.0 {
            0.0
        } else {
            ((v - min) / size - 0.5).clamp(-0.5, 0.5)
        }
    };
    (
        norm(pos.x, viewport.min.x, viewport.width()),
        norm(pos.y, viewport.min.y, viewport.height()),
    )
}

/// Retargets decorative layers toward the latest pointer sample.
#[derive(Debug, Default)]
pub struct Parallax {
    last: Option<(f32, f32)>,
}

impl Parallax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last normalized offset seen.
    #[cfg(test)]
    pub fn offset(&self) -> Option<(f32, f32)> {
        self.last
    }

    /// Point every layer at the new pointer position. `cards` are the tilting
    /// elements of the active slide.
    pub fn pointer_moved(
        &mut self,
        pos: Pos2,
        viewport: Rect,
        cards: &[Target],
        timeline: &mut Timeline,
    ) -> (f32, f32) {
        let (x, y) = normalized_offset(pos, viewport);
        self.last = Some((x, y));

        let orb_spec = TweenSpec::new(ORB_DURATION).ease(Ease::Power2Out);
        for (id, travel) in ORBS {
            timeline.to(
                Target::Orb(id),
                &[(Prop::X, x * travel), (Prop::Y, y * travel)],
                orb_spec,
            );
        }
        timeline.to(
            Target::Grid,
            &[(Prop::X, x * GRID_TRAVEL), (Prop::Y, y * GRID_TRAVEL)],
            TweenSpec::new(GRID_DURATION).ease(Ease::Power1Out),
        );

        let card_spec = TweenSpec::new(CARD_DURATION).ease(Ease::Power2Out);
        for &card in cards {
            timeline.to(
                card,
                &[(Prop::RotateY, x * CARD_TILT), (Prop::RotateX, -y * CARD_TILT)],
                card_spec,
            );
        }
        (x, y)
    }
}
