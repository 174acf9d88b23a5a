/// Default overshoot for `BackOut` when none is given.
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing curves used by the timeline.
///
/// All curves map `0.0 -> 0.0` and `1.0 -> 1.0`. `BackOut` overshoots past 1.0
/// on the way there.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
    Power2Out,
    Power4Out,
    ExpoOut,
    BackOut(f32),
}

impl Ease {
    /// `back.out` with the standard overshoot.
    pub fn back_out() -> Self {
        Self::BackOut(BACK_OVERSHOOT)
    }

    /// Map linear progress `t` (clamped to `[0, 1]`) onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power1Out => 1.0 - (1.0 - t).powi(2),
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power4Out => 1.0 - (1.0 - t).powi(5),
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Self::BackOut(s) => {
                let u = t - 1.0;
                1.0 + (s + 1.0) * u.powi(3) + s * u.powi(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 6] = [
        Ease::Linear,
        Ease::Power1Out,
        Ease::Power2Out,
        Ease::Power4Out,
        Ease::ExpoOut,
        Ease::BackOut(BACK_OVERSHOOT),
    ];

    #[test]
    fn test_endpoints() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-3, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Ease::Power2Out.apply(-1.0), 0.0);
        assert_eq!(Ease::Power2Out.apply(3.0), 1.0);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Ease::BackOut(1.7).apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_out_curves_lead_linear() {
        for ease in [Ease::Power1Out, Ease::Power2Out, Ease::Power4Out, Ease::ExpoOut] {
            assert!(ease.apply(0.5) > 0.5, "{ease:?}");
        }
        assert!(Ease::Power4Out.apply(0.3) > Ease::Power1Out.apply(0.3));
    }
}
