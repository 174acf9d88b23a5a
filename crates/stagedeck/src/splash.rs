use tracing::debug;

use crate::anim::{Ease, Prop, Sequence, Signal, SplashPart, Target, Timeline, TweenSpec};
use crate::deck::ElementKind;

/// Letter spacing the tagline collapses from, in points.
const TAGLINE_SPACING: f32 = 48.0;

/// Queue the opening sequence for a splash slide and return its length in
/// seconds. `SplashFinished` is signalled at the end.
pub fn play(slide: usize, elements: &[ElementKind], timeline: &mut Timeline) -> f32 {
    let element = |kind: ElementKind| {
        elements
            .iter()
            .position(|&k| k == kind)
            .map(|index| Target::Element { slide, index })
    };

    let mut seq = Sequence::new(timeline)
        .from(
            Target::Splash(SplashPart::Logo),
            &[(Prop::Scale, 0.0), (Prop::Opacity, 0.0)],
            TweenSpec::new(1.5).ease(Ease::BackOut(1.7)),
            0.0,
        )
        .from(
            Target::Splash(SplashPart::LogoIcon),
            &[(Prop::RotateY, 360.0)],
            TweenSpec::new(2.0).ease(Ease::Power2Out),
            -1.2,
        );

    if let Some(title) = element(ElementKind::Title) {
        seq = seq.from(
            title,
            &[(Prop::Y, 100.0), (Prop::Opacity, 0.0)],
            TweenSpec::new(1.5).ease(Ease::ExpoOut),
            -1.5,
        );
    }
    if let Some(subtitle) = element(ElementKind::Subtitle) {
        seq = seq.from(
            subtitle,
            &[(Prop::Y, 50.0), (Prop::Opacity, 0.0)],
            TweenSpec::new(1.5).ease(Ease::ExpoOut),
            -1.2,
        );
    }
    for (index, kind) in elements.iter().enumerate() {
        if matches!(kind, ElementKind::Badge(_)) {
            seq = seq.from(
                Target::Element { slide, index },
                &[(Prop::Spacing, TAGLINE_SPACING), (Prop::Opacity, 0.0)],
                TweenSpec::new(2.0).ease(Ease::Power4Out),
                -1.0,
            );
        }
    }
    seq = seq.from(
        Target::Splash(SplashPart::LoadingLine),
        &[(Prop::Width, 0.0), (Prop::Opacity, 0.0)],
        TweenSpec::new(1.0),
        -1.5,
    );
    if let Some(cta) = element(ElementKind::Cta) {
        seq = seq.from(
            cta,
            &[(Prop::Y, 20.0), (Prop::Opacity, 0.0)],
            TweenSpec::new(1.0).ease(Ease::back_out()),
            -0.5,
        );
    }

    let total = seq.finish(Signal::SplashFinished);
    debug!(slide, seconds = total, "splash queued");
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_splash_runs_to_completion() {
        let mut tl = Timeline::new();
        let elements = [
            ElementKind::Title,
            ElementKind::Subtitle,
            ElementKind::Badge(0),
            ElementKind::Cta,
        ];
        let total = play(0, &elements, &mut tl);
        assert!(total > 2.0);

        let title = Target::Element { slide: 0, index: 0 };
        assert_eq!(tl.value(title, Prop::Opacity), 0.0);
        assert_eq!(tl.value(Target::Splash(SplashPart::Logo), Prop::Scale), 0.0);

        let signals = tl.tick(f64::from(total));
        assert!(signals.contains(&Signal::SplashFinished));
        assert_eq!(tl.value(title, Prop::Opacity), 1.0);
        assert_eq!(tl.value(title, Prop::Y), 0.0);
        let badge = Target::Element { slide: 0, index: 2 };
        assert_eq!(tl.value(badge, Prop::Spacing), 0.0);
        assert_eq!(
            tl.value(Target::Splash(SplashPart::LoadingLine), Prop::Width),
            1.0
        );
        assert!(tl.is_idle());
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let mut tl = Timeline::new();
        let total = play(0, &[], &mut tl);
        // Logo 1.5s, icon spin to 2.3s, loading line overlapping it.
        assert!((total - 2.3).abs() < 1e-5);
    }
}
