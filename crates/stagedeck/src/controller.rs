//! Slide navigation and the transition between slides.
//!
//! The controller owns which slide is current and a lock that is held from
//! the moment a transition starts until the incoming slide's animation
//! reports completion. Requests made while the lock is held are dropped.

use thiserror::Error;
use tracing::{debug, info};

use crate::anim::{Ease, Prop, Signal, Target, Timeline, TweenSpec};
use crate::config::AnimationConfig;
use crate::deck::{Deck, ElementKind};
use crate::icons::IconRenderer;

const CHROME_DURATION: f32 = 0.5;
const CHROME_HIDDEN_Y: f32 = -20.0;
const SLIDE_OFFSET_X: f32 = 100.0;
const SLIDE_ROTATE_Y: f32 = 20.0;
const ELEMENT_DURATION: f32 = 0.8;
const ELEMENT_DELAY: f32 = 0.2;
const ELEMENT_RISE: f32 = 50.0;
const ELEMENT_SCALE: f32 = 0.9;
const PROGRESS_DURATION: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("slide {index} is out of range (deck has {total} slides)")]
    OutOfRange { index: usize, total: usize },
    #[error("deck has no slides")]
    NoSlides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A transition is still running.
    Busy,
    /// Already at the first or last slide.
    AtBoundary,
    /// The requested slide is the one already shown.
    AlreadyShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Started {
        from: Option<usize>,
        to: usize,
        direction: Direction,
    },
    Ignored(IgnoreReason),
}

impl NavOutcome {
    pub fn started(self) -> bool {
        matches!(self, NavOutcome::Started { .. })
    }
}

/// One slide, resolved once from the deck.
#[derive(Debug, Clone)]
pub struct SlideHandle {
    pub index: usize,
    pub active: bool,
    pub visible: bool,
    pub elements: Vec<ElementKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub current: usize,
    pub animating: bool,
}

pub struct PresentationController {
    slides: Vec<SlideHandle>,
    state: NavigationState,
    transition: f32,
    stagger: f32,
    index_label: String,
    chrome_interactive: bool,
}

impl PresentationController {
    /// Show `start` (clamped to the deck) without animating.
    pub fn new(
        deck: &Deck,
        anim: &AnimationConfig,
        start: usize,
        timeline: &mut Timeline,
    ) -> Result<Self, NavError> {
        let elements: Vec<Vec<ElementKind>> = deck.slides.iter().map(|s| s.elements()).collect();
        Self::from_elements(elements, anim, start, timeline)
    }

    pub fn from_elements(
        elements: Vec<Vec<ElementKind>>,
        anim: &AnimationConfig,
        start: usize,
        timeline: &mut Timeline,
    ) -> Result<Self, NavError> {
        if elements.is_empty() {
            return Err(NavError::NoSlides);
        }
        let total = elements.len();
        let start = start.min(total - 1);

        let slides: Vec<SlideHandle> = elements
            .into_iter()
            .enumerate()
            .map(|(index, elements)| SlideHandle {
                index,
                active: index == start,
                visible: index == start,
                elements,
            })
            .collect();

        for slide in &slides {
            let opacity = if slide.visible { 1.0 } else { 0.0 };
            timeline.set(Target::Slide(slide.index), &[(Prop::Opacity, opacity)]);
        }
        let (chrome_opacity, chrome_y) = chrome_pose(start);
        timeline.set(
            Target::TopNav,
            &[(Prop::Opacity, chrome_opacity), (Prop::Y, chrome_y)],
        );
        timeline.set(
            Target::ProgressFill,
            &[(Prop::Width, (start + 1) as f32 / total as f32)],
        );

        Ok(Self {
            slides,
            state: NavigationState {
                current: start,
                animating: false,
            },
            transition: anim.transition,
            stagger: anim.stagger,
            index_label: format_index(start),
            chrome_interactive: start != 0,
        })
    }

    pub fn current(&self) -> usize {
        self.state.current
    }

    pub fn total(&self) -> usize {
        self.slides.len()
    }

    #[cfg(test)]
    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state.animating
    }

    pub fn slides(&self) -> &[SlideHandle] {
        &self.slides
    }

    /// The slide flagged active, if any. None only mid-transition.
    pub fn active_slide(&self) -> Option<usize> {
        self.slides.iter().position(|s| s.active)
    }

    /// Fraction of the deck reached, `(current + 1) / total`.
    pub fn progress(&self) -> f32 {
        (self.state.current + 1) as f32 / self.total() as f32
    }

    /// 1-based current index, zero-padded to two digits.
    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    /// Whether the top navigation accepts clicks (hidden on the first slide).
    pub fn chrome_interactive(&self) -> bool {
        self.chrome_interactive
    }

    pub fn advance(&mut self, timeline: &mut Timeline, icons: &mut IconRenderer) -> NavOutcome {
        if self.state.animating {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        }
        if self.state.current + 1 >= self.total() {
            return NavOutcome::Ignored(IgnoreReason::AtBoundary);
        }
        self.state.current += 1;
        self.run_transition(Direction::Forward, timeline, icons)
    }

    pub fn retreat(&mut self, timeline: &mut Timeline, icons: &mut IconRenderer) -> NavOutcome {
        if self.state.animating {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        }
        if self.state.current == 0 {
            return NavOutcome::Ignored(IgnoreReason::AtBoundary);
        }
        self.state.current -= 1;
        self.run_transition(Direction::Backward, timeline, icons)
    }

    pub fn jump_to(
        &mut self,
        index: usize,
        timeline: &mut Timeline,
        icons: &mut IconRenderer,
    ) -> Result<NavOutcome, NavError> {
        if index >= self.total() {
            return Err(NavError::OutOfRange {
                index,
                total: self.total(),
            });
        }
        if self.state.animating {
            return Ok(NavOutcome::Ignored(IgnoreReason::Busy));
        }
        let direction = if index > self.state.current {
            Direction::Forward
        } else {
            Direction::Backward
        };
        self.state.current = index;
        Ok(self.run_transition(direction, timeline, icons))
    }

    /// Animate from the active slide to the current one.
    pub fn run_transition(
        &mut self,
        direction: Direction,
        timeline: &mut Timeline,
        icons: &mut IconRenderer,
    ) -> NavOutcome {
        if self.state.animating {
            return NavOutcome::Ignored(IgnoreReason::Busy);
        }
        let previous = self.active_slide();
        let next = self.state.current;
        if previous == Some(next) {
            return NavOutcome::Ignored(IgnoreReason::AlreadyShown);
        }

        self.state.animating = true;
        let dir = direction.sign();
        debug!(?previous, next, ?direction, "transition started");

        let (chrome_opacity, chrome_y) = chrome_pose(next);
        timeline.to(
            Target::TopNav,
            &[(Prop::Opacity, chrome_opacity), (Prop::Y, chrome_y)],
            TweenSpec::new(CHROME_DURATION),
        );
        self.chrome_interactive = next != 0;

        let slide_spec = TweenSpec::new(self.transition).ease(Ease::ExpoOut);
        if let Some(prev) = previous {
            self.slides[prev].active = false;
            timeline.to(
                Target::Slide(prev),
                &[
                    (Prop::Opacity, 0.0),
                    (Prop::X, -SLIDE_OFFSET_X * dir),
                    (Prop::RotateY, -SLIDE_ROTATE_Y * dir),
                ],
                slide_spec.on_complete(Signal::SlideHidden(prev)),
            );
        }

        self.slides[next].visible = true;
        timeline.set(
            Target::Slide(next),
            &[
                (Prop::Opacity, 0.0),
                (Prop::X, SLIDE_OFFSET_X * dir),
                (Prop::RotateY, SLIDE_ROTATE_Y * dir),
            ],
        );
        timeline.to(
            Target::Slide(next),
            &[(Prop::Opacity, 1.0), (Prop::X, 0.0), (Prop::RotateY, 0.0)],
            slide_spec.on_complete(Signal::SlideEntered(next)),
        );

        let targets: Vec<Target> = (0..self.slides[next].elements.len())
            .map(|index| Target::Element { slide: next, index })
            .collect();
        timeline.stagger_from_to(
            &targets,
            &[
                (Prop::Y, ELEMENT_RISE),
                (Prop::Opacity, 0.0),
                (Prop::Scale, ELEMENT_SCALE),
            ],
            &[(Prop::Y, 0.0), (Prop::Opacity, 1.0), (Prop::Scale, 1.0)],
            TweenSpec::new(ELEMENT_DURATION)
                .ease(Ease::BackOut(1.7))
                .delay(ELEMENT_DELAY),
            self.stagger,
        );

        timeline.to(
            Target::ProgressFill,
            &[(Prop::Width, self.progress())],
            TweenSpec::new(PROGRESS_DURATION).ease(Ease::ExpoOut),
        );
        self.index_label = format_index(next);
        icons.refresh();

        NavOutcome::Started {
            from: previous,
            to: next,
            direction,
        }
    }

    /// Apply a completion signal. Returns false for signals meant elsewhere.
    pub fn handle(&mut self, signal: Signal) -> bool {
        match signal {
            Signal::SlideHidden(index) => {
                if let Some(slide) = self.slides.get_mut(index) {
                    if !slide.active && index != self.state.current {
                        slide.visible = false;
                    }
                }
                true
            }
            Signal::SlideEntered(index) => {
                if let Some(slide) = self.slides.get_mut(index) {
                    slide.active = true;
                }
                self.state.animating = false;
                info!(slide = index + 1, total = self.total(), "slide shown");
                true
            }
            _ => false,
        }
    }
}

fn chrome_pose(index: usize) -> (f32, f32) {
    if index == 0 {
        (0.0, CHROME_HIDDEN_Y)
    } else {
        (1.0, 0.0)
    }
}

fn format_index(index: usize) -> String {
    format!("{:02}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: f64 = 10.0;

    struct Rig {
        ctl: PresentationController,
        tl: Timeline,
        icons: IconRenderer,
        clock: f64,
    }

    impl Rig {
        fn new(total: usize) -> Self {
            let mut tl = Timeline::new();
            let elements = (0..total)
                .map(|_| vec![ElementKind::Title, ElementKind::Card(0)])
                .collect();
            let ctl =
                PresentationController::from_elements(elements, &AnimationConfig::default(), 0, &mut tl)
                    .unwrap();
            Self {
                ctl,
                tl,
                icons: IconRenderer::new(),
                clock: 0.0,
            }
        }

        fn advance(&mut self) -> NavOutcome {
            self.ctl.advance(&mut self.tl, &mut self.icons)
        }

        fn retreat(&mut self) -> NavOutcome {
            self.ctl.retreat(&mut self.tl, &mut self.icons)
        }

        fn jump(&mut self, index: usize) -> Result<NavOutcome, NavError> {
            self.ctl.jump_to(index, &mut self.tl, &mut self.icons)
        }

        /// Advance the clock by `dt` and deliver signals.
        fn step(&mut self, dt: f64) -> Vec<Signal> {
            self.clock += dt;
            let signals = self.tl.tick(self.clock);
            for &s in &signals {
                self.ctl.handle(s);
            }
            signals
        }

        fn settle(&mut self) {
            self.step(SETTLE);
            assert!(!self.ctl.is_animating());
        }

        fn active_count(&self) -> usize {
            self.ctl.slides().iter().filter(|s| s.active).count()
        }
    }

    #[test]
    fn test_initial_state() {
        let rig = Rig::new(5);
        assert_eq!(rig.ctl.current(), 0);
        assert_eq!(rig.ctl.active_slide(), Some(0));
        assert_eq!(rig.ctl.index_label(), "01");
        assert!(!rig.ctl.chrome_interactive());
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Opacity), 0.0);
        assert_eq!(rig.tl.value(Target::Slide(1), Prop::Opacity), 0.0);
    }

    #[test]
    fn test_start_is_clamped() {
        let mut tl = Timeline::new();
        let ctl = PresentationController::from_elements(
            vec![vec![], vec![]],
            &AnimationConfig::default(),
            9,
            &mut tl,
        )
        .unwrap();
        assert_eq!(ctl.current(), 1);
        assert!(ctl.chrome_interactive());
    }

    #[test]
    fn test_empty_deck_rejected() {
        let mut tl = Timeline::new();
        let result =
            PresentationController::from_elements(vec![], &AnimationConfig::default(), 0, &mut tl);
        assert_eq!(result.err(), Some(NavError::NoSlides));
    }

    #[test]
    fn test_advance_settles_on_next_slide() {
        let mut rig = Rig::new(5);
        let outcome = rig.advance();
        assert_eq!(
            outcome,
            NavOutcome::Started {
                from: Some(0),
                to: 1,
                direction: Direction::Forward
            }
        );
        assert!(rig.ctl.is_animating());
        rig.settle();
        assert_eq!(rig.ctl.current(), 1);
        assert_eq!(rig.ctl.active_slide(), Some(1));
        assert!(!rig.ctl.slides()[0].visible);
        assert!(rig.ctl.slides()[1].visible);
    }

    #[test]
    fn test_example_walkthrough() {
        let mut rig = Rig::new(5);
        rig.advance();
        rig.settle();
        rig.advance();
        // Third request lands mid-transition and is dropped.
        assert_eq!(rig.advance(), NavOutcome::Ignored(IgnoreReason::Busy));
        rig.settle();

        assert_eq!(rig.ctl.current(), 2);
        assert_eq!(rig.ctl.index_label(), "03");
        assert!((rig.ctl.progress() - 0.6).abs() < 1e-6);
        assert!((rig.tl.value(Target::ProgressFill, Prop::Width) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut rig = Rig::new(2);
        assert_eq!(rig.retreat(), NavOutcome::Ignored(IgnoreReason::AtBoundary));
        assert_eq!(rig.ctl.current(), 0);

        rig.advance();
        rig.settle();
        assert_eq!(rig.advance(), NavOutcome::Ignored(IgnoreReason::AtBoundary));
        assert_eq!(rig.ctl.current(), 1);
        assert!(!rig.ctl.is_animating());
    }

    #[test]
    fn test_navigation_while_animating_changes_nothing() {
        let mut rig = Rig::new(5);
        rig.advance();
        let before = rig.ctl.state();
        let active_before: Vec<bool> = rig.ctl.slides().iter().map(|s| s.active).collect();

        assert_eq!(rig.advance(), NavOutcome::Ignored(IgnoreReason::Busy));
        assert_eq!(rig.retreat(), NavOutcome::Ignored(IgnoreReason::Busy));
        assert_eq!(rig.jump(4), Ok(NavOutcome::Ignored(IgnoreReason::Busy)));

        assert_eq!(rig.ctl.state(), before);
        let active_after: Vec<bool> = rig.ctl.slides().iter().map(|s| s.active).collect();
        assert_eq!(active_before, active_after);
    }

    #[test]
    fn test_lock_released_by_inbound_completion() {
        let mut rig = Rig::new(3);
        rig.advance();
        // Just short of the 1.2s slide duration.
        assert!(rig.step(1.19).iter().all(|s| *s != Signal::SlideEntered(1)));
        assert!(rig.ctl.is_animating());
        assert_eq!(rig.ctl.active_slide(), None);

        let signals = rig.step(0.01);
        assert!(signals.contains(&Signal::SlideEntered(1)));
        assert!(!rig.ctl.is_animating());
        assert_eq!(rig.ctl.active_slide(), Some(1));
    }

    #[test]
    fn test_inbound_pose_set_synchronously() {
        let mut rig = Rig::new(3);
        rig.advance();
        assert_eq!(rig.tl.value(Target::Slide(1), Prop::Opacity), 0.0);
        assert_eq!(rig.tl.value(Target::Slide(1), Prop::X), 100.0);
        assert_eq!(rig.tl.value(Target::Slide(1), Prop::RotateY), 20.0);
        assert!(rig.tl.is_animating(Target::Slide(0), Prop::Opacity));
    }

    #[test]
    fn test_retreat_mirrors_direction() {
        let mut rig = Rig::new(3);
        rig.advance();
        rig.settle();
        rig.retreat();
        assert_eq!(rig.tl.value(Target::Slide(0), Prop::X), -100.0);
        assert_eq!(rig.tl.value(Target::Slide(0), Prop::RotateY), -20.0);
        rig.settle();
        assert_eq!(rig.tl.value(Target::Slide(1), Prop::X), 100.0);
        assert_eq!(rig.ctl.index_label(), "01");
    }

    #[test]
    fn test_jump_to_current_is_noop() {
        let mut rig = Rig::new(4);
        let chrome_before = rig.tl.value(Target::TopNav, Prop::Opacity);
        assert_eq!(rig.jump(0), Ok(NavOutcome::Ignored(IgnoreReason::AlreadyShown)));
        assert!(!rig.ctl.is_animating());
        assert!(!rig.tl.is_animating(Target::TopNav, Prop::Opacity));
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Opacity), chrome_before);
    }

    #[test]
    fn test_jump_out_of_range() {
        let mut rig = Rig::new(4);
        assert_eq!(rig.jump(4), Err(NavError::OutOfRange { index: 4, total: 4 }));
        assert_eq!(rig.ctl.current(), 0);
        assert!(!rig.ctl.is_animating());
    }

    #[test]
    fn test_jump_direction() {
        let mut rig = Rig::new(6);
        let outcome = rig.jump(4).unwrap();
        assert_eq!(
            outcome,
            NavOutcome::Started {
                from: Some(0),
                to: 4,
                direction: Direction::Forward
            }
        );
        rig.settle();
        let outcome = rig.jump(2).unwrap();
        assert!(matches!(
            outcome,
            NavOutcome::Started {
                direction: Direction::Backward,
                ..
            }
        ));
        rig.settle();
        assert_eq!(rig.ctl.index_label(), "03");
    }

    #[test]
    fn test_chrome_hidden_on_first_slide() {
        let mut rig = Rig::new(3);
        rig.advance();
        assert!(rig.ctl.chrome_interactive());
        rig.settle();
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Opacity), 1.0);
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Y), 0.0);

        rig.retreat();
        assert!(!rig.ctl.chrome_interactive());
        rig.settle();
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Opacity), 0.0);
        assert_eq!(rig.tl.value(Target::TopNav, Prop::Y), -20.0);
    }

    #[test]
    fn test_elements_stagger_in() {
        let mut rig = Rig::new(2);
        rig.advance();
        let first = Target::Element { slide: 1, index: 0 };
        let second = Target::Element { slide: 1, index: 1 };
        assert_eq!(rig.tl.value(first, Prop::Opacity), 0.0);
        assert_eq!(rig.tl.value(second, Prop::Y), 50.0);

        // First element starts at 0.2s, second at 0.3s.
        rig.step(0.25);
        assert!(rig.tl.value(first, Prop::Opacity) > 0.0);
        assert_eq!(rig.tl.value(second, Prop::Opacity), 0.0);

        rig.settle();
        assert_eq!(rig.tl.value(second, Prop::Opacity), 1.0);
        assert_eq!(rig.tl.value(second, Prop::Scale), 1.0);
    }

    #[test]
    fn test_icons_refreshed_per_transition() {
        let mut rig = Rig::new(3);
        rig.advance();
        rig.settle();
        rig.advance();
        assert_eq!(rig.icons.generation(), 2);
    }

    #[test]
    fn test_random_walk_keeps_invariants() {
        let mut rig = Rig::new(4);
        // Deterministic mix of moves, some settled and some interrupted.
        let moves = [0u8, 0, 1, 2, 0, 0, 0, 1, 1, 1, 1, 2, 0, 3, 0, 1];
        for (i, m) in moves.iter().enumerate() {
            match m {
                0 => {
                    rig.advance();
                }
                1 => {
                    rig.retreat();
                }
                2 => {
                    let _ = rig.jump(i % 4);
                }
                _ => {
                    assert!(rig.jump(99).is_err());
                }
            }
            assert!(rig.ctl.current() < rig.ctl.total());
            if i % 3 == 0 {
                rig.step(0.4);
            } else {
                rig.settle();
                assert_eq!(rig.active_count(), 1);
                assert_eq!(rig.ctl.active_slide(), Some(rig.ctl.current()));
            }
        }
    }

    #[test]
    fn test_progress_projection() {
        let mut rig = Rig::new(4);
        for i in 0..3 {
            rig.advance();
            rig.settle();
            let expected = (i + 2) as f32 / 4.0;
            assert!((rig.ctl.progress() - expected).abs() < 1e-6);
        }
    }
}
