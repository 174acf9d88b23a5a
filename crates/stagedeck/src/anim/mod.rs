//! Tween scheduling for slide transitions and decorative effects.
//!
//! The [`Timeline`] owns every animated value in the app, keyed by
//! [`Target`] and [`Prop`]. Rendering reads poses back out of it each frame.
//! Completion is reported as [`Signal`] messages returned from
//! [`Timeline::tick`] instead of callbacks.

pub mod ease;
pub mod sequence;
pub mod timeline;

pub use ease::Ease;
pub use sequence::Sequence;
pub use timeline::{Timeline, TweenSpec};

/// Something on screen that can be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Slide(usize),
    Element { slide: usize, index: usize },
    TopNav,
    ProgressFill,
    Orb(u8),
    Grid,
    ThemeButton,
    CopyButton(usize),
    Splash(SplashPart),
}

/// Decorative parts of the opening splash that are not slide elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplashPart {
    Logo,
    LogoIcon,
    LoadingLine,
}

/// An animatable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Opacity,
    X,
    Y,
    RotateX,
    RotateY,
    Scale,
    /// Fractional fill, 0..=1 (progress bar, loading line).
    Width,
    /// Extra letter spacing in points.
    Spacing,
}

impl Prop {
    /// Value a property has before anything animates it.
    pub fn rest(self) -> f32 {
        match self {
            Prop::Opacity | Prop::Scale | Prop::Width => 1.0,
            _ => 0.0,
        }
    }
}

/// Completion messages emitted by the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The outbound animation of a slide finished.
    SlideHidden(usize),
    /// The inbound animation of a slide finished.
    SlideEntered(usize),
    /// The copy confirmation on a code block should be reverted.
    CopyReverted(usize),
    SplashFinished,
}

/// Snapshot of every property of one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale: f32,
    pub width: f32,
    pub spacing: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            opacity: Prop::Opacity.rest(),
            x: Prop::X.rest(),
            y: Prop::Y.rest(),
            rotate_x: Prop::RotateX.rest(),
            rotate_y: Prop::RotateY.rest(),
            scale: Prop::Scale.rest(),
            width: Prop::Width.rest(),
            spacing: Prop::Spacing.rest(),
        }
    }
}

impl Pose {
    /// Combine with a parent pose: opacities and scales multiply, offsets add.
    pub fn within(self, parent: Pose) -> Pose {
        Pose {
            opacity: self.opacity * parent.opacity,
            x: self.x + parent.x,
            y: self.y + parent.y,
            rotate_x: self.rotate_x + parent.rotate_x,
            rotate_y: self.rotate_y + parent.rotate_y,
            scale: self.scale * parent.scale,
            width: self.width,
            spacing: self.spacing,
        }
    }
}
