use super::{Prop, Signal, Target, Timeline, TweenSpec};

/// Places `from` tweens back to back on a timeline.
///
/// Each step starts where the sequence currently ends, shifted by `offset`
/// seconds (negative values overlap the previous steps). Steps never start
/// before the sequence itself.
pub struct Sequence<'a> {
    timeline: &'a mut Timeline,
    end: f32,
}

impl<'a> Sequence<'a> {
    pub fn new(timeline: &'a mut Timeline) -> Self {
        Self { timeline, end: 0.0 }
    }

    pub fn from(
        mut self,
        target: Target,
        pose: &[(Prop, f32)],
        spec: TweenSpec,
        offset: f32,
    ) -> Self {
        let start = (self.end + offset).max(0.0);
        self.end = self.end.max(start + spec.delay + spec.duration);
        self.timeline
            .from(target, pose, spec.delay(start + spec.delay));
        self
    }

    /// Total length so far in seconds.
    #[cfg(test)]
    pub fn duration(&self) -> f32 {
        self.end
    }

    /// Emit `signal` when the last step ends and return the total length.
    pub fn finish(self, signal: Signal) -> f32 {
        self.timeline.delayed_call(self.end, signal);
        self.end
    }
}
