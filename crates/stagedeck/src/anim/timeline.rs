use std::collections::HashMap;

use super::{Ease, Pose, Prop, Signal, Target};

/// Duration, easing, delay and completion signal of a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub duration: f32,
    pub ease: Ease,
    pub delay: f32,
    pub signal: Option<Signal>,
}

impl TweenSpec {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ease: Ease::default(),
            delay: 0.0,
            signal: None,
        }
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn on_complete(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// Progress close enough to the end to count as finished, absorbing float
/// drift between the caller's clock and tween start times.
const SNAP: f32 = 1e-4;

type Key = (Target, Prop);

struct Tween {
    key: Key,
    group: u64,
    start_at: f64,
    duration: f32,
    ease: Ease,
    /// Captured when the delay elapses unless given up front.
    from: Option<f32>,
    to: f32,
}

struct Group {
    remaining: usize,
    completed_any: bool,
    signal: Option<Signal>,
}

struct DelayedCall {
    fire_at: f64,
    signal: Signal,
}

/// Owns all animated values and the tweens driving them.
///
/// Time is explicit: the caller advances it with [`Timeline::tick`], and every
/// tween added afterwards starts at that instant. Starting a tween on a
/// target/property that is already animating replaces the running tween, so
/// repeated requests retarget instead of queueing.
pub struct Timeline {
    now: f64,
    values: HashMap<Key, f32>,
    tweens: Vec<Tween>,
    groups: HashMap<u64, Group>,
    calls: Vec<DelayedCall>,
    pending: Vec<Signal>,
    next_group: u64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            values: HashMap::new(),
            tweens: Vec::new(),
            groups: HashMap::new(),
            calls: Vec::new(),
            pending: Vec::new(),
            next_group: 0,
        }
    }

    #[cfg(test)]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Current value of a property, or its rest value if never touched.
    pub fn value(&self, target: Target, prop: Prop) -> f32 {
        self.values
            .get(&(target, prop))
            .copied()
            .unwrap_or_else(|| prop.rest())
    }

    pub fn pose(&self, target: Target) -> Pose {
        Pose {
            opacity: self.value(target, Prop::Opacity),
            x: self.value(target, Prop::X),
            y: self.value(target, Prop::Y),
            rotate_x: self.value(target, Prop::RotateX),
            rotate_y: self.value(target, Prop::RotateY),
            scale: self.value(target, Prop::Scale),
            width: self.value(target, Prop::Width),
            spacing: self.value(target, Prop::Spacing),
        }
    }

    /// True when nothing is animating or scheduled.
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty() && self.calls.is_empty() && self.pending.is_empty()
    }

    /// True when the property has a tween running or waiting on its delay.
    pub fn is_animating(&self, target: Target, prop: Prop) -> bool {
        self.tweens.iter().any(|t| t.key == (target, prop))
    }

    #[cfg(test)]
    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    /// Apply values immediately, killing any tween on the same properties.
    pub fn set(&mut self, target: Target, pose: &[(Prop, f32)]) {
        for &(prop, value) in pose {
            self.kill((target, prop));
            self.values.insert((target, prop), value);
        }
    }

    /// Animate from the current values to `pose`.
    pub fn to(&mut self, target: Target, pose: &[(Prop, f32)], spec: TweenSpec) {
        let group = self.open_group(spec.signal);
        for &(prop, to) in pose {
            self.push(target, prop, None, to, spec, group);
        }
        self.seal_group(group);
    }

    /// Jump to `pose` now and animate back to the current values.
    pub fn from(&mut self, target: Target, pose: &[(Prop, f32)], spec: TweenSpec) {
        let group = self.open_group(spec.signal);
        for &(prop, from) in pose {
            let to = self.value(target, prop);
            self.push(target, prop, Some(from), to, spec, group);
        }
        self.seal_group(group);
    }

    /// Jump to `from` now and animate to `to`, whatever value is current.
    pub fn from_to(
        &mut self,
        target: Target,
        from: &[(Prop, f32)],
        to: &[(Prop, f32)],
        spec: TweenSpec,
    ) {
        self.stagger_from_to(&[target], from, to, spec, 0.0);
    }

    /// Jump every target to `from` and animate to `to`, each delayed `each`
    /// seconds more than the previous. Properties missing from `to` animate
    /// back to their rest value. The signal fires once the last target settles.
    pub fn stagger_from_to(
        &mut self,
        targets: &[Target],
        from: &[(Prop, f32)],
        to: &[(Prop, f32)],
        spec: TweenSpec,
        each: f32,
    ) {
        let group = self.open_group(spec.signal);
        for (i, &target) in targets.iter().enumerate() {
            let spec = spec.delay(spec.delay + each * i as f32);
            for &(prop, start) in from {
                let end = to
                    .iter()
                    .find(|(p, _)| *p == prop)
                    .map(|&(_, v)| v)
                    .unwrap_or_else(|| prop.rest());
                self.push(target, prop, Some(start), end, spec, group);
            }
        }
        self.seal_group(group);
    }

    /// Emit `signal` once `delay` seconds have passed.
    pub fn delayed_call(&mut self, delay: f32, signal: Signal) {
        self.calls.push(DelayedCall {
            fire_at: self.now + f64::from(delay),
            signal,
        });
    }

    /// Advance the clock to `now` (seconds) and return the signals of
    /// everything that finished, in scheduling order.
    pub fn tick(&mut self, now: f64) -> Vec<Signal> {
        self.now = now.max(self.now);
        let mut signals = std::mem::take(&mut self.pending);
        let mut finished: Vec<u64> = Vec::new();

        let clock = self.now;
        let values = &mut self.values;
        self.tweens.retain_mut(|tween| {
            if clock < tween.start_at {
                return true;
            }
            let from = *tween.from.get_or_insert_with(|| {
                values
                    .get(&tween.key)
                    .copied()
                    .unwrap_or_else(|| tween.key.1.rest())
            });
            let t = if tween.duration <= 0.0 {
                1.0
            } else {
                (clock - tween.start_at) as f32 / tween.duration
            };
            if t >= 1.0 - SNAP {
                values.insert(tween.key, tween.to);
                finished.push(tween.group);
                false
            } else {
                let eased = tween.ease.apply(t);
                values.insert(tween.key, from + (tween.to - from) * eased);
                true
            }
        });

        for group in finished {
            if let Some(state) = self.groups.get_mut(&group) {
                state.remaining -= 1;
                state.completed_any = true;
                if state.remaining == 0 {
                    if let Some(signal) = self.groups.remove(&group).and_then(|g| g.signal) {
                        signals.push(signal);
                    }
                }
            }
        }

        self.calls.retain(|call| {
            if call.fire_at <= clock {
                signals.push(call.signal);
                false
            } else {
                true
            }
        });

        signals
    }

    fn open_group(&mut self, signal: Option<Signal>) -> u64 {
        let id = self.next_group;
        self.next_group += 1;
        self.groups.insert(
            id,
            Group {
                remaining: 0,
                completed_any: false,
                signal,
            },
        );
        id
    }

    /// Groups with no tweens at all complete on the next tick.
    fn seal_group(&mut self, group: u64) {
        if self.groups.get(&group).is_some_and(|g| g.remaining == 0) {
            if let Some(signal) = self.groups.remove(&group).and_then(|g| g.signal) {
                self.pending.push(signal);
            }
        }
    }

    fn push(
        &mut self,
        target: Target,
        prop: Prop,
        from: Option<f32>,
        to: f32,
        spec: TweenSpec,
        group: u64,
    ) {
        let key = (target, prop);
        self.kill(key);
        if let Some(start) = from {
            self.values.insert(key, start);
        }
        self.tweens.push(Tween {
            key,
            group,
            start_at: self.now + f64::from(spec.delay.max(0.0)),
            duration: spec.duration,
            ease: spec.ease,
            from,
            to,
        });
        if let Some(state) = self.groups.get_mut(&group) {
            state.remaining += 1;
        }
    }

    /// Drop tweens on `key`. A group left with nothing to wait for signals
    /// only if some of its tweens actually finished.
    fn kill(&mut self, key: Key) {
        let mut killed: Vec<u64> = Vec::new();
        self.tweens.retain(|t| {
            if t.key == key {
                killed.push(t.group);
                false
            } else {
                true
            }
        });
        for group in killed {
            let Some(state) = self.groups.get_mut(&group) else {
                continue;
            };
            state.remaining -= 1;
            if state.remaining == 0 {
                let state = self.groups.remove(&group);
                if let Some(Group {
                    completed_any: true,
                    signal: Some(signal),
                    ..
                }) = state
                {
                    self.pending.push(signal);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_untouched_values_rest() {
        let tl = Timeline::new();
        assert_eq!(tl.value(Target::TopNav, Prop::Opacity), 1.0);
        assert_eq!(tl.value(Target::TopNav, Prop::Y), 0.0);
        assert!(tl.is_idle());
    }

    #[test]
    fn test_set_is_immediate() {
        let mut tl = Timeline::new();
        tl.set(Target::Slide(1), &[(Prop::Opacity, 0.0), (Prop::X, 100.0)]);
        assert_eq!(tl.value(Target::Slide(1), Prop::Opacity), 0.0);
        assert_eq!(tl.value(Target::Slide(1), Prop::X), 100.0);
        assert!(tl.is_idle());
    }

    #[test]
    fn test_to_interpolates_and_signals() {
        let mut tl = Timeline::new();
        tl.to(
            Target::Slide(0),
            &[(Prop::X, 100.0)],
            TweenSpec::new(1.0)
                .ease(Ease::Linear)
                .on_complete(Signal::SlideEntered(0)),
        );
        assert!(tl.tick(0.5).is_empty());
        assert!(approx(tl.value(Target::Slide(0), Prop::X), 50.0));
        assert_eq!(tl.tick(1.0), vec![Signal::SlideEntered(0)]);
        assert_eq!(tl.value(Target::Slide(0), Prop::X), 100.0);
        assert!(tl.is_idle());
    }

    #[test]
    fn test_delay_holds_value() {
        let mut tl = Timeline::new();
        tl.to(
            Target::Grid,
            &[(Prop::X, 10.0)],
            TweenSpec::new(1.0).ease(Ease::Linear).delay(1.0),
        );
        tl.tick(0.5);
        assert_eq!(tl.value(Target::Grid, Prop::X), 0.0);
        tl.tick(1.5);
        assert!(approx(tl.value(Target::Grid, Prop::X), 5.0));
    }

    #[test]
    fn test_from_returns_to_current() {
        let mut tl = Timeline::new();
        tl.from(
            Target::ThemeButton,
            &[(Prop::Scale, 0.8)],
            TweenSpec::new(0.3),
        );
        assert_eq!(tl.value(Target::ThemeButton, Prop::Scale), 0.8);
        tl.tick(0.3);
        assert_eq!(tl.value(Target::ThemeButton, Prop::Scale), 1.0);
    }

    #[test]
    fn test_new_tween_retargets_running_one() {
        let mut tl = Timeline::new();
        tl.to(
            Target::Orb(1),
            &[(Prop::X, 100.0)],
            TweenSpec::new(2.0).ease(Ease::Linear),
        );
        tl.tick(1.0);
        tl.to(
            Target::Orb(1),
            &[(Prop::X, -100.0)],
            TweenSpec::new(2.0).ease(Ease::Linear),
        );
        assert_eq!(tl.active_tweens(), 1);
        tl.tick(2.0);
        // Started from 50 at t=1, halfway to -100.
        assert!(approx(tl.value(Target::Orb(1), Prop::X), -25.0));
    }

    #[test]
    fn test_fully_killed_group_never_signals() {
        let mut tl = Timeline::new();
        tl.to(
            Target::Slide(2),
            &[(Prop::Opacity, 0.0)],
            TweenSpec::new(1.0).on_complete(Signal::SlideHidden(2)),
        );
        tl.set(Target::Slide(2), &[(Prop::Opacity, 1.0)]);
        assert!(tl.tick(5.0).is_empty());
    }

    #[test]
    fn test_stagger_offsets_each_target() {
        let mut tl = Timeline::new();
        let targets = [
            Target::Element { slide: 0, index: 0 },
            Target::Element { slide: 0, index: 1 },
        ];
        tl.stagger_from_to(
            &targets,
            &[(Prop::Opacity, 0.0)],
            &[(Prop::Opacity, 1.0)],
            TweenSpec::new(1.0)
                .ease(Ease::Linear)
                .on_complete(Signal::SplashFinished),
            0.5,
        );
        assert_eq!(tl.value(targets[1], Prop::Opacity), 0.0);
        tl.tick(0.5);
        assert!(approx(tl.value(targets[0], Prop::Opacity), 0.5));
        assert!(approx(tl.value(targets[1], Prop::Opacity), 0.0));
        assert!(tl.tick(1.0).is_empty());
        assert_eq!(tl.tick(1.5), vec![Signal::SplashFinished]);
    }

    #[test]
    fn test_from_to_missing_props_rest() {
        let mut tl = Timeline::new();
        tl.from_to(
            Target::TopNav,
            &[(Prop::Y, 50.0), (Prop::Scale, 0.9)],
            &[],
            TweenSpec::new(0.2),
        );
        tl.tick(0.2);
        assert_eq!(tl.value(Target::TopNav, Prop::Y), 0.0);
        assert_eq!(tl.value(Target::TopNav, Prop::Scale), 1.0);
    }

    #[test]
    fn test_delayed_call_fires_not_before() {
        let mut tl = Timeline::new();
        tl.tick(10.0);
        tl.delayed_call(3.0, Signal::CopyReverted(4));
        assert!(tl.tick(12.999).is_empty());
        assert_eq!(tl.tick(13.0), vec![Signal::CopyReverted(4)]);
    }

    #[test]
    fn test_empty_group_signals_next_tick() {
        let mut tl = Timeline::new();
        tl.stagger_from_to(
            &[],
            &[(Prop::Opacity, 0.0)],
            &[],
            TweenSpec::new(1.0).on_complete(Signal::SplashFinished),
            0.1,
        );
        assert_eq!(tl.tick(0.0), vec![Signal::SplashFinished]);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut tl = Timeline::new();
        tl.tick(5.0);
        tl.tick(1.0);
        assert_eq!(tl.now(), 5.0);
    }
}
