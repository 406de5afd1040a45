//! Cross-fade between the previously displayed lyric line and the new one.
//!
//! The display has two slots: `current`, which fades in from below, and
//! `exiting`, which fades out while drifting upward. Both animations are
//! sampled by the renderer; they never delay the next text change. Whether
//! animations run at all is decided by the caller (`animations_supported`);
//! without them text is swapped instantly.

use crate::state::fallback_text;
use std::time::{Duration, Instant};

pub const TRANSITION_DURATION: Duration = Duration::from_millis(460);

/// Visual state of a slot at one point of an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Position within the animation, 0.0..=1.0.
    pub offset: f64,
    pub opacity: f64,
    /// Vertical offset in pixels; negative is up.
    pub translate_y: f64,
    pub scale: f64,
    /// Blur radius in pixels.
    pub blur: f64,
}

impl Keyframe {
    pub const REST: Keyframe = Keyframe {
        offset: 1.0,
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
        blur: 0.0,
    };

    fn lerp(&self, to: &Keyframe, t: f64) -> Keyframe {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Keyframe {
            offset: mix(self.offset, to.offset),
            opacity: mix(self.opacity, to.opacity),
            translate_y: mix(self.translate_y, to.translate_y),
            scale: mix(self.scale, to.scale),
            blur: mix(self.blur, to.blur),
        }
    }
}

const EXIT_KEYFRAMES: [Keyframe; 2] = [
    Keyframe { offset: 0.0, opacity: 1.0, translate_y: 0.0, scale: 1.0, blur: 0.0 },
    Keyframe { offset: 1.0, opacity: 0.0, translate_y: -12.0, scale: 0.992, blur: 2.0 },
];

const ENTER_KEYFRAMES: [Keyframe; 3] = [
    Keyframe { offset: 0.0, opacity: 0.0, translate_y: 12.0, scale: 0.992, blur: 2.0 },
    Keyframe { offset: 0.5, opacity: 0.92, translate_y: -1.0, scale: 1.001, blur: 0.35 },
    Keyframe { offset: 1.0, opacity: 1.0, translate_y: 0.0, scale: 1.0, blur: 0.0 },
];

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

pub const EXIT_EASING: CubicBezier = CubicBezier::new(0.22, 1.0, 0.36, 1.0);
pub const ENTER_EASING: CubicBezier = CubicBezier::new(0.64, 0.0, 0.78, 0.0);

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    // Polynomial form of one bezier coordinate with endpoints 0 and 1.
    fn curve(p1: f64, p2: f64, u: f64) -> f64 {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        ((a * u + b) * u + c) * u
    }

    fn curve_derivative(p1: f64, p2: f64, u: f64) -> f64 {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (3.0 * a * u + 2.0 * b) * u + c
    }

    // Find the curve parameter whose x equals `x`.
    fn solve_x(&self, x: f64) -> f64 {
        let mut u = x;
        for _ in 0..8 {
            let err = Self::curve(self.x1, self.x2, u) - x;
            if err.abs() < 1e-7 {
                return u;
            }
            let d = Self::curve_derivative(self.x1, self.x2, u);
            if d.abs() < 1e-6 {
                break;
            }
            u -= err / d;
        }
        // Newton did not converge; bisect.
        let (mut lo, mut hi) = (0.0, 1.0);
        u = x;
        while hi - lo > 1e-7 {
            let v = Self::curve(self.x1, self.x2, u);
            if (v - x).abs() < 1e-7 {
                break;
            }
            if v < x {
                lo = u;
            } else {
                hi = u;
            }
            u = (lo + hi) / 2.0;
        }
        u
    }

    /// Eased progress for linear progress `t` (clamped to 0..=1).
    pub fn ease(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        Self::curve(self.y1, self.y2, self.solve_x(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Enter,
    Exit,
}

/// One running slot animation. Sampling past the end holds the last
/// keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub started: Instant,
    pub duration: Duration,
}

impl Animation {
    pub fn new(kind: AnimationKind, started: Instant) -> Self {
        Self { kind, started, duration: TRANSITION_DURATION }
    }

    fn keyframes(&self) -> &'static [Keyframe] {
        match self.kind {
            AnimationKind::Enter => &ENTER_KEYFRAMES,
            AnimationKind::Exit => &EXIT_KEYFRAMES,
        }
    }

    fn easing(&self) -> CubicBezier {
        match self.kind {
            AnimationKind::Enter => ENTER_EASING,
            AnimationKind::Exit => EXIT_EASING,
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Instant) -> Keyframe {
        let p = self.easing().ease(self.progress(now));
        let frames = self.keyframes();
        if p >= 1.0 {
            return frames[frames.len() - 1];
        }
        for pair in frames.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if p <= to.offset {
                let span = to.offset - from.offset;
                let local = if span > 0.0 { (p - from.offset) / span } else { 1.0 };
                return from.lerp(to, local);
            }
        }
        frames[frames.len() - 1]
    }
}

/// Emitted whenever the displayed text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: Option<String>,
    pub to: String,
    pub animated: bool,
}

/// A slot's text and how to draw it right now.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFrame<'a> {
    pub text: &'a str,
    pub style: Keyframe,
}

#[derive(Debug, Default)]
pub struct LyricDisplay {
    current: Option<String>,
    exiting: Option<String>,
    enter: Option<Animation>,
    exit: Option<Animation>,
    animations_supported: bool,
}

impl LyricDisplay {
    pub fn new(animations_supported: bool) -> Self {
        Self { animations_supported, ..Default::default() }
    }

    #[cfg(test)]
    pub fn current_text(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Present `text`. Nothing happens when it is already displayed, so
    /// repeated lines at different timestamps do not re-animate.
    pub fn show(&mut self, text: &str, now: Instant) -> Option<Transition> {
        if self.current.as_deref() == Some(text) {
            return None;
        }
        let previous = self.current.replace(text.to_string());
        let animated = self.animations_supported;
        if animated {
            match previous.as_deref() {
                Some(prev) if !prev.is_empty() => {
                    self.exiting = Some(prev.to_string());
                    self.exit = Some(Animation::new(AnimationKind::Exit, now));
                }
                _ => {
                    self.exiting = None;
                    self.exit = None;
                }
            }
            self.enter = Some(Animation::new(AnimationKind::Enter, now));
        } else {
            self.exiting = None;
            self.exit = None;
            self.enter = None;
        }
        Some(Transition { from: previous, to: text.to_string(), animated })
    }

    /// Show `title - artist` without animating; used when a track has no
    /// lyric timeline.
    pub fn show_fallback(&mut self, title: &str, artist: &str) -> Option<Transition> {
        self.show_static(&fallback_text(title, artist))
    }

    /// Replace the displayed text without any transition (notices such as
    /// "Loading lyrics...").
    pub fn show_static(&mut self, text: &str) -> Option<Transition> {
        if self.current.as_deref() == Some(text) {
            return None;
        }
        let previous = self.current.replace(text.to_string());
        self.exiting = None;
        self.exit = None;
        self.enter = None;
        Some(Transition { from: previous, to: text.to_string(), animated: false })
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        [&self.enter, &self.exit]
            .into_iter()
            .flatten()
            .any(|a| !a.is_finished(now))
    }

    pub fn current_frame(&self, now: Instant) -> Option<SlotFrame<'_>> {
        let text = self.current.as_deref()?;
        let style = self.enter.as_ref().map_or(Keyframe::REST, |a| a.sample(now));
        Some(SlotFrame { text, style })
    }

    /// The exiting slot, only while its fade-out is running.
    pub fn exiting_frame(&self, now: Instant) -> Option<SlotFrame<'_>> {
        let anim = self.exit.as_ref().filter(|a| !a.is_finished(now))?;
        let text = self.exiting.as_deref()?;
        Some(SlotFrame { text, style: anim.sample(now) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn easing_endpoints_and_monotonicity() {
        for easing in [EXIT_EASING, ENTER_EASING] {
            assert_eq!(easing.ease(0.0), 0.0);
            assert_eq!(easing.ease(1.0), 1.0);
            let mut last = 0.0;
            for i in 1..=20 {
                let v = easing.ease(i as f64 / 20.0);
                assert!(v + 1e-9 >= last);
                last = v;
            }
        }
        // Exit eases out fast, enter eases in slow.
        assert!(EXIT_EASING.ease(0.5) > 0.8);
        assert!(ENTER_EASING.ease(0.5) < 0.2);
    }

    #[test]
    fn linear_bezier_is_identity() {
        let linear = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for t in [0.1, 0.25, 0.5, 0.9] {
            assert!(approx(linear.ease(t), t));
        }
    }

    #[test]
    fn animations_start_and_end_on_keyframes() {
        let t0 = Instant::now();
        let enter = Animation::new(AnimationKind::Enter, t0);
        let start = enter.sample(t0);
        assert!(approx(start.opacity, 0.0) && approx(start.translate_y, 12.0));
        let end = enter.sample(t0 + TRANSITION_DURATION * 2);
        assert_eq!(end, ENTER_KEYFRAMES[2]);
        assert!(enter.is_finished(t0 + TRANSITION_DURATION));

        let exit = Animation::new(AnimationKind::Exit, t0);
        let end = exit.sample(t0 + TRANSITION_DURATION);
        assert!(approx(end.opacity, 0.0) && approx(end.translate_y, -12.0) && approx(end.blur, 2.0));
    }

    #[test]
    fn first_line_only_enters() {
        let now = Instant::now();
        let mut display = LyricDisplay::new(true);
        let tr = display.show("Hello", now).unwrap();
        assert_eq!(tr, Transition { from: None, to: "Hello".into(), animated: true });
        assert!(display.exiting_frame(now).is_none());
        assert!(display.current_frame(now).is_some());
        assert!(display.is_animating(now));
    }

    #[test]
    fn change_moves_previous_text_to_exit_slot() {
        let now = Instant::now();
        let mut display = LyricDisplay::new(true);
        display.show("Hello", now);
        display.show("World", now);
        let mid = now + TRANSITION_DURATION / 2;
        assert_eq!(display.exiting_frame(mid).unwrap().text, "Hello");
        assert_eq!(display.current_frame(mid).unwrap().text, "World");
        let done = now + TRANSITION_DURATION;
        assert!(display.exiting_frame(done).is_none());
        assert_eq!(display.current_frame(done).unwrap().style, Keyframe::REST);
        assert!(!display.is_animating(done));
    }

    #[test]
    fn same_text_does_not_retrigger() {
        let now = Instant::now();
        let mut display = LyricDisplay::new(true);
        assert!(display.show("La", now).is_some());
        assert!(display.show("La", now + TRANSITION_DURATION).is_none());
    }

    #[test]
    fn without_animation_support_text_still_swaps() {
        let now = Instant::now();
        let mut display = LyricDisplay::new(false);
        display.show("Hello", now);
        let tr = display.show("World", now).unwrap();
        assert!(!tr.animated);
        assert_eq!(tr.from.as_deref(), Some("Hello"));
        assert_eq!(display.current_text(), Some("World"));
        assert_eq!(display.current_frame(now).unwrap().style, Keyframe::REST);
        assert!(display.exiting_frame(now).is_none());
        assert!(!display.is_animating(now));
    }

    #[test]
    fn fallback_is_static() {
        let mut display = LyricDisplay::new(true);
        let tr = display.show_fallback("Song", "Band").unwrap();
        assert!(!tr.animated);
        assert_eq!(display.current_text(), Some("Song - Band"));
        assert!(display.show_fallback("Song", "Band").is_none());
    }
}
