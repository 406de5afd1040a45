use std::time::Instant;

/// Simulated media clock. Holds the last known position plus the instant it
/// was observed, and extrapolates while playing.
#[derive(Debug, PartialEq, Default)]
pub struct PlaybackTimer {
    /// Anchor position in seconds (finite, >= 0).
    anchor_position: f64,
    /// Monotonic instant corresponding to `anchor_position`; `None` while paused.
    anchor_instant: Option<Instant>,
}

impl PlaybackTimer {
    /// Jump to `position`. Keeps running if the clock was running.
    pub fn seek(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        if self.anchor_instant.is_some() {
            self.anchor_instant = Some(Instant::now());
        }
    }

    pub fn play(&mut self) {
        if self.anchor_instant.is_none() {
            self.anchor_instant = Some(Instant::now());
        }
    }

    /// Freeze the clock at its current estimate.
    pub fn pause(&mut self) {
        self.anchor_position = self.position();
        self.anchor_instant = None;
    }

    pub fn position(&self) -> f64 {
        self.position_at(Instant::now())
    }

    pub fn position_at(&self, now: Instant) -> f64 {
        let base = self.anchor_position;
        match self.anchor_instant {
            Some(inst) => {
                let val = base + now.saturating_duration_since(inst).as_secs_f64();
                if val.is_finite() { val } else { base }
            }
            None => base,
        }
    }
}

pub fn sanitize_position(p: f64) -> f64 {
    if !p.is_finite() || p < 0.0 { 0.0 } else { p }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timer_at(position: f64) -> PlaybackTimer {
        let mut timer = PlaybackTimer::default();
        timer.seek(position);
        timer
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let timer = timer_at(12.0);
        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(timer.position_at(later), 12.0);
    }

    #[test]
    fn running_clock_extrapolates() {
        let mut timer = timer_at(1.0);
        timer.play();
        let later = Instant::now() + Duration::from_millis(1500);
        assert!(timer.position_at(later) >= 2.5);
    }

    #[test]
    fn seek_and_sanitize() {
        let mut timer = timer_at(-4.0);
        assert_eq!(timer.position(), 0.0);
        timer.seek(f64::NAN);
        assert_eq!(timer.position(), 0.0);
        timer.seek(30.0);
        assert_eq!(timer.position(), 30.0);
    }

    #[test]
    fn pause_keeps_estimate() {
        let mut timer = timer_at(5.0);
        timer.play();
        timer.pause();
        let frozen = timer.position();
        assert!(frozen >= 5.0);
        assert_eq!(timer.position_at(Instant::now() + Duration::from_secs(10)), frozen);
    }
}
