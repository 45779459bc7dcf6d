use super::router::FingerId;
use super::button::ButtonId;

/// Long-press detector for the reset button.
///
/// Geometry stays with the router; callers pass whether the finger is inside
/// the button's hitbox. Times are seconds on the scene clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResetWatch {
    Idle,
    Holding { finger: FingerId, started_at: f64 },
}

pub struct ResetGesture {
    button: ButtonId,
    hold_secs: f64,
    watch: ResetWatch,
}

impl ResetGesture {
    pub fn new(button: ButtonId, hold_secs: f32) -> Self {
        Self {
            button,
            hold_secs: hold_secs as f64,
            watch: ResetWatch::Idle,
        }
    }

    pub fn button(&self) -> ButtonId {
        self.button
    }

    pub fn watch(&self) -> ResetWatch {
        self.watch
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.watch, ResetWatch::Holding { .. })
    }

    /// Seconds the current hold has lasted at `now`.
    pub fn held_for(&self, now: f64) -> Option<f64> {
        match self.watch {
            ResetWatch::Holding { started_at, .. } => Some(now - started_at),
            ResetWatch::Idle => None,
        }
    }

    pub fn touch_down(&mut self, finger: FingerId, inside: bool, now: f64) {
        if inside && self.watch == ResetWatch::Idle {
            self.watch = ResetWatch::Holding {
                finger,
                started_at: now,
            };
        }
    }

    pub fn touch_move(&mut self, finger: FingerId, inside: bool) {
        if !inside && self.holds(finger) {
            self.watch = ResetWatch::Idle;
        }
    }

    pub fn touch_up(&mut self, finger: FingerId) {
        if self.holds(finger) {
            self.watch = ResetWatch::Idle;
        }
    }

    pub fn cancel(&mut self) {
        self.watch = ResetWatch::Idle;
    }

    /// Returns `true` exactly once per hold, when it outlasts the threshold.
    /// The watch is idle afterwards; the finger has to lift and touch down
    /// again before another reset can fire.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.held_for(now) {
            Some(held) if held > self.hold_secs => {
                self.watch = ResetWatch::Idle;
                true
            }
            _ => false,
        }
    }

    fn holds(&self, finger: FingerId) -> bool {
        matches!(self.watch, ResetWatch::Holding { finger: f, .. } if f == finger)
    }
}
