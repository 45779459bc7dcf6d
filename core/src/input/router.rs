//! Multi-touch tracking for the on-screen joystick.
//!
//! Every finger is followed across down/move/up. A finger owns at most one
//! button (first-match policy), a button is owned by at most one finger, and
//! a button's bit is set exactly while it has an owner. Pressing a direction
//! releases the opposite one, whichever finger held it.

use std::collections::HashMap;

use crate::config::{ButtonKeys, ButtonPlacement, HitPolicy, InputConfig};
use crate::emulator::Emulator;
use crate::geometry::{Rect, Vec2};

use super::button::{ButtonId, ButtonSet};

/// Pointer identifier as reported by the platform.
pub type FingerId = i32;

/// One on-screen button: an untransformed bounding box plus the position and
/// scale it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayButton {
    pub id: ButtonId,
    pub bounds: Rect,
    pub position: Vec2,
    pub scale: Vec2,
}

impl OverlayButton {
    pub fn from_placement(p: &ButtonPlacement) -> Self {
        Self {
            id: p.id,
            bounds: Rect::centered(p.size),
            position: p.position,
            scale: Vec2::splat(1.0),
        }
    }

    /// Bounding box in local coordinates.
    pub fn hitbox(&self) -> Rect {
        self.bounds.scale(self.scale).offset(self.position)
    }
}

pub struct ButtonInputRouter {
    buttons: Vec<OverlayButton>,
    pressed: ButtonSet,
    /// Owning finger per button, indexed by `ButtonId as usize`.
    owners: [Option<FingerId>; ButtonId::ALL.len()],
    /// Hitboxes containing each live finger's last position.
    hover: HashMap<FingerId, ButtonSet>,
    keys: ButtonKeys,
    policy: HitPolicy,
}

impl ButtonInputRouter {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            buttons: config.layout.iter().map(OverlayButton::from_placement).collect(),
            pressed: ButtonSet::EMPTY,
            owners: [None; ButtonId::ALL.len()],
            hover: HashMap::new(),
            keys: config.keys,
            policy: config.hit_policy,
        }
    }

    pub fn buttons(&self) -> &[OverlayButton] {
        &self.buttons
    }

    pub fn pressed(&self) -> ButtonSet {
        self.pressed
    }

    pub fn policy(&self) -> HitPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: HitPolicy) {
        self.policy = policy;
    }

    pub fn owner(&self, id: ButtonId) -> Option<FingerId> {
        self.owners[id as usize]
    }

    /// Buttons currently bound to `finger`.
    pub fn bound_to(&self, finger: FingerId) -> ButtonSet {
        ButtonId::ALL
            .into_iter()
            .filter(|&id| self.owner(id) == Some(finger))
            .collect()
    }

    pub fn hitbox(&self, id: ButtonId) -> Option<Rect> {
        self.buttons.iter().find(|b| b.id == id).map(OverlayButton::hitbox)
    }

    pub fn touch_down(&mut self, emu: &mut dyn Emulator, finger: FingerId, pos: Vec2) {
        let hits = self.hits(pos);
        // A reused id without a lift in between: drop what it no longer touches.
        for id in self.bound_to(finger).iter() {
            if !hits.contains(id) {
                log::debug!("finger {finger} down again away from {}", id.name());
                self.release(emu, id);
            }
        }
        self.hover.insert(finger, hits);

        if self.policy == HitPolicy::FirstMatch && !self.bound_to(finger).is_empty() {
            return;
        }
        self.press_matching(emu, finger, pos, |_| true);
    }

    pub fn touch_move(&mut self, emu: &mut dyn Emulator, finger: FingerId, pos: Vec2) {
        for id in self.bound_to(finger).iter() {
            if !self.contains(id, pos) {
                self.release(emu, id);
            }
        }

        let now = self.hits(pos);
        let before = self.hover.insert(finger, now).unwrap_or(ButtonSet::EMPTY);

        if self.policy == HitPolicy::FirstMatch && !self.bound_to(finger).is_empty() {
            return;
        }
        // Only hitboxes the finger has just entered activate on a drag.
        self.press_matching(emu, finger, pos, |id| !before.contains(id));
    }

    pub fn touch_up(&mut self, emu: &mut dyn Emulator, finger: FingerId, pos: Vec2) {
        for id in self.bound_to(finger).iter() {
            if !self.contains(id, pos) {
                log::debug!("finger {finger} lifted outside {}", id.name());
            }
            self.release(emu, id);
        }
        self.hover.remove(&finger);
    }

    /// Press `id` on behalf of `finger`. Returns `false` (and emits nothing)
    /// when the button is already held.
    pub fn press(&mut self, emu: &mut dyn Emulator, finger: FingerId, id: ButtonId) -> bool {
        if self.pressed.contains(id) {
            return false;
        }
        if let Some(opposite) = id.opposite() {
            self.release(emu, opposite);
        }
        self.pressed.insert(id);
        self.owners[id as usize] = Some(finger);
        emu.press_key(self.keys.code(id));
        true
    }

    /// Release `id`. Returns `false` (and emits nothing) when it was not held.
    pub fn release(&mut self, emu: &mut dyn Emulator, id: ButtonId) -> bool {
        if !self.pressed.contains(id) {
            return false;
        }
        emu.release_key(self.keys.code(id));
        self.pressed.remove(id);
        self.owners[id as usize] = None;
        true
    }

    /// Release every held button through the emulator.
    pub fn release_all(&mut self, emu: &mut dyn Emulator) {
        for id in self.pressed.iter() {
            self.release(emu, id);
        }
        self.hover.clear();
    }

    /// Forget all state without emitting key events (the caller clears the
    /// emulated keyboard itself).
    pub fn clear(&mut self) {
        self.pressed = ButtonSet::EMPTY;
        self.owners = [None; ButtonId::ALL.len()];
        self.hover.clear();
    }

    /// Move buttons with the local coordinate space when it changes size.
    pub fn relayout(&mut self, old_size: Vec2, new_size: Vec2) {
        if old_size.x <= 0.0 || old_size.y <= 0.0 {
            return;
        }
        let factor = new_size / old_size;
        for button in &mut self.buttons {
            button.position = button.position * factor;
        }
    }

    fn contains(&self, id: ButtonId, pos: Vec2) -> bool {
        self.hitbox(id).is_some_and(|r| r.contains(pos))
    }

    fn hits(&self, pos: Vec2) -> ButtonSet {
        self.buttons
            .iter()
            .filter(|b| b.hitbox().contains(pos))
            .map(|b| b.id)
            .collect()
    }

    fn press_matching(
        &mut self,
        emu: &mut dyn Emulator,
        finger: FingerId,
        pos: Vec2,
        eligible: impl Fn(ButtonId) -> bool,
    ) {
        let candidates: Vec<ButtonId> = self
            .buttons
            .iter()
            .filter(|b| eligible(b.id) && b.hitbox().contains(pos))
            .map(|b| b.id)
            .collect();

        for id in candidates {
            if self.press(emu, finger, id) && self.policy == HitPolicy::FirstMatch {
                break;
            }
        }
    }
}
