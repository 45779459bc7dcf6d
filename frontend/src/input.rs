use std::collections::{HashMap, HashSet};

use mayhem_core::input::{ButtonId, FingerId};
use sdl2::keyboard::Scancode;

/// First finger id handed to keyboard-driven presses; far above anything a
/// touch screen or the mouse reports.
const KEYBOARD_FINGER_BASE: FingerId = 1_000;

/// Finger id used for the left mouse button.
pub const MOUSE_FINGER: FingerId = 0;

/// Maps SDL scancodes to overlay buttons. Several keys may share a button;
/// it stays down while any of them is held.
pub struct KeyMap {
    map: HashMap<Scancode, ButtonId>,
    held: HashSet<Scancode>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            held: HashSet::new(),
        }
    }

    pub fn bind(&mut self, scancode: Scancode, button: ButtonId) {
        self.map.insert(scancode, button);
    }

    pub fn get(&self, scancode: Scancode) -> Option<ButtonId> {
        self.map.get(&scancode).copied()
    }

    /// Record a key press. Returns the button to press when this is the
    /// first held key bound to it.
    pub fn key_down(&mut self, scancode: Scancode) -> Option<ButtonId> {
        let button = self.get(scancode)?;
        let first = !self.is_held(button);
        (self.held.insert(scancode) && first).then_some(button)
    }

    /// Record a key release. Returns the button to release when no other
    /// held key is bound to it.
    pub fn key_up(&mut self, scancode: Scancode) -> Option<ButtonId> {
        let button = self.get(scancode)?;
        (self.held.remove(&scancode) && !self.is_held(button)).then_some(button)
    }

    /// Forget held keys (focus loss, when the scene releases everything).
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    fn is_held(&self, button: ButtonId) -> bool {
        self.held.iter().any(|sc| self.map.get(sc) == Some(&button))
    }

    /// Synthetic finger that holds `button` while its key is down.
    pub fn finger_for(button: ButtonId) -> FingerId {
        KEYBOARD_FINGER_BASE + button as FingerId
    }
}

/// Arrows for the d-pad, left Ctrl or Space to fire, Tab for the skip button.
pub fn default_key_map() -> KeyMap {
    let mut km = KeyMap::new();
    km.bind(Scancode::Left, ButtonId::Left);
    km.bind(Scancode::Right, ButtonId::Right);
    km.bind(Scancode::Up, ButtonId::Up);
    km.bind(Scancode::Down, ButtonId::Down);
    km.bind(Scancode::LCtrl, ButtonId::Fire);
    km.bind(Scancode::Space, ButtonId::Fire);
    km.bind(Scancode::Tab, ButtonId::SkipLevel);
    km
}

/// Assigns small, stable pointer ids to SDL's 64-bit touch finger ids for
/// as long as the finger is down.
#[derive(Default)]
pub struct TouchMap {
    ids: HashMap<i64, FingerId>,
}

impl TouchMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new finger. Ids start at 1 so they never clash with the mouse.
    pub fn down(&mut self, sdl_finger: i64) -> FingerId {
        if let Some(&id) = self.ids.get(&sdl_finger) {
            return id;
        }
        let id = (1..)
            .find(|candidate| !self.ids.values().any(|v| v == candidate))
            .unwrap_or(1);
        self.ids.insert(sdl_finger, id);
        id
    }

    pub fn get(&self, sdl_finger: i64) -> Option<FingerId> {
        self.ids.get(&sdl_finger).copied()
    }

    /// Forget a lifted finger, returning the id it had.
    pub fn up(&mut self, sdl_finger: i64) -> Option<FingerId> {
        self.ids.remove(&sdl_finger)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn active(&self) -> usize {
        self.ids.len()
    }
}
