use serde::Deserialize;

/// Logical on-screen buttons of the virtual joystick overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonId {
    Left,
    Right,
    Up,
    Down,
    Fire,
    SkipLevel,
}

impl ButtonId {
    pub const ALL: [ButtonId; 6] = [
        ButtonId::Left,
        ButtonId::Right,
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Fire,
        ButtonId::SkipLevel,
    ];

    pub const fn bit(self) -> u8 {
        match self {
            ButtonId::Left => 0x01,
            ButtonId::Right => 0x02,
            ButtonId::Up => 0x04,
            ButtonId::Down => 0x08,
            ButtonId::Fire => 0x10,
            ButtonId::SkipLevel => 0x20,
        }
    }

    /// The button that may not be held at the same time as this one.
    pub const fn opposite(self) -> Option<ButtonId> {
        match self {
            ButtonId::Left => Some(ButtonId::Right),
            ButtonId::Right => Some(ButtonId::Left),
            ButtonId::Up => Some(ButtonId::Down),
            ButtonId::Down => Some(ButtonId::Up),
            ButtonId::Fire | ButtonId::SkipLevel => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ButtonId::Left => "Left",
            ButtonId::Right => "Right",
            ButtonId::Up => "Up",
            ButtonId::Down => "Down",
            ButtonId::Fire => "Fire",
            ButtonId::SkipLevel => "Skip Level",
        }
    }
}

/// Bitmask of pressed buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: ButtonSet = ButtonSet(0);

    pub fn contains(self, id: ButtonId) -> bool {
        self.0 & id.bit() != 0
    }

    pub fn insert(&mut self, id: ButtonId) {
        self.0 |= id.bit();
    }

    pub fn remove(&mut self, id: ButtonId) {
        self.0 &= !id.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = ButtonId> {
        ButtonId::ALL.into_iter().filter(move |&id| self.contains(id))
    }
}

impl FromIterator<ButtonId> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = ButtonId>>(iter: I) -> Self {
        let mut set = ButtonSet::EMPTY;
        for id in iter {
            set.insert(id);
        }
        set
    }
}
