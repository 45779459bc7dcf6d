/// Phase of the automated boot, in nominal forward order.
///
/// `Blue` is the power-on screen. The `Demo*` states skip the loader demo
/// with a Space tap, the `Hack*` states type the F1, F3, F5, Space shortcut
/// that unlocks the fast start, and `Game` is the only steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BootState {
    #[default]
    Blue,
    AfterBlue,
    DemoPressSpace,
    DemoReleaseSpace,
    AfterDemo,
    BeforeHack,
    HackPressF1,
    HackReleaseF1,
    HackPressF3,
    HackReleaseF3,
    HackPressF5,
    HackReleaseF5,
    HackPressSpace,
    HackReleaseSpace,
    AfterHack,
    Game,
}

impl BootState {
    /// States whose transition does not look at the frame, so they advance
    /// on every tick whether or not the engine produced a new picture.
    pub fn is_dirty_state(self) -> bool {
        matches!(
            self,
            BootState::DemoReleaseSpace
                | BootState::HackReleaseF1
                | BootState::HackPressF3
                | BootState::HackReleaseF3
                | BootState::HackPressF5
                | BootState::HackReleaseF5
                | BootState::HackPressSpace
                | BootState::HackReleaseSpace
                | BootState::AfterHack
        )
    }

    pub fn is_game(self) -> bool {
        self == BootState::Game
    }

    /// Frames are sampled for colour statistics in every state but `Game`.
    pub fn wants_statistics(self) -> bool {
        !self.is_game()
    }
}
