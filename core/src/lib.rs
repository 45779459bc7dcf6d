pub mod boot;
pub mod config;
pub mod emulator;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod state;

pub mod prelude {
    pub use crate::boot::{BootSequencer, BootState};
    pub use crate::config::ShellConfig;
    pub use crate::emulator::{Emulator, EmulatorContext, KeyCode, PcmQueue, SharedFramebuffer};
    pub use crate::error::ShellError;
    pub use crate::geometry::{Rect, Vec2};
    pub use crate::input::{ButtonId, FingerId};
    pub use crate::scene::{Game, GameScene, RgbaFrame, Scene};
}
