pub mod clock;
pub mod game_scene;
pub mod target;
pub mod viewport;

pub use clock::FrameClock;
pub use game_scene::GameScene;
pub use target::RgbaFrame;
pub use viewport::Viewport;

use crate::error::ShellError;
use crate::geometry::Vec2;
use crate::input::FingerId;

/// A screen of the game. All coordinates are in the local system of the
/// [`Viewport`].
pub trait Scene {
    /// Called once before the first update, with the local size.
    fn init(&mut self, width: f32, height: f32);

    /// Called once when the scene is replaced or the game shuts down.
    fn shutdown(&mut self);

    /// The host is going to the background.
    fn pause(&mut self) {}

    /// The host is back in the foreground.
    fn resume(&mut self) {}

    fn resize(&mut self, old: Vec2, new: Vec2);

    /// Advance by `elapsed` seconds.
    fn update(&mut self, elapsed: f32) -> Result<(), ShellError>;

    /// Draw the scene's picture into `target`.
    fn render(&self, target: &mut RgbaFrame);

    fn touch_down(&mut self, _finger: FingerId, _pos: Vec2) {}
    fn touch_up(&mut self, _finger: FingerId, _pos: Vec2) {}
    fn touch_move(&mut self, _finger: FingerId, _pos: Vec2) {}
}

/// Owns the viewport and the current scene, and translates screen-space
/// input into the scene's local space.
pub struct Game<S: Scene> {
    viewport: Viewport,
    scene: Option<S>,
}

impl<S: Scene> Default for Game<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scene> Game<S> {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            scene: None,
        }
    }

    pub fn init(&mut self, screen_width: u32, screen_height: u32, ref_width: u32, ref_height: u32) {
        self.viewport = Viewport::new(screen_width, screen_height, ref_width, ref_height);
        log::info!(
            "game init: screen {screen_width}x{screen_height}, local {:?}",
            self.viewport.local_size()
        );
    }

    pub fn shutdown(&mut self) {
        self.set_scene(None);
    }

    pub fn pause(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.resume();
        }
    }

    pub fn resize(&mut self, screen_width: u32, screen_height: u32) {
        let old = self.viewport.resize(screen_width, screen_height);
        let new = self.viewport.local_size();
        if let Some(scene) = &mut self.scene {
            scene.resize(old, new);
        }
    }

    pub fn update(&mut self, elapsed: f32) -> Result<(), ShellError> {
        match &mut self.scene {
            Some(scene) => scene.update(elapsed),
            None => Ok(()),
        }
    }

    pub fn render(&self, target: &mut RgbaFrame) {
        if let Some(scene) = &self.scene {
            scene.render(target);
        }
    }

    /// Replace the current scene. The old one is shut down, the new one
    /// initialised with the current local size.
    pub fn set_scene(&mut self, scene: Option<S>) {
        if let Some(mut old) = self.scene.take() {
            old.shutdown();
        }
        if let Some(mut scene) = scene {
            let size = self.viewport.local_size();
            scene.init(size.x, size.y);
            self.scene = Some(scene);
        }
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut S> {
        self.scene.as_mut()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn touch_down(&mut self, finger: FingerId, screen_x: f32, screen_y: f32) {
        let pos = self.viewport.screen_to_local(Vec2::new(screen_x, screen_y));
        if let Some(scene) = &mut self.scene {
            scene.touch_down(finger, pos);
        }
    }

    pub fn touch_up(&mut self, finger: FingerId, screen_x: f32, screen_y: f32) {
        let pos = self.viewport.screen_to_local(Vec2::new(screen_x, screen_y));
        if let Some(scene) = &mut self.scene {
            scene.touch_up(finger, pos);
        }
    }

    pub fn touch_move(&mut self, finger: FingerId, screen_x: f32, screen_y: f32) {
        let pos = self.viewport.screen_to_local(Vec2::new(screen_x, screen_y));
        if let Some(scene) = &mut self.scene {
            scene.touch_move(finger, pos);
        }
    }
}
