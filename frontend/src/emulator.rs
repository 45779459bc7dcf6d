use mayhem_core::emulator::EmulatorContext;
use mayhem_core::input::ButtonId;
use mayhem_core::scene::{FrameClock, Game, GameScene, RgbaFrame};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;
use sdl2::mouse::MouseButton;

use crate::audio;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::input::{self, KeyMap, MOUSE_FINGER, TouchMap};
use crate::overlay::{self, FpsCounter};
use crate::screenshot;
use crate::video::Video;

/// Mouse events SDL synthesizes from touches carry this device id.
const TOUCH_MOUSE_ID: u32 = u32::MAX;

pub fn run(ctx: EmulatorContext, config: &AppConfig) -> Result<(), AppError> {
    let sdl_context = sdl2::init()?;
    let sdl_video = sdl_context.video()?;
    let sdl_audio = sdl_context.audio()?;

    let (width, height) = config.display.window_size();
    let mut video = Video::new(&sdl_video, "Mayhem", width, height)?;
    let mut event_pump = sdl_context.event_pump()?;

    let sound = match audio::init(&sdl_audio, ctx.pcm.clone()) {
        Ok((device, fade_out)) => {
            device.resume();
            Some((device, fade_out))
        }
        Err(e) => {
            log::warn!("audio disabled: {e}");
            None
        }
    };

    let mut game: Game<GameScene> = Game::new();
    game.init(
        width,
        height,
        config.display.reference_width,
        config.display.reference_height,
    );
    game.set_scene(Some(GameScene::new(ctx, &config.shell)));

    let mut key_map = input::default_key_map();
    let mut touches = TouchMap::new();
    let mut clock = FrameClock::new();
    let mut fps = FpsCounter::new();
    let mut frame = RgbaFrame::new(width as usize, height as usize);
    let mut mouse_down = false;

    'main: loop {
        let (win_w, win_h) = video.size();
        let to_screen = |x: f32, y: f32| (x * win_w as f32, y * win_h as f32);

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::SizeChanged(w, h) => {
                        let (w, h) = (w.max(1) as u32, h.max(1) as u32);
                        game.resize(w, h);
                        frame.resize(w as usize, h as usize);
                    }
                    WindowEvent::FocusLost => {
                        log::debug!("focus lost, pausing");
                        touches.clear();
                        key_map.release_all();
                        mouse_down = false;
                        game.pause();
                    }
                    WindowEvent::FocusGained => {
                        game.resume();
                        clock.reset();
                    }
                    _ => {}
                },

                // Touch screens
                Event::FingerDown { finger_id, x, y, .. } => {
                    let id = touches.down(finger_id);
                    let (sx, sy) = to_screen(x, y);
                    game.touch_down(id, sx, sy);
                }
                Event::FingerMotion { finger_id, x, y, .. } => {
                    if let Some(id) = touches.get(finger_id) {
                        let (sx, sy) = to_screen(x, y);
                        game.touch_move(id, sx, sy);
                    }
                }
                Event::FingerUp { finger_id, x, y, .. } => {
                    if let Some(id) = touches.up(finger_id) {
                        let (sx, sy) = to_screen(x, y);
                        game.touch_up(id, sx, sy);
                    }
                }

                // Mouse acts as one more finger
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    which,
                    x,
                    y,
                    ..
                } if which != TOUCH_MOUSE_ID => {
                    mouse_down = true;
                    game.touch_down(MOUSE_FINGER, x as f32, y as f32);
                }
                Event::MouseMotion { which, x, y, .. } if mouse_down && which != TOUCH_MOUSE_ID => {
                    game.touch_move(MOUSE_FINGER, x as f32, y as f32);
                }
                Event::MouseButtonUp {
                    mouse_btn: MouseButton::Left,
                    which,
                    x,
                    y,
                    ..
                } if mouse_down && which != TOUCH_MOUSE_ID => {
                    mouse_down = false;
                    game.touch_up(MOUSE_FINGER, x as f32, y as f32);
                }

                Event::KeyDown {
                    scancode: Some(Scancode::F12),
                    repeat: false,
                    ..
                } => take_screenshot(&game),

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(button) = key_map.key_down(sc)
                        && let Some((x, y)) = button_centre(&game, button)
                    {
                        game.touch_down(KeyMap::finger_for(button), x, y);
                    }
                }
                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some(button) = key_map.key_up(sc)
                        && let Some((x, y)) = button_centre(&game, button)
                    {
                        game.touch_up(KeyMap::finger_for(button), x, y);
                    }
                }

                _ => {}
            }
        }

        let elapsed = clock.tick();
        game.update(elapsed)?;

        frame.clear();
        game.render(&mut frame);
        if config.display.show_buttons
            && let Some(scene) = game.scene()
        {
            overlay::draw_buttons(
                &mut frame,
                scene.buttons(),
                scene.pressed_buttons(),
                game.viewport().local_size(),
            );
        }
        let fps_text = fps.tick(elapsed);
        if config.display.show_fps {
            overlay::draw_fps(&mut frame, fps_text);
        }
        video.present(&frame)?;
    }

    game.shutdown();

    if let Some((device, fade_out)) = sound {
        fade_out.store(true, std::sync::atomic::Ordering::Relaxed);
        std::thread::sleep(audio::fade_out_duration());
        device.pause();
    }
    Ok(())
}

/// Screen position of `button`'s centre, where keyboard presses touch it.
fn button_centre(game: &Game<GameScene>, button: ButtonId) -> Option<(f32, f32)> {
    let centre = game.scene()?.router().hitbox(button)?.center();
    let screen = game.viewport().local_to_screen(centre);
    Some((screen.x, screen.y))
}

fn take_screenshot(game: &Game<GameScene>) {
    let Some(scene) = game.scene() else { return };
    match screenshot::save(scene.screen(), &screenshot::default_dir()) {
        Ok(path) => log::info!("screenshot saved to {}", path.display()),
        Err(e) => log::warn!("screenshot failed: {e}"),
    }
}
