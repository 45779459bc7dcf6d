use mayhem_core::scene::RgbaFrame;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
}

impl Video {
    /// Create a resizable SDL window and a vsynced renderer.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let window = sdl_video
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            texture_creator,
        })
    }

    /// Window size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.canvas.window().size()
    }

    /// Upload an RGBA frame to a texture and present it stretched over the
    /// window.
    pub fn present(&mut self, frame: &RgbaFrame) -> Result<(), String> {
        let (width, height) = (frame.width() as u32, frame.height() as u32);
        if width == 0 || height == 0 {
            self.canvas.clear();
            self.canvas.present();
            return Ok(());
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(|e| e.to_string())?;

        texture
            .update(None, frame.pixels(), frame.width() * 4)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
