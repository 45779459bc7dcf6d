use mayhem_core::geometry::Vec2;
use mayhem_core::input::{ButtonSet, OverlayButton};
use mayhem_core::scene::RgbaFrame;

/// Minimal 4x5 bitmap font for FPS overlay. Each glyph is 4 pixels wide, 5 rows tall.
/// Bits are MSB-left within each u8 (only top 4 bits used).
const GLYPHS: &[(&[u8; 5], u8)] = &[
    // '0'
    (&[0x60, 0x90, 0x90, 0x90, 0x60], b'0'),
    // '1'
    (&[0x20, 0x60, 0x20, 0x20, 0x70], b'1'),
    // '2'
    (&[0x60, 0x90, 0x20, 0x40, 0xF0], b'2'),
    // '3'
    (&[0x60, 0x90, 0x20, 0x90, 0x60], b'3'),
    // '4'
    (&[0x90, 0x90, 0xF0, 0x10, 0x10], b'4'),
    // '5'
    (&[0xF0, 0x80, 0xE0, 0x10, 0xE0], b'5'),
    // '6'
    (&[0x60, 0x80, 0xE0, 0x90, 0x60], b'6'),
    // '7'
    (&[0xF0, 0x10, 0x20, 0x40, 0x40], b'7'),
    // '8'
    (&[0x60, 0x90, 0x60, 0x90, 0x60], b'8'),
    // '9'
    (&[0x60, 0x90, 0x70, 0x10, 0x60], b'9'),
    // '.'
    (&[0x00, 0x00, 0x00, 0x00, 0x40], b'.'),
];

const GLYPH_W: usize = 4;
const GLYPH_SCALE: usize = 2;

const OUTLINE: [u8; 4] = [255, 255, 255, 160];
const FILL: [u8; 4] = [255, 200, 40, 110];

fn glyph_for(ch: u8) -> &'static [u8; 5] {
    GLYPHS
        .iter()
        .find(|&&(_, c)| c == ch)
        .map_or(&[0; 5], |&(data, _)| data)
}

/// Alpha-blend `colour` over one pixel. Out-of-range coordinates are ignored.
fn blend(frame: &mut RgbaFrame, x: usize, y: usize, colour: [u8; 4]) {
    if x >= frame.width() || y >= frame.height() {
        return;
    }
    let offset = (y * frame.width() + x) * 4;
    let px = &mut frame.pixels_mut()[offset..offset + 4];
    let a = colour[3] as u32;
    for i in 0..3 {
        px[i] = ((colour[i] as u32 * a + px[i] as u32 * (255 - a)) / 255) as u8;
    }
    px[3] = 0xFF;
}

/// Draw an FPS string (e.g. "60.1") at the top-left corner.
pub fn draw_fps(frame: &mut RgbaFrame, text: &str) {
    let x0 = 4;
    let y0 = 4;

    for (ci, ch) in text.bytes().enumerate() {
        let glyph = glyph_for(ch);
        let gx = x0 + ci * (GLYPH_W + 1) * GLYPH_SCALE;

        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let x = gx + col * GLYPH_SCALE + dx;
                        let y = y0 + row * GLYPH_SCALE + dy;
                        blend(frame, x, y, [255, 255, 255, 255]);
                    }
                }
            }
        }
    }
}

/// Outline every button hitbox; pressed buttons are filled as well.
/// `local_size` is the scene's coordinate space the hitboxes live in.
pub fn draw_buttons(
    frame: &mut RgbaFrame,
    buttons: &[OverlayButton],
    pressed: ButtonSet,
    local_size: Vec2,
) {
    if local_size.x <= 0.0 || local_size.y <= 0.0 {
        return;
    }
    let to_px = Vec2::new(frame.width() as f32, frame.height() as f32) / local_size;

    for button in buttons {
        let hitbox = button.hitbox();
        let lt = hitbox.left_top * to_px;
        let rb = hitbox.right_bottom * to_px;
        let x0 = lt.x.max(0.0) as usize;
        let y0 = lt.y.max(0.0) as usize;
        let x1 = (rb.x.max(0.0) as usize).min(frame.width().saturating_sub(1));
        let y1 = (rb.y.max(0.0) as usize).min(frame.height().saturating_sub(1));
        if x0 > x1 || y0 > y1 {
            continue;
        }

        let filled = pressed.contains(button.id);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let edge = x == x0 || x == x1 || y == y0 || y == y1;
                if edge {
                    blend(frame, x, y, OUTLINE);
                } else if filled {
                    blend(frame, x, y, FILL);
                }
            }
        }
    }
}

/// Frames-per-second readout refreshed twice a second.
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    text: String,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            elapsed: 0.0,
            text: String::new(),
        }
    }

    pub fn tick(&mut self, elapsed: f32) -> &str {
        self.frames += 1;
        self.elapsed += elapsed;
        if self.elapsed >= 0.5 {
            self.text = format!("{:.1}", self.frames as f32 / self.elapsed);
            self.frames = 0;
            self.elapsed = 0.0;
        }
        &self.text
    }
}
