use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mayhem_core::scene::RgbaFrame;

/// `<pictures dir>/mayhem`, falling back to the data directory.
pub fn default_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("mayhem")
}

/// Write `frame` as `mayhem-<unix seconds>.png` into `dir`.
pub fn save(frame: &RgbaFrame, dir: &Path) -> Result<PathBuf, png::EncodingError> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = dir.join(format!("mayhem-{stamp}.png"));
    write_png(frame, &path)?;
    Ok(path)
}

pub fn write_png(frame: &RgbaFrame, path: &Path) -> Result<(), png::EncodingError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, frame.width() as u32, frame.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(frame.pixels())?;
    Ok(())
}
