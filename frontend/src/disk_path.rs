//! Disk image resolution: a loose image file, a directory holding one, or a
//! ZIP archive that is unpacked into the cache directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File extensions the emulator can autostart.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["d64", "t64", "prg", "crt"];

#[derive(Debug)]
pub enum DiskError {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
    /// The path does not exist.
    NotFound(PathBuf),
    /// A directory or archive without any disk image in it.
    NoImage(PathBuf),
}

impl std::fmt::Display for DiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskError::Io(e) => write!(f, "I/O error: {e}"),
            DiskError::Zip(e) => write!(f, "invalid ZIP: {e}"),
            DiskError::NotFound(path) => write!(f, "disk path not found: {}", path.display()),
            DiskError::NoImage(path) => write!(
                f,
                "no .{} image in {}",
                IMAGE_EXTENSIONS.join("/."),
                path.display()
            ),
        }
    }
}

impl std::error::Error for DiskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskError::Io(e) => Some(e),
            DiskError::Zip(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiskError {
    fn from(e: std::io::Error) -> Self {
        DiskError::Io(e)
    }
}

impl From<zip::result::ZipError> for DiskError {
    fn from(e: zip::result::ZipError) -> Self {
        DiskError::Zip(e)
    }
}

/// Resolve `path` to a disk image the engine can open, extracting archives
/// into `<cache dir>/mayhem`.
pub fn resolve(path: &Path) -> Result<PathBuf, DiskError> {
    let cache = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mayhem");
    resolve_into(path, &cache)
}

/// Resolution order:
/// 1. `*.zip` → first image entry, extracted into `cache`.
/// 2. A directory → first image file in name order.
/// 3. Any other existing file → used as is.
pub fn resolve_into(path: &Path, cache: &Path) -> Result<PathBuf, DiskError> {
    if !path.exists() {
        return Err(DiskError::NotFound(path.to_path_buf()));
    }

    if has_extension(path, "zip") {
        return extract_from_zip(path, cache);
    }

    if path.is_dir() {
        let mut images: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_disk_image(p))
            .collect();
        images.sort();
        return images
            .into_iter()
            .next()
            .ok_or_else(|| DiskError::NoImage(path.to_path_buf()));
    }

    if !is_disk_image(path) {
        log::warn!("{} has no known disk extension", path.display());
    }
    Ok(path.to_path_buf())
}

pub fn is_disk_image(path: &Path) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn extract_from_zip(path: &Path, cache: &Path) -> Result<PathBuf, DiskError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        // Flatten: only the file name is kept, never the archive's directories.
        let Some(name) = Path::new(entry.name()).file_name().map(PathBuf::from) else {
            continue;
        };
        if !is_disk_image(&name) {
            continue;
        }

        std::fs::create_dir_all(cache)?;
        let target = cache.join(name);
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        log::info!("extracted {} from {}", target.display(), path.display());
        return Ok(target);
    }

    Err(DiskError::NoImage(path.to_path_buf()))
}
