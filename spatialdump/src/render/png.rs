//! PNG output.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use super::error::RenderError;

/// Encodes an RGB image as PNG into memory.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Sibling path the image is staged at before the final rename.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.png".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Writes the image to `path` as PNG.
///
/// The bytes go to a sibling staging file that is synced and then renamed
/// over `path`, so `path` either keeps its old content or holds the full new
/// image.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), RenderError> {
    let bytes = encode_png(image)?;
    let staging = staging_path(path);

    let result = write_synced(&staging, &bytes).and_then(|()| fs::rename(&staging, path));
    if let Err(source) = result {
        // Best effort; the staging file may never have been created
        let _ = fs::remove_file(&staging);
        return Err(RenderError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
