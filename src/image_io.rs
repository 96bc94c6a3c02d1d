use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::errors::{LeafSegError, Result};

/// An input photo with its name, for labeling the output
pub struct InputImage {
    pub image: RgbaImage,
    pub filename: String,
}

/// Load an image in any supported format, converted to RGBA
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| LeafSegError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let image = image::open(path)?.to_rgba8();

    Ok(InputImage { image, filename })
}

/// Save an RGBA image as a PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Collect all PNG files under a directory, recursively, in sorted order
pub fn get_png_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.is_dir() {
        return Err(LeafSegError::InvalidPath(dir_path.to_path_buf()));
    }

    let mut png_files = Vec::new();
    collect_png_files(dir_path, &mut png_files)?;
    png_files.sort();

    Ok(png_files)
}

fn collect_png_files(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_png_files(&path, result)?;
        } else if path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
        {
            result.push(path);
        }
    }

    Ok(())
}
