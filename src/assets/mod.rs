//! Image discovery for a reel project.
//!
//! Images are files named `image_<n>.<ext>`, presented in order of `<n>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::types::ImageAsset;

const IMAGE_PREFIX: &str = "image_";

/// List `image_<n>.*` files in `dir`, ordered numerically, with their sizes.
pub fn discover_images(dir: &Path) -> Result<Vec<ImageAsset>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read images directory {:?}", dir))?;

    let mut indexed: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list images directory {:?}", dir))?
            .path();
        if !path.is_file() {
            continue;
        }
        match image_index(&path) {
            Some(index) => indexed.push((index, path)),
            None => debug!(path = %path.display(), "ignoring non-image file"),
        }
    }
    indexed.sort();

    indexed
        .into_iter()
        .map(|(_, path)| load_image(&path))
        .collect()
}

/// Read intrinsic dimensions without decoding the whole image.
pub fn load_image(path: &Path) -> Result<ImageAsset> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("Failed to read image dimensions of {:?}", path))?;
    Ok(ImageAsset::new(path, width, height))
}

fn image_index(path: &Path) -> Option<u64> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(IMAGE_PREFIX)?
        .parse()
        .ok()
}
