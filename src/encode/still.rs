use std::path::Path;

use anyhow::Context as _;
use image::{ImageFormat, RgbaImage};

use crate::{encode::ensure_parent_dir, foundation::error::SpriteKeyResult};

/// Writes one frame as an RGBA PNG.
pub fn write_still(path: &Path, frame: &RgbaImage) -> SpriteKeyResult<()> {
    ensure_parent_dir(path)?;
    frame
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
