// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page images — a page either lives in memory (decoded) or on disk (not yet
// read). Loading and materializing go through the `image` crate's codecs.

use std::path::{Path, PathBuf};

use bindery_core::error::{BinderyError, Result};
use image::{DynamicImage, GrayImage};
use tracing::{info, instrument};

/// A page image, decoded or still on disk.
///
/// ```ignore
/// let page = PageImage::from_path("scan-0042.png");
/// let gray = page.load_gray()?;
/// let level = bindery_preproc::preprocess_page(&config, &gray, None)?;
/// PageImage::from(level.image).materialize("scan-0042_bin0.5.png")?;
/// ```
#[derive(Debug, Clone)]
pub enum PageImage {
    Memory(DynamicImage),
    File(PathBuf),
}

impl From<DynamicImage> for PageImage {
    fn from(image: DynamicImage) -> Self {
        Self::Memory(image)
    }
}

impl From<GrayImage> for PageImage {
    fn from(image: GrayImage) -> Self {
        Self::Memory(DynamicImage::ImageLuma8(image))
    }
}

impl PageImage {
    // -- Construction ---------------------------------------------------------

    /// Refer to an image file without reading it yet.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    // -- Loading --------------------------------------------------------------

    /// Decode the page, reading the file if needed.
    pub fn load(&self) -> Result<DynamicImage> {
        match self {
            Self::Memory(image) => Ok(image.clone()),
            Self::File(path) => open_image(path),
        }
    }

    /// Like [`load`](Self::load), without cloning an in-memory page.
    pub fn into_dynamic(self) -> Result<DynamicImage> {
        match self {
            Self::Memory(image) => Ok(image),
            Self::File(path) => open_image(&path),
        }
    }

    /// Decode the page as 8-bit grayscale.
    pub fn load_gray(&self) -> Result<GrayImage> {
        Ok(self.load()?.to_luma8())
    }

    // -- Output ---------------------------------------------------------------

    /// Write the page to `dest`.
    ///
    /// In-memory pages are encoded in the format implied by the extension;
    /// on-disk pages are copied byte for byte.
    #[instrument(skip_all, fields(dest = %dest.as_ref().display()))]
    pub fn materialize(&self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        match self {
            Self::Memory(image) => {
                image.save(dest).map_err(|err| {
                    BinderyError::ImageError(format!(
                        "failed to save page to {}: {}",
                        dest.display(),
                        err
                    ))
                })?;
            }
            Self::File(path) => {
                if path.as_path() != dest {
                    std::fs::copy(path, dest)?;
                }
            }
        }
        info!("Page written");
        Ok(())
    }
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    let img = image::open(path).map_err(|err| {
        BinderyError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })?;
    info!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "Page loaded"
    );
    Ok(img)
}
