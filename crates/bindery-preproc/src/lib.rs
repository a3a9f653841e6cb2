// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bindery-preproc — Page preprocessing ahead of OCR.
//
// The `scan` module holds the pixel algorithms (integral images, Sauvola
// binarization, content-area wiping, multi-level binarization) and never
// touches the filesystem. The `page` module is the thin codec layer that
// loads page images and writes results out.

pub mod page;
pub mod scan;

// Re-export the primary types so callers can use `bindery_preproc::Wiper` etc.
pub use page::PageImage;
pub use scan::{
    EdgeDetector, IntegralImage, LevelOutput, MultiLevelBinarizer, SauvolaBinarizer, Wiper,
    preprocess_page,
};
