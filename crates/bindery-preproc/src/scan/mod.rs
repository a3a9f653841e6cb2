// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned-page filtering — integral images, Sauvola binarization, content-area
// edge detection, margin wiping, and multi-level binarization.

pub mod edges;
pub mod integral;
pub mod multi;
pub mod sauvola;
pub mod wipe;

pub use edges::EdgeDetector;
pub use integral::{
    IntegralBuilder, IntegralGrid, IntegralImage, Profile, SummedAreaBuilder, Window,
};
pub use multi::{LevelOutput, MultiLevelBinarizer, preprocess_page};
pub use sauvola::{SauvolaBinarizer, zero_inverse};
pub use wipe::{Wiper, wipe_outside};
