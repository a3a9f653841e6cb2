// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Margin wiping — blank everything outside the detected content area.

use bindery_core::error::Result;
use bindery_core::types::{Axis, BACKGROUND, EdgeBounds, WipeParams};
use image::{GrayImage, Luma};
use tracing::{debug, info, instrument, warn};

use super::edges::EdgeDetector;

/// Detects the content area of a binarized page and whitens the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wiper {
    detector: EdgeDetector,
    min_width_pct: Option<u32>,
}

impl Wiper {
    pub fn new(params: &WipeParams) -> Result<Self> {
        Ok(Self {
            detector: EdgeDetector::new(params)?,
            min_width_pct: params.min_width_pct,
        })
    }

    /// Content bounds along `axis`, after the minimum-width check.
    ///
    /// Bounds narrower than the configured share of the page are discarded in
    /// favour of the full extent.
    pub fn bounds(&self, image: &GrayImage, axis: Axis) -> EdgeBounds {
        let extent = match axis {
            Axis::Horizontal => image.width(),
            Axis::Vertical => image.height(),
        };
        let bounds = self.detector.detect_in(image, axis);
        match self.min_width_pct {
            Some(min_pct) if bounds.narrower_than(extent, min_pct) => {
                warn!(
                    low = bounds.low,
                    high = bounds.high,
                    extent,
                    min_pct,
                    ?axis,
                    "Detected content too narrow; not wiping"
                );
                EdgeBounds::full(extent)
            }
            _ => bounds,
        }
    }

    /// Wipe the left and right margins.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn wipe(&self, image: &GrayImage) -> GrayImage {
        let bounds = self.bounds(image, Axis::Horizontal);
        info!(low = bounds.low, high = bounds.high, "Wiping side margins");
        wipe_outside(image, bounds, Axis::Horizontal)
    }

    /// Wipe the top and bottom margins.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn wipe_vertical(&self, image: &GrayImage) -> GrayImage {
        let bounds = self.bounds(image, Axis::Vertical);
        info!(low = bounds.low, high = bounds.high, "Wiping top and bottom margins");
        wipe_outside(image, bounds, Axis::Vertical)
    }
}

/// Copy `image`, setting every column (row, for [`Axis::Vertical`]) outside
/// `bounds` to background. The input is left untouched.
pub fn wipe_outside(image: &GrayImage, bounds: EdgeBounds, axis: Axis) -> GrayImage {
    let mut output = image.clone();
    let extent = match axis {
        Axis::Horizontal => image.width(),
        Axis::Vertical => image.height(),
    };
    if bounds.is_full(extent) {
        return output;
    }

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let index = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        if !bounds.contains(index) {
            *pixel = Luma([BACKGROUND]);
        }
    }
    debug!(?axis, low = bounds.low, high = bounds.high, "Margins wiped");
    output
}
