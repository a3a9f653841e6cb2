// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-area edge detection. A window slides outward from the centre of the
// page over a 1-D profile of the binarized image; the first window that is
// almost free of dark pixels marks the gap between the text block and whatever
// lies beyond it (page edge, scanner bed, the facing page).

use bindery_core::error::Result;
use bindery_core::types::{Axis, EdgeBounds, WipeParams};
use image::GrayImage;
use tracing::{debug, instrument};

use super::integral::Profile;

/// Finds the bounds of the text block along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDetector {
    window: u32,
    threshold: f64,
    centre_offset_pct: u32,
}

impl EdgeDetector {
    pub fn new(params: &WipeParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            window: params.window,
            threshold: params.threshold,
            centre_offset_pct: params.centre_offset_pct,
        })
    }

    /// Detect bounds along `axis` of a binarized page.
    pub fn detect_in(&self, image: &GrayImage, axis: Axis) -> EdgeBounds {
        self.detect(&Profile::along(image, axis))
    }

    /// Detect bounds from a column (or row) profile.
    ///
    /// The first window on each side that is nearly free of dark pixels
    /// places the cut half a window into it. Each side falls back to the page
    /// boundary when its scan finds no gap. A blank page, a window wider than
    /// the page, or crossed bounds all yield the full extent.
    #[instrument(skip_all, fields(extent = profile.extent(), window = self.window))]
    pub fn detect(&self, profile: &Profile) -> EdgeBounds {
        let extent = profile.extent();
        let full = EdgeBounds::full(extent);

        if extent == 0 || self.window > extent || profile.is_blank() {
            debug!("Nothing to scan; keeping full extent");
            return full;
        }

        let half = self.window / 2;
        let centre = extent / 2;
        let offset = (extent as u64 * self.centre_offset_pct as u64 / 100) as u32;

        // Right: windows `[x, x + window)` starting at the centre.
        let high = (centre.saturating_add(offset)..=extent - self.window)
            .find(|&x| self.is_gap(profile, x, x + self.window))
            .map(|x| x + half)
            .unwrap_or(extent);

        // Left: windows `[x - window, x)` ending at the centre.
        let low = (self.window..=centre.saturating_sub(offset))
            .rev()
            .find(|&x| self.is_gap(profile, x - self.window, x))
            .map(|x| x - half)
            .unwrap_or(0);

        if low >= high {
            debug!(low, high, "Detected bounds cross; keeping full extent");
            return full;
        }

        debug!(low, high, "Content bounds detected");
        EdgeBounds::new(low, high)
    }

    fn is_gap(&self, profile: &Profile, start: u32, end: u32) -> bool {
        profile.dark_proportion(start, end) <= self.threshold
    }
}
