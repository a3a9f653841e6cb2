// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Integral images (summed-area tables) and the 1-D profiles derived from them.
// Every windowed statistic in the scan pipeline is answered from these tables
// in O(1) per query.

use bindery_core::types::{Axis, BACKGROUND};
use image::GrayImage;

/// Half-open rectangle `[x0, x1) x [y0, y1)` in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Window {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// A `size` x `size` window centred on `(cx, cy)`, clipped to a
    /// `width` x `height` image. Near borders the window shrinks.
    pub fn centred(cx: u32, cy: u32, size: u32, width: u32, height: u32) -> Self {
        let half = size / 2;
        Self {
            x0: cx.saturating_sub(half),
            y0: cy.saturating_sub(half),
            x1: cx.saturating_add(half).saturating_add(1).min(width),
            y1: cy.saturating_add(half).saturating_add(1).min(height),
        }
    }

    pub fn area(&self) -> u64 {
        self.x1.saturating_sub(self.x0) as u64 * self.y1.saturating_sub(self.y0) as u64
    }
}

/// A `(width+1) x (height+1)` summed-area table.
///
/// `at(x, y)` holds the sum of every sample with column `< x` and row `< y`;
/// row 0 and column 0 are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegralGrid {
    width: u32,
    height: u32,
    cells: Vec<u64>,
}

impl IntegralGrid {
    /// Sum table of `gray` on its own, without the squared companion.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = w as usize + 1;
        let mut cells = vec![0u64; stride * (h as usize + 1)];

        let rows = gray.as_raw().chunks_exact(w.max(1) as usize).take(h as usize);
        for (y, row) in rows.enumerate() {
            let mut row_sum = 0u64;
            for (x, &px) in row.iter().enumerate() {
                row_sum += px as u64;
                cells[(y + 1) * stride + x + 1] = row_sum + cells[y * stride + x + 1];
            }
        }

        Self {
            width: w,
            height: h,
            cells,
        }
    }

    fn stride(&self) -> usize {
        self.width as usize + 1
    }

    pub fn at(&self, x: u32, y: u32) -> u64 {
        self.cells[y as usize * self.stride() + x as usize]
    }

    /// Sum of the samples inside `window`.
    ///
    /// `S = I[y1][x1] - I[y0][x1] - I[y1][x0] + I[y0][x0]`, rearranged so the
    /// unsigned arithmetic never dips below zero.
    pub fn sum(&self, window: Window) -> u64 {
        let Window { x0, y0, x1, y1 } = window;
        (self.at(x1, y1) + self.at(x0, y0)) - (self.at(x1, y0) + self.at(x0, y1))
    }

    /// The bottom row: prefix sums of column totals.
    pub fn column_profile(&self) -> Profile {
        let prefix = (0..=self.width).map(|x| self.at(x, self.height)).collect();
        Profile {
            prefix,
            span: self.height,
        }
    }

    /// The rightmost column: prefix sums of row totals.
    pub fn row_profile(&self) -> Profile {
        let prefix = (0..=self.height).map(|y| self.at(self.width, y)).collect();
        Profile {
            prefix,
            span: self.width,
        }
    }
}

/// Sum and squared-sum tables over the same grayscale page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegralImage {
    pub sums: IntegralGrid,
    pub squares: IntegralGrid,
}

impl IntegralImage {
    /// Build both tables in a single top-to-bottom, left-to-right pass.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = w as usize + 1;
        let len = stride * (h as usize + 1);
        let mut sums = vec![0u64; len];
        let mut squares = vec![0u64; len];

        let rows = gray.as_raw().chunks_exact(w.max(1) as usize).take(h as usize);
        for (y, row) in rows.enumerate() {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            let above = y * stride;
            let here = (y + 1) * stride;
            for (x, &px) in row.iter().enumerate() {
                let v = px as u64;
                row_sum += v;
                row_sq += v * v;
                sums[here + x + 1] = row_sum + sums[above + x + 1];
                squares[here + x + 1] = row_sq + squares[above + x + 1];
            }
        }

        Self {
            sums: IntegralGrid {
                width: w,
                height: h,
                cells: sums,
            },
            squares: IntegralGrid {
                width: w,
                height: h,
                cells: squares,
            },
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.sums.width, self.sums.height)
    }

    /// Mean and standard deviation inside `window`.
    ///
    /// Variance is clamped at zero: cancellation in `E[x²] - E[x]²` can leave
    /// a tiny negative value on flat regions.
    pub fn mean_stddev(&self, window: Window) -> (f64, f64) {
        let area = window.area();
        if area == 0 {
            return (0.0, 0.0);
        }
        let area = area as f64;
        let mean = self.sums.sum(window) as f64 / area;
        let variance = self.squares.sum(window) as f64 / area - mean * mean;
        (mean, variance.max(0.0).sqrt())
    }

    /// Mean and standard deviation of the `size` x `size` window centred on
    /// `(x, y)`, clipped at the image borders.
    pub fn mean_stddev_centred(&self, x: u32, y: u32, size: u32) -> (f64, f64) {
        let (w, h) = self.dimensions();
        self.mean_stddev(Window::centred(x, y, size, w, h))
    }
}

/// Construction seam for integral images.
///
/// Multi-level binarization takes a builder so the one expensive
/// precomputation per page can be observed or swapped out.
pub trait IntegralBuilder {
    fn build(&self, gray: &GrayImage) -> IntegralImage;
}

/// The standard sequential summed-area table builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SummedAreaBuilder;

impl IntegralBuilder for SummedAreaBuilder {
    fn build(&self, gray: &GrayImage) -> IntegralImage {
        IntegralImage::from_gray(gray)
    }
}

/// 1-D prefix sums of column (or row) totals.
///
/// `prefix[i]` is the sum of every sample in the first `i` columns (rows);
/// `span` is the length of each column (row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    prefix: Vec<u64>,
    span: u32,
}

impl Profile {
    /// Profile of `gray` along `axis`: the bottom row of its sum table for
    /// columns, the rightmost column for rows.
    pub fn along(gray: &GrayImage, axis: Axis) -> Self {
        let grid = IntegralGrid::from_gray(gray);
        match axis {
            Axis::Horizontal => grid.column_profile(),
            Axis::Vertical => grid.row_profile(),
        }
    }

    /// Number of columns (rows) covered.
    pub fn extent(&self) -> u32 {
        (self.prefix.len() - 1) as u32
    }

    /// Length of each column (row).
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Sum over columns `[start, end)`.
    pub fn sum(&self, start: u32, end: u32) -> u64 {
        self.prefix[end as usize] - self.prefix[start as usize]
    }

    /// Share of dark pixels in columns `[start, end)`.
    ///
    /// Background pixels are 255, so `sum / 255` counts them; everything else
    /// is dark. Empty ranges report 0.
    pub fn dark_proportion(&self, start: u32, end: u32) -> f64 {
        let area = end.saturating_sub(start) as f64 * self.span as f64;
        if area == 0.0 {
            return 0.0;
        }
        let background = self.sum(start, end) as f64 / BACKGROUND as f64;
        1.0 - background / area
    }

    /// True when every sample is background.
    pub fn is_blank(&self) -> bool {
        let total = self.prefix[self.prefix.len() - 1];
        total == self.extent() as u64 * self.span as u64 * BACKGROUND as u64
    }
}
