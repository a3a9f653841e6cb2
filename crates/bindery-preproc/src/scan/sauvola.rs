// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sauvola adaptive binarization over precomputed integral images, plus the
// zero-inverse recolouring used to keep illustrations intact.

use bindery_core::error::{BinderyError, Result};
use bindery_core::types::{
    BACKGROUND, BinarizationParams, FOREGROUND, SAUVOLA_DYNAMIC_RANGE, validate_k,
    validate_odd_window,
};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use super::integral::IntegralImage;

/// Transparent white, emitted for background pixels in zero-inverse output.
pub const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Locally adaptive thresholding.
///
/// For each pixel the threshold is
///
/// ```text
/// T = mean * (1 + k * (stddev / 128 - 1))
/// ```
///
/// where `mean` and `stddev` come from the `window` x `window` neighbourhood
/// centred on the pixel, clipped at the page borders. Pixels at or above `T`
/// are background (255), the rest foreground (0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SauvolaBinarizer {
    k: f64,
    window: u32,
}

impl SauvolaBinarizer {
    /// Validates `k` (within `[0, 1]`) and `window` (positive, odd).
    pub fn new(k: f64, window: u32) -> Result<Self> {
        validate_k(k)?;
        validate_odd_window(window)?;
        Ok(Self { k, window })
    }

    /// Resolve the window for a page `width` pixels wide, then validate.
    pub fn from_params(params: &BinarizationParams, width: u32) -> Result<Self> {
        Self::new(params.k, params.window_for(width))
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// The Sauvola threshold for a window with the given statistics.
    pub fn threshold(&self, mean: f64, stddev: f64) -> f64 {
        mean * (1.0 + self.k * (stddev / SAUVOLA_DYNAMIC_RANGE - 1.0))
    }

    /// Build the integral image for `gray` and binarize it.
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let integrals = IntegralImage::from_gray(gray);
        self.classify(gray, &integrals)
    }

    /// Binarize `gray` using integral images built earlier for the same page.
    #[instrument(skip(self, gray, integrals), fields(k = self.k, window = self.window))]
    pub fn binarize_with(&self, gray: &GrayImage, integrals: &IntegralImage) -> Result<GrayImage> {
        if integrals.dimensions() != gray.dimensions() {
            return Err(BinderyError::dimensions(
                gray.dimensions(),
                integrals.dimensions(),
            ));
        }
        Ok(self.classify(gray, integrals))
    }

    fn classify(&self, gray: &GrayImage, integrals: &IntegralImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        info!(width, height, k = self.k, window = self.window, "Applying Sauvola binarization");

        if width == 0 || height == 0 {
            return GrayImage::new(width, height);
        }

        let source = gray.as_raw();
        let row_len = width as usize;
        let mut output = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));

        // Rows write disjoint slices, so the result does not depend on scheduling.
        output
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, out_row)| {
                let in_row = &source[y * row_len..(y + 1) * row_len];
                for (x, (out, &px)) in out_row.iter_mut().zip(in_row).enumerate() {
                    let (mean, stddev) =
                        integrals.mean_stddev_centred(x as u32, y as u32, self.window);
                    let threshold = self.threshold(mean, stddev);
                    *out = if px as f64 >= threshold { BACKGROUND } else { FOREGROUND };
                }
            });

        let foreground = output.as_raw().iter().filter(|&&px| px == FOREGROUND).count();
        debug!(foreground, "Binarization complete");
        output
    }
}

/// Recolour a binarized page: foreground pixels take their colour from the
/// pixel-aligned `colour` source, background becomes [`TRANSPARENT`].
///
/// Fails with [`BinderyError::DimensionMismatch`] when the two images differ
/// in size.
#[instrument(skip_all, fields(width = binary.width(), height = binary.height()))]
pub fn zero_inverse(binary: &GrayImage, colour: &RgbaImage) -> Result<RgbaImage> {
    if binary.dimensions() != colour.dimensions() {
        return Err(BinderyError::dimensions(
            binary.dimensions(),
            colour.dimensions(),
        ));
    }
    debug!("Applying zero-inverse recolouring");
    Ok(RgbaImage::from_fn(binary.width(), binary.height(), |x, y| {
        if binary.get_pixel(x, y).0[0] == FOREGROUND {
            *colour.get_pixel(x, y)
        } else {
            TRANSPARENT
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::integral::Window;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    /// Brightening ramp with a dark stroke every eighth column.
    fn striped_ramp() -> GrayImage {
        GrayImage::from_fn(64, 32, |x, _| {
            let base = 60 + x * 3;
            let v = if x % 8 == 4 { base - 60 } else { base };
            Luma([v as u8])
        })
    }

    fn foreground_count(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    /// Per-pixel reference that sums every window directly.
    fn naive_sauvola(gray: &GrayImage, k: f64, size: u32) -> GrayImage {
        let (w, h) = gray.dimensions();
        let binarizer = SauvolaBinarizer::new(k, size).unwrap();
        GrayImage::from_fn(w, h, |x, y| {
            let win = Window::centred(x, y, size, w, h);
            let (mut sum, mut sq) = (0u64, 0u64);
            for wy in win.y0..win.y1 {
                for wx in win.x0..win.x1 {
                    let v = gray.get_pixel(wx, wy).0[0] as u64;
                    sum += v;
                    sq += v * v;
                }
            }
            let area = win.area() as f64;
            let mean = sum as f64 / area;
            let stddev = (sq as f64 / area - mean * mean).max(0.0).sqrt();
            let t = binarizer.threshold(mean, stddev);
            Luma([if gray.get_pixel(x, y).0[0] as f64 >= t { 255 } else { 0 }])
        })
    }

    #[test]
    fn uniform_white_page_stays_white() {
        let gray = GrayImage::from_pixel(100, 100, Luma([255u8]));
        let out = SauvolaBinarizer::new(0.5, 15).unwrap().binarize(&gray);
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn uniform_gray_page_has_no_foreground() {
        let gray = GrayImage::from_pixel(40, 30, Luma([90u8]));
        let out = SauvolaBinarizer::new(0.2, 9).unwrap().binarize(&gray);
        assert_eq!(foreground_count(&out), 0);
    }

    #[test]
    fn dark_text_on_light_page_becomes_foreground() {
        let mut gray = GrayImage::from_pixel(60, 60, Luma([230u8]));
        draw_filled_rect_mut(&mut gray, Rect::at(25, 20).of_size(4, 20), Luma([20u8]));
        let out = SauvolaBinarizer::new(0.3, 15).unwrap().binarize(&gray);
        assert_eq!(out.get_pixel(26, 30).0[0], FOREGROUND);
        assert_eq!(out.get_pixel(5, 5).0[0], BACKGROUND);
        assert_eq!(out.get_pixel(45, 50).0[0], BACKGROUND);
    }

    #[test]
    fn matches_direct_window_sums() {
        let gray = striped_ramp();
        for &(k, size) in &[(0.5, 15), (0.2, 7), (0.0, 3)] {
            let fast = SauvolaBinarizer::new(k, size).unwrap().binarize(&gray);
            assert_eq!(fast, naive_sauvola(&gray, k, size), "k={k} window={size}");
        }
    }

    #[test]
    fn single_row_and_column_pages_keep_their_shape() {
        for (w, h) in [(17, 1), (1, 13)] {
            let gray = GrayImage::from_fn(w, h, |x, y| Luma([((x + y) * 13) as u8]));
            let out = SauvolaBinarizer::new(0.4, 5).unwrap().binarize(&gray);
            assert_eq!(out.dimensions(), (w, h));
            assert_eq!(out, naive_sauvola(&gray, 0.4, 5));
        }
    }

    #[test]
    fn output_is_deterministic() {
        let gray = striped_ramp();
        let binarizer = SauvolaBinarizer::new(0.4, 11).unwrap();
        let first = binarizer.binarize(&gray);
        for _ in 0..3 {
            assert_eq!(binarizer.binarize(&gray).as_raw(), first.as_raw());
        }
    }

    #[test]
    fn foreground_shrinks_as_k_grows() {
        let gray = striped_ramp();
        let integrals = IntegralImage::from_gray(&gray);
        let counts: Vec<usize> = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]
            .iter()
            .map(|&k| {
                let out = SauvolaBinarizer::new(k, 15)
                    .unwrap()
                    .binarize_with(&gray, &integrals)
                    .unwrap();
                foreground_count(&out)
            })
            .collect();
        assert!(
            counts.windows(2).all(|pair| pair[1] <= pair[0]),
            "counts not monotone: {counts:?}"
        );
        assert!(counts[0] > counts[counts.len() - 1], "counts flat: {counts:?}");
    }

    #[test]
    fn k_zero_thresholds_at_local_mean() {
        let binarizer = SauvolaBinarizer::new(0.0, 5).unwrap();
        assert_eq!(binarizer.threshold(140.0, 60.0), 140.0);
    }

    #[test]
    fn invalid_parameters_rejected_up_front() {
        assert!(matches!(
            SauvolaBinarizer::new(0.5, 14),
            Err(BinderyError::InvalidParameter(_))
        ));
        assert!(SauvolaBinarizer::new(-0.2, 15).is_err());
        assert!(SauvolaBinarizer::new(0.5, 0).is_err());
    }

    #[test]
    fn window_derived_from_width() {
        let params = BinarizationParams::default();
        let binarizer = SauvolaBinarizer::from_params(&params, 1800).unwrap();
        assert_eq!(binarizer.window(), 31);
    }

    #[test]
    fn mismatched_integrals_rejected() {
        let gray = GrayImage::new(10, 10);
        let other = IntegralImage::from_gray(&GrayImage::new(10, 11));
        let result = SauvolaBinarizer::new(0.5, 3).unwrap().binarize_with(&gray, &other);
        assert!(matches!(result, Err(BinderyError::DimensionMismatch { .. })));
    }

    #[test]
    fn zero_inverse_keeps_foreground_colour() {
        let binary = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 0 } else { 255 }]));
        let colour = RgbaImage::from_pixel(4, 1, Rgba([200, 10, 30, 255]));
        let out = zero_inverse(&binary, &colour).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgba([200, 10, 30, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([200, 10, 30, 255]));
        assert_eq!(*out.get_pixel(2, 0), TRANSPARENT);
        assert_eq!(*out.get_pixel(3, 0), TRANSPARENT);
    }

    #[test]
    fn zero_inverse_checks_alignment() {
        let binary = GrayImage::new(4, 4);
        let colour = RgbaImage::new(4, 5);
        assert!(matches!(
            zero_inverse(&binary, &colour),
            Err(BinderyError::DimensionMismatch { .. })
        ));
    }
}
