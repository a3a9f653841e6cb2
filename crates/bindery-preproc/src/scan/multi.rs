// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-level binarization — one integral-image build per page, then a
// Sauvola → edge detection → wipe pass for each sensitivity level.

use bindery_core::config::PreprocConfig;
use bindery_core::error::{BinderyError, Result};
use bindery_core::types::{Axis, BinarizationMode, EdgeBounds, auto_window_size};
use image::{DynamicImage, GrayImage, RgbaImage};
use tracing::{debug, info, instrument};

use super::integral::{IntegralBuilder, IntegralImage, SummedAreaBuilder};
use super::sauvola::{SauvolaBinarizer, zero_inverse};
use super::wipe::{Wiper, wipe_outside};

/// One binarization of a page.
#[derive(Debug, Clone)]
pub struct LevelOutput {
    pub k: f64,
    /// Left/right content bounds used for wiping (full width when not wiped).
    pub bounds: EdgeBounds,
    /// Top/bottom bounds, when vertical wiping is enabled.
    pub vertical_bounds: Option<EdgeBounds>,
    /// `ImageLuma8` in binary mode, `ImageRgba8` in zero-inverse mode.
    pub image: DynamicImage,
}

/// Runs the preprocessing pipeline at several `k` values over one page.
///
/// Integral images are built exactly once per [`run`](Self::run), through the
/// configured [`IntegralBuilder`], however many levels are requested.
#[derive(Debug, Clone)]
pub struct MultiLevelBinarizer<B = SummedAreaBuilder> {
    builder: B,
    ks: Vec<f64>,
    window: Option<u32>,
    mode: BinarizationMode,
    wiper: Option<Wiper>,
    vertical: bool,
}

impl MultiLevelBinarizer {
    pub fn from_config(config: &PreprocConfig) -> Result<Self> {
        Self::with_builder(SummedAreaBuilder, config)
    }
}

impl<B: IntegralBuilder> MultiLevelBinarizer<B> {
    /// Validates the whole config, k sequence included, before any pixel work.
    pub fn with_builder(builder: B, config: &PreprocConfig) -> Result<Self> {
        config.validate()?;
        let wiper = if config.wipe_enabled {
            Some(Wiper::new(&config.wipe)?)
        } else {
            None
        };
        Ok(Self {
            builder,
            ks: config.k_sequence.clone(),
            window: config.binarization.window,
            mode: config.binarization.mode,
            wiper,
            vertical: config.vertical_wipe,
        })
    }

    pub fn k_sequence(&self) -> &[f64] {
        &self.ks
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Produce one output per configured `k`, in order.
    ///
    /// `colour` is required in zero-inverse mode and must match `gray` in
    /// size; it is ignored in binary mode.
    #[instrument(
        skip_all,
        fields(width = gray.width(), height = gray.height(), levels = self.ks.len())
    )]
    pub fn run(&self, gray: &GrayImage, colour: Option<&RgbaImage>) -> Result<Vec<LevelOutput>> {
        let colour = self.check_colour(gray, colour)?;
        let window = self.window.unwrap_or_else(|| auto_window_size(gray.width()));
        let binarizers = self
            .ks
            .iter()
            .map(|&k| SauvolaBinarizer::new(k, window))
            .collect::<Result<Vec<_>>>()?;

        info!(window, mode = %self.mode, "Building integral images");
        let integrals = self.builder.build(gray);

        binarizers
            .iter()
            .map(|binarizer| self.level(gray, &integrals, binarizer, colour))
            .collect()
    }

    fn check_colour<'a>(
        &self,
        gray: &GrayImage,
        colour: Option<&'a RgbaImage>,
    ) -> Result<Option<&'a RgbaImage>> {
        match (self.mode, colour) {
            (BinarizationMode::Binary, _) => Ok(None),
            (BinarizationMode::ZeroInverse, None) => Err(BinderyError::invalid(
                "zero-inverse output needs a colour source image",
            )),
            (BinarizationMode::ZeroInverse, Some(colour)) => {
                if colour.dimensions() != gray.dimensions() {
                    return Err(BinderyError::dimensions(
                        gray.dimensions(),
                        colour.dimensions(),
                    ));
                }
                Ok(Some(colour))
            }
        }
    }

    fn level(
        &self,
        gray: &GrayImage,
        integrals: &IntegralImage,
        binarizer: &SauvolaBinarizer,
        colour: Option<&RgbaImage>,
    ) -> Result<LevelOutput> {
        let mut binary = binarizer.binarize_with(gray, integrals)?;
        let mut bounds = EdgeBounds::full(gray.width());
        let mut vertical_bounds = None;

        if let Some(wiper) = &self.wiper {
            bounds = wiper.bounds(&binary, Axis::Horizontal);
            binary = wipe_outside(&binary, bounds, Axis::Horizontal);
            if self.vertical {
                let rows = wiper.bounds(&binary, Axis::Vertical);
                binary = wipe_outside(&binary, rows, Axis::Vertical);
                vertical_bounds = Some(rows);
            }
        }

        let image = match colour {
            Some(colour) => DynamicImage::ImageRgba8(zero_inverse(&binary, colour)?),
            None => DynamicImage::ImageLuma8(binary),
        };
        debug!(k = binarizer.k(), low = bounds.low, high = bounds.high, "Level complete");

        Ok(LevelOutput {
            k: binarizer.k(),
            bounds,
            vertical_bounds,
            image,
        })
    }
}

/// Run the pipeline once at the configured `k`.
pub fn preprocess_page(
    config: &PreprocConfig,
    gray: &GrayImage,
    colour: Option<&RgbaImage>,
) -> Result<LevelOutput> {
    let single = PreprocConfig {
        k_sequence: vec![config.binarization.k],
        ..config.clone()
    };
    let pipeline = MultiLevelBinarizer::from_config(&single)?;
    let colour = pipeline.check_colour(gray, colour)?;
    let window = pipeline.window.unwrap_or_else(|| auto_window_size(gray.width()));
    let binarizer = SauvolaBinarizer::new(config.binarization.k, window)?;
    let integrals = pipeline.builder.build(gray);
    pipeline.level(gray, &integrals, &binarizer, colour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::wipe::Wiper;
    use image::{Luma, Rgba};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingBuilder {
        calls: Cell<usize>,
    }

    impl IntegralBuilder for CountingBuilder {
        fn build(&self, gray: &GrayImage) -> IntegralImage {
            self.calls.set(self.calls.get() + 1);
            IntegralImage::from_gray(gray)
        }
    }

    /// Light page with six lines of "text" in the middle and a dark strip of
    /// facing-page bleed on the right.
    fn scanned_page() -> GrayImage {
        let mut page = GrayImage::from_pixel(160, 100, Luma([215u8]));
        for line in 0..6 {
            draw_filled_rect_mut(
                &mut page,
                Rect::at(30, 20 + line * 12).of_size(100, 4),
                Luma([40u8]),
            );
        }
        draw_filled_rect_mut(&mut page, Rect::at(150, 0).of_size(10, 100), Luma([60u8]));
        page
    }

    fn config(ks: &[f64]) -> PreprocConfig {
        let mut config = PreprocConfig::default();
        config.k_sequence = ks.to_vec();
        config.binarization.window = Some(15);
        config
    }

    #[test]
    fn integrals_built_once_for_any_number_of_levels() {
        let page = scanned_page();
        for ks in [vec![0.2, 0.5], vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]] {
            let multi = MultiLevelBinarizer::with_builder(CountingBuilder::default(), &config(&ks))
                .unwrap();
            let outputs = multi.run(&page, None).unwrap();
            assert_eq!(outputs.len(), ks.len());
            assert_eq!(multi.builder().calls.get(), 1);
        }
    }

    #[test]
    fn each_level_matches_a_standalone_pass() {
        let page = scanned_page();
        let cfg = config(&[0.2, 0.5]);
        let outputs = MultiLevelBinarizer::from_config(&cfg).unwrap().run(&page, None).unwrap();
        let wiper = Wiper::new(&cfg.wipe).unwrap();

        for (output, &k) in outputs.iter().zip(&[0.2, 0.5]) {
            assert_eq!(output.k, k);
            let binary = SauvolaBinarizer::new(k, 15).unwrap().binarize(&page);
            let expected = wiper.wipe(&binary);
            assert_eq!(output.image, DynamicImage::ImageLuma8(expected));
        }
    }

    #[test]
    fn bleed_strip_is_wiped() {
        let page = scanned_page();
        let outputs = MultiLevelBinarizer::from_config(&config(&[0.3]))
            .unwrap()
            .run(&page, None)
            .unwrap();
        let level = &outputs[0];
        assert!(level.bounds.high <= 150, "{:?}", level.bounds);
        let out = level.image.as_luma8().unwrap();
        assert!((150..160).all(|x| out.get_pixel(x, 50).0[0] == 255));
        assert_eq!(out.get_pixel(31, 45).0[0], 0);
    }

    #[test]
    fn wipe_can_be_disabled() {
        let page = scanned_page();
        let mut cfg = config(&[0.3]);
        cfg.wipe_enabled = false;
        let level = preprocess_page(&cfg, &page, None).unwrap();
        let binary = SauvolaBinarizer::new(0.3, 15).unwrap().binarize(&page);
        assert_eq!(level.image, DynamicImage::ImageLuma8(binary));
        assert_eq!(level.bounds, EdgeBounds::full(160));
    }

    #[test]
    fn single_pass_runs_at_the_configured_k() {
        let page = scanned_page();
        let mut cfg = config(&[]);
        cfg.binarization.k = 0.3;
        let level = preprocess_page(&cfg, &page, None).unwrap();

        let expected = MultiLevelBinarizer::from_config(&config(&[0.3]))
            .unwrap()
            .run(&page, None)
            .unwrap();
        assert_eq!(level.k, 0.3);
        assert_eq!(level.bounds, expected[0].bounds);
        assert_eq!(level.image, expected[0].image);
    }

    #[test]
    fn vertical_bounds_reported_when_enabled() {
        let page = scanned_page();
        let mut cfg = config(&[0.3]);
        cfg.vertical_wipe = true;
        let level = preprocess_page(&cfg, &page, None).unwrap();
        assert!(level.vertical_bounds.is_some());
    }

    #[test]
    fn zero_inverse_needs_aligned_colour() {
        let page = scanned_page();
        let mut cfg = config(&[0.3]);
        cfg.binarization.mode = BinarizationMode::ZeroInverse;
        let multi = MultiLevelBinarizer::with_builder(CountingBuilder::default(), &cfg).unwrap();

        assert!(matches!(
            multi.run(&page, None),
            Err(BinderyError::InvalidParameter(_))
        ));
        let wrong = RgbaImage::new(159, 100);
        assert!(matches!(
            multi.run(&page, Some(&wrong)),
            Err(BinderyError::DimensionMismatch { .. })
        ));
        // Rejected before the integral build.
        assert_eq!(multi.builder().calls.get(), 0);

        let colour = RgbaImage::from_pixel(160, 100, Rgba([180, 20, 20, 255]));
        let outputs = multi.run(&page, Some(&colour)).unwrap();
        let rgba = outputs[0].image.as_rgba8().unwrap();
        assert_eq!(*rgba.get_pixel(31, 45), Rgba([180, 20, 20, 255]));
        assert_eq!(rgba.get_pixel(5, 5).0[3], 0);
    }

    #[test]
    fn bad_k_sequence_rejected_up_front() {
        assert!(MultiLevelBinarizer::from_config(&config(&[])).is_err());
        assert!(MultiLevelBinarizer::from_config(&config(&[0.2, 0.2])).is_err());
        assert!(MultiLevelBinarizer::from_config(&config(&[0.2, 7.0])).is_err());
    }
}
