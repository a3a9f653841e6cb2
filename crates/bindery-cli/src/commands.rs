// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations: decode, run the pipeline, encode.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bindery_core::PreprocConfig;
use bindery_core::types::BinarizationMode;
use bindery_preproc::{MultiLevelBinarizer, PageImage, Wiper, preprocess_page};
use image::{DynamicImage, RgbaImage};
use tracing::info;

use crate::args::{BinarizeArgs, MultiArgs, SauvolaFlags, WipeArgs};

/// Load the config file if one was given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PreprocConfig> {
    match path {
        Some(path) => PreprocConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(PreprocConfig::default()),
    }
}

pub fn binarize(mut config: PreprocConfig, args: &BinarizeArgs) -> Result<()> {
    if let Some(k) = args.k {
        config.binarization.k = k;
    }
    if args.no_wipe {
        config.wipe_enabled = false;
    }
    args.sauvola.apply(&mut config);
    args.wipe.apply(&mut config);
    config.validate().context("invalid preprocessing parameters")?;

    let page = load_page(&args.input)?;
    let colour = colour_source(&config, &args.sauvola, &page)?;
    let level = preprocess_page(&config, &page.to_luma8(), colour.as_ref())
        .with_context(|| format!("failed to preprocess {}", args.input.display()))?;

    info!(k = level.k, low = level.bounds.low, high = level.bounds.high, "Page binarized");
    save(level.image, &args.output)
}

pub fn wipe(mut config: PreprocConfig, args: &WipeArgs) -> Result<()> {
    args.wipe.apply(&mut config);
    let wiper = Wiper::new(&config.wipe).context("invalid wipe parameters")?;

    let gray = load_page(&args.input)?.to_luma8();
    let mut wiped = wiper.wipe(&gray);
    if config.vertical_wipe {
        wiped = wiper.wipe_vertical(&wiped);
    }
    save(DynamicImage::ImageLuma8(wiped), &args.output)
}

pub fn multi(mut config: PreprocConfig, args: &MultiArgs) -> Result<()> {
    if let Some(ks) = &args.k_set {
        config.k_sequence = ks.clone();
    }
    if args.no_wipe {
        config.wipe_enabled = false;
    }
    args.sauvola.apply(&mut config);
    args.wipe.apply(&mut config);
    let binarizer =
        MultiLevelBinarizer::from_config(&config).context("invalid preprocessing parameters")?;

    let page = load_page(&args.input)?;
    let colour = colour_source(&config, &args.sauvola, &page)?;
    let levels = binarizer
        .run(&page.to_luma8(), colour.as_ref())
        .with_context(|| format!("failed to preprocess {}", args.input.display()))?;

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    for level in levels {
        let dest = level_output_path(&args.input, &out_dir, level.k);
        info!(k = level.k, dest = %dest.display(), "Writing level");
        save(level.image, &dest)?;
    }
    Ok(())
}

/// `<out_dir>/<stem>_bin<k>.png`
pub fn level_output_path(input: &Path, out_dir: &Path, k: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    out_dir.join(format!("{stem}_bin{k}.png"))
}

fn load_page(path: &Path) -> Result<DynamicImage> {
    PageImage::from_path(path)
        .into_dynamic()
        .with_context(|| format!("failed to load page {}", path.display()))
}

/// The colour image for zero-inverse output: `--colour` if given, else the
/// input page itself. `None` in binary mode.
fn colour_source(
    config: &PreprocConfig,
    flags: &SauvolaFlags,
    page: &DynamicImage,
) -> Result<Option<RgbaImage>> {
    if config.binarization.mode != BinarizationMode::ZeroInverse {
        return Ok(None);
    }
    let colour = match &flags.colour {
        Some(path) => load_page(path)?.to_rgba8(),
        None => page.to_rgba8(),
    };
    Ok(Some(colour))
}

fn save(image: DynamicImage, dest: &Path) -> Result<()> {
    PageImage::from(image)
        .materialize(dest)
        .with_context(|| format!("failed to write {}", dest.display()))
}
