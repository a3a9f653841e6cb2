// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments. Every tuning flag is optional: unset flags leave the
// value from the config file (or the built-in default) in place.

use std::path::PathBuf;

use bindery_core::PreprocConfig;
use bindery_core::types::BinarizationMode;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bindery",
    version,
    about = "Adaptive binarization and margin wiping for scanned book pages"
)]
pub struct Cli {
    /// JSON config file; flags given on the command line override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Binarize one page with Sauvola thresholding, then wipe its margins.
    Binarize(BinarizeArgs),
    /// Wipe the margins of an already binarized page.
    Wipe(WipeArgs),
    /// Binarize one page at several sensitivity levels.
    Multi(MultiArgs),
}

#[derive(Args, Debug)]
pub struct BinarizeArgs {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Sensitivity constant (lower keeps fainter text).
    #[arg(long)]
    pub k: Option<f64>,

    /// Keep the margins as binarized.
    #[arg(long)]
    pub no_wipe: bool,

    #[command(flatten)]
    pub sauvola: SauvolaFlags,

    #[command(flatten)]
    pub wipe: WipeFlags,
}

#[derive(Args, Debug)]
pub struct WipeArgs {
    pub input: PathBuf,
    pub output: PathBuf,

    #[command(flatten)]
    pub wipe: WipeFlags,
}

#[derive(Args, Debug)]
pub struct MultiArgs {
    pub input: PathBuf,

    /// Directory for the per-level outputs (defaults to the input's directory).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Comma-separated k values, e.g. 0.2,0.3,0.4.
    #[arg(long, value_delimiter = ',')]
    pub k_set: Option<Vec<f64>>,

    /// Keep the margins as binarized.
    #[arg(long)]
    pub no_wipe: bool,

    #[command(flatten)]
    pub sauvola: SauvolaFlags,

    #[command(flatten)]
    pub wipe: WipeFlags,
}

#[derive(Args, Debug, Default)]
pub struct SauvolaFlags {
    /// Window size in pixels, odd (defaults to page width / 60).
    #[arg(long)]
    pub window: Option<u32>,

    /// Output mode: binary or zeroinv.
    #[arg(long)]
    pub mode: Option<BinarizationMode>,

    /// Colour source for zeroinv mode (defaults to the input image).
    #[arg(long)]
    pub colour: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct WipeFlags {
    /// Width of the wipe scanning window in pixels.
    #[arg(long)]
    pub wipe_window: Option<u32>,

    /// Dark-pixel proportion that marks a gap, within (0, 1).
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Minimum content width as a percentage of the page.
    #[arg(long, conflicts_with = "no_min_width")]
    pub min_width: Option<u32>,

    /// Wipe however narrow the detected content is.
    #[arg(long)]
    pub no_min_width: bool,

    /// Start edge scans this percentage away from the centre.
    #[arg(long)]
    pub centre_offset: Option<u32>,

    /// Also wipe top and bottom margins.
    #[arg(long)]
    pub vertical: bool,
}

impl SauvolaFlags {
    pub fn apply(&self, config: &mut PreprocConfig) {
        if let Some(window) = self.window {
            config.binarization.window = Some(window);
        }
        if let Some(mode) = self.mode {
            config.binarization.mode = mode;
        }
    }
}

impl WipeFlags {
    pub fn apply(&self, config: &mut PreprocConfig) {
        if let Some(window) = self.wipe_window {
            config.wipe.window = window;
        }
        if let Some(threshold) = self.threshold {
            config.wipe.threshold = threshold;
        }
        if let Some(pct) = self.min_width {
            config.wipe.min_width_pct = Some(pct);
        }
        if self.no_min_width {
            config.wipe.min_width_pct = None;
        }
        if let Some(pct) = self.centre_offset {
            config.wipe.centre_offset_pct = pct;
        }
        if self.vertical {
            config.vertical_wipe = true;
        }
    }
}
