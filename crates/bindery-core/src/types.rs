// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bindery preprocessing pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{BinderyError, Result};

/// Fixed dynamic-range half-width used by the Sauvola threshold.
pub const SAUVOLA_DYNAMIC_RANGE: f64 = 128.0;

/// Intensity of a background (white) pixel.
pub const BACKGROUND: u8 = 255;

/// Intensity of a foreground (black) pixel.
pub const FOREGROUND: u8 = 0;

/// How binarized pixels are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinarizationMode {
    /// Foreground black, background white, single channel.
    #[default]
    Binary,
    /// Foreground keeps its colour from a pixel-aligned colour source,
    /// background becomes transparent. RGBA output.
    #[serde(rename = "zeroinv")]
    ZeroInverse,
}

impl BinarizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::ZeroInverse => "zeroinv",
        }
    }
}

impl std::fmt::Display for BinarizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BinarizationMode {
    type Err = BinderyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(Self::Binary),
            "zeroinv" => Ok(Self::ZeroInverse),
            other => Err(BinderyError::invalid(format!(
                "unknown binarization mode '{other}' (expected 'binary' or 'zeroinv')"
            ))),
        }
    }
}

/// Which axis content bounds are detected along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left/right bounds: scans columns.
    Horizontal,
    /// Top/bottom bounds: scans rows.
    Vertical,
}

/// Parameters for Sauvola binarization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizationParams {
    /// Sensitivity constant. Lower values are more permissive toward faint text.
    pub k: f64,
    /// Window size in pixels. Derived from the page width when unset.
    pub window: Option<u32>,
    pub mode: BinarizationMode,
}

impl Default for BinarizationParams {
    fn default() -> Self {
        Self {
            k: 0.5,
            window: None,
            mode: BinarizationMode::Binary,
        }
    }
}

impl BinarizationParams {
    pub fn validate(&self) -> Result<()> {
        validate_k(self.k)?;
        if let Some(window) = self.window {
            validate_odd_window(window)?;
        }
        Ok(())
    }

    /// The window size to use for a page `width` pixels wide.
    pub fn window_for(&self, width: u32) -> u32 {
        self.window.unwrap_or_else(|| auto_window_size(width))
    }
}

/// `width / 60`, bumped to the next odd value.
pub fn auto_window_size(width: u32) -> u32 {
    let size = width / 60;
    if size % 2 == 0 { size + 1 } else { size }
}

/// `k` must be finite and within `[0, 1]`.
pub fn validate_k(k: f64) -> Result<()> {
    if !k.is_finite() || !(0.0..=1.0).contains(&k) {
        return Err(BinderyError::invalid(format!(
            "k must be within [0, 1], got {k}"
        )));
    }
    Ok(())
}

/// Centred windows need a positive odd size.
pub fn validate_odd_window(size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(BinderyError::invalid(format!(
            "window size must be a positive odd number, got {size}"
        )));
    }
    Ok(())
}

/// Parameters for content-area detection and wiping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WipeParams {
    /// Width of the scanning window in pixels.
    pub window: u32,
    /// Dark-pixel proportion at or below which a window counts as a gap.
    pub threshold: f64,
    /// Reject bounds narrower than this percentage of the page.
    pub min_width_pct: Option<u32>,
    /// Start each scan this percentage of the extent away from the centre.
    pub centre_offset_pct: u32,
}

impl Default for WipeParams {
    fn default() -> Self {
        Self {
            window: 5,
            threshold: 0.05,
            min_width_pct: Some(30),
            centre_offset_pct: 0,
        }
    }
}

impl WipeParams {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(BinderyError::invalid("wipe window must be positive"));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 || self.threshold >= 1.0 {
            return Err(BinderyError::invalid(format!(
                "wipe threshold must be within (0, 1), got {}",
                self.threshold
            )));
        }
        if let Some(pct) = self.min_width_pct.filter(|pct| *pct > 100) {
            return Err(BinderyError::invalid(format!(
                "minimum content width must be at most 100%, got {pct}%"
            )));
        }
        if self.centre_offset_pct > 50 {
            return Err(BinderyError::invalid(format!(
                "centre offset must be at most 50%, got {}%",
                self.centre_offset_pct
            )));
        }
        Ok(())
    }
}

/// Half-open `[low, high)` range of content along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBounds {
    pub low: u32,
    pub high: u32,
}

impl EdgeBounds {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// Bounds covering the whole extent (nothing to wipe).
    pub fn full(extent: u32) -> Self {
        Self { low: 0, high: extent }
    }

    pub fn width(&self) -> u32 {
        self.high.saturating_sub(self.low)
    }

    pub fn contains(&self, index: u32) -> bool {
        index >= self.low && index < self.high
    }

    pub fn is_full(&self, extent: u32) -> bool {
        self.low == 0 && self.high >= extent
    }

    /// Whether the bounds cover less than `min_pct` percent of `extent`.
    pub fn narrower_than(&self, extent: u32, min_pct: u32) -> bool {
        if extent == 0 {
            return false;
        }
        (self.width() as f64 / extent as f64) * 100.0 < min_pct as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_window_is_odd() {
        assert_eq!(auto_window_size(2400), 41);
        assert_eq!(auto_window_size(2460), 41);
        assert_eq!(auto_window_size(2520), 43);
        assert_eq!(auto_window_size(30), 1);
    }

    #[test]
    fn k_outside_unit_range_rejected() {
        assert!(validate_k(0.0).is_ok());
        assert!(validate_k(1.0).is_ok());
        assert!(validate_k(-0.1).is_err());
        assert!(validate_k(1.5).is_err());
        assert!(validate_k(f64::NAN).is_err());
    }

    #[test]
    fn even_or_zero_windows_rejected() {
        assert!(validate_odd_window(15).is_ok());
        assert!(matches!(
            validate_odd_window(16),
            Err(BinderyError::InvalidParameter(_))
        ));
        assert!(validate_odd_window(0).is_err());
    }

    #[test]
    fn wipe_params_reject_bad_threshold() {
        let params = WipeParams {
            threshold: 1.0,
            ..WipeParams::default()
        };
        assert!(params.validate().is_err());
        assert!(WipeParams::default().validate().is_ok());
    }

    #[test]
    fn mode_parses_from_cli_strings() {
        assert_eq!("binary".parse::<BinarizationMode>().unwrap(), BinarizationMode::Binary);
        assert_eq!(
            "zeroinv".parse::<BinarizationMode>().unwrap(),
            BinarizationMode::ZeroInverse
        );
        assert!("otsu".parse::<BinarizationMode>().is_err());
    }

    #[test]
    fn narrow_bounds_detected() {
        let bounds = EdgeBounds::new(35, 60);
        assert!(bounds.narrower_than(100, 30));
        assert!(!bounds.narrower_than(100, 25));
        assert!(EdgeBounds::full(100).is_full(100));
    }
}
