// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BinderyError, Result};
use crate::types::{BinarizationParams, WipeParams, validate_k};

/// Sensitivity levels tried by multi-level binarization when none are configured.
pub const DEFAULT_K_SEQUENCE: [f64; 5] = [0.2, 0.3, 0.4, 0.5, 0.6];

/// Settings for one preprocessing run. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocConfig {
    pub binarization: BinarizationParams,
    pub wipe: WipeParams,
    /// Whether to wipe left/right margins after binarizing.
    pub wipe_enabled: bool,
    /// Whether to also wipe top/bottom margins.
    pub vertical_wipe: bool,
    /// Ordered k values for multi-level binarization.
    pub k_sequence: Vec<f64>,
}

impl Default for PreprocConfig {
    fn default() -> Self {
        Self {
            binarization: BinarizationParams::default(),
            wipe: WipeParams::default(),
            wipe_enabled: true,
            vertical_wipe: false,
            k_sequence: DEFAULT_K_SEQUENCE.to_vec(),
        }
    }
}

impl PreprocConfig {
    /// Parse a JSON config file. The result is not validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check every parameter, including the k sequence.
    pub fn validate(&self) -> Result<()> {
        self.binarization.validate()?;
        self.wipe.validate()?;
        validate_k_sequence(&self.k_sequence)
    }
}

/// A k sequence must be non-empty, every entry valid, and free of duplicates.
pub fn validate_k_sequence(ks: &[f64]) -> Result<()> {
    if ks.is_empty() {
        return Err(BinderyError::invalid("k sequence must not be empty"));
    }
    for (i, &k) in ks.iter().enumerate() {
        validate_k(k)?;
        if ks[..i].contains(&k) {
            return Err(BinderyError::invalid(format!(
                "k sequence contains {k} more than once"
            )));
        }
    }
    Ok(())
}
