// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-binding configuration and target validation.

use crate::error::{InvalidTarget, LightboxError};
use crate::style::DEFAULT_Z_INDEX;

/// Options supplied when binding a preview to a thumbnail.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PreviewOptions {
    /// Minimum displayed width for a thumbnail to get a preview.
    ///
    /// Narrower thumbnails are left alone. `None` accepts any width.
    pub max: Option<f64>,
    /// Stacking level of the overlay.
    ///
    /// Applied inline to this preview's backdrop. The shared stylesheet is
    /// installed once per document and keeps the value of the first preview
    /// that opened, which only matters for overlays built without the inline
    /// style.
    pub z_index: u32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max: None,
            z_index: DEFAULT_Z_INDEX,
        }
    }
}

impl PreviewOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum displayed width.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the overlay stacking level.
    #[must_use]
    pub fn with_z_index(mut self, z_index: u32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Checks whether `thumbnail` may carry a preview under these options.
    pub fn check(&self, thumbnail: &ThumbnailInfo<'_>) -> Result<(), LightboxError> {
        if !thumbnail.tag.eq_ignore_ascii_case("img") {
            return Err(InvalidTarget::NotAnImage {
                tag: thumbnail.tag.to_ascii_lowercase(),
            }
            .into());
        }
        if thumbnail.src.is_empty() {
            return Err(InvalidTarget::MissingSource.into());
        }
        if let Some(max) = self.max {
            if thumbnail.displayed_width < max {
                return Err(InvalidTarget::BelowThreshold {
                    width: thumbnail.displayed_width,
                    max,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// What a binding knows about its element once it has loaded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThumbnailInfo<'a> {
    /// Element tag name, in any case.
    pub tag: &'a str,
    /// Resolved image source; empty when missing.
    pub src: &'a str,
    /// Laid-out width.
    pub displayed_width: f64,
}
