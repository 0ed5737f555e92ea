// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for preview binding and opening.

use alloc::string::String;

use thiserror::Error;

use crate::lock::PreviewId;

/// Why a thumbnail cannot carry a preview.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidTarget {
    /// The bound element is not an `<img>`.
    #[error("element <{tag}> is not an image")]
    NotAnImage {
        /// Lower-cased tag name of the bound element.
        tag: String,
    },
    /// The image has no `src`.
    #[error("image has no source")]
    MissingSource,
    /// The displayed width is below the configured `max` threshold.
    #[error("displayed width {width}px is below the {max}px threshold")]
    BelowThreshold {
        /// Displayed width of the thumbnail.
        width: f64,
        /// Configured threshold.
        max: f64,
    },
}

/// Errors produced while attaching or opening a preview.
///
/// All of these are local and non-fatal: the page stays usable and the preview
/// simply does not activate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LightboxError {
    /// The bound element cannot carry a preview.
    #[error("invalid preview target: {0}")]
    InvalidTarget(#[from] InvalidTarget),
    /// Natural or displayed dimensions are zero, negative, or not finite.
    #[error(
        "degenerate image: natural {natural_width}x{natural_height}, displayed {displayed_width}x{displayed_height}"
    )]
    DegenerateImage {
        /// Intrinsic width.
        natural_width: f64,
        /// Intrinsic height.
        natural_height: f64,
        /// Laid-out width.
        displayed_width: f64,
        /// Laid-out height.
        displayed_height: f64,
    },
    /// The viewport has no room left once horizontal padding is removed.
    #[error("viewport {width}px wide leaves no room for a preview")]
    ViewportTooSmall {
        /// Visible viewport width.
        width: f64,
    },
    /// A preview is already open (or opening) and holds the page body.
    #[error("preview {holder:?} is already open")]
    ReentrantOpen {
        /// The preview currently holding the body lock.
        holder: PreviewId,
    },
}
