// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport-fit geometry for the enlarged image.
//!
//! The enlarged image is the thumbnail itself, laid out at its displayed size
//! inside a fixed full-viewport overlay and then moved with a
//! `translate3d(..) scale3d(..)` transform. Scaling happens about the image
//! centre, so the translation combines the centre shift caused by scaling with
//! the screen offset that centres the scaled image in the viewport.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Size};
//! use understory_lightbox::{SourceImage, ViewportState, fit_to_viewport};
//!
//! let image = SourceImage {
//!     natural_size: Size::new(2000.0, 1000.0),
//!     displayed_size: Size::new(200.0, 100.0),
//!     origin: Point::new(40.0, 60.0),
//! };
//! let viewport = ViewportState::new(Size::new(1024.0, 768.0));
//!
//! let geometry = fit_to_viewport(&image, &viewport).unwrap();
//! assert_eq!(geometry.final_size, Size::new(984.0, 492.0));
//! assert!(!geometry.overflows_vertically);
//! assert_eq!(geometry.ratio, 4.92);
//! ```

use alloc::format;
use alloc::string::String;

use kurbo::{Affine, Point, Size, Vec2};

use crate::error::LightboxError;

/// Horizontal gap kept between the enlarged image and each viewport edge.
pub const PADDING_X: f64 = 20.0;

/// Vertical gap kept above (and, for tall images, below) the enlarged image.
pub const PADDING_Y: f64 = 10.0;

/// The thumbnail being previewed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SourceImage {
    /// Intrinsic pixel size of the image resource.
    pub natural_size: Size,
    /// Laid-out size of the thumbnail.
    pub displayed_size: Size,
    /// Top-left of the thumbnail's bounding box, relative to the viewport.
    pub origin: Point,
}

/// Viewport and body measurements, read at interaction time.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ViewportState {
    /// Visible viewport size (excluding scrollbars).
    pub size: Size,
    /// Width of a vertical scrollbar on this platform; `0` for overlay scrollbars.
    pub scrollbar_width: f64,
    /// The document is taller than the viewport.
    pub document_overflows: bool,
    /// The body's inline `overflow-y` is `auto`.
    pub body_overflow_auto: bool,
    /// The body's current inline `padding-right`, in pixels.
    pub body_padding_right: f64,
}

impl ViewportState {
    /// Creates a viewport of `size` with no scrollbar and no body overflow.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Result of fitting a [`SourceImage`] into a [`ViewportState`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Size of the enlarged image on screen.
    pub final_size: Size,
    /// Scale factor from displayed size to final size.
    pub ratio: f64,
    /// Translation applied to the enlarged image (before scaling about its centre).
    pub offset: Vec2,
    /// The enlarged image is taller than the viewport.
    pub overflows_vertically: bool,
    /// The enlarged image does not fit with vertical padding and is pinned to the top.
    pub needs_bottom_padding: bool,
    /// Body `padding-right` that keeps content from shifting once the
    /// scrollbar is hidden, or `None` when no compensation is needed.
    pub padding_right: Option<f64>,
}

impl Geometry {
    /// Renders [`Geometry::padding_right`] as an inline CSS value (`""` when absent).
    #[must_use]
    pub fn padding_right_css(&self) -> String {
        self.padding_right.map(px).unwrap_or_default()
    }
}

/// Fits `image` into `viewport`.
///
/// The final width is the natural width capped at the viewport width minus
/// [`PADDING_X`] on each side; the height follows the natural aspect ratio.
/// Images that fit vertically (with [`PADDING_Y`] above and below) are centred;
/// taller ones are pinned [`PADDING_Y`] from the top and flagged as needing
/// bottom padding. When the image overflows vertically, the horizontal centre
/// accounts for the scrollbar that appears inside the overlay.
pub fn fit_to_viewport(
    image: &SourceImage,
    viewport: &ViewportState,
) -> Result<Geometry, LightboxError> {
    let natural = image.natural_size;
    let displayed = image.displayed_size;
    if !is_positive(natural.width)
        || !is_positive(natural.height)
        || !is_positive(displayed.width)
        || !is_positive(displayed.height)
    {
        return Err(LightboxError::DegenerateImage {
            natural_width: natural.width,
            natural_height: natural.height,
            displayed_width: displayed.width,
            displayed_height: displayed.height,
        });
    }

    let view = viewport.size;
    let available_width = view.width - PADDING_X * 2.0;
    if !is_positive(available_width) {
        return Err(LightboxError::ViewportTooSmall { width: view.width });
    }

    let final_width = available_width.min(natural.width);
    let final_height = final_width * (natural.height / natural.width);
    let overflows_vertically = final_height > view.height;

    let (screen_top, needs_bottom_padding) = if final_height + PADDING_Y * 2.0 > view.height {
        (PADDING_Y, true)
    } else {
        ((view.height - final_height) / 2.0, false)
    };
    let scrollbar = if overflows_vertically {
        viewport.scrollbar_width
    } else {
        0.0
    };
    let screen_left = (abs_diff(view.width, final_width) - scrollbar) / 2.0;

    let offset = Vec2::new(
        (final_width - displayed.width) / 2.0 + screen_left,
        (final_height - displayed.height) / 2.0 + screen_top,
    );

    let padding_right = (viewport.scrollbar_width > 0.0
        && (viewport.document_overflows || viewport.body_overflow_auto))
        .then(|| viewport.body_padding_right + viewport.scrollbar_width);

    Ok(Geometry {
        final_size: Size::new(final_width, final_height),
        ratio: final_width / displayed.width,
        offset,
        overflows_vertically,
        needs_bottom_padding,
        padding_right,
    })
}

/// Translation plus uniform scale for the enlarged image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageTransform {
    /// Translation in CSS pixels.
    pub translate: Vec2,
    /// Uniform scale about the image centre.
    pub scale: f64,
}

impl ImageTransform {
    /// The unscaled transform that lays the enlarged image exactly over the thumbnail.
    #[must_use]
    pub fn collapsed(origin: Point) -> Self {
        Self {
            translate: origin.to_vec2(),
            scale: 1.0,
        }
    }

    /// The scaled, centred transform for an open preview.
    #[must_use]
    pub fn expanded(geometry: &Geometry) -> Self {
        Self {
            translate: geometry.offset,
            scale: geometry.ratio,
        }
    }

    /// Equivalent affine for an element of `size`, scaling about its centre
    /// the way CSS does with the default `transform-origin`.
    #[must_use]
    pub fn to_affine(&self, size: Size) -> Affine {
        let centre = Vec2::new(size.width / 2.0, size.height / 2.0);
        Affine::translate(self.translate + centre)
            * Affine::scale(self.scale)
            * Affine::translate(-centre)
    }
}

/// Formats a pixel length the way inline styles expect it.
pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn abs_diff(a: f64, b: f64) -> f64 {
    if a >= b { a - b } else { b - a }
}
