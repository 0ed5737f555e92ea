// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylesheet and inline style text for the overlay.
//!
//! The overlay relies on a small stylesheet that is inserted into the page
//! once (see [`STYLE_ELEMENT_ID`]) and on inline styles written to the
//! enlarged image on every phase change.

use alloc::format;
use alloc::string::String;

use crate::geometry::ImageTransform;

/// Id of the injected `<style>` element; its presence means the stylesheet is installed.
pub const STYLE_ELEMENT_ID: &str = "understory-lightbox-styles";

/// Fixed, full-viewport backdrop element.
pub const VIEW_CLASS: &str = "image-view";
/// Scroll container inside the backdrop.
pub const INNER_CLASS: &str = "image-inner";
/// The enlarged image.
pub const IMAGE_CLASS: &str = "image-view-img";
/// Set on the backdrop while the preview is expanding or open.
pub const ACTIVE_CLASS: &str = "is-active";
/// Set on the backdrop while the preview shrinks back.
pub const SHRINKING_CLASS: &str = "is-shrinking";
/// Set on the body to hide its overflow while a preview holds it.
pub const HIDE_OVERFLOW_CLASS: &str = "img-preview--hideOverflow";
/// Set on the backdrop when the enlarged image is pinned to the top.
pub const NEED_PADDING_BOTTOM_CLASS: &str = "img-preview-needPaddingBottom";

/// Default stacking level of the overlay.
pub const DEFAULT_Z_INDEX: u32 = 2000;

/// Returns the overlay stylesheet for the given stacking level.
#[must_use]
pub fn stylesheet(z_index: u32) -> String {
    format!(
        "body.{HIDE_OVERFLOW_CLASS} {{
  overflow: hidden;
}}
.{NEED_PADDING_BOTTOM_CLASS} {{
  padding-bottom: 10px;
}}
.{VIEW_CLASS} {{
  position: fixed;
  top: 0;
  right: 0;
  bottom: 0;
  left: 0;
  z-index: {z_index};
  overflow: hidden;
  transition: background-color .2s ease-in-out;
  -webkit-transition: background-color .2s ease-in-out;
}}
.{VIEW_CLASS}.{ACTIVE_CLASS} {{
  background-color: rgba(26,26,26,.65);
}}
.{INNER_CLASS} {{
  height: 100%;
}}
.{IMAGE_CLASS} {{
  transition: transform .3s ease-in-out,-webkit-transform .3s ease-in-out;
}}
"
    )
}

/// Returns the inline style for the enlarged image.
///
/// `width` is the thumbnail's displayed width; the transform scales from there.
#[must_use]
pub fn image_style(width: f64, transform: ImageTransform) -> String {
    let ImageTransform { translate, scale } = transform;
    format!(
        "width: {width}px; transform: translate3d({}px, {}px, 0px) scale3d({scale}, {scale}, 1);",
        translate.x, translate.y
    )
}

/// Parses an inline CSS length the way `parseInt` does.
///
/// Leading whitespace and an optional sign are accepted, then digits up to the
/// first non-digit. Anything else (including the empty string) is `0`.
#[must_use]
pub fn parse_px(value: &str) -> f64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let mut parsed = 0.0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        parsed = parsed * 10.0 + f64::from(b - b'0');
    }
    if negative { -parsed } else { parsed }
}
