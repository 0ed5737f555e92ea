// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_lightbox --heading-base-level=0

//! Understory Lightbox: headless click-to-zoom image previews.
//!
//! Clicking a thumbnail animates an enlarged copy of it into a centred overlay;
//! clicking the overlay animates it back and removes the overlay. This crate
//! holds everything about that interaction that does not depend on a DOM
//! binding:
//!
//! - [`fit_to_viewport`]: the viewport-fit geometry (scaled size, centring
//!   offsets, scrollbar compensation, bottom padding).
//! - [`Lightbox`]: the `Idle → Opening → Open → Closing → Idle` state machine,
//!   driven through a [`LightboxHost`].
//! - [`dom`]: declarative element trees realized through a [`dom::DomBuilder`],
//!   including the overlay itself.
//! - [`style`]: the overlay stylesheet and inline image styles.
//! - [`BodyLock`]: the single-slot token that keeps two previews from
//!   mutating the page body at once.
//!
//! `understory_lightbox_web` implements the host and builder over `web-sys`.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_lightbox::{SourceImage, ViewportState, fit_to_viewport};
//!
//! let thumbnail = SourceImage {
//!     natural_size: Size::new(800.0, 750.0),
//!     displayed_size: Size::new(160.0, 150.0),
//!     origin: Point::new(10.0, 10.0),
//! };
//! let viewport = ViewportState::new(Size::new(1024.0, 768.0));
//!
//! let geometry = fit_to_viewport(&thumbnail, &viewport).unwrap();
//! // Too tall to centre with padding: pinned to the top instead.
//! assert!(geometry.needs_bottom_padding);
//! assert_eq!(geometry.offset.y, (750.0 - 150.0) / 2.0 + 10.0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forward `std` to `kurbo`.
//! - `libm`: forward `libm` to `kurbo` for `no_std` targets.
//! - `serde`: derive `Serialize`/`Deserialize` for [`PreviewOptions`].
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

mod controller;
pub mod dom;
mod error;
mod geometry;
mod lock;
mod options;
pub mod style;

pub use controller::{Lightbox, LightboxHost, LightboxPhase};
pub use error::{InvalidTarget, LightboxError};
pub use geometry::{
    Geometry, ImageTransform, PADDING_X, PADDING_Y, SourceImage, ViewportState, fit_to_viewport,
};
pub use lock::{BodyLock, PreviewId};
pub use options::{PreviewOptions, ThumbnailInfo};
