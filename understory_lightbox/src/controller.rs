// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open/close lifecycle of one bound preview.
//!
//! ## Phases
//!
//! ```text
//! Idle --open--> Opening --transition end--> Open
//!  ^                |                          |
//!  |              close                      close
//!  |                v                          |
//!  +--transition end-- Closing <---------------+
//! ```
//!
//! [`Lightbox`] owns no DOM. Every read and mutation goes through a
//! [`LightboxHost`], so the same state machine drives a browser document or an
//! in-memory fake in tests.
//!
//! Opening is a two-phase commit: the overlay is inserted with the image laid
//! exactly over the thumbnail, the host flushes styles, and only then are the
//! active class and the expanded transform applied. The flush is what makes the
//! second write animate instead of snapping.
//!
//! Every side effect of opening is undone by the teardown that follows the
//! closing transition, including the body's exact pre-open `padding-right`.

use alloc::string::String;

use kurbo::{Point, Vec2};

use crate::error::LightboxError;
use crate::geometry::{Geometry, ImageTransform, fit_to_viewport, px};
use crate::geometry::{SourceImage, ViewportState};
use crate::lock::PreviewId;
use crate::options::{PreviewOptions, ThumbnailInfo};
use crate::style::{
    ACTIVE_CLASS, HIDE_OVERFLOW_CLASS, NEED_PADDING_BOTTOM_CLASS, SHRINKING_CLASS, image_style,
    stylesheet,
};

/// Document operations the lifecycle needs.
///
/// A host is scoped to one binding: "the overlay" and "the thumbnail" are the
/// ones that binding owns, while the body and the body lock are shared with
/// every other binding on the page.
pub trait LightboxHost {
    /// Measures the viewport and body.
    fn viewport(&self) -> ViewportState;
    /// Measures the thumbnail.
    fn source_image(&self) -> SourceImage;

    /// Returns `true` if the overlay stylesheet is already in the page.
    fn has_stylesheet(&self) -> bool;
    /// Inserts the overlay stylesheet.
    fn insert_stylesheet(&mut self, css: &str);

    /// Appends the overlay to the body.
    fn attach_overlay(&mut self);
    /// Removes the overlay from the body.
    fn detach_overlay(&mut self);

    /// Adds or removes a class on the overlay backdrop.
    fn set_view_class(&mut self, class: &str, enabled: bool);
    /// Sets the inline style of the enlarged image.
    fn set_image_style(&mut self, style: &str);
    /// Sets the inline `overflow` of the scroll container (`""` clears it).
    fn set_inner_overflow(&mut self, overflow: &str);
    /// Returns the scroll position of the scroll container.
    fn inner_scroll_offset(&self) -> Vec2;

    /// Adds or removes a class on the body.
    fn set_body_class(&mut self, class: &str, enabled: bool);
    /// Returns the body's inline `padding-right` (`""` when unset).
    fn body_padding_right(&self) -> String;
    /// Sets the body's inline `padding-right` (`""` clears it).
    fn set_body_padding_right(&mut self, value: &str);

    /// Takes the page-wide body lock for `owner`.
    fn acquire_body(&mut self, owner: PreviewId) -> Result<(), LightboxError>;
    /// Releases the page-wide body lock held by `owner`.
    fn release_body(&mut self, owner: PreviewId);

    /// Forces pending style changes to be applied before the next write.
    fn flush_styles(&mut self);
}

/// Where a [`Lightbox`] is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LightboxPhase {
    /// No overlay in the document.
    #[default]
    Idle,
    /// Overlay inserted, expanding towards the fitted geometry.
    Opening,
    /// Fully expanded.
    Open,
    /// Shrinking back onto the thumbnail.
    Closing,
}

/// Body state changed by opening, restored by teardown.
#[derive(Clone, Debug)]
struct BodyRestore {
    padding_right: String,
}

/// State machine for one bound preview.
#[derive(Clone, Debug)]
pub struct Lightbox {
    id: PreviewId,
    options: PreviewOptions,
    phase: LightboxPhase,
    displayed_width: f64,
    origin: Point,
    geometry: Option<Geometry>,
    body_restore: Option<BodyRestore>,
    detached: bool,
}

impl Lightbox {
    /// Binds a preview to a thumbnail, if `options` accept it.
    pub fn attach(
        id: PreviewId,
        options: PreviewOptions,
        thumbnail: &ThumbnailInfo<'_>,
    ) -> Result<Self, LightboxError> {
        options.check(thumbnail)?;
        tracing::debug!(preview = id.get(), "preview attached");
        Ok(Self {
            id,
            options,
            phase: LightboxPhase::Idle,
            displayed_width: thumbnail.displayed_width,
            origin: Point::ZERO,
            geometry: None,
            body_restore: None,
            detached: false,
        })
    }

    /// Returns this preview's id.
    #[must_use]
    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// Returns the options this preview was bound with.
    #[must_use]
    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> LightboxPhase {
        self.phase
    }

    /// Returns the geometry of the current opening, if the overlay is live.
    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Returns `true` once [`Lightbox::detach`] has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Opens the preview (thumbnail click).
    ///
    /// Fails with [`LightboxError::ReentrantOpen`] unless idle or if another
    /// preview holds the body, and with [`LightboxError::DegenerateImage`] or
    /// [`LightboxError::ViewportTooSmall`] when no geometry can be computed. On
    /// failure the document is left untouched.
    pub fn open<H: LightboxHost>(&mut self, host: &mut H) -> Result<(), LightboxError> {
        if self.detached {
            return Ok(());
        }
        if self.phase != LightboxPhase::Idle {
            return Err(LightboxError::ReentrantOpen { holder: self.id });
        }

        let image = host.source_image();
        let geometry = fit_to_viewport(&image, &host.viewport())?;
        host.acquire_body(self.id)?;

        if !host.has_stylesheet() {
            host.insert_stylesheet(&stylesheet(self.options.z_index));
        }

        self.displayed_width = image.displayed_size.width;
        self.origin = image.origin;
        self.geometry = Some(geometry);
        self.insert_collapsed(host, &geometry);
        self.phase = LightboxPhase::Opening;
        tracing::debug!(
            preview = self.id.get(),
            ratio = geometry.ratio,
            "preview opening"
        );

        host.flush_styles();
        self.commit_expanded(host, &geometry);
        Ok(())
    }

    /// First phase of opening: overlay in the document, image over the thumbnail.
    fn insert_collapsed<H: LightboxHost>(&mut self, host: &mut H, geometry: &Geometry) {
        host.set_image_style(&image_style(
            self.displayed_width,
            ImageTransform::collapsed(self.origin),
        ));
        if geometry.needs_bottom_padding {
            host.set_view_class(NEED_PADDING_BOTTOM_CLASS, true);
        }
        if let Some(padding) = geometry.padding_right {
            self.body_restore = Some(BodyRestore {
                padding_right: host.body_padding_right(),
            });
            host.set_body_class(HIDE_OVERFLOW_CLASS, true);
            host.set_body_padding_right(&px(padding));
        }
        host.attach_overlay();
    }

    /// Second phase of opening: start the expand transition.
    fn commit_expanded<H: LightboxHost>(&self, host: &mut H, geometry: &Geometry) {
        host.set_view_class(ACTIVE_CLASS, true);
        host.set_image_style(&image_style(
            self.displayed_width,
            ImageTransform::expanded(geometry),
        ));
    }

    /// Closes the preview (overlay click).
    ///
    /// The image shrinks back onto the thumbnail, compensating for however far
    /// the scroll container has been scrolled. Calling this while idle or
    /// already closing does nothing.
    pub fn close<H: LightboxHost>(&mut self, host: &mut H) {
        if self.detached {
            return;
        }
        match self.phase {
            LightboxPhase::Opening | LightboxPhase::Open => {
                host.set_view_class(SHRINKING_CLASS, true);
                host.set_view_class(ACTIVE_CLASS, false);
                let scroll = host.inner_scroll_offset();
                host.set_image_style(&image_style(
                    self.displayed_width,
                    ImageTransform::collapsed(self.origin + scroll),
                ));
                self.phase = LightboxPhase::Closing;
                tracing::debug!(preview = self.id.get(), "preview closing");
            }
            LightboxPhase::Idle | LightboxPhase::Closing => {}
        }
    }

    /// Handles the end of the image's transform transition.
    pub fn on_transition_end<H: LightboxHost>(&mut self, host: &mut H) {
        if self.detached {
            return;
        }
        match self.phase {
            LightboxPhase::Opening => {
                host.set_inner_overflow("auto");
                self.phase = LightboxPhase::Open;
                tracing::debug!(preview = self.id.get(), "preview open");
            }
            LightboxPhase::Closing => self.teardown(host),
            LightboxPhase::Idle | LightboxPhase::Open => {}
        }
    }

    /// Tears down any live overlay immediately and ignores all later calls.
    ///
    /// Hosts call this when the thumbnail leaves the document so that late
    /// events cannot touch a page the binding no longer owns.
    pub fn detach<H: LightboxHost>(&mut self, host: &mut H) {
        if self.detached {
            return;
        }
        if self.phase != LightboxPhase::Idle {
            self.teardown(host);
        }
        self.detached = true;
        tracing::debug!(preview = self.id.get(), "preview detached");
    }

    fn teardown<H: LightboxHost>(&mut self, host: &mut H) {
        host.detach_overlay();
        host.set_view_class(SHRINKING_CLASS, false);
        host.set_view_class(ACTIVE_CLASS, false);
        host.set_inner_overflow("");
        host.set_view_class(NEED_PADDING_BOTTOM_CLASS, false);
        if let Some(restore) = self.body_restore.take() {
            host.set_body_class(HIDE_OVERFLOW_CLASS, false);
            host.set_body_padding_right(&restore.padding_right);
        }
        host.release_body(self.id);
        self.geometry = None;
        self.phase = LightboxPhase::Idle;
        tracing::debug!(preview = self.id.get(), "preview closed");
    }
}
