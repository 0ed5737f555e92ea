// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_lightbox_web --heading-base-level=0

//! Browser backend for `understory_lightbox`.
//!
//! When targeting `wasm32`, this crate implements the lightbox host and DOM
//! builder over `web-sys` and binds previews to `<img>` elements:
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn bind_all(
//!     images: &[web_sys::Element],
//! ) -> Result<Vec<understory_lightbox_web::PreviewBinding>, wasm_bindgen::JsValue> {
//!     use understory_lightbox::PreviewOptions;
//!     use understory_lightbox_web::LightboxPage;
//!
//!     let page = LightboxPage::from_window()?;
//!     let options = PreviewOptions::new().with_max(120.0);
//!     images.iter().map(|img| page.bind(img, options)).collect()
//! }
//! ```
//!
//! Binding waits for the image to load, then checks it against the options.
//! Elements that are not images, have no source, or are displayed narrower
//! than `max` are left alone. A qualifying image gets three listeners: a click
//! on the thumbnail opens the preview, a click on the overlay closes it, and
//! `transitionend` on the enlarged image advances the lifecycle. All of them
//! are owned by the returned [`PreviewBinding`] and removed when it is dropped.
//!
//! Notes:
//! - Only one preview per document can be open at a time, however many
//!   [`LightboxPage`]s bind into it; clicks on other thumbnails while one is
//!   open are ignored. The holder is recorded on `<body>` under
//!   [`OWNER_ATTRIBUTE`].
//! - The overlay stylesheet is inserted into `<head>` once per document.
//! - DOM failures are logged through `tracing` and never panic; at worst the
//!   preview does not appear.

#![no_std]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
use alloc::{format, rc::Rc, rc::Weak, string::String, vec::Vec};
#[cfg(target_arch = "wasm32")]
use core::cell::RefCell;

#[cfg(target_arch = "wasm32")]
use kurbo::{Point, Size, Vec2};
#[cfg(target_arch = "wasm32")]
use understory_lightbox::dom::{DomBuilder, overlay_tree};
#[cfg(target_arch = "wasm32")]
use understory_lightbox::style::{IMAGE_CLASS, INNER_CLASS, STYLE_ELEMENT_ID, VIEW_CLASS, parse_px};
#[cfg(target_arch = "wasm32")]
use understory_lightbox::{
    BodyLock, Lightbox, LightboxError, LightboxHost, LightboxPhase, PreviewId, PreviewOptions,
    SourceImage, ThumbnailInfo, ViewportState,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use web_sys::{
    AddEventListenerOptions, CssStyleDeclaration, Document, Element, Event, EventTarget,
    HtmlElement, HtmlImageElement, Node,
};

/// Attribute on `<body>` naming the preview that currently holds it.
#[cfg(target_arch = "wasm32")]
pub const OWNER_ATTRIBUTE: &str = "data-understory-lightbox-owner";

/// Attribute on the root element holding the next preview id for the document.
#[cfg(target_arch = "wasm32")]
const NEXT_ID_ATTRIBUTE: &str = "data-understory-lightbox-next-id";

#[cfg(target_arch = "wasm32")]
fn report<T>(result: Result<T, JsValue>, action: &'static str) {
    if let Err(err) = result {
        tracing::warn!(?err, action, "lightbox DOM operation failed");
    }
}

#[cfg(target_arch = "wasm32")]
fn set_class(element: &Element, class: &str, enabled: bool) {
    let classes = element.class_list();
    if enabled {
        report(classes.add_1(class), "add class");
    } else {
        report(classes.remove_1(class), "remove class");
    }
}

/// Sets an inline style property; an empty value removes it.
#[cfg(target_arch = "wasm32")]
fn set_inline(style: &CssStyleDeclaration, property: &str, value: &str) {
    if value.is_empty() {
        report(style.remove_property(property), "remove style property");
    } else {
        report(style.set_property(property, value), "set style property");
    }
}

#[cfg(target_arch = "wasm32")]
fn not_found(what: &str) -> JsValue {
    JsValue::from_str(&format!("lightbox: {what} not found"))
}

/// Measures the width of a classic (non-overlay) vertical scrollbar.
///
/// A throw-away `overflow: scroll` element is attached to `body` and the
/// difference between its outer and client widths is returned. Overlay
/// scrollbars measure `0`.
#[cfg(target_arch = "wasm32")]
pub fn measure_scrollbar_width(document: &Document, body: &HtmlElement) -> f64 {
    let Some(probe) = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return 0.0;
    };
    let style = probe.style();
    for (property, value) in [
        ("width", "100px"),
        ("overflow", "scroll"),
        ("position", "absolute"),
        ("top", "-9999px"),
    ] {
        set_inline(&style, property, value);
    }
    if body.append_child(&probe).is_err() {
        return 0.0;
    }
    let width = probe.offset_width() - probe.client_width();
    probe.remove();
    f64::from(width.max(0))
}

/// [`DomBuilder`] over a `web_sys::Document`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct WebDom {
    document: Document,
}

#[cfg(target_arch = "wasm32")]
impl WebDom {
    /// Creates a builder that creates nodes in `document`.
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

#[cfg(target_arch = "wasm32")]
impl DomBuilder for WebDom {
    type Node = Node;
    type Error = JsValue;

    fn create_element(&mut self, tag: &str) -> Result<Node, JsValue> {
        Ok(self.document.create_element(tag)?.into())
    }

    fn create_text(&mut self, text: &str) -> Result<Node, JsValue> {
        Ok(self.document.create_text_node(text).into())
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<(), JsValue> {
        node.dyn_ref::<Element>()
            .ok_or_else(|| JsValue::from_str("lightbox: attributes need an element"))?
            .set_attribute(name, value)
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), JsValue> {
        parent.append_child(child).map(drop)
    }
}

/// Hands out a preview id that is unique within `document`.
///
/// The counter lives in the document, so separately created pages never
/// reuse each other's ids.
#[cfg(target_arch = "wasm32")]
fn allocate_id(document: &Document) -> PreviewId {
    let Some(root) = document.document_element() else {
        return PreviewId::new(0);
    };
    let id = root
        .get_attribute(NEXT_ID_ATTRIBUTE)
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(1);
    report(
        root.set_attribute(NEXT_ID_ATTRIBUTE, &format!("{}", id + 1)),
        "allocate preview id",
    );
    PreviewId::new(id)
}

/// Entry point for binding previews on one document.
///
/// Pages are cheap handles: the body lock and the id counter are kept in the
/// document itself, so every page over the same document shares them and at
/// most one preview in it is open at a time.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct LightboxPage {
    document: Document,
}

#[cfg(target_arch = "wasm32")]
impl LightboxPage {
    /// Creates a page over `document`.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Returns the document previews are bound in.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Creates a page over the current window's document.
    pub fn from_window() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| not_found("window document"))?;
        Ok(Self::new(document))
    }

    /// Binds a preview to `element`.
    ///
    /// Validation happens once the image has loaded; elements that do not
    /// qualify produce an inert binding. Errors are only returned when
    /// listeners cannot be registered.
    pub fn bind(&self, element: &Element, options: PreviewOptions) -> Result<PreviewBinding, JsValue> {
        let state = Rc::new(RefCell::new(BindingState {
            document: self.document.clone(),
            element: element.clone(),
            options,
            session: None,
        }));

        let pending = element
            .dyn_ref::<HtmlImageElement>()
            .is_some_and(|img| !img.complete());
        let load = if pending {
            let weak = Rc::downgrade(&state);
            Some(Listener::add(element, "load", true, move |_| {
                if let Some(state) = weak.upgrade() {
                    report(start(&state), "bind preview");
                }
            })?)
        } else {
            start(&state)?;
            None
        };

        Ok(PreviewBinding { state, load })
    }
}

/// A preview bound to one element.
///
/// Dropping the binding removes its listeners and tears down an open overlay.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
pub struct PreviewBinding {
    state: Rc<RefCell<BindingState>>,
    load: Option<Listener>,
}

#[cfg(target_arch = "wasm32")]
impl PreviewBinding {
    /// Returns `true` once the element has loaded and qualified for a preview.
    pub fn is_active(&self) -> bool {
        self.state
            .try_borrow()
            .is_ok_and(|state| state.session.is_some())
    }

    /// Returns the lifecycle phase, if the preview is active.
    pub fn phase(&self) -> Option<LightboxPhase> {
        let state = self.state.try_borrow().ok()?;
        state.session.as_ref().map(|session| session.lightbox.phase())
    }

    /// Removes the preview from its element.
    pub fn unbind(self) {}
}

#[cfg(target_arch = "wasm32")]
impl Drop for PreviewBinding {
    fn drop(&mut self) {
        self.load = None;
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::warn!("preview unbound from inside its own handler; listeners leak");
            return;
        };
        if let Some(mut session) = state.session.take() {
            session.lightbox.detach(&mut session.host);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
struct BindingState {
    document: Document,
    element: Element,
    options: PreviewOptions,
    session: Option<Session>,
}

/// A qualified binding: the state machine, its host, and its listeners.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
struct Session {
    lightbox: Lightbox,
    host: WebHost,
    _listeners: Vec<Listener>,
}

/// Validates the loaded element and, if it qualifies, builds the overlay and
/// registers listeners.
#[cfg(target_arch = "wasm32")]
fn start(state: &Rc<RefCell<BindingState>>) -> Result<(), JsValue> {
    let (document, element, options) = {
        let state = state.borrow();
        if state.session.is_some() {
            return Ok(());
        }
        (state.document.clone(), state.element.clone(), state.options)
    };

    let image = element.dyn_ref::<HtmlImageElement>();
    let tag = element.tag_name();
    let src = image.map(HtmlImageElement::src).unwrap_or_default();
    let displayed_width = image.map_or(0.0, |img| f64::from(img.width()));
    let thumbnail = ThumbnailInfo {
        tag: &tag,
        src: &src,
        displayed_width,
    };

    let id = allocate_id(&document);
    let lightbox = match Lightbox::attach(id, options, &thumbnail) {
        Ok(lightbox) => lightbox,
        Err(err) => {
            tracing::debug!(%err, "preview not attached");
            return Ok(());
        }
    };
    let Some(image) = image.cloned() else {
        return Ok(());
    };

    let host = WebHost::new(document, image, &src, options.z_index)?;
    let listeners = host.listen(Rc::downgrade(state))?;
    state.borrow_mut().session = Some(Session {
        lightbox,
        host,
        _listeners: listeners,
    });
    Ok(())
}

/// Runs `f` against a live session; does nothing once the binding is gone.
#[cfg(target_arch = "wasm32")]
fn dispatch(
    state: &Weak<RefCell<BindingState>>,
    f: impl FnOnce(&mut Lightbox, &mut WebHost) -> Result<(), LightboxError>,
) {
    let Some(rc) = state.upgrade() else {
        return;
    };
    let Ok(mut state) = rc.try_borrow_mut() else {
        return;
    };
    let Some(session) = state.session.as_mut() else {
        return;
    };
    if let Err(err) = f(&mut session.lightbox, &mut session.host) {
        tracing::debug!(preview = session.lightbox.id().get(), %err, "preview event ignored");
    }
}

/// An event listener that is removed when dropped.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        once: bool,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        let options = AddEventListenerOptions::new();
        options.set_once(once);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for Listener {
    fn drop(&mut self) {
        report(
            self.target
                .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref()),
            "remove listener",
        );
    }
}

/// [`LightboxHost`] for one binding.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
struct WebHost {
    document: Document,
    body: HtmlElement,
    thumbnail: HtmlImageElement,
    container: Element,
    view: Element,
    inner: HtmlElement,
    image: HtmlElement,
}

#[cfg(target_arch = "wasm32")]
impl WebHost {
    fn new(
        document: Document,
        thumbnail: HtmlImageElement,
        src: &str,
        z_index: u32,
    ) -> Result<Self, JsValue> {
        let body = document.body().ok_or_else(|| not_found("document body"))?;
        let container = overlay_tree(src, z_index)
            .build(&mut WebDom::new(document.clone()))?
            .dyn_into::<Element>()?;
        let find = |class: &str| -> Result<Element, JsValue> {
            container
                .query_selector(&format!(".{class}"))?
                .ok_or_else(|| not_found(class))
        };
        let view = find(VIEW_CLASS)?;
        let inner = find(INNER_CLASS)?.dyn_into::<HtmlElement>()?;
        let image = find(IMAGE_CLASS)?.dyn_into::<HtmlElement>()?;
        Ok(Self {
            document,
            body,
            thumbnail,
            container,
            view,
            inner,
            image,
        })
    }

    fn listen(&self, state: Weak<RefCell<BindingState>>) -> Result<Vec<Listener>, JsValue> {
        let open = {
            let state = state.clone();
            Listener::add(&self.thumbnail, "click", false, move |_| {
                dispatch(&state, |lightbox, host| lightbox.open(host));
            })?
        };
        let close = {
            let state = state.clone();
            Listener::add(&self.container, "click", false, move |_| {
                dispatch(&state, |lightbox, host| {
                    lightbox.close(host);
                    Ok(())
                });
            })?
        };
        let image: EventTarget = self.image.clone().into();
        let transition_end = Listener::add(&self.image, "transitionend", false, move |event: Event| {
            if event.target().as_ref() != Some(&image) {
                return;
            }
            dispatch(&state, |lightbox, host| {
                lightbox.on_transition_end(host);
                Ok(())
            });
        })?;
        Ok(Vec::from([open, close, transition_end]))
    }

    /// The body lock as currently recorded on `<body>`.
    fn body_lock(&self) -> BodyLock {
        match self.body.get_attribute(OWNER_ATTRIBUTE) {
            // An unreadable marker still means someone holds the body.
            Some(raw) => BodyLock::held_by(PreviewId::new(raw.parse().unwrap_or(0))),
            None => BodyLock::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl LightboxHost for WebHost {
    fn viewport(&self) -> ViewportState {
        let document = &self.document;
        let (width, height) = match document.document_element() {
            Some(root) => (root.client_width(), root.client_height()),
            None => (self.body.client_width(), self.body.client_height()),
        };
        let height = f64::from(height);
        let style = self.body.style();
        ViewportState {
            size: Size::new(f64::from(width), height),
            scrollbar_width: measure_scrollbar_width(document, &self.body),
            document_overflows: height < f64::from(self.body.scroll_height()),
            body_overflow_auto: style
                .get_property_value("overflow-y")
                .is_ok_and(|value| value == "auto"),
            body_padding_right: parse_px(&self.body_padding_right()),
        }
    }

    fn source_image(&self) -> SourceImage {
        let rect = self.thumbnail.get_bounding_client_rect();
        SourceImage {
            natural_size: Size::new(
                f64::from(self.thumbnail.natural_width()),
                f64::from(self.thumbnail.natural_height()),
            ),
            displayed_size: Size::new(
                f64::from(self.thumbnail.width()),
                f64::from(self.thumbnail.height()),
            ),
            origin: Point::new(rect.left(), rect.top()),
        }
    }

    fn has_stylesheet(&self) -> bool {
        self.document.get_element_by_id(STYLE_ELEMENT_ID).is_some()
    }

    fn insert_stylesheet(&mut self, css: &str) {
        let document = &self.document;
        let style = match document.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                tracing::warn!(?err, "cannot create lightbox stylesheet");
                return;
            }
        };
        style.set_id(STYLE_ELEMENT_ID);
        style.set_text_content(Some(css));
        let parent: Node = match document.head() {
            Some(head) => head.into(),
            None => self.body.clone().into(),
        };
        report(parent.append_child(&style), "insert stylesheet");
    }

    fn attach_overlay(&mut self) {
        report(self.body.append_child(&self.container), "attach overlay");
    }

    fn detach_overlay(&mut self) {
        self.container.remove();
    }

    fn set_view_class(&mut self, class: &str, enabled: bool) {
        set_class(&self.view, class, enabled);
    }

    fn set_image_style(&mut self, style: &str) {
        report(self.image.set_attribute("style", style), "set image style");
    }

    fn set_inner_overflow(&mut self, overflow: &str) {
        set_inline(&self.inner.style(), "overflow", overflow);
    }

    fn inner_scroll_offset(&self) -> Vec2 {
        Vec2::new(
            f64::from(self.inner.scroll_left()),
            f64::from(self.inner.scroll_top()),
        )
    }

    fn set_body_class(&mut self, class: &str, enabled: bool) {
        set_class(&self.body, class, enabled);
    }

    fn body_padding_right(&self) -> String {
        self.body
            .style()
            .get_property_value("padding-right")
            .unwrap_or_default()
    }

    fn set_body_padding_right(&mut self, value: &str) {
        set_inline(&self.body.style(), "padding-right", value);
    }

    fn acquire_body(&mut self, owner: PreviewId) -> Result<(), LightboxError> {
        self.body_lock().acquire(owner)?;
        report(
            self.body
                .set_attribute(OWNER_ATTRIBUTE, &format!("{}", owner.get())),
            "mark body owner",
        );
        Ok(())
    }

    fn release_body(&mut self, owner: PreviewId) {
        if self.body_lock().release(owner) {
            report(self.body.remove_attribute(OWNER_ATTRIBUTE), "clear body owner");
        }
    }

    fn flush_styles(&mut self) {
        // Reading layout forces a synchronous style recalculation.
        let _ = self.image.offset_width();
    }
}
