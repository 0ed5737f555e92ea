// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle tests for `understory_lightbox::Lightbox`.
//!
//! These drive the state machine against an in-memory page that builds the
//! real overlay tree through `DomBuilder` and records every host call, so the
//! tests can check both the resulting document and the order of writes.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use understory_lightbox::dom::{DomBuilder, overlay_tree};
use understory_lightbox::style::{
    ACTIVE_CLASS, HIDE_OVERFLOW_CLASS, NEED_PADDING_BOTTOM_CLASS, SHRINKING_CLASS,
};
use understory_lightbox::{
    BodyLock, InvalidTarget, Lightbox, LightboxError, LightboxHost, LightboxPhase, PreviewId,
    PreviewOptions, SourceImage, ThumbnailInfo, ViewportState,
};

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<usize>,
}

/// Shared page state: the body, the stylesheet, and the body lock.
#[derive(Debug, Default)]
struct Page {
    nodes: Vec<Node>,
    body_children: Vec<usize>,
    body_classes: Vec<String>,
    body_padding_right: String,
    stylesheets: usize,
    lock: BodyLock,
}

impl DomBuilder for Page {
    type Node = usize;
    type Error = std::convert::Infallible;

    fn create_element(&mut self, tag: &str) -> Result<usize, Self::Error> {
        self.nodes.push(Node {
            tag: tag.into(),
            ..Node::default()
        });
        Ok(self.nodes.len() - 1)
    }

    fn create_text(&mut self, text: &str) -> Result<usize, Self::Error> {
        self.create_element(&format!("#text {text}"))
    }

    fn set_attribute(&mut self, node: &usize, name: &str, value: &str) -> Result<(), Self::Error> {
        self.nodes[*node].attributes.push((name.into(), value.into()));
        Ok(())
    }

    fn append_child(&mut self, parent: &usize, child: &usize) -> Result<(), Self::Error> {
        self.nodes[*parent].children.push(*child);
        Ok(())
    }
}

/// One binding's view of the page.
struct FakeHost {
    page: Rc<RefCell<Page>>,
    overlay: usize,
    viewport: ViewportState,
    image: SourceImage,
    view_classes: Vec<String>,
    image_style: String,
    inner_overflow: String,
    scroll: Vec2,
    log: Vec<String>,
}

impl FakeHost {
    fn new(page: Rc<RefCell<Page>>, src: &str, options: &PreviewOptions) -> Self {
        let Ok(overlay) = overlay_tree(src, options.z_index).build(&mut *page.borrow_mut());
        Self {
            page,
            overlay,
            viewport: ViewportState::new(Size::new(1024.0, 768.0)),
            image: SourceImage {
                natural_size: Size::new(2000.0, 1000.0),
                displayed_size: Size::new(200.0, 100.0),
                origin: Point::new(40.0, 60.0),
            },
            view_classes: Vec::new(),
            image_style: String::new(),
            inner_overflow: String::new(),
            scroll: Vec2::ZERO,
            log: Vec::new(),
        }
    }

    fn has_view_class(&self, class: &str) -> bool {
        self.view_classes.iter().any(|c| c == class)
    }

    /// Inline style of this overlay's backdrop element.
    fn backdrop_style(&self) -> Option<String> {
        let page = self.page.borrow();
        let backdrop = *page.nodes[self.overlay].children.first()?;
        page.nodes[backdrop]
            .attributes
            .iter()
            .rev()
            .find(|(name, _)| name == "style")
            .map(|(_, value)| value.clone())
    }
}

fn toggle(classes: &mut Vec<String>, class: &str, enabled: bool) {
    let present = classes.iter().position(|c| c == class);
    match (present, enabled) {
        (None, true) => classes.push(class.into()),
        (Some(i), false) => {
            classes.remove(i);
        }
        _ => {}
    }
}

impl LightboxHost for FakeHost {
    fn viewport(&self) -> ViewportState {
        self.viewport
    }

    fn source_image(&self) -> SourceImage {
        self.image
    }

    fn has_stylesheet(&self) -> bool {
        self.page.borrow().stylesheets > 0
    }

    fn insert_stylesheet(&mut self, _css: &str) {
        self.page.borrow_mut().stylesheets += 1;
        self.log.push("insert_stylesheet".into());
    }

    fn attach_overlay(&mut self) {
        let mut page = self.page.borrow_mut();
        assert!(
            !page.body_children.contains(&self.overlay),
            "overlay attached twice"
        );
        page.body_children.push(self.overlay);
        self.log.push("attach_overlay".into());
    }

    fn detach_overlay(&mut self) {
        let mut page = self.page.borrow_mut();
        let i = page
            .body_children
            .iter()
            .position(|&n| n == self.overlay)
            .expect("detaching an overlay that is not attached");
        page.body_children.remove(i);
        self.log.push("detach_overlay".into());
    }

    fn set_view_class(&mut self, class: &str, enabled: bool) {
        toggle(&mut self.view_classes, class, enabled);
        self.log.push(format!("view_class {class} {enabled}"));
    }

    fn set_image_style(&mut self, style: &str) {
        self.image_style = style.into();
        self.log.push(format!("image_style {style}"));
    }

    fn set_inner_overflow(&mut self, overflow: &str) {
        self.inner_overflow = overflow.into();
    }

    fn inner_scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn set_body_class(&mut self, class: &str, enabled: bool) {
        toggle(&mut self.page.borrow_mut().body_classes, class, enabled);
    }

    fn body_padding_right(&self) -> String {
        self.page.borrow().body_padding_right.clone()
    }

    fn set_body_padding_right(&mut self, value: &str) {
        self.page.borrow_mut().body_padding_right = value.into();
    }

    fn acquire_body(&mut self, owner: PreviewId) -> Result<(), LightboxError> {
        self.page.borrow_mut().lock.acquire(owner)
    }

    fn release_body(&mut self, owner: PreviewId) {
        self.page.borrow_mut().lock.release(owner);
    }

    fn flush_styles(&mut self) {
        self.log.push("flush_styles".into());
    }
}

fn thumbnail(width: f64) -> ThumbnailInfo<'static> {
    ThumbnailInfo {
        tag: "img",
        src: "/photo.jpg",
        displayed_width: width,
    }
}

fn setup() -> (Rc<RefCell<Page>>, FakeHost, Lightbox) {
    let page = Rc::new(RefCell::new(Page::default()));
    let host = FakeHost::new(page.clone(), "/photo.jpg", &PreviewOptions::new());
    let lightbox = Lightbox::attach(PreviewId::new(1), PreviewOptions::new(), &thumbnail(200.0))
        .expect("thumbnail qualifies");
    (page, host, lightbox)
}

#[test]
fn narrow_thumbnail_is_not_attached() {
    let options = PreviewOptions::new().with_max(300.0);
    let result = Lightbox::attach(PreviewId::new(1), options, &thumbnail(200.0));
    assert!(matches!(
        result,
        Err(LightboxError::InvalidTarget(InvalidTarget::BelowThreshold { .. }))
    ));
}

#[test]
fn open_appends_exactly_one_overlay_and_close_removes_it() {
    let (page, mut host, mut lightbox) = setup();

    lightbox.open(&mut host).unwrap();
    assert_eq!(lightbox.phase(), LightboxPhase::Opening);
    assert_eq!(page.borrow().body_children, vec![host.overlay]);
    let page_ref = page.borrow();
    let overlay = &page_ref.nodes[host.overlay];
    assert_eq!(overlay.tag, "div");
    assert_eq!(overlay.children.len(), 1);
    drop(page_ref);

    lightbox.on_transition_end(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Open);
    assert_eq!(host.inner_overflow, "auto");

    lightbox.close(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Closing);
    assert_eq!(page.borrow().body_children, vec![host.overlay]);

    lightbox.on_transition_end(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Idle);
    assert!(page.borrow().body_children.is_empty());
    assert_eq!(host.inner_overflow, "");
    assert!(host.view_classes.is_empty());
}

#[test]
fn open_is_a_two_phase_commit_around_a_style_flush() {
    let (_page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();

    let flush = host.log.iter().position(|l| l == "flush_styles").unwrap();
    let attach = host.log.iter().position(|l| l == "attach_overlay").unwrap();
    let active = host
        .log
        .iter()
        .position(|l| l == &format!("view_class {ACTIVE_CLASS} true"))
        .unwrap();
    assert!(attach < flush, "overlay inserted before flush");
    assert!(flush < active, "expansion committed after flush");

    let styles: Vec<_> = host
        .log
        .iter()
        .filter_map(|l| l.strip_prefix("image_style "))
        .collect();
    assert_eq!(
        styles,
        vec![
            "width: 200px; transform: translate3d(40px, 60px, 0px) scale3d(1, 1, 1);",
            "width: 200px; transform: translate3d(412px, 334px, 0px) scale3d(4.92, 4.92, 1);",
        ]
    );
}

#[test]
fn stylesheet_is_inserted_once_per_page() {
    let (page, mut host, mut lightbox) = setup();
    for _ in 0..3 {
        lightbox.open(&mut host).unwrap();
        lightbox.on_transition_end(&mut host);
        lightbox.close(&mut host);
        lightbox.on_transition_end(&mut host);
    }
    assert_eq!(page.borrow().stylesheets, 1);

    let mut other_host = FakeHost::new(page.clone(), "/other.jpg", &PreviewOptions::new());
    let mut other =
        Lightbox::attach(PreviewId::new(2), PreviewOptions::new(), &thumbnail(200.0)).unwrap();
    other.open(&mut other_host).unwrap();
    assert_eq!(page.borrow().stylesheets, 1);
}

#[test]
fn later_preview_keeps_its_own_z_index_over_shared_stylesheet() {
    let (page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    lightbox.close(&mut host);
    lightbox.on_transition_end(&mut host);

    let raised = PreviewOptions::new().with_z_index(9000);
    let mut raised_host = FakeHost::new(page.clone(), "/other.jpg", &raised);
    let mut other = Lightbox::attach(PreviewId::new(2), raised, &thumbnail(200.0)).unwrap();
    other.open(&mut raised_host).unwrap();

    assert_eq!(page.borrow().stylesheets, 1);
    assert!(!raised_host.log.iter().any(|entry| entry == "insert_stylesheet"));
    assert_eq!(host.backdrop_style().as_deref(), Some("z-index: 2000;"));
    assert_eq!(raised_host.backdrop_style().as_deref(), Some("z-index: 9000;"));
}

#[test]
fn round_trip_restores_body_exactly() {
    let (page, mut host, mut lightbox) = setup();
    {
        let mut page = page.borrow_mut();
        page.body_classes = vec!["theme-dark".into()];
        page.body_padding_right = "8px".into();
    }
    host.viewport.scrollbar_width = 15.0;
    host.viewport.document_overflows = true;
    host.viewport.body_padding_right = 8.0;

    lightbox.open(&mut host).unwrap();
    {
        let page = page.borrow();
        assert_eq!(page.body_padding_right, "23px");
        assert!(page.body_classes.iter().any(|c| c == HIDE_OVERFLOW_CLASS));
    }

    lightbox.on_transition_end(&mut host);
    lightbox.close(&mut host);
    lightbox.on_transition_end(&mut host);

    let page = page.borrow();
    assert_eq!(page.body_classes, vec!["theme-dark".to_string()]);
    assert_eq!(page.body_padding_right, "8px");
    assert!(!page.lock.is_held());
}

#[test]
fn body_untouched_without_scrollbar_compensation() {
    let (page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    let page = page.borrow();
    assert!(page.body_classes.is_empty());
    assert_eq!(page.body_padding_right, "");
    assert_eq!(page.lock.holder(), Some(PreviewId::new(1)));
}

#[test]
fn tall_image_gets_bottom_padding_class_until_teardown() {
    let (_page, mut host, mut lightbox) = setup();
    host.image.natural_size = Size::new(800.0, 750.0);
    host.image.displayed_size = Size::new(160.0, 150.0);

    lightbox.open(&mut host).unwrap();
    assert!(host.has_view_class(NEED_PADDING_BOTTOM_CLASS));
    assert!(lightbox.geometry().unwrap().needs_bottom_padding);

    lightbox.close(&mut host);
    lightbox.on_transition_end(&mut host);
    assert!(!host.has_view_class(NEED_PADDING_BOTTOM_CLASS));
    assert!(lightbox.geometry().is_none());
}

#[test]
fn close_shrinks_back_to_scrolled_origin() {
    let (_page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    lightbox.on_transition_end(&mut host);

    host.scroll = Vec2::new(0.0, 120.0);
    lightbox.close(&mut host);

    assert!(host.has_view_class(SHRINKING_CLASS));
    assert!(!host.has_view_class(ACTIVE_CLASS));
    assert_eq!(
        host.image_style,
        "width: 200px; transform: translate3d(40px, 180px, 0px) scale3d(1, 1, 1);"
    );
}

#[test]
fn close_is_idempotent() {
    let (page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    lightbox.on_transition_end(&mut host);

    lightbox.close(&mut host);
    let writes = host.log.len();
    lightbox.close(&mut host);
    assert_eq!(host.log.len(), writes, "second close while shrinking is a no-op");

    lightbox.on_transition_end(&mut host);
    assert!(page.borrow().body_children.is_empty());

    // After removal: no panic, no second detach.
    lightbox.close(&mut host);
    lightbox.on_transition_end(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Idle);
    assert_eq!(
        host.log.iter().filter(|l| *l == "detach_overlay").count(),
        1
    );
}

#[test]
fn close_during_opening_transition_still_tears_down() {
    let (page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    lightbox.close(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Closing);

    lightbox.on_transition_end(&mut host);
    assert_eq!(lightbox.phase(), LightboxPhase::Idle);
    assert!(page.borrow().body_children.is_empty());
}

#[test]
fn reopening_while_open_is_rejected() {
    let (page, mut host, mut lightbox) = setup();
    lightbox.open(&mut host).unwrap();
    assert_eq!(
        lightbox.open(&mut host),
        Err(LightboxError::ReentrantOpen {
            holder: PreviewId::new(1)
        })
    );
    assert_eq!(page.borrow().body_children.len(), 1);
}

#[test]
fn second_preview_cannot_open_while_first_holds_body() {
    let (page, mut host, mut lightbox) = setup();
    let mut other_host = FakeHost::new(page.clone(), "/other.jpg", &PreviewOptions::new());
    let mut other =
        Lightbox::attach(PreviewId::new(2), PreviewOptions::new(), &thumbnail(200.0)).unwrap();

    lightbox.open(&mut host).unwrap();
    assert_eq!(
        other.open(&mut other_host),
        Err(LightboxError::ReentrantOpen {
            holder: PreviewId::new(1)
        })
    );
    assert_eq!(other.phase(), LightboxPhase::Idle);
    assert!(other_host.log.is_empty());

    lightbox.close(&mut host);
    lightbox.on_transition_end(&mut host);
    other.open(&mut other_host).unwrap();
    assert_eq!(page.borrow().body_children, vec![other_host.overlay]);
}

#[test]
fn degenerate_image_leaves_page_untouched() {
    let (page, mut host, mut lightbox) = setup();
    host.image.natural_size = Size::new(0.0, 0.0);

    assert!(matches!(
        lightbox.open(&mut host),
        Err(LightboxError::DegenerateImage { .. })
    ));
    assert_eq!(lightbox.phase(), LightboxPhase::Idle);
    assert!(host.log.is_empty());
    assert!(!page.borrow().lock.is_held());
}

#[test]
fn detach_tears_down_and_ignores_late_events() {
    let (page, mut host, mut lightbox) = setup();
    host.viewport.scrollbar_width = 15.0;
    host.viewport.body_overflow_auto = true;
    lightbox.open(&mut host).unwrap();

    lightbox.detach(&mut host);
    assert!(lightbox.is_detached());
    assert_eq!(lightbox.phase(), LightboxPhase::Idle);
    {
        let page = page.borrow();
        assert!(page.body_children.is_empty());
        assert!(page.body_classes.is_empty());
        assert_eq!(page.body_padding_right, "");
        assert!(!page.lock.is_held());
    }

    let writes = host.log.len();
    lightbox.on_transition_end(&mut host);
    lightbox.close(&mut host);
    lightbox.open(&mut host).unwrap();
    assert_eq!(host.log.len(), writes);
}
