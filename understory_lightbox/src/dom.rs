// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative element trees.
//!
//! An [`ElementSpec`] describes an element, its attributes, and its children.
//! It is realized against any document through a [`DomBuilder`], which keeps
//! this crate free of a particular DOM binding.
//!
//! ```
//! use understory_lightbox::dom::{ElementSpec, NodeSpec};
//!
//! let list = ElementSpec::new("ul")
//!     .attr("class", "menu")
//!     .children([
//!         ElementSpec::new("li").child("One"),
//!         ElementSpec::new("li").child("Two"),
//!     ]);
//!
//! assert_eq!(list.child_nodes().len(), 2);
//! assert!(matches!(&list.child_nodes()[0], NodeSpec::Element(li) if li.tag() == "li"));
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::style::{IMAGE_CLASS, INNER_CLASS, VIEW_CLASS};

/// A node in a declarative tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeSpec {
    /// A nested element.
    Element(ElementSpec),
    /// A text node.
    Text(String),
}

impl From<ElementSpec> for NodeSpec {
    fn from(element: ElementSpec) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for NodeSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<String> for NodeSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// An element with attributes and ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeSpec>,
}

impl ElementSpec {
    /// Creates an element with no attributes or children.
    ///
    /// An empty tag name produces a `div`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        let mut tag = tag.into();
        if tag.is_empty() {
            tag.push_str("div");
        }
        Self {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute. Attributes are applied in the order they were set.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends one child (an element or a text string).
    #[must_use]
    pub fn child(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends a sequence of children in order.
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeSpec>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Returns the tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attributes in application order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the value of attribute `name`, if set (last write wins).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the child nodes in order.
    #[must_use]
    pub fn child_nodes(&self) -> &[NodeSpec] {
        &self.children
    }

    /// Realizes this tree with `builder`, returning the root node.
    ///
    /// Attributes are set before children are appended; children are built
    /// depth-first in order. The first builder error aborts construction.
    pub fn build<B: DomBuilder>(&self, builder: &mut B) -> Result<B::Node, B::Error> {
        let root = builder.create_element(&self.tag)?;
        for (name, value) in &self.attributes {
            builder.set_attribute(&root, name, value)?;
        }
        for child in &self.children {
            let node = match child {
                NodeSpec::Element(element) => element.build(builder)?,
                NodeSpec::Text(text) => builder.create_text(text)?,
            };
            builder.append_child(&root, &node)?;
        }
        Ok(root)
    }
}

/// Document operations needed to realize an [`ElementSpec`].
pub trait DomBuilder {
    /// Handle to a created node.
    type Node;
    /// Error reported by the underlying document.
    type Error;

    /// Creates an element named `tag`.
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;
    /// Creates a text node.
    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;
    /// Sets an attribute on an element created by this builder.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), Self::Error>;
    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;
}

/// The preview overlay: a detached container holding the backdrop, its scroll
/// container, and the enlarged image showing `src`.
///
/// The backdrop carries `z_index` inline, so each preview stacks at its own
/// level regardless of which one installed the shared stylesheet.
#[must_use]
pub fn overlay_tree(src: &str, z_index: u32) -> ElementSpec {
    ElementSpec::new("div").child(
        ElementSpec::new("div")
            .attr("class", VIEW_CLASS)
            .attr("style", format!("z-index: {z_index};"))
            .child(
            ElementSpec::new("div")
                .attr("class", INNER_CLASS)
                .child(ElementSpec::new("img").attr("class", IMAGE_CLASS).attr("src", src)),
        ),
    )
}
