//! A chainable wrapper around an ordered set of DOM elements.
//!
//! [`Dom`] holds handles to nodes owned by a host platform and exposes
//! selection, traversal and mutation over all of them at once. The host is
//! reached through the [`Node`] trait; `domset-web` drives a browser and
//! `domset-render` an in-memory tree.

#![warn(clippy::use_self)]

mod attrs;
mod content;
mod error;
mod events;
mod geometry;
mod insert;
mod source;
mod traverse;
mod util;

use std::{fmt, slice};

use tracing::trace;

pub use domset_nodes as nodes;
#[cfg(feature = "render")]
pub use domset_render as render;
#[cfg(feature = "web")]
pub use domset_web as web;

pub use attrs::{ClassList, IntoAttr};
pub use content::{Field, Value};
pub use error::{Error, Result};
pub use geometry::{ScrollTo, Size};
pub use insert::Content;
pub use nodes::{Dimensions, Node, Offset, ScrollPosition};
pub use source::{Item, Source};
pub use traverse::Matcher;

/// An ordered set of document and element handles.
///
/// Every entry is either a document or an element; other node kinds never
/// survive construction. Operations that "modify" the set act on the nodes it
/// holds, not on the sequence itself.
#[derive(Clone, Debug)]
pub struct Dom<N> {
    elements: Vec<N>,
}

impl<N> Default for Dom<N> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<N: Node> Dom<N> {
    /// Wraps a single node. Nodes that are neither documents nor elements
    /// produce an empty set.
    pub fn new(node: N) -> Self {
        Self::from_nodes(vec![node])
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_nodes(nodes: Vec<N>) -> Self {
        Self {
            elements: source::accepted(nodes),
        }
    }

    pub fn elements(&self) -> &[N] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<N> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn first(&self) -> Option<&N> {
        self.elements.first()
    }

    pub fn get(&self, index: usize) -> Option<&N> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, N> {
        self.elements.iter()
    }

    /// Calls `callback` with a single-element set for each held element.
    pub fn each<F>(&self, mut callback: F) -> &Self
    where
        F: FnMut(Self, usize),
    {
        for (index, element) in self.elements.iter().enumerate() {
            callback(Self::new(element.clone()), index);
        }
        self
    }

    pub fn for_each<F>(&self, callback: F) -> &Self
    where
        F: FnMut(Self, usize),
    {
        self.each(callback)
    }

    fn is_element_held(&self, node: &N) -> bool {
        self.elements.contains(node)
    }

    fn traced(self, operation: &'static str, input: usize) -> Self {
        trace!(operation, input, output = self.elements.len(), "derived element set");
        self
    }
}

impl<N: Node> fmt::Display for Dom<N> {
    /// Concatenated outer markup of every held node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            f.write_str(&element.outer_html())?;
        }
        Ok(())
    }
}

impl<N> IntoIterator for Dom<N> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, N> IntoIterator for &'a Dom<N> {
    type Item = &'a N;
    type IntoIter = slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// A set holding the browser's current document.
///
/// # Panics
///
/// Panics outside a browser main thread.
#[cfg(feature = "web")]
pub fn document() -> Dom<web::WebNode> {
    Dom::new(web::document().into())
}

#[cfg(test)]
pub(crate) mod test_util {
    use domset_render::NodeRef;

    use crate::Dom;

    pub fn fixture(markup: &str) -> (NodeRef, Dom<NodeRef>) {
        let document = NodeRef::parse_document(markup);
        let dom = Dom::new(document.clone());
        (document, dom)
    }

    pub fn select(document: &NodeRef, selector: &str) -> Dom<NodeRef> {
        Dom::new(document.clone()).select(selector).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use domset_nodes::Node;
    use domset_render::NodeRef;

    use crate::{test_util::*, Dom};

    #[test]
    fn text_nodes_are_not_held() {
        let document = NodeRef::parse_document("<p>hi</p>");
        let text = document.children()[0].child_nodes().remove(0);

        assert!(Dom::new(text).is_empty());
        assert_eq!(Dom::new(document).len(), 1);
    }

    #[test]
    fn each_visits_elements_in_order() {
        let (document, _) = fixture("<i id=\"a\"></i><i id=\"b\"></i>");
        let mut seen = Vec::new();

        select(&document, "i").each(|item, index| {
            seen.push((index, item.attribute("id").unwrap_or_default()));
        });
        assert_eq!(seen, vec![(0, "a".to_string()), (1, "b".to_string())]);
    }

    #[test]
    fn display_concatenates_outer_markup() {
        let (document, _) = fixture("<b>1</b><i>2</i>");
        assert_eq!(select(&document, "b, i").to_string(), "<b>1</b><i>2</i>");
    }
}
