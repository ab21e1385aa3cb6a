#![warn(clippy::use_self)]

mod test;

mod geometry;

use std::fmt;

use thiserror::Error;
use wasm_bindgen::JsValue;

pub use geometry::*;

/// The DOM primitives a host platform has to provide.
///
/// Implementors are cheap handles onto nodes owned by the host. Two handles
/// compare equal when they refer to the same node.
pub trait Node: Clone + PartialEq + fmt::Debug + Sized + 'static {
    type Event: Clone + 'static;

    fn node_type(&self) -> NodeType;

    fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    fn is_document(&self) -> bool {
        self.node_type() == NodeType::Document
    }

    /// The document owning this node, or the node itself if it is one.
    fn owner_document(&self) -> Option<Self>;

    /// Creates a detached element owned by the same document as `self`.
    fn create_element(&self, tag: &str) -> Result<Self, HostError>;

    // Tree //

    fn parent_node(&self) -> Option<Self>;

    fn parent_element(&self) -> Option<Self> {
        self.parent_node().filter(Self::is_element)
    }

    fn child_nodes(&self) -> Vec<Self>;

    /// Child nodes that are elements.
    fn children(&self) -> Vec<Self> {
        self.child_nodes()
            .into_iter()
            .filter(Self::is_element)
            .collect()
    }

    fn next_sibling(&self) -> Option<Self>;

    fn previous_sibling(&self) -> Option<Self>;

    fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), HostError>;

    fn append_child(&self, child: &Self) -> Result<(), HostError> {
        self.insert_before(child, None)
    }

    fn remove_child(&self, child: &Self) -> Result<(), HostError>;

    /// Moves `node` to `position` relative to `self`.
    fn insert_adjacent(&self, position: Position, node: &Self) -> Result<(), HostError> {
        match position {
            Position::BeforeBegin => match self.parent_node() {
                Some(parent) => parent.insert_before(node, Some(self)),
                None => Err(HostError::new("the node has no parent")),
            },
            Position::AfterBegin => {
                let first = self.child_nodes().into_iter().next();
                self.insert_before(node, first.as_ref())
            }
            Position::BeforeEnd => self.append_child(node),
            Position::AfterEnd => match self.parent_node() {
                Some(parent) => {
                    let next = self.next_sibling();
                    parent.insert_before(node, next.as_ref())
                }
                None => Err(HostError::new("the node has no parent")),
            },
        }
    }

    /// Parses `markup` and inserts the resulting nodes at `position`.
    fn insert_adjacent_html(&self, position: Position, markup: &str) -> Result<(), HostError>;

    // Selectors //

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>, HostError>;

    /// Returns `Ok(None)` when the host has no selector-matching primitive for this node.
    fn matches(&self, selector: &str) -> Result<Option<bool>, HostError>;

    // Attributes //

    fn attr(&self, name: &str) -> Option<String>;

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_attr(&self, name: &str);

    /// Whether the node exposes a structured `dataset` accessor.
    fn has_dataset(&self) -> bool;

    fn data(&self, key: &str) -> Option<String>;

    fn set_data(&self, key: &str, value: &str) -> Result<(), HostError>;

    // Content //

    /// `None` when the node has no inner markup property (documents, text).
    fn inner_html(&self) -> Option<String>;

    fn set_inner_html(&self, markup: &str) -> Result<(), HostError>;

    fn outer_html(&self) -> String;

    // Form controls //

    /// `None` when the node exposes no `value` property.
    fn value(&self) -> Option<String>;

    fn set_value(&self, value: &str);

    /// `None` when the node exposes no `checked` property.
    fn checked(&self) -> Option<bool>;

    fn set_checked(&self, checked: bool);

    // Style & geometry //

    fn computed_style(&self, property: &str) -> Option<String>;

    /// Assigns an inline style property, given in camel case.
    fn set_style(&self, property: &str, value: &str);

    fn dimensions(&self, axis: Axis) -> Dimensions;

    fn offset(&self) -> Offset;

    fn scroll_position(&self) -> ScrollPosition;

    fn set_scroll_left(&self, value: i32);

    fn set_scroll_top(&self, value: i32);

    // Events //

    /// Registers `f` for `event`. It receives the node it was registered on.
    fn listen<F>(&self, event: &str, f: F)
    where
        F: Fn(Self, Self::Event) + 'static;

    /// Returns `false` if a listener cancelled the event.
    fn dispatch(&self, event: &str, init: EventInit) -> Result<bool, HostError>;

    fn click(&self);

    fn focus(&self);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    Other,
}

/// Insertion points relative to a node, as used by `insertAdjacentHTML`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Position {
    BeforeBegin,
    AfterBegin,
    BeforeEnd,
    AfterEnd,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeBegin => "beforebegin",
            Self::AfterBegin => "afterbegin",
            Self::BeforeEnd => "beforeend",
            Self::AfterEnd => "afterend",
        }
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
}

impl EventInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(mut self, value: bool) -> Self {
        self.bubbles = value;
        self
    }

    pub fn cancelable(mut self, value: bool) -> Self {
        self.cancelable = value;
        self
    }

    pub fn composed(mut self, value: bool) -> Self {
        self.composed = value;
        self
    }
}

/// A host primitive rejected a call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsValue> for HostError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        Self { message }
    }
}
