#![warn(clippy::use_self)]

mod event;
mod form;
mod html;
mod selector;
mod style;

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
};

use bitflags::bitflags;
use domset_nodes::{
    Axis, Dimensions, EventInit, HostError, Node, NodeType, Offset, Position, ScrollPosition,
};
use indexmap::IndexMap;

pub use event::Event;

use selector::SelectorList;

bitflags! {
    /// Optional host primitives a document exposes.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Capabilities: u8 {
        /// Elements carry a structured `dataset` accessor.
        const DATASET = 0b01;
        /// Elements can be matched against a selector.
        const MATCHES = 0b10;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Layout metrics reported by a node. Nothing computes these; tests set them.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Layout {
    pub width: Dimensions,
    pub height: Dimensions,
    pub offset: Offset,
    pub scroll: ScrollPosition,
}

#[derive(Clone)]
pub struct NodeRef(Rc<RefCell<Inner>>);

type WeakNode = Weak<RefCell<Inner>>;
type Listener = (String, Rc<dyn Fn(NodeRef, Event)>);

struct Inner {
    parent: Option<WeakNode>,
    owner: Option<WeakNode>,
    kind: NodeKind,
    listeners: Vec<Listener>,
    layout: Layout,
}

pub(crate) enum NodeKind {
    Document {
        capabilities: Capabilities,
        focused: Option<WeakNode>,
        children: Vec<NodeRef>,
    },
    Element {
        name: String,
        attrs: IndexMap<String, String>,
        children: Vec<NodeRef>,
        form: form::FormState,
    },
    Text(String),
    Comment(String),
}

impl NodeRef {
    fn new(kind: NodeKind, owner: Option<WeakNode>) -> Self {
        let inner = Inner {
            parent: None,
            owner,
            kind,
            listeners: Vec::new(),
            layout: Layout::default(),
        };
        Self(Rc::new(RefCell::new(inner)))
    }

    /// An empty document exposing every optional capability.
    pub fn document() -> Self {
        Self::document_with(Capabilities::default())
    }

    pub fn document_with(capabilities: Capabilities) -> Self {
        let kind = NodeKind::Document {
            capabilities,
            focused: None,
            children: Vec::new(),
        };
        Self::new(kind, None)
    }

    /// A document whose children are parsed from `markup`.
    pub fn parse_document(markup: &str) -> Self {
        Self::parse_document_with(markup, Capabilities::default())
    }

    pub fn parse_document_with(markup: &str, capabilities: Capabilities) -> Self {
        let document = Self::document_with(capabilities);
        for node in html::parse(markup, &document) {
            document.push_child(&node);
        }
        document
    }

    pub(crate) fn element(name: &str, owner: &Self) -> Self {
        let kind = NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attrs: IndexMap::new(),
            children: Vec::new(),
            form: form::FormState::default(),
        };
        Self::new(kind, Some(owner.downgrade()))
    }

    pub(crate) fn text(content: String, owner: &Self) -> Self {
        Self::new(NodeKind::Text(content), Some(owner.downgrade()))
    }

    pub(crate) fn comment(content: String, owner: &Self) -> Self {
        Self::new(NodeKind::Comment(content), Some(owner.downgrade()))
    }

    /// Lower-cased tag name of an element.
    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    pub(crate) fn is_named(&self, expected: &str) -> bool {
        matches!(&self.0.borrow().kind, NodeKind::Element { name, .. } if name == expected)
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        match &self.0.borrow().kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::Element { children, .. } | NodeKind::Document { children, .. } => children
                .iter()
                .filter(|child| !matches!(child.0.borrow().kind, NodeKind::Comment(_)))
                .map(Self::text_content)
                .collect(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.owner_document()
            .and_then(|document| match &document.0.borrow().kind {
                NodeKind::Document { capabilities, .. } => Some(*capabilities),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn layout(&self) -> Layout {
        self.0.borrow().layout
    }

    pub fn set_layout(&self, layout: Layout) {
        self.0.borrow_mut().layout = layout;
    }

    /// The element last focused within this node's document.
    pub fn active_element(&self) -> Option<Self> {
        let document = self.owner_document()?;
        let inner = document.0.borrow();
        match &inner.kind {
            NodeKind::Document { focused, .. } => focused.as_ref().and_then(Self::upgrade),
            _ => None,
        }
    }

    pub(crate) fn attrs(&self) -> Option<Ref<'_, IndexMap<String, String>>> {
        Ref::filter_map(self.0.borrow(), |inner| match &inner.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        })
        .ok()
    }

    fn attrs_mut(&self) -> Option<RefMut<'_, IndexMap<String, String>>> {
        RefMut::filter_map(self.0.borrow_mut(), |inner| match &mut inner.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            _ => None,
        })
        .ok()
    }

    fn children_ref(&self) -> Option<Ref<'_, Vec<Self>>> {
        Ref::filter_map(self.0.borrow(), |inner| match &inner.kind {
            NodeKind::Element { children, .. } | NodeKind::Document { children, .. } => {
                Some(children)
            }
            _ => None,
        })
        .ok()
    }

    fn children_mut(&self) -> Option<RefMut<'_, Vec<Self>>> {
        RefMut::filter_map(self.0.borrow_mut(), |inner| match &mut inner.kind {
            NodeKind::Element { children, .. } | NodeKind::Document { children, .. } => {
                Some(children)
            }
            _ => None,
        })
        .ok()
    }

    fn form_mut(&self) -> Option<RefMut<'_, form::FormState>> {
        RefMut::filter_map(self.0.borrow_mut(), |inner| match &mut inner.kind {
            NodeKind::Element { form, .. } => Some(form),
            _ => None,
        })
        .ok()
    }

    fn form(&self) -> Option<form::FormState> {
        match &self.0.borrow().kind {
            NodeKind::Element { form, .. } => Some(form.clone()),
            _ => None,
        }
    }

    /// Appends without validation; used while building freshly parsed trees.
    fn push_child(&self, child: &Self) {
        if let Some(mut children) = self.children_mut() {
            children.push(child.clone());
            child.0.borrow_mut().parent = Some(self.downgrade());
        }
    }

    fn detach(&self) {
        if let Some(parent) = self.parent_node() {
            if let Some(mut children) = parent.children_mut() {
                children.retain(|node| node != self);
            }
        }
        self.0.borrow_mut().parent = None;
    }

    fn is_inclusive_ancestor_of(&self, other: &Self) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if &node == self {
                return true;
            }
            cursor = node.parent_node();
        }
        false
    }

    /// Every descendant in document order, excluding `self`.
    fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut stack: Vec<Self> = self.child_nodes().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.child_nodes().into_iter().rev());
            out.push(node);
        }
        out
    }

    fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(parent) = node.parent_node() {
            node = parent;
        }
        node
    }

    pub(crate) fn element_siblings(&self) -> (Vec<Self>, Vec<Self>) {
        let Some(parent) = self.parent_node() else {
            return (Vec::new(), Vec::new());
        };
        let siblings = parent.children();
        match siblings.iter().position(|node| node == self) {
            Some(idx) => (siblings[..idx].to_vec(), siblings[idx + 1..].to_vec()),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn downgrade(&self) -> WeakNode {
        Rc::downgrade(&self.0)
    }

    fn upgrade(weak: &WeakNode) -> Option<Self> {
        weak.upgrade().map(NodeRef)
    }

    fn sibling_at(&self, step: isize) -> Option<Self> {
        let parent = self.parent_node()?;
        let children = parent.children_ref()?;
        let idx = children.iter().position(|node| node == self)?;
        let target = idx.checked_add_signed(step)?;
        children.get(target).cloned()
    }

    fn parse_selector(selector: &str) -> Result<SelectorList, HostError> {
        SelectorList::parse(selector)
            .ok_or_else(|| HostError::new(format!("'{selector}' is not a valid selector")))
    }
}

impl Node for NodeRef {
    type Event = Event;

    fn node_type(&self) -> NodeType {
        match &self.0.borrow().kind {
            NodeKind::Document { .. } => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    fn owner_document(&self) -> Option<Self> {
        if self.is_document() {
            Some(self.clone())
        } else {
            self.0.borrow().owner.as_ref().and_then(Self::upgrade)
        }
    }

    fn create_element(&self, tag: &str) -> Result<Self, HostError> {
        if !html::is_valid_name(tag) {
            return Err(HostError::new(format!("'{tag}' is not a valid tag name")));
        }
        let document = self
            .owner_document()
            .ok_or_else(|| HostError::new("the node has no owner document"))?;
        Ok(Self::element(tag, &document))
    }

    fn parent_node(&self) -> Option<Self> {
        self.0.borrow().parent.as_ref().and_then(Self::upgrade)
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.children_ref()
            .map(|children| children.clone())
            .unwrap_or_default()
    }

    fn next_sibling(&self) -> Option<Self> {
        self.sibling_at(1)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.sibling_at(-1)
    }

    fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), HostError> {
        if self.children_ref().is_none() {
            return Err(HostError::new("the node cannot have children"));
        }
        if child.is_document() || child.is_inclusive_ancestor_of(self) {
            return Err(HostError::new("the new child would create a cycle"));
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if reference.parent_node().as_ref() != Some(self) {
                return Err(HostError::new("the reference node is not a child of this node"));
            }
        }

        child.detach();

        {
            let mut children = self
                .children_mut()
                .ok_or_else(|| HostError::new("the node cannot have children"))?;
            let idx = match reference {
                Some(reference) => children
                    .iter()
                    .position(|node| node == reference)
                    .unwrap_or(children.len()),
                None => children.len(),
            };
            children.insert(idx, child.clone());
        }

        child.0.borrow_mut().parent = Some(self.downgrade());
        Ok(())
    }

    fn remove_child(&self, child: &Self) -> Result<(), HostError> {
        if child.parent_node().as_ref() != Some(self) {
            return Err(HostError::new("the node to be removed is not a child of this node"));
        }
        child.detach();
        Ok(())
    }

    fn insert_adjacent_html(&self, position: Position, markup: &str) -> Result<(), HostError> {
        if !self.is_element() {
            return Err(HostError::new("markup can only be inserted around elements"));
        }
        let document = self
            .owner_document()
            .ok_or_else(|| HostError::new("the node has no owner document"))?;
        let nodes = html::parse(markup, &document);

        match position {
            Position::BeforeBegin | Position::AfterEnd => {
                let parent = self
                    .parent_node()
                    .ok_or_else(|| HostError::new("the element has no parent"))?;
                let reference = match position {
                    Position::BeforeBegin => Some(self.clone()),
                    _ => self.next_sibling(),
                };
                for node in &nodes {
                    parent.insert_before(node, reference.as_ref())?;
                }
            }
            Position::AfterBegin | Position::BeforeEnd => {
                let reference = match position {
                    Position::AfterBegin => self.child_nodes().into_iter().next(),
                    _ => None,
                };
                for node in &nodes {
                    self.insert_before(node, reference.as_ref())?;
                }
            }
        }
        Ok(())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>, HostError> {
        let selector = Self::parse_selector(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|node| node.is_element() && selector.matches(node))
            .collect())
    }

    fn matches(&self, selector: &str) -> Result<Option<bool>, HostError> {
        if !self.is_element() || !self.capabilities().contains(Capabilities::MATCHES) {
            return Ok(None);
        }
        let selector = Self::parse_selector(selector)?;
        Ok(Some(selector.matches(self)))
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.attrs()?.get(&name.to_ascii_lowercase()).cloned()
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), HostError> {
        if !html::is_valid_name(name) {
            return Err(HostError::new(format!("'{name}' is not a valid attribute name")));
        }
        let mut attrs = self
            .attrs_mut()
            .ok_or_else(|| HostError::new("attributes only exist on element nodes"))?;
        attrs.insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn remove_attr(&self, name: &str) {
        if let Some(mut attrs) = self.attrs_mut() {
            attrs.shift_remove(&name.to_ascii_lowercase());
        }
    }

    fn has_dataset(&self) -> bool {
        self.is_element() && self.capabilities().contains(Capabilities::DATASET)
    }

    fn data(&self, key: &str) -> Option<String> {
        if self.has_dataset() {
            self.attr(&style::dataset_attr(key))
        } else {
            None
        }
    }

    fn set_data(&self, key: &str, value: &str) -> Result<(), HostError> {
        if !self.has_dataset() {
            return Err(HostError::new("the node has no dataset"));
        }
        self.set_attr(&style::dataset_attr(key), value)
    }

    fn inner_html(&self) -> Option<String> {
        if !self.is_element() {
            return None;
        }
        let mut out = String::new();
        for child in self.child_nodes() {
            html::serialize(&mut out, &child);
        }
        Some(out)
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), HostError> {
        if !self.is_element() {
            return Err(HostError::new("markup can only be assigned to elements"));
        }
        let document = self
            .owner_document()
            .ok_or_else(|| HostError::new("the node has no owner document"))?;
        for child in self.child_nodes() {
            child.detach();
        }
        for node in html::parse(markup, &document) {
            self.push_child(&node);
        }
        Ok(())
    }

    fn outer_html(&self) -> String {
        let mut out = String::new();
        if self.is_document() {
            for child in self.child_nodes() {
                html::serialize(&mut out, &child);
            }
        } else {
            html::serialize(&mut out, self);
        }
        out
    }

    fn value(&self) -> Option<String> {
        form::value(self)
    }

    fn set_value(&self, value: &str) {
        form::set_value(self, value);
    }

    fn checked(&self) -> Option<bool> {
        form::checked(self)
    }

    fn set_checked(&self, checked: bool) {
        form::set_checked(self, checked);
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        if !self.is_element() {
            return None;
        }
        let declarations = self.attr("style").unwrap_or_default();
        Some(style::get(&declarations, property).unwrap_or_default())
    }

    fn set_style(&self, property: &str, value: &str) {
        if !self.is_element() {
            return;
        }
        let declarations = self.attr("style").unwrap_or_default();
        let updated = style::set(&declarations, &style::kebab_case(property), value);
        if let Some(mut attrs) = self.attrs_mut() {
            if updated.is_empty() {
                attrs.shift_remove("style");
            } else {
                attrs.insert("style".to_string(), updated);
            }
        }
    }

    fn dimensions(&self, axis: Axis) -> Dimensions {
        let layout = self.layout();
        match axis {
            Axis::Width => layout.width,
            Axis::Height => layout.height,
        }
    }

    fn offset(&self) -> Offset {
        self.layout().offset
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.layout().scroll
    }

    fn set_scroll_left(&self, value: i32) {
        self.0.borrow_mut().layout.scroll.x = value;
    }

    fn set_scroll_top(&self, value: i32) {
        self.0.borrow_mut().layout.scroll.y = value;
    }

    fn listen<F>(&self, event: &str, f: F)
    where
        F: Fn(Self, Self::Event) + 'static,
    {
        self.0
            .borrow_mut()
            .listeners
            .push((event.to_string(), Rc::new(f)));
    }

    fn dispatch(&self, event: &str, init: EventInit) -> Result<bool, HostError> {
        if event.is_empty() {
            return Err(HostError::new("event names cannot be empty"));
        }
        Ok(event::dispatch(self, event, init))
    }

    fn click(&self) {
        form::click(self);
    }

    fn focus(&self) {
        if !self.is_element() {
            return;
        }
        if let Some(document) = self.owner_document() {
            if let NodeKind::Document { focused, .. } = &mut document.0.borrow_mut().kind {
                *focused = Some(self.downgrade());
            }
        }
        event::dispatch(self, "focus", EventInit::new().composed(true));
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl std::hash::Hash for NodeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Document { .. } => f.write_str("#document"),
            NodeKind::Element { name, attrs, .. } => {
                write!(f, "<{name}")?;
                for (key, value) in attrs {
                    write!(f, " {key}={value:?}")?;
                }
                f.write_str(">")
            }
            NodeKind::Text(text) => write!(f, "#text {text:?}"),
            NodeKind::Comment(text) => write!(f, "#comment {text:?}"),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

#[cfg(test)]
mod tests {
    use domset_nodes::{Axis, Dimensions, Node, Position};

    use super::{Capabilities, Layout, NodeRef};

    #[test]
    fn node_behavior() {
        domset_nodes::behavior_tests!(NodeRef::document());
    }

    #[test]
    fn node_behavior_with_body() {
        domset_nodes::behavior_tests!(NodeRef::parse_document(
            "<html><head></head><body></body></html>"
        ));
    }

    #[test]
    fn parsed_document_round_trips() {
        let markup = "<ul id=\"list\"><li class=\"a\">one</li><li>two &amp; three</li></ul>";
        let document = NodeRef::parse_document(markup);
        assert_eq!(document.outer_html(), markup);
    }

    #[test]
    fn inner_html_replaces_children() {
        let document = NodeRef::parse_document("<div><p>old</p></div>");
        let div = &document.children()[0];
        let old = div.children()[0].clone();

        div.set_inner_html("<b>new</b> text").unwrap();
        assert_eq!(div.inner_html().as_deref(), Some("<b>new</b> text"));
        assert_eq!(old.parent_node(), None);
    }

    #[test]
    fn adjacent_markup_keeps_order() {
        let document = NodeRef::parse_document("<div><i></i></div>");
        let div = &document.children()[0];
        let i = &div.children()[0];

        i.insert_adjacent_html(Position::BeforeBegin, "<a></a><b></b>")
            .unwrap();
        i.insert_adjacent_html(Position::AfterEnd, "<s></s><u></u>")
            .unwrap();
        div.insert_adjacent_html(Position::AfterBegin, "<em></em>")
            .unwrap();

        assert_eq!(
            div.inner_html().as_deref(),
            Some("<em></em><a></a><b></b><i></i><s></s><u></u>")
        );
    }

    #[test]
    fn adjacent_markup_requires_element() {
        let document = NodeRef::document();
        assert!(document
            .insert_adjacent_html(Position::BeforeEnd, "<p></p>")
            .is_err());
    }

    #[test]
    fn cycles_are_rejected() {
        let document = NodeRef::parse_document("<div><p></p></div>");
        let div = document.children()[0].clone();
        let p = div.children()[0].clone();
        assert!(p.append_child(&div).is_err());
        assert!(div.append_child(&div).is_err());
    }

    #[test]
    fn matches_respects_capabilities() {
        let document = NodeRef::parse_document_with("<p></p>", Capabilities::DATASET);
        let p = &document.children()[0];
        assert_eq!(p.matches("p").unwrap(), None);

        let document = NodeRef::parse_document("<p></p>");
        let p = &document.children()[0];
        assert_eq!(p.matches("p").unwrap(), Some(true));
        assert!(p.matches("p[").is_err());
    }

    #[test]
    fn dataset_maps_to_data_attributes() {
        let document = NodeRef::parse_document("<p data-user-id=\"7\"></p>");
        let p = &document.children()[0];
        assert!(p.has_dataset());
        assert_eq!(p.data("userId").as_deref(), Some("7"));

        p.set_data("fooBar", "x").unwrap();
        assert_eq!(p.attr("data-foo-bar").as_deref(), Some("x"));

        let document = NodeRef::parse_document_with("<p></p>", Capabilities::MATCHES);
        let p = &document.children()[0];
        assert!(!p.has_dataset());
        assert!(p.set_data("fooBar", "x").is_err());
    }

    #[test]
    fn inline_style_is_reflected() {
        let document = NodeRef::parse_document("<p style=\"color: blue;\"></p>");
        let p = &document.children()[0];

        p.set_style("backgroundColor", "red");
        assert_eq!(p.computed_style("background-color").as_deref(), Some("red"));
        assert_eq!(p.computed_style("color").as_deref(), Some("blue"));
        assert_eq!(p.computed_style("margin").as_deref(), Some(""));
        assert_eq!(
            p.attr("style").as_deref(),
            Some("color: blue; background-color: red;")
        );

        p.set_style("color", "");
        assert_eq!(p.attr("style").as_deref(), Some("background-color: red;"));
    }

    #[test]
    fn layout_is_settable() {
        let document = NodeRef::parse_document("<p></p>");
        let p = &document.children()[0];
        let width = Dimensions {
            client: 10,
            offset: 12,
            scroll: 40,
        };
        p.set_layout(Layout {
            width,
            ..Layout::default()
        });

        assert_eq!(p.dimensions(Axis::Width), width);
        assert_eq!(p.dimensions(Axis::Height), Dimensions::default());

        p.set_scroll_top(5);
        assert_eq!(p.scroll_position().y, 5);
        assert_eq!(p.scroll_position().x, 0);
    }

    #[test]
    fn focus_tracks_active_element() {
        let document = NodeRef::parse_document("<input><input>");
        let second = document.children()[1].clone();
        second.focus();
        assert_eq!(document.active_element(), Some(second));
    }
}
