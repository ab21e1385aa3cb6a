use std::thread_local;

use domset_nodes::{
    Axis, Dimensions, EventInit, HostError, Node, NodeType, Offset, Position, ScrollPosition,
};
use js_sys::Reflect;
use wasm_bindgen::{intern, prelude::*, JsCast};

thread_local! {
    static WINDOW: web_sys::Window = web_sys::window().expect("JavaScript window undefined");

    static DOCUMENT: web_sys::Document = WINDOW
        .with(web_sys::Window::document)
        .expect("JavaScript window.document undefined");
}

/// # Panics
///
/// Panics outside a browser main thread.
pub fn window() -> web_sys::Window {
    WINDOW.with(Clone::clone)
}

/// # Panics
///
/// Panics outside a browser main thread.
pub fn document() -> web_sys::Document {
    DOCUMENT.with(Clone::clone)
}

/// A handle onto a live browser node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebNode(web_sys::Node);

type EventClosure = Closure<dyn Fn(web_sys::Event)>;

impl WebNode {
    pub fn native(&self) -> &web_sys::Node {
        &self.0
    }

    fn element(&self) -> Option<&web_sys::Element> {
        self.0.dyn_ref::<web_sys::Element>()
    }

    fn html_element(&self) -> Option<&web_sys::HtmlElement> {
        self.0.dyn_ref::<web_sys::HtmlElement>()
    }

    /// `property in node`, the way scripts probe for optional features.
    fn exposes(&self, property: &str) -> bool {
        Reflect::has(&self.0, &JsValue::from_str(intern(property))).unwrap_or(false)
    }

    fn property(&self, property: &str) -> Option<JsValue> {
        if self.exposes(property) {
            Reflect::get(&self.0, &JsValue::from_str(intern(property))).ok()
        } else {
            None
        }
    }

    fn list(nodes: web_sys::NodeList) -> Vec<Self> {
        (0..nodes.length())
            .filter_map(|idx| nodes.get(idx))
            .map(Self)
            .collect()
    }
}

impl From<web_sys::Node> for WebNode {
    fn from(native: web_sys::Node) -> Self {
        Self(native)
    }
}

impl From<web_sys::Element> for WebNode {
    fn from(native: web_sys::Element) -> Self {
        Self(native.into())
    }
}

impl From<web_sys::Document> for WebNode {
    fn from(native: web_sys::Document) -> Self {
        Self(native.into())
    }
}

impl Node for WebNode {
    type Event = web_sys::Event;

    fn node_type(&self) -> NodeType {
        match self.0.node_type() {
            web_sys::Node::DOCUMENT_NODE => NodeType::Document,
            web_sys::Node::ELEMENT_NODE => NodeType::Element,
            web_sys::Node::TEXT_NODE => NodeType::Text,
            web_sys::Node::COMMENT_NODE => NodeType::Comment,
            _ => NodeType::Other,
        }
    }

    fn owner_document(&self) -> Option<Self> {
        match self.0.dyn_ref::<web_sys::Document>() {
            Some(document) => Some(document.clone().into()),
            None => self.0.owner_document().map(Self::from),
        }
    }

    fn create_element(&self, tag: &str) -> Result<Self, HostError> {
        let document = self
            .owner_document()
            .ok_or_else(|| HostError::new("the node has no owner document"))?;
        let element = document
            .0
            .unchecked_ref::<web_sys::Document>()
            .create_element(intern(tag))?;
        Ok(element.into())
    }

    fn parent_node(&self) -> Option<Self> {
        self.0.parent_node().map(Self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.0.parent_element().map(Self::from)
    }

    fn child_nodes(&self) -> Vec<Self> {
        Self::list(self.0.child_nodes())
    }

    fn next_sibling(&self) -> Option<Self> {
        self.0.next_sibling().map(Self)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.0.previous_sibling().map(Self)
    }

    fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), HostError> {
        self.0
            .insert_before(&child.0, reference.map(|node| &node.0))?;
        Ok(())
    }

    fn remove_child(&self, child: &Self) -> Result<(), HostError> {
        self.0.remove_child(&child.0)?;
        Ok(())
    }

    fn insert_adjacent_html(&self, position: Position, markup: &str) -> Result<(), HostError> {
        let element = self
            .element()
            .ok_or_else(|| HostError::new("markup can only be inserted around elements"))?;
        element.insert_adjacent_html(position.as_str(), markup)?;
        Ok(())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>, HostError> {
        let nodes = if let Some(element) = self.element() {
            element.query_selector_all(selector)?
        } else if let Some(document) = self.0.dyn_ref::<web_sys::Document>() {
            document.query_selector_all(selector)?
        } else {
            return Ok(Vec::new());
        };
        Ok(Self::list(nodes))
    }

    fn matches(&self, selector: &str) -> Result<Option<bool>, HostError> {
        match self.element() {
            Some(element) if self.exposes("matches") => Ok(Some(element.matches(selector)?)),
            _ => Ok(None),
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.element()?.get_attribute(name)
    }

    fn has_attr(&self, name: &str) -> bool {
        self.element()
            .is_some_and(|element| element.has_attribute(name))
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), HostError> {
        let element = self
            .element()
            .ok_or_else(|| HostError::new("attributes only exist on element nodes"))?;
        element.set_attribute(intern(name), value)?;
        Ok(())
    }

    fn remove_attr(&self, name: &str) {
        if let Some(element) = self.element() {
            // removing an absent attribute is not an error
            let _ = element.remove_attribute(intern(name));
        }
    }

    fn has_dataset(&self) -> bool {
        self.html_element().is_some() && self.exposes("dataset")
    }

    fn data(&self, key: &str) -> Option<String> {
        if self.has_dataset() {
            self.html_element()?.dataset().get(key)
        } else {
            None
        }
    }

    fn set_data(&self, key: &str, value: &str) -> Result<(), HostError> {
        match self.html_element() {
            Some(element) if self.has_dataset() => {
                element.dataset().set(key, value)?;
                Ok(())
            }
            _ => Err(HostError::new("the node has no dataset")),
        }
    }

    fn inner_html(&self) -> Option<String> {
        self.element().map(web_sys::Element::inner_html)
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), HostError> {
        let element = self
            .element()
            .ok_or_else(|| HostError::new("markup can only be assigned to elements"))?;
        element.set_inner_html(markup);
        Ok(())
    }

    fn outer_html(&self) -> String {
        if let Some(element) = self.element() {
            element.outer_html()
        } else if let Some(document) = self.0.dyn_ref::<web_sys::Document>() {
            document
                .document_element()
                .map(|root| root.outer_html())
                .unwrap_or_default()
        } else {
            String::new()
        }
    }

    fn value(&self) -> Option<String> {
        let value = self.property("value")?;
        value
            .as_string()
            .or_else(|| value.as_f64().map(|number| number.to_string()))
    }

    fn set_value(&self, value: &str) {
        if self.exposes("value") {
            let _ = Reflect::set(&self.0, &intern("value").into(), &value.into());
        }
    }

    fn checked(&self) -> Option<bool> {
        self.property("checked")?.as_bool()
    }

    fn set_checked(&self, checked: bool) {
        if self.exposes("checked") {
            let _ = Reflect::set(&self.0, &intern("checked").into(), &checked.into());
        }
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        let style = window().get_computed_style(self.element()?).ok()??;
        style.get_property_value(property).ok()
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Some(element) = self.html_element() {
            let _ = Reflect::set(&element.style(), &property.into(), &value.into());
        }
    }

    fn dimensions(&self, axis: Axis) -> Dimensions {
        let Some(element) = self.element() else {
            return Dimensions::default();
        };
        let offset = self.html_element();

        match axis {
            Axis::Width => Dimensions {
                client: element.client_width(),
                offset: offset.map_or(0, web_sys::HtmlElement::offset_width),
                scroll: element.scroll_width(),
            },
            Axis::Height => Dimensions {
                client: element.client_height(),
                offset: offset.map_or(0, web_sys::HtmlElement::offset_height),
                scroll: element.scroll_height(),
            },
        }
    }

    fn offset(&self) -> Offset {
        self.html_element()
            .map(|element| Offset {
                top: element.offset_top(),
                left: element.offset_left(),
            })
            .unwrap_or_default()
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.element()
            .map(|element| ScrollPosition {
                x: element.scroll_left(),
                y: element.scroll_top(),
            })
            .unwrap_or_default()
    }

    fn set_scroll_left(&self, value: i32) {
        if let Some(element) = self.element() {
            element.set_scroll_left(value);
        }
    }

    fn set_scroll_top(&self, value: i32) {
        if let Some(element) = self.element() {
            element.set_scroll_top(value);
        }
    }

    fn listen<F>(&self, event: &str, f: F)
    where
        F: Fn(Self, Self::Event) + 'static,
    {
        let closure = EventClosure::new(move |event: web_sys::Event| {
            if let Some(target) = event.current_target() {
                f(Self(target.unchecked_into()), event);
            }
        });

        // the JS side owns the closure from here on
        let closure = closure.into_js_value();
        let _ = self
            .0
            .add_event_listener_with_callback(intern(event), closure.unchecked_ref());
    }

    fn dispatch(&self, event: &str, init: EventInit) -> Result<bool, HostError> {
        let native = web_sys::EventInit::new();
        native.set_bubbles(init.bubbles);
        native.set_cancelable(init.cancelable);
        native.set_composed(init.composed);

        let event = web_sys::Event::new_with_event_init_dict(intern(event), &native)?;
        Ok(self.0.dispatch_event(&event)?)
    }

    fn click(&self) {
        if let Some(element) = self.html_element() {
            element.click();
        }
    }

    fn focus(&self) {
        if let Some(element) = self.html_element() {
            let _ = element.focus();
        }
    }
}
