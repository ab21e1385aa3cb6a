use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use domset_nodes::{EventInit, Node};

use crate::NodeRef;

/// A synthetic event travelling through a render tree.
#[derive(Clone)]
pub struct Event(Rc<Inner>);

struct Inner {
    name: String,
    init: EventInit,
    target: NodeRef,
    current_target: RefCell<Option<NodeRef>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    fn new(name: &str, init: EventInit, target: NodeRef) -> Self {
        Self(Rc::new(Inner {
            name: name.to_string(),
            init,
            target,
            current_target: RefCell::default(),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bubbles(&self) -> bool {
        self.0.init.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.0.init.cancelable
    }

    pub fn composed(&self) -> bool {
        self.0.init.composed
    }

    pub fn target(&self) -> NodeRef {
        self.0.target.clone()
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeRef> {
        self.0.current_target.borrow().clone()
    }

    /// Has no effect unless the event is cancelable.
    pub fn prevent_default(&self) {
        if self.cancelable() {
            self.0.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.0.propagation_stopped.set(true);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.0.name)
            .field("init", &self.0.init)
            .field("target", &self.0.target)
            .field("default_prevented", &self.default_prevented())
            .finish()
    }
}

/// Delivers an event to `target` and, if it bubbles, each of its ancestors.
///
/// Returns `false` if a listener cancelled it.
pub(crate) fn dispatch(target: &NodeRef, name: &str, init: EventInit) -> bool {
    let event = Event::new(name, init, target.clone());

    let mut path = vec![target.clone()];
    if init.bubbles {
        let mut cursor = target.parent_node();
        while let Some(node) = cursor {
            cursor = node.parent_node();
            path.push(node);
        }
    }

    tracing::trace!(event = name, path = path.len(), "dispatching render event");

    for node in path {
        // listeners may mutate the tree, so never hold a borrow while calling them
        let listeners: Vec<_> = node
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        if listeners.is_empty() {
            continue;
        }

        event.0.current_target.replace(Some(node.clone()));
        for listener in listeners {
            listener(node.clone(), event.clone());
        }

        if event.0.propagation_stopped.get() {
            break;
        }
    }

    event.0.current_target.replace(None);
    !event.default_prevented()
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use domset_nodes::{EventInit, Node};

    use crate::NodeRef;

    #[test]
    fn bubbling_visits_ancestors_in_order() {
        let document = NodeRef::parse_document("<div><p><b></b></p></div>");
        let b = document.query_selector_all("b").unwrap().remove(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        for selector in ["div", "p", "b"] {
            let node = document.query_selector_all(selector).unwrap().remove(0);
            let log = Rc::clone(&seen);
            node.listen("poke", move |_, ev| {
                let current = ev.current_target().and_then(|node| node.tag_name());
                log.borrow_mut().push(current.unwrap_or_default());
            });
        }

        b.dispatch("poke", EventInit::new().bubbles(true)).unwrap();
        assert_eq!(*seen.borrow(), vec!["b", "p", "div"]);
    }

    #[test]
    fn stop_propagation_halts_bubbling() {
        let document = NodeRef::parse_document("<div><p></p></div>");
        let div = document.children()[0].clone();
        let p = div.children()[0].clone();
        let reached = Rc::new(RefCell::new(false));

        p.listen("poke", |_, ev| ev.stop_propagation());
        let flag = Rc::clone(&reached);
        div.listen("poke", move |_, _| *flag.borrow_mut() = true);

        p.dispatch("poke", EventInit::new().bubbles(true)).unwrap();
        assert!(!*reached.borrow());
    }

    #[test]
    fn prevent_default_needs_cancelable() {
        let document = NodeRef::parse_document("<p></p>");
        let p = document.children()[0].clone();
        p.listen("poke", |_, ev| ev.prevent_default());

        assert!(p.dispatch("poke", EventInit::new()).unwrap());
        assert!(!p.dispatch("poke", EventInit::new().cancelable(true)).unwrap());
    }

    #[test]
    fn target_is_the_dispatching_node() {
        let document = NodeRef::parse_document("<div><p></p></div>");
        let div = document.children()[0].clone();
        let p = div.children()[0].clone();
        let target = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&target);
        div.listen("poke", move |node, ev| {
            assert_eq!(node.tag_name().as_deref(), Some("div"));
            *slot.borrow_mut() = Some(ev.target());
        });
        p.dispatch("poke", EventInit::new().bubbles(true)).unwrap();

        assert_eq!(*target.borrow(), Some(p));
    }
}
