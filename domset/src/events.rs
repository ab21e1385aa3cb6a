use std::rc::Rc;

use domset_nodes::EventInit;
use tracing::trace;

use crate::{error::Result, Dom, Node};

impl<N: Node> Dom<N> {
    /// Registers `handler` on every held element. It is called with a set
    /// holding just the element it was registered on.
    pub fn on<F>(&self, event: &str, handler: F) -> &Self
    where
        F: Fn(Self, N::Event) + 'static,
    {
        let handler = Rc::new(handler);
        for element in &self.elements {
            let handler = Rc::clone(&handler);
            element.listen(event, move |node, ev| handler(Self::new(node), ev));
        }
        self
    }

    /// Dispatches a bubbling, cancelable, composed event on every held
    /// element.
    pub fn trigger(&self, event: &str) -> Result<&Self> {
        trace!(event, targets = self.elements.len(), "triggering event");
        let init = EventInit::new()
            .bubbles(true)
            .cancelable(true)
            .composed(true);
        for element in &self.elements {
            element.dispatch(event, init)?;
        }
        Ok(self)
    }

    pub fn execute(&self, event: &str) -> Result<&Self> {
        self.trigger(event)
    }

    pub fn fire_event(&self, event: &str) -> Result<&Self> {
        self.trigger(event)
    }

    pub fn dispatch_event(&self, event: &str) -> Result<&Self> {
        self.trigger(event)
    }

    pub fn trigger_event(&self, event: &str) -> Result<&Self> {
        self.trigger(event)
    }

    /// Runs the host's synthetic click on every held element.
    pub fn click(&self) -> &Self {
        for element in &self.elements {
            element.click();
        }
        self
    }

    pub fn focus(&self) -> &Self {
        for element in &self.elements {
            element.focus();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use domset_nodes::Node;

    use crate::{test_util::*, Dom};

    #[test]
    fn handlers_see_their_own_element() {
        let (document, _) = fixture("<b id=\"one\"></b><b id=\"two\"></b>");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        select(&document, "b").on("ping", move |this, _| {
            log.borrow_mut().push(this.attribute("id").unwrap_or_default());
        });
        select(&document, "b").trigger("ping").unwrap();

        assert_eq!(*seen.borrow(), vec!["one", "two"]);
    }

    #[test]
    fn triggered_events_bubble_and_can_be_cancelled() {
        let (document, _) = fixture("<div><p></p></div>");
        let hits = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&hits);
        select(&document, "div").on("ping", move |_, ev| {
            assert!(ev.bubbles() && ev.cancelable() && ev.composed());
            ev.prevent_default();
            *counter.borrow_mut() += 1;
        });

        let p = select(&document, "p");
        p.execute("ping").unwrap().fire_event("ping").unwrap();
        p.dispatch_event("ping").unwrap().trigger_event("ping").unwrap();
        assert_eq!(*hits.borrow(), 4);
    }

    #[test]
    fn empty_event_names_are_rejected() {
        let (document, _) = fixture("<p></p>");
        assert!(select(&document, "p").trigger("").is_err());
        assert!(Dom::<domset_render::NodeRef>::empty().trigger("").is_ok());
    }

    #[test]
    fn click_runs_activation() {
        let (document, _) = fixture("<input type=\"checkbox\"><input type=\"checkbox\" disabled>");
        let inputs = select(&document, "input");
        let clicks = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&clicks);
        inputs.on("click", move |_, _| *counter.borrow_mut() += 1);
        inputs.click();

        assert_eq!(*clicks.borrow(), 1);
        assert_eq!(select(&document, "input:checked").len(), 1);
    }

    #[test]
    fn focus_moves_the_active_element() {
        let (document, _) = fixture("<input><input>");
        let last = document.children()[1].clone();
        Dom::new(last.clone()).focus();
        assert_eq!(document.active_element(), Some(last));
    }
}
