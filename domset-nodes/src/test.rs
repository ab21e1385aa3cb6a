// TODO: cover geometry once a backend with real layout can run these natively

/// Checks a backend against the [`Node`](crate::Node) contract.
///
/// `$document` must evaluate to a document node. The fixture is mounted under
/// its `body` when there is one, or directly under the document otherwise.
#[macro_export]
macro_rules! behavior_tests {
    ($document:expr) => {{
        use ::std::{cell::Cell, rc::Rc};
        use $crate::{EventInit, Node, NodeType, Position};

        let document = $document;
        assert_eq!(document.node_type(), NodeType::Document);

        let mount = document
            .query_selector_all("body")
            .unwrap()
            .into_iter()
            .next()
            .unwrap_or_else(|| document.clone());

        let root = document.create_element("div").unwrap();
        mount.append_child(&root).unwrap();
        assert_eq!(root.parent_node(), Some(mount.clone()));
        assert_eq!(root.parent_element().is_some(), mount.is_element());

        let a = document.create_element("p").unwrap();
        let b = document.create_element("p").unwrap();
        root.append_child(&a).unwrap();
        root.append_child(&b).unwrap();

        assert_eq!(root.children(), vec![a.clone(), b.clone()]);
        assert_eq!(a.next_sibling(), Some(b.clone()));
        assert_eq!(b.previous_sibling(), Some(a.clone()));
        assert_eq!(a.owner_document(), Some(document.clone()));

        // inserting an attached node moves it
        root.insert_before(&b, Some(&a)).unwrap();
        assert_eq!(root.children(), vec![b.clone(), a.clone()]);

        a.insert_adjacent_html(Position::AfterEnd, "<span class=\"x\">1</span>")
            .unwrap();
        a.insert_adjacent_html(Position::BeforeBegin, "text")
            .unwrap();
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.child_nodes().len(), 4);

        let found = root.query_selector_all("span.x").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].matches("div > span").unwrap(), Some(true));
        assert_eq!(found[0].inner_html().as_deref(), Some("1"));

        a.set_attr("title", "hello").unwrap();
        assert_eq!(a.attr("title").as_deref(), Some("hello"));
        assert!(a.has_attr("title"));
        a.remove_attr("title");
        assert_eq!(a.attr("title"), None);

        let input = document.create_element("input").unwrap();
        assert!(input.value().is_some());
        assert_eq!(input.checked(), Some(false));
        assert_eq!(root.value(), None);
        input.set_value("typed");
        assert_eq!(input.value().as_deref(), Some("typed"));

        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        root.listen("ping", move |node, _| {
            assert_eq!(node.children().len(), 3);
            counter.set(counter.get() + 1);
        });
        a.dispatch("ping", EventInit::new().bubbles(true)).unwrap();
        a.dispatch("ping", EventInit::new()).unwrap();
        assert_eq!(hits.get(), 1);

        root.remove_child(&a).unwrap();
        assert_eq!(a.parent_node(), None);
    }};
}
