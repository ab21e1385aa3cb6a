use crate::{
    error::{Error, Result},
    Dom, Node,
};

/// What [`Dom::is`] compares the set against.
#[derive(Clone, Debug)]
pub enum Matcher<N> {
    Selector(String),
    /// Equal iff both sets hold the same handles, in any order.
    Dom(Dom<N>),
    /// Equal iff the handle is held.
    Node(N),
}

impl<N> From<&str> for Matcher<N> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl<N> From<String> for Matcher<N> {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl<N> From<Dom<N>> for Matcher<N> {
    fn from(dom: Dom<N>) -> Self {
        Self::Dom(dom)
    }
}

impl<N: Clone> From<&Dom<N>> for Matcher<N> {
    fn from(dom: &Dom<N>) -> Self {
        Self::Dom(dom.clone())
    }
}

/// Whether a single node matches `selector`. Nodes that cannot be held never
/// match; a host without a matching primitive is an error.
fn matches_selector<N: Node>(node: &N, selector: &str) -> Result<bool> {
    if !node.is_element() && !node.is_document() {
        return Ok(false);
    }
    node.matches(selector)?
        .ok_or_else(Error::unsupported_matching)
}

fn closest_ancestor<N: Node>(element: &N, selector: &str) -> Result<Option<N>> {
    let mut cursor = element.parent_element();
    while let Some(node) = cursor {
        if matches_selector(&node, selector)? {
            return Ok(Some(node));
        }
        cursor = node.parent_element();
    }
    Ok(None)
}

impl<N: Node> Dom<N> {
    /// Every descendant of every held element matching `selector`, in element
    /// order then document order.
    pub fn select(&self, selector: &str) -> Result<Self> {
        self.select_from(selector, None)
    }

    /// Like [`select`](Self::select), but each held element queries `root`
    /// instead of itself when one is given.
    pub fn select_from(&self, selector: &str, root: Option<&N>) -> Result<Self> {
        let mut found = Vec::new();
        for element in &self.elements {
            let scope = root.unwrap_or(element);
            found.extend(scope.query_selector_all(selector)?);
        }
        Ok(Self::from_nodes(found).traced("select", self.len()))
    }

    pub fn find(&self, selector: &str) -> Result<Self> {
        self.select(selector)
    }

    /// Without a selector, the immediate parent element of each held element.
    /// With one, the closest ancestor matching it, starting from the element
    /// itself when `include_self` is set.
    pub fn parent(&self, selector: Option<&str>, include_self: bool) -> Result<Self> {
        let mut found = Vec::new();
        for element in &self.elements {
            let Some(selector) = selector else {
                found.extend(element.parent_element());
                continue;
            };

            let mut cursor = if include_self {
                Some(element.clone())
            } else {
                element.parent_element()
            };
            while let Some(node) = cursor {
                if matches_selector(&node, selector)? {
                    found.push(node);
                    break;
                }
                cursor = node.parent_element();
            }
        }
        Ok(Self::from_nodes(found).traced("parent", self.len()))
    }

    /// Element siblings of each held element that match `selector`, skipping
    /// anything already held.
    pub fn siblings(&self, selector: &str) -> Result<Self> {
        let mut found = Vec::new();
        for element in &self.elements {
            let Some(parent) = element.parent_node() else {
                continue;
            };
            for sibling in parent.children() {
                if !self.is_element_held(&sibling) && matches_selector(&sibling, selector)? {
                    found.push(sibling);
                }
            }
        }
        Ok(Self::from_nodes(found).traced("siblings", self.len()))
    }

    pub fn get_siblings(&self, selector: &str) -> Result<Self> {
        self.siblings(selector)
    }

    /// The first following sibling of each held element matching `selector`.
    pub fn next(&self, selector: &str) -> Result<Self> {
        self.walk("next", selector, N::next_sibling)
    }

    pub fn next_siblings(&self, selector: &str) -> Result<Self> {
        self.next(selector)
    }

    /// The first preceding sibling of each held element matching `selector`.
    pub fn previous(&self, selector: &str) -> Result<Self> {
        self.walk("previous", selector, N::previous_sibling)
    }

    pub fn previous_siblings(&self, selector: &str) -> Result<Self> {
        self.previous(selector)
    }

    fn walk(
        &self,
        operation: &'static str,
        selector: &str,
        step: fn(&N) -> Option<N>,
    ) -> Result<Self> {
        let mut found = Vec::new();
        for element in &self.elements {
            let mut cursor = step(element);
            while let Some(node) = cursor {
                if matches_selector(&node, selector)? {
                    found.push(node);
                    break;
                }
                cursor = step(&node);
            }
        }
        Ok(Self::from_nodes(found).traced(operation, self.len()))
    }

    /// The held elements matching `selector`.
    pub fn filter(&self, selector: &str) -> Result<Self> {
        let mut kept = Vec::new();
        for element in &self.elements {
            if matches_selector(element, selector)? {
                kept.push(element.clone());
            }
        }
        Ok(Self { elements: kept }.traced("filter", self.len()))
    }

    /// An empty set is never anything.
    ///
    /// # Errors
    ///
    /// Matching a selector fails with [`Error::UnsupportedEnvironment`] when
    /// a held node offers no way to match it.
    pub fn is(&self, matcher: impl Into<Matcher<N>>) -> Result<bool> {
        if self.elements.is_empty() {
            return Ok(false);
        }

        match matcher.into() {
            Matcher::Dom(other) => Ok(self.elements.len() == other.elements.len()
                && self.elements.iter().all(|node| other.is_element_held(node))
                && other.elements.iter().all(|node| self.is_element_held(node))),
            Matcher::Node(node) => Ok(self.is_element_held(&node)),
            Matcher::Selector(selector) => {
                for element in &self.elements {
                    if !matches_selector(element, &selector)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Whether every held element has a strict ancestor matching `selector`.
    pub fn is_child_of(&self, selector: &str) -> Result<bool> {
        if self.elements.is_empty() {
            return Ok(false);
        }
        for element in &self.elements {
            if closest_ancestor(element, selector)?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use domset_nodes::Node;
    use domset_render::{Capabilities, NodeRef};

    use crate::{test_util::*, Dom, Matcher};

    const LIST: &str = "<ul id=\"list\"><li class=\"a\">1</li><li class=\"b\">2</li>text\
                        <li class=\"a\">3</li><li class=\"c\">4</li></ul><p></p>";

    fn ids(dom: &Dom<NodeRef>) -> Vec<String> {
        dom.iter().map(|node| node.text_content()).collect()
    }

    #[test]
    fn select_concatenates_per_element() {
        let (document, _) = fixture("<div><b>1</b></div><div><b>2</b><b>3</b></div>");
        let divs = select(&document, "div");
        assert_eq!(ids(&divs.find("b").unwrap()), vec!["1", "2", "3"]);
    }

    #[test]
    fn select_from_queries_the_root_for_each_element() {
        let (document, _) = fixture("<i></i><i></i><b>x</b>");
        let found = select(&document, "i").select_from("b", Some(&document)).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn invalid_selectors_surface_as_host_errors() {
        let (_, dom) = fixture("<p></p>");
        assert_eq!(dom.select("p[").unwrap_err().code(), "E_DOM_HOST");
    }

    #[test]
    fn parent_without_selector() {
        let (document, _) = fixture(LIST);
        let parents = select(&document, "li.a").parent(None, false).unwrap();
        assert_eq!(parents.len(), 2);
        assert!(parents.iter().all(|node| node.attr("id").as_deref() == Some("list")));

        // the document is a parent node, but not a parent element
        assert!(select(&document, "ul").parent(None, false).unwrap().is_empty());
    }

    #[test]
    fn parent_skips_elements_without_a_match() {
        let (document, _) = fixture(LIST);
        let held = select(&document, "li.b, p");
        let found = held.parent(Some("ul"), false).unwrap();

        assert_eq!(found.len(), 1);
        assert!(found.len() <= held.len());
    }

    #[test]
    fn parent_can_start_at_self() {
        let (document, _) = fixture(LIST);
        let li = select(&document, "li.b");
        assert!(li.parent(Some("li"), false).unwrap().is_empty());
        assert_eq!(li.parent(Some("li"), true).unwrap().elements(), li.elements());
    }

    #[test]
    fn siblings_exclude_held_elements() {
        let (document, _) = fixture(LIST);
        let first = select(&document, "li.a");
        assert_eq!(ids(&first.siblings("li").unwrap()), vec!["2", "4", "2", "4"]);
        assert_eq!(ids(&first.get_siblings(".c").unwrap()), vec!["4", "4"]);
    }

    #[test]
    fn next_and_previous_stop_at_first_match() {
        let (document, _) = fixture(LIST);
        let b = select(&document, "li.b");

        assert_eq!(ids(&b.next(".a").unwrap()), vec!["3"]);
        assert_eq!(ids(&b.next_siblings("li").unwrap()), vec!["3"]);
        assert_eq!(ids(&b.previous("li").unwrap()), vec!["1"]);
        assert!(b.previous_siblings(".c").unwrap().is_empty());
    }

    #[test]
    fn filter_keeps_matches_in_order() {
        let (document, _) = fixture(LIST);
        let kept = select(&document, "li").filter(".a, .c").unwrap();
        assert_eq!(ids(&kept), vec!["1", "3", "4"]);
    }

    #[test]
    fn is_on_empty_set_is_false() {
        let dom = Dom::<NodeRef>::empty();
        assert!(!dom.is("*").unwrap());
        assert!(!dom.is(Dom::<NodeRef>::empty()).unwrap());
    }

    #[test]
    fn is_with_selector_requires_every_element() {
        let (document, _) = fixture(LIST);
        assert!(select(&document, "li.a").is("li").unwrap());
        assert!(!select(&document, "li").is(".a").unwrap());
    }

    #[test]
    fn is_compares_membership() {
        let (document, _) = fixture(LIST);
        let all = select(&document, "li");
        let reversed = Dom::<NodeRef>::from_source(all.iter().rev().cloned().collect::<Vec<_>>())
            .unwrap();

        assert!(all.is(&reversed).unwrap());
        assert!(!all.is(select(&document, "li.a")).unwrap());

        let first = all.first().cloned().unwrap();
        assert!(all.is(Matcher::Node(first)).unwrap());
        assert!(!all.is(Matcher::Node(document)).unwrap());
    }

    #[test]
    fn selectors_need_a_matching_host() {
        let document = NodeRef::parse_document_with("<p></p>", Capabilities::DATASET);
        let p = Dom::new(document.clone()).select("p").unwrap();

        let err = p.is("p").unwrap_err();
        assert_eq!(err.code(), "E_DOM_BROWSER_UNSUPPORTED");

        // documents never expose a matching primitive
        assert!(Dom::new(document).is("p").is_err());
    }

    #[test]
    fn is_child_of_requires_every_element() {
        let (document, _) = fixture(LIST);
        assert!(select(&document, "li").is_child_of("#list").unwrap());
        assert!(!select(&document, "li, p").is_child_of("ul").unwrap());
        assert!(!select(&document, "ul").is_child_of("ul").unwrap());
        assert!(!Dom::<NodeRef>::empty().is_child_of("*").unwrap());
    }
}
