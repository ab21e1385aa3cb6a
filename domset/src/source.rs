use indexmap::IndexSet;
use tracing::debug;

use crate::{
    error::{Error, Result},
    Dom, Node,
};

/// Everything a [`Dom`] can be built from.
#[derive(Clone, Debug)]
pub enum Source<N> {
    /// Another set; its handles are copied.
    Dom(Dom<N>),
    /// A live or materialized node list.
    NodeList(Vec<N>),
    Node(N),
    Set(IndexSet<N>),
    /// Handles and sets mixed together, flattened one level.
    Array(Vec<Item<N>>),
    /// The absent value. Building from it fails.
    Nothing,
}

/// One entry of a [`Source::Array`].
#[derive(Clone, Debug)]
pub enum Item<N> {
    Node(N),
    Dom(Dom<N>),
    Nothing,
}

impl<N> From<Dom<N>> for Source<N> {
    fn from(dom: Dom<N>) -> Self {
        Self::Dom(dom)
    }
}

impl<N: Clone> From<&Dom<N>> for Source<N> {
    fn from(dom: &Dom<N>) -> Self {
        Self::Dom(dom.clone())
    }
}

impl<N: Node> From<N> for Source<N> {
    fn from(node: N) -> Self {
        Self::Node(node)
    }
}

impl<N> From<Vec<N>> for Source<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self::NodeList(nodes)
    }
}

impl<N> From<Option<N>> for Source<N> {
    fn from(node: Option<N>) -> Self {
        node.map_or(Self::Nothing, Self::Node)
    }
}

impl<N> From<IndexSet<N>> for Source<N> {
    fn from(set: IndexSet<N>) -> Self {
        Self::Set(set)
    }
}

impl<N> From<Vec<Item<N>>> for Source<N> {
    fn from(items: Vec<Item<N>>) -> Self {
        Self::Array(items)
    }
}

impl<N: Node> From<N> for Item<N> {
    fn from(node: N) -> Self {
        Self::Node(node)
    }
}

impl<N> From<Dom<N>> for Item<N> {
    fn from(dom: Dom<N>) -> Self {
        Self::Dom(dom)
    }
}

impl<N> From<Option<N>> for Item<N> {
    fn from(node: Option<N>) -> Self {
        node.map_or(Self::Nothing, Self::Node)
    }
}

fn is_accepted<N: Node>(node: &N) -> bool {
    node.is_element() || node.is_document()
}

/// Keeps the documents and elements of `nodes`, in order.
pub(crate) fn accepted<N: Node>(nodes: Vec<N>) -> Vec<N> {
    let total = nodes.len();
    let kept: Vec<N> = nodes.into_iter().filter(is_accepted).collect();
    if kept.len() < total {
        debug!(
            dropped = total - kept.len(),
            "ignoring nodes that are neither documents nor elements"
        );
    }
    kept
}

fn flatten<N: Node>(items: impl IntoIterator<Item = Item<N>>) -> Vec<N> {
    let mut nodes = Vec::new();
    for item in items {
        match item {
            Item::Node(node) => nodes.push(node),
            Item::Dom(dom) => nodes.extend(dom.elements),
            Item::Nothing => {}
        }
    }
    accepted(nodes)
}

impl<N: Node> Dom<N> {
    /// Builds a set from any supported [`Source`].
    ///
    /// Containers silently drop entries that are neither documents nor
    /// elements. Only [`Source::Nothing`] is rejected.
    pub fn from_source(source: impl Into<Source<N>>) -> Result<Self> {
        let elements = match source.into() {
            Source::Dom(dom) => dom.elements,
            Source::NodeList(nodes) => accepted(nodes),
            Source::Node(node) => accepted(vec![node]),
            Source::Set(set) => flatten(set.into_iter().map(Item::Node)),
            Source::Array(items) => flatten(items),
            Source::Nothing => return Err(Error::invalid_source()),
        };
        Ok(Self { elements })
    }
}

impl<N: Node> TryFrom<Source<N>> for Dom<N> {
    type Error = Error;

    fn try_from(source: Source<N>) -> Result<Self> {
        Self::from_source(source)
    }
}

#[cfg(test)]
mod tests {
    use domset_nodes::Node;
    use domset_render::NodeRef;
    use indexmap::IndexSet;

    use crate::{test_util::*, Dom, Item, Source};

    #[test]
    fn array_is_flattened_and_filtered() {
        let (document, _) = fixture("<a></a><b></b><c></c><d></d>");
        let [a, b, c, d] = <[NodeRef; 4]>::try_from(document.children()).unwrap();
        let pair = Dom::<NodeRef>::from_source(vec![b.clone(), c.clone()]).unwrap();

        let dom = Dom::<NodeRef>::from_source(vec![
            Item::Node(a.clone()),
            Item::Dom(pair),
            Item::Nothing,
            Item::Node(d.clone()),
        ])
        .unwrap();

        assert_eq!(dom.elements(), &[a, b, c, d]);
    }

    #[test]
    fn containers_drop_text_nodes() {
        let (document, _) = fixture("<p>text</p>");
        let p = document.children()[0].clone();
        let text = p.child_nodes()[0].clone();

        let list = Dom::<NodeRef>::from_source(vec![text.clone(), p.clone()]).unwrap();
        assert_eq!(list.elements(), &[p.clone()]);

        let set: IndexSet<NodeRef> = [text, p.clone()].into_iter().collect();
        assert_eq!(Dom::<NodeRef>::from_source(set).unwrap().elements(), &[p]);
    }

    #[test]
    fn copies_share_handles() {
        let (document, dom) = fixture("<p></p>");
        let copy = Dom::<NodeRef>::from_source(&dom).unwrap();
        assert_eq!(copy.elements(), &[document]);
    }

    #[test]
    fn nothing_is_rejected() {
        let err = Dom::<NodeRef>::from_source(Source::Nothing).unwrap_err();
        assert_eq!(err.code(), "E_DOM_CONSTRUCTOR_INVALID_ARGUMENT");

        let err = Dom::<NodeRef>::from_source(None).unwrap_err();
        assert_eq!(err.code(), "E_DOM_CONSTRUCTOR_INVALID_ARGUMENT");
    }

    #[test]
    fn duplicates_are_kept() {
        let (document, _) = fixture("<p></p>");
        let p = document.children()[0].clone();
        let dom = Dom::<NodeRef>::from_source(vec![p.clone(), p.clone()]).unwrap();
        assert_eq!(dom.len(), 2);
    }
}
