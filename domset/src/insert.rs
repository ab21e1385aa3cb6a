use domset_nodes::{HostError, Position};

use crate::{
    error::{Error, Result},
    Dom, Node,
};

/// What the insertion operations insert.
#[derive(Clone, Debug)]
pub enum Content<N> {
    /// Moved, never cloned. Inserting it at several places leaves it at the
    /// last one.
    Node(N),
    /// Each held handle is moved, keeping the set's order.
    Dom(Dom<N>),
    /// Parsed by the host at every insertion point.
    Markup(String),
}

impl<N> From<&str> for Content<N> {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl<N> From<String> for Content<N> {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

impl<N> From<Dom<N>> for Content<N> {
    fn from(dom: Dom<N>) -> Self {
        Self::Dom(dom)
    }
}

impl<N: Clone> From<&Dom<N>> for Content<N> {
    fn from(dom: &Dom<N>) -> Self {
        Self::Dom(dom.clone())
    }
}

fn insert<N: Node>(element: &N, position: Position, content: &Content<N>) -> Result<()> {
    match content {
        Content::Node(node) => element.insert_adjacent(position, node)?,
        Content::Dom(dom) => {
            // inserting right after the anchor reverses order unless walked backwards
            let reversed = matches!(position, Position::AfterBegin | Position::AfterEnd);
            if reversed {
                for node in dom.elements.iter().rev() {
                    element.insert_adjacent(position, node)?;
                }
            } else {
                for node in &dom.elements {
                    element.insert_adjacent(position, node)?;
                }
            }
        }
        Content::Markup(markup) => element.insert_adjacent_html(position, markup)?,
    }
    Ok(())
}

impl<N: Node> Dom<N> {
    fn insert_all(&self, position: Position, content: Content<N>) -> Result<&Self> {
        for element in &self.elements {
            insert(element, position, &content)?;
        }
        Ok(self)
    }

    fn require_parents(&self, before: bool) -> Result<()> {
        if self.elements.iter().all(|node| node.parent_node().is_some()) {
            Ok(())
        } else {
            Err(Error::no_parent(before))
        }
    }

    /// Inserts `content` as the previous sibling of every held element.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NoParentNode`], before touching anything, if a
    /// held element is detached.
    pub fn before(&self, content: impl Into<Content<N>>) -> Result<&Self> {
        self.require_parents(true)?;
        self.insert_all(Position::BeforeBegin, content.into())
    }

    /// Inserts `content` as the next sibling of every held element.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NoParentNode`], before touching anything, if a
    /// held element is detached.
    pub fn after(&self, content: impl Into<Content<N>>) -> Result<&Self> {
        self.require_parents(false)?;
        self.insert_all(Position::AfterEnd, content.into())
    }

    pub fn prepend(&self, content: impl Into<Content<N>>) -> Result<&Self> {
        self.insert_all(Position::AfterBegin, content.into())
    }

    pub fn append(&self, content: impl Into<Content<N>>) -> Result<&Self> {
        self.insert_all(Position::BeforeEnd, content.into())
    }

    /// Removes every child node of every held element.
    pub fn clear(&self) -> Result<&Self> {
        for element in &self.elements {
            for child in element.child_nodes() {
                element.remove_child(&child)?;
            }
        }
        Ok(self)
    }

    /// Empties the parent of every held element, taking the held elements and
    /// all of their siblings out of the tree. The set keeps its handles.
    pub fn remove(&self) -> Result<&Self> {
        self.parent(None, false)?.clear()?;
        Ok(self)
    }

    pub fn delete(&self) -> Result<&Self> {
        self.remove()
    }

    /// A new detached element from the document of the first held node.
    pub fn create(&self, tag: &str) -> Result<Self> {
        let owner = self
            .elements
            .first()
            .ok_or_else(|| HostError::new("an empty set has no document to create elements in"))?;
        Ok(Self::new(owner.create_element(tag)?))
    }

    pub fn create_element(&self, tag: &str) -> Result<Self> {
        self.create(tag)
    }
}
