use indexmap::{map::Entry, IndexMap};

use crate::{error::Result, insert::Content, Dom, Node};

/// What [`Dom::value`] reads.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    /// The value, or inner markup, of a lone element.
    Single(String),
    /// Form-style grouping of several elements by field name.
    Map(IndexMap<String, Field>),
}

/// The value(s) collected under one field name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Field {
    One(String),
    Many(Vec<String>),
}

impl Field {
    fn push(&mut self, value: String) {
        match self {
            Self::One(first) => *self = Self::Many(vec![std::mem::take(first), value]),
            Self::Many(values) => values.push(value),
        }
    }
}

fn is_toggle<N: Node>(node: &N) -> bool {
    node.attr("type").is_some_and(|kind| {
        kind.eq_ignore_ascii_case("radio") || kind.eq_ignore_ascii_case("checkbox")
    })
}

impl<N: Node> Dom<N> {
    /// The inner markup of held elements. When several are non-empty the last
    /// one wins.
    pub fn content(&self) -> Option<String> {
        self.elements
            .iter()
            .rev()
            .filter_map(N::inner_html)
            .find(|markup| !markup.is_empty())
    }

    pub fn html(&self) -> Option<String> {
        self.content()
    }

    pub fn inner_html(&self) -> Option<String> {
        self.content()
    }

    /// Replaces the content of every held element with parsed `markup`.
    pub fn set_content(&self, markup: &str) -> Result<&Self> {
        for element in self.elements.iter().filter(|node| node.is_element()) {
            element.set_inner_html(markup)?;
        }
        Ok(self)
    }

    pub fn set_html(&self, markup: &str) -> Result<&Self> {
        self.set_content(markup)
    }

    pub fn set_inner_html(&self, markup: &str) -> Result<&Self> {
        self.set_content(markup)
    }

    /// Element children of every held node, concatenated.
    pub fn children(&self) -> Self {
        let children = self.elements.iter().flat_map(N::children).collect();
        Self::from_nodes(children).traced("children", self.len())
    }

    /// Empties every held element, then appends `content` to it.
    pub fn set_children(&self, content: impl Into<Content<N>>) -> Result<&Self> {
        self.clear()?.append(content)
    }

    // Form values //

    fn single_value(element: &N) -> Option<String> {
        element.value().or_else(|| element.inner_html())
    }

    /// A lone element reports its form value, or its inner markup when it
    /// has none. Several elements are grouped by field name.
    pub fn value(&self) -> Option<Value> {
        match self.elements.as_slice() {
            [] => None,
            [element] => Self::single_value(element).map(Value::Single),
            elements => Some(Value::Map(Self::fields(elements))),
        }
    }

    fn fields(elements: &[N]) -> IndexMap<String, Field> {
        let mut fields: IndexMap<String, Field> = IndexMap::new();
        for element in elements {
            if is_toggle(element) && element.checked() != Some(true) {
                continue;
            }
            let holder = Self::new(element.clone());
            let Some(name) = holder.attribute("name").or_else(|| holder.data("name")) else {
                continue;
            };
            let Some(value) = Self::single_value(element) else {
                continue;
            };

            match fields.entry(name) {
                Entry::Occupied(mut entry) => entry.get_mut().push(value),
                Entry::Vacant(entry) => {
                    entry.insert(Field::One(value));
                }
            }
        }
        fields
    }

    pub fn set_value(&self, value: &str) -> &Self {
        for element in &self.elements {
            element.set_value(value);
        }
        self
    }

    // Checked state //

    pub fn check(&self, on: bool) -> &Self {
        for element in &self.elements {
            element.set_checked(on);
        }
        self
    }

    pub fn set_checked(&self, on: bool) -> &Self {
        self.check(on)
    }

    /// Whether any held element is checked.
    pub fn is_checked(&self) -> bool {
        self.elements
            .iter()
            .any(|element| element.checked() == Some(true))
    }

    pub fn checked(&self) -> bool {
        self.is_checked()
    }
}
