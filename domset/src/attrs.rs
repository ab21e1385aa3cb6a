use std::borrow::Cow;

use crate::{error::Result, util, Dom, Node};

/// Values accepted by [`Dom::set_attribute`]. `None` removes the attribute.
pub trait IntoAttr<'a>: Sized {
    fn into_attr(self) -> Option<Cow<'a, str>>;
}

impl<'a> IntoAttr<'a> for &'a str {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl<'a> IntoAttr<'a> for Cow<'a, str> {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        Some(self)
    }
}

impl<'a> IntoAttr<'a> for String {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        Some(Cow::Owned(self))
    }
}

impl<'a> IntoAttr<'a> for &'a String {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl<'a> IntoAttr<'a> for Option<&'a str> {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        self.map(Cow::Borrowed)
    }
}

impl<'a> IntoAttr<'a> for Option<Cow<'a, str>> {
    fn into_attr(self) -> Self {
        self
    }
}

impl<'a> IntoAttr<'a> for Option<String> {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        self.map(Cow::Owned)
    }
}

impl<'a> IntoAttr<'a> for Option<&'a String> {
    fn into_attr(self) -> Option<Cow<'a, str>> {
        self.map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl<N: Node> Dom<N> {
    // Attributes //

    /// The attribute's value on the first held element that has it.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.elements.iter().find_map(|element| element.attr(name))
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.attribute(name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name)
    }

    /// Sets the attribute on every held element, or removes it when `value`
    /// is `None`.
    pub fn set_attribute<'a>(&self, name: &str, value: impl IntoAttr<'a>) -> Result<&Self> {
        match value.into_attr() {
            Some(value) => {
                for element in self.elements.iter().filter(|node| node.is_element()) {
                    element.set_attr(name, &value)?;
                }
            }
            None => {
                self.remove_attribute(name);
            }
        }
        Ok(self)
    }

    pub fn set_attr<'a>(&self, name: &str, value: impl IntoAttr<'a>) -> Result<&Self> {
        self.set_attribute(name, value)
    }

    pub fn remove_attribute(&self, name: &str) -> &Self {
        for element in &self.elements {
            element.remove_attr(name);
        }
        self
    }

    pub fn delete_attribute(&self, name: &str) -> &Self {
        self.remove_attribute(name)
    }

    /// Whether the first held element has the attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.elements
            .first()
            .is_some_and(|element| element.has_attr(name))
    }

    // Classes //

    fn classes(element: &N) -> Vec<String> {
        util::class_tokens(element.attr("class"))
    }

    fn update_classes<F>(&self, mut update: F) -> Result<&Self>
    where
        F: FnMut(&mut Vec<String>) -> bool,
    {
        for element in self.elements.iter().filter(|node| node.is_element()) {
            let mut classes = Self::classes(element);
            if update(&mut classes) {
                element.set_attr("class", &classes.join(" "))?;
            }
        }
        Ok(self)
    }

    pub fn add_class(&self, name: &str) -> Result<&Self> {
        self.update_classes(|classes| {
            if classes.iter().any(|class| class == name) {
                return false;
            }
            classes.push(name.to_string());
            true
        })
    }

    /// Whether any held element carries the class.
    pub fn has_class(&self, name: &str) -> bool {
        self.elements
            .iter()
            .any(|element| Self::classes(element).iter().any(|class| class == name))
    }

    /// Leaves elements without the class untouched.
    pub fn remove_class(&self, name: &str) -> Result<&Self> {
        self.update_classes(|classes| {
            let before = classes.len();
            classes.retain(|class| class != name);
            classes.len() != before
        })
    }

    pub fn delete_class(&self, name: &str) -> Result<&Self> {
        self.remove_class(name)
    }

    /// Flips the class on each held element independently.
    pub fn toggle_class(&self, name: &str) -> Result<&Self> {
        self.update_classes(|classes| {
            let before = classes.len();
            classes.retain(|class| class != name);
            if classes.len() == before {
                classes.push(name.to_string());
            }
            true
        })
    }

    /// Class operations bound to a single class name.
    pub fn class<'a>(&'a self, name: &'a str) -> ClassList<'a, N> {
        ClassList { dom: self, name }
    }

    // Data //

    /// Reads `name` through the structured dataset when the host offers one,
    /// or from the matching `data-*` attribute otherwise.
    pub fn data(&self, name: &str) -> Option<String> {
        self.elements
            .iter()
            .filter(|node| node.is_element())
            .find_map(|element| {
                if element.has_dataset() {
                    element.data(name)
                } else {
                    element.attr(&data_attr(name))
                }
            })
    }

    pub fn set_data(&self, name: &str, value: &str) -> Result<&Self> {
        for element in self.elements.iter().filter(|node| node.is_element()) {
            if element.has_dataset() {
                element.set_data(name, value)?;
            } else {
                element.set_attr(&data_attr(name), value)?;
            }
        }
        Ok(self)
    }

    pub fn has_data(&self, name: &str) -> bool {
        self.data(name).is_some()
    }
}

fn data_attr(name: &str) -> String {
    format!("data-{}", util::param_case(name))
}

/// See [`Dom::class`].
#[derive(Clone, Copy, Debug)]
pub struct ClassList<'a, N> {
    dom: &'a Dom<N>,
    name: &'a str,
}

impl<'a, N: Node> ClassList<'a, N> {
    pub fn add(&self) -> Result<&'a Dom<N>> {
        self.dom.add_class(self.name)
    }

    pub fn has(&self) -> bool {
        self.dom.has_class(self.name)
    }

    pub fn remove(&self) -> Result<&'a Dom<N>> {
        self.dom.remove_class(self.name)
    }

    pub fn delete(&self) -> Result<&'a Dom<N>> {
        self.remove()
    }

    pub fn toggle(&self) -> Result<&'a Dom<N>> {
        self.dom.toggle_class(self.name)
    }
}
