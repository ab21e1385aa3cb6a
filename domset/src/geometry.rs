use domset_nodes::{Axis, Dimensions, Offset, ScrollPosition};

use crate::{
    error::{Error, Result},
    util, Dom, Node,
};

/// Both dimension triples of an element.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Size {
    pub width: Dimensions,
    pub height: Dimensions,
}

/// A scroll target for [`Dom::set_scroll`]. Axes left out keep their position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScrollTo {
    Vertical(i32),
    Point { x: Option<i32>, y: Option<i32> },
}

impl ScrollTo {
    pub fn x(x: i32) -> Self {
        Self::Point {
            x: Some(x),
            y: None,
        }
    }

    pub fn y(y: i32) -> Self {
        Self::Point {
            x: None,
            y: Some(y),
        }
    }
}

impl From<i32> for ScrollTo {
    fn from(y: i32) -> Self {
        Self::Vertical(y)
    }
}

impl From<(i32, i32)> for ScrollTo {
    fn from((x, y): (i32, i32)) -> Self {
        Self::Point {
            x: Some(x),
            y: Some(y),
        }
    }
}

impl From<ScrollPosition> for ScrollTo {
    fn from(position: ScrollPosition) -> Self {
        (position.x, position.y).into()
    }
}

impl<N: Node> Dom<N> {
    /// The computed value of `property` on the first held element.
    pub fn css(&self, property: &str) -> Option<String> {
        self.elements.first()?.computed_style(property)
    }

    /// Sets an inline style on every held element. `property` is given in
    /// kebab case.
    pub fn set_css(&self, property: &str, value: &str) -> &Self {
        let property = util::camel_case(property);
        for element in &self.elements {
            element.set_style(&property, value);
        }
        self
    }

    /// Zeroed when the set is empty.
    pub fn size(&self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn width(&self) -> Dimensions {
        self.dimensions(Axis::Width)
    }

    pub fn get_width(&self) -> Dimensions {
        self.width()
    }

    pub fn height(&self) -> Dimensions {
        self.dimensions(Axis::Height)
    }

    pub fn get_height(&self) -> Dimensions {
        self.height()
    }

    fn dimensions(&self, axis: Axis) -> Dimensions {
        self.elements
            .first()
            .map(|element| element.dimensions(axis))
            .unwrap_or_default()
    }

    pub fn offset(&self) -> Option<Offset> {
        self.elements.first().map(N::offset)
    }

    pub fn get_offset(&self) -> Option<Offset> {
        self.offset()
    }

    pub fn scroll(&self) -> Option<ScrollPosition> {
        self.elements.first().map(N::scroll_position)
    }

    pub fn get_scroll(&self) -> Option<ScrollPosition> {
        self.scroll()
    }

    /// Scrolls every held element along the axes `to` names.
    ///
    /// # Errors
    ///
    /// A point naming neither axis is an [`Error::InvalidArgument`].
    pub fn set_scroll(&self, to: impl Into<ScrollTo>) -> Result<&Self> {
        let (x, y) = match to.into() {
            ScrollTo::Vertical(y) => (None, Some(y)),
            ScrollTo::Point { x: None, y: None } => return Err(Error::invalid_scroll()),
            ScrollTo::Point { x, y } => (x, y),
        };

        for element in &self.elements {
            if let Some(x) = x {
                element.set_scroll_left(x);
            }
            if let Some(y) = y {
                element.set_scroll_top(y);
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use domset_nodes::{Dimensions, Node, Offset, ScrollPosition};
    use domset_render::{Layout, NodeRef};

    use crate::{test_util::*, Dom, ScrollTo, Size};

    #[test]
    fn css_round_trips_through_inline_style() {
        let (document, _) = fixture("<p></p>");
        let p = select(&document, "p");
        p.set_css("background-color", "red");

        assert_eq!(p.css("background-color").as_deref(), Some("red"));
        assert_eq!(p.attr("style").as_deref(), Some("background-color: red;"));
        assert_eq!(Dom::<NodeRef>::empty().css("color"), None);
    }

    #[test]
    fn sizes_come_from_the_first_element() {
        let (document, _) = fixture("<p></p><p></p>");
        let first = document.children()[0].clone();
        let width = Dimensions {
            client: 100,
            offset: 102,
            scroll: 300,
        };
        first.set_layout(Layout {
            width,
            offset: Offset { top: 5, left: 7 },
            ..Layout::default()
        });

        let p = select(&document, "p");
        assert_eq!(p.width(), width);
        assert_eq!(p.get_height(), Dimensions::default());
        assert_eq!(
            p.size(),
            Size {
                width,
                height: Dimensions::default()
            }
        );
        assert_eq!(p.get_offset(), Some(Offset { top: 5, left: 7 }));
        assert_eq!(Dom::<NodeRef>::empty().size(), Size::default());
        assert_eq!(Dom::<NodeRef>::empty().offset(), None);
    }

    #[test]
    fn scroll_applies_only_the_given_axes() {
        let (document, _) = fixture("<p></p><p></p>");
        let p = select(&document, "p");
        p.set_scroll((4, 8)).unwrap();

        p.set_scroll(ScrollTo::y(10)).unwrap();
        for node in &p {
            assert_eq!(node.layout().scroll, ScrollPosition { x: 4, y: 10 });
        }

        p.set_scroll(20).unwrap().set_scroll(ScrollTo::x(1)).unwrap();
        assert_eq!(p.get_scroll(), Some(ScrollPosition { x: 1, y: 20 }));
    }

    #[test]
    fn scroll_needs_an_axis() {
        let (document, _) = fixture("<p></p>");
        let p = select(&document, "p");
        let err = p.set_scroll(ScrollTo::Point { x: None, y: None }).unwrap_err();
        assert_eq!(err.code(), "E_DOM_SET_SCROLL_INVALID_ARGUMENT");
    }
}
