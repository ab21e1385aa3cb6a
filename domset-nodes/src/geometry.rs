#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    Width,
    Height,
}

/// Client, offset and scroll extents of a node along one axis.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dimensions {
    pub client: i32,
    pub offset: i32,
    pub scroll: i32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Offset {
    pub top: i32,
    pub left: i32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScrollPosition {
    pub x: i32,
    pub y: i32,
}
