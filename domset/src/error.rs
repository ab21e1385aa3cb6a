use domset_nodes::HostError;
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {cause}")]
    InvalidArgument {
        cause: &'static str,
        code: &'static str,
    },

    #[error("invalid operation: element has no parent node")]
    NoParentNode {
        cause: &'static str,
        code: &'static str,
    },

    #[error("unsupported environment: {cause}")]
    UnsupportedEnvironment {
        cause: &'static str,
        code: &'static str,
    },

    #[error("host rejected the operation: {0}")]
    Host(#[from] HostError),
}

impl Error {
    /// A stable identifier for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { code, .. }
            | Self::NoParentNode { code, .. }
            | Self::UnsupportedEnvironment { code, .. } => *code,
            Self::Host(_) => "E_DOM_HOST",
        }
    }

    fn logged(self) -> Self {
        debug!(code = self.code(), "{self}");
        self
    }

    pub(crate) fn invalid_source() -> Self {
        Self::InvalidArgument {
            cause: "expected an element, a node list, an array of elements or a wrapped set",
            code: "E_DOM_CONSTRUCTOR_INVALID_ARGUMENT",
        }
        .logged()
    }

    pub(crate) fn invalid_scroll() -> Self {
        Self::InvalidArgument {
            cause: "expected a vertical position or a point with an x and/or y position",
            code: "E_DOM_SET_SCROLL_INVALID_ARGUMENT",
        }
        .logged()
    }

    pub(crate) fn no_parent(before: bool) -> Self {
        let error = if before {
            Self::NoParentNode {
                cause: "expected the element to have a parent node in order to insert content before it",
                code: "E_DOM_BEFORE_NO_PARENT_NODE",
            }
        } else {
            Self::NoParentNode {
                cause: "expected the element to have a parent node in order to insert content after it",
                code: "E_DOM_AFTER_NO_PARENT_NODE",
            }
        };
        error.logged()
    }

    pub(crate) fn unsupported_matching() -> Self {
        Self::UnsupportedEnvironment {
            cause: "expected the host to support matching an element against a selector",
            code: "E_DOM_BROWSER_UNSUPPORTED",
        }
        .logged()
    }
}
