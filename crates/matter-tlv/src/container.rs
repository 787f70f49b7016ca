//! The three TLV container kinds, shared by the encoder and decoder stacks.

use crate::element_type::ElementType;

/// Which kind of container a `Begin*`/opener call started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A `Structure` container.
    Structure,
    /// An `Array` container.
    Array,
    /// A `List` container.
    List,
}

impl ContainerKind {
    pub(crate) fn element_type(self) -> ElementType {
        match self {
            Self::Structure => ElementType::Structure,
            Self::Array => ElementType::Array,
            Self::List => ElementType::List,
        }
    }

    pub(crate) fn from_element_type(ty: ElementType) -> Option<Self> {
        match ty {
            ElementType::Structure => Some(Self::Structure),
            ElementType::Array => Some(Self::Array),
            ElementType::List => Some(Self::List),
            _ => None,
        }
    }
}
