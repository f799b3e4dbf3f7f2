use crate::surface::RootTag;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid root tag: {0}")]
    InvalidRootTag(i64),

    #[error("Root tag {root_tag} is already registered to another live surface")]
    RootTagInUse { root_tag: RootTag },

    #[error("Surface limit of {limit} exceeded")]
    CapacityExceeded { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryConfigError {
    #[error("max_surfaces must be at least 1")]
    ZeroCapacity,
}
