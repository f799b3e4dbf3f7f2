//! Surface collaborator contract: [`Surface`], [`RootTag`] and [`SurfaceId`].
//!
//! Surfaces are owned by the host (the mounting pipeline). The registry only
//! ever reads their root tag and keeps non-owning handles to them.
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::errors::RegistryError;

/// Integer identity of a surface root. Unique among live surfaces of one registry.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootTag(u64);

impl RootTag {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for RootTag {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<u32> for RootTag {
    fn from(raw: u32) -> Self {
        Self(raw as u64)
    }
}

/// Host runtimes usually hand tags over as signed integers.
impl TryFrom<i64> for RootTag {
    type Error = RegistryError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u64::try_from(raw)
            .map(Self)
            .map_err(|_| RegistryError::InvalidRootTag(raw))
    }
}

impl fmt::Display for RootTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UI root that can be indexed by a [`SurfaceRegistry`](crate::SurfaceRegistry).
///
/// `root_tag` must return the same value for as long as the surface is registered.
pub trait Surface: Send + Sync {
    fn root_tag(&self) -> RootTag;
}

/// Address of a surface allocation. Only ever compared, never turned back into a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(usize);

impl SurfaceId {
    pub fn of<S: ?Sized>(surface: &Arc<S>) -> Self {
        Self(Arc::as_ptr(surface) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(RootTag);

    impl Surface for Dummy {
        fn root_tag(&self) -> RootTag {
            self.0
        }
    }

    #[test]
    fn negative_tags_are_rejected() {
        assert_eq!(RootTag::try_from(-1i64), Err(RegistryError::InvalidRootTag(-1)));
        assert_eq!(RootTag::try_from(0i64), Ok(RootTag::new(0)));
        assert_eq!(RootTag::try_from(41i64).unwrap().raw(), 41);
    }

    #[test]
    fn root_tag_displays_and_serializes_as_plain_integer() {
        let tag = RootTag::from(7u32);
        assert_eq!(tag.to_string(), "7");
        assert_eq!(serde_json::to_string(&tag).unwrap(), "7");

        let parsed: RootTag = serde_json::from_str("11").unwrap();
        assert_eq!(parsed, RootTag::new(11));
    }

    #[test]
    fn surface_id_follows_allocation_not_value() {
        let a = Arc::new(Dummy(RootTag::new(1)));
        let b = Arc::new(Dummy(RootTag::new(1)));
        let a2 = a.clone();

        assert_eq!(SurfaceId::of(&a), SurfaceId::of(&a2));
        assert_ne!(SurfaceId::of(&a), SurfaceId::of(&b));

        // Same allocation seen through a trait object keeps its identity
        let dyn_a: Arc<dyn Surface> = a.clone();
        assert_eq!(SurfaceId::of(&dyn_a), SurfaceId::of(&a));
    }
}
