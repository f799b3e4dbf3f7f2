//! Weak per-surface slot stored in the registry map.
use std::fmt;
use std::sync::{Arc, Weak};
use crate::surface::{RootTag, SurfaceId};

/// Non-owning registry slot for one surface.
///
/// The slot never keeps its surface alive. Once the surface is reclaimed the
/// slot reads as empty, but its [`SurfaceId`] stays comparable.
pub struct SurfaceHandle<S: ?Sized> {
    id: SurfaceId,
    root_tag: RootTag,
    surface: Weak<S>,
}

impl<S: ?Sized> SurfaceHandle<S> {
    pub(crate) fn new(surface: &Arc<S>, root_tag: RootTag) -> Self {
        Self {
            id: SurfaceId::of(surface),
            root_tag,
            surface: Arc::downgrade(surface),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Tag read from the surface when it was registered.
    pub fn root_tag(&self) -> RootTag {
        self.root_tag
    }

    /// Temporary owning reference, or `None` when the surface is gone.
    pub fn upgrade(&self) -> Option<Arc<S>> {
        self.surface.upgrade()
    }

    pub fn is_live(&self) -> bool {
        self.surface.strong_count() > 0
    }

    pub fn refers_to(&self, surface: &Arc<S>) -> bool {
        self.id == SurfaceId::of(surface)
    }
}

impl<S: ?Sized> Clone for SurfaceHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            root_tag: self.root_tag,
            surface: self.surface.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for SurfaceHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("id", &self.id)
            .field("root_tag", &self.root_tag)
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_does_not_extend_lifetime() {
        let surface = Arc::new(RootTag::new(3));
        let handle = SurfaceHandle::new(&surface, RootTag::new(3));

        assert_eq!(Arc::strong_count(&surface), 1);
        assert!(handle.is_live());
        assert!(Arc::ptr_eq(&handle.upgrade().unwrap(), &surface));

        drop(surface);
        assert!(!handle.is_live());
        assert!(handle.upgrade().is_none());
    }

    #[test]
    fn identity_survives_reclamation() {
        let a = Arc::new(1u8);
        let b = Arc::new(1u8);
        let handle = SurfaceHandle::new(&a, RootTag::new(1));
        let id = handle.id();

        assert!(handle.refers_to(&a));
        assert!(!handle.refers_to(&b));

        drop(a);
        assert_eq!(handle.id(), id);
        assert!(!handle.refers_to(&b));
        assert_eq!(handle.root_tag(), RootTag::new(1));
    }
}
