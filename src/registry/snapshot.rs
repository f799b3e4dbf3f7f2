//! Point-in-time views of the registry.
//!
//! A [`SurfaceSnapshot`] owns a strong reference to every surface that was
//! live when it was taken. Mutations of the registry after that instant are
//! not reflected, and the surfaces in it stay alive until it is dropped.
//! A [`SurfaceEnumerator`] borrows a snapshot, so it can never outlive the
//! references that keep its surfaces alive.
use std::fmt;
use std::sync::Arc;
use crate::surface::{RootTag, Surface};

pub struct SurfaceSnapshot<S: ?Sized> {
    surfaces: Vec<Arc<S>>,
}

impl<S: ?Sized> SurfaceSnapshot<S> {
    pub(crate) fn new(surfaces: Vec<Arc<S>>) -> Self {
        Self { surfaces }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<S>> {
        self.surfaces.iter()
    }

    /// Single-pass enumerator over the snapshot, yielding owning clones.
    pub fn enumerator(&self) -> SurfaceEnumerator<'_, S> {
        SurfaceEnumerator {
            inner: self.surfaces.iter(),
        }
    }
}

impl<S: ?Sized + Surface> SurfaceSnapshot<S> {
    pub fn root_tags(&self) -> Vec<RootTag> {
        self.surfaces.iter().map(|s| s.root_tag()).collect()
    }
}

impl<S: ?Sized> IntoIterator for SurfaceSnapshot<S> {
    type Item = Arc<S>;
    type IntoIter = std::vec::IntoIter<Arc<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.into_iter()
    }
}

impl<'a, S: ?Sized> IntoIterator for &'a SurfaceSnapshot<S> {
    type Item = &'a Arc<S>;
    type IntoIter = std::slice::Iter<'a, Arc<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: ?Sized> fmt::Debug for SurfaceSnapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceSnapshot")
            .field("len", &self.surfaces.len())
            .finish()
    }
}

/// Single-pass iterator handed to `SurfaceRegistry::enumerate` visitors.
///
/// Yielded `Arc`s are clones; the snapshot it borrows from keeps every
/// surface alive until the visitor returns, even if the visitor drops them.
pub struct SurfaceEnumerator<'a, S: ?Sized> {
    inner: std::slice::Iter<'a, Arc<S>>,
}

impl<S: ?Sized> Iterator for SurfaceEnumerator<'_, S> {
    type Item = Arc<S>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().cloned()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: ?Sized> ExactSizeIterator for SurfaceEnumerator<'_, S> {}

impl<S: ?Sized> std::iter::FusedIterator for SurfaceEnumerator<'_, S> {}

impl<S: ?Sized> fmt::Debug for SurfaceEnumerator<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceEnumerator")
            .field("remaining", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(RootTag);

    impl Surface for Tagged {
        fn root_tag(&self) -> RootTag {
            self.0
        }
    }

    fn snapshot_of(tags: &[u64]) -> SurfaceSnapshot<Tagged> {
        SurfaceSnapshot::new(tags.iter().map(|t| Arc::new(Tagged(RootTag::new(*t)))).collect())
    }

    #[test]
    fn snapshot_reports_tags_in_order() {
        let snapshot = snapshot_of(&[1, 2, 5]);
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.root_tags(), vec![RootTag::new(1), RootTag::new(2), RootTag::new(5)]);
        assert_eq!((&snapshot).into_iter().count(), 3);
    }

    #[test]
    fn enumerator_is_exact_and_fused() {
        let snapshot = snapshot_of(&[4, 9]);
        let mut it = snapshot.enumerator();
        assert_eq!(it.len(), 2);
        assert_eq!(it.next().map(|s| s.root_tag()), Some(RootTag::new(4)));
        assert_eq!(it.len(), 1);
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn snapshot_outlives_enumerator_items() {
        let surface = Arc::new(Tagged(RootTag::new(1)));
        let snapshot = SurfaceSnapshot::new(vec![surface.clone()]);

        let mut enumerator = snapshot.enumerator();
        let item = enumerator.next().unwrap();
        assert_eq!(Arc::strong_count(&surface), 3);

        drop(item);
        drop(enumerator);
        assert_eq!(Arc::strong_count(&surface), 2, "snapshot still owns its reference");

        drop(snapshot);
        assert_eq!(Arc::strong_count(&surface), 1);
    }

    #[test]
    fn consuming_snapshot_hands_over_references() {
        let surface = Arc::new(Tagged(RootTag::new(1)));
        let owned: Vec<Arc<Tagged>> = SurfaceSnapshot::new(vec![surface.clone()]).into_iter().collect();
        assert_eq!(Arc::strong_count(&surface), 2);

        drop(owned);
        assert_eq!(Arc::strong_count(&surface), 1);
    }
}
