//! Surface registry: [`SurfaceRegistry`], [`SurfaceHandle`] and snapshots.
//!
//! The registry maps a [`RootTag`] to a non-owning [`SurfaceHandle`]. Surfaces
//! are registered when they start mounting, unregistered on teardown, and
//! looked up by tag when incoming events need to reach a live surface.
//!
//! All methods take `&self` and are safe to call from any thread. A single
//! `RwLock` guards the map; it is held for one map mutation or one read pass
//! at a time and never while host code (visitors, closures, `Surface`
//! methods) runs.
//!
//! Entries of surfaces that were reclaimed without being unregistered read as
//! absent. They are dropped lazily (see [`RegistryConfig::prune_stale`]) or by
//! [`SurfaceRegistry::prune`].

pub mod handle;
pub mod snapshot;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::config::{ConflictPolicy, RegistryConfig};
use crate::errors::{RegistryConfigError, RegistryError};
use crate::surface::{RootTag, Surface, SurfaceId};

pub use handle::SurfaceHandle;
pub use snapshot::{SurfaceEnumerator, SurfaceSnapshot};

type Entries<S> = HashMap<RootTag, SurfaceHandle<S>>;

/// What a `register` call did to the map.
enum Registration {
    Inserted { replaced_stale: bool },
    AlreadyRegistered,
    Replaced { previous: SurfaceId },
}

pub struct SurfaceRegistry<S: ?Sized + Surface = dyn Surface> {
    /// Limits and policies for this registry.
    config: RegistryConfig,
    /// Registered surfaces, indexed by [`RootTag`].
    entries: RwLock<Entries<S>>,
}

impl<S: ?Sized + Surface> SurfaceRegistry<S> {
    /// Creates an empty registry, rejecting configs the builder would refuse.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            entries: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: RegistryConfig::default(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Adds `surface` under its root tag without retaining it.
    ///
    /// A stale entry for the same tag is replaced. Registering a surface that
    /// is already registered is a no-op. When the tag belongs to a different
    /// live surface, [`RegistryConfig::on_conflict`] decides.
    pub fn register(&self, surface: &Arc<S>) -> Result<(), RegistryError> {
        let root_tag = surface.root_tag();
        let handle = SurfaceHandle::new(surface, root_tag);
        let id = handle.id();

        let outcome = {
            let mut entries = self.write_entries();
            self.insert_locked(&mut entries, handle)
        };

        match outcome {
            Ok(Registration::Inserted { replaced_stale }) => {
                log::debug!("Registry: registered surface {:?} for root tag {} (replaced stale: {})", id, root_tag, replaced_stale);
            }
            Ok(Registration::AlreadyRegistered) => {
                log::trace!("Registry: surface {:?} already registered for root tag {}", id, root_tag);
            }
            Ok(Registration::Replaced { previous }) => {
                log::warn!("Registry: root tag {} moved from live surface {:?} to {:?}", root_tag, previous, id);
            }
            Err(ref e) => {
                log::warn!("Registry: cannot register surface {:?}: {}", id, e);
            }
        }

        outcome.map(|_| ())
    }

    fn insert_locked(&self, entries: &mut Entries<S>, handle: SurfaceHandle<S>) -> Result<Registration, RegistryError> {
        let root_tag = handle.root_tag();

        let mut replaced_stale = false;
        if let Some(existing) = entries.get(&root_tag) {
            if !existing.is_live() {
                replaced_stale = true;
            } else if existing.id() == handle.id() {
                return Ok(Registration::AlreadyRegistered);
            } else {
                return match self.config.on_conflict {
                    ConflictPolicy::Reject => Err(RegistryError::RootTagInUse { root_tag }),
                    ConflictPolicy::Replace => {
                        let previous = existing.id();
                        entries.insert(root_tag, handle);
                        Ok(Registration::Replaced { previous })
                    }
                };
            }
        }

        if let Some(limit) = self.config.max_surfaces {
            if self.config.prune_stale {
                entries.retain(|tag, h| *tag == root_tag || h.is_live());
            }
            let live = entries
                .iter()
                .filter(|(tag, h)| **tag != root_tag && h.is_live())
                .count();
            if live >= limit {
                return Err(RegistryError::CapacityExceeded { limit });
            }
        }

        entries.insert(root_tag, handle);
        Ok(Registration::Inserted { replaced_stale })
    }

    /// Removes the entry for `surface`'s root tag, but only if it still refers
    /// to `surface`. Returns whether something was removed.
    pub fn unregister(&self, surface: &Arc<S>) -> bool {
        let root_tag = surface.root_tag();

        let removed = {
            let mut entries = self.write_entries();
            match entries.get(&root_tag) {
                Some(existing) if existing.refers_to(surface) => entries.remove(&root_tag).is_some(),
                _ => false,
            }
        };

        if removed {
            log::debug!("Registry: unregistered surface {:?} for root tag {}", SurfaceId::of(surface), root_tag);
        } else {
            log::trace!("Registry: unregister of surface {:?} for root tag {} ignored", SurfaceId::of(surface), root_tag);
        }

        removed
    }

    /// Returns the live surface registered under `root_tag`.
    ///
    /// The returned `Arc` keeps the surface alive until the caller drops it.
    pub fn surface_for_root_tag(&self, root_tag: RootTag) -> Option<Arc<S>> {
        let stale = {
            let entries = self.read_entries();
            let handle = entries.get(&root_tag)?;
            match handle.upgrade() {
                Some(surface) => return Some(surface),
                None => handle.id(),
            }
        };

        if self.config.prune_stale {
            self.remove_stale(root_tag, stale);
        }
        None
    }

    /// Runs `f` on the surface registered under `root_tag`, outside the registry lock.
    pub fn with_surface<R>(&self, root_tag: RootTag, f: impl FnOnce(&S) -> R) -> Option<R> {
        let surface = self.surface_for_root_tag(root_tag)?;
        Some(f(&surface))
    }

    pub fn contains(&self, root_tag: RootTag) -> bool {
        self.read_entries()
            .get(&root_tag)
            .is_some_and(|h| h.is_live())
    }

    /// Root tags of all live entries, ascending.
    pub fn root_tags(&self) -> Vec<RootTag> {
        let mut tags: Vec<RootTag> = self
            .read_entries()
            .iter()
            .filter(|(_, h)| h.is_live())
            .map(|(tag, _)| *tag)
            .collect();
        tags.sort_unstable();
        tags
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.read_entries().values().filter(|h| h.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry whose surface has been reclaimed. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let removed = {
            let mut entries = self.write_entries();
            let before = entries.len();
            entries.retain(|_, h| h.is_live());
            before - entries.len()
        };

        if removed > 0 {
            log::trace!("Registry: pruned {} stale entries", removed);
        }
        removed
    }

    /// Takes a point-in-time snapshot of all live surfaces, ordered by root tag.
    pub fn snapshot(&self) -> SurfaceSnapshot<S> {
        let mut live: Vec<(RootTag, Arc<S>)> = {
            let entries = self.read_entries();
            entries
                .iter()
                .filter_map(|(tag, h)| h.upgrade().map(|s| (*tag, s)))
                .collect()
        };
        live.sort_unstable_by_key(|(tag, _)| *tag);

        log::trace!("Registry: snapshot of {} surfaces", live.len());
        SurfaceSnapshot::new(live.into_iter().map(|(_, s)| s).collect())
    }

    /// Calls `visitor` once with an enumerator over a snapshot of the live surfaces.
    ///
    /// The registry lock is not held while `visitor` runs, so it may call back
    /// into the registry. Changes it makes are not visible in the enumerator.
    /// Every surface in the snapshot stays alive until `visitor` returns.
    pub fn enumerate<R>(&self, visitor: impl FnOnce(SurfaceEnumerator<'_, S>) -> R) -> R {
        let snapshot = self.snapshot();
        let result = visitor(snapshot.enumerator());
        drop(snapshot);
        result
    }

    fn remove_stale(&self, root_tag: RootTag, id: SurfaceId) {
        let removed = {
            let mut entries = self.write_entries();
            match entries.get(&root_tag) {
                Some(h) if h.id() == id && !h.is_live() => entries.remove(&root_tag).is_some(),
                _ => false,
            }
        };

        if removed {
            log::trace!("Registry: dropped stale entry for root tag {}", root_tag);
        }
    }

    // Each critical section leaves the map consistent, so a poisoned lock is still usable.
    fn read_entries(&self) -> RwLockReadGuard<'_, Entries<S>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, Entries<S>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: ?Sized + Surface> Default for SurfaceRegistry<S> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S: ?Sized + Surface> fmt::Debug for SurfaceRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("entries", &self.read_entries().len())
            .field("config", &self.config)
            .finish()
    }
}
