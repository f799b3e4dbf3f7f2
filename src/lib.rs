//! Thread-safe registry of live UI surfaces, keyed by root tag.
//!
//! The host owns its surfaces; a [`SurfaceRegistry`] only indexes them through
//! weak handles so events can be routed to whichever surface is still alive.
//! Each host instance creates its own registry.
//!
//! ```
//! use std::sync::Arc;
//! use surface_registry::{RootTag, Surface, SurfaceRegistry};
//!
//! struct Root(RootTag);
//! impl Surface for Root {
//!     fn root_tag(&self) -> RootTag { self.0 }
//! }
//!
//! let registry: SurfaceRegistry = SurfaceRegistry::default();
//! let root: Arc<dyn Surface> = Arc::new(Root(RootTag::new(1)));
//! registry.register(&root).unwrap();
//! assert!(registry.surface_for_root_tag(RootTag::new(1)).is_some());
//!
//! drop(root);
//! assert!(registry.surface_for_root_tag(RootTag::new(1)).is_none());
//! ```

pub mod config;
pub mod errors;
pub mod registry;
pub mod surface;

pub use config::{ConflictPolicy, RegistryConfig, RegistryConfigBuilder};
pub use errors::{RegistryConfigError, RegistryError};
pub use registry::{SurfaceEnumerator, SurfaceHandle, SurfaceRegistry, SurfaceSnapshot};
pub use surface::{RootTag, Surface, SurfaceId};
