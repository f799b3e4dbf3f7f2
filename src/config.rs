//! Registry configuration.
//!
//! `RegistryConfig` controls the limits and policies of a single
//! [`SurfaceRegistry`](crate::SurfaceRegistry). Every host instance builds its
//! own registry from its own config; there is no global one.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use surface_registry::{ConflictPolicy, RegistryConfig};
//! let cfg = RegistryConfig::default();
//! assert_eq!(cfg.max_surfaces, None);
//! assert!(cfg.prune_stale);
//! assert_eq!(cfg.on_conflict, ConflictPolicy::Reject);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use surface_registry::{ConflictPolicy, RegistryConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = RegistryConfig::builder()
//!     .max_surfaces(32)
//!     .prune_stale(false)
//!     .on_conflict(ConflictPolicy::Replace)
//!     .build()?; // returns Result<RegistryConfig, RegistryConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `max_surfaces`: Maximum number of live entries, unlimited when `None` (default).
//! - `prune_stale`: Remove entries of reclaimed surfaces when a lookup trips over them (default: `true`).
//! - `on_conflict`: What `register` does when the tag maps to a different live surface (default: reject).

use serde::{Deserialize, Serialize};
use crate::errors::RegistryConfigError;

/// Behaviour of `register` when the root tag already maps to a different live surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the existing entry and return `RegistryError::RootTagInUse`.
    #[default]
    Reject,
    /// Replace the existing entry with the new surface.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_surfaces: Option<usize>,
    pub prune_stale: bool,
    pub on_conflict: ConflictPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_surfaces: None,
            prune_stale: true,
            on_conflict: ConflictPolicy::Reject,
        }
    }
}

impl RegistryConfig {
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Checks a config that did not come through the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), RegistryConfigError> {
        validate(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryConfigBuilder {
    inner: RegistryConfig,
}

impl RegistryConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut RegistryConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn max_surfaces(self, n: usize) -> Self { self.map(|c| c.max_surfaces = Some(n)) }
    pub fn unlimited(self) -> Self { self.map(|c| c.max_surfaces = None) }
    pub fn prune_stale(self, on: bool) -> Self { self.map(|c| c.prune_stale = on) }
    pub fn on_conflict(self, policy: ConflictPolicy) -> Self { self.map(|c| c.on_conflict = policy) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<RegistryConfig, RegistryConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

fn validate(c: &RegistryConfig) -> Result<(), RegistryConfigError> {
    if c.max_surfaces == Some(0) {
        return Err(RegistryConfigError::ZeroCapacity);
    }
    Ok(())
}
