//! The configuration handle passed to every generator.

use std::sync::Arc;

use arcstr::ArcStr;
use cache::mem::ContentCache;
use cache::{ContentKey, Namespace};
use serde::Serialize;

use crate::bend::{BendPath, BendSpec};
use crate::error::Result;
use crate::pdk::Pdk;
use crate::registry::{ComponentSpec, Registry};
use crate::Component;

/// The environment variable naming a PDK file for [`Context::from_env`].
pub const PDK_ENV_VAR: &str = "PHOTONIX_PDK";

/// The generator context.
///
/// Holds the PDK, the component registry, and the caches of built cells and
/// bend paths. Cheaply clonable; clones share caches.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    pdk: Pdk,
    registry: Registry,
    cells: ContentCache<Component>,
    bends: ContentCache<BendPath>,
}

impl Context {
    /// Creates a context with the built-in component registry.
    pub fn new(pdk: Pdk) -> Self {
        Self::with_registry(pdk, Registry::default())
    }

    /// Creates a context with a custom component registry.
    pub fn with_registry(pdk: Pdk, registry: Registry) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                pdk,
                registry,
                cells: ContentCache::new(),
                bends: ContentCache::new(),
            }),
        }
    }

    /// Creates a context from the PDK file named by `PHOTONIX_PDK`,
    /// or the generic PDK if the variable is unset.
    pub fn from_env() -> Result<Self> {
        let pdk = match std::env::var_os(PDK_ENV_VAR) {
            Some(path) => {
                tracing::info!(path = ?path, "loading PDK from {}", PDK_ENV_VAR);
                Pdk::from_path(path)?
            }
            None => Pdk::generic()?,
        };
        Ok(Self::new(pdk))
    }

    /// The process design kit.
    #[inline]
    pub fn pdk(&self) -> &Pdk {
        &self.inner.pdk
    }

    /// The component registry.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Resolves `spec` into a built cell, applying `overrides` on top of the
    /// spec's own parameters.
    ///
    /// Overrides are ignored for prebuilt cells.
    pub fn get_component(
        &self,
        spec: &ComponentSpec,
        overrides: &serde_json::Value,
    ) -> Result<Arc<Component>> {
        match spec {
            ComponentSpec::Factory { name, params } => {
                let params = crate::registry::merge_params(params, overrides)?;
                let factory = self.registry().get(name)?;
                factory(self, params)
            }
            ComponentSpec::Cell(cell) => {
                if !overrides.is_null() {
                    tracing::debug!(cell = %cell.name(), "ignoring overrides for prebuilt cell");
                }
                Ok(cell.clone())
            }
        }
    }

    /// Samples a bend, reusing earlier results for identical specs.
    pub fn bend_path(&self, spec: &BendSpec) -> Result<Arc<BendPath>> {
        let key = ContentKey::new(Namespace::new("photonix.bend")?, spec)?;
        self.inner
            .bends
            .get_or_try_generate(key, || spec.synthesize())
    }

    /// Builds a cell once per `(factory, params)` pair.
    ///
    /// `build` receives the cell name, `{factory}_{digest}`.
    pub fn cell<P: Serialize>(
        &self,
        factory: &str,
        params: &P,
        build: impl FnOnce(ArcStr) -> Result<Component>,
    ) -> Result<Arc<Component>> {
        let key = ContentKey::new(Namespace::new(format!("photonix.{factory}"))?, params)?;
        let name = arcstr::format!("{factory}_{}", key.short_hex(8));
        self.inner
            .cells
            .get_or_try_generate(key, || build(name))
    }

    /// The number of cells built so far.
    pub fn cells_built(&self) -> u64 {
        self.inner.cells.misses()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("pdk", self.pdk().name())
            .field("registry", self.registry())
            .finish_non_exhaustive()
    }
}
