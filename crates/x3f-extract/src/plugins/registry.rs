//! Backend registration and lookup.

use crate::plugins::backend::{BackendKind, DumpBackend};
use crate::{ExtractError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry mapping each backend identity to its implementation.
///
/// # Example
///
/// ```rust
/// use x3f_extract::plugins::{BackendKind, BackendRegistry};
///
/// let registry = BackendRegistry::with_defaults();
/// assert_eq!(registry.get(BackendKind::Dng).unwrap().name(), "dng");
/// ```
pub struct BackendRegistry {
    backends: BTreeMap<BackendKind, Arc<dyn DumpBackend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            backends: BTreeMap::new(),
        }
    }

    /// Create a registry holding the built-in backends.
    pub fn with_defaults() -> Self {
        use crate::backends::{
            DngBackend, HistogramBackend, JpegBackend, MetaBackend, PpmBackend, RawBlockBackend, TiffBackend,
        };

        let mut registry = Self::new();
        registry.register(Arc::new(MetaBackend));
        registry.register(Arc::new(JpegBackend));
        registry.register(Arc::new(RawBlockBackend));
        registry.register(Arc::new(TiffBackend));
        registry.register(Arc::new(DngBackend));
        registry.register(Arc::new(PpmBackend));
        registry.register(Arc::new(HistogramBackend));
        registry
    }

    /// Register a backend under its own kind, replacing any previous one.
    ///
    /// Returns the replaced backend, if any.
    pub fn register(&mut self, backend: Arc<dyn DumpBackend>) -> Option<Arc<dyn DumpBackend>> {
        self.backends.insert(backend.kind(), backend)
    }

    /// Look up the backend for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Backend` if nothing is registered for `kind`.
    pub fn get(&self, kind: BackendKind) -> Result<Arc<dyn DumpBackend>> {
        self.backends
            .get(&kind)
            .map(Arc::clone)
            .ok_or_else(|| ExtractError::backend(kind.name(), "no backend registered"))
    }

    /// Names of all registered backends, in kind order.
    pub fn list(&self) -> Vec<String> {
        self.backends.values().map(|backend| backend.name().to_string()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProcessingSettings;
    use crate::plugins::backend::DumpOptions;
    use crate::plugins::container::Container;
    use std::path::Path;

    struct NamedBackend(&'static str, BackendKind);

    impl DumpBackend for NamedBackend {
        fn name(&self) -> &str {
            self.0
        }

        fn kind(&self) -> BackendKind {
            self.1
        }

        fn dump(&self, _: &dyn Container, _: &Path, _: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = BackendRegistry::with_defaults();
        for kind in BackendKind::ALL {
            let backend = registry.get(kind).unwrap();
            assert_eq!(backend.kind(), kind);
        }
        assert_eq!(registry.list().len(), 7);
    }

    #[test]
    fn test_empty_registry_reports_backend_error() {
        let registry = BackendRegistry::new();
        let err = registry.get(BackendKind::Tiff).err().unwrap();
        assert!(matches!(err, ExtractError::Backend { ref backend, .. } if backend == "tiff"));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = BackendRegistry::with_defaults();
        let replaced = registry.register(Arc::new(NamedBackend("custom-dng", BackendKind::Dng)));
        assert_eq!(replaced.unwrap().name(), "dng");
        assert_eq!(registry.get(BackendKind::Dng).unwrap().name(), "custom-dng");
    }
}
