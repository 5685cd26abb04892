//! Collaborator seams of the extraction pipeline.
//!
//! The orchestrator talks to its collaborators only through these traits:
//!
//! - [`ContainerOpener`] / [`Container`] - opening a file and loading sections
//! - [`RawDecoder`] - turning raw section payloads into pixels
//! - [`DumpBackend`] - writing one output artifact
//!
//! Backends are looked up in a [`BackendRegistry`], which makes it possible to
//! swap any of them for a custom or fake implementation:
//!
//! ```rust
//! use x3f_extract::plugins::{BackendKind, BackendRegistry, Container, DumpBackend, DumpOptions};
//! use x3f_extract::{ProcessingSettings, Result};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct SidecarJpeg;
//!
//! impl DumpBackend for SidecarJpeg {
//!     fn name(&self) -> &str { "sidecar-jpeg" }
//!     fn kind(&self) -> BackendKind { BackendKind::Thumbnail }
//!     fn dump(&self, container: &dyn Container, output: &Path, _: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
//!         std::fs::write(output, container.thumbnail().unwrap_or_default())?;
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = BackendRegistry::with_defaults();
//! registry.register(Arc::new(SidecarJpeg));
//! assert_eq!(registry.get(BackendKind::Thumbnail)?.name(), "sidecar-jpeg");
//! # Ok::<(), x3f_extract::ExtractError>(())
//! ```

pub mod backend;
pub mod container;
pub mod decoder;
pub mod registry;

pub use backend::{BackendKind, DumpBackend, DumpOptions, DumpVariant};
pub use container::{
    Container, ContainerHeader, ContainerOpener, FormatVersion, Property, RawImage, Rect, SectionInfo, SectionKind,
    SectionRef,
};
pub use decoder::{RawDecoder, RawSectionLayout};
pub use registry::BackendRegistry;
