//! Embedded JPEG preview dump.

use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions};
use crate::{ExtractError, Result};
use std::path::Path;

/// Writes the loaded thumbnail bytes verbatim.
pub struct JpegBackend;

impl DumpBackend for JpegBackend {
    fn name(&self) -> &str {
        BackendKind::Thumbnail.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Thumbnail
    }

    fn dump(&self, container: &dyn Container, output: &Path, _: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let jpeg = container
            .thumbnail()
            .ok_or_else(|| ExtractError::backend(self.name(), "no JPEG thumbnail loaded"))?;
        std::fs::write(output, jpeg)?;
        Ok(())
    }
}
