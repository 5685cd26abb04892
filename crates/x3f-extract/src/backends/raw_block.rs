//! Undecoded raw block dump.

use crate::core::config::ProcessingSettings;
use crate::plugins::{BackendKind, Container, DumpBackend, DumpOptions};
use crate::{ExtractError, Result};
use std::path::Path;

pub struct RawBlockBackend;

impl DumpBackend for RawBlockBackend {
    fn name(&self) -> &str {
        BackendKind::RawBlock.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::RawBlock
    }

    fn dump(&self, container: &dyn Container, output: &Path, _: &DumpOptions, _: &ProcessingSettings) -> Result<()> {
        let block = container
            .raw_block()
            .ok_or_else(|| ExtractError::backend(self.name(), "no undecoded raw block loaded"))?;
        std::fs::write(output, block)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::{MemoryContainer, plain_options, settings};
    use crate::plugins::DumpVariant;
    use tempfile::tempdir;

    #[test]
    fn test_writes_block_verbatim() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.raw.tmp");
        let container = MemoryContainer {
            raw_block: Some((0u8..=255).collect()),
            ..MemoryContainer::new()
        };

        RawBlockBackend
            .dump(&container, &output, &plain_options(DumpVariant::Plain), &settings())
            .unwrap();
        assert_eq!(std::fs::read(&output).unwrap().len(), 256);
    }

    #[test]
    fn test_missing_block_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.raw.tmp");
        let result = RawBlockBackend.dump(
            &MemoryContainer::new(),
            &output,
            &plain_options(DumpVariant::Plain),
            &settings(),
        );
        assert!(matches!(result, Err(ExtractError::Backend { .. })));
        assert!(!output.exists());
    }
}
