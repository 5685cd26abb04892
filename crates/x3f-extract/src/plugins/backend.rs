//! Dump backend plugin trait.
//!
//! A backend turns the loaded sections of a container into one output
//! artifact. Backends write only to the path they are given, which is always
//! the temporary path of the commit stage.

use crate::Result;
use crate::core::config::ProcessingSettings;
use crate::plugins::container::Container;
use crate::types::ResolvedToggles;
use std::fmt;
use std::path::Path;

/// Backend identities. The two PPM formats and the two histogram formats
/// share one backend each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Meta,
    Thumbnail,
    RawBlock,
    Tiff,
    Dng,
    Ppm,
    Histogram,
}

impl BackendKind {
    pub const ALL: [BackendKind; 7] = [
        BackendKind::Meta,
        BackendKind::Thumbnail,
        BackendKind::RawBlock,
        BackendKind::Tiff,
        BackendKind::Dng,
        BackendKind::Ppm,
        BackendKind::Histogram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Meta => "meta",
            BackendKind::Thumbnail => "jpeg",
            BackendKind::RawBlock => "raw-block",
            BackendKind::Tiff => "tiff",
            BackendKind::Dng => "dng",
            BackendKind::Ppm => "ppm",
            BackendKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-format parameter of a shared backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpVariant {
    Plain,
    Ppm { binary: bool },
    Histogram { log_exposure: bool },
}

/// Everything a backend needs besides the container and the output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub toggles: ResolvedToggles,
    pub variant: DumpVariant,
}

/// Trait for output backends.
///
/// # Preconditions
///
/// Every section the mode resolver marked as needed has been loaded before
/// `dump` is called. Backends report a missing section as
/// `ExtractError::Backend` rather than loading it themselves.
pub trait DumpBackend {
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Write the artifact to `output`.
    fn dump(
        &self,
        container: &dyn Container,
        output: &Path,
        options: &DumpOptions,
        settings: &ProcessingSettings,
    ) -> Result<()>;
}
