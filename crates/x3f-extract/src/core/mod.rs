//! Core extraction orchestration module.
//!
//! Each input file flows through the same stages:
//!
//! 1. **Plan** (`plan`) - derive which sections are needed from the format and toggles
//! 2. **Paths** (`paths`) - build the bounded final/temp output path pair
//! 3. **Open** - hand the input to a [`ContainerOpener`](crate::plugins::ContainerOpener)
//! 4. **Load** (`sequencer`) - load the needed sections in a fixed order
//! 5. **Dispatch** (`dispatch`) - invoke exactly one backend on the temp path
//! 6. **Commit** (`commit`) - rename the temp file onto the final path
//!
//! The [`Extractor`](extractor::Extractor) drives these stages per file and
//! accounts outcomes across a batch.

pub mod commit;
pub mod config;
pub mod dispatch;
pub mod extractor;
pub mod paths;
pub mod plan;
pub mod sequencer;

pub use config::{ExtractionConfig, FailedTempPolicy, ProcessingSettings};
pub use extractor::Extractor;
pub use paths::PathPair;
pub use plan::DerivedPlan;
