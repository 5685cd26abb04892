//! Per-file extraction and batch accounting.
//!
//! [`Extractor::extract_file`] runs one file through every stage and returns
//! the committed output path. [`Extractor::run`] processes a batch in order,
//! isolating failures per file and counting them.

use crate::Result;
use crate::core::commit::{commit, discard_failed_temp, remove_stale_temp};
use crate::core::config::ProcessingSettings;
use crate::core::dispatch::dispatch;
use crate::core::paths::PathPair;
use crate::core::plan::{DerivedPlan, resolve_toggles};
use crate::core::sequencer::load_sections;
use crate::plugins::{BackendRegistry, ContainerOpener};
use crate::types::{RunOutcome, RunRequest};
use crate::x3f::X3fOpener;
use std::path::PathBuf;
use tracing::{error, info};

/// Drives container opening, section loading, dispatch and commit.
///
/// # Example
///
/// ```rust,no_run
/// use x3f_extract::{Extractor, OutputFormat, ProcessingSettings, RunRequest};
///
/// let extractor = Extractor::with_settings(ProcessingSettings::default());
/// let outcome = extractor.run(vec![
///     RunRequest::new("a.x3f", OutputFormat::Dng),
///     RunRequest::new("b.x3f", OutputFormat::Dng).with_output_dir("/tmp/out"),
/// ]);
/// std::process::exit(outcome.exit_code());
/// ```
pub struct Extractor {
    opener: Box<dyn ContainerOpener>,
    registry: BackendRegistry,
    settings: ProcessingSettings,
}

impl Extractor {
    pub fn new(opener: Box<dyn ContainerOpener>, registry: BackendRegistry, settings: ProcessingSettings) -> Self {
        Self {
            opener,
            registry,
            settings,
        }
    }

    /// Built-in X3F opener and default backends.
    pub fn with_settings(settings: ProcessingSettings) -> Self {
        Self::new(Box::new(X3fOpener::new()), BackendRegistry::with_defaults(), settings)
    }

    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Process one file and return the committed output path.
    ///
    /// The output paths are built before the container is opened, so a path
    /// error never loads or writes anything. The container is released on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Any [`ExtractError`](crate::ExtractError) from the stage that failed.
    pub fn extract_file(&self, request: &RunRequest) -> Result<PathBuf> {
        let plan = DerivedPlan::for_request(request);
        let pair = PathPair::build(&request.input, request.output_dir.as_deref(), plan.extension)?;

        info!("READ THE X3F FILE {}", request.input.display());
        let mut container = self.opener.open(&request.input, &self.settings)?;

        load_sections(container.as_mut(), &plan)?;
        let toggles = resolve_toggles(&request.toggles, container.header().version);

        remove_stale_temp(&pair.temp_path)?;
        let dumped = dispatch(
            &self.registry,
            container.as_ref(),
            plan.format,
            toggles,
            &pair.temp_path,
            &pair.final_path,
            &self.settings,
        );
        drop(container);

        if let Err(err) = dumped {
            discard_failed_temp(&pair, &self.settings);
            return Err(err);
        }

        commit(&pair)?;
        Ok(pair.final_path)
    }

    /// Process a batch in order and account the outcome.
    ///
    /// Every request counts as seen; a failing request counts as errored once
    /// and does not stop the batch.
    pub fn run<I>(&self, requests: I) -> RunOutcome
    where
        I: IntoIterator<Item = RunRequest>,
    {
        let mut outcome = RunOutcome::default();

        for request in requests {
            outcome.files_seen += 1;
            if let Err(err) = self.extract_file(&request) {
                outcome.files_errored += 1;
                error!(file = %request.input.display(), stage = err.stage(), "{}", err);
            }
        }

        if outcome.files_seen == 0 {
            error!("No files given");
        }

        info!("Files processed: {}\terrors: {}", outcome.files_seen, outcome.files_errored);
        outcome
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_settings(ProcessingSettings::default())
    }
}
