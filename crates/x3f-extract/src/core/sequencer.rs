//! Section load sequencing.
//!
//! Loads the sections a [`DerivedPlan`] asks for in a fixed order and stops
//! at the first failure:
//!
//! thumbnail -> properties -> calibration -> raw (decoded) -> raw (undecoded)
//!
//! The property section is optional in some container variants; its absence
//! is skipped silently. Every other needed section must be present.

use crate::core::plan::DerivedPlan;
use crate::plugins::{Container, SectionKind, SectionRef};
use crate::{ExtractError, Result};
use tracing::debug;

/// Message of the raw-section locator failure.
pub const NO_RAW_FORMAT: &str = "Could not find any matching RAW format";

/// Load every section `plan` needs into `container`.
///
/// # Errors
///
/// Propagates the first `SectionLoad` error; later sections are not attempted.
pub fn load_sections(container: &mut dyn Container, plan: &DerivedPlan) -> Result<()> {
    if plan.needs_thumbnail {
        let section = required(container, SectionKind::Thumbnail)?;
        load(container, section)?;
    }

    if plan.needs_meta {
        match container.section(SectionKind::Properties) {
            Some(section) => load(container, section)?,
            None => debug!("No PROP section, skipping"),
        }

        let section = required(container, SectionKind::Calibration)?;
        load(container, section)?;
    }

    if plan.needs_raw_decoded {
        let section = locate_raw(container)?;
        load(container, section)?;
    }

    if plan.needs_raw_undecoded {
        let section = locate_raw(container)?;
        debug!("Load undecoded {}", section.kind);
        container.load_undecoded(section)?;
    }

    Ok(())
}

fn required(container: &dyn Container, kind: SectionKind) -> Result<SectionRef> {
    container
        .section(kind)
        .ok_or_else(|| ExtractError::section_load(kind.name(), format!("Could not find {}", kind.name())))
}

fn locate_raw(container: &dyn Container) -> Result<SectionRef> {
    container
        .raw_section()
        .ok_or_else(|| ExtractError::section_load(SectionKind::Raw.name(), NO_RAW_FORMAT))
}

fn load(container: &mut dyn Container, section: SectionRef) -> Result<()> {
    debug!("Load {}", section.kind);
    container.load(section)
}
