//! Output path construction.
//!
//! The final path is either `input + extension` (in place) or
//! `output_dir / basename(input) + extension`. The temp path is the final
//! path plus [`TEMP_SUFFIX`]. Every concatenation step is checked against a
//! fixed byte bound and fails with `ExtractError::Path` instead of truncating.

use crate::{ExtractError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf, is_separator};

/// Suffix carried by the temp path.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Bound on the directory + basename (or in-place input) part.
pub const MAX_PATH_BASE: usize = 1000;

/// Room reserved for an extension or the temp suffix.
pub const MAX_EXTENSION: usize = 10;

/// Bound on the final path.
pub const MAX_OUTPUT_PATH: usize = MAX_PATH_BASE + MAX_EXTENSION;

/// Bound on the temp path.
pub const MAX_TEMP_PATH: usize = MAX_OUTPUT_PATH + MAX_EXTENSION;

/// Final and temporary output path for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    pub final_path: PathBuf,
    pub temp_path: PathBuf,
}

impl PathPair {
    /// Build the path pair for `input`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Path` when the input has no file name or any
    /// step would exceed its bound. An empty `output_dir` means in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::Path;
    /// use x3f_extract::PathPair;
    ///
    /// let pair = PathPair::build(Path::new("/photos/a.x3f"), Some(Path::new("/out//")), ".dng")?;
    /// assert_eq!(pair.final_path, Path::new("/out/a.x3f.dng"));
    /// assert_eq!(pair.temp_path, Path::new("/out/a.x3f.dng.tmp"));
    /// # Ok::<(), x3f_extract::ExtractError>(())
    /// ```
    pub fn build(input: &Path, output_dir: Option<&Path>, extension: &str) -> Result<Self> {
        if extension.len() > MAX_EXTENSION {
            return Err(ExtractError::Path(format!(
                "extension '{}' is longer than {} bytes",
                extension, MAX_EXTENSION
            )));
        }

        let mut base = BoundedPath::new(MAX_PATH_BASE);
        match output_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => {
                let basename = input
                    .file_name()
                    .ok_or_else(|| ExtractError::Path(format!("{} has no file name", input.display())))?;
                base.push(normalized_dir(dir).as_os_str())?;
                base.push(basename)?;
            }
            None => base.push(input.as_os_str())?,
        }

        let mut final_path = base.rebound(MAX_OUTPUT_PATH);
        final_path.push(OsStr::new(extension))?;

        let mut temp_path = final_path.clone().rebound(MAX_TEMP_PATH);
        temp_path.push(OsStr::new(TEMP_SUFFIX))?;

        Ok(Self {
            final_path: final_path.into_path_buf(),
            temp_path: temp_path.into_path_buf(),
        })
    }
}

/// Directory with trailing separators collapsed to exactly one.
fn normalized_dir(dir: &Path) -> OsString {
    let trimmed = dir.components().as_path();
    let mut normalized = trimmed.as_os_str().to_os_string();
    if !ends_with_separator(&normalized) {
        normalized.push(MAIN_SEPARATOR_STR);
    }
    normalized
}

fn ends_with_separator(path: &OsStr) -> bool {
    path.as_encoded_bytes()
        .last()
        .is_some_and(|&byte| byte.is_ascii() && is_separator(byte as char))
}

#[derive(Clone)]
struct BoundedPath {
    buf: OsString,
    bound: usize,
}

impl BoundedPath {
    fn new(bound: usize) -> Self {
        Self {
            buf: OsString::new(),
            bound,
        }
    }

    fn push(&mut self, part: &OsStr) -> Result<()> {
        let len = self.buf.len() + part.len();
        if len > self.bound {
            return Err(ExtractError::Path(format!(
                "output path would be {} bytes, limit is {}",
                len, self.bound
            )));
        }
        self.buf.push(part);
        Ok(())
    }

    fn rebound(self, bound: usize) -> Self {
        Self { buf: self.buf, bound }
    }

    fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.buf)
    }
}
