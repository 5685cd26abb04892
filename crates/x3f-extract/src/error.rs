//! Error types for x3f-extract.
//!
//! Every failure that can happen while processing one input file maps onto a
//! variant of [`ExtractError`]. All of them are file-local: the batch driver
//! reports the error with the file name and stage, counts it once, and moves
//! on to the next file.
//!
//! - `Config` - unknown format or color token, invalid configuration file
//! - `Open` - the input file could not be opened
//! - `Parse` - the container header or section directory is unreadable
//! - `SectionLoad` - a named section failed to load or decode
//! - `Path` - the output path would exceed its length bound
//! - `Backend` - a dump backend failed
//! - `Commit` - renaming the temp file onto the final path failed
//! - `Io` - any other I/O failure (always bubbles up unchanged)
//!
//! # Example
//!
//! ```rust
//! use x3f_extract::{ExtractError, Result};
//!
//! fn parse_token(token: &str) -> Result<()> {
//!     if token.is_empty() {
//!         return Err(ExtractError::config("empty format token"));
//!     }
//!     Ok(())
//! }
//! # assert!(parse_token("").is_err());
//! ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractError`.
pub type Result<T> = std::result::Result<T, ExtractError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read container: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Could not load {section}: {message}")]
    SectionLoad {
        section: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Backend '{backend}' failed: {message}")]
    Backend {
        backend: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Could not rename {} to {}: {source}", from.display(), to.display())]
    Commit {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create a Config error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Config error with source.
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Parse error with source.
    pub fn parse_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a SectionLoad error for the named section.
    pub fn section_load<N: Into<String>, S: Into<String>>(section: N, message: S) -> Self {
        Self::SectionLoad {
            section: section.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a SectionLoad error with source.
    pub fn section_load_with_source<N, S, E>(section: N, message: S, source: E) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SectionLoad {
            section: section.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Backend error attributed to `backend`.
    pub fn backend<N: Into<String>, S: Into<String>>(backend: N, message: S) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a Backend error with source.
    pub fn backend_with_source<N, S, E>(backend: N, message: S, source: E) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Stable label of the processing stage this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Open { .. } => "open",
            Self::Parse { .. } => "parse",
            Self::SectionLoad { .. } => "load",
            Self::Path(_) => "path",
            Self::Backend { .. } => "dump",
            Self::Commit { .. } => "commit",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::Io(_)));
        assert!(err.to_string().contains("IO error"));
        assert_eq!(err.stage(), "io");
    }

    #[test]
    fn test_config_error() {
        let err = ExtractError::config("Unknown format : gif");
        assert_eq!(err.to_string(), "Configuration error: Unknown format : gif");
        assert_eq!(err.stage(), "config");
    }

    #[test]
    fn test_config_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad toml");
        let err = ExtractError::config_with_source("invalid config", source);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_open_error_names_path() {
        let err = ExtractError::Open {
            path: PathBuf::from("/photos/missing.x3f"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/photos/missing.x3f"));
        assert_eq!(err.stage(), "open");
    }

    #[test]
    fn test_parse_error() {
        let err = ExtractError::parse("bad directory signature");
        assert_eq!(err.to_string(), "Could not read container: bad directory signature");
        assert_eq!(err.stage(), "parse");
    }

    #[test]
    fn test_section_load_error() {
        let err = ExtractError::section_load("RAW", "Could not find any matching RAW format");
        assert_eq!(err.to_string(), "Could not load RAW: Could not find any matching RAW format");
        assert_eq!(err.stage(), "load");
    }

    #[test]
    fn test_section_load_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = ExtractError::section_load_with_source("CAMF", "truncated", source);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_backend_error() {
        let err = ExtractError::backend("dng", "no decoded image");
        assert_eq!(err.to_string(), "Backend 'dng' failed: no decoded image");
        assert_eq!(err.stage(), "dump");
    }

    #[test]
    fn test_commit_error() {
        let err = ExtractError::Commit {
            from: PathBuf::from("a.dng.tmp"),
            to: PathBuf::from("a.dng"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Could not rename a.dng.tmp to a.dng: denied");
        assert_eq!(err.stage(), "commit");
    }

    #[test]
    fn test_path_error() {
        let err = ExtractError::Path("too long".to_string());
        assert_eq!(err.stage(), "path");
    }
}
