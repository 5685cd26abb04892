//! Built-in dump backends.
//!
//! | backend | formats | needs |
//! |---|---|---|
//! | [`MetaBackend`] | `meta` | header, directory, PROP, CAMF |
//! | [`JpegBackend`] | `jpg` | JPEG thumbnail |
//! | [`RawBlockBackend`] | `raw` | undecoded raw block |
//! | [`TiffBackend`] | `tiff` | decoded raw image |
//! | [`DngBackend`] | `dng` | decoded raw image, PROP |
//! | [`PpmBackend`] | `ppm`, `ppm-ascii` | decoded raw image |
//! | [`HistogramBackend`] | `histogram`, `loghist` | decoded raw image |

pub mod dng;
pub mod histogram;
pub mod jpeg;
pub mod meta;
pub mod ppm;
pub mod processing;
pub mod raw_block;
pub mod tiff;

pub use dng::DngBackend;
pub use histogram::HistogramBackend;
pub use jpeg::JpegBackend;
pub use meta::MetaBackend;
pub use ppm::PpmBackend;
pub use raw_block::RawBlockBackend;
pub use self::tiff::TiffBackend;

use crate::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
