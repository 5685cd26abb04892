//! Built-in X3F container parser.
//!
//! All values are little-endian. The parser reads the file header, the
//! section directory and every image section header when a file is opened;
//! section payloads are only read when loaded.
//!
//! Decoding the compressed raw engines is delegated to
//! [`RawDecoder`](crate::plugins::RawDecoder) implementations registered
//! with [`X3fOpener::with_decoder`].

mod bytes;
pub mod container;
pub mod directory;
pub mod header;
pub mod image;
pub mod properties;

pub use container::{X3fContainer, X3fOpener};
pub use self::image::{ImageHeader, RAW_FORMATS, THUMB_JPEG, image_format_name, raw_format_name};
