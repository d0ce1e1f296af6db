//! A library for packing PNG images of several sizes into a single ICO
//! container, and for unpacking such containers again.
//!
//! # Overview
//!
//! An ICO container starts with a six-byte header, followed by one
//! sixteen-byte directory record per image, followed by the images' encoded
//! bytes.  Each directory record gives the width and height of its image (one
//! byte each), the length of the encoded bytes, and their absolute offset
//! within the file.
//!
//! [`write_icon`] lays out a container from a list of [`Entry`] values,
//! packing the payloads back to back in the order given.  [`IconReader`]
//! parses and validates the header and directory of an existing container
//! and extracts individual payloads on demand.  [`Picture`] handles the pixel
//! side: loading source images, resampling them to each target size, and
//! encoding/decoding the PNG payloads.
//!
//! # Example
//!
//! ```no_run
//! use icopack::{write_icon_file, Entry, Picture, WriteOptions};
//! let source = Picture::open("logo.png").unwrap();
//! let mut entries = Vec::new();
//! for &size in &[16, 32, 48] {
//!     let picture = source.resample(size, size).unwrap();
//!     entries.push(Entry::new(size, size, picture.encode_png().unwrap()));
//! }
//! write_icon_file("logo.ico", &entries, WriteOptions::default()).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod entry;
mod error;
pub mod icondir;
mod picture;
mod reader;
mod writer;

pub use crate::entry::{DimensionPolicy, Entry};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::picture::Picture;
pub use crate::reader::{read_icon_file, IconReader};
pub use crate::writer::{
    write_icon, write_icon_file, write_icon_with, WriteOptions,
};
