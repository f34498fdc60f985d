//! Data-block processor and storage engines for XISF units: materializing
//! and persisting individual data blocks,
//! the monolithic `.xisf` file-framing read/write and its two-pass layout
//! fixed-point, `.xish`/`.xisb` distributed-unit handling, and the public
//! reader/writer façade that sniffs format and dispatches between the two.
//!
//! # Quick start
//!
//! ```no_run
//! use xisf_io::{facade, ReaderOptions};
//!
//! let read_result = facade::read_file("image.xisf", &ReaderOptions::default()).unwrap();
//! println!("images: {}", read_result.unit.images.len());
//! ```

pub mod block_processor;
pub mod carrier;
pub mod distributed;
mod error;
pub mod facade;
pub mod monolithic;
pub mod options;

pub use carrier::{FileStreamProvider, ReadSeek, StreamProvider, WriteSeek};
pub use error::{Error, Result};
pub use facade::{FormatHint, UnitRead, WrittenUnit};
pub use options::{CompressionRequest, ReaderOptions, WriterOptions};
