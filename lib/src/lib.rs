// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Compact flash logging for constrained devices.
//!
//! Records are stored as a 12-byte bit-packed header followed by a small variant payload. On the
//! device, [`RotatingWriter`](writer::RotatingWriter) persists them to a ring of storage files.
//! Off the device, [`StreamDecoder`](decoder::StreamDecoder) reads them back and resolves the
//! deferred format strings against the [`FirmwareImage`](image::FirmwareImage) the device was
//! running.
//!
//! ```
//! use flashlog::prelude::*;
//!
//! let image = FirmwareImage::from_bytes(b"hello\0world\0".to_vec()).unwrap();
//! let record = LogRecord::std(3, Severity::Info as u8, 0x8000, vec![0x1, 0x2]);
//! let bytes = record.to_bytes().unwrap();
//!
//! let mut decoder = StreamDecoder::new(bytes.as_slice());
//! let decoded = decoder.next().unwrap().unwrap();
//! assert_eq!(decoded, record);
//! assert_eq!(image.resolve(0x8000), Some(&b"hello"[..]));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
pub mod decoder;
mod error;
pub mod header;
pub mod image;
pub mod record;
pub mod writer;

pub use error::Error;

pub mod prelude {
    #[cfg(feature = "std")]
    pub use crate::decoder::{Entry, StreamDecoder, Summary};
    pub use crate::error::Error;
    pub use crate::header::{HEADER_SIZE, RecordHeader, Severity};
    pub use crate::image::FirmwareImage;
    pub use crate::record::{Body, Decoded, LogRecord};
    pub use crate::writer::{RotatingWriter, Storage, WriterConfig, WriterStats};
}
