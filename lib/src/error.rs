// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

#[cfg(not(feature = "std"))]
use core::fmt;
#[cfg(feature = "std")]
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A record declares more payload than the input holds. `record` is the number of records
    /// successfully decoded before this one.
    TruncatedPayload {
        record: usize,
        expected: usize,
        available: usize,
    },
    /// A field does not fit in its bit width.
    FieldOverflow {
        field: &'static str,
        value: u32,
        max: u32,
    },
    /// Invalid records are only ever produced by decoding.
    UnencodableRecord,
    EmptyImage,
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TruncatedPayload {
                record,
                expected,
                available,
            } => write!(
                f,
                "Truncated payload in record {record}: expected {expected} bytes, found {available}"
            ),
            Error::FieldOverflow { field, value, max } => {
                write!(f, "Value {value:#x} does not fit in field {field} (max {max:#x})")
            }
            Error::UnencodableRecord => write!(f, "Invalid records cannot be encoded"),
            Error::EmptyImage => write!(f, "Firmware image is empty"),
            #[cfg(feature = "std")]
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
