// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Fixed 12-byte record header.
//!
//! ```text
//!  bit 31                                                        0
//!      +----------------------+--------+-------+---+-----+
//!  Std |       addr (22)      | nargs  |  sev  |ip | type|
//!      +----------+-----------+--------+-------+---+-----+
//!  Hex | len (10) | rsvd (6)  |  offset (10)   |  sev  |ip | type|
//!      +----------+-----------+----------------+-------+---+-----+
//! ```
//!
//! The word is followed by the module id (u16), the dropped counter (u16) and the timestamp (u32).
//! All fields are little-endian.

#[cfg(not(feature = "std"))]
use core::fmt;
#[cfg(feature = "std")]
use std::fmt;

use crate::Error;

pub const HEADER_SIZE: usize = 12;

pub mod types {
    pub const STD: u8 = 1;
    pub const HEXDUMP: u8 = 2;
    pub const INVALID: u8 = 3;
}

/// A bit field inside the header word.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub shift: u32,
    pub width: u32,
}

impl Field {
    const fn new(name: &'static str, shift: u32, width: u32) -> Self {
        Self { name, shift, width }
    }

    pub const fn max(&self) -> u32 {
        (1 << self.width) - 1
    }
}

pub mod fields {
    use super::Field;

    pub const TYPE: Field = Field::new("type", 0, 2);
    pub const IN_PROGRESS: Field = Field::new("in_progress", 2, 1);
    /// Bits following the common fields, interpreted per record type.
    pub const DATA: Field = Field::new("data", 3, 29);
    pub const SEVERITY: Field = Field::new("severity", 3, 3);

    pub const NARGS: Field = Field::new("nargs", 6, 4);
    pub const ADDR: Field = Field::new("addr", 10, 22);

    pub const OFFSET: Field = Field::new("offset", 6, 10);
    pub const LEN: Field = Field::new("len", 22, 10);
}

/// The first 32-bit word of the header, holding both the common and the type-specific fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderWord(pub u32);

impl HeaderWord {
    pub fn get(self, field: Field) -> u32 {
        (self.0 >> field.shift) & field.max()
    }

    /// Stores `value` in `field`, failing if it does not fit.
    pub fn set(&mut self, field: Field, value: u32) -> Result<(), Error> {
        if value > field.max() {
            return Err(Error::FieldOverflow {
                field: field.name,
                value,
                max: field.max(),
            });
        }
        self.0 = (self.0 & !(field.max() << field.shift)) | (value << field.shift);
        Ok(())
    }

    pub fn record_type(self) -> u8 {
        self.get(fields::TYPE) as u8
    }

    pub fn in_progress(self) -> bool {
        self.get(fields::IN_PROGRESS) != 0
    }

    pub fn severity(self) -> u8 {
        self.get(fields::SEVERITY) as u8
    }

    pub fn nargs(self) -> u8 {
        self.get(fields::NARGS) as u8
    }

    pub fn addr(self) -> u32 {
        self.get(fields::ADDR)
    }

    pub fn offset(self) -> u16 {
        self.get(fields::OFFSET) as u16
    }

    pub fn len(self) -> u16 {
        self.get(fields::LEN) as u16
    }

    pub fn data(self) -> u32 {
        self.get(fields::DATA)
    }
}

/// Wire-level record header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordHeader {
    pub word: HeaderWord,
    pub module_id: u16,
    pub dropped: u16,
    pub timestamp: u32,
}

impl RecordHeader {
    /// Parses the header stored at the beginning of a byte slice.
    pub fn from_slice(s: &[u8]) -> Option<Self> {
        Some(Self {
            word: HeaderWord(u32::from_le_bytes(s.get(0..4)?.try_into().ok()?)),
            module_id: u16::from_le_bytes(s.get(4..6)?.try_into().ok()?),
            dropped: u16::from_le_bytes(s.get(6..8)?.try_into().ok()?),
            timestamp: u32::from_le_bytes(s.get(8..12)?.try_into().ok()?),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.word.0.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.module_id.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.dropped.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes
    }

    /// Number of payload bytes following the header, as declared by the header fields.
    ///
    /// Records of unknown type carry no payload.
    pub fn payload_len(&self) -> usize {
        match self.word.record_type() {
            types::STD => self.word.nargs() as usize * 4,
            types::HEXDUMP => self.word.len() as usize,
            _ => 0,
        }
    }
}

/// Log levels used by the device logger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Severity {
    None = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    InfoRaw = 5,
}

impl Severity {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Severity::None,
            1 => Severity::Error,
            2 => Severity::Warning,
            3 => Severity::Info,
            4 => Severity::Debug,
            5 => Severity::InfoRaw,
            _ => return None,
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Severity::None => "none",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::InfoRaw => "info_raw",
        };
        write!(f, "{name}")
    }
}
