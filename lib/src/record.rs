// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Encoding and decoding of complete log records.

#[cfg(test)]
mod tests;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "serialize")]
use serde::Serialize;

use crate::Error;
use crate::header::{HEADER_SIZE, HeaderWord, RecordHeader, fields, types};

/// Type-specific content of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "serialize", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Body {
    /// Formatted message whose format string lives in the firmware image.
    Std {
        severity: u8,
        address: u32,
        args: Vec<u32>,
    },
    /// Raw byte dump.
    Hexdump {
        severity: u8,
        offset: u16,
        data: Vec<u8>,
    },
    /// Record of unknown type. Only the raw header bits are known; no payload follows.
    Invalid { tag: u8, bits: u32 },
}

/// A single log record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct LogRecord {
    /// The producer was still assembling the record when it was captured.
    pub in_progress: bool,
    pub module_id: u16,
    /// Number of records dropped by the producer before this one.
    pub dropped: u16,
    pub timestamp: u32,
    pub body: Body,
}

/// Result of decoding a record from a byte slice.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// A record and the number of bytes it occupies.
    Record(LogRecord, usize),
    /// Not enough bytes left for a header.
    EndOfStream,
}

impl LogRecord {
    pub fn std(module_id: u16, severity: u8, address: u32, args: Vec<u32>) -> Self {
        Self {
            in_progress: false,
            module_id,
            dropped: 0,
            timestamp: 0,
            body: Body::Std {
                severity,
                address,
                args,
            },
        }
    }

    pub fn hexdump(module_id: u16, severity: u8, offset: u16, data: Vec<u8>) -> Self {
        Self {
            in_progress: false,
            module_id,
            dropped: 0,
            timestamp: 0,
            body: Body::Hexdump {
                severity,
                offset,
                data,
            },
        }
    }

    pub fn severity(&self) -> Option<u8> {
        match self.body {
            Body::Std { severity, .. } | Body::Hexdump { severity, .. } => Some(severity),
            Body::Invalid { .. } => None,
        }
    }

    /// Builds the wire header of the record, validating every field width.
    pub fn header(&self) -> Result<RecordHeader, Error> {
        let mut word = HeaderWord::default();
        word.set(fields::IN_PROGRESS, self.in_progress as u32)?;

        match &self.body {
            Body::Std {
                severity,
                address,
                args,
            } => {
                word.set(fields::TYPE, types::STD as u32)?;
                word.set(fields::SEVERITY, *severity as u32)?;
                word.set(fields::NARGS, args.len() as u32)?;
                word.set(fields::ADDR, *address)?;
            }
            Body::Hexdump {
                severity,
                offset,
                data,
            } => {
                word.set(fields::TYPE, types::HEXDUMP as u32)?;
                word.set(fields::SEVERITY, *severity as u32)?;
                word.set(fields::OFFSET, *offset as u32)?;
                word.set(fields::LEN, data.len() as u32)?;
            }
            Body::Invalid { .. } => return Err(Error::UnencodableRecord),
        }

        Ok(RecordHeader {
            word,
            module_id: self.module_id,
            dropped: self.dropped,
            timestamp: self.timestamp,
        })
    }

    /// Serializes the record: header followed by the payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let header = self.header()?;
        let mut bytes = Vec::with_capacity(HEADER_SIZE + header.payload_len());
        bytes.extend_from_slice(&header.to_bytes());

        match &self.body {
            Body::Std { args, .. } => {
                for arg in args {
                    bytes.extend_from_slice(&arg.to_le_bytes());
                }
            }
            Body::Hexdump { data, .. } => bytes.extend_from_slice(data),
            Body::Invalid { .. } => return Err(Error::UnencodableRecord),
        }

        debug_assert_eq!(bytes.len(), HEADER_SIZE + header.payload_len());
        Ok(bytes)
    }

    /// Builds a record from a parsed header and exactly `header.payload_len()` payload bytes.
    pub fn from_parts(header: &RecordHeader, payload: &[u8]) -> Self {
        debug_assert_eq!(payload.len(), header.payload_len());
        let word = header.word;

        let body = match word.record_type() {
            types::STD => Body::Std {
                severity: word.severity(),
                address: word.addr(),
                args: payload
                    .chunks_exact(4)
                    .map(|dword| u32::from_le_bytes([dword[0], dword[1], dword[2], dword[3]]))
                    .collect(),
            },
            types::HEXDUMP => Body::Hexdump {
                severity: word.severity(),
                offset: word.offset(),
                data: Vec::from(payload),
            },
            tag => Body::Invalid {
                tag,
                bits: word.data(),
            },
        };

        Self {
            in_progress: word.in_progress(),
            module_id: header.module_id,
            dropped: header.dropped,
            timestamp: header.timestamp,
            body,
        }
    }

    /// Decodes the record stored at the beginning of a byte slice.
    ///
    /// `sequence` is the index of the record in the stream and is only used to report truncation.
    pub fn from_slice(s: &[u8], sequence: usize) -> Result<Decoded, Error> {
        let Some(header) = RecordHeader::from_slice(s) else {
            return Ok(Decoded::EndOfStream);
        };

        let payload_len = header.payload_len();
        let available = s.len() - HEADER_SIZE;
        let Some(payload) = s.get(HEADER_SIZE..HEADER_SIZE + payload_len) else {
            return Err(Error::TruncatedPayload {
                record: sequence,
                expected: payload_len,
                available,
            });
        };

        Ok(Decoded::Record(
            Self::from_parts(&header, payload),
            HEADER_SIZE + payload_len,
        ))
    }
}
