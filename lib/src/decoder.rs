// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Host-side decoding of stored log files.

use std::fmt;
use std::io::{self, Read, Write};

#[cfg(feature = "serialize")]
use serde::Serialize;

use crate::Error;
use crate::header::{HEADER_SIZE, RecordHeader, Severity};
use crate::image::FirmwareImage;
use crate::record::{Body, LogRecord};

/// Reads records one by one from a byte stream.
///
/// The stream ends cleanly when less than a header is left. A record whose payload is cut short
/// yields [`Error::TruncatedPayload`] and ends the stream, as the following record boundaries
/// cannot be recovered.
pub struct StreamDecoder<R> {
    reader: R,
    records: usize,
    done: bool,
}

impl<R: Read> StreamDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            records: 0,
            done: false,
        }
    }

    /// Number of records decoded so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn next_record(&mut self) -> Result<Option<LogRecord>, Error> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_record();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn read_record(&mut self) -> Result<Option<LogRecord>, Error> {
        let mut bytes = [0; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut bytes)?;
        let Some(header) = RecordHeader::from_slice(&bytes[..read]) else {
            if read != 0 {
                log::warn!("Ignoring {read} trailing bytes after record {}", self.records);
            }
            return Ok(None);
        };

        let mut payload = vec![0; header.payload_len()];
        let read = read_full(&mut self.reader, &mut payload)?;
        if read < payload.len() {
            return Err(Error::TruncatedPayload {
                record: self.records,
                expected: payload.len(),
                available: read,
            });
        }

        let record = LogRecord::from_parts(&header, &payload);
        log::trace!("Decoded record {}: {record:?}", self.records);
        self.records += 1;
        Ok(Some(record))
    }

    /// Decodes the whole stream, handing each resolved entry to `f`.
    pub fn for_each_entry<F>(mut self, image: &FirmwareImage, mut f: F) -> Result<Summary, Error>
    where
        F: FnMut(&Entry) -> Result<(), Error>,
    {
        let mut summary = Summary::default();

        while let Some(record) = self.next_record()? {
            let entry = Entry::new(summary.records, record, image);
            summary.count(&entry);
            f(&entry)?;
        }

        Ok(summary)
    }

    /// Decodes the whole stream and prints every entry as text.
    pub fn run<W: Write>(self, image: &FirmwareImage, mut out: W) -> Result<Summary, Error> {
        let summary = self.for_each_entry(image, |entry| Ok(write!(out, "{entry}")?))?;
        out.flush()?;
        Ok(summary)
    }
}

impl<R: Read> Iterator for StreamDecoder<R> {
    type Item = Result<LogRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// A decoded record with its format string resolved.
#[derive(Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Entry {
    /// Position of the record in the stream.
    pub sequence: usize,
    /// Format string of a `Std` record, escaped for display. `None` if it cannot be resolved or
    /// if the record has no format string.
    pub message: Option<String>,
    pub record: LogRecord,
}

impl Entry {
    pub fn new(sequence: usize, record: LogRecord, image: &FirmwareImage) -> Self {
        let message = match record.body {
            Body::Std { address, .. } => image
                .resolve(address)
                .map(|message| message.escape_ascii().to_string()),
            _ => None,
        };

        Self {
            sequence,
            message,
            record,
        }
    }
}

struct SeverityName(u8);

impl fmt::Display for SeverityName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Severity::from_raw(self.0) {
            Some(severity) => write!(f, "{severity}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let record = &self.record;
        writeln!(
            f,
            "==> Record {} module {} dropped {} timestamp {}",
            self.sequence, record.module_id, record.dropped, record.timestamp
        )?;

        match &record.body {
            Body::Std {
                severity,
                address,
                args,
            } => {
                write!(
                    f,
                    "STD header in_progress {} severity {}",
                    record.in_progress as u8,
                    SeverityName(*severity)
                )?;
                match &self.message {
                    Some(message) => writeln!(f, " msg: |{message}|")?,
                    None => writeln!(f, " unresolved msg addr: {address:#x}")?,
                }
                for (i, arg) in args.iter().enumerate() {
                    writeln!(f, "   Arg {i} {arg:#x}")?;
                }
            }
            Body::Hexdump {
                severity,
                offset,
                data,
            } => {
                writeln!(
                    f,
                    "HEX header in_progress {} severity {} offset {offset} len {}",
                    record.in_progress as u8,
                    SeverityName(*severity),
                    data.len()
                )?;
                for (i, byte) in data.iter().enumerate() {
                    writeln!(f, "   Byte {i} {byte:#x}")?;
                }
            }
            Body::Invalid { .. } => {}
        }
        Ok(())
    }
}

/// Record counts of a fully decoded stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub std: usize,
    pub hexdump: usize,
    pub invalid: usize,
    pub unresolved: usize,
}

impl Summary {
    fn count(&mut self, entry: &Entry) {
        self.records += 1;
        match entry.record.body {
            Body::Std { .. } => {
                self.std += 1;
                if entry.message.is_none() {
                    self.unresolved += 1;
                }
            }
            Body::Hexdump { .. } => self.hexdump += 1,
            Body::Invalid { .. } => self.invalid += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} records ({} std, {} hexdump, {} invalid), {} unresolved messages",
            self.records, self.std, self.hexdump, self.invalid, self.unresolved
        )
    }
}
