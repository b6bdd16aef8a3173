// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Device-side persistence of log records into a ring of storage files.
//!
//! The writer appends every submitted record to the currently open file and moves to the next
//! file name once `records_per_file` records have been written. After `ring_size` files the
//! names wrap around and the oldest file is reused, which bounds the flash usage to
//! `ring_size * records_per_file` records.

#[cfg(feature = "std")]
mod dir;
#[cfg(feature = "std")]
mod task;

#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
};
#[cfg(not(feature = "std"))]
use core::fmt;
#[cfg(feature = "std")]
use std::fmt;

use crate::Error;
use crate::header::{HEADER_SIZE, RecordHeader};
use crate::record::LogRecord;
#[cfg(feature = "std")]
pub use dir::DirStorage;
#[cfg(feature = "std")]
pub use task::{FlushTask, spawn_flush_task};

/// Persistent file storage used by the writer.
pub trait Storage {
    type File;
    type Error: fmt::Display;

    /// Whether the underlying file system is mounted and usable.
    fn is_ready(&self) -> bool;

    /// Opens `name` for writing, creating it if it does not exist.
    fn open(&mut self, name: &str) -> Result<Self::File, Self::Error>;

    fn write(&mut self, file: &mut Self::File, data: &[u8]) -> Result<(), Self::Error>;

    fn close(&mut self, file: Self::File) -> Result<(), Self::Error>;
}

/// Rotation and truncation parameters of a [`RotatingWriter`].
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Number of file names in the ring.
    pub ring_size: usize,
    /// Number of records written to a file before moving to the next one.
    pub records_per_file: usize,
    /// Maximum number of payload bytes persisted per record.
    pub payload_cap: usize,
    pub file_prefix: String,
    pub file_suffix: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            ring_size: 10,
            records_per_file: 50,
            payload_cap: 64,
            file_prefix: "/debug_".to_string(),
            file_suffix: ".log".to_string(),
        }
    }
}

impl WriterConfig {
    /// Name of the file stored in slot `index` of the ring.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}{index}{}", self.file_prefix, self.file_suffix)
    }
}

/// Counters describing what happened to the submitted records.
///
/// These are diagnostics of the writer only. The dropped counter carried by each record is
/// maintained by the producer and is never updated from here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub dropped: u64,
    pub truncated: u64,
    pub write_errors: u64,
    pub rotations: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "written {} dropped {} truncated {} write errors {} rotations {}",
            self.written, self.dropped, self.truncated, self.write_errors, self.rotations
        )
    }
}

/// Writes records to a rotating set of storage files.
///
/// Only one writer may exist per storage device. It is not synchronized and expects to be driven
/// by a single flush task.
pub struct RotatingWriter<S: Storage> {
    storage: S,
    config: WriterConfig,
    file: Option<S::File>,
    records_in_file: usize,
    file_index: usize,
    open_attempted: bool,
    enabled: bool,
    stats: WriterStats,
}

impl<S: Storage> RotatingWriter<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, WriterConfig::default())
    }

    pub fn with_config(storage: S, mut config: WriterConfig) -> Self {
        config.ring_size = config.ring_size.max(1);
        config.records_per_file = config.records_per_file.max(1);

        Self {
            storage,
            config,
            file: None,
            records_in_file: 0,
            file_index: 0,
            open_attempted: false,
            enabled: true,
            stats: WriterStats::default(),
        }
    }

    /// Persists one captured record: the 12-byte header followed by its payload.
    ///
    /// At most `payload_cap` payload bytes are written. Returns `false` if the record has been
    /// dropped.
    pub fn submit(&mut self, raw: &[u8]) -> bool {
        if !self.enabled || !self.storage.is_ready() {
            self.stats.dropped += 1;
            return false;
        }

        let Some(header) = RecordHeader::from_slice(raw) else {
            log::warn!("Dropping malformed record of {} bytes", raw.len());
            self.stats.dropped += 1;
            return false;
        };

        self.ensure_file_opened();
        let Some(file) = self.file.as_mut() else {
            self.stats.dropped += 1;
            return false;
        };

        let declared = header.payload_len();
        let supplied = raw.len() - HEADER_SIZE;
        if supplied < declared {
            log::warn!("Record declares {declared} payload bytes but only {supplied} are present");
        }
        let mut payload_len = declared.min(supplied);
        if payload_len > self.config.payload_cap {
            log::trace!(
                "Truncating payload from {payload_len} to {} bytes",
                self.config.payload_cap
            );
            payload_len = self.config.payload_cap;
            self.stats.truncated += 1;
        }

        let mut result = self.storage.write(file, &raw[..HEADER_SIZE]);
        if result.is_ok() && payload_len != 0 {
            result = self
                .storage
                .write(file, &raw[HEADER_SIZE..HEADER_SIZE + payload_len]);
        }
        if let Err(err) = result {
            log::warn!(
                "Failed to write record to {}: {err}",
                self.config.file_name(self.file_index)
            );
            self.stats.write_errors += 1;
        }

        self.records_in_file += 1;
        self.stats.written += 1;
        true
    }

    /// Encodes and persists a record.
    pub fn submit_record(&mut self, record: &LogRecord) -> Result<bool, Error> {
        Ok(self.submit(&record.to_bytes()?))
    }

    /// Rotates the file if it is full and opens the current one if no attempt has been made yet.
    ///
    /// A failed open is not retried until the next rotation or [`RotatingWriter::reset`].
    fn ensure_file_opened(&mut self) {
        if self.file.is_some() && self.records_in_file >= self.config.records_per_file {
            self.close_file();
            self.records_in_file = 0;
            self.file_index = (self.file_index + 1) % self.config.ring_size;
            self.stats.rotations += 1;
            log::debug!("Rotating to {}", self.config.file_name(self.file_index));
        }

        if self.file.is_some() || self.open_attempted {
            return;
        }

        let name = self.config.file_name(self.file_index);
        self.open_attempted = true;
        match self.storage.open(&name) {
            Ok(file) => {
                log::debug!("Opened {name}");
                self.file = Some(file);
            }
            Err(err) => log::warn!("Failed to open {name}: {err}"),
        }
    }

    fn close_file(&mut self) {
        if let Some(file) = self.file.take()
            && let Err(err) = self.storage.close(file)
        {
            log::warn!(
                "Failed to close {}: {err}",
                self.config.file_name(self.file_index)
            );
        }
        self.open_attempted = false;
    }

    /// Closes the current file and allows a new open attempt on the current slot.
    ///
    /// The next record reopens the slot from its beginning.
    pub fn reset(&mut self) {
        self.close_file();
        self.records_in_file = 0;
    }

    /// Stops persisting records. Called when the device enters its fatal error handler so that
    /// records emitted by a faulted producer cannot corrupt the stored logs.
    pub fn panic_set(&mut self) {
        if self.enabled {
            log::debug!("Disabling log writer");
        }
        self.enabled = false;
        self.close_file();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Index of the ring slot currently written to.
    pub fn file_index(&self) -> usize {
        self.file_index
    }

    pub fn records_in_file(&self) -> usize {
        self.records_in_file
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Closes the current file and gives the storage back.
    pub fn into_storage(mut self) -> S {
        self.close_file();
        self.storage
    }
}
