// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::Storage;

/// Storage backed by a directory of the host file system.
///
/// File names produced by the writer are interpreted relative to the root directory. Files are
/// truncated when opened, so a reused ring slot only holds the records of its latest rotation.
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }
}

impl Storage for DirStorage {
    type File = File;
    type Error = io::Error;

    fn is_ready(&self) -> bool {
        self.root.is_dir()
    }

    fn open(&mut self, name: &str) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path(name))
    }

    fn write(&mut self, file: &mut File, data: &[u8]) -> io::Result<()> {
        file.write_all(data)
    }

    fn close(&mut self, file: File) -> io::Result<()> {
        file.sync_all()
    }
}
