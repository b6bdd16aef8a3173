// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{RotatingWriter, Storage};

/// Handle on a background task feeding captured records to a [`RotatingWriter`].
pub struct FlushTask<S: Storage> {
    handle: JoinHandle<RotatingWriter<S>>,
    enabled: Arc<AtomicBool>,
}

impl<S: Storage> FlushTask<S> {
    /// Disables the writer before the next record is submitted.
    pub fn panic_set(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Waits for the task to drain the channel after all senders are gone.
    pub fn join(self) -> thread::Result<RotatingWriter<S>> {
        self.handle.join()
    }
}

/// Starts the flush task.
///
/// The task wakes up every `period`, submits every record pending in `records` and exits once the
/// channel is closed and empty.
pub fn spawn_flush_task<S>(
    mut writer: RotatingWriter<S>,
    records: Receiver<Vec<u8>>,
    period: Duration,
) -> FlushTask<S>
where
    S: Storage + Send + 'static,
    S::File: Send + 'static,
{
    let enabled = Arc::new(AtomicBool::new(true));
    let task_enabled = enabled.clone();

    let handle = thread::spawn(move || {
        log::debug!("Logger task started");
        loop {
            loop {
                let raw = match records.try_recv() {
                    Ok(raw) => raw,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::debug!("Logger task stopped: {}", writer.stats());
                        return writer;
                    }
                };
                if !task_enabled.load(Ordering::SeqCst) && writer.is_enabled() {
                    writer.panic_set();
                }
                writer.submit(&raw);
            }
            thread::sleep(period);
        }
    });

    FlushTask { handle, enabled }
}
