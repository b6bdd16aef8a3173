// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::Format;
use flashlog::prelude::*;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn decode(log_path: &Path, image_path: &Path, base: u32, format: Format) -> ExitCode {
    let image = match FirmwareImage::from_file(image_path, base) {
        Ok(image) => image,
        Err(err) => {
            log::error!(
                "Unable to load firmware image from {}: {err}",
                image_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let file = match File::open(log_path) {
        Ok(file) => file,
        Err(err) => {
            log::error!("Failed to open {}: {err}", log_path.display());
            return ExitCode::FAILURE;
        }
    };

    let decoder = StreamDecoder::new(BufReader::new(file));
    let mut out = io::stdout().lock();
    let result = match format {
        Format::Text => decoder.run(&image, out),
        Format::Json => decoder.for_each_entry(&image, |entry| {
            serde_json::to_writer(&mut out, entry).map_err(io::Error::from)?;
            writeln!(out)?;
            Ok(())
        }),
    };

    match result {
        Ok(summary) => {
            log::info!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err @ Error::TruncatedPayload { record, .. }) => {
            log::error!("Decoding aborted after {record} records: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            log::error!("Failed to decode {}: {err}", log_path.display());
            ExitCode::FAILURE
        }
    }
}
