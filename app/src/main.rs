// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

mod decode;

use clap::{ArgAction, Parser, ValueEnum};
use flashlog::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

/// Decodes the log files written to flash by the device.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Raw log file read back from the device
    log: PathBuf,
    /// Application image (.bin) the device was running when the log was written
    image: PathBuf,
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: Format,
    /// Address at which the application image is loaded
    #[arg(long, value_parser = parse_address, default_value = "0x8000")]
    base: u32,
    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum Format {
    /// One block of text per record
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn parse_address(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid address {s}: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if cli.base != FirmwareImage::BASE_ADDRESS {
        log::info!("Using image base address {:#x}", cli.base);
    }

    decode::decode(&cli.log, &cli.image, cli.base, cli.format)
}
