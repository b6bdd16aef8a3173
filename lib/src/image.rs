// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Resolution of deferred format strings against the firmware image.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::path::Path;

use crate::Error;

/// Flat binary image of the application firmware.
///
/// Byte 0 of the image is mapped at [`FirmwareImage::BASE_ADDRESS`] on the device.
pub struct FirmwareImage {
    base: u32,
    data: Vec<u8>,
}

impl FirmwareImage {
    /// Load address of the application image (see the bootloader memory map).
    pub const BASE_ADDRESS: u32 = 0x8000;

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        Self::with_base(data, Self::BASE_ADDRESS)
    }

    pub fn with_base(data: Vec<u8>, base: u32) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::EmptyImage);
        }
        Ok(Self { base, data })
    }

    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<Path>>(path: P, base: u32) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        log::debug!("Loaded {} bytes of firmware image", data.len());
        Self::with_base(data, base)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the bytes of the null-terminated string located at `address`, without the
    /// terminator. The bytes are returned as stored in the image.
    pub fn resolve(&self, address: u32) -> Option<&[u8]> {
        let offset = address.checked_sub(self.base)? as usize;
        let tail = self.data.get(offset..)?;
        let end = tail.iter().position(|&byte| byte == 0)?;
        Some(&tail[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> FirmwareImage {
        FirmwareImage::from_bytes(b"hello\0world\0".to_vec()).unwrap()
    }

    #[test]
    fn resolve_strings() {
        let image = hello();
        assert_eq!(image.resolve(0x8000), Some(&b"hello"[..]));
        assert_eq!(image.resolve(0x8006), Some(&b"world"[..]));
        assert_eq!(image.resolve(0x8002), Some(&b"llo"[..]));
        assert_eq!(image.resolve(0x8005), Some(&b""[..]));
    }

    #[test]
    fn resolve_bounds() {
        let image = hello();
        let end = FirmwareImage::BASE_ADDRESS + image.len() as u32;
        assert_eq!(image.resolve(FirmwareImage::BASE_ADDRESS - 1), None);
        assert_eq!(image.resolve(end), None);
        assert_eq!(image.resolve(end + 1), None);
        assert_eq!(image.resolve(0), None);
        assert_eq!(image.resolve(u32::MAX), None);
    }

    #[test]
    fn missing_terminator() {
        let image = FirmwareImage::from_bytes(b"abc\0def".to_vec()).unwrap();
        assert_eq!(image.resolve(0x8000), Some(&b"abc"[..]));
        assert_eq!(image.resolve(0x8004), None);

        let image = FirmwareImage::from_bytes(b"no terminator".to_vec()).unwrap();
        assert_eq!(image.resolve(0x8000), None);
    }

    #[test]
    fn resolve_is_pure() {
        let image = hello();
        for address in [0x7fff, 0x8000, 0x8003, 0x8006, 0x800c, 0x9000] {
            assert_eq!(image.resolve(address), image.resolve(address));
        }
    }

    #[test]
    fn raw_bytes_are_preserved() {
        let image = FirmwareImage::from_bytes(vec![0xff, b'\n', 0x80, 0]).unwrap();
        assert_eq!(image.resolve(0x8000), Some(&[0xff, b'\n', 0x80][..]));
    }

    #[test]
    fn custom_base() {
        let image = FirmwareImage::with_base(b"boot\0".to_vec(), 0x1000).unwrap();
        assert_eq!(image.base(), 0x1000);
        assert_eq!(image.resolve(0x1000), Some(&b"boot"[..]));
        assert_eq!(image.resolve(0x8000), None);
    }

    #[test]
    fn empty_image() {
        assert!(matches!(
            FirmwareImage::from_bytes(Vec::new()),
            Err(Error::EmptyImage)
        ));
    }

    #[test]
    fn from_sample() {
        let image = FirmwareImage::from_file("tests/samples/hello.img", 0x8000).unwrap();
        assert_eq!(image.len(), 12);
        assert_eq!(image.resolve(0x8006), Some(&b"world"[..]));
        assert!(matches!(
            FirmwareImage::from_file("tests/samples/missing.img", 0x8000),
            Err(Error::Io(_))
        ));
    }
}
