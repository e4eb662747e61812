// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RFC 4122 UUID generation (versions 3, 4 and 5).
//!
//! Name-based UUIDs (v3 via MD5, v5 via SHA-1) are deterministic: the same
//! namespace and name always produce the same identifier. v4 draws from the
//! system's secure random source.

use md5::{Digest, Md5};
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

/// Name space ID for fully-qualified domain names.
pub const NAMESPACE_DNS: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x10, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);
/// Name space ID for URLs.
pub const NAMESPACE_URL: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x11, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);
/// Name space ID for ISO OIDs.
pub const NAMESPACE_OID: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x12, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);
/// Name space ID for X.500 distinguished names.
pub const NAMESPACE_X500: Uuid = Uuid([
    0x6b, 0xa7, 0xb8, 0x14, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

/// Errors for UUID generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UuidError {
    /// The system random source is unavailable.
    RandomUnavailable,
}

impl fmt::Display for UuidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomUnavailable => write!(f, "system random source unavailable"),
        }
    }
}

impl std::error::Error for UuidError {}

/// A 16-byte RFC 4122 identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// Wrap raw bytes without touching version or variant bits.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Uuid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Version 3: MD5 of namespace and name.
    pub fn v3(namespace: &Uuid, name: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(namespace.0);
        hasher.update(name);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash);
        Self::with_version(bytes, 3)
    }

    /// Version 4: random.
    pub fn v4() -> Result<Self, UuidError> {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes)
            .map_err(|_| UuidError::RandomUnavailable)?;
        Ok(Self::with_version(bytes, 4))
    }

    /// Version 5: SHA-1 of namespace and name, truncated to 16 bytes.
    pub fn v5(namespace: &Uuid, name: &[u8]) -> Self {
        let mut ctx = digest::Context::new(&digest::SHA1_FOR_LEGACY_USE_ONLY);
        ctx.update(&namespace.0);
        ctx.update(name);
        let hash = ctx.finish();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash.as_ref()[..16]);
        Self::with_version(bytes, 5)
    }

    /// The version field (bits 4-7 of octet 6).
    pub fn version(&self) -> u8 {
        self.0[6] >> 4
    }

    fn with_version(mut bytes: [u8; 16], version: u8) -> Self {
        bytes[6] = (bytes[6] & 0x0f) | (version << 4);
        // RFC 4122 variant: the two most significant bits of octet 8 are 10.
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        Uuid(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                write!(f, "-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self)
    }
}
