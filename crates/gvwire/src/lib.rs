// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # gvwire - compact tag-free wire format decoding
//!
//! A pure Rust codec for a self-describing binary value encoding driven by
//! short textual *type signatures* (e.g. `"a(sv)i"`). Both sides agree on
//! the signature out of band; no schema file travels with the data. The
//! crate validates signatures, computes the byte layout they imply, and
//! decodes conforming buffers into typed values, including nested
//! containers.
//!
//! ## Quick Start
//!
//! ```rust
//! use gvwire::{is_valid_signature, Iter};
//!
//! let data = [0x05, 0x00, 0x00, 0x00, 0x66, 0x6f, 0x6f, 0x62, 0x61, 0x72, 0x00];
//!
//! assert!(is_valid_signature("is"));
//! let mut iter = Iter::new("is", &data);
//! assert_eq!(iter.next_basic('i').unwrap().as_i32(), Some(5));
//! assert_eq!(iter.next_basic('s').unwrap().as_str(), Some("foobar"));
//! assert!(iter.is_exhausted());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------+
//! |                   Decoding Iterator                    |
//! |   Iter / ArrayIter: cursor + trailing offset tables    |
//! +--------------------------------------------------------+
//! |                   Layout Resolvers                     |
//! |   alignment_of | is_fixed_size | fixed_size_of         |
//! +--------------------------------------------------------+
//! |                  Signature Grammar                     |
//! |   is_valid_signature + forward/backward type scans     |
//! +--------------------------------------------------------+
//! ```
//!
//! The codec is synchronous and allocation-free on the decode path: an
//! [`Iter`] borrows the signature and the buffer, child iterators borrow
//! sub-ranges of the parent's buffer, and decoded strings are `&str` slices
//! into the input. Independent root iterators over the same immutable buffer
//! are safe to use from multiple threads; a single iterator is a plain
//! value with its own cursor and is not meant to be shared.

/// Decoding iterator over a `(signature, bytes)` pair.
pub mod iter;
/// Alignment and fixed-size resolution for signatures.
pub mod layout;
/// Signature grammar and validation.
pub mod signature;
/// RFC 4122 UUID generation (v3/v4/v5).
#[cfg(feature = "uuid")]
pub mod uuid;

pub use iter::{ArrayIter, BasicValue, DecodeError, Iter};
pub use layout::{alignment_of, fixed_size_of, is_fixed_size};
pub use signature::is_valid_signature;
#[cfg(feature = "uuid")]
pub use uuid::{Uuid, UuidError};
