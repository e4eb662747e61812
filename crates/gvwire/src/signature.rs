// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type signature grammar.
//!
//! A signature is a sequence of *complete types* drawn from this grammar:
//!
//! ```text
//! complete  := basic | 'v' | 'a' complete | '(' complete* ')'
//!            | '{' basic complete '}'
//! basic     := 'y' 'b' 'n' 'q' 'i' 'u' 'x' 't' 'd' 's' 'o' 'g' 'h'
//! ```
//!
//! The grammar is self-delimiting from both ends, so this module provides a
//! forward scan (used by validation and the decoding iterator) and a backward
//! scan (used to recover the embedded signature at the tail of a variant).
//! Both scans bound their nesting depth so hostile input cannot exhaust the
//! stack.

/// Maximum container nesting accepted by all signature walks.
pub(crate) const MAX_DEPTH: usize = 64;

/// True for the single-character basic types (the only types allowed as
/// dict entry keys).
pub(crate) fn is_basic(c: u8) -> bool {
    matches!(
        c,
        b'y' | b'b' | b'n' | b'q' | b'i' | b'u' | b'x' | b't' | b'd' | b's' | b'o' | b'g' | b'h'
    )
}

/// Scan one complete type starting at `pos`.
///
/// Returns the index one past the end of the complete type, or `None` if the
/// input is not a well-formed complete type at `pos` (unknown code, bad dict
/// entry key, unterminated container, or nesting beyond [`MAX_DEPTH`]).
pub(crate) fn complete_type_len(sig: &[u8], pos: usize, depth: usize) -> Option<usize> {
    if depth > MAX_DEPTH {
        return None;
    }
    match *sig.get(pos)? {
        c if is_basic(c) => Some(pos + 1),
        b'v' => Some(pos + 1),
        b'a' => complete_type_len(sig, pos + 1, depth + 1),
        b'(' => {
            let mut p = pos + 1;
            while *sig.get(p)? != b')' {
                p = complete_type_len(sig, p, depth + 1)?;
            }
            Some(p + 1)
        }
        b'{' => {
            if !is_basic(*sig.get(pos + 1)?) {
                return None;
            }
            let p = complete_type_len(sig, pos + 2, depth + 1)?;
            if *sig.get(p)? != b'}' {
                return None;
            }
            Some(p + 1)
        }
        _ => None,
    }
}

/// Validate `sig` as a sequence of zero or more complete types.
///
/// The empty string is a valid (empty) sequence. Dict entries are accepted
/// standalone, not only as array elements.
pub fn is_valid_signature(sig: &str) -> bool {
    let bytes = sig.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        match complete_type_len(bytes, pos, 0) {
            Some(end) => pos = end,
            None => return false,
        }
    }
    true
}

/// Find the longest suffix of `bytes` that is a single complete type.
///
/// This is the forward grammar run right to left: a trailing basic code or
/// `v` stands alone, a trailing closer is matched back to its opener, and any
/// directly preceding `a` prefixes are folded in. The candidate is then
/// re-validated with the forward scan, which also checks container interiors.
///
/// Returns the start index of the suffix, or `None` if no suffix parses.
pub(crate) fn complete_type_suffix(bytes: &[u8]) -> Option<usize> {
    let end = bytes.len();
    if end == 0 {
        return None;
    }
    let mut start = match bytes[end - 1] {
        c if is_basic(c) || c == b'v' => end - 1,
        b')' | b'}' => {
            let mut depth = 1usize;
            let mut p = end - 1;
            loop {
                if p == 0 {
                    return None;
                }
                p -= 1;
                match bytes[p] {
                    b')' | b'}' => depth += 1,
                    b'(' | b'{' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            p
        }
        _ => return None,
    };
    while start > 0 && bytes[start - 1] == b'a' {
        start -= 1;
    }
    match complete_type_len(bytes, start, 0) {
        Some(e) if e == end => Some(start),
        _ => None,
    }
}
