// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte layout implied by a signature: alignment and fixed size.
//!
//! Both resolvers fold over the top-level sequence of complete types, so a
//! bare signature behaves like the body of a tuple. Neither requires a prior
//! validity check: an unparseable tail simply stops contributing, which keeps
//! them usable diagnostically on partially formed signatures.

use crate::signature::{complete_type_len, MAX_DEPTH};

/// Round `offset` up to `alignment` (a power of two).
pub(crate) fn align_up(offset: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return offset;
    }
    let mask = alignment - 1;
    (offset + mask) & !mask
}

fn type_alignment(t: &[u8], depth: usize) -> usize {
    if depth > MAX_DEPTH || t.is_empty() {
        return 1;
    }
    match t[0] {
        b'a' => type_alignment(&t[1..], depth + 1),
        b'(' | b'{' => sequence_alignment(&t[1..t.len() - 1], depth + 1),
        b'n' | b'q' => 2,
        b'i' | b'u' | b'h' => 4,
        // Variants are pinned to 8 because the contained type is unknown
        // until decode time and must never be under-aligned.
        b'x' | b't' | b'd' | b'v' => 8,
        _ => 1,
    }
}

fn sequence_alignment(sig: &[u8], depth: usize) -> usize {
    let mut max = 1;
    let mut pos = 0;
    while pos < sig.len() {
        let Some(end) = complete_type_len(sig, pos, 0) else {
            break;
        };
        max = max.max(type_alignment(&sig[pos..end], depth));
        pos = end;
    }
    max
}

fn type_fixed_size(t: &[u8], depth: usize) -> Option<usize> {
    if depth > MAX_DEPTH || t.is_empty() {
        return None;
    }
    match t[0] {
        b'y' | b'b' => Some(1),
        b'n' | b'q' => Some(2),
        b'i' | b'u' | b'h' => Some(4),
        b'x' | b't' | b'd' => Some(8),
        b'(' | b'{' => {
            let body = sequence_fixed_size(&t[1..t.len() - 1], depth + 1)?;
            // An empty tuple still occupies one placeholder byte on the wire.
            Some(if body == 0 { 1 } else { body })
        }
        // Strings carry their own terminator, variants carry their own
        // signature, and arrays take their element count from the buffer.
        _ => None,
    }
}

fn sequence_fixed_size(sig: &[u8], depth: usize) -> Option<usize> {
    let mut size = 0usize;
    let mut pos = 0;
    while pos < sig.len() {
        let end = complete_type_len(sig, pos, 0)?;
        let t = &sig[pos..end];
        size = align_up(size, type_alignment(t, depth));
        size += type_fixed_size(t, depth)?;
        pos = end;
    }
    Some(align_up(size, sequence_alignment(sig, depth)))
}

/// Required byte alignment of the value(s) described by `sig`.
///
/// Always one of {1, 2, 4, 8}; an empty or malformed signature yields 1.
pub fn alignment_of(sig: &str) -> usize {
    sequence_alignment(sig.as_bytes(), 0)
}

/// Whether `sig` denotes a constant-length encoding.
pub fn is_fixed_size(sig: &str) -> bool {
    sequence_fixed_size(sig.as_bytes(), 0).is_some()
}

/// Exact encoded length of `sig`, or 0 if it is not fixed-size.
///
/// A genuine size of 0 only occurs for the empty signature, so callers must
/// check [`is_fixed_size`] first to tell the two apart.
pub fn fixed_size_of(sig: &str) -> usize {
    sequence_fixed_size(sig.as_bytes(), 0).unwrap_or(0)
}

/// Alignment of a single already-scanned complete type (iterator internal).
pub(crate) fn member_alignment(t: &[u8]) -> usize {
    type_alignment(t, 0)
}

/// Fixed size of a single already-scanned complete type (iterator internal).
pub(crate) fn member_fixed_size(t: &[u8]) -> Option<usize> {
    type_fixed_size(t, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_alignment(sig: &str, expected: usize) {
        assert_eq!(
            alignment_of(sig),
            expected,
            "alignment of {:?} should be {}",
            sig,
            expected
        );
    }

    #[test]
    fn test_alignment_basic_types() {
        check_alignment("()", 1);
        check_alignment("y", 1);
        check_alignment("b", 1);
        check_alignment("s", 1);
        check_alignment("o", 1);
        check_alignment("g", 1);
        check_alignment("q", 2);
        check_alignment("n", 2);
        check_alignment("u", 4);
        check_alignment("h", 4);
        check_alignment("i", 4);
        check_alignment("v", 8);
        check_alignment("t", 8);
        check_alignment("x", 8);
        check_alignment("d", 8);
    }

    #[test]
    fn test_alignment_arrays() {
        check_alignment("ay", 1);
        check_alignment("as", 1);
        check_alignment("au", 4);
        check_alignment("an", 2);
        check_alignment("ans", 2);
        check_alignment("ant", 8);
        check_alignment("a{ss}", 1);
        check_alignment("a(ssu)", 4);
    }

    #[test]
    fn test_alignment_tuples() {
        check_alignment("(ss)", 1);
        check_alignment("(ssu)", 4);
        check_alignment("(u)", 4);
        check_alignment("(uuuuy)", 4);
        check_alignment("(uusuuy)", 4);
        check_alignment("((u)yyy(b(iiii)))", 4);
        check_alignment("((u)yyy(b(iiivi)))", 8);
        check_alignment("((b)(t))", 8);
        check_alignment("((b)(b)(t))", 8);
        check_alignment("(bt)", 8);
        check_alignment("((t)(b))", 8);
        check_alignment("(tb)", 8);
        check_alignment("((b)(b))", 1);
        check_alignment("((t)(t))", 8);
    }

    #[test]
    fn test_alignment_degrades_on_malformed_input() {
        check_alignment("", 1);
        check_alignment("a", 1);
        check_alignment("(ss", 1);
        check_alignment("iz", 4);
        check_alignment("tz", 8);
    }

    fn check_fixed(sig: &str, fixed: bool, size: usize) {
        assert_eq!(
            is_fixed_size(sig),
            fixed,
            "is_fixed_size({:?}) should be {}",
            sig,
            fixed
        );
        assert_eq!(
            fixed_size_of(sig),
            size,
            "fixed_size_of({:?}) should be {}",
            sig,
            size
        );
    }

    #[test]
    fn test_fixed_size_basic_types() {
        check_fixed("", true, 0);
        check_fixed("()", true, 1);
        check_fixed("y", true, 1);
        check_fixed("u", true, 4);
        check_fixed("b", true, 1);
        check_fixed("n", true, 2);
        check_fixed("q", true, 2);
        check_fixed("i", true, 4);
        check_fixed("t", true, 8);
        check_fixed("d", true, 8);
        check_fixed("h", true, 4);
        check_fixed("s", false, 0);
        check_fixed("o", false, 0);
        check_fixed("g", false, 0);
        check_fixed("v", false, 0);
        check_fixed("ay", false, 0);
    }

    #[test]
    fn test_fixed_size_tuples() {
        check_fixed("(u)", true, 4);
        check_fixed("(uuuuy)", true, 20);
        check_fixed("(uusuuy)", false, 0);
        check_fixed("a{ss}", false, 0);
        check_fixed("((u)yyy(b(iiii)))", true, 28);
        check_fixed("((u)yyy(b(iiivi)))", false, 0);
        check_fixed("((b)(t))", true, 16);
        check_fixed("((b)(b)(t))", true, 16);
        check_fixed("(bt)", true, 16);
        check_fixed("((t)(b))", true, 16);
        check_fixed("(tb)", true, 16);
        check_fixed("((b)(b))", true, 2);
        check_fixed("((t)(t))", true, 16);
    }

    #[test]
    fn test_fixed_size_arrays_never_fixed() {
        // Even with a fixed-size element, the count comes from the buffer.
        check_fixed("au", false, 0);
        check_fixed("a(yy)", false, 0);
        check_fixed("aay", false, 0);
    }

    #[test]
    fn test_fixed_size_is_multiple_of_alignment() {
        for sig in [
            "", "()", "y", "n", "u", "t", "(bt)", "(tb)", "(uuuuy)", "{yt}", "((b)(b))",
            "((u)yyy(b(iiii)))",
        ] {
            assert!(is_fixed_size(sig));
            assert_eq!(
                fixed_size_of(sig) % alignment_of(sig),
                0,
                "size of {:?} should be a multiple of its alignment",
                sig
            );
        }
    }

    #[test]
    fn test_fixed_size_dict_entry() {
        check_fixed("{yy}", true, 2);
        check_fixed("{yt}", true, 16);
        check_fixed("{sv}", false, 0);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(8, 4), 8);
        assert_eq!(align_up(9, 4), 12);
        assert_eq!(align_up(10, 8), 16);
        assert_eq!(align_up(8, 1), 8);
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 2), 2);
        assert_eq!(align_up(3, 4), 4);
    }

    #[test]
    fn test_wrapping_in_tuple_keeps_alignment() {
        for sig in ["n", "u", "t", "d", "(bt)", "ant"] {
            let wrapped = format!("({})", sig);
            assert_eq!(alignment_of(&wrapped), alignment_of(sig));
        }
    }
}
