// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for the signature grammar and layout resolvers.
//!
//! Feeds arbitrary text to validation, alignment, and fixed-size
//! resolution. None of these operations may panic, recurse without bound,
//! or break their documented invariants on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(sig) = std::str::from_utf8(data) else {
        return;
    };

    let _ = gvwire::is_valid_signature(sig);

    let alignment = gvwire::alignment_of(sig);
    assert!(matches!(alignment, 1 | 2 | 4 | 8));

    let size = gvwire::fixed_size_of(sig);
    if gvwire::is_fixed_size(sig) {
        assert_eq!(size % alignment, 0);
    } else {
        assert_eq!(size, 0);
    }
});
