// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for the decoding iterator.
//!
//! Walks arbitrary bytes under a set of signatures covering every basic
//! type and all three container kinds. Decoding may fail on any member,
//! but it must never panic or read out of bounds.

#![no_main]

use gvwire::Iter;
use libfuzzer_sys::fuzz_target;

const SIGNATURES: &[&str] = &[
    "bdntqxyusi",
    "is",
    "i(yy)",
    "(uvu)i",
    "v",
    "vv",
    "a(sy)",
    "as",
    "au",
    "a{sv}",
    "oa{sv}",
    "(sa{sv})sa{ss}us",
    "ggg",
    "h(bt)x",
];

/// Split the first complete type off a signature. Inputs here are from the
/// fixed list above or recovered from a variant, so they are well-formed.
fn split_first(sig: &str) -> Option<(&str, &str)> {
    let bytes = sig.as_bytes();
    let mut i = 0;
    while *bytes.get(i)? == b'a' {
        i += 1;
    }
    let end = match *bytes.get(i)? {
        b'(' | b'{' => {
            let mut depth = 0usize;
            let mut j = i;
            loop {
                match *bytes.get(j)? {
                    b'(' | b'{' => depth += 1,
                    b')' | b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            break j + 1;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
        }
        _ => i + 1,
    };
    Some(sig.split_at(end))
}

/// Drive `iter` through `sig`, descending into every container.
fn walk(sig: &str, iter: &mut Iter<'_>, depth: usize) {
    if depth > 8 {
        return;
    }
    let mut rest = sig;
    while let Some((head, tail)) = split_first(rest) {
        rest = tail;
        match head.as_bytes()[0] {
            b'(' | b'{' => match iter.enter_struct() {
                Ok(mut child) => walk(&head[1..head.len() - 1], &mut child, depth + 1),
                Err(_) => return,
            },
            b'a' => match iter.enter_array() {
                Ok(array) => {
                    for element in array.take(64) {
                        let Ok(mut element) = element else { break };
                        walk(&head[1..], &mut element, depth + 1);
                    }
                }
                Err(_) => return,
            },
            b'v' => match iter.enter_variant() {
                Ok(mut child) => {
                    let contained = child.remaining_signature();
                    walk(contained, &mut child, depth + 1);
                }
                Err(_) => return,
            },
            code => {
                if iter.next_basic(code as char).is_err() {
                    return;
                }
            }
        }
    }
}

fuzz_target!(|data: &[u8]| {
    for sig in SIGNATURES {
        let mut iter = Iter::new(sig, data);
        walk(sig, &mut iter, 0);
    }
});
