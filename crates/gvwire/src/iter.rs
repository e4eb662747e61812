// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-only decoding over a `(signature, bytes)` pair.
//!
//! [`Iter`] walks a container's member sequence left to right, consuming
//! fixed-size members directly and resolving variable-size members through
//! the container's trailing offset table. Entering a struct, variant, or
//! array hands back a child iterator borrowing a sub-range of the parent's
//! buffer; dropping an iterator releases nothing but the borrow.
//!
//! All multi-byte values are little-endian. The signature is assumed to have
//! passed [`crate::is_valid_signature`]; byte buffers are never trusted and
//! every framing offset is range-checked before use.

use crate::layout::{align_up, member_alignment, member_fixed_size};
use crate::signature::{complete_type_len, complete_type_suffix, is_basic};
use std::fmt;

/// Failure of a single decode operation. All variants are local and
/// recoverable; the iterator never reads out of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Every complete type in the signature has already been consumed.
    SignatureExhausted,
    /// The next complete type does not match what the caller asked for.
    /// The cursor is not advanced, so an alternate type may be tried.
    TypeMismatch { expected: char, found: char },
    /// The type code passed to a basic decode names a container or variant,
    /// which can only be entered, never read as a scalar.
    NotBasic { requested: char },
    /// The buffer ends before the member's bytes do.
    Truncated { need: usize, have: usize },
    /// A framing offset points outside the member's legal range.
    BadOffset { offset: usize, limit: usize },
    /// A string-like value has no NUL terminator inside its extent.
    MissingTerminator { at: usize },
    /// The iterator's signature range, or the signature recovered from a
    /// variant's tail, is not a well-formed complete type.
    BadSignature,
    /// An array of fixed-size elements whose extent is not a whole number
    /// of elements.
    UnevenArray { len: usize, elem: usize },
    /// A decoded string is not valid UTF-8.
    Utf8(std::str::Utf8Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureExhausted => write!(f, "no more types in signature"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected '{}', found '{}'", expected, found)
            }
            Self::NotBasic { requested } => {
                write!(f, "'{}' is not a basic type code", requested)
            }
            Self::Truncated { need, have } => {
                write!(f, "buffer truncated: need {} bytes, have {}", need, have)
            }
            Self::BadOffset { offset, limit } => {
                write!(f, "framing offset {} outside limit {}", offset, limit)
            }
            Self::MissingTerminator { at } => {
                write!(f, "string at offset {} has no terminator", at)
            }
            Self::BadSignature => write!(f, "malformed signature"),
            Self::UnevenArray { len, elem } => {
                write!(f, "array extent {} not a multiple of element size {}", len, elem)
            }
            Self::Utf8(e) => write!(f, "invalid utf-8 in string: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::Utf8(e)
    }
}

/// A decoded basic (scalar) value borrowing from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasicValue<'a> {
    Byte(u8),
    Bool(bool),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Handle(i32),
    String(&'a str),
    ObjectPath(&'a str),
    Signature(&'a str),
}

impl<'a> BasicValue<'a> {
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::Int16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::Uint16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) | Self::Handle(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The text of a string, object path, or signature value.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::String(s) | Self::ObjectPath(s) | Self::Signature(s) => Some(*s),
            _ => None,
        }
    }
}

/// Smallest offset width able to represent a container of `len` bytes.
fn offset_size_for(len: usize) -> usize {
    if len <= 0xff {
        1
    } else if len <= 0xffff {
        2
    } else if len <= 0xffff_ffff {
        4
    } else {
        8
    }
}

/// Little-endian unsigned read of `size` bytes at `at`. Caller checks bounds.
fn read_offset(data: &[u8], at: usize, size: usize) -> usize {
    let mut v = 0usize;
    for i in 0..size {
        v |= (data[at + i] as usize) << (8 * i);
    }
    v
}

/// Stateful cursor over one container's member sequence.
#[derive(Debug)]
pub struct Iter<'a> {
    /// Member sequence signature (no enclosing parens).
    sig: &'a [u8],
    sig_pos: usize,
    /// The container's byte extent.
    data: &'a [u8],
    /// Current read offset within `data`.
    pos: usize,
    /// Start of the unconsumed tail of the offset table; everything at and
    /// past this index belongs to framing, not member data.
    table_end: usize,
    offset_size: usize,
}

impl<'a> Iter<'a> {
    /// Root iterator over a validated signature and a byte buffer.
    pub fn new(signature: &'a str, data: &'a [u8]) -> Self {
        Self::over(signature.as_bytes(), data)
    }

    fn over(sig: &'a [u8], data: &'a [u8]) -> Self {
        Iter {
            sig,
            sig_pos: 0,
            data,
            pos: 0,
            table_end: data.len(),
            offset_size: offset_size_for(data.len()),
        }
    }

    /// True once every complete type in the signature has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.sig_pos >= self.sig.len()
    }

    /// Current read offset within the container's extent.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The yet-unconsumed part of this iterator's signature.
    ///
    /// Useful after [`enter_variant`](Self::enter_variant), where the child's
    /// signature is only known at decode time.
    pub fn remaining_signature(&self) -> &'a str {
        // Grammar characters are ASCII, so this cannot fail for any
        // signature that reached an iterator.
        std::str::from_utf8(&self.sig[self.sig_pos..]).unwrap_or("")
    }

    /// First character of the next complete type, or an exhaustion error.
    fn peek(&self) -> Result<u8, DecodeError> {
        if self.sig_pos >= self.sig.len() {
            return Err(DecodeError::SignatureExhausted);
        }
        Ok(self.sig[self.sig_pos])
    }

    /// Resolve the byte extent of the next member and advance past it.
    ///
    /// Fixed-size members are laid out directly after the aligned cursor.
    /// Variable-size members take their end from the offset table, except
    /// the final member, which runs to the start of the unconsumed table.
    /// State is only committed once every check has passed.
    fn next_member(&mut self) -> Result<(usize, usize, &'a [u8]), DecodeError> {
        let t_end = complete_type_len(self.sig, self.sig_pos, 0).ok_or(DecodeError::BadSignature)?;
        let t = &self.sig[self.sig_pos..t_end];
        let start = align_up(self.pos, member_alignment(t));
        let mut table_end = self.table_end;

        let end = match member_fixed_size(t) {
            Some(fs) => {
                let end = start + fs;
                if end > table_end {
                    return Err(DecodeError::Truncated {
                        need: end,
                        have: table_end,
                    });
                }
                end
            }
            None if t_end == self.sig.len() => {
                // Final member: everything up to the unconsumed table.
                if start > table_end {
                    return Err(DecodeError::Truncated {
                        need: start,
                        have: table_end,
                    });
                }
                table_end
            }
            None => {
                if table_end < self.offset_size {
                    return Err(DecodeError::Truncated {
                        need: self.offset_size,
                        have: table_end,
                    });
                }
                table_end -= self.offset_size;
                let end = read_offset(self.data, table_end, self.offset_size);
                if end < start || end > table_end {
                    log::debug!(
                        "[iter] rejecting framing offset {} (member at {}, table at {})",
                        end,
                        start,
                        table_end
                    );
                    return Err(DecodeError::BadOffset {
                        offset: end,
                        limit: table_end,
                    });
                }
                end
            }
        };

        self.sig_pos = t_end;
        self.pos = end;
        self.table_end = table_end;
        Ok((start, end, t))
    }

    /// Decode the next member, which must be the basic type `expected`.
    ///
    /// On a type mismatch the cursor does not move, so the caller may retry
    /// with another type code.
    pub fn next_basic(&mut self, expected: char) -> Result<BasicValue<'a>, DecodeError> {
        if !is_basic(expected as u8) {
            return Err(DecodeError::NotBasic {
                requested: expected,
            });
        }
        let found = self.peek()? as char;
        if found != expected {
            return Err(DecodeError::TypeMismatch { expected, found });
        }

        let (start, end, t) = self.next_member()?;
        let raw = &self.data[start..end];
        let value = match t[0] {
            b'y' => BasicValue::Byte(raw[0]),
            b'b' => BasicValue::Bool(raw[0] != 0),
            b'n' => BasicValue::Int16(i16::from_le_bytes([raw[0], raw[1]])),
            b'q' => BasicValue::Uint16(u16::from_le_bytes([raw[0], raw[1]])),
            b'i' => BasicValue::Int32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            b'u' => BasicValue::Uint32(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            b'h' => BasicValue::Handle(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            b'x' => BasicValue::Int64(i64::from_le_bytes([
                raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
            ])),
            b't' => BasicValue::Uint64(u64::from_le_bytes([
                raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
            ])),
            b'd' => BasicValue::Double(f64::from_le_bytes([
                raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
            ])),
            _ => {
                // s, o, g: NUL-terminated within the member extent.
                let nul = raw
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(DecodeError::MissingTerminator { at: start })?;
                let text = std::str::from_utf8(&raw[..nul])?;
                match t[0] {
                    b'o' => BasicValue::ObjectPath(text),
                    b'g' => BasicValue::Signature(text),
                    _ => BasicValue::String(text),
                }
            }
        };
        Ok(value)
    }

    /// Descend into the next member, which must be a tuple or dict entry.
    ///
    /// The child iterates the container's member signature over the
    /// container's byte extent; the parent advances past the whole thing.
    pub fn enter_struct(&mut self) -> Result<Iter<'a>, DecodeError> {
        let found = self.peek()?;
        if found != b'(' && found != b'{' {
            return Err(DecodeError::TypeMismatch {
                expected: '(',
                found: found as char,
            });
        }
        let (start, end, t) = self.next_member()?;
        Ok(Iter::over(&t[1..t.len() - 1], &self.data[start..end]))
    }

    /// Descend into the next member, which must be a variant.
    ///
    /// A variant's extent is `body ++ 0x00 ++ signature`; the signature is
    /// recovered by the backward grammar scan and the separator byte is
    /// dropped from the body handed to the child.
    pub fn enter_variant(&mut self) -> Result<Iter<'a>, DecodeError> {
        let found = self.peek()?;
        if found != b'v' {
            return Err(DecodeError::TypeMismatch {
                expected: 'v',
                found: found as char,
            });
        }
        let (start, end, _t) = self.next_member()?;
        let extent = &self.data[start..end];
        let sig_start = match complete_type_suffix(extent) {
            Some(s) if s >= 1 && extent[s - 1] == 0 => s,
            _ => {
                log::debug!(
                    "[iter] no signature suffix in variant extent of {} bytes",
                    extent.len()
                );
                return Err(DecodeError::BadSignature);
            }
        };
        Ok(Iter::over(&extent[sig_start..], &extent[..sig_start - 1]))
    }

    /// Descend into the next member, which must be an array.
    pub fn enter_array(&mut self) -> Result<ArrayIter<'a>, DecodeError> {
        let found = self.peek()?;
        if found != b'a' {
            return Err(DecodeError::TypeMismatch {
                expected: 'a',
                found: found as char,
            });
        }
        let (start, end, t) = self.next_member()?;
        ArrayIter::over(&t[1..], &self.data[start..end])
    }
}

/// Cursor over an array's elements, yielding one child [`Iter`] per element.
///
/// Fixed-size elements pack contiguously and the count is the extent length
/// divided by the element size. Variable-size elements use a forward-ordered
/// trailing offset table: the last entry gives the table's own start, and
/// each entry gives the end of its element.
#[derive(Debug)]
pub struct ArrayIter<'a> {
    elem_sig: &'a [u8],
    data: &'a [u8],
    elem_size: Option<usize>,
    /// End of element data; the table (if any) occupies `[table_start, len)`.
    table_start: usize,
    offset_size: usize,
    count: usize,
    index: usize,
    pos: usize,
}

impl<'a> ArrayIter<'a> {
    fn over(elem_sig: &'a [u8], data: &'a [u8]) -> Result<Self, DecodeError> {
        let elem_size = member_fixed_size(elem_sig);
        let offset_size = offset_size_for(data.len());
        let (count, table_start) = match elem_size {
            Some(fs) => {
                if data.len() % fs != 0 {
                    return Err(DecodeError::UnevenArray {
                        len: data.len(),
                        elem: fs,
                    });
                }
                (data.len() / fs, data.len())
            }
            None if data.is_empty() => (0, 0),
            None => {
                let last_entry = data.len() - offset_size;
                let table_start = read_offset(data, last_entry, offset_size);
                if table_start > last_entry {
                    return Err(DecodeError::BadOffset {
                        offset: table_start,
                        limit: last_entry,
                    });
                }
                let table_len = data.len() - table_start;
                if table_len % offset_size != 0 {
                    return Err(DecodeError::UnevenArray {
                        len: table_len,
                        elem: offset_size,
                    });
                }
                (table_len / offset_size, table_start)
            }
        };
        Ok(ArrayIter {
            elem_sig,
            data,
            elem_size,
            table_start,
            offset_size,
            count,
            index: 0,
            pos: 0,
        })
    }

    /// Number of elements in the array.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn next_element(&mut self) -> Option<Result<Iter<'a>, DecodeError>> {
        if self.index >= self.count {
            return None;
        }
        let start = align_up(self.pos, member_alignment(self.elem_sig));
        let end = match self.elem_size {
            Some(fs) => start + fs,
            None => {
                let entry_at = self.table_start + self.index * self.offset_size;
                let end = read_offset(self.data, entry_at, self.offset_size);
                if end < start || end > self.table_start {
                    return Some(Err(DecodeError::BadOffset {
                        offset: end,
                        limit: self.table_start,
                    }));
                }
                end
            }
        };
        self.index += 1;
        self.pos = end;
        Some(Ok(Iter::over(self.elem_sig, &self.data[start..end])))
    }
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Result<Iter<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}
