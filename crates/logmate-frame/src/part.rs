//! Field lookup over one frame body.
//!
//! A body is a 16-bit part count followed by that many parts:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────┬─────────────────────────┐
//! │ Key (1B) │ Type (1B)│ Length (4B BE)   │ Value (Length bytes)    │  string, binary, image
//! ├──────────┼──────────┼──────────────────┴─────────────────────────┤
//! │ Key (1B) │ Type (1B)│ Value (2/4/8B BE, signed)                  │  int16, int32, int64
//! └──────────┴──────────┴────────────────────────────────────────────┘
//! ```
//!
//! Lookups scan linearly and stop at the first match. Integers are
//! reassembled byte by byte, so no alignment is assumed.

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::fields::{is_custom, ValueType};
use crate::record::UserInfo;

/// Size of the part count that opens every body.
pub const PART_COUNT_SIZE: usize = 2;

/// Size of the key and value type bytes that open every part.
const PART_HEADER_SIZE: usize = 2;

/// Size of the length prefix of string, binary and image values.
const VALUE_LENGTH_SIZE: usize = 4;

/// Reassemble an unsigned big-endian integer of up to 8 bytes.
pub(crate) fn be_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Reassemble a signed big-endian integer of 1 to 8 bytes.
pub(crate) fn be_int(bytes: &[u8]) -> i64 {
    let shift = 64 - 8 * bytes.len() as u32;
    ((be_uint(bytes) << shift) as i64) >> shift
}

/// One key/type/value triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part<'a> {
    pub key: u8,
    pub value_type: ValueType,
    /// Offset of the part's key byte within the body.
    pub offset: usize,
    /// The value bytes, without the length prefix.
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    /// The value as a sign-extended integer, `None` for non-integer types.
    pub fn as_int(&self) -> Option<i64> {
        self.value_type.fixed_size().map(|_| be_int(self.data))
    }

    /// The value as text, `None` for non-string types.
    pub fn as_str(&self) -> Result<Option<&'a str>> {
        if self.value_type != ValueType::Utf8String {
            return Ok(None);
        }
        std::str::from_utf8(self.data)
            .map(Some)
            .map_err(|_| FrameError::StringEncoding { key: self.key })
    }
}

/// The parts of one frame body.
#[derive(Debug, Clone, Copy)]
pub struct PartList<'a> {
    body: &'a [u8],
    count: u16,
}

impl<'a> PartList<'a> {
    /// Wrap a frame body (everything after the 4-byte length prefix).
    pub fn new(body: &'a [u8]) -> Result<Self> {
        let count = body
            .get(..PART_COUNT_SIZE)
            .ok_or(FrameError::MalformedPart { offset: 0 })?;
        Ok(Self {
            body,
            count: be_uint(count) as u16,
        })
    }

    /// Number of parts the body declares.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterate over every part in order.
    pub fn parts(&self) -> Parts<'a> {
        Parts {
            body: self.body,
            offset: PART_COUNT_SIZE,
            remaining: self.count,
        }
    }

    /// The first part with `key`.
    pub fn find(&self, key: u8) -> Result<Option<Part<'a>>> {
        for part in self.parts() {
            let part = part?;
            if part.key == key {
                return Ok(Some(part));
            }
        }
        Ok(None)
    }

    /// Every part with `key`, in order.
    pub fn find_all(&self, key: u8) -> Result<Vec<Part<'a>>> {
        let mut found = Vec::new();
        for part in self.parts() {
            let part = part?;
            if part.key == key {
                found.push(part);
            }
        }
        Ok(found)
    }

    /// Integer value of the first part with `key`.
    ///
    /// A part of any integer width is accepted; a non-integer part reads as
    /// absent.
    pub fn int(&self, key: u8) -> Result<Option<i64>> {
        Ok(self.find(key)?.and_then(|part| part.as_int()))
    }

    /// String value of the first part with `key`; a non-string part reads as
    /// absent.
    pub fn string(&self, key: u8) -> Result<Option<String>> {
        match self.find(key)? {
            Some(part) => Ok(part.as_str()?.map(str::to_owned)),
            None => Ok(None),
        }
    }

    /// Collect every custom-range part in one pass.
    ///
    /// Custom parts must be binary; any other type fails the whole frame.
    pub fn custom_fields(&self) -> Result<UserInfo> {
        let mut fields = UserInfo::new();
        for part in self.parts() {
            let part = part?;
            if !is_custom(part.key) {
                continue;
            }
            if part.value_type != ValueType::BinaryData {
                return Err(FrameError::UnsupportedCustomFieldType {
                    key: part.key,
                    value_type: part.value_type.code(),
                });
            }
            fields.insert(part.key, Bytes::copy_from_slice(part.data));
        }
        Ok(fields)
    }
}

/// Iterator over the parts of a body. Stops after the first error.
#[derive(Debug, Clone)]
pub struct Parts<'a> {
    body: &'a [u8],
    offset: usize,
    remaining: u16,
}

impl<'a> Parts<'a> {
    fn parse(&self) -> Result<(Part<'a>, usize)> {
        let offset = self.offset;
        let malformed = || FrameError::MalformedPart { offset };

        let header = self
            .body
            .get(offset..offset + PART_HEADER_SIZE)
            .ok_or_else(malformed)?;
        let (key, tag) = (header[0], header[1]);
        let value_type =
            ValueType::from_code(tag).ok_or(FrameError::UnknownValueType { key, tag })?;

        let mut start = offset + PART_HEADER_SIZE;
        let len = match value_type.fixed_size() {
            Some(size) => size,
            None => {
                let prefix = self
                    .body
                    .get(start..start + VALUE_LENGTH_SIZE)
                    .ok_or_else(malformed)?;
                start += VALUE_LENGTH_SIZE;
                usize::try_from(be_uint(prefix)).map_err(|_| malformed())?
            }
        };

        let end = start.checked_add(len).ok_or_else(malformed)?;
        let data = self.body.get(start..end).ok_or_else(malformed)?;

        Ok((
            Part {
                key,
                value_type,
                offset,
                data,
            },
            end,
        ))
    }
}

impl<'a> Iterator for Parts<'a> {
    type Item = Result<Part<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.parse() {
            Ok((part, next)) => {
                self.remaining -= 1;
                self.offset = next;
                Some(Ok(part))
            }
            Err(err) => {
                self.remaining = 0;
                Some(Err(err))
            }
        }
    }
}
