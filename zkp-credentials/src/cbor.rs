//! Byte ranges of items inside an encoded CBOR document.
//!
//! Used to rewrite a single item in place, so that the encoding of everything around it
//! (including non-preferred length headers) is kept exactly as the issuer wrote it.

use crate::Error;
use ciborium::value::Value;
use std::ops::Range;

const BREAK: u8 = 0xff;
const MAJOR_TAG: u8 = 6;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

/// An item's initial byte and argument. `argument` is `None` for indefinite-length items.
struct Header {
    major: u8,
    argument: Option<u64>,
    len: usize,
}

fn truncated() -> Error {
    Error::InvalidCbor("truncated item".to_string())
}

fn header(bytes: &[u8], at: usize) -> Result<Header, Error> {
    let initial = *bytes.get(at).ok_or_else(truncated)?;
    let major = initial >> 5;
    let info = initial & 0x1f;
    let (argument, len) = match info {
        0..=23 => (Some(u64::from(info)), 1),
        24..=27 => {
            let width = 1usize << (info - 24);
            let raw = bytes.get(at + 1..at + 1 + width).ok_or_else(truncated)?;
            let argument = raw
                .iter()
                .fold(0u64, |acc, byte| acc << 8 | u64::from(*byte));
            (Some(argument), 1 + width)
        }
        31 if (2..=5).contains(&major) => (None, 1),
        _ => {
            return Err(Error::InvalidCbor(format!(
                "invalid initial byte {:#04x}",
                initial
            )))
        }
    };
    Ok(Header {
        major,
        argument,
        len,
    })
}

/// The offset just past the item starting at `at`.
fn skip(bytes: &[u8], at: usize) -> Result<usize, Error> {
    let header = header(bytes, at)?;
    let body = at + header.len;
    match (header.major, header.argument) {
        (0 | 1 | 7, _) => Ok(body),
        (2 | 3, Some(len)) => usize::try_from(len)
            .ok()
            .and_then(|len| body.checked_add(len))
            .filter(|end| *end <= bytes.len())
            .ok_or_else(truncated),
        (2..=5, None) => {
            let mut at = body;
            while *bytes.get(at).ok_or_else(truncated)? != BREAK {
                at = skip(bytes, at)?;
            }
            Ok(at + 1)
        }
        (MAJOR_ARRAY, Some(count)) => (0..count).try_fold(body, |at, _| skip(bytes, at)),
        (MAJOR_MAP, Some(count)) => (0..count)
            .try_fold(body, |at, _| skip(bytes, at).and_then(|at| skip(bytes, at))),
        (MAJOR_TAG, _) => skip(bytes, body),
        _ => Err(truncated()),
    }
}

/// The ranges of the children of the array or map starting at `at`, keys and values
/// interleaved for a map.
fn children(bytes: &[u8], at: usize) -> Result<Vec<Range<usize>>, Error> {
    let header = header(bytes, at)?;
    let count = match (header.major, header.argument) {
        (MAJOR_ARRAY, count) => count,
        (MAJOR_MAP, count) => count.and_then(|count| count.checked_mul(2)),
        _ => return Err(Error::MalformedDocument("expected an array or a map")),
    };

    let mut items = Vec::new();
    let mut start = at + header.len;
    loop {
        let done = match count {
            Some(count) => items.len() as u64 == count,
            None => *bytes.get(start).ok_or_else(truncated)? == BREAK,
        };
        if done {
            return Ok(items);
        }
        let end = skip(bytes, start)?;
        items.push(start..end);
        start = end;
    }
}

/// The range of the first value stored under the text key `key` in the map starting at `at`.
pub(crate) fn field(bytes: &[u8], at: usize, key: &'static str) -> Result<Range<usize>, Error> {
    if header(bytes, at)?.major != MAJOR_MAP {
        return Err(Error::MalformedDocument("expected a map"));
    }
    for entry in children(bytes, at)?.chunks_exact(2) {
        let mut reader = &bytes[entry[0].clone()];
        let candidate: Value =
            ciborium::from_reader(&mut reader).map_err(|e| Error::InvalidCbor(e.to_string()))?;
        if matches!(candidate, Value::Text(ref text) if text == key) {
            return Ok(entry[1].clone());
        }
    }
    Err(Error::MalformedDocument(key))
}

/// The range of the first element of the array starting at `at`.
pub(crate) fn first(bytes: &[u8], at: usize) -> Result<Range<usize>, Error> {
    if header(bytes, at)?.major != MAJOR_ARRAY {
        return Err(Error::MalformedDocument("documents is not an array"));
    }
    children(bytes, at)?
        .into_iter()
        .next()
        .ok_or(Error::MalformedDocument("DeviceResponse has no documents"))
}

/// The range of the `index`th element of the array starting at `at`, looking through one tag.
pub(crate) fn element(bytes: &[u8], at: usize, index: usize) -> Result<Range<usize>, Error> {
    let header = header(bytes, at)?;
    let at = if header.major == MAJOR_TAG {
        at + header.len
    } else {
        at
    };
    children(bytes, at)?
        .into_iter()
        .nth(index)
        .ok_or(Error::MalformedDocument("array is too short"))
}

/// `bytes` with `range` replaced by `item`.
pub(crate) fn splice(bytes: &[u8], range: Range<usize>, item: &[u8]) -> Vec<u8> {
    [&bytes[..range.start], item, &bytes[range.end..]].concat()
}
