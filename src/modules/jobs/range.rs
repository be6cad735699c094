//! `Range` header handling for artifact downloads.
//!
//! Only the single window forms are accepted:
//! - bytes=0-499
//! - bytes=500-
//!
//! Suffix ranges (`bytes=-500`) and multi-range lists are rejected as
//! unsatisfiable, the same as anything non-numeric.

use axum::http::HeaderValue;

use crate::common::error::AppError;

/// Inclusive byte window, always within `0..size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    Full,
    Partial(ByteRange),
}

/// Bare decimal digits only; `u64::from_str` would also take a leading `+`.
fn parse_offset(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parses a `Range` value against an artifact of `size` bytes.
pub fn parse_range_header(value: &str, size: u64) -> Option<ByteRange> {
    let window = value.trim().strip_prefix("bytes=")?;
    let (start, end) = window.split_once('-')?;

    let start = parse_offset(start.trim())?;
    if start >= size {
        return None;
    }

    let end = end.trim();
    let end = if end.is_empty() {
        size - 1
    } else {
        parse_offset(end)?.min(size - 1)
    };

    if start > end {
        return None;
    }

    Some(ByteRange { start, end })
}

/// Decides between a full and a partial transfer. A header that is present
/// but unusable rejects the request outright.
pub fn resolve_range(header: Option<&HeaderValue>, size: u64) -> Result<RangeRequest, AppError> {
    let Some(header) = header else {
        return Ok(RangeRequest::Full);
    };

    header
        .to_str()
        .ok()
        .and_then(|v| parse_range_header(v, size))
        .map(RangeRequest::Partial)
        .ok_or(AppError::RangeNotSatisfiable { size })
}
