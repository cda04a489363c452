//! HTTP Range header parsing module
//!
//! Parses a `Range` header into a fully resolved, ordered list of byte
//! ranges against a known content length. Unlike a lenient parser that
//! falls back to a full response, a malformed or unsatisfiable header is an
//! error here and maps to a 416.

use std::fmt;

use thiserror::Error;

/// A resolved byte range with inclusive start and end offsets.
///
/// Ranges are always concrete after parsing: open-ended (`start-`) and
/// suffix (`-n`) forms are resolved against the content length up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset, inclusive.
    pub start: usize,
    /// Last byte offset, inclusive.
    pub end: usize,
}

impl ByteRange {
    /// Number of bytes covered by this range.
    #[inline]
    pub const fn length(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Rejected `Range` header - the request should be answered with 416.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsatisfiable range header '{header}' for content length {length}")]
pub struct InvalidRange {
    /// The offending header value.
    pub header: String,
    /// The content length the header was resolved against.
    pub length: usize,
}

/// Parse an HTTP `Range` header into one or more resolved byte ranges.
///
/// Supported forms, comma-separated after the `bytes=` unit:
/// - `start-end` - specific range, `end` clamped to the last byte
/// - `start-` - from `start` to the end of the content
/// - `-suffix` - the last `suffix` bytes
///
/// Range order is preserved: a 206 response emits the ranges (and their
/// body windows) in header order.
///
/// # Examples
/// ```
/// use assetserve::http::range::parse_range_header;
///
/// let ranges = parse_range_header("bytes=0-0,-1", 11).unwrap();
/// assert_eq!(ranges.len(), 2);
/// assert_eq!((ranges[0].start, ranges[0].end), (0, 0));
/// assert_eq!((ranges[1].start, ranges[1].end), (10, 10));
///
/// assert!(parse_range_header("bytes=test", 11).is_err());
/// ```
pub fn parse_range_header(header: &str, length: usize) -> Result<Vec<ByteRange>, InvalidRange> {
    let invalid = || InvalidRange {
        header: header.to_string(),
        length,
    };

    let Some(specs) = header.strip_prefix("bytes=") else {
        return Err(invalid());
    };
    if length == 0 {
        // No byte of an empty resource is addressable.
        return Err(invalid());
    }

    let mut ranges = Vec::new();
    for spec in specs.split(',') {
        let range = parse_range_spec(spec.trim(), length).ok_or_else(|| invalid())?;
        ranges.push(range);
    }
    Ok(ranges)
}

/// Resolve a single range spec against the content length.
fn parse_range_spec(spec: &str, length: usize) -> Option<ByteRange> {
    // Suffix range: "-500" means the last 500 bytes.
    if let Some(suffix) = spec.strip_prefix('-') {
        let count: usize = suffix.parse().ok()?;
        if count == 0 {
            return None;
        }
        return Some(ByteRange {
            start: length.saturating_sub(count),
            end: length - 1,
        });
    }

    let (start_part, end_part) = spec.split_once('-')?;
    let start: usize = start_part.trim().parse().ok()?;
    if start >= length {
        return None;
    }

    let end = if end_part.trim().is_empty() {
        length - 1
    } else {
        let end: usize = end_part.trim().parse().ok()?;
        end.min(length - 1)
    };

    if start > end {
        return None;
    }
    Some(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_open_range() {
        let ranges = parse_range_header("bytes=0-", 11).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 0, end: 10 }]);
        assert_eq!(ranges[0].length(), 11);
    }

    #[test]
    fn test_central_range() {
        let ranges = parse_range_header("bytes=4-8", 11).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 4, end: 8 }]);
        assert_eq!(ranges[0].length(), 5);
    }

    #[test]
    fn test_final_byte() {
        assert_eq!(
            parse_range_header("bytes=10-10", 11).unwrap(),
            vec![ByteRange { start: 10, end: 10 }]
        );
        assert_eq!(
            parse_range_header("bytes=-1", 11).unwrap(),
            vec![ByteRange { start: 10, end: 10 }]
        );
    }

    #[test]
    fn test_suffix_longer_than_content() {
        let ranges = parse_range_header("bytes=-999", 11).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 0, end: 10 }]);
    }

    #[test]
    fn test_end_clamped_to_length() {
        let ranges = parse_range_header("bytes=5-9999", 11).unwrap();
        assert_eq!(ranges, vec![ByteRange { start: 5, end: 10 }]);
    }

    #[test]
    fn test_multiple_ranges_preserve_order() {
        let ranges = parse_range_header("bytes=0-0,-1", 11).unwrap();
        assert_eq!(
            ranges,
            vec![
                ByteRange { start: 0, end: 0 },
                ByteRange { start: 10, end: 10 },
            ]
        );

        let ranges = parse_range_header("bytes=5-6,7-10", 11).unwrap();
        assert_eq!(
            ranges,
            vec![
                ByteRange { start: 5, end: 6 },
                ByteRange { start: 7, end: 10 },
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(parse_range_header("bytes=test", 11).is_err());
        assert!(parse_range_header("bytes=", 11).is_err());
        assert!(parse_range_header("bytes=1-infinity", 11).is_err());
        assert!(parse_range_header("test", 11).is_err());
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        // Start past the end of the resource.
        assert!(parse_range_header("bytes=200-", 100).is_err());
        // Reversed range.
        assert!(parse_range_header("bytes=9-4", 100).is_err());
        // Empty suffix.
        assert!(parse_range_header("bytes=-0", 100).is_err());
    }

    #[test]
    fn test_rejects_any_range_on_empty_content() {
        assert!(parse_range_header("bytes=0-", 0).is_err());
        assert!(parse_range_header("bytes=-1", 0).is_err());
    }

    #[test]
    fn test_one_bad_spec_poisons_the_header() {
        assert!(parse_range_header("bytes=0-1,oops", 11).is_err());
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ByteRange { start: 4, end: 8 }.to_string(), "4-8");
    }
}
