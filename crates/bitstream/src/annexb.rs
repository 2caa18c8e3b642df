//! Annex-B start-code scanning.
//!
//! NAL units in an Annex-B byte stream are delimited by start codes:
//! - 3 byte: `00 00 01`
//! - 4 byte: `00 00 00 01`
//!
//! [`extract_nal`] pulls the first complete-or-trailing NAL unit out of a
//! buffer and hands back the unconsumed remainder, which starts at the next
//! start code. Callers accumulating a stream re-feed that remainder.

use log::{debug, trace};

use crate::error::{ExtractError, ExtractResult};

/// Which start code pattern was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCode {
    /// `00 00 01`
    Short,
    /// `00 00 00 01`
    Long,
}

impl StartCode {
    const SHORT: [u8; 3] = [0, 0, 1];
    const LONG: [u8; 4] = [0, 0, 0, 1];

    pub fn len(self) -> usize {
        self.as_bytes().len()
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            StartCode::Short => &Self::SHORT,
            StartCode::Long => &Self::LONG,
        }
    }
}

/// How a match is reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// First byte after the start code (where a NAL begins)
    Start,
    /// First byte of the start code (where the previous NAL ends)
    End,
}

/// A located start code. `offset` is always the code's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCodeMatch {
    pub offset: usize,
    pub code: StartCode,
}

impl StartCodeMatch {
    pub fn boundary(&self, boundary: Boundary) -> usize {
        match boundary {
            Boundary::Start => self.offset + self.code.len(),
            Boundary::End => self.offset,
        }
    }
}

/// One extracted NAL unit and what is left of the buffer after it.
///
/// Both views borrow the scanned buffer: `nal` is `buffer[start..end]` and
/// `rest` is `buffer[end..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalSplit<'input> {
    pub nal: &'input [u8],
    pub rest: &'input [u8],
    pub start: usize,
    pub end: usize,
    /// Start code that opened `nal`
    pub code: StartCode,
}

impl NalSplit<'_> {
    /// Offset of the opening start code's first byte
    pub fn code_offset(&self) -> usize {
        self.start - self.code.len()
    }
}

/// Finds the first start code at or after `from`.
///
/// The long form is tested first at every offset so that `00 00 00 01` is
/// never read as a short code one byte later. The search advances one byte
/// at a time and only ever needs three bytes left to try the short form.
pub fn scan(data: &[u8], from: usize) -> Option<StartCodeMatch> {
    let mut i = from;
    while i < data.len().saturating_sub(2) {
        let code = if data.get(i..i + 4) == Some(&StartCode::LONG[..]) {
            StartCode::Long
        } else if data[i..i + 3] == StartCode::SHORT {
            StartCode::Short
        } else {
            i += 1;
            continue;
        };

        trace!("start code {:?} at offset {}", code, i);
        return Some(StartCodeMatch { offset: i, code });
    }
    None
}

/// [`scan`] reported through the given boundary mode.
pub fn find_start_code(data: &[u8], from: usize, boundary: Boundary) -> Option<usize> {
    scan(data, from).map(|m| m.boundary(boundary))
}

/// Extracts the first NAL unit from an Annex-B buffer.
///
/// Returns `Ok(None)` when the buffer holds fewer than four bytes or no
/// start code at all; the caller should gather more input and retry. The
/// NAL runs up to the next start code, or to the end of the buffer when
/// there is none.
///
/// The four-byte minimum only gates the opening search. The closing search
/// starts right after the opening code with the plain scan bound, so a
/// three-byte tail such as `00 00 01` still terminates the NAL.
pub fn extract_nal(data: &[u8]) -> ExtractResult<Option<NalSplit<'_>>> {
    if data.len() < 4 {
        return Ok(None);
    }

    let Some(opening) = scan(data, 0) else {
        return Ok(None);
    };
    let start = opening.boundary(Boundary::Start);
    let end = find_start_code(data, start, Boundary::End).unwrap_or(data.len());

    split_at_bounds(data, start, end, opening.code).map(Some)
}

/// Cuts `data` into `data[start..end]` and `data[end..]`.
///
/// Fails with [`ExtractError::InvalidBounds`] unless `start` indexes a byte
/// of `data` with room for `code` before it, and `start <= end <= data.len()`.
pub fn split_at_bounds(
    data: &[u8],
    start: usize,
    end: usize,
    code: StartCode,
) -> ExtractResult<NalSplit<'_>> {
    let invalid = || ExtractError::InvalidBounds {
        start,
        end,
        len: data.len(),
    };

    if start < code.len() || start >= data.len() || end < start || end > data.len() {
        debug!(
            "rejecting NAL bounds {}..{} for {} byte buffer",
            start,
            end,
            data.len()
        );
        return Err(invalid());
    }

    let nal = data.get(start..end).ok_or_else(invalid)?;
    let rest = data.get(end..).ok_or_else(invalid)?;
    trace!("extracted {} byte NAL, {} bytes remain", nal.len(), rest.len());

    Ok(NalSplit {
        nal,
        rest,
        start,
        end,
        code,
    })
}
