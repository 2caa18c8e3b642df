use std::io::{ErrorKind, Read};

use anyhow::{Context, Result, anyhow};
use bitstream::{Boundary, ExtractError, extract_nal, find_start_code};
use tracing::{debug, trace, warn};

/// A NAL unit pulled out of a stream, with its absolute byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nal {
    pub offset: usize,
    pub data: Vec<u8>,
}

/// Walks an Annex-B stream one NAL unit at a time.
///
/// Owns a growing buffer and hands it to [`extract_nal`]. A unit is only
/// emitted once the next start code has been seen (or at end of input),
/// since until then more payload may still arrive. While waiting, the
/// closing search resumes where the previous one stopped, so a long unit
/// read in small chunks is scanned once.
pub struct Splitter<R> {
    reader: R,
    chunk: Vec<u8>,
    buf: Vec<u8>,
    /// Index of the first unconsumed byte in `buf`
    head: usize,
    /// Stream offset of `buf[head]`
    base: usize,
    /// Opened unit still waiting for its closing start code
    pending: Option<Pending>,
    eof: bool,
}

/// Offsets relative to `buf[head..]`.
#[derive(Debug, Clone, Copy)]
struct Pending {
    start: usize,
    /// Window length the last closing search covered
    scanned: usize,
}

enum Step {
    Emit { start: usize, end: usize },
    Wait(Pending),
    Skip { keep: usize },
    Done,
    Fill,
}

impl<R: Read> Splitter<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(anyhow!("chunk size must be greater than zero"));
        }
        Ok(Self {
            reader,
            chunk: vec![0; chunk_size],
            buf: Vec::new(),
            head: 0,
            base: 0,
            pending: None,
            eof: false,
        })
    }

    pub fn next_nal(&mut self) -> Result<Option<Nal>> {
        loop {
            let step = match self.pending {
                Some(pending) => self.resume(pending),
                None => self.locate()?,
            };

            match step {
                Step::Emit { start, end } => {
                    self.pending = None;
                    let nal = Nal {
                        offset: self.base + start,
                        data: self.window()[start..end].to_vec(),
                    };
                    trace!("NAL at {} ({} bytes)", nal.offset, nal.data.len());
                    self.consume(end);
                    return Ok(Some(nal));
                }
                Step::Wait(pending) => {
                    self.pending = Some(pending);
                    self.fill()?;
                }
                Step::Skip { keep } => {
                    let drop = self.window().len() - keep;
                    debug!("no start code in {} bytes at {}, skipping", drop, self.base);
                    self.consume(drop);
                    self.fill()?;
                }
                Step::Done => {
                    self.consume(self.window().len());
                    return Ok(None);
                }
                Step::Fill => self.fill()?,
            }
        }
    }

    fn window(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Runs a full extraction over the unconsumed bytes.
    fn locate(&self) -> Result<Step> {
        let window = self.window();
        let step = match extract_nal(window) {
            Ok(Some(split)) if !split.rest.is_empty() || self.eof => Step::Emit {
                start: split.start,
                end: split.end,
            },
            Ok(Some(split)) => Step::Wait(Pending {
                start: split.start,
                scanned: window.len(),
            }),
            // Only the last three bytes can still grow into a start code.
            Ok(None) if window.len() > 3 && !self.eof => Step::Skip { keep: 3 },
            Ok(None) if self.eof => Step::Done,
            Ok(None) => Step::Fill,
            Err(e @ ExtractError::InvalidBounds { .. }) if self.eof => {
                warn!("stream ends on a start code: {e}");
                Step::Done
            }
            Err(ExtractError::InvalidBounds { .. }) => Step::Fill,
            Err(e) => return Err(e.into()),
        };
        Ok(step)
    }

    /// Continues the closing search of an opened unit over new input.
    ///
    /// Offsets more than three bytes short of the old window end were
    /// already ruled out, since both patterns could be tested there in full.
    fn resume(&self, pending: Pending) -> Step {
        let window = self.window();
        let from = pending.start.max(pending.scanned.saturating_sub(3));
        match find_start_code(window, from, Boundary::End) {
            Some(end) => Step::Emit {
                start: pending.start,
                end,
            },
            None if self.eof => Step::Emit {
                start: pending.start,
                end: window.len(),
            },
            None => Step::Wait(Pending {
                start: pending.start,
                scanned: window.len(),
            }),
        }
    }

    fn consume(&mut self, n: usize) {
        self.head += n;
        self.base += n;
    }

    fn fill(&mut self) -> Result<()> {
        if self.head > 0 {
            self.buf.drain(..self.head);
            self.head = 0;
        }

        let n = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("reading input"),
            }
        };

        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&self.chunk[..n]);
        }
        Ok(())
    }
}

impl<R: Read> Iterator for Splitter<R> {
    type Item = Result<Nal>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_nal().transpose()
    }
}
