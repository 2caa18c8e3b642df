//! Annex-B start-code scanning and single NAL unit extraction.

pub mod annexb;
pub mod error;
pub mod host;

pub use annexb::{
    Boundary, NalSplit, StartCode, StartCodeMatch, extract_nal, find_start_code, scan,
    split_at_bounds,
};
pub use error::{ExtractError, ExtractResult};
