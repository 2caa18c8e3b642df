//! Host calling convention around [`extract_nal`].
//!
//! A host runtime hands over a list of dynamically typed arguments and gets
//! back one of four replies. Argument checking lives here so the scanner
//! itself only ever sees a byte slice.

use std::fmt;

use log::debug;

use crate::annexb::extract_nal;
use crate::error::{ExtractError, ExtractResult};

/// A value passed in by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term<'input> {
    Binary(&'input [u8]),
    Atom(&'input str),
    Integer(i64),
}

impl Term<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Term::Binary(_) => "binary",
            Term::Atom(_) => "atom",
            Term::Integer(_) => "integer",
        }
    }
}

/// What the host receives back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<'input> {
    Ok {
        nal: &'input [u8],
        rest: &'input [u8],
    },
    /// No start code yet; the host should append input and call again
    Undefined,
    Error(String),
    BadArg,
}

/// Validates the argument list and returns the buffer to scan.
///
/// Only the first argument is inspected; trailing ones are ignored.
pub fn check_args<'input>(args: &[Term<'input>]) -> ExtractResult<&'input [u8]> {
    match args.first() {
        None => Err(ExtractError::InvalidArgument("expected 1 argument, got 0".into())),
        Some(Term::Binary(data)) => Ok(*data),
        Some(other) => Err(ExtractError::InvalidArgument(format!(
            "expected a binary, got {}",
            other.kind()
        ))),
    }
}

/// Host entry point for NAL extraction.
pub fn call_extract_nal<'input>(args: &[Term<'input>]) -> Reply<'input> {
    let data = match check_args(args) {
        Ok(data) => data,
        Err(e) => {
            debug!("extract_nal: {e}");
            return Reply::BadArg;
        }
    };

    match extract_nal(data) {
        Ok(Some(split)) => Reply::Ok {
            nal: split.nal,
            rest: split.rest,
        },
        Ok(None) => Reply::Undefined,
        Err(e) => Reply::Error(e.to_string()),
    }
}

struct BinaryTerm<'a>(&'a [u8]);

impl fmt::Display for BinaryTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{byte}")?;
        }
        write!(f, ">>")
    }
}

impl fmt::Display for Reply<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok { nal, rest } => {
                write!(f, "{{ok, {}, {}}}", BinaryTerm(nal), BinaryTerm(rest))
            }
            Reply::Undefined => write!(f, "undefined"),
            Reply::Error(message) => write!(f, "{{error, {message:?}}}"),
            Reply::BadArg => write!(f, "badarg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_badarg() {
        assert_eq!(call_extract_nal(&[]), Reply::BadArg);
        assert_eq!(
            check_args(&[]),
            Err(ExtractError::InvalidArgument("expected 1 argument, got 0".into()))
        );
    }

    #[test]
    fn test_non_binary_is_badarg() {
        assert_eq!(call_extract_nal(&[Term::Atom("nal")]), Reply::BadArg);
        assert_eq!(call_extract_nal(&[Term::Integer(1)]), Reply::BadArg);

        let err = check_args(&[Term::Integer(7)]).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: expected a binary, got integer");
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let data = [0, 0, 0, 1, 0x67, 0x42, 0, 0, 1, 0x68, 0x01];
        let reply = call_extract_nal(&[Term::Binary(&data), Term::Atom("extra")]);

        assert_eq!(
            reply,
            Reply::Ok {
                nal: &[0x67, 0x42],
                rest: &[0, 0, 1, 0x68, 0x01],
            }
        );
        assert_eq!(reply.to_string(), "{ok, <<103,66>>, <<0,0,1,104,1>>}");
    }

    #[test]
    fn test_undefined_reply() {
        let reply = call_extract_nal(&[Term::Binary(&[0, 0, 1])]);
        assert_eq!(reply, Reply::Undefined);
        assert_eq!(reply.to_string(), "undefined");
    }

    #[test]
    fn test_error_reply() {
        let reply = call_extract_nal(&[Term::Binary(&[0, 0, 0, 1])]);
        assert_eq!(reply, Reply::Error("Invalid start1/start2: 4/4 (4)".into()));
        assert_eq!(reply.to_string(), "{error, \"Invalid start1/start2: 4/4 (4)\"}");
    }

    #[test]
    fn test_empty_views_render() {
        let reply = Reply::Ok {
            nal: &[],
            rest: &[],
        };
        assert_eq!(reply.to_string(), "{ok, <<>>, <<>>}");
        assert_eq!(Reply::BadArg.to_string(), "badarg");
    }
}
