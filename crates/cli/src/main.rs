//! nalx - pull NAL units out of Annex-B byte streams.

mod logging;
mod splitter;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use bitstream::host::{Term, call_extract_nal};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use splitter::Splitter;

/// Bytes of each NAL shown in listings
const HEAD_LEN: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "nalx", version, about = "Annex-B NAL unit extractor")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every NAL unit in a file, reading it incrementally
    Split {
        file: PathBuf,

        /// Bytes read from the file per refill
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,
    },
    /// Run a single extraction on hex arguments and print the host reply
    Extract {
        /// Hex-encoded buffers; the first one is scanned
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Split { file, chunk_size } => split(&file, chunk_size),
        Command::Extract { args } => {
            extract(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{e:#}");
        process::exit(1);
    }
}

fn split(path: &Path, chunk_size: usize) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let splitter = Splitter::new(file, chunk_size)?;

    let mut count = 0usize;
    let mut empty = 0usize;
    for nal in splitter {
        let nal = nal.with_context(|| format!("splitting {}", path.display()))?;
        if nal.data.is_empty() {
            empty += 1;
            continue;
        }
        let head = &nal.data[..nal.data.len().min(HEAD_LEN)];
        println!(
            "#{count} offset={} len={} head={}",
            nal.offset,
            nal.data.len(),
            hex::encode(head)
        );
        count += 1;
    }

    println!("{count} NAL units ({empty} empty)");
    info!("split {} into {} NAL units", path.display(), count);
    Ok(())
}

fn extract(args: &[String]) {
    let decoded = decode_args(args);
    println!("{}", call_extract_nal(&host_terms(&decoded)));
}

/// Hex-decodes each argument, keeping the text of those that are not hex.
fn decode_args(args: &[String]) -> Vec<Result<Vec<u8>, &str>> {
    args.iter()
        .map(|arg| hex::decode(arg).map_err(|_| arg.as_str()))
        .collect()
}

// Anything that is not valid hex reaches the host call as an atom.
fn host_terms<'a>(decoded: &'a [Result<Vec<u8>, &'a str>]) -> Vec<Term<'a>> {
    decoded
        .iter()
        .map(|d| match d {
            Ok(bytes) => Term::Binary(bytes),
            Err(atom) => Term::Atom(atom),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::host::Reply;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_hex_argument_is_binary() {
        let args = args(&["000000016742000001680100"]);
        let decoded = decode_args(&args);
        let terms = host_terms(&decoded);

        assert_eq!(
            terms,
            vec![Term::Binary(&[0, 0, 0, 1, 0x67, 0x42, 0, 0, 1, 0x68, 0x01, 0x00])]
        );
        assert_eq!(
            call_extract_nal(&terms),
            Reply::Ok {
                nal: &[0x67, 0x42],
                rest: &[0, 0, 1, 0x68, 0x01, 0x00],
            }
        );
    }

    // Odd-length and non-hex text both become atoms and are refused.
    #[test]
    fn test_invalid_hex_is_badarg() {
        for value in ["0000016", "not-hex", "zz00"] {
            let args = args(&[value]);
            let decoded = decode_args(&args);
            let terms = host_terms(&decoded);

            assert_eq!(terms, vec![Term::Atom(value)]);
            assert_eq!(call_extract_nal(&terms), Reply::BadArg);
        }
    }

    #[test]
    fn test_no_arguments_is_badarg() {
        let decoded = decode_args(&[]);
        let terms = host_terms(&decoded);

        assert!(terms.is_empty());
        assert_eq!(call_extract_nal(&terms), Reply::BadArg);
    }

    // Only the first argument is scanned.
    #[test]
    fn test_trailing_text_ignored() {
        let args = args(&["00000001", "zz"]);
        let decoded = decode_args(&args);
        let terms = host_terms(&decoded);

        assert_eq!(terms, vec![Term::Binary(&[0, 0, 0, 1]), Term::Atom("zz")]);
        assert_eq!(
            call_extract_nal(&terms),
            Reply::Error("Invalid start1/start2: 4/4 (4)".into())
        );
    }
}
