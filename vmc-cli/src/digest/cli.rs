use std::path::PathBuf;

use clap::{Arg, Command, value_parser};

use crate::common::length_arg;

pub const DIGEST_CMD: &str = "digest";
pub const TEXT_ARG: &str = "text";
pub const FILE_ARG: &str = "file";

pub fn create_digest_cli() -> Command {
    Command::new(DIGEST_CMD)
        .about("Print the truncated, base64url encoded SHA-512 digest of some bytes")
        .arg(
            Arg::new(TEXT_ARG)
                .required_unless_present(FILE_ARG)
                .conflicts_with(FILE_ARG)
                .help("Text to digest, taken as its UTF-8 bytes"),
        )
        .arg(
            Arg::new(FILE_ARG)
                .long("file")
                .value_parser(value_parser!(PathBuf))
                .help("Digest the raw bytes of a file instead"),
        )
        .arg(length_arg())
}
