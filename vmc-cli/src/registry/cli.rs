use clap::{Command, arg};

use crate::common::{fasta_arg, json_arg, length_arg, threads_arg};

pub const REGISTRY_CMD: &str = "registry";

pub fn create_registry_cli() -> Command {
    Command::new(REGISTRY_CMD)
        .about("Build the sequence identifier registry for a FASTA file, or restore it if one exists")
        .arg(fasta_arg())
        .arg(length_arg())
        .arg(threads_arg())
        .arg(json_arg())
        .arg(arg!(--list "Print every sequence name and identifier"))
}
