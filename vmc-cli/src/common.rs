//! Arguments shared by several subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, value_parser};

use vmc_digest::{DigestLength, LoadedRegistry, RegistryOptions, load_or_build_registry};

pub const FASTA_ARG: &str = "fasta";
pub const LENGTH_ARG: &str = "length";
pub const THREADS_ARG: &str = "threads";
pub const JSON_ARG: &str = "json";

const DEFAULT_LENGTH: &str = "24";

pub fn fasta_arg() -> Arg {
    Arg::new(FASTA_ARG)
        .long("fasta")
        .short('f')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Reference FASTA; its registry is restored from <FASTA>.vmc or built there")
}

pub fn length_arg() -> Arg {
    Arg::new(LENGTH_ARG)
        .long("length")
        .short('l')
        .value_parser(value_parser!(usize))
        .default_value(DEFAULT_LENGTH)
        .help("Bytes of the SHA-512 digest kept in each identifier (1-64)")
}

pub fn threads_arg() -> Arg {
    Arg::new(THREADS_ARG)
        .long("threads")
        .short('t')
        .value_parser(value_parser!(usize))
        .default_value("1")
        .help("Digest workers when building a registry; 1 streams in constant memory")
}

pub fn json_arg() -> Arg {
    Arg::new(JSON_ARG)
        .long("json")
        .action(clap::ArgAction::SetTrue)
        .help("Print the result as JSON")
}

/// Validated `--length`. Fails before any file is touched.
pub fn digest_length(matches: &ArgMatches) -> Result<DigestLength> {
    let length = *matches
        .get_one::<usize>(LENGTH_ARG)
        .context("--length has a default")?;
    Ok(DigestLength::new(length)?)
}

/// Registry settings from `--length` and, when the subcommand has it, `--threads`.
pub fn registry_options(matches: &ArgMatches) -> Result<RegistryOptions> {
    let mut options = RegistryOptions::new(digest_length(matches)?);
    if let Ok(Some(threads)) = matches.try_get_one::<usize>(THREADS_ARG) {
        options = options.with_threads(*threads);
    }
    options.validate()?;
    Ok(options)
}

/// Restore or build the registry for `--fasta`.
pub fn load_registry(matches: &ArgMatches) -> Result<LoadedRegistry> {
    let fasta = matches
        .get_one::<PathBuf>(FASTA_ARG)
        .context("A path to a FASTA file is required.")?;
    let options = registry_options(matches)?;
    load_or_build_registry(fasta, &options)
        .with_context(|| format!("Failed to load sequence registry for {:?}", fasta))
}
