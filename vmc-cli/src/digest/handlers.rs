use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use vmc_digest::digest;

use super::cli::{FILE_ARG, TEXT_ARG};
use crate::common::digest_length;

pub fn run_digest(matches: &ArgMatches) -> Result<()> {
    let length = digest_length(matches)?;

    let bytes = match matches.get_one::<PathBuf>(FILE_ARG) {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?
        }
        None => matches
            .get_one::<String>(TEXT_ARG)
            .context("Text or --file is required.")?
            .clone()
            .into_bytes(),
    };

    println!("{}", digest(&bytes, length));
    Ok(())
}
