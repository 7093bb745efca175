use anyhow::{Context, Result};
use clap::ArgMatches;

use vmc_annotate::digest_expression;
use vmc_digest::IdentifierComposer;

use super::cli::EXPRESSION_ARG;
use crate::common::{JSON_ARG, digest_length, load_registry};

pub fn run_expression(matches: &ArgMatches) -> Result<()> {
    let expression = matches
        .get_one::<String>(EXPRESSION_ARG)
        .context("An expression is required.")?;
    let mut composer = IdentifierComposer::new(digest_length(matches)?);

    let loaded = load_registry(matches)?;
    let digest = digest_expression(expression, &loaded.registry, &mut composer)?;

    if matches.get_flag(JSON_ARG) {
        println!("{}", serde_json::to_string_pretty(&digest)?);
    } else {
        println!("{}", digest.allele_id);
    }

    Ok(())
}
