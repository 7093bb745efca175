use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use vmc_annotate::annotate_vcf;
use vmc_digest::IdentifierComposer;

use super::cli::VCF_ARG;
use crate::common::{JSON_ARG, digest_length, load_registry};

pub fn run_annotate(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<PathBuf>(VCF_ARG)
        .context("A path to a VCF file is required.")?;
    let composer = IdentifierComposer::new(digest_length(matches)?);

    let loaded = load_registry(matches)?;
    let summary = annotate_vcf(vcf, &loaded.registry, composer)
        .with_context(|| format!("Failed to annotate {:?}", vcf))?;

    if matches.get_flag(JSON_ARG) {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.output_path.display());
        if summary.missing_sequence_count() > 0 {
            log::warn!(
                "{} of {} records were not annotated (sequence not in {:?})",
                summary.missing_sequence_count(),
                summary.stats.records,
                loaded.path
            );
        }
    }

    Ok(())
}
