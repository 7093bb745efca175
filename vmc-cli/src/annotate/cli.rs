use std::path::PathBuf;

use clap::{Arg, Command, value_parser};

use crate::common::{fasta_arg, json_arg, length_arg, threads_arg};

pub const ANNOTATE_CMD: &str = "annotate";
pub const VCF_ARG: &str = "vcf";

pub fn create_annotate_cli() -> Command {
    Command::new(ANNOTATE_CMD)
        .about("Add VMC sequence, location and allele identifiers to the INFO column of a VCF")
        .arg(fasta_arg())
        .arg(
            Arg::new(VCF_ARG)
                .long("vcf")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("VCF to annotate (plain or gzipped); writes <name>.vmc.vcf.gz next to it"),
        )
        .arg(length_arg())
        .arg(threads_arg())
        .arg(json_arg())
}
