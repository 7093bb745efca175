use clap::{Arg, Command};

use crate::common::{fasta_arg, json_arg, length_arg};

pub const EXPRESSION_CMD: &str = "expression";
pub const EXPRESSION_ARG: &str = "expression";

pub fn create_expression_cli() -> Command {
    Command::new(EXPRESSION_CMD)
        .about("Digest a genomic point substitution such as chr1:g.100T into an allele identifier")
        .arg(fasta_arg())
        .arg(
            Arg::new(EXPRESSION_ARG)
                .long("expression")
                .short('e')
                .required(true)
                .help("Expression of the form <sequence>:g.<position><base>"),
        )
        .arg(length_arg())
        .arg(json_arg())
}
