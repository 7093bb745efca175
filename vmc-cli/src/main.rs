mod annotate;
mod common;
mod digest;
mod expression;
mod registry;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "vmc";
    pub const BIN_NAME: &str = "vmc";
    /// warn
    pub const DEFAULT_VERBOSITY: usize = 1;
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Content-derived VMC identifiers for sequences, locations and alleles.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("More log output (repeat for more)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Silence all log output"),
        )
        .subcommand(registry::cli::create_registry_cli())
        .subcommand(annotate::cli::create_annotate_cli())
        .subcommand(expression::cli::create_expression_cli())
        .subcommand(digest::cli::create_digest_cli())
}

/// Initializes the logger from the global `-v`/`-q` flags.
fn init_log(matches: &ArgMatches) -> Result<()> {
    let verbosity = consts::DEFAULT_VERBOSITY + matches.get_count("verbose") as usize;
    stderrlog::new()
        .module(module_path!())
        .module("vmc_digest")
        .module("vmc_annotate")
        .quiet(matches.get_flag("quiet"))
        .verbosity(verbosity)
        .timestamp(stderrlog::Timestamp::Off)
        .init()?;
    Ok(())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_log(&matches)?;

    match matches.subcommand() {
        //
        // REGISTRY
        //
        Some((registry::cli::REGISTRY_CMD, matches)) => {
            registry::handlers::run_registry(matches)?;
        }

        //
        // ANNOTATE
        //
        Some((annotate::cli::ANNOTATE_CMD, matches)) => {
            annotate::handlers::run_annotate(matches)?;
        }

        //
        // EXPRESSION
        //
        Some((expression::cli::EXPRESSION_CMD, matches)) => {
            expression::handlers::run_expression(matches)?;
        }

        //
        // RAW DIGEST
        //
        Some((digest::cli::DIGEST_CMD, matches)) => {
            digest::handlers::run_digest(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_global_verbosity_after_subcommand() {
        let matches = build_parser()
            .try_get_matches_from(["vmc", "digest", "ACGT", "-vv"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        assert!(!matches.get_flag("quiet"));
    }

    #[rstest]
    fn test_subcommand_required() {
        assert!(build_parser().try_get_matches_from(["vmc"]).is_err());
    }
}
