//! The annotation pass over a VCF stream.
//!
//! ```text
//! Init --run--> Streaming --end of input--> Done
//!   \               |
//!    `--------------+--any fatal error----> Failed
//! ```
//!
//! Records whose sequence is absent from the registry pass through
//! unannotated and are counted. A multi-allelic record is fatal: nothing from
//! that record onwards is written.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use vmc_core::consts::{ANNOTATED_VCF_MARKER, INFO_ALLELE_ID, INFO_LOCATION_ID, INFO_SEQUENCE_ID};
use vmc_core::{Result, VmcError};
use vmc_digest::{IdentifierComposer, SequenceRegistry};

use crate::vcf::{VcfHeader, VcfReader, VcfRecord, VcfWriter, create_gz_writer, open_vcf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Streaming,
    Done,
    Failed,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Streaming => "streaming",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters for one annotation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationStats {
    /// Data records read.
    pub records: usize,
    /// Records that received all three identifiers.
    pub annotated: usize,
    /// Records passed through because their sequence is not in the registry.
    pub missing_sequence: usize,
    /// Records passed through because ALT is `.`.
    pub skipped_no_alt: usize,
    /// Distinct sequence names that were not found.
    pub missing_names: BTreeSet<String>,
}

/// Result of [`annotate_vcf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub output_path: PathBuf,
    #[serde(flatten)]
    pub stats: AnnotationStats,
}

impl AnnotationSummary {
    pub fn missing_sequence_count(&self) -> usize {
        self.stats.missing_sequence
    }
}

/// A single pass of VCF annotation against a fixed registry.
pub struct AnnotationPipeline<'a> {
    registry: &'a SequenceRegistry,
    composer: IdentifierComposer,
    state: PipelineState,
    stats: AnnotationStats,
}

impl<'a> AnnotationPipeline<'a> {
    pub fn new(registry: &'a SequenceRegistry, composer: IdentifierComposer) -> Self {
        Self {
            registry,
            composer,
            state: PipelineState::Init,
            stats: AnnotationStats::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> &AnnotationStats {
        &self.stats
    }

    pub fn into_stats(self) -> AnnotationStats {
        self.stats
    }

    /// Stream every record of `input` to `output`. Only valid from `Init`.
    ///
    /// On failure the pipeline ends in `Failed` and whatever was already
    /// written to `output` is left as is.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<W> {
        if self.state != PipelineState::Init {
            return Err(VmcError::PipelineState(self.state.to_string()));
        }

        match self.stream(input, output) {
            Ok(output) => {
                self.state = PipelineState::Done;
                Ok(output)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn stream<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<W> {
        let mut reader = VcfReader::new(input)?;
        let mut header = reader.header().clone();
        declare_identifier_fields(&mut header);
        let mut writer = VcfWriter::new(output, &header)?;
        self.state = PipelineState::Streaming;

        while let Some(mut record) = reader.read_record()? {
            self.annotate_record(&mut record)?;
            writer.write_record(&record)?;
        }

        debug!("Wrote {} records", writer.records_written());
        writer.finish()
    }

    /// Attach identifiers to one record. Returns whether it was annotated.
    ///
    /// Only a multi-allelic record is an error; an unknown sequence or a
    /// missing ALT leaves the record untouched.
    pub fn annotate_record(&mut self, record: &mut VcfRecord) -> Result<bool> {
        self.stats.records += 1;

        let alternates = record.alternates();
        if alternates.len() > 1 {
            return Err(VmcError::MultiAllelic {
                chrom: record.chrom().to_string(),
                pos: record.pos(),
                alts: record.alt_field().to_string(),
            });
        }
        let Some(&state) = alternates.first() else {
            self.stats.skipped_no_alt += 1;
            debug!(
                "No alternate allele at {}:{}; passing through",
                record.chrom(),
                record.pos()
            );
            return Ok(false);
        };

        let Some(sequence_id) = self.registry.get(record.chrom()) else {
            self.stats.missing_sequence += 1;
            warn!(
                "Could not locate record for: {} in the sequence registry ({}:{} left unannotated)",
                record.chrom(),
                record.chrom(),
                record.pos()
            );
            self.stats.missing_names.insert(record.chrom().to_string());
            return Ok(false);
        };

        let location_id = self
            .composer
            .compose_location_id(sequence_id, record.pos(), record.end());
        let allele_id = self.composer.compose_allele_id(&location_id, state);

        record.set_info(INFO_SEQUENCE_ID, &sequence_id.to_string());
        record.set_info(INFO_LOCATION_ID, &location_id.to_string());
        record.set_info(INFO_ALLELE_ID, &allele_id.to_string());
        self.stats.annotated += 1;
        Ok(true)
    }
}

fn declare_identifier_fields(header: &mut VcfHeader) {
    header.add_info_field(INFO_SEQUENCE_ID, "1", "String", "VMC Sequence identifier");
    header.add_info_field(INFO_LOCATION_ID, "1", "String", "VMC Location identifier");
    header.add_info_field(INFO_ALLELE_ID, "1", "String", "VMC Allele identifier");
}

/// Annotate an arbitrary VCF stream, returning the output writer and counts.
pub fn annotate_stream<R: BufRead, W: Write>(
    input: R,
    output: W,
    registry: &SequenceRegistry,
    composer: IdentifierComposer,
) -> Result<(W, AnnotationStats)> {
    let mut pipeline = AnnotationPipeline::new(registry, composer);
    let output = pipeline.run(input, output)?;
    Ok((output, pipeline.into_stats()))
}

/// Annotate the VCF at `path` into a gzip file named by [`output_path_for`].
pub fn annotate_vcf<P: AsRef<Path>>(
    path: P,
    registry: &SequenceRegistry,
    composer: IdentifierComposer,
) -> Result<AnnotationSummary> {
    let path = path.as_ref();
    let output_path = output_path_for(path);
    let started = Instant::now();

    info!("Creating VMC records for VCF file: {:?}", path);
    info!("Writing VCF records to file: {:?}", output_path);

    let input = open_vcf(path)?;
    let encoder = create_gz_writer(&output_path)?;
    let (encoder, stats) = annotate_stream(input, encoder, registry, composer)?;
    let mut file = encoder.finish()?;
    file.flush()?;

    info!(
        "Annotated {} of {} records in {:.2?}",
        stats.annotated,
        stats.records,
        started.elapsed()
    );
    if stats.missing_sequence > 0 {
        warn!(
            "{} records left unannotated; sequences not in the registry: {}",
            stats.missing_sequence,
            stats
                .missing_names
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(AnnotationSummary { output_path, stats })
}

/// Output path for an annotated VCF: `.vmc` goes before the `.vcf`
/// extension and the result always ends in `.gz`.
///
/// `calls.vcf` and `calls.vcf.gz` both become `calls.vmc.vcf.gz`; a name
/// without a `.vcf` extension gets `.vmc.vcf.gz` appended.
pub fn output_path_for<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let uncompressed = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bgz"))
        .unwrap_or(&name);
    let renamed = match uncompressed.strip_suffix(".vcf") {
        Some(stem) => format!("{}.{}.vcf.gz", stem, ANNOTATED_VCF_MARKER),
        None => format!("{}.{}.vcf.gz", name, ANNOTATED_VCF_MARKER),
    };
    path.with_file_name(renamed)
}
