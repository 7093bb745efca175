//! # VMC annotation of variant records
//!
//! Streams a VCF through an [`AnnotationPipeline`], attaching the VMC
//! sequence, location and allele identifiers of each record as INFO fields,
//! and digests single genomic expressions such as `chr1:g.100T`.
//!
//! The sequence registry must be built or restored (see
//! [`vmc_digest::load_or_build_registry`]) before annotation starts; it is
//! only read here.
//!
//! ```no_run
//! use vmc_annotate::annotate_vcf;
//! use vmc_digest::{IdentifierComposer, RegistryOptions, load_or_build_registry};
//!
//! let loaded = load_or_build_registry("hg38.fa", &RegistryOptions::default())?;
//! let summary = annotate_vcf("calls.vcf.gz", &loaded.registry, IdentifierComposer::default())?;
//! println!("{:?}: {} records", summary.output_path, summary.stats.records);
//! # Ok::<(), vmc_core::VmcError>(())
//! ```

pub mod expression;
pub mod pipeline;
pub mod vcf;

pub use expression::{ExpressionDigest, GenomicExpression, digest_expression};
pub use pipeline::{
    AnnotationPipeline, AnnotationStats, AnnotationSummary, PipelineState, annotate_stream,
    annotate_vcf, output_path_for,
};
pub use vcf::{VcfHeader, VcfReader, VcfRecord, VcfWriter, create_gz_writer, open_vcf};
