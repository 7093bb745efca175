//! # VMC identifier derivation
//!
//! This crate turns sequences, intervals and alleles into deterministic,
//! content-derived identifiers:
//!
//! - `digest` - the SHA-512 truncation primitive and the canonical forms fed to it
//! - `identifier` - typed `VMC:<tag>_<token>` identifiers
//! - `composer` - builds sequence, location and allele identifiers
//! - `fasta` - FASTA record source (plain or gzip)
//! - `stream` - constant-memory streaming sequence digester
//! - `registry` - name -> sequence identifier map, its flat file, and build/restore
//!
//! Identifiers compose hierarchically: a location digest embeds its sequence
//! identifier, and an allele digest embeds its location identifier.
//!
//! ```
//! use vmc_digest::{DigestLength, IdentifierComposer, SequenceHandle};
//!
//! let mut composer = IdentifierComposer::new(DigestLength::default());
//! let chr1 = SequenceHandle::new("chr1 test", b"ACGTACGT".to_vec());
//! let seq_id = composer.compose_sequence_id(&chr1);
//! let loc_id = composer.compose_location_id(&seq_id, 5, 5);
//! let allele_id = composer.compose_allele_id(&loc_id, "T");
//! assert!(allele_id.to_string().starts_with("VMC:GA_"));
//! ```

pub mod composer;
pub mod digest;
pub mod fasta;
pub mod identifier;
pub mod models;
pub mod registry;
pub mod stream;

pub use composer::IdentifierComposer;
pub use digest::{CanonicalForm, DigestLength, StreamingDigest, digest, sha512t24u};
pub use fasta::{FastaReader, open_fasta};
pub use identifier::{
    AlleleId, Identifier, IdentifierKind, LocationId, SequenceId, TaggedIdentifier,
};
pub use models::{AlleleRef, Interval, LocationRef, SequenceHandle};
pub use registry::{
    LoadedRegistry, RegistryEntry, RegistryMode, RegistryOptions, RegistryWriter,
    SequenceRegistry, build_registry, load_or_build_registry, read_registry_file, registry_path_for,
};
pub use stream::FastaStreamDigester;
