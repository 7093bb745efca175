//! Constants that define the externally visible identifier format.
//!
//! Changing any of these breaks agreement with identifiers produced elsewhere.

/// Namespace prefix of every identifier, as in `VMC:GS_...`.
pub const VMC_NAMESPACE: &str = "VMC";

/// Kind tag for sequence identifiers.
pub const SEQUENCE_TAG: &str = "GS";
/// Kind tag for location identifiers.
pub const LOCATION_TAG: &str = "GL";
/// Kind tag for allele identifiers.
pub const ALLELE_TAG: &str = "GA";

/// Number of raw SHA-512 bytes kept by default (192 bits).
pub const DEFAULT_DIGEST_LENGTH: usize = 24;
/// Full SHA-512 output length in bytes.
pub const MAX_DIGEST_LENGTH: usize = 64;

/// Extension appended to a FASTA path to name its persisted registry.
pub const REGISTRY_EXTENSION: &str = "vmc";
/// Field delimiter of the persisted registry file.
pub const REGISTRY_DELIMITER: char = '|';

/// VCF INFO key carrying the sequence identifier.
pub const INFO_SEQUENCE_ID: &str = "VMCGSID";
/// VCF INFO key carrying the location identifier.
pub const INFO_LOCATION_ID: &str = "VMCGLID";
/// VCF INFO key carrying the allele identifier.
pub const INFO_ALLELE_ID: &str = "VMCGAID";

/// Marker inserted into annotated VCF file names.
pub const ANNOTATED_VCF_MARKER: &str = "vmc";
