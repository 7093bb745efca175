//! Sequence identifier registry.
//!
//! Maps a sequence's external name (e.g. `chr1`) to its sequence identifier,
//! so location and allele identifiers can be composed without re-hashing
//! sequence content.
//!
//! A registry is populated in exactly one of two ways per run:
//!
//! - **build**: digest every record of a FASTA file and persist
//!   `name|identifier|description` lines to `<fasta>.vmc`
//! - **restore**: read a previously persisted `<fasta>.vmc`
//!
//! [`load_or_build_registry`] picks the mode by checking for the persisted
//! file. The registry is not mutated once annotation starts.

mod build;
mod file;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use log::{info, warn};

use vmc_core::consts::REGISTRY_EXTENSION;
use vmc_core::utils::PathExtension;
use vmc_core::{Result, VmcError};

use crate::digest::DigestLength;
use crate::identifier::SequenceId;

pub use build::build_registry;
pub use file::{RegistryEntry, RegistryWriter, read_registry, read_registry_file};

/// In-memory `name -> sequence identifier` map. Last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceRegistry {
    entries: FxHashMap<String, SequenceId>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`, returning the identifier it replaced.
    pub fn insert(&mut self, name: String, sequence_id: SequenceId) -> Option<SequenceId> {
        self.entries.insert(name, sequence_id)
    }

    pub fn get(&self, name: &str) -> Option<&SequenceId> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SequenceId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    /// Names sorted, for stable listings.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Insert an entry, logging when it shadows an earlier one.
    pub(crate) fn insert_entry(&mut self, entry: &RegistryEntry) {
        if let Some(previous) = self.insert(entry.name.clone(), entry.sequence_id.clone()) {
            if previous != entry.sequence_id {
                warn!(
                    "Sequence name {} appears more than once; {} replaces {}",
                    entry.name, entry.sequence_id, previous
                );
            }
        }
    }
}

impl FromIterator<(String, SequenceId)> for SequenceRegistry {
    fn from_iter<I: IntoIterator<Item = (String, SequenceId)>>(iter: I) -> Self {
        let mut registry = SequenceRegistry::new();
        for (name, id) in iter {
            registry.insert(name, id);
        }
        registry
    }
}

/// How a registry was populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryMode {
    Built,
    Restored,
}

impl Display for RegistryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryMode::Built => f.write_str("built"),
            RegistryMode::Restored => f.write_str("restored"),
        }
    }
}

/// Settings for building a registry from FASTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    pub digest_length: DigestLength,
    /// Digest workers. `1` selects the constant-memory streaming path.
    pub threads: usize,
    /// Upper bound on records per work chunk (parallel path).
    pub chunk_records: usize,
    /// Upper bound on sequence bytes per work chunk (parallel path).
    pub chunk_bytes: usize,
}

impl RegistryOptions {
    pub fn new(digest_length: DigestLength) -> Self {
        Self {
            digest_length,
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(VmcError::InvalidThreadCount(self.threads));
        }
        Ok(())
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            digest_length: DigestLength::default(),
            threads: 1,
            chunk_records: 5000,
            chunk_bytes: 64 * 1024 * 1024,
        }
    }
}

/// A registry together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: SequenceRegistry,
    pub mode: RegistryMode,
    pub path: PathBuf,
}

/// Path of the persisted registry for a FASTA file: `<fasta>.vmc`.
pub fn registry_path_for<P: AsRef<Path>>(fasta: P) -> PathBuf {
    fasta.as_ref().append_ext(REGISTRY_EXTENSION)
}

/// Restore the registry persisted next to `fasta`, or build and persist it.
pub fn load_or_build_registry<P: AsRef<Path>>(
    fasta: P,
    options: &RegistryOptions,
) -> Result<LoadedRegistry> {
    options.validate()?;

    let fasta = fasta.as_ref();
    let path = registry_path_for(fasta);

    if path.exists() {
        info!("Found sequence registry {:?}; restoring", path);
        let registry = read_registry_file(&path)?;
        info!("Restored {} sequence identifiers", registry.len());
        return Ok(LoadedRegistry {
            registry,
            mode: RegistryMode::Restored,
            path,
        });
    }

    info!("Creating sequence identifiers for each record in {:?}", fasta);
    info!("Sequence registry file named: {:?}", path);
    let registry = build_registry(fasta, &path, options)?;
    Ok(LoadedRegistry {
        registry,
        mode: RegistryMode::Built,
        path,
    })
}
