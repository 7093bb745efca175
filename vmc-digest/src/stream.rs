//! Streaming FASTA digester - constant memory usage.
//!
//! Processes FASTA text chunk by chunk and digests each record's sequence as
//! it arrives. Sequence bytes go straight into the hasher and are never
//! buffered, so a single-line chromosome costs no more memory than a short
//! contig. Only header lines are held, one at a time.

use log::debug;

use vmc_core::{Result, VmcError};

use crate::composer::IdentifierComposer;
use crate::digest::{DigestLength, StreamingDigest};
use crate::models::sequence_name;
use crate::registry::RegistryEntry;

#[derive(Clone, Copy, Debug, PartialEq)]
enum LineKind {
    Header,
    Sequence,
}

/// Record currently being digested.
struct OpenRecord {
    description: String,
    digest: StreamingDigest,
}

/// A streaming FASTA digester that processes data chunk-by-chunk.
///
/// # Example
/// ```
/// use vmc_digest::{DigestLength, FastaStreamDigester};
///
/// let mut digester = FastaStreamDigester::new(DigestLength::default());
/// digester.update(b">chr1\nACGT").expect("update");
/// digester.update(b"TGCA\n>chr2\nGGGG\n").expect("update");
///
/// // chr1 is complete once the chr2 header has been seen
/// assert_eq!(digester.drain_completed().len(), 1);
///
/// let rest = digester.finish().expect("finish");
/// assert_eq!(rest[0].name, "chr2");
/// ```
pub struct FastaStreamDigester {
    composer: IdentifierComposer,
    line_kind: Option<LineKind>,
    header_buffer: Vec<u8>,
    current: Option<OpenRecord>,
    completed: Vec<RegistryEntry>,
    finalized: usize,
    line_number: usize,
}

impl FastaStreamDigester {
    pub fn new(length: DigestLength) -> Self {
        Self {
            composer: IdentifierComposer::new(length),
            line_kind: None,
            header_buffer: Vec::with_capacity(256),
            current: None,
            completed: Vec::new(),
            finalized: 0,
            line_number: 1,
        }
    }

    /// Process the next chunk of FASTA text. Chunks may split lines anywhere.
    pub fn update(&mut self, chunk: &[u8]) -> Result<()> {
        let mut rest = chunk;
        loop {
            match rest.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.consume_segment(&rest[..pos])?;
                    self.end_line()?;
                    rest = &rest[pos + 1..];
                }
                None => return self.consume_segment(rest),
            }
        }
    }

    /// Take the records completed so far, in input order.
    pub fn drain_completed(&mut self) -> Vec<RegistryEntry> {
        std::mem::take(&mut self.completed)
    }

    /// Flush the final record and return every record not yet drained.
    pub fn finish(mut self) -> Result<Vec<RegistryEntry>> {
        if self.line_kind.is_some() {
            self.end_line()?;
        }
        self.finalize_current();
        Ok(self.completed)
    }

    /// Number of records finalized so far, drained or not.
    pub fn sequence_count(&self) -> usize {
        self.finalized
    }

    /// Name of the record currently being digested, if any.
    pub fn current_sequence_name(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|record| sequence_name(&record.description))
    }

    fn consume_segment(&mut self, segment: &[u8]) -> Result<()> {
        if segment.is_empty() {
            return Ok(());
        }
        let kind = *self.line_kind.get_or_insert(if segment[0] == b'>' {
            LineKind::Header
        } else {
            LineKind::Sequence
        });

        match kind {
            LineKind::Header => self.header_buffer.extend_from_slice(segment),
            LineKind::Sequence => {
                let line_number = self.line_number;
                let has_bases = segment.iter().any(|b| !b.is_ascii_whitespace());
                match self.current.as_mut() {
                    Some(record) => {
                        if segment.iter().any(|b| b.is_ascii_whitespace()) {
                            let bases: Vec<u8> = segment
                                .iter()
                                .copied()
                                .filter(|b| !b.is_ascii_whitespace())
                                .collect();
                            record.digest.update(&bases);
                        } else {
                            record.digest.update(segment);
                        }
                    }
                    None if has_bases => {
                        return Err(VmcError::FastaParse(format!(
                            "sequence data before the first header at line {}",
                            line_number
                        )));
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    fn end_line(&mut self) -> Result<()> {
        if self.line_kind.take() == Some(LineKind::Header) {
            let header = std::str::from_utf8(&self.header_buffer[1..]).map_err(|e| {
                VmcError::FastaParse(format!(
                    "invalid UTF-8 in header at line {}: {}",
                    self.line_number, e
                ))
            })?;
            let description = header.trim().to_string();
            if description.is_empty() {
                return Err(VmcError::FastaParse(format!(
                    "record without a name at line {}",
                    self.line_number
                )));
            }
            self.header_buffer.clear();

            self.finalize_current();
            self.current = Some(OpenRecord {
                description,
                digest: StreamingDigest::new(),
            });
        }
        self.line_number += 1;
        Ok(())
    }

    fn finalize_current(&mut self) {
        if let Some(record) = self.current.take() {
            let length = record.digest.consumed();
            let sequence_id = self.composer.sequence_id_from_stream(record.digest);
            let name = sequence_name(&record.description).to_string();
            debug!("Digested {} ({} bp): {}", name, length, sequence_id);

            self.completed.push(RegistryEntry {
                name,
                sequence_id,
                description: record.description,
            });
            self.finalized += 1;
        }
    }
}
