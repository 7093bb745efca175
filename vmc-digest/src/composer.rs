//! Identifier composition.
//!
//! `IdentifierComposer` builds the canonical form of a value into a reusable
//! scratch buffer, digests it, and wraps the token in the matching typed
//! identifier. The buffer is reused across calls, so annotating a large VCF
//! does not allocate a canonical string per record.

use crate::digest::{
    CanonicalForm, DigestLength, StreamingDigest, digest, write_allele_canonical,
    write_location_canonical,
};
use crate::identifier::{AlleleId, LocationId, SequenceId};
use crate::models::{AlleleRef, Interval, LocationRef, SequenceHandle};

pub struct IdentifierComposer {
    length: DigestLength,
    buf: Vec<u8>,
}

impl IdentifierComposer {
    pub fn new(length: DigestLength) -> Self {
        Self {
            length,
            buf: Vec::with_capacity(256),
        }
    }

    pub fn length(&self) -> DigestLength {
        self.length
    }

    /// Sequence identifier of a handle's raw content.
    pub fn compose_sequence_id(&self, handle: &SequenceHandle) -> SequenceId {
        self.sequence_id_from_bytes(&handle.content)
    }

    pub fn sequence_id_from_bytes(&self, content: &[u8]) -> SequenceId {
        SequenceId::from_digest(digest(content, self.length))
    }

    /// Sequence identifier of content that was fed incrementally.
    pub fn sequence_id_from_stream(&self, stream: StreamingDigest) -> SequenceId {
        SequenceId::from_digest(stream.finish(self.length))
    }

    /// Location identifier from reported 1-based `start` and `end`.
    ///
    /// The canonical interval is `(start - 1, end)`.
    pub fn compose_location_id(
        &mut self,
        sequence_id: &SequenceId,
        start: u64,
        end: u64,
    ) -> LocationId {
        self.buf.clear();
        write_location_canonical(&mut self.buf, sequence_id, Interval::from_reported(start, end));
        LocationId::from_digest(digest(&self.buf, self.length))
    }

    pub fn compose_location(&mut self, location: &LocationRef) -> LocationId {
        LocationId::from_digest(self.digest_canonical(location))
    }

    pub fn compose_allele_id(&mut self, location_id: &LocationId, state: &str) -> AlleleId {
        self.buf.clear();
        write_allele_canonical(&mut self.buf, location_id, state);
        AlleleId::from_digest(digest(&self.buf, self.length))
    }

    pub fn compose_allele(&mut self, allele: &AlleleRef) -> AlleleId {
        AlleleId::from_digest(self.digest_canonical(allele))
    }

    fn digest_canonical<T: CanonicalForm>(&mut self, value: &T) -> String {
        self.buf.clear();
        value.write_canonical(&mut self.buf);
        digest(&self.buf, self.length)
    }
}

impl Default for IdentifierComposer {
    fn default() -> Self {
        Self::new(DigestLength::default())
    }
}
