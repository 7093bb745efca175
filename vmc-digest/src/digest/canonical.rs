//! Canonical byte forms.
//!
//! These bytes are the interoperability contract: two producers agree on an
//! identifier only if they build the exact same bytes here.
//!
//! - sequence: the raw content, no envelope
//! - location: `<Location|<sequence id>|<Interval|<start>|<end>>>`
//! - allele: `<Allele|<location id>|<state>>`
//!
//! Field values are not escaped. A name or state containing `|`, `<` or `>`
//! can make two different objects share a canonical form; this is kept as-is
//! so identifiers stay compatible with other producers of the same scheme.

use crate::identifier::{LocationId, SequenceId};
use crate::models::{AlleleRef, Interval, LocationRef, SequenceHandle};

/// A value with a canonical byte form.
pub trait CanonicalForm {
    /// Append the canonical bytes to `buf`.
    fn write_canonical(&self, buf: &mut Vec<u8>);

    fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_canonical(&mut buf);
        buf
    }
}

impl CanonicalForm for SequenceHandle {
    fn write_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.content);
    }
}

impl CanonicalForm for LocationRef {
    fn write_canonical(&self, buf: &mut Vec<u8>) {
        write_location_canonical(buf, &self.sequence_id, self.interval);
    }
}

impl CanonicalForm for AlleleRef {
    fn write_canonical(&self, buf: &mut Vec<u8>) {
        write_allele_canonical(buf, &self.location_id, &self.state);
    }
}

pub fn write_location_canonical(buf: &mut Vec<u8>, sequence_id: &SequenceId, interval: Interval) {
    let mut num = itoa::Buffer::new();
    buf.extend_from_slice(b"<Location|");
    sequence_id.write_to(buf);
    buf.extend_from_slice(b"|<Interval|");
    buf.extend_from_slice(num.format(interval.start).as_bytes());
    buf.push(b'|');
    buf.extend_from_slice(num.format(interval.end).as_bytes());
    buf.extend_from_slice(b">>");
}

pub fn write_allele_canonical(buf: &mut Vec<u8>, location_id: &LocationId, state: &str) {
    buf.extend_from_slice(b"<Allele|");
    location_id.write_to(buf);
    buf.push(b'|');
    buf.extend_from_slice(state.as_bytes());
    buf.push(b'>');
}
