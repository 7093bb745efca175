//! Value shapes that get digested.
//!
//! Minimal structs, just enough to build canonical forms.

use crate::identifier::{LocationId, SequenceId};

/// One named sequence and its raw content.
///
/// The content is only needed until its identifier has been computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceHandle {
    /// First whitespace-delimited token of the description, e.g. "chr1".
    pub name: String,
    /// Full description line, without the leading '>'.
    pub description: String,
    pub content: Vec<u8>,
}

impl SequenceHandle {
    pub fn new(description: &str, content: Vec<u8>) -> Self {
        let description = description.trim();
        Self {
            name: sequence_name(description).to_string(),
            description: description.to_string(),
            content,
        }
    }
}

/// The external name of a sequence: everything before the first whitespace.
pub fn sequence_name(description: &str) -> &str {
    description.split_whitespace().next().unwrap_or_default()
}

/// A half-open, 0-based interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Convert reported 1-based inclusive coordinates: only the start moves.
    ///
    /// A reported start of 0 saturates at 0.
    pub fn from_reported(start: u64, end: u64) -> Self {
        Self {
            start: start.saturating_sub(1),
            end,
        }
    }
}

/// An interval anchored to a sequence identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef {
    pub sequence_id: SequenceId,
    pub interval: Interval,
}

/// A single sequence state observed at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleRef {
    pub location_id: LocationId,
    pub state: String,
}
