//! Typed VMC identifiers.
//!
//! Every identifier renders as `<namespace>:<tag>_<token>`, e.g.
//! `VMC:GL_9Jht-lguk_jnBvG-wLJbjmBw5v_v7rQo`. The three kinds share that flat
//! text form but are distinct Rust types, so a location identifier cannot be
//! passed where an allele identifier is expected.

use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use vmc_core::consts::{ALLELE_TAG, LOCATION_TAG, SEQUENCE_TAG, VMC_NAMESPACE};
use vmc_core::{Result, VmcError};

/// The kind of object an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentifierKind {
    Sequence,
    Location,
    Allele,
}

impl IdentifierKind {
    pub fn tag(self) -> &'static str {
        match self {
            IdentifierKind::Sequence => SEQUENCE_TAG,
            IdentifierKind::Location => LOCATION_TAG,
            IdentifierKind::Allele => ALLELE_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            SEQUENCE_TAG => Some(IdentifierKind::Sequence),
            LOCATION_TAG => Some(IdentifierKind::Location),
            ALLELE_TAG => Some(IdentifierKind::Allele),
            _ => None,
        }
    }
}

impl Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentifierKind::Sequence => "sequence",
            IdentifierKind::Location => "location",
            IdentifierKind::Allele => "allele",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level marker for an [`IdentifierKind`].
pub trait Kind: sealed::Sealed {
    const KIND: IdentifierKind;
}

/// Marker for sequence identifiers.
pub enum SequenceKind {}
/// Marker for location identifiers.
pub enum LocationKind {}
/// Marker for allele identifiers.
pub enum AlleleKind {}

impl sealed::Sealed for SequenceKind {}
impl sealed::Sealed for LocationKind {}
impl sealed::Sealed for AlleleKind {}

impl Kind for SequenceKind {
    const KIND: IdentifierKind = IdentifierKind::Sequence;
}
impl Kind for LocationKind {
    const KIND: IdentifierKind = IdentifierKind::Location;
}
impl Kind for AlleleKind {
    const KIND: IdentifierKind = IdentifierKind::Allele;
}

pub type SequenceId = Identifier<SequenceKind>;
pub type LocationId = Identifier<LocationKind>;
pub type AlleleId = Identifier<AlleleKind>;

/// An immutable identifier of kind `K`, holding only the digest token.
pub struct Identifier<K: Kind> {
    digest: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Identifier<K> {
    /// Wrap an already computed digest token.
    pub(crate) fn from_digest(digest: String) -> Self {
        Self {
            digest,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        K::KIND
    }

    /// The bare token, without namespace or tag.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Append the full text form to `buf` without an intermediate `String`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(VMC_NAMESPACE.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(K::KIND.tag().as_bytes());
        buf.push(b'_');
        buf.extend_from_slice(self.digest.as_bytes());
    }

    pub fn to_tagged(&self) -> TaggedIdentifier {
        TaggedIdentifier {
            kind: K::KIND,
            digest: self.digest.clone(),
        }
    }
}

impl<K: Kind> Clone for Identifier<K> {
    fn clone(&self) -> Self {
        Self::from_digest(self.digest.clone())
    }
}

impl<K: Kind> PartialEq for Identifier<K> {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl<K: Kind> Eq for Identifier<K> {}

impl<K: Kind> Hash for Identifier<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

impl<K: Kind> Display for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}_{}", VMC_NAMESPACE, K::KIND.tag(), self.digest)
    }
}

impl<K: Kind> Debug for Identifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self)
    }
}

impl<K: Kind> FromStr for Identifier<K> {
    type Err = VmcError;

    fn from_str(s: &str) -> Result<Self> {
        let tagged: TaggedIdentifier = s.parse()?;
        if tagged.kind != K::KIND {
            return Err(VmcError::InvalidIdentifier {
                value: s.to_string(),
                reason: format!(
                    "expected a {} identifier, found {}",
                    K::KIND.tag(),
                    tagged.kind.tag()
                ),
            });
        }
        Ok(Self::from_digest(tagged.digest))
    }
}

impl<K: Kind> Serialize for Identifier<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The untyped boundary form of an identifier: a kind plus its token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedIdentifier {
    pub kind: IdentifierKind,
    pub digest: String,
}

impl Display for TaggedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}_{}", VMC_NAMESPACE, self.kind.tag(), self.digest)
    }
}

impl FromStr for TaggedIdentifier {
    type Err = VmcError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| VmcError::InvalidIdentifier {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (namespace, rest) = s
            .split_once(':')
            .ok_or_else(|| invalid("missing namespace separator ':'"))?;
        if namespace != VMC_NAMESPACE {
            return Err(invalid("unknown namespace"));
        }

        // The tag never contains '_', the token may.
        let (tag, token) = rest
            .split_once('_')
            .ok_or_else(|| invalid("missing tag separator '_'"))?;
        let kind = IdentifierKind::from_tag(tag).ok_or_else(|| invalid("unknown kind tag"))?;

        // Padding is optional; unpadded tokens are accepted as-is.
        let body = token.trim_end_matches('=');
        if body.is_empty() {
            return Err(invalid("empty digest token"));
        }
        if !body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(invalid("digest token is not base64url"));
        }

        Ok(TaggedIdentifier {
            kind,
            digest: token.to_string(),
        })
    }
}

impl<K: Kind> From<Identifier<K>> for TaggedIdentifier {
    fn from(id: Identifier<K>) -> Self {
        TaggedIdentifier {
            kind: K::KIND,
            digest: id.digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_display_format() {
        let id = SequenceId::from_digest("iYtREV555dUFKg2_agSJW6suquUyPpMw".to_string());
        assert_eq!(id.to_string(), "VMC:GS_iYtREV555dUFKg2_agSJW6suquUyPpMw");
        assert_eq!(id.kind(), IdentifierKind::Sequence);

        let mut buf = Vec::new();
        id.write_to(&mut buf);
        assert_eq!(buf, id.to_string().into_bytes());
    }

    #[rstest]
    #[case("VMC:GS_abc", IdentifierKind::Sequence, "abc")]
    #[case("VMC:GL_a_b-c", IdentifierKind::Location, "a_b-c")]
    #[case("VMC:GA_AAAA==", IdentifierKind::Allele, "AAAA==")]
    fn test_parse_tagged(#[case] text: &str, #[case] kind: IdentifierKind, #[case] digest: &str) {
        let tagged: TaggedIdentifier = text.parse().unwrap();
        assert_eq!(tagged.kind, kind);
        assert_eq!(tagged.digest, digest);
        assert_eq!(tagged.to_string(), text);
    }

    #[rstest]
    #[case("GS_abc")]
    #[case("ga4gh:GS_abc")]
    #[case("VMC:GSabc")]
    #[case("VMC:GX_abc")]
    #[case("VMC:GS_")]
    #[case("VMC:GS_ab/c+")]
    fn test_parse_rejects_malformed(#[case] text: &str) {
        let err = text.parse::<TaggedIdentifier>().unwrap_err();
        assert!(matches!(err, VmcError::InvalidIdentifier { .. }));
    }

    #[rstest]
    fn test_typed_parse_checks_kind() {
        let location: LocationId = "VMC:GL_abc".parse().unwrap();
        assert_eq!(location.digest(), "abc");

        let err = "VMC:GL_abc".parse::<AlleleId>().unwrap_err();
        assert!(err.to_string().contains("expected a GA identifier, found GL"));
    }

    #[rstest]
    fn test_serialize_as_text() {
        let id = AlleleId::from_digest("xyz".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"VMC:GA_xyz\"");
    }
}
