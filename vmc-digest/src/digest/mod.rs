//! The digest primitive and the canonical byte forms it is applied to.
//!
//! - `algorithms` - SHA-512 truncated to N bytes, base64url encoded
//! - `canonical` - the bracketed `<Kind|field|...>` representation of each value

pub mod algorithms;
pub mod canonical;

pub use algorithms::{DigestLength, StreamingDigest, digest, sha512t24u};
pub use canonical::{CanonicalForm, write_allele_canonical, write_location_canonical};
