//! Digest a single genomic expression, e.g. `chr1:g.100T`.
//!
//! The part after `:` must start with `g`. Digits accumulate into the
//! position and letters into the allele state, of which the last one wins;
//! punctuation such as `.` or `>` is skipped, so `chr1:g.100C>T` digests the
//! same allele as `chr1:g.100T`. The position is used as both start and end.

use std::fmt::Display;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use vmc_core::{Result, VmcError};
use vmc_digest::{AlleleId, IdentifierComposer, LocationId, SequenceId, SequenceRegistry};

const GENOMIC_PREFIX: char = 'g';

/// A parsed point substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicExpression {
    pub sequence_name: String,
    /// 1-based position.
    pub position: u64,
    pub state: char,
}

impl GenomicExpression {
    pub fn parse(expression: &str) -> Result<Self> {
        let fail = |reason: &str| VmcError::ExpressionParse {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let (name, body) = expression
            .split_once(':')
            .ok_or_else(|| fail("expected '<sequence>:g.<position><state>'"))?;
        if name.is_empty() {
            return Err(fail("empty sequence name"));
        }

        let mut chars = body.chars();
        match chars.next() {
            Some(GENOMIC_PREFIX) => {}
            Some(_) => return Err(VmcError::UnsupportedExpression(expression.to_string())),
            None => return Err(fail("missing coordinate prefix")),
        }

        let mut position: Option<u64> = None;
        let mut state = None;
        for c in chars {
            if let Some(digit) = c.to_digit(10) {
                let value = position
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|p| p.checked_add(u64::from(digit)))
                    .ok_or_else(|| fail("position out of range"))?;
                position = Some(value);
            } else if c.is_ascii_alphabetic() {
                if !matches!(c, 'A' | 'C' | 'G' | 'T') {
                    return Err(VmcError::InvalidStateCharacter {
                        expression: expression.to_string(),
                        character: c,
                    });
                }
                state = Some(c);
            } else if !c.is_ascii_punctuation() {
                return Err(fail(&format!("unexpected character '{}'", c)));
            }
        }

        let position = match position {
            Some(0) => return Err(fail("position must be at least 1")),
            Some(p) => p,
            None => return Err(fail("missing position")),
        };
        let state = state.ok_or_else(|| fail("missing allele state"))?;

        Ok(Self {
            sequence_name: name.to_string(),
            position,
            state,
        })
    }
}

impl FromStr for GenomicExpression {
    type Err = VmcError;

    fn from_str(s: &str) -> Result<Self> {
        GenomicExpression::parse(s)
    }
}

impl Display for GenomicExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}.{}{}",
            self.sequence_name, GENOMIC_PREFIX, self.position, self.state
        )
    }
}

/// Every identifier derived from one expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionDigest {
    pub expression: String,
    pub sequence_id: SequenceId,
    pub location_id: LocationId,
    pub allele_id: AlleleId,
}

/// Digest `expression` against a populated registry.
pub fn digest_expression(
    expression: &str,
    registry: &SequenceRegistry,
    composer: &mut IdentifierComposer,
) -> Result<ExpressionDigest> {
    let parsed = GenomicExpression::parse(expression)?;
    let sequence_id = registry
        .get(&parsed.sequence_name)
        .ok_or_else(|| VmcError::UnknownSequence(parsed.sequence_name.clone()))?;

    let location_id = composer.compose_location_id(sequence_id, parsed.position, parsed.position);
    let mut state = [0u8; 4];
    let allele_id = composer.compose_allele_id(&location_id, parsed.state.encode_utf8(&mut state));
    debug!("{} -> {}", parsed, allele_id);

    Ok(ExpressionDigest {
        expression: expression.to_string(),
        sequence_id: sequence_id.clone(),
        location_id,
        allele_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn registry() -> SequenceRegistry {
        let chr1: SequenceId = "VMC:GS_aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2".parse().unwrap();
        vec![("chr1".to_string(), chr1)].into_iter().collect()
    }

    #[rstest]
    #[case("chr1:g.100T", 100, 'T')]
    #[case("chr1:g100T", 100, 'T')]
    #[case("chr1:g.100C>T", 100, 'T')]
    #[case("chr1:g.7A", 7, 'A')]
    fn test_parse(#[case] text: &str, #[case] position: u64, #[case] state: char) {
        let parsed: GenomicExpression = text.parse().unwrap();
        assert_eq!(parsed.sequence_name, "chr1");
        assert_eq!(parsed.position, position);
        assert_eq!(parsed.state, state);
    }

    #[rstest]
    #[case("chr1g.100T")]
    #[case(":g.100T")]
    #[case("chr1:")]
    #[case("chr1:g.T")]
    #[case("chr1:g.0T")]
    #[case("chr1:g.100")]
    #[case("chr1:g.10 0T")]
    #[case("chr1:g.99999999999999999999999T")]
    fn test_parse_errors(#[case] text: &str) {
        let err = GenomicExpression::parse(text).unwrap_err();
        assert!(matches!(err, VmcError::ExpressionParse { .. }), "{err}");
    }

    #[rstest]
    #[case("chr1:c.100T")]
    #[case("chr1:p.100T")]
    fn test_non_genomic_is_unsupported(#[case] text: &str) {
        let err = GenomicExpression::parse(text).unwrap_err();
        assert_eq!(err.category(), vmc_core::ErrorCategory::UnsupportedInput);
    }

    #[rstest]
    #[case("chr1:g.100N", 'N')]
    #[case("chr1:g.100t", 't')]
    fn test_invalid_state(#[case] text: &str, #[case] bad: char) {
        match GenomicExpression::parse(text).unwrap_err() {
            VmcError::InvalidStateCharacter { character, .. } => assert_eq!(character, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_digest_expression(registry: SequenceRegistry) {
        let mut composer = IdentifierComposer::default();
        let digest = digest_expression("chr1:g.1C", &registry, &mut composer).unwrap();
        assert_eq!(
            digest.location_id.to_string(),
            "VMC:GL_VLuh_1SnEmQfjyblhiJG8_BwfGxxEctJ"
        );
        assert_eq!(
            digest.allele_id.to_string(),
            "VMC:GA_bAH5ZSEI65Rmgj303IgKEmdIXz0EuLC7"
        );

        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json["sequence_id"], "VMC:GS_aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2");
        assert_eq!(json["expression"], "chr1:g.1C");
    }

    #[rstest]
    fn test_unknown_sequence(registry: SequenceRegistry) {
        let mut composer = IdentifierComposer::default();
        let err = digest_expression("chr9:g.1C", &registry, &mut composer).unwrap_err();
        assert!(matches!(err, VmcError::UnknownSequence(ref name) if name == "chr9"));
    }
}
