//! JOSE header and JWK payload shapes.
//!
//! Only the fields this update flow reads are modelled. serde skips the
//! rest, so unknown header or payload fields never cause rejection, and
//! key order in the JSON is immaterial. Every required field is an
//! `Option` so that an absent field and a malformed document stay
//! distinguishable in the verdict.

use serde::de::DeserializeOwned;

use crate::{ValidationError, VerifyResult};

/// Parse a decoded JWS segment as JSON.
pub(crate) fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> VerifyResult<T> {
    serde_json::from_slice(bytes).map_err(|_| ValidationError::JsonType)
}

/// Header of the outer (manifest) JWS.
#[derive(Deserialize)]
pub(crate) struct OuterHeader {
    alg: Option<String>,
    sjwk: Option<String>,
}

impl OuterHeader {
    pub fn require_rs256(&self) -> VerifyResult<()> {
        require_rs256(&self.alg)
    }

    /// The embedded signing-key JWS, still in compact serialization.
    pub fn sjwk(&self) -> VerifyResult<&str> {
        string_field(&self.sjwk)
    }
}

/// Payload of the outer JWS: a digest commitment to the manifest.
#[derive(Deserialize)]
pub(crate) struct Commitment {
    sha256: Option<String>,
}

impl Commitment {
    pub fn sha256(&self) -> VerifyResult<&str> {
        string_field(&self.sha256)
    }
}

/// Header of the inner (signing key) JWS.
#[derive(Deserialize)]
pub(crate) struct InnerHeader {
    alg: Option<String>,
    kid: Option<String>,
}

impl InnerHeader {
    pub fn require_rs256(&self) -> VerifyResult<()> {
        require_rs256(&self.alg)
    }

    /// The trust-anchor identifier this token was signed under.
    pub fn kid(&self) -> VerifyResult<&str> {
        string_field(&self.kid)
    }
}

/// The signing key in JWK form (RFC 7517), as carried by the inner
/// payload.
#[derive(Deserialize)]
pub(crate) struct Jwk {
    kty: Option<String>,
    n: Option<String>,
    e: Option<String>,
    alg: Option<String>,
}

impl Jwk {
    /// RS256 over an RSA key is the only combination this flow accepts.
    pub fn require_rs256_rsa(&self) -> VerifyResult<()> {
        require_rs256(&self.alg)?;
        match self.kty.as_deref() {
            Some("RSA") => Ok(()),
            _ => Err(ValidationError::UnsupportedAlg),
        }
    }

    /// Modulus, base64-encoded big-endian bytes.
    pub fn n(&self) -> VerifyResult<&str> {
        string_field(&self.n)
    }

    /// Public exponent, base64-encoded big-endian bytes.
    pub fn e(&self) -> VerifyResult<&str> {
        string_field(&self.e)
    }
}

fn string_field(field: &Option<String>) -> VerifyResult<&str> {
    field.as_deref().ok_or(ValidationError::JsonMissing)
}

/// An absent or unexpected algorithm is a downgrade attempt, not a
/// malformed document.
fn require_rs256(alg: &Option<String>) -> VerifyResult<()> {
    match alg.as_deref() {
        Some("RS256") => Ok(()),
        _ => Err(ValidationError::UnsupportedAlg),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_known_fields_and_skips_the_rest() {
        let header: OuterHeader =
            parse_json(br#"{"typ":"JWT","sjwk":"a.b.c","alg":"RS256"}"#).unwrap();
        assert!(header.require_rs256().is_ok());
        assert_eq!(header.sjwk().unwrap(), "a.b.c");
    }

    #[test]
    fn absent_field_is_missing_not_malformed() {
        let header: OuterHeader = parse_json(br#"{"alg":"RS256"}"#).unwrap();
        assert_eq!(header.sjwk(), Err(ValidationError::JsonMissing));
    }

    #[test]
    fn wrong_field_type_fails_the_parse() {
        assert!(matches!(
            parse_json::<OuterHeader>(br#"{"alg":"RS256","sjwk":17}"#),
            Err(ValidationError::JsonType)
        ));
        assert!(matches!(
            parse_json::<Commitment>(br#"["not","an","object"]"#),
            Err(ValidationError::JsonType)
        ));
    }

    #[test]
    fn alg_gate_refuses_everything_but_rs256() {
        for doc in [
            br#"{"kid":"X"}"#.as_ref(),
            br#"{"alg":"none","kid":"X"}"#.as_ref(),
            br#"{"alg":"HS256","kid":"X"}"#.as_ref(),
            br#"{"alg":"RS384","kid":"X"}"#.as_ref(),
        ] {
            let header: InnerHeader = parse_json(doc).unwrap();
            assert_eq!(
                header.require_rs256(),
                Err(ValidationError::UnsupportedAlg)
            );
        }
    }

    #[test]
    fn jwk_gate_checks_key_type_too() {
        let jwk: Jwk =
            parse_json(br#"{"kty":"EC","n":"AA","e":"AQAB","alg":"RS256"}"#).unwrap();
        assert_eq!(
            jwk.require_rs256_rsa(),
            Err(ValidationError::UnsupportedAlg)
        );
    }
}
