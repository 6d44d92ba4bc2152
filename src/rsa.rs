//! RSASSA-PKCS1-v1_5 over the openssl stack.
//!
//! The higher-level `Verifier` is used rather than recovering the raw
//! block and comparing digests by hand: openssl checks the full PKCS#1
//! v1.5 structure including the DigestInfo prefix, which a bare trailing
//! compare would not.

use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Public};
use openssl::rsa::Rsa;
use openssl::sign::Verifier;

use crate::{ValidationError, VerifyResult};

/// RS256 in this deployment is pinned to a 3072-bit modulus.
pub(crate) const MODULUS_LEN: usize = 384;

/// Build a public verification key from raw big-endian component bytes.
///
/// The modulus must be exactly [`MODULUS_LEN`] bytes. The exponent is
/// taken verbatim at its carried length, leading zeros included.
pub(crate) fn public_key(n: &[u8], e: &[u8]) -> VerifyResult<PKey<Public>> {
    if n.len() != MODULUS_LEN {
        return Err(ValidationError::RsaMath);
    }

    let n = BigNum::from_slice(n)?;
    let e = BigNum::from_slice(e)?;
    let rsa = Rsa::from_public_components(n, e)?;

    Ok(PKey::from_rsa(rsa)?)
}

/// Check an RS256 signature over `signed`.
///
/// Returns `Ok(false)` when the key is sound but the signature does not
/// match, so the caller can stamp which of the two chained signatures
/// failed. `RsaMath` means the public-key operation itself could not
/// complete.
pub(crate) fn rs256_verify(
    key: &PKey<Public>,
    signed: &[u8],
    signature: &[u8],
) -> VerifyResult<bool> {
    if signature.len() != MODULUS_LEN {
        return Err(ValidationError::RsaMath);
    }

    let mut verifier = Verifier::new(MessageDigest::sha256(), key)?;
    verifier.update(signed)?;

    // A structurally damaged block surfaces through the error stack on
    // some openssl builds instead of a clean `false`; either way the
    // binding did not hold.
    Ok(verifier.verify(signature).unwrap_or(false))
}
