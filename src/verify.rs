//! The two-level verification protocol.
//!
//! An update manifest is authorized by two chained RS256 signatures: the
//! outer JWS commits to the manifest digest and is signed by a per-update
//! signing key; that signing key travels inside the outer header (`sjwk`)
//! as its own JWS, signed by the root key baked into the device image.
//! Both links, and the digest commitment itself, must hold before the
//! manifest bytes are trusted.
//!
//! The steps run strictly in sequence and any failure is terminal; there
//! is no retry and nothing is cached across calls.

use crate::base64url;
use crate::digest;
use crate::jwk::{self, Commitment, InnerHeader, Jwk, OuterHeader};
use crate::jws;
use crate::rsa;
use crate::scratch::Parts;
use crate::{RootKey, ValidationError, VerifyResult};

const SHA256_LEN: usize = 32;

pub(crate) fn run(
    token: &[u8],
    manifest: &[u8],
    root: &RootKey<'_>,
    buf: &mut [u8],
) -> VerifyResult<()> {
    let Parts {
        outer_header: decoded_header,
        outer_payload: decoded_payload,
        outer_signature: decoded_signature,
        inner_header: decoded_inner_header,
        inner_payload: decoded_inner_payload,
        inner_signature: decoded_inner_signature,
        key_n,
        key_e,
        digest: decoded_commitment,
        workspace,
    } = Parts::carve(buf)?;

    // Split the outer token and decode its three segments.
    let outer = jws::split(token)?;
    let header_len = base64url::decode_into(outer.header, workspace, decoded_header)?;
    let payload_len = base64url::decode_into(outer.payload, workspace, decoded_payload)?;
    let sig_len = base64url::decode_into(outer.signature, workspace, decoded_signature)?;

    let header: OuterHeader = jwk::parse_json(&decoded_header[..header_len])?;
    header.require_rs256()?;

    // The signing key arrives as a JWS of its own inside the header.
    let inner = jws::split(header.sjwk()?.as_bytes())?;
    let inner_header_len = base64url::decode_into(inner.header, workspace, decoded_inner_header)?;
    let inner_payload_len =
        base64url::decode_into(inner.payload, workspace, decoded_inner_payload)?;
    let inner_sig_len =
        base64url::decode_into(inner.signature, workspace, decoded_inner_signature)?;

    // Bind to the device root before any public-key work on this layer.
    let inner_header: InnerHeader = jwk::parse_json(&decoded_inner_header[..inner_header_len])?;
    inner_header.require_rs256()?;
    if !digest::ct_eq(inner_header.kid()?.as_bytes(), root.key_id) {
        return Err(ValidationError::UnknownRoot);
    }

    // The signing key's JWS must verify against the root.
    let root_key = rsa::public_key(root.n, root.e)?;
    if !rsa::rs256_verify(
        &root_key,
        inner.signing_input,
        &decoded_inner_signature[..inner_sig_len],
    )? {
        return Err(ValidationError::InnerSignature);
    }

    // Pull the signing key out of the now-trusted inner payload.
    let signing_jwk: Jwk = jwk::parse_json(&decoded_inner_payload[..inner_payload_len])?;
    signing_jwk.require_rs256_rsa()?;
    let n_len = base64url::decode_into(signing_jwk.n()?.as_bytes(), workspace, key_n)?;
    let e_len = base64url::decode_into(signing_jwk.e()?.as_bytes(), workspace, key_e)?;

    // The manifest's JWS must verify against the signing key.
    let signing_key = rsa::public_key(&key_n[..n_len], &key_e[..e_len])?;
    if !rsa::rs256_verify(&signing_key, outer.signing_input, &decoded_signature[..sig_len])? {
        return Err(ValidationError::OuterSignature);
    }

    // Finally bind the signature to the manifest actually delivered. The
    // outer payload only commits to a digest; without this step a signed
    // commitment could be replayed against substitute manifest bytes.
    let commitment: Commitment = jwk::parse_json(&decoded_payload[..payload_len])?;
    let commit_len =
        base64url::decode_into(commitment.sha256()?.as_bytes(), workspace, decoded_commitment)?;
    if commit_len != SHA256_LEN {
        return Err(ValidationError::ManifestDigest);
    }
    if !digest::ct_eq(&decoded_commitment[..commit_len], &digest::sha256(manifest)) {
        return Err(ValidationError::ManifestDigest);
    }

    Ok(())
}

/// Walk just far enough into the token to read the inner header's `kid`.
pub(crate) fn root_kid(token: &[u8], buf: &mut [u8]) -> VerifyResult<String> {
    let Parts {
        outer_header: decoded_header,
        inner_header: decoded_inner_header,
        workspace,
        ..
    } = Parts::carve(buf)?;

    let outer = jws::split(token)?;
    let header_len = base64url::decode_into(outer.header, workspace, decoded_header)?;
    let header: OuterHeader = jwk::parse_json(&decoded_header[..header_len])?;

    let inner = jws::split(header.sjwk()?.as_bytes())?;
    let inner_header_len = base64url::decode_into(inner.header, workspace, decoded_inner_header)?;
    let inner_header: InnerHeader = jwk::parse_json(&decoded_inner_header[..inner_header_len])?;

    Ok(inner_header.kid()?.to_owned())
}
