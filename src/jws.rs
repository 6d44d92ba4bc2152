//! Splitting JWS compact serializations.

use crate::{ValidationError, VerifyResult};

/// The individual, still-encoded parts of a JWS compact serialization.
///
/// `signing_input` is the byte range the signature covers: the encoded
/// header, one literal `.`, and the encoded payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CompactParts<'a> {
    pub header: &'a [u8],
    pub payload: &'a [u8],
    pub signature: &'a [u8],
    pub signing_input: &'a [u8],
}

/// Split a JWS compact serialization on its two `.` separators.
///
/// The token must contain exactly two dots delimiting three non-empty
/// segments. Nothing is copied and nothing is decoded; all returned
/// slices borrow from `token`.
pub(crate) fn split(token: &[u8]) -> VerifyResult<CompactParts<'_>> {
    let mut dots = token
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'.')
        .map(|(index, _)| index);

    let first = dots.next().ok_or(ValidationError::JwsStructure)?;
    let second = dots.next().ok_or(ValidationError::JwsStructure)?;
    if dots.next().is_some() {
        return Err(ValidationError::JwsStructure);
    }

    let header = &token[..first];
    let payload = &token[first + 1..second];
    let signature = &token[second + 1..];

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(ValidationError::JwsStructure);
    }

    Ok(CompactParts {
        header,
        payload,
        signature,
        signing_input: &token[..second],
    })
}
