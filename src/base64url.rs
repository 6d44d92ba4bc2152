//! Base64 decoding for JWS segments.
//!
//! JWS compact serialization uses the URL-safe alphabet and omits `=`
//! padding, but signers in the field have been observed emitting the
//! standard alphabet and explicit padding, sometimes both within one
//! token. The decoder here accepts every spelling: the input is
//! normalized into a scratch workspace (the input itself is never
//! written) and handed to the `base64` crate for the actual decode.

use crate::{ValidationError, VerifyResult};

/// Decode `input` into `out`, returning the decoded length.
///
/// `workspace` holds both the normalized copy of `input` and the raw
/// decode; the decoded bytes are then copied into `out`. Capacity is
/// checked against the exact decoded length before anything is decoded,
/// so an output that exactly fills `out` is accepted and this never
/// panics and never truncates. The `base64` crate's slice decoder wants
/// slack beyond the decoded length, which the workspace provides; `out`
/// itself needs none.
pub(crate) fn decode_into(
    input: &[u8],
    workspace: &mut [u8],
    out: &mut [u8],
) -> VerifyResult<usize> {
    // Strip explicit padding; it is reconstructed below so that padded
    // and unpadded spellings decode identically.
    let mut len = input.len();
    while len > 0 && input[len - 1] == b'=' {
        len -= 1;
    }

    let pad = match len % 4 {
        0 => 0,
        2 => 2,
        3 => 1,
        // A single leftover byte can never be valid base64.
        _ => return Err(ValidationError::Base64),
    };
    let padded = len + pad;
    let decoded_len = padded / 4 * 3 - pad;

    if decoded_len > out.len() {
        return Err(ValidationError::Base64);
    }
    if padded > workspace.len() {
        return Err(ValidationError::ScratchOverflow);
    }

    let (normalized, decoded) = workspace.split_at_mut(padded);
    if decoded.len() < padded / 4 * 3 {
        return Err(ValidationError::ScratchOverflow);
    }

    for (dst, &src) in normalized.iter_mut().zip(&input[..len]) {
        *dst = match src {
            b'-' => b'+',
            b'_' => b'/',
            other => other,
        };
    }
    for slot in &mut normalized[len..padded] {
        *slot = b'=';
    }

    // Anything left that is not in the standard alphabet, including `=`
    // in the middle of the input, fails here.
    let n = base64::decode_config_slice(&normalized[..], base64::STANDARD, decoded)
        .map_err(|_| ValidationError::Base64)?;
    out[..n].copy_from_slice(&decoded[..n]);

    Ok(n)
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(input: &[u8]) -> VerifyResult<Vec<u8>> {
        let mut workspace = [0u8; 128];
        let mut out = [0u8; 64];
        decode_into(input, &mut workspace, &mut out).map(|n| out[..n].to_vec())
    }

    #[test]
    fn decodes_unpadded_url_safe() {
        assert_eq!(decode(b"TQ").unwrap(), b"M");
        assert_eq!(decode(b"TWE").unwrap(), b"Ma");
        assert_eq!(decode(b"TWFu").unwrap(), b"Man");
        assert_eq!(decode(b"").unwrap(), b"");
    }

    #[test]
    fn url_safe_and_standard_alphabets_agree() {
        // 0xfb 0xef 0xbe encodes to index 62 four times over.
        assert_eq!(decode(b"----").unwrap(), [0xfb, 0xef, 0xbe]);
        assert_eq!(decode(b"++++").unwrap(), [0xfb, 0xef, 0xbe]);
        assert_eq!(decode(b"____").unwrap(), decode(b"////").unwrap());
    }

    #[test]
    fn explicit_padding_is_tolerated() {
        assert_eq!(decode(b"TQ==").unwrap(), b"M");
        assert_eq!(decode(b"TWE=").unwrap(), b"Ma");
    }

    #[test]
    fn fills_an_exactly_sized_output() {
        // No slack in `out` at all, across all three padding shapes.
        let mut workspace = [0u8; 128];

        let mut out = [0u8; 3];
        assert_eq!(decode_into(b"AQID", &mut workspace, &mut out), Ok(3));
        assert_eq!(out, [1, 2, 3]);

        let mut out = [0u8; 4];
        assert_eq!(decode_into(b"AQIDBA", &mut workspace, &mut out), Ok(4));
        assert_eq!(out, [1, 2, 3, 4]);

        let mut out = [0u8; 5];
        assert_eq!(decode_into(b"AQIDBAU", &mut workspace, &mut out), Ok(5));
        assert_eq!(out, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_foreign_bytes() {
        assert_eq!(decode(b"TW!u"), Err(ValidationError::Base64));
        assert_eq!(decode(b"TQ\n"), Err(ValidationError::Base64));
    }

    #[test]
    fn rejects_interior_padding() {
        assert_eq!(decode(b"TQ==TQ=="), Err(ValidationError::Base64));
    }

    #[test]
    fn rejects_impossible_length() {
        // Three missing pad bytes cannot be reconstructed.
        assert_eq!(decode(b"T"), Err(ValidationError::Base64));
        assert_eq!(decode(b"TWFuT"), Err(ValidationError::Base64));
    }

    #[test]
    fn rejects_output_beyond_capacity() {
        let mut workspace = [0u8; 128];
        let mut out = [0u8; 2];
        assert_eq!(
            decode_into(b"TWFu", &mut workspace, &mut out),
            Err(ValidationError::Base64)
        );
    }

    #[test]
    fn round_trips_unpadded_encoding() {
        let cases: [&[u8]; 4] = [b"", b"\x00", b"\xff\x00\xab\xcd\xef", b"firmware image bytes"];
        for data in cases.iter() {
            let encoded = base64::encode_config(data, base64::URL_SAFE_NO_PAD);
            assert_eq!(decode(encoded.as_bytes()).unwrap(), *data);
        }
    }
}
