//! The caller-owned scratch area.
//!
//! Verification never allocates decoded material behind the caller's
//! back: one flat buffer comes in and every decoded segment lands in a
//! fixed region of it. Region sizes cover the worst cases observed in
//! deployed update manifests, with the signature and modulus targets
//! deliberately oversized so a wrong-length value is measured rather
//! than refused by the decoder.

use crate::{ValidationError, VerifyResult};

const OUTER_HEADER: usize = 1400;
const OUTER_PAYLOAD: usize = 64;
const SIGNATURE: usize = 512;
const INNER_HEADER: usize = 64;
const INNER_PAYLOAD: usize = 700;
const KEY_N: usize = 512;
const KEY_E: usize = 16;
const DIGEST: usize = 48;
const WORKSPACE: usize = 4096;

/// Scratch size required by [`verify_manifest`](crate::verify_manifest),
/// just under 8 KB.
pub const SCRATCH_LEN: usize = OUTER_HEADER
    + OUTER_PAYLOAD
    + 2 * SIGNATURE
    + INNER_HEADER
    + INNER_PAYLOAD
    + KEY_N
    + KEY_E
    + DIGEST
    + WORKSPACE;

/// The scratch buffer carved into per-purpose regions.
pub(crate) struct Parts<'a> {
    pub outer_header: &'a mut [u8],
    pub outer_payload: &'a mut [u8],
    pub outer_signature: &'a mut [u8],
    pub inner_header: &'a mut [u8],
    pub inner_payload: &'a mut [u8],
    pub inner_signature: &'a mut [u8],
    pub key_n: &'a mut [u8],
    pub key_e: &'a mut [u8],
    /// Decoded `sha256` commitment.
    pub digest: &'a mut [u8],
    /// Normalization target for base64 inputs before decoding.
    pub workspace: &'a mut [u8],
}

impl<'a> Parts<'a> {
    /// Split `buf` into the fixed regions, refusing a short buffer up
    /// front so no later step can run out halfway.
    pub fn carve(buf: &'a mut [u8]) -> VerifyResult<Parts<'a>> {
        if buf.len() < SCRATCH_LEN {
            return Err(ValidationError::ScratchOverflow);
        }

        let (outer_header, buf) = buf.split_at_mut(OUTER_HEADER);
        let (outer_payload, buf) = buf.split_at_mut(OUTER_PAYLOAD);
        let (outer_signature, buf) = buf.split_at_mut(SIGNATURE);
        let (inner_header, buf) = buf.split_at_mut(INNER_HEADER);
        let (inner_payload, buf) = buf.split_at_mut(INNER_PAYLOAD);
        let (inner_signature, buf) = buf.split_at_mut(SIGNATURE);
        let (key_n, buf) = buf.split_at_mut(KEY_N);
        let (key_e, buf) = buf.split_at_mut(KEY_E);
        let (digest, buf) = buf.split_at_mut(DIGEST);
        let (workspace, _) = buf.split_at_mut(WORKSPACE);

        Ok(Parts {
            outer_header,
            outer_payload,
            outer_signature,
            inner_header,
            inner_payload,
            inner_signature,
            key_n,
            key_e,
            digest,
            workspace,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn carves_exactly_sized_buffer() {
        let mut buf = vec![0u8; SCRATCH_LEN];
        let parts = Parts::carve(&mut buf).unwrap();
        assert_eq!(parts.outer_header.len(), OUTER_HEADER);
        assert_eq!(parts.workspace.len(), WORKSPACE);
    }

    #[test]
    fn refuses_short_buffer() {
        let mut buf = vec![0u8; SCRATCH_LEN - 1];
        assert!(matches!(
            Parts::carve(&mut buf),
            Err(ValidationError::ScratchOverflow)
        ));
    }
}
