//! Implements a library for verifying signed over-the-air (OTA) firmware
//! update manifests.
//!
//! This library is specifically aimed at constrained devices that receive
//! update requests from a cloud service and must decide, before fetching
//! and flashing anything, whether the update manifest was authorized by a
//! key chaining to a trust anchor baked into the device image.
//!
//! The manifest is authorized by a two-level JWS in compact serialization:
//! the outer token commits to the manifest digest and is signed by a
//! per-update signing key; that signing key travels inside the outer
//! header (the `sjwk` field) as a second, complete JWS signed by the
//! device root key. Verification therefore checks three bindings in
//! order: the inner token against the root, the outer token against the
//! signing key, and the digest commitment against the manifest bytes
//! actually delivered. The only supported algorithm is `RS256` with a
//! 3072-bit modulus.
//!
//! ## Usage example
//!
//! ```rust
//! use manifest_jws::{verify_manifest, RootKey, SCRATCH_LEN};
//!
//! // The real device image bakes these in at build time.
//! static ROOT_N: [u8; 384] = [0; 384];
//! static ROOT_E: [u8; 3] = [1, 0, 1];
//! static ROOT: RootKey<'static> = RootKey::new(b"OTA.200702.R", &ROOT_N, &ROOT_E);
//!
//! /// Decide whether `manifest` may be installed.
//! fn update_is_authorized(token: &[u8], manifest: &[u8]) -> bool {
//!     let mut scratch = [0u8; SCRATCH_LEN];
//!     verify_manifest(token, manifest, &ROOT, &mut scratch).is_ok()
//! }
//! ```
//!
//! The verifier is a pure function: it performs no I/O, keeps no state
//! between calls, and works entirely within the caller-provided scratch
//! buffer, which is zeroed again before every return.

#[macro_use] extern crate serde_derive;

extern crate base64;
extern crate openssl;
extern crate serde;
extern crate serde_json;
extern crate zeroize;

use openssl::error::ErrorStack;
use zeroize::Zeroize;

mod base64url;
mod digest;
mod jwk;
mod jws;
mod rsa;
mod scratch;
mod verify;


pub use crate::scratch::SCRATCH_LEN;

/// A trust anchor compiled into the device image.
///
/// The modulus and exponent are unsigned big-endian byte strings; the key
/// id is the ASCII string the inner JWS header must name in its `kid`
/// field. All three are borrowed so a firmware image can declare the
/// anchor as a `static` over `const` byte arrays with explicit lengths.
pub struct RootKey<'a> {
    /// Key identifier matched against the inner header's `kid`.
    pub key_id: &'a [u8],

    /// Modulus, big-endian, 384 bytes for this deployment.
    pub n: &'a [u8],

    /// Public exponent, big-endian, leading zeros significant.
    pub e: &'a [u8],
}

impl<'a> RootKey<'a> {
    /// Construct a trust anchor from its raw components.
    pub const fn new(key_id: &'a [u8], n: &'a [u8], e: &'a [u8]) -> Self {
        RootKey { key_id, n, e }
    }
}

/// Possible reasons for refusing a manifest.
///
/// Verification is all-or-nothing: any of these leaves the device on its
/// current image. None of the variants carries material derived from the
/// token, so a reason can be reported without disclosing what was seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong dot count, an empty segment, or other JWS framing defect.
    JwsStructure,

    /// A byte outside the base64 alphabets, impossible padding, or a
    /// value too large for its decode target.
    Base64,

    /// A required JSON field is absent.
    JsonMissing,

    /// A segment did not decode to the expected JSON shape, or a field
    /// holds a value of the wrong type.
    JsonType,

    /// The inner header names a key id other than the device trust anchor.
    UnknownRoot,

    /// An algorithm or key type other than RS256 over RSA was requested.
    UnsupportedAlg,

    /// Key or signature material has the wrong size, or the public-key
    /// operation itself could not complete.
    RsaMath,

    /// The signing-key JWS does not verify against the trust anchor.
    InnerSignature,

    /// The manifest JWS does not verify against the signing key.
    OuterSignature,

    /// The signed digest commitment does not match the supplied manifest
    /// bytes.
    ManifestDigest,

    /// The caller-provided scratch buffer is smaller than [`SCRATCH_LEN`].
    ScratchOverflow,
}

pub(crate) type VerifyResult<T> = Result<T, ValidationError>;

impl From<ErrorStack> for ValidationError {
    fn from(_: ErrorStack) -> Self { ValidationError::RsaMath }
}

/// Verify that `manifest` was authorized by the device trust anchor.
///
/// `token` is the outer JWS exactly as delivered by the update service.
/// `manifest` is the manifest JSON exactly as committed by the token's
/// `sha256` field; the caller must not reformat it. `scratch` must be at
/// least [`SCRATCH_LEN`] bytes and is owned by the verifier for the
/// duration of the call; it is zeroed before returning on every path,
/// since it transiently holds decoded signature blocks and key material.
///
/// On success the caller may proceed to download and flash the images the
/// manifest describes. Whether the manifest is *acceptable* (version,
/// compatibility) is not judged here, only that it is authentic and
/// untampered.
pub fn verify_manifest(
    token: &[u8],
    manifest: &[u8],
    root: &RootKey<'_>,
    scratch: &mut [u8],
) -> VerifyResult<()> {
    let verdict = verify::run(token, manifest, root, scratch);
    scratch.zeroize();
    verdict
}

/// Report which trust anchor a token demands, without verifying anything.
///
/// Extracts the `kid` the token's inner JWS names. Devices holding more
/// than one provisioned root, or reporting refused updates upstream, can
/// use this before (or after) [`verify_manifest`] to learn which root the
/// service signed against. The returned id is attacker-controlled until a
/// verification passes.
pub fn root_key_id(token: &[u8], scratch: &mut [u8]) -> VerifyResult<String> {
    let kid = verify::root_kid(token, scratch);
    scratch.zeroize();
    kid
}
