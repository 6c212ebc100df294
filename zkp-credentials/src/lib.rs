/*!
This crate describes a two-message protocol for presenting an ECDSA(P-256) signed credential
without handing the verifier the issuer's signature. It defines contextual types as wrappers for
the arithmetic in `zkp-crypto`.

The [`prover`] holds a credential (an SD-JWT or an ISO 18013-5 mdoc) and commits to its digest
and the `r` half of the issuer signature with a [`ChallengeRequest`]. The [`verifier`] answers
with a single-use [`EphemeralPublicKey`]. The prover then replaces the credential's signature
with a [`BlindedSignature`] bound to that key, and the verifier checks it with the
[`EphemeralSecret`] it kept.

Credentials are handled by one [`CredentialCodec`] per [`Format`]; the formats the protocol
recognizes but cannot transform fail with [`Error::FormatNotImplemented`].
*/
#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]
pub mod codec;
pub mod format;
pub mod mdoc;
pub mod prover;
pub mod request;
pub mod sdjwt;
pub mod verifier;

pub use codec::{CredentialCodec, Extracted};
pub use format::Format;
pub use request::ChallengeRequest;
pub use zkp_crypto::{
    challenge::{EphemeralKeyPair, EphemeralPublicKey, EphemeralSecret},
    BlindedSignature, CurveDomain, InversionModulus, Rng, SignatureParts, Verification,
};

mod cbor;
mod encoding;

#[allow(unused)]
mod types {
    pub use p256::PublicKey;
    pub use zkp_crypto::{
        challenge::{issue_challenge, EphemeralKeyPair, EphemeralPublicKey, EphemeralSecret},
        transform::blind_signature,
        BlindedSignature, CurveDomain, InversionModulus, SignatureParts, Verification,
    };
}

use thiserror::Error;

/// Broad classes of [`Error`], for callers that only need to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Text or bytes that could not be decoded: base64url, CBOR, or a field of the wrong size.
    Encoding,
    /// A well-encoded credential that does not have the expected shape.
    Structural,
    /// A value outside the curve's domain, or a signature algorithm this protocol cannot blind.
    Cryptographic,
    /// A credential format the protocol recognizes but cannot transform.
    Unimplemented,
}

/// Error types that may arise while presenting or checking a credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caused by text that is not valid base64url.
    #[error("`{0}` is not valid base64url")]
    InvalidBase64(&'static str),
    /// Caused by bytes that are not well-formed CBOR.
    #[error("invalid CBOR: {0}")]
    InvalidCbor(String),
    /// Caused by an issuer JWT that does not have exactly three dot-separated parts.
    #[error("expected a JWT with 3 dot-separated parts, found {0}")]
    MalformedJwt(usize),
    /// Caused by an mdoc whose issuer authentication is missing or malformed.
    #[error("malformed mdoc: {0}")]
    MalformedDocument(&'static str),
    /// Caused by an mdoc signed with an algorithm other than ES256.
    #[error("unsupported signature algorithm {0}; only ES256 can be presented")]
    UnsupportedAlgorithm(mdoc::Algorithm),
    /// Caused by a format identifier this crate does not know.
    #[error("unknown credential format `{0}`")]
    UnknownFormat(String),
    /// Caused by dispatching on a format whose transform is not built.
    #[error("credential format {0} is not implemented")]
    FormatNotImplemented(Format),
    /// Caused by the underlying curve arithmetic.
    #[error(transparent)]
    Crypto(#[from] zkp_crypto::Error),
}

impl Error {
    /// The broad class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use zkp_crypto::Error as CryptoError;

        match self {
            Error::InvalidBase64(_) | Error::InvalidCbor(_) | Error::UnknownFormat(_) => {
                ErrorKind::Encoding
            }
            Error::MalformedJwt(_) | Error::MalformedDocument(_) => ErrorKind::Structural,
            Error::UnsupportedAlgorithm(_) => ErrorKind::Cryptographic,
            Error::FormatNotImplemented(_) => ErrorKind::Unimplemented,
            Error::Crypto(
                CryptoError::OddSignatureLength(_)
                | CryptoError::ScalarLength { .. }
                | CryptoError::PointLength { .. }
                | CryptoError::EmptyDigest,
            ) => ErrorKind::Encoding,
            Error::Crypto(_) => ErrorKind::Cryptographic,
        }
    }
}
