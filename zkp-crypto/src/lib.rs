//! This crate implements the arithmetic behind unlinkable presentations of ECDSA signatures
//! over NIST P-256:
//! - Curve-domain parameters bound to a single issuer public key.
//! - A blinding transform that replaces an issuer signature `(r, s)` with a pair of
//!   compressed points `(R, S)` bound to a verifier challenge.
//! - Single-use ephemeral challenge keys and the check that closes the exchange.
//!
//! Every operation is a pure function of its inputs and an explicit [`CurveDomain`]; the only
//! source of randomness is the [`Rng`] handed to [`challenge::issue_challenge`].

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod challenge;
pub mod domain;
pub mod signature;
pub mod transform;

mod serde;

pub use crate::domain::{CurveDomain, InversionModulus};
pub use crate::serde::SerializeElement;
pub use crate::signature::{BlindedSignature, CompressedPoint, SignatureParts};

use thiserror::*;

/// Byte length of a P-256 scalar or field element.
pub const SCALAR_LENGTH: usize = 32;

/// Byte length of a SEC1-compressed P-256 point.
pub const COMPRESSED_POINT_LENGTH: usize = 33;

/// Error types that may arise from cryptographic operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Caused by a concatenated signature field that cannot be split into two equal halves.
    #[error("signature field has odd length ({0})")]
    OddSignatureLength(usize),
    /// Caused by a signature scalar (`r` or `s`) that is not exactly the curve's scalar size.
    #[error("expected a {expected}-byte scalar, got {got}")]
    ScalarLength {
        /// The scalar size of the curve.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// Caused by a blinded signature half that is not exactly a compressed point.
    #[error("expected a {expected}-byte compressed point, got {got}")]
    PointLength {
        /// The compressed point size of the curve.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// Caused by an empty digest.
    #[error("digest must not be empty")]
    EmptyDigest,
    /// Caused by attempting to invert a zero scalar.
    #[error("cannot invert a zero scalar")]
    ZeroScalar,
    /// Caused by a scalar that is not smaller than the modulus it is interpreted under.
    #[error("scalar is out of range for its modulus")]
    ScalarOutOfRange,
    /// Caused by bytes that do not encode a point on the curve.
    #[error("bytes do not encode a valid compressed curve point")]
    InvalidPoint,
    /// Caused by an intermediate point collapsing to the identity; the input signature is
    /// degenerate.
    #[error("point arithmetic produced the identity")]
    IdentityPoint,
}

/// The result of a verification of some property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the result of a verification should always be checked"]
pub enum Verification {
    /// A verification succeeded.
    Verified,
    /// A verification failed.
    Failed,
}

impl Verification {
    /// Returns `true` iff the verification succeeded.
    pub fn is_verified(self) -> bool {
        matches!(self, Verification::Verified)
    }
}

impl From<bool> for Verification {
    fn from(b: bool) -> Self {
        if b {
            Verification::Verified
        } else {
            Verification::Failed
        }
    }
}

impl From<Verification> for bool {
    fn from(verification: Verification) -> Self {
        verification.is_verified()
    }
}

mod common {
    //! Common types used internally.

    pub use crate::{Error, Verification, COMPRESSED_POINT_LENGTH, SCALAR_LENGTH};
    pub use group::{Group, GroupEncoding};
    pub use p256::{
        elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
        AffinePoint, EncodedPoint, FieldBytes, FieldElement, NonZeroScalar, ProjectivePoint,
        PublicKey, Scalar,
    };

    /// A trait synonym for a cryptographically secure random number generator. This trait is
    /// blanket-implemented for all valid types and will never need to be implemented by-hand.
    pub trait Rng: rand_core::CryptoRng + rand_core::RngCore {}
    impl<T: rand_core::CryptoRng + rand_core::RngCore> Rng for T {}

    /// Interpret `bytes` as a big-endian unsigned integer of any length and reduce it modulo
    /// the group order.
    pub fn reduce_be_bytes(bytes: &[u8]) -> Scalar {
        let radix = Scalar::from(256u64);
        bytes.iter().fold(Scalar::ZERO, |acc, byte| {
            acc * radix + Scalar::from(u64::from(*byte))
        })
    }

    /// Reject the identity, which never encodes as a compressed point.
    pub fn non_identity(point: ProjectivePoint) -> Result<ProjectivePoint, Error> {
        if bool::from(point.is_identity()) {
            Err(Error::IdentityPoint)
        } else {
            Ok(point)
        }
    }
}

pub use common::Rng;
