/*!
Single-use verifier challenges and the check that closes the exchange.

## Issue

Given the prover's commitment `(z, r)`, the verifier computes the challenge base
`Gnew = z·G + r·Q` (see [`CurveDomain::commitment_base`]), draws a fresh scalar `e` uniformly
from `[1, n-1]` and publishes `E = e·Gnew` as the [`EphemeralPublicKey`]. The matching
[`EphemeralSecret`] never leaves the verifier.

## Verify

The prover answers with a [`BlindedSignature`] `(R, S)`. The verifier accepts iff `e·R = S`.
[`EphemeralSecret::verify`] consumes the secret, so a challenge can be checked at most once;
reusing `e` across presentations would make them linkable.

Note that `e·R = S` holds for *any* blinding factor applied consistently to `Gnew` and `E`.
On its own it shows that `(R, S)` was derived from the agreed `Gnew`, not that the prover
holds a genuine issuer signature; binding to the issuer rests on the verifier recomputing the
digest from the disclosed content.
*/
use crate::{common::*, signature::BlindedSignature, CurveDomain, SerializeElement};
use serde::*;
use zeroize::Zeroize;

/// The public half of a verifier challenge, `E = e·Gnew`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralPublicKey(#[serde(with = "SerializeElement")] PublicKey);

impl EphemeralPublicKey {
    /// Decode an ephemeral public key from its SEC1 encoding (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidPoint)
    }

    /// Encode the key as a compressed SEC1 point.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_LENGTH] {
        let mut buf = [0; COMPRESSED_POINT_LENGTH];
        buf.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        buf
    }

    /// The key as a curve point.
    pub fn to_point(&self) -> ProjectivePoint {
        self.0.to_projective()
    }
}

impl From<PublicKey> for EphemeralPublicKey {
    fn from(key: PublicKey) -> Self {
        Self(key)
    }
}

/// The secret half of a verifier challenge, the scalar `e`.
///
/// Not `Clone`, not serializable, and wiped on drop.
pub struct EphemeralSecret(NonZeroScalar);

impl EphemeralSecret {
    /**
    Check a [`BlindedSignature`] returned for this challenge, consuming the secret.

    Returns [`Verification::Failed`] if `e·R ≠ S`. Returns an error only if `R` or `S` does
    not decode to a curve point, so a malformed answer can be told apart from a rejected one.
    */
    pub fn verify(self, signature: &BlindedSignature) -> Result<Verification, Error> {
        let r = signature.r.decode()?;
        let s = signature.s.decode()?;
        Ok(Verification::from(r * *self.0 == s))
    }

    /// Rebuild a secret from its big-endian scalar encoding. This is not part of the public API
    /// and may change between releases; it exists to replay recorded challenges in tests.
    #[doc(hidden)]
    pub fn from_be_bytes(bytes: &[u8; SCALAR_LENGTH]) -> Result<Self, Error> {
        let scalar: Option<NonZeroScalar> =
            NonZeroScalar::from_repr(FieldBytes::from(*bytes)).into();
        scalar.map(Self).ok_or(Error::ScalarOutOfRange)
    }
}

impl Drop for EphemeralSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for EphemeralSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EphemeralSecret(<redacted>)")
    }
}

/// A freshly issued challenge: the key to send to the prover and the secret to keep.
#[derive(Debug)]
pub struct EphemeralKeyPair {
    /// Sent to the prover.
    pub public_key: EphemeralPublicKey,
    /// Kept by the verifier until the answer arrives.
    pub secret: EphemeralSecret,
}

impl EphemeralKeyPair {
    /// Split the pair into the key to publish and the secret to retain.
    pub fn into_parts(self) -> (EphemeralPublicKey, EphemeralSecret) {
        (self.public_key, self.secret)
    }
}

/**
Issue a challenge for the commitment `(digest, r)`.

The digest and `r` are those the prover committed to; they are typically decoded from a
`ChallengeRequest` received over the wire.

Fails under the same conditions as [`CurveDomain::commitment_base`].
*/
pub fn issue_challenge(
    rng: &mut impl Rng,
    domain: &CurveDomain,
    digest: &[u8],
    r: &[u8; SCALAR_LENGTH],
) -> Result<EphemeralKeyPair, Error> {
    let base = domain.commitment_base(digest, r)?;
    let secret = NonZeroScalar::random(&mut *rng);

    // Gnew has prime order and e ≠ 0, so e·Gnew is never the identity.
    let public_key = PublicKey::from_affine(AffinePoint::from(base * *secret))
        .map_err(|_| Error::IdentityPoint)?;

    Ok(EphemeralKeyPair {
        public_key: EphemeralPublicKey(public_key),
        secret: EphemeralSecret(secret),
    })
}
