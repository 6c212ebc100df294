/*!
Fixed-length signature representations.

An issuer signature arrives as a concatenated `r‖s` byte field and is decomposed into
[`SignatureParts`]. The blinding transform replaces it with a [`BlindedSignature`], the
concatenation `R‖S` of two compressed curve points, which is written back into the credential
in place of the original signature.

Neither type silently truncates or pads: a field of the wrong size is an error.
*/
use crate::common::*;
use serde::*;
use std::convert::TryFrom;

/// Split a concatenated signature field into two halves of equal length.
fn split_halves(bytes: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    if bytes.len() % 2 != 0 {
        return Err(Error::OddSignatureLength(bytes.len()));
    }
    Ok(bytes.split_at(bytes.len() / 2))
}

/// A decomposed ECDSA signature.
#[derive(Clone, PartialEq, Eq)]
#[allow(missing_copy_implementations)]
pub struct SignatureParts {
    r: [u8; SCALAR_LENGTH],
    s: [u8; SCALAR_LENGTH],
}

impl SignatureParts {
    /// Construct signature parts from two scalar byte strings.
    pub fn new(r: [u8; SCALAR_LENGTH], s: [u8; SCALAR_LENGTH]) -> Self {
        Self { r, s }
    }

    /// Split a raw `r‖s` signature field. Fails if the field has odd length or if either half
    /// is not exactly [`SCALAR_LENGTH`] bytes.
    pub fn from_concatenated(bytes: &[u8]) -> Result<Self, Error> {
        let (r, s) = split_halves(bytes)?;
        let scalar = |half: &[u8]| {
            <[u8; SCALAR_LENGTH]>::try_from(half).map_err(|_| Error::ScalarLength {
                expected: SCALAR_LENGTH,
                got: half.len(),
            })
        };
        Ok(Self::new(scalar(r)?, scalar(s)?))
    }

    /// The `r` component.
    pub fn r(&self) -> &[u8; SCALAR_LENGTH] {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &[u8; SCALAR_LENGTH] {
        &self.s
    }

    /// Encode as the raw concatenation `r‖s`.
    pub fn to_bytes(&self) -> [u8; 2 * SCALAR_LENGTH] {
        let mut buf = [0; 2 * SCALAR_LENGTH];
        buf[..SCALAR_LENGTH].copy_from_slice(&self.r);
        buf[SCALAR_LENGTH..].copy_from_slice(&self.s);
        buf
    }
}

// `s` must not reach logs.
impl std::fmt::Debug for SignatureParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureParts")
            .field("r", &self.r)
            .field("s", &"<redacted>")
            .finish()
    }
}

/// A SEC1-compressed curve point: one prefix byte followed by the 32-byte x-coordinate.
///
/// The bytes are kept as received; they are only decoded (and checked to lie on the curve)
/// by [`CompressedPoint::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedPoint(
    #[serde(with = "serde_big_array::BigArray")] [u8; COMPRESSED_POINT_LENGTH],
);

impl CompressedPoint {
    /// Compress a point. Fails on the identity, which has no compressed encoding.
    pub fn encode(point: &ProjectivePoint) -> Result<Self, Error> {
        let point = non_identity(*point)?;
        let encoded = AffinePoint::from(point).to_encoded_point(true);
        <[u8; COMPRESSED_POINT_LENGTH]>::try_from(encoded.as_bytes())
            .map(Self)
            .map_err(|_| Error::IdentityPoint)
    }

    /// Decode the point. Fails if the bytes are not a compressed encoding of a curve point.
    pub fn decode(&self) -> Result<ProjectivePoint, Error> {
        let encoded = EncodedPoint::from_bytes(self.0).map_err(|_| Error::InvalidPoint)?;
        if !encoded.is_compressed() {
            return Err(Error::InvalidPoint);
        }
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        point
            .map(ProjectivePoint::from)
            .ok_or(Error::InvalidPoint)
    }

    /// The raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_LENGTH] {
        &self.0
    }
}

impl From<[u8; COMPRESSED_POINT_LENGTH]> for CompressedPoint {
    fn from(bytes: [u8; COMPRESSED_POINT_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for CompressedPoint {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; COMPRESSED_POINT_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::PointLength {
                expected: COMPRESSED_POINT_LENGTH,
                got: bytes.len(),
            })
    }
}

/// A signature replaced by the blinding transform: the point pair `(R, S)`.
///
/// `R = s⁻¹·Gnew` and `S = s⁻¹·E`, where `Gnew` is the challenge base and `E` the verifier's
/// ephemeral public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedSignature {
    /// The blinded challenge base `R`.
    pub r: CompressedPoint,
    /// The blinded ephemeral key `S`.
    pub s: CompressedPoint,
}

impl BlindedSignature {
    /// Split a `R‖S` signature field. Fails if the field has odd length or if either half is
    /// not exactly [`COMPRESSED_POINT_LENGTH`] bytes.
    ///
    /// This does not check that the halves are curve points; see [`CompressedPoint::decode`].
    pub fn from_concatenated(bytes: &[u8]) -> Result<Self, Error> {
        let (r, s) = split_halves(bytes)?;
        Ok(Self {
            r: CompressedPoint::try_from(r)?,
            s: CompressedPoint::try_from(s)?,
        })
    }

    /// Encode as the concatenation `R‖S`.
    pub fn to_bytes(&self) -> [u8; 2 * COMPRESSED_POINT_LENGTH] {
        let mut buf = [0; 2 * COMPRESSED_POINT_LENGTH];
        buf[..COMPRESSED_POINT_LENGTH].copy_from_slice(self.r.as_bytes());
        buf[COMPRESSED_POINT_LENGTH..].copy_from_slice(self.s.as_bytes());
        buf
    }
}
