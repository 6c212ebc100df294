//! Utilities for serializing and deserializing `zkp_crypto` types using Serde.
//!
//! [`SerializeElement`] looks like a "module" to Serde and can be used with the `#[serde(with =
//! "SerializeElement")]` syntax to add serialization/deserialization to `p256` point types,
//! which otherwise do not provide `Serialize` and `Deserialize` implementations in the form we
//! want on the wire.
//!
//! Points always travel as 33-byte SEC1-compressed encodings. Deserialization checks that the
//! bytes decode to a point on the curve; the identity is rejected both ways.
//!
//! Scalars are deliberately not covered: no secret scalar ever leaves the process.

use crate::{common::*, signature::CompressedPoint};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

/// Serialization/deserialization functionality for external `p256` types.
pub trait SerializeElement: Sized {
    /// Proxy serialization function telling serde how to serialize the implementing type.
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer;

    /// Proxy deserialization function telling serde how to deserialize the implementing type.
    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

impl SerializeElement for ProjectivePoint {
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CompressedPoint::encode(this)
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }

    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let point = CompressedPoint::deserialize(deserializer)?
            .decode()
            .map_err(de::Error::custom)?;
        non_identity(point).map_err(de::Error::custom)
    }
}

impl SerializeElement for PublicKey {
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        <ProjectivePoint as SerializeElement>::serialize(&this.to_projective(), serializer)
    }

    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let point = <ProjectivePoint as SerializeElement>::deserialize(deserializer)?;
        PublicKey::from_affine(point.into())
            .map_err(|_| de::Error::custom("invalid element encoding"))
    }
}
