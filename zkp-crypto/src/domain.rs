/*!
Curve-domain parameters for the blinding transform.

A [`CurveDomain`] fixes the NIST P-256 curve (field prime `p`, group order `n` and base point
`G`, all supplied by the `p256` crate) together with the long-term public point `Q` of one
credential issuer. Both protocol roles derive the challenge base

```text
Gnew = z·G + r·Q
```

from the same `(z, r)` commitment through [`CurveDomain::commitment_base`], which is what binds
the two legs of the exchange together.
*/
use crate::common::*;
use ff::{Field, PrimeField};

/// The modulus under which the signature scalar `s` is inverted to form the blinding factor.
///
/// Textbook ECDSA inverts modulo the group order `n`. Deployed reference vectors for this
/// transform invert modulo the field prime `p`, so that is the default; the two choices
/// produce different `(R, S)` pairs and are not interoperable with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InversionModulus {
    /// Invert modulo the field prime `p`.
    #[default]
    FieldPrime,
    /// Invert modulo the group order `n`.
    GroupOrder,
}

/// Fixed P-256 parameters bound to a single issuer public key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    issuer_key: ProjectivePoint,
    inversion_modulus: InversionModulus,
}

impl CurveDomain {
    /// Build the domain for the given issuer public key, inverting modulo the field prime.
    pub fn new(issuer_key: &PublicKey) -> Self {
        Self {
            issuer_key: issuer_key.to_projective(),
            inversion_modulus: InversionModulus::default(),
        }
    }

    /// Build the domain from a SEC1-encoded (compressed or uncompressed) issuer public key.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let issuer_key = PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::InvalidPoint)?;
        Ok(Self::new(&issuer_key))
    }

    /// Replace the modulus used to invert `s`.
    pub fn with_inversion_modulus(self, inversion_modulus: InversionModulus) -> Self {
        Self {
            inversion_modulus,
            ..self
        }
    }

    /// The issuer's long-term public point `Q`.
    pub fn issuer_key(&self) -> ProjectivePoint {
        self.issuer_key
    }

    /// The modulus used to invert `s`.
    pub fn inversion_modulus(&self) -> InversionModulus {
        self.inversion_modulus
    }

    /**
    Compute the challenge base `Gnew = z·G + r·Q` for a digest `z` and signature component `r`.

    The digest is read as a big-endian integer of any length (mdoc digests are whole MSO byte
    strings) and reduced modulo `n`. `r` must be a canonical field element.

    Fails if the digest is empty, if `r ≥ p`, or if the sum is the identity.
    */
    pub fn commitment_base(
        &self,
        digest: &[u8],
        r: &[u8; SCALAR_LENGTH],
    ) -> Result<ProjectivePoint, Error> {
        if digest.is_empty() {
            return Err(Error::EmptyDigest);
        }
        let z = reduce_be_bytes(digest);
        let r = field_scalar(r)?;

        non_identity(ProjectivePoint::GENERATOR * z + self.issuer_key * r)
    }

    /// Invert the signature scalar `s` under this domain's [`InversionModulus`], returning the
    /// blinding factor as a scalar of the group.
    pub fn blinding_factor(&self, s: &[u8; SCALAR_LENGTH]) -> Result<Scalar, Error> {
        let inverse = match self.inversion_modulus {
            InversionModulus::FieldPrime => {
                let s: Option<FieldElement> = FieldElement::from_bytes(&field_bytes(s)).into();
                let s = s.ok_or(Error::ScalarOutOfRange)?;
                let inverse: Option<FieldElement> = s.invert().into();
                // s⁻¹ mod p is in [1, p); multiplying a point by it only depends on its class
                // mod n.
                reduce_be_bytes(&inverse.ok_or(Error::ZeroScalar)?.to_bytes())
            }
            InversionModulus::GroupOrder => {
                let s: Option<Scalar> = Scalar::from_repr(field_bytes(s)).into();
                let s = s.ok_or(Error::ScalarOutOfRange)?;
                let inverse: Option<Scalar> = Field::invert(&s).into();
                inverse.ok_or(Error::ZeroScalar)?
            }
        };
        Ok(inverse)
    }
}

fn field_bytes(bytes: &[u8; SCALAR_LENGTH]) -> FieldBytes {
    FieldBytes::from(*bytes)
}

/// Read a 32-byte big-endian value that must be smaller than the field prime, as a group
/// scalar.
fn field_scalar(bytes: &[u8; SCALAR_LENGTH]) -> Result<Scalar, Error> {
    let in_field: bool = FieldElement::from_bytes(&field_bytes(bytes))
        .is_some()
        .into();
    if in_field {
        Ok(reduce_be_bytes(bytes))
    } else {
        Err(Error::ScalarOutOfRange)
    }
}
