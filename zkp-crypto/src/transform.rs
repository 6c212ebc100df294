/*!
The blinding transform run by the prover.

Given the digest `z` the issuer signed, the issuer signature `(r, s)` and the verifier's
ephemeral public key `E`, the prover computes the blinding factor `sInv = s⁻¹` (under the
domain's [`InversionModulus`](crate::InversionModulus)) and answers with

```text
R = sInv·(z·G + r·Q)
S = sInv·E
```

Only `(R, S)` leaves the prover; the original `s` is never disclosed, and since `E` is fresh
for every challenge, no two answers share a value.
*/
use crate::{
    challenge::EphemeralPublicKey,
    common::*,
    signature::{BlindedSignature, CompressedPoint, SignatureParts},
    CurveDomain,
};

/// Replace `signature` with a [`BlindedSignature`] bound to `ephemeral_key`.
///
/// Fails if `s` is zero or out of range for the inversion modulus, if `r` is not a field
/// element, if the digest is empty, or if any intermediate point is the identity.
pub fn blind_signature(
    domain: &CurveDomain,
    digest: &[u8],
    signature: &SignatureParts,
    ephemeral_key: &EphemeralPublicKey,
) -> Result<BlindedSignature, Error> {
    let blinding_factor = domain.blinding_factor(signature.s())?;
    let base = domain.commitment_base(digest, signature.r())?;

    Ok(BlindedSignature {
        r: CompressedPoint::encode(&(base * blinding_factor))?,
        s: CompressedPoint::encode(&(ephemeral_key.to_point() * blinding_factor))?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::challenge::issue_challenge;
    use rand::thread_rng;

    fn issuer() -> CurveDomain {
        let secret = NonZeroScalar::random(&mut thread_rng());
        CurveDomain::new(&PublicKey::from_secret_scalar(&secret))
    }

    fn some_signature() -> SignatureParts {
        let mut r = [0x42; 32];
        r[0] = 0x01;
        let mut s = [0x17; 32];
        s[0] = 0x02;
        SignatureParts::new(r, s)
    }

    #[test]
    fn transform_answers_its_challenge() {
        let domain = issuer();
        let signature = some_signature();
        let (public_key, secret) =
            issue_challenge(&mut thread_rng(), &domain, b"digest", signature.r())
                .unwrap()
                .into_parts();

        let blinded = blind_signature(&domain, b"digest", &signature, &public_key).unwrap();
        assert!(secret.verify(&blinded).unwrap().is_verified());
    }

    #[test]
    fn transform_fails_a_different_digest() {
        let domain = issuer();
        let signature = some_signature();
        let (public_key, secret) =
            issue_challenge(&mut thread_rng(), &domain, b"digest", signature.r())
                .unwrap()
                .into_parts();

        let blinded = blind_signature(&domain, b"other", &signature, &public_key).unwrap();
        assert_eq!(secret.verify(&blinded), Ok(Verification::Failed));
    }

    #[test]
    fn zero_s_is_rejected() {
        let domain = issuer();
        let (public_key, _) = issue_challenge(&mut thread_rng(), &domain, b"digest", &[1; 32])
            .unwrap()
            .into_parts();
        let signature = SignatureParts::new([1; 32], [0; 32]);
        assert_eq!(
            blind_signature(&domain, b"digest", &signature, &public_key),
            Err(Error::ZeroScalar)
        );
    }

    #[test]
    fn empty_digest_is_rejected() {
        let domain = issuer();
        let (public_key, _) = issue_challenge(&mut thread_rng(), &domain, b"digest", &[1; 32])
            .unwrap()
            .into_parts();
        assert_eq!(
            blind_signature(&domain, &[], &some_signature(), &public_key),
            Err(Error::EmptyDigest)
        );
    }
}
