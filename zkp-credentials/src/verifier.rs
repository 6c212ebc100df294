//! The relying party's side of a presentation: issue a single-use challenge for a prover's
//! commitment, then check the credential the prover returns.
//!
//! The check only shows that the returned signature was blinded against the agreed commitment.
//! Binding the presentation to content the issuer actually signed rests on the caller
//! recomputing the digest from the disclosed credential; see [`zkp_crypto::challenge`].

use crate::{mdoc::IssuerAuth, types::*, ChallengeRequest, Error, Format, Rng};

/// A verifier for presentations of credentials from one issuer.
///
/// Holds the issuer's public key and curve parameters; it is immutable and can be shared across
/// any number of concurrent exchanges. Each exchange keeps its own [`EphemeralSecret`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    domain: CurveDomain,
}

impl Config {
    /// A verifier for credentials signed by `issuer_key`.
    pub fn new(issuer_key: &PublicKey) -> Self {
        Self::from_domain(CurveDomain::new(issuer_key))
    }

    /// A verifier over explicit curve-domain parameters.
    pub fn from_domain(domain: CurveDomain) -> Self {
        Self { domain }
    }

    /// Replace the modulus the prover is expected to invert `s` under.
    pub fn with_inversion_modulus(self, inversion_modulus: InversionModulus) -> Self {
        Self::from_domain(self.domain.with_inversion_modulus(inversion_modulus))
    }

    /// The curve-domain parameters of this verifier.
    pub fn domain(&self) -> &CurveDomain {
        &self.domain
    }

    /**
    Issue a fresh challenge for a prover's commitment.

    Send the [`EphemeralPublicKey`] to the prover and keep the [`EphemeralSecret`] for exactly
    one call to [`Config::verify()`].

    Fails if the request's fields are not base64url, if `r` is not exactly 32 bytes or not a
    field element, or if the digest is empty.
    */
    pub fn create_challenge(
        &self,
        rng: &mut impl Rng,
        request: &ChallengeRequest,
    ) -> Result<EphemeralKeyPair, Error> {
        let digest = request.decode_digest()?;
        let r = request.decode_r()?;
        let pair = issue_challenge(rng, &self.domain, &digest, &r)?;
        tracing::debug!(digest_len = digest.len(), "issued challenge");
        Ok(pair)
    }

    /**
    Check a presented credential against the challenge whose secret is `secret`, consuming it.

    Returns [`Verification::Failed`] if the presentation does not answer this challenge. Returns
    an error if the format is not implemented or the presented signature cannot be decoded, so
    a malformed presentation is never mistaken for a rejected one.

    The signature algorithm of an mdoc is not checked here.
    */
    pub fn verify(
        &self,
        format: Format,
        credential: &str,
        secret: EphemeralSecret,
    ) -> Result<Verification, Error> {
        let signature = format.codec()?.presented_signature(credential)?;
        let verification = secret.verify(&signature)?;
        tracing::debug!(%format, verified = verification.is_verified(), "checked presentation");
        Ok(verification)
    }

    /// Check a presented mdoc issuer authentication, consuming `secret`.
    pub fn verify_issuer_auth(
        &self,
        issuer_auth: &IssuerAuth,
        secret: EphemeralSecret,
    ) -> Result<Verification, Error> {
        let verification = secret.verify(&issuer_auth.presented_signature()?)?;
        tracing::debug!(
            format = %Format::MsoMdoc,
            verified = verification.is_verified(),
            "checked presentation"
        );
        Ok(verification)
    }
}
