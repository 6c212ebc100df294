/*!
The credential holder's side of a presentation.

## Request

The prover opens the exchange by committing to its credential. It calls
[`Config::create_challenge_request()`] to extract the digest the issuer signed and the `r` half
of the issuer signature, and sends the resulting [`ChallengeRequest`] to the verifier.

## Answer

On receiving the verifier's [`EphemeralPublicKey`], the prover calls
[`Config::answer_challenge()`]. This blinds the issuer signature against that key and returns
the credential with the blinded signature in place of the original one; nothing else in the
credential changes. The answer is bound to that one key, so answers to different verifiers (or
to the same verifier twice) share no signature value.

Callers that already hold a parsed mdoc [`IssuerAuth`] can run the same two steps with
[`Config::create_mdoc_challenge_request()`] and [`Config::answer_mdoc_challenge()`].
*/
use crate::{mdoc::IssuerAuth, types::*, ChallengeRequest, Error, Extracted, Format};

/// Keys and parameters a prover uses for every credential of one issuer.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    domain: CurveDomain,
}

impl Config {
    /// A prover for credentials signed by `issuer_key`.
    pub fn new(issuer_key: &PublicKey) -> Self {
        Self::from_domain(CurveDomain::new(issuer_key))
    }

    /// A prover over explicit curve-domain parameters.
    pub fn from_domain(domain: CurveDomain) -> Self {
        Self { domain }
    }

    /// Replace the modulus used to invert the issuer signature's `s`.
    pub fn with_inversion_modulus(self, inversion_modulus: InversionModulus) -> Self {
        Self::from_domain(self.domain.with_inversion_modulus(inversion_modulus))
    }

    /// The curve-domain parameters of this prover.
    pub fn domain(&self) -> &CurveDomain {
        &self.domain
    }

    /**
    Commit to a credential of the given format.

    Fails if the format is not implemented, if the credential cannot be decoded, or (for mdoc)
    if the issuer did not sign with ES256.
    */
    pub fn create_challenge_request(
        &self,
        format: Format,
        credential: &str,
    ) -> Result<ChallengeRequest, Error> {
        let extracted = format.codec()?.extract(credential)?;
        tracing::debug!(%format, digest_len = extracted.digest.len(), "created challenge request");
        Ok(ChallengeRequest::from_extracted(&extracted))
    }

    /**
    Answer a verifier's challenge for a credential of the given format, returning the credential
    with its issuer signature replaced by the blinded signature.

    Fails under the same conditions as [`Config::create_challenge_request()`], and if the issuer
    signature is degenerate (see [`blind_signature`](zkp_crypto::transform::blind_signature)).
    */
    pub fn answer_challenge(
        &self,
        format: Format,
        credential: &str,
        ephemeral_key: &EphemeralPublicKey,
    ) -> Result<String, Error> {
        let codec = format.codec()?;
        let blinded = self.blind(&codec.extract(credential)?, ephemeral_key)?;
        let presented = codec.replace(credential, &blinded)?;
        tracing::debug!(%format, "answered challenge");
        Ok(presented)
    }

    /// Commit to an mdoc issuer authentication. Fails unless the issuer signed with ES256.
    pub fn create_mdoc_challenge_request(
        &self,
        issuer_auth: &IssuerAuth,
    ) -> Result<ChallengeRequest, Error> {
        let extracted = issuer_auth.extract()?;
        tracing::debug!(
            format = %Format::MsoMdoc,
            digest_len = extracted.digest.len(),
            "created challenge request"
        );
        Ok(ChallengeRequest::from_extracted(&extracted))
    }

    /// Answer a verifier's challenge for an mdoc issuer authentication, returning a copy that
    /// carries the blinded signature. Fails unless the issuer signed with ES256.
    pub fn answer_mdoc_challenge(
        &self,
        issuer_auth: &IssuerAuth,
        ephemeral_key: &EphemeralPublicKey,
    ) -> Result<IssuerAuth, Error> {
        let blinded = self.blind(&issuer_auth.extract()?, ephemeral_key)?;
        tracing::debug!(format = %Format::MsoMdoc, "answered challenge");
        Ok(issuer_auth.with_signature(&blinded))
    }

    fn blind(
        &self,
        extracted: &Extracted,
        ephemeral_key: &EphemeralPublicKey,
    ) -> Result<BlindedSignature, Error> {
        Ok(blind_signature(
            &self.domain,
            &extracted.digest,
            &extracted.signature,
            ephemeral_key,
        )?)
    }
}
