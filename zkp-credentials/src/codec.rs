/*!
The capability every credential format provides to the protocol roles.

A codec reads the issuer's signing input and signature out of a credential, writes a
[`BlindedSignature`] back into the signature slot, and reads that blinded signature out again on
the verifier's side. Apart from the signature slot, a codec never changes a credential: running
[`CredentialCodec::reencode`] on an untouched credential returns it byte for byte.
*/
use crate::{types::*, Error};

/// What the prover commits to: the digest the issuer signed and the split issuer signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// The digest `z`, as the big-endian bytes fed to the curve arithmetic.
    pub digest: Vec<u8>,
    /// The issuer signature `(r, s)`.
    pub signature: SignatureParts,
}

/// Reads and rewrites the signature of one credential format.
pub trait CredentialCodec: Send + Sync + std::fmt::Debug {
    /// Recover the digest and issuer signature from a credential.
    fn extract(&self, credential: &str) -> Result<Extracted, Error>;

    /// Return the credential with its signature replaced by `signature`.
    fn replace(&self, credential: &str, signature: &BlindedSignature) -> Result<String, Error>;

    /// Read the signature slot of a presented credential as a [`BlindedSignature`].
    fn presented_signature(&self, credential: &str) -> Result<BlindedSignature, Error>;

    /// Decode the credential and encode it again without changing anything.
    fn reencode(&self, credential: &str) -> Result<String, Error>;
}
