//! The prover's first message.
use crate::{encoding, Error, Extracted};
use serde::*;
use std::convert::TryFrom;
use zkp_crypto::SCALAR_LENGTH;

/// The commitment a prover sends to open an exchange: the digest the issuer signed and the `r`
/// half of the issuer signature, each as base64url text without padding.
///
/// The `s` half never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    /// The digest `z`.
    pub digest: String,
    /// The signature component `r`.
    pub r: String,
}

impl ChallengeRequest {
    /// Encode a commitment to `digest` and `r`.
    pub fn new(digest: &[u8], r: &[u8; SCALAR_LENGTH]) -> Self {
        Self {
            digest: encoding::encode(digest),
            r: encoding::encode(r),
        }
    }

    pub(crate) fn from_extracted(extracted: &Extracted) -> Self {
        Self::new(&extracted.digest, extracted.signature.r())
    }

    /// Decode the digest bytes. Fails if the text is not base64url or decodes to nothing.
    pub fn decode_digest(&self) -> Result<Vec<u8>, Error> {
        let digest = encoding::decode("digest", &self.digest)?;
        if digest.is_empty() {
            return Err(zkp_crypto::Error::EmptyDigest.into());
        }
        Ok(digest)
    }

    /// Decode `r`. Fails if the text is not base64url or does not decode to exactly
    /// [`SCALAR_LENGTH`] bytes.
    pub fn decode_r(&self) -> Result<[u8; SCALAR_LENGTH], Error> {
        let r = encoding::decode("r", &self.r)?;
        <[u8; SCALAR_LENGTH]>::try_from(r.as_slice()).map_err(|_| {
            zkp_crypto::Error::ScalarLength {
                expected: SCALAR_LENGTH,
                got: r.len(),
            }
            .into()
        })
    }
}
