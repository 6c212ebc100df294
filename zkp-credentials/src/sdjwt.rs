/*!
SD-JWT credentials.

An SD-JWT is an issuer-signed compact JWT `header.payload.signature`, optionally followed by
`~`-separated disclosures and a key-binding JWT. Only the issuer JWT is read or rewritten; the
disclosures and key-binding JWT are carried through untouched.

The issuer signed `header.payload` with ES256, so the digest is the SHA-256 hash of that string
and the signature segment is the base64url encoding of the raw `r‖s` pair. A presented
credential carries `base64url(R‖S)` in the same segment.
*/
use crate::{codec::*, encoding, types::*, Error};
use sha2::{Digest, Sha256};

/// The [`CredentialCodec`] for SD-JWT credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdJwtCodec;

/// A compact SD-JWT split at its issuer JWT.
#[derive(Debug, Clone, Copy)]
struct Compact<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
    /// Everything from the first `~` on, or the empty string.
    disclosures: &'a str,
}

impl<'a> Compact<'a> {
    fn parse(credential: &'a str) -> Result<Self, Error> {
        let issuer_jwt_end = credential.find('~').unwrap_or(credential.len());
        let (jwt, disclosures) = credential.split_at(issuer_jwt_end);
        let parts: Vec<&str> = jwt.split('.').collect();
        match parts[..] {
            [header, payload, signature] => Ok(Self {
                header,
                payload,
                signature,
                disclosures,
            }),
            _ => Err(Error::MalformedJwt(parts.len())),
        }
    }

    fn digest(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.header.as_bytes());
        hasher.update(b".");
        hasher.update(self.payload.as_bytes());
        hasher.finalize().to_vec()
    }

    fn signature_bytes(&self) -> Result<Vec<u8>, Error> {
        encoding::decode("signature", self.signature)
    }

    fn with_signature(&self, signature: &str) -> String {
        format!("{}.{}.{}{}", self.header, self.payload, signature, self.disclosures)
    }
}

impl CredentialCodec for SdJwtCodec {
    fn extract(&self, credential: &str) -> Result<Extracted, Error> {
        let compact = Compact::parse(credential)?;
        Ok(Extracted {
            digest: compact.digest(),
            signature: SignatureParts::from_concatenated(&compact.signature_bytes()?)?,
        })
    }

    fn replace(&self, credential: &str, signature: &BlindedSignature) -> Result<String, Error> {
        let compact = Compact::parse(credential)?;
        Ok(compact.with_signature(&encoding::encode(signature.to_bytes())))
    }

    fn presented_signature(&self, credential: &str) -> Result<BlindedSignature, Error> {
        let compact = Compact::parse(credential)?;
        Ok(BlindedSignature::from_concatenated(&compact.signature_bytes()?)?)
    }

    fn reencode(&self, credential: &str) -> Result<String, Error> {
        let compact = Compact::parse(credential)?;
        Ok(compact.with_signature(compact.signature))
    }
}
