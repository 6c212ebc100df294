/*!
ISO 18013-5 mobile documents.

An mdoc credential travels as base64url-encoded CBOR: either a `DeviceResponse` as wallets
produce it (`documents[0].issuerSigned.issuerAuth`) or a bare `Document`
(`issuerSigned.issuerAuth`). The issuer signature lives in `issuerAuth`, a COSE_Sign1 structure

```text
[protected: bstr, unprotected: map, payload: bstr, signature: bstr]
```

whose payload is the mobile security object (MSO). The MSO bytes themselves are used as the
digest; they are not hashed again. Only ES256 signatures can be presented; any other algorithm
fails with [`Error::UnsupportedAlgorithm`].

Rewriting a credential touches the signature byte string and nothing else. The new signature
is spliced over the old one in the encoded document, so every other byte, including length
headers that are not in preferred serialization, is kept as the issuer wrote it.
*/
use crate::{cbor, codec::*, encoding, types::*, Error};
use ciborium::value::{Integer, Value};
use std::{fmt, ops::Range};

/// CBOR tag for a COSE_Sign1 structure.
const COSE_SIGN1_TAG: u64 = 18;

/// COSE header label of the signature algorithm.
const ALGORITHM_LABEL: i64 = 1;

/// A COSE signature algorithm, as declared in the protected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA over P-256 with SHA-256.
    Es256,
    /// ECDSA over P-384 with SHA-384.
    Es384,
    /// ECDSA over P-521 with SHA-512.
    Es512,
    /// EdDSA.
    EdDsa,
    /// Any other COSE algorithm identifier.
    Other(i64),
}

impl Algorithm {
    /// Look up a COSE algorithm identifier.
    pub fn from_cose(identifier: i64) -> Self {
        match identifier {
            -7 => Algorithm::Es256,
            -35 => Algorithm::Es384,
            -36 => Algorithm::Es512,
            -8 => Algorithm::EdDsa,
            other => Algorithm::Other(other),
        }
    }

    /// The COSE algorithm identifier.
    pub fn to_cose(self) -> i64 {
        match self {
            Algorithm::Es256 => -7,
            Algorithm::Es384 => -35,
            Algorithm::Es512 => -36,
            Algorithm::EdDsa => -8,
            Algorithm::Other(identifier) => identifier,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Es256 => f.write_str("ES256"),
            Algorithm::Es384 => f.write_str("ES384"),
            Algorithm::Es512 => f.write_str("ES512"),
            Algorithm::EdDsa => f.write_str("EdDSA"),
            Algorithm::Other(identifier) => write!(f, "COSE algorithm {}", identifier),
        }
    }
}

/// The issuer's COSE_Sign1 over the mobile security object.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerAuth {
    tagged: bool,
    protected: Vec<u8>,
    unprotected: Value,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl IssuerAuth {
    /// Read a COSE_Sign1 from its CBOR value, with or without tag 18.
    pub fn from_cbor(value: &Value) -> Result<Self, Error> {
        let (tagged, value) = match value {
            Value::Tag(COSE_SIGN1_TAG, inner) => (true, inner.as_ref()),
            Value::Tag(..) => return Err(Error::MalformedDocument("unexpected tag on issuerAuth")),
            untagged => (false, untagged),
        };

        match value {
            Value::Array(items) => match &items[..] {
                [
                    Value::Bytes(protected),
                    unprotected,
                    Value::Bytes(payload),
                    Value::Bytes(signature),
                ] => Ok(Self {
                    tagged,
                    protected: protected.clone(),
                    unprotected: unprotected.clone(),
                    payload: payload.clone(),
                    signature: signature.clone(),
                }),
                _ => Err(Error::MalformedDocument(
                    "issuerAuth is not a COSE_Sign1 with an attached payload",
                )),
            },
            _ => Err(Error::MalformedDocument("issuerAuth is not an array")),
        }
    }

    /// The CBOR value of this COSE_Sign1, tagged if it was read with a tag.
    pub fn to_cbor(&self) -> Value {
        let array = Value::Array(vec![
            Value::Bytes(self.protected.clone()),
            self.unprotected.clone(),
            Value::Bytes(self.payload.clone()),
            Value::Bytes(self.signature.clone()),
        ]);
        if self.tagged {
            Value::Tag(COSE_SIGN1_TAG, Box::new(array))
        } else {
            array
        }
    }

    /// The signature algorithm declared in the protected header.
    pub fn algorithm(&self) -> Result<Algorithm, Error> {
        let header = from_cbor_bytes(&self.protected)?;
        let entries = match &header {
            Value::Map(entries) => entries,
            _ => return Err(Error::MalformedDocument("protected header is not a map")),
        };
        let label = Value::Integer(Integer::from(ALGORITHM_LABEL));
        let algorithm = entries
            .iter()
            .find(|(key, _)| *key == label)
            .map(|(_, algorithm)| algorithm)
            .ok_or(Error::MalformedDocument("protected header has no algorithm"))?;

        match algorithm {
            Value::Integer(identifier) => i64::try_from(*identifier)
                .map(Algorithm::from_cose)
                .map_err(|_| Error::MalformedDocument("algorithm identifier out of range")),
            _ => Err(Error::MalformedDocument("algorithm is not an integer")),
        }
    }

    /// Fail with [`Error::UnsupportedAlgorithm`] unless the issuer signed with ES256.
    pub fn require_es256(&self) -> Result<(), Error> {
        match self.algorithm()? {
            Algorithm::Es256 => Ok(()),
            other => Err(Error::UnsupportedAlgorithm(other)),
        }
    }

    /// The raw bytes of the mobile security object.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Recover the digest and issuer signature. Fails unless the issuer signed with ES256.
    pub fn extract(&self) -> Result<Extracted, Error> {
        self.require_es256()?;
        Ok(Extracted {
            digest: self.payload.clone(),
            signature: SignatureParts::from_concatenated(&self.signature)?,
        })
    }

    /// A copy of this COSE_Sign1 carrying `signature` as `R‖S`.
    pub fn with_signature(&self, signature: &BlindedSignature) -> Self {
        Self {
            signature: signature.to_bytes().to_vec(),
            ..self.clone()
        }
    }

    /// Read the signature as a presented [`BlindedSignature`].
    pub fn presented_signature(&self) -> Result<BlindedSignature, Error> {
        Ok(BlindedSignature::from_concatenated(&self.signature)?)
    }
}

/// The top-level shape of an mdoc credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A `DeviceResponse`; the first entry of `documents` is presented.
    DeviceResponse,
    /// A single `Document`.
    Document,
}

/// A decoded mdoc credential.
///
/// Keeps the encoded bytes next to the decoded value; [`MdocCredential::encode`] returns those
/// bytes, with any replaced item spliced in.
#[derive(Debug, Clone, PartialEq)]
pub struct MdocCredential {
    bytes: Vec<u8>,
    root: Value,
    shape: Shape,
}

impl MdocCredential {
    /// Decode base64url CBOR text and detect its shape.
    pub fn decode(credential: &str) -> Result<Self, Error> {
        let credential = Self::from_bytes(encoding::decode("mdoc", credential)?)?;
        tracing::trace!(shape = ?credential.shape, "decoded mdoc");
        Ok(credential)
    }

    fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let root = from_cbor_bytes(&bytes)?;
        let shape = if field(&root, "documents").is_ok() {
            Shape::DeviceResponse
        } else if field(&root, "issuerSigned").is_ok() {
            Shape::Document
        } else {
            return Err(Error::MalformedDocument(
                "neither a DeviceResponse nor a Document",
            ));
        };
        Ok(Self { bytes, root, shape })
    }

    /// Encode as base64url CBOR text.
    pub fn encode(&self) -> String {
        encoding::encode(&self.bytes)
    }

    /// The shape detected on decoding.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The presented document's issuer authentication.
    pub fn issuer_auth(&self) -> Result<IssuerAuth, Error> {
        let document = match self.shape {
            Shape::DeviceResponse => first(field(&self.root, "documents")?)?,
            Shape::Document => &self.root,
        };
        IssuerAuth::from_cbor(field(field(document, "issuerSigned")?, "issuerAuth")?)
    }

    /// Replace the presented document's issuer authentication. Bytes outside `issuerAuth` are
    /// kept as they are; the new `issuerAuth` is written in preferred serialization.
    pub fn set_issuer_auth(&mut self, issuer_auth: &IssuerAuth) -> Result<(), Error> {
        let range = self.issuer_auth_range()?;
        self.splice(range, &to_cbor_bytes(&issuer_auth.to_cbor())?)
    }

    /// Replace the presented document's signature with `signature` as `R‖S`, leaving every other
    /// byte of the credential untouched.
    pub fn set_signature(&mut self, signature: &BlindedSignature) -> Result<(), Error> {
        let _ = self.issuer_auth()?;
        let issuer_auth = self.issuer_auth_range()?;
        let range = cbor::element(&self.bytes, issuer_auth.start, 3)?;
        self.splice(
            range,
            &to_cbor_bytes(&Value::Bytes(signature.to_bytes().to_vec()))?,
        )
    }

    fn issuer_auth_range(&self) -> Result<Range<usize>, Error> {
        let document = match self.shape {
            Shape::DeviceResponse => {
                cbor::first(&self.bytes, cbor::field(&self.bytes, 0, "documents")?.start)?
            }
            Shape::Document => 0..self.bytes.len(),
        };
        let issuer_signed = cbor::field(&self.bytes, document.start, "issuerSigned")?;
        cbor::field(&self.bytes, issuer_signed.start, "issuerAuth")
    }

    fn splice(&mut self, range: Range<usize>, item: &[u8]) -> Result<(), Error> {
        *self = Self::from_bytes(cbor::splice(&self.bytes, range, item))?;
        Ok(())
    }
}

/// The [`CredentialCodec`] for mdoc credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct MdocCodec;

impl CredentialCodec for MdocCodec {
    fn extract(&self, credential: &str) -> Result<Extracted, Error> {
        MdocCredential::decode(credential)?.issuer_auth()?.extract()
    }

    fn replace(&self, credential: &str, signature: &BlindedSignature) -> Result<String, Error> {
        let mut mdoc = MdocCredential::decode(credential)?;
        mdoc.set_signature(signature)?;
        Ok(mdoc.encode())
    }

    fn presented_signature(&self, credential: &str) -> Result<BlindedSignature, Error> {
        MdocCredential::decode(credential)?
            .issuer_auth()?
            .presented_signature()
    }

    fn reencode(&self, credential: &str) -> Result<String, Error> {
        Ok(MdocCredential::decode(credential)?.encode())
    }
}

fn from_cbor_bytes(bytes: &[u8]) -> Result<Value, Error> {
    let mut reader = bytes;
    let value: Value =
        ciborium::from_reader(&mut reader).map_err(|e| Error::InvalidCbor(e.to_string()))?;
    if !reader.is_empty() {
        return Err(Error::InvalidCbor(format!("{} trailing bytes", reader.len())));
    }
    Ok(value)
}

fn to_cbor_bytes(value: &Value) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).map_err(|e| Error::InvalidCbor(e.to_string()))?;
    Ok(bytes)
}

fn field<'a>(map: &'a Value, key: &'static str) -> Result<&'a Value, Error> {
    match map {
        Value::Map(entries) => entries
            .iter()
            .find(|(k, _)| matches!(k, Value::Text(k) if k == key))
            .map(|(_, v)| v)
            .ok_or(Error::MalformedDocument(key)),
        _ => Err(Error::MalformedDocument("expected a map")),
    }
}

fn field_mut<'a>(map: &'a mut Value, key: &'static str) -> Result<&'a mut Value, Error> {
    match map {
        Value::Map(entries) => entries
            .iter_mut()
            .find(|(k, _)| matches!(k, Value::Text(k) if k == key))
            .map(|(_, v)| v)
            .ok_or(Error::MalformedDocument(key)),
        _ => Err(Error::MalformedDocument("expected a map")),
    }
}

fn first(array: &Value) -> Result<&Value, Error> {
    match array {
        Value::Array(items) => items
            .first()
            .ok_or(Error::MalformedDocument("DeviceResponse has no documents")),
        _ => Err(Error::MalformedDocument("documents is not an array")),
    }
}

fn first_mut(array: &mut Value) -> Result<&mut Value, Error> {
    match array {
        Value::Array(items) => items
            .first_mut()
            .ok_or(Error::MalformedDocument("DeviceResponse has no documents")),
        _ => Err(Error::MalformedDocument("documents is not an array")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;
    use zkp_crypto::CompressedPoint;

    fn cbor(value: &Value) -> Vec<u8> {
        let mut bytes = Vec::new();
        ciborium::into_writer(value, &mut bytes).unwrap();
        bytes
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn protected(algorithm: i64) -> Vec<u8> {
        cbor(&Value::Map(vec![(
            Value::Integer(Integer::from(ALGORITHM_LABEL)),
            Value::Integer(Integer::from(algorithm)),
        )]))
    }

    fn cose_sign1(algorithm: i64, signature: Vec<u8>) -> Value {
        Value::Array(vec![
            Value::Bytes(protected(algorithm)),
            Value::Map(vec![(
                Value::Integer(Integer::from(33)),
                Value::Bytes(vec![0x30, 0x82]),
            )]),
            Value::Bytes(b"mobile security object".to_vec()),
            Value::Bytes(signature),
        ])
    }

    fn document(issuer_auth: Value) -> Value {
        Value::Map(vec![
            (text("docType"), text("org.iso.18013.5.1.mDL")),
            (
                text("issuerSigned"),
                Value::Map(vec![
                    (text("nameSpaces"), Value::Map(vec![])),
                    (text("issuerAuth"), issuer_auth),
                ]),
            ),
        ])
    }

    fn device_response(document: Value) -> Value {
        Value::Map(vec![
            (text("version"), text("1.0")),
            (text("documents"), Value::Array(vec![document])),
            (text("status"), Value::Integer(Integer::from(0))),
        ])
    }

    fn encoded(value: &Value) -> String {
        encoding::encode(cbor(value))
    }

    fn signature() -> Vec<u8> {
        let mut signature = vec![0x11; 32];
        signature.extend_from_slice(&[0x22; 32]);
        signature
    }

    fn generator_pair() -> BlindedSignature {
        let g = CompressedPoint::encode(&p256::ProjectivePoint::GENERATOR).unwrap();
        BlindedSignature { r: g, s: g }
    }

    #[test]
    fn algorithms_map_to_cose_identifiers() {
        for algorithm in [
            Algorithm::Es256,
            Algorithm::Es384,
            Algorithm::Es512,
            Algorithm::EdDsa,
            Algorithm::Other(-257),
        ] {
            assert_eq!(Algorithm::from_cose(algorithm.to_cose()), algorithm);
        }
        assert_eq!(Algorithm::Other(-257).to_string(), "COSE algorithm -257");
    }

    #[test]
    fn digest_is_the_raw_payload() {
        let credential = encoded(&device_response(document(cose_sign1(-7, signature()))));
        let extracted = MdocCodec.extract(&credential).unwrap();
        assert_eq!(extracted.digest, b"mobile security object".to_vec());
        assert_eq!(extracted.signature.r(), &[0x11; 32]);
        assert_eq!(extracted.signature.s(), &[0x22; 32]);
    }

    #[test]
    fn both_shapes_are_accepted() {
        let bare = document(cose_sign1(-7, signature()));
        let wrapped = device_response(bare.clone());

        let bare = MdocCredential::decode(&encoded(&bare)).unwrap();
        let wrapped = MdocCredential::decode(&encoded(&wrapped)).unwrap();
        assert_eq!(bare.shape(), Shape::Document);
        assert_eq!(wrapped.shape(), Shape::DeviceResponse);
        assert_eq!(bare.issuer_auth().unwrap(), wrapped.issuer_auth().unwrap());
    }

    #[test]
    fn tagged_issuer_auth_keeps_its_tag() {
        let tagged = Value::Tag(COSE_SIGN1_TAG, Box::new(cose_sign1(-7, signature())));
        let credential = encoded(&document(tagged));

        let replaced = MdocCodec.replace(&credential, &generator_pair()).unwrap();
        let issuer_auth = MdocCredential::decode(&replaced)
            .unwrap()
            .issuer_auth()
            .unwrap();
        assert!(matches!(issuer_auth.to_cbor(), Value::Tag(COSE_SIGN1_TAG, _)));
        assert_eq!(issuer_auth.presented_signature().unwrap(), generator_pair());
    }

    #[test]
    fn replace_changes_only_the_signature() {
        let original = device_response(document(cose_sign1(-7, signature())));
        let replaced = MdocCodec
            .replace(&encoded(&original), &generator_pair())
            .unwrap();

        let expected = device_response(document(cose_sign1(
            -7,
            generator_pair().to_bytes().to_vec(),
        )));
        assert_eq!(replaced, encoded(&expected));
    }

    #[test]
    fn untouched_credentials_reencode_identically() {
        for value in [
            device_response(document(cose_sign1(-7, signature()))),
            document(cose_sign1(-35, signature())),
        ] {
            let credential = encoded(&value);
            assert_eq!(MdocCodec.reencode(&credential).unwrap(), credential);
        }
    }

    /// A Document whose `docType` and protected header use long-form length headers.
    fn non_preferred_document() -> (Vec<u8>, Vec<u8>) {
        let mut prefix = vec![0xa2];
        prefix.extend_from_slice(&[0x67]);
        prefix.extend_from_slice(b"docType");
        prefix.extend_from_slice(&[0x78, 0x03]);
        prefix.extend_from_slice(b"mDL");
        prefix.extend_from_slice(&[0x6c]);
        prefix.extend_from_slice(b"issuerSigned");
        prefix.extend_from_slice(&[0xa1, 0x6a]);
        prefix.extend_from_slice(b"issuerAuth");
        prefix.extend_from_slice(&[0x84, 0x58, 0x03, 0xa1, 0x01, 0x26, 0xa0, 0x41, 0x00]);

        let mut bytes = prefix.clone();
        bytes.extend_from_slice(&[0x58, 0x40]);
        bytes.extend_from_slice(&signature());
        (prefix, bytes)
    }

    #[test]
    fn non_preferred_headers_survive_reencoding() {
        let (_, bytes) = non_preferred_document();
        let credential = encoding::encode(&bytes);
        assert_eq!(MdocCodec.reencode(&credential).unwrap(), credential);
    }

    #[test]
    fn replace_splices_over_the_signature_only() {
        let (prefix, bytes) = non_preferred_document();
        let replaced = MdocCodec
            .replace(&encoding::encode(&bytes), &generator_pair())
            .unwrap();

        let mut expected = prefix;
        expected.extend_from_slice(&[0x58, 0x42]);
        expected.extend_from_slice(&generator_pair().to_bytes());
        assert_eq!(replaced, encoding::encode(expected));
        assert_eq!(
            MdocCodec.presented_signature(&replaced).unwrap(),
            generator_pair()
        );
    }

    #[test]
    fn replace_needs_a_cose_sign1() {
        let short = document(Value::Array(vec![Value::Bytes(protected(-7))]));
        assert_eq!(
            MdocCodec
                .replace(&encoded(&short), &generator_pair())
                .unwrap_err()
                .kind(),
            ErrorKind::Structural
        );
    }

    #[test]
    fn other_algorithms_are_rejected_by_name() {
        let credential = encoded(&document(cose_sign1(-35, signature())));
        let error = MdocCodec.extract(&credential).unwrap_err();
        assert_eq!(error, Error::UnsupportedAlgorithm(Algorithm::Es384));
        assert_eq!(error.kind(), ErrorKind::Cryptographic);
        assert!(error.to_string().contains("ES384"));
    }

    #[test]
    fn presented_signature_does_not_check_the_algorithm() {
        let credential = encoded(&document(cose_sign1(
            -8,
            generator_pair().to_bytes().to_vec(),
        )));
        assert_eq!(
            MdocCodec.presented_signature(&credential).unwrap(),
            generator_pair()
        );
    }

    #[test]
    fn malformed_documents_are_structural_errors() {
        let missing = Value::Map(vec![(text("docType"), text("x"))]);
        let error = MdocCodec.extract(&encoded(&missing)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);

        let no_documents = Value::Map(vec![(text("documents"), Value::Array(vec![]))]);
        assert_eq!(
            MdocCodec.extract(&encoded(&no_documents)),
            Err(Error::MalformedDocument("DeviceResponse has no documents"))
        );

        let short = document(Value::Array(vec![Value::Bytes(protected(-7))]));
        assert_eq!(
            MdocCodec.extract(&encoded(&short)).unwrap_err().kind(),
            ErrorKind::Structural
        );
    }

    #[test]
    fn bad_cbor_is_an_encoding_error() {
        // A map header announcing one entry, followed by nothing.
        let truncated = encoding::encode([0xa1]);
        let error = MdocCodec.extract(&truncated).unwrap_err();
        assert!(matches!(error, Error::InvalidCbor(_)));
        assert_eq!(error.kind(), ErrorKind::Encoding);

        let mut trailing = cbor(&document(cose_sign1(-7, signature())));
        trailing.push(0x00);
        assert!(matches!(
            MdocCodec.extract(&encoding::encode(trailing)),
            Err(Error::InvalidCbor(_))
        ));

        assert_eq!(
            MdocCodec.extract("not base64!"),
            Err(Error::InvalidBase64("mdoc"))
        );
    }

    #[test]
    fn odd_signatures_are_rejected() {
        let credential = encoded(&document(cose_sign1(-7, vec![1; 63])));
        assert_eq!(
            MdocCodec.extract(&credential),
            Err(Error::Crypto(zkp_crypto::Error::OddSignatureLength(63)))
        );
    }
}
