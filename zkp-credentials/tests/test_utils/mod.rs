#![allow(dead_code)]

use ciborium::value::{Integer, Value};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::PublicKey;
use rand::SeedableRng;
use zkp_credentials::{prover, verifier};

// Seeded rng for replicable tests.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

pub const ISSUER_SECRET: &str = "6f853311fe9017149517dcb34c0dfe58515a70f25fa7689781df80d991333c9a";

pub const ES256: i64 = -7;
pub const ES384: i64 = -35;

pub fn issuer_key() -> SigningKey {
    SigningKey::from_slice(&hex::decode(ISSUER_SECRET).unwrap()).unwrap()
}

pub fn issuer_public_key() -> PublicKey {
    PublicKey::from(issuer_key().verifying_key())
}

pub fn prover() -> prover::Config {
    prover::Config::new(&issuer_public_key())
}

pub fn verifier() -> verifier::Config {
    verifier::Config::new(&issuer_public_key())
}

fn base64url(bytes: impl AsRef<[u8]>) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// An ES256 SD-JWT over `claims`, with one disclosure attached.
pub fn sd_jwt(claims: &str) -> String {
    let header = base64url(r#"{"alg":"ES256","typ":"vc+sd-jwt"}"#);
    let payload = base64url(claims);
    let signing_input = format!("{}.{}", header, payload);
    let signature: Signature = issuer_key().sign(signing_input.as_bytes());
    format!(
        "{}.{}~WyJzYWx0IiwiZ2l2ZW5fbmFtZSIsIkVyaWthIl0~",
        signing_input,
        base64url(signature.to_bytes())
    )
}

fn cbor(value: &Value) -> Vec<u8> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).unwrap();
    bytes
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// The issuer's COSE_Sign1 over a small mobile security object, signed with the issuer key and
/// labelled with `algorithm`.
pub fn issuer_auth(algorithm: i64) -> Value {
    let protected = cbor(&Value::Map(vec![(
        Value::Integer(Integer::from(1)),
        Value::Integer(Integer::from(algorithm)),
    )]));
    let mso = cbor(&Value::Map(vec![
        (text("version"), text("1.0")),
        (text("digestAlgorithm"), text("SHA-256")),
        (text("docType"), text("org.iso.18013.5.1.mDL")),
    ]));
    let payload = cbor(&Value::Tag(24, Box::new(Value::Bytes(mso))));

    let sig_structure = cbor(&Value::Array(vec![
        text("Signature1"),
        Value::Bytes(protected.clone()),
        Value::Bytes(vec![]),
        Value::Bytes(payload.clone()),
    ]));
    let signature: Signature = issuer_key().sign(&sig_structure);

    Value::Array(vec![
        Value::Bytes(protected),
        Value::Map(vec![(
            Value::Integer(Integer::from(33)),
            Value::Bytes(b"issuer certificate".to_vec()),
        )]),
        Value::Bytes(payload),
        Value::Bytes(signature.to_bytes().to_vec()),
    ])
}

pub fn document(issuer_auth: Value) -> Value {
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

pub fn device_response(document: Value) -> Value {
    Value::Map(vec![
        (text("version"), text("1.0")),
        (text("documents"), Value::Array(vec![document])),
        (text("status"), Value::Integer(Integer::from(0))),
    ])
}

/// Encode a CBOR value as mdoc credential text.
pub fn mdoc(value: &Value) -> String {
    base64url(cbor(value))
}
