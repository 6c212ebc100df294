//! Walks one SD-JWT presentation from issuance to verification.
//!
//! Run with `RUST_LOG=zkp_credentials=debug` to see the protocol events.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::PublicKey;
use rand::thread_rng;
use tracing_subscriber::EnvFilter;
use zkp_credentials::{prover, verifier, Format};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // The issuer signs a credential for the holder.
    let issuer = SigningKey::random(&mut thread_rng());
    let issuer_key = PublicKey::from(issuer.verifying_key());
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256","typ":"vc+sd-jwt"}"#);
    let payload = URL_SAFE_NO_PAD.encode(r#"{"iss":"https://issuer.example","age_over_18":true}"#);
    let signing_input = format!("{}.{}", header, payload);
    let signature: Signature = issuer.sign(signing_input.as_bytes());
    let credential = format!(
        "{}.{}~",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    );

    let holder = prover::Config::new(&issuer_key);
    let relying_party = verifier::Config::new(&issuer_key);

    // Holder -> relying party: commitment to the credential.
    let request = holder.create_challenge_request(Format::SdJwt, &credential)?;
    println!("request:   {}", serde_json::to_string(&request)?);

    // Relying party -> holder: a single-use challenge.
    let (challenge, secret) = relying_party
        .create_challenge(&mut thread_rng(), &request)?
        .into_parts();

    // Holder -> relying party: the credential with a blinded signature.
    let presented = holder.answer_challenge(Format::SdJwt, &credential, &challenge)?;
    println!("original:  {}", credential);
    println!("presented: {}", presented);

    let verification = relying_party.verify(Format::SdJwt, &presented, secret)?;
    println!("verified:  {}", verification.is_verified());
    Ok(())
}
