use rand::SeedableRng;
use zkp_crypto::CurveDomain;

// Seeded rng for replicable tests.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

/// Issuer key pair shared with the reference vectors (P-256, PKCS#8 in the fixtures of the
/// interoperating implementations).
pub const ISSUER_SECRET: &str = "6f853311fe9017149517dcb34c0dfe58515a70f25fa7689781df80d991333c9a";
pub const ISSUER_PUBLIC: &str = "04b05bbe365d4d5ef0bc44cfc85e25cbbbc31503b5fb9974f7267bdbe6e1f12bfe\
                                 496718b4c2acc6435d4a8d9bd417c16d73fa0603359d3e64f0184839643dbdde";

pub fn issuer_domain() -> CurveDomain {
    CurveDomain::from_sec1_bytes(&hex::decode(ISSUER_PUBLIC).unwrap()).unwrap()
}
