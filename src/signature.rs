use crate::error::Error;
use crate::VcxResult;
use blsful::*;
use log::debug;
use rand_core::{CryptoRng, RngCore};
use serde::{de::DeserializeOwned, Serialize};

/// The key an issuer signs credentials with
pub type SigningKey = SecretKey<Bls12381G2Impl>;

/// The published counterpart of a [`SigningKey`]
pub type VerificationKey = PublicKey<Bls12381G2Impl>;

/// New BLS keys w/G2 public keys
pub fn new_signing_key(rng: impl RngCore + CryptoRng) -> SigningKey {
    Bls12381G2::random_secret_key(rng)
}

/// The hex form of the public key for `key`, as anchored in credential definitions
pub fn verification_key(key: &SigningKey) -> VcxResult<String> {
    to_hex(&key.public_key())
}

/// Sign `payload`, returning the hex form of the signature
pub fn sign(key: &SigningKey, payload: &[u8]) -> VcxResult<String> {
    let signature = key
        .sign(SignatureSchemes::ProofOfPossession, payload)
        .map_err(|e| Error::CryptoVerification(format!("unable to sign: {}", e)))?;
    to_hex(&signature)
}

/// Check `signature` over `payload` against the hex encoded `verification_key`.
///
/// A signature that cannot be decoded does not verify. A key that cannot be
/// decoded is an error.
pub fn verify(verification_key: &str, payload: &[u8], signature: &str) -> VcxResult<bool> {
    let key: VerificationKey = from_hex(verification_key).map_err(|e| {
        Error::CryptoVerification(format!("invalid verification key: {}", e))
    })?;
    let signature: Signature<Bls12381G2Impl> = match from_hex(signature) {
        Ok(s) => s,
        Err(e) => {
            debug!("signature cannot be decoded: {}", e);
            return Ok(false);
        }
    };
    Ok(signature.verify(&key, payload).is_ok())
}

fn to_hex<T: Serialize>(value: &T) -> VcxResult<String> {
    serde_bare::to_vec(value)
        .map(hex::encode)
        .map_err(|e| Error::CryptoVerification(e.to_string()))
}

fn from_hex<T: DeserializeOwned>(value: &str) -> VcxResult<T> {
    let bytes = hex::decode(value).map_err(|e| Error::CryptoVerification(e.to_string()))?;
    serde_bare::from_slice(&bytes).map_err(|e| Error::CryptoVerification(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_need_the_signing_key() {
        let key = new_signing_key(rand::thread_rng());
        let other = new_signing_key(rand::thread_rng());
        let vk = verification_key(&key).unwrap();
        let sig = sign(&key, b"payload").unwrap();
        assert!(verify(&vk, b"payload", &sig).unwrap());
        assert!(!verify(&vk, b"tampered", &sig).unwrap());
        assert!(!verify(&verification_key(&other).unwrap(), b"payload", &sig).unwrap());

        let forged = sign(&other, b"payload").unwrap();
        assert!(!verify(&vk, b"payload", &forged).unwrap());
        assert!(!verify(&vk, b"payload", "not-a-signature").unwrap());
        assert!(verify("zz", b"payload", &sig).is_err());
    }
}
