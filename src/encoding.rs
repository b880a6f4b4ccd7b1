use crate::utils::sha256;
use num_bigint::BigUint;

/// Encode a raw attribute value into the decimal form that is signed.
///
/// Values that parse as a 32-bit signed integer are encoded as themselves so
/// predicates can be evaluated over them. All other values are encoded as the
/// big-endian SHA-256 digest of their UTF-8 bytes, written in decimal.
pub fn encode_attribute(raw: &str) -> String {
    match raw.parse::<i32>() {
        Ok(n) => n.to_string(),
        Err(_) => BigUint::from_bytes_be(&sha256(raw.as_bytes())).to_string(),
    }
}

/// Check that `encoded` is the encoding of `raw`
pub fn is_encoding_of(raw: &str, encoded: &str) -> bool {
    encode_attribute(raw) == encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_hash_to_known_values() {
        assert_eq!(
            encode_attribute("maths"),
            "78137204873448776862705240258723141940757006710839733585634143215803847410018"
        );
        assert_eq!(
            encode_attribute("05-2018"),
            "101085817956371643310471822530712840836446570298192279302750234554843339322886"
        );
        assert_eq!(
            encode_attribute("alice"),
            "19831138297880367962895005496563562590284654704047651305948751287370224856720"
        );
    }

    #[test]
    fn integers_encode_as_themselves() {
        assert_eq!(encode_attribute("25"), "25");
        assert_eq!(encode_attribute("-7"), "-7");
        assert!(is_encoding_of("25", "25"));
        assert!(!is_encoding_of("25", "26"));
    }

    #[test]
    fn nonces_are_decimal() {
        let nonce = crate::random_nonce(rand::thread_rng());
        assert!(!nonce.is_empty());
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(BigUint::from_bytes_be(&[1, 0]).to_string(), "256");
    }
}
