use rand::{rngs::OsRng, RngCore};

/// Opaque single-use token for email verification and password reset flows.
///
/// 32 random bytes, hex-encoded. The token carries no structure; which
/// column it lands in decides what it is for.
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_opaque_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_distinct_per_call() {
        let a = generate_opaque_token();
        let b = generate_opaque_token();
        assert_ne!(a, b);
    }
}
