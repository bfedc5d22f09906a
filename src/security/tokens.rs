use rand::RngCore;
use subtle::ConstantTimeEq;

/// Random hex secret of `bytes` bytes, used for generated JWT secrets.
pub fn generate_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Constant-time comparison for setup tokens.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_hex_and_unique() {
        let a = generate_secret(32);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_secret(32));
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc"));
        assert!(!tokens_match("abc123", ""));
    }
}
