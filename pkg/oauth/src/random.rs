use base64::Engine as _;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use rand::Rng as _;

/// A source of cryptographically secure random values.
///
/// Most users will not implement this directly, use [`SecureRandom`]
/// (the default) or a mock implementation for testing.
///
/// # Example
/// ```
/// use oauth::RandomSource;
///
/// struct MockRandom;
///
/// impl RandomSource for MockRandom {
///     fn base64_url(_len: usize) -> String {
///         "dGVzdA".to_string()
///     }
/// }
/// ```
pub trait RandomSource: Send + Sync + 'static {
    /// Returns a random base64-url string (no padding).
    fn base64_url(num_bytes: usize) -> String;
}

/// Default cryptographically secure random generator using the thread-local OS-seeded rng.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandom;

impl RandomSource for SecureRandom {
    fn base64_url(num_bytes: usize) -> String {
        let random_bytes: Vec<u8> = (0..num_bytes).map(|_| rand::rng().random()).collect();
        BASE64_URL_SAFE_NO_PAD.encode(&random_bytes)
    }
}

#[cfg(feature = "mock")]
pub mod mock {
    use super::*;

    /// Mock random generator for testing.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct MockRandom;

    impl RandomSource for MockRandom {
        fn base64_url(_: usize) -> String {
            "secret-encoded".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_random_base64_url() {
        let a = SecureRandom::base64_url(32);
        let b = SecureRandom::base64_url(32);

        assert_ne!(a, b);
        assert_eq!(BASE64_URL_SAFE_NO_PAD.decode(&a).unwrap().len(), 32);
        assert!(!a.contains('='));
    }
}
