use jsonwebtoken::Algorithm;

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Shared secret for signing and verifying player tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Lifetime of minted access tokens, in seconds
    pub token_ttl_secs: i64,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl_secs: 60 * 60,
        }
    }

    pub fn with_token_ttl_secs(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Random secret, so tokens from one test never verify in another.
    pub fn for_tests() -> Self {
        Self::new(format!("test-secret-{}", uuid::Uuid::new_v4()).into_bytes())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
