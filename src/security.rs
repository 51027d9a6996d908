//! Credential hygiene for upstream API clients
//! Auth material never appears in debug output or logs

use base64::{engine::general_purpose, Engine as _};
use zeroize::Zeroize;

/// A string wrapper that never exposes its value in debug output.
/// Used for pre-built Authorization header values.
pub struct SecureString {
    value: String,
}

impl SecureString {
    /// Create a new SecureString from a String (takes ownership)
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get reference to the inner string
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the actual value in debug output
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Build a Basic auth header value from user and token.
/// The intermediate `user:token` string is zeroed before returning.
pub fn basic_auth_header(user: &str, token: &str) -> SecureString {
    let mut auth = format!("{}:{}", user, token);
    let header = SecureString::new(format!("Basic {}", general_purpose::STANDARD.encode(&auth)));
    auth.zeroize();
    header
}

/// Build a Bearer auth header value from a raw token.
pub fn bearer_auth_header(token: &str) -> SecureString {
    SecureString::new(format!("Bearer {}", token))
}
