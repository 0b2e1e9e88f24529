use std::fmt;

use subtle::ConstantTimeEq;

/// Static shared-secret credentials guarding operational endpoints.
///
/// There is exactly one configured username/password pair. Both halves are
/// compared in constant time, and both comparisons always run.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a presented username/password pair against the configured one.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_matches = ct_eq(self.username.as_bytes(), username.as_bytes());
        let password_matches = ct_eq(self.password.as_bytes(), password.as_bytes());

        username_matches & password_matches
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn ct_eq(expected: &[u8], presented: &[u8]) -> bool {
    // length is not secret
    if expected.len() != presented.len() {
        return false;
    }
    expected.ct_eq(presented).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matching_pair() {
        let credentials = BasicCredentials::new("admin", "s3cret");
        assert!(credentials.verify("admin", "s3cret"));
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let credentials = BasicCredentials::new("admin", "s3cret");

        assert!(!credentials.verify("admin", "wrong"));
        assert!(!credentials.verify("root", "s3cret"));
        assert!(!credentials.verify("admin", "s3cret "));
        assert!(!credentials.verify("", ""));
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = BasicCredentials::new("admin", "s3cret");
        assert!(!format!("{:?}", credentials).contains("s3cret"));
    }
}
