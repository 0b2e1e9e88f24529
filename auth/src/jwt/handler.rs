use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Identity asserted by a token that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub issuer: String,
}

/// JWT token handler: signs and verifies session tokens.
///
/// Uses HS256 (HMAC with SHA-256). Verification enforces the signature, the
/// configured issuer and the expiry, with no clock leeway.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `issuer` - Issuer written into, and required from, every token
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
        }
    }

    /// Sign a token for `subject`, valid for `ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.encode(&Claims::for_subject(subject, &self.issuer, ttl))
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return the identity it asserts.
    ///
    /// # Errors
    /// * `Malformed` - Not a JWT, bad encoding, or a required claim is missing
    /// * `InvalidSignature` - Signed with another key
    /// * `InvalidIssuer` - Issued by someone else
    /// * `TokenExpired` - Past its `exp`
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, JwtError> {
        let claims = self.decode(token)?;

        Ok(VerifiedToken {
            subject: claims.sub,
            issuer: claims.iss,
        })
    }

    /// Decode and validate a JWT token.
    ///
    /// # Errors
    /// Same as [`JwtHandler::verify`]
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                    _ => JwtError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_sign_and_verify() {
        let handler = JwtHandler::new(SECRET, "directory");

        let token = handler
            .sign("user123", Duration::hours(1))
            .expect("Failed to sign token");
        assert!(!token.is_empty());

        let verified = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(verified.subject, "user123");
        assert_eq!(verified.issuer, "directory");
    }

    #[test]
    fn test_verify_malformed_token() {
        let handler = JwtHandler::new(SECRET, "directory");

        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!", "directory");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!", "directory");

        let token = handler1
            .sign("user123", Duration::hours(1))
            .expect("Failed to sign token");

        assert_eq!(handler2.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_expired_token() {
        let handler = JwtHandler::new(SECRET, "directory");

        let token = handler
            .sign("user123", Duration::seconds(-30))
            .expect("Failed to sign token");

        assert_eq!(handler.verify(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_verify_foreign_issuer() {
        let ours = JwtHandler::new(SECRET, "directory");
        let theirs = JwtHandler::new(SECRET, "somebody-else");

        let token = theirs
            .sign("user123", Duration::hours(1))
            .expect("Failed to sign token");

        assert_eq!(ours.verify(&token), Err(JwtError::InvalidIssuer));
    }
}
