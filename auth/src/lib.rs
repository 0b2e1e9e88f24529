//! Authentication utilities library
//!
//! Provides the credential primitives of the directory service:
//! - Password hashing (Argon2id)
//! - Session token signing and verification (JWT, HS256)
//! - Single-use invitation tokens (random, stored as SHA-256)
//! - Static shared-secret credentials for operational endpoints
//!
//! Services define their own ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::JwtHandler;
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", "directory");
//! let token = handler.sign("user123", Duration::hours(1)).unwrap();
//! let verified = handler.verify(&token).unwrap();
//! assert_eq!(verified.subject, "user123");
//! ```
//!
//! ## Invitation Tokens
//! ```
//! use auth::InvitationTokens;
//!
//! let tokens = InvitationTokens::new();
//! let issued = tokens.issue();
//! assert_eq!(tokens.hash(&issued.plain), issued.hash);
//! ```

pub mod authenticator;
pub mod basic;
pub mod invitation;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use basic::BasicCredentials;
pub use invitation::InvitationTokens;
pub use invitation::IssuedToken;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::VerifiedToken;
pub use password::PasswordError;
pub use password::PasswordHasher;
