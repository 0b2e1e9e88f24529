use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// Bytes of OS randomness behind every invitation token (256 bits).
const TOKEN_BYTES: usize = 32;

/// A freshly minted invitation token.
///
/// `plain` goes to the invitee exactly once and is never stored. `hash` is the
/// lookup key that gets persisted.
#[derive(Clone)]
pub struct IssuedToken {
    pub plain: String,
    pub hash: String,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plain", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Mints and hashes single-use invitation tokens.
///
/// The token already carries 256 bits of entropy, so a fast SHA-256 digest is
/// enough to turn it into a deterministic, unique lookup key.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvitationTokens;

impl InvitationTokens {
    pub fn new() -> Self {
        Self
    }

    /// Mint a new token from the OS random number generator.
    ///
    /// # Returns
    /// Hex-encoded plaintext token and its hex-encoded SHA-256 digest
    pub fn issue(&self) -> IssuedToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let plain = hex::encode(bytes);
        let hash = self.hash(&plain);

        IssuedToken { plain, hash }
    }

    /// Hash a plaintext token into its storage key.
    pub fn hash(&self, plain: &str) -> String {
        hex::encode(Sha256::digest(plain.as_bytes()))
    }
}
