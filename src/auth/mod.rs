//! Password hashing, JWT issue/verify and the bearer-token filter

pub mod filter;
pub mod jwt;
pub mod password;

pub use filter::{authenticate, with_auth, AuthUser};
pub use jwt::{Claims, JwtKeys, DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};

use thiserror::Error;

/// Errors that can occur while authenticating a request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header at all
    #[error("Access token required")]
    MissingToken,

    /// Signature, encoding, scheme or subject is wrong
    #[error("Invalid token")]
    InvalidToken,

    /// Signature is fine but `exp` has passed
    #[error("Token expired")]
    Expired,

    /// Token could not be produced
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    /// bcrypt failed (bad hash format, worker panicked, ...)
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
