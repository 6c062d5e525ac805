use thiserror::Error;

/// Error type for authentication operations.
///
/// `InvalidCredentials` deliberately covers every way a login can fail
/// (unknown username, wrong password, malformed username) so the outcome
/// carries no enumeration signal. `Unauthenticated` plays the same role for
/// token-protected access.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
