use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordError;

/// Hash a password on the blocking thread pool.
///
/// Argon2id with production parameters takes tens to hundreds of
/// milliseconds and must not stall the async executor.
pub(crate) async fn hash_password(
    authenticator: &Arc<Authenticator>,
    password: String,
) -> Result<String, PasswordError> {
    let authenticator = Arc::clone(authenticator);

    tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}

/// Verify a password on the blocking thread pool.
///
/// A verification task that fails to complete counts as a mismatch.
pub(crate) async fn verify_password(
    authenticator: &Arc<Authenticator>,
    password: String,
    stored_hash: String,
) -> bool {
    let authenticator = Arc::clone(authenticator);

    tokio::task::spawn_blocking(move || authenticator.verify_password(&password, &stored_hash))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            false
        })
}
