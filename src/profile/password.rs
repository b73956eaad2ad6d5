use crate::error::{AppError, AppResult};

use anyhow::Context;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use entrait::entrait;

/// Warning: This should not implement Debug in production
#[derive(Clone, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[serde(transparent)]
pub struct CleartextPassword(pub String);

impl<S: Into<String>> From<S> for CleartextPassword {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for CleartextPassword {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl CleartextPassword {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Argon2 PHC string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PasswordHash(pub String);

impl<S: Into<String>> From<S> for PasswordHash {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[entrait(pub HashPassword, no_deps, mock_api=HashPasswordMock)]
async fn hash_password(password: CleartextPassword) -> AppResult<PasswordHash> {
    // Argon2 hashing is designed to be computationally intensive,
    // so we need to do this on a blocking thread.
    tokio::task::spawn_blocking(move || -> AppResult<PasswordHash> {
        let salt = SaltString::generate(rand::thread_rng());
        Ok(Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to generate password hash: {}", e))?
            .to_string()
            .into())
    })
    .await
    .context("panic when generating password hash")?
}

#[entrait(pub VerifyPassword, no_deps, mock_api=VerifyPasswordMock)]
async fn verify_password(password: CleartextPassword, password_hash: PasswordHash) -> AppResult<()> {
    tokio::task::spawn_blocking(move || -> AppResult<()> {
        let hash = argon2::PasswordHash::new(&password_hash.0)
            .map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;

        Argon2::default()
            .verify_password(password.0.as_bytes(), &hash)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => AppError::InvalidCredentials,
                _ => anyhow::anyhow!("failed to verify password hash: {}", e).into(),
            })
    })
    .await
    .context("panic when verifying password hash")??;

    Ok(())
}
