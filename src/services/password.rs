//! Argon2id hashing for account passwords.
//!
//! Both operations are CPU-heavy and run on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::services::error::AuthError;

/// Argon2 cost parameters taken from [`SecurityConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl From<&SecurityConfig> for PasswordPolicy {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            memory_cost_kib: config.argon2_memory_cost_kib,
            time_cost: config.argon2_time_cost,
            parallelism: config.argon2_parallelism,
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl PasswordPolicy {
    fn hasher(self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_cost_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| AuthError::Infrastructure(format!("Invalid Argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt.
    pub async fn hash(self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            self.hasher()?
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::Infrastructure(format!("Failed to hash password: {e}")))
        })
        .await?
    }
}

/// Verify a password against a stored PHC string. The parameters encoded in
/// the hash are used, so hashes made under older policies still verify.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool, AuthError> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash).map_err(|e| {
            AuthError::Infrastructure(format!("Invalid password hash format: {e}"))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await?
}
