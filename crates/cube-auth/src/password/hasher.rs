//! Password hashing and verification (MD5 hex or Argon2id).

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use md5::{Digest, Md5};

use cube_core::config::PasswordAlgorithm;
use cube_core::error::AppError;

/// Hashes new passwords with the configured algorithm and verifies
/// stored hashes of either shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    algorithm: PasswordAlgorithm,
}

impl PasswordHasher {
    /// Creates a hasher that uses `algorithm` for new hashes.
    pub fn new(algorithm: PasswordAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Algorithm applied by [`hash_password`](Self::hash_password).
    pub fn algorithm(&self) -> PasswordAlgorithm {
        self.algorithm
    }

    /// Hashes a plaintext password.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        match self.algorithm {
            PasswordAlgorithm::Md5 => Ok(md5_hex(password)),
            PasswordAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
            }
        }
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// PHC strings starting with `$argon2` are checked with Argon2; anything
    /// else is treated as an MD5 hex digest and compared ignoring case.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        if !hash.starts_with("$argon2") {
            return Ok(md5_hex(password).eq_ignore_ascii_case(hash.trim()));
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

fn md5_hex(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}
