// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Params, Scrypt,
};
use thiserror::Error;

/// Longest password the hasher accepts, in bytes
pub const MAX_PASSWORD_BYTES: usize = 128;

/// Default scrypt cost (`log2(N)`)
pub const DEFAULT_LOG_N: u8 = 15;

const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_OUTPUT_LEN: usize = 32;

/// Errors produced while hashing a password
#[derive(Error, Debug)]
pub enum HashError {
    #[error("password exceeds {max} bytes")]
    PasswordTooLong { max: usize },

    #[error("invalid scrypt cost: {0}")]
    InvalidCost(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Salted scrypt hashing.
///
/// The PHC string produced by [`PasswordHasher::hash`] embeds the salt and
/// the cost parameters, so verification needs nothing but the stored hash.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::new(DEFAULT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_OUTPUT_LEN)
                .unwrap_or_default(),
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost
    pub fn new(log_n: u8) -> Result<Self, HashError> {
        let params = Params::new(log_n, SCRYPT_R, SCRYPT_P, SCRYPT_OUTPUT_LEN)
            .map_err(|e| HashError::InvalidCost(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, HashError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::PasswordTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Any failure to parse or evaluate the hash counts as a mismatch.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        if plain.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }
}
