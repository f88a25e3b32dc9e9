//! bcrypt password hashing.
//!
//! Hashing and verification are CPU-bound; callers run them on the
//! blocking pool.

use std::sync::OnceLock;

const DECOY_PASSWORD: &str = "random-rhythms-decoy";

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Debug)]
pub struct PasswordHasher {
    cost: u32,
    decoy: OnceLock<String>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: OnceLock::new(),
        }
    }

    /// Hash a password with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(password, self.cost)
    }

    /// Check a password against a stored hash. Unreadable hashes never verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        bcrypt::verify(password, stored).unwrap_or(false)
    }

    /// Spend one full verification on a throwaway hash, so a lookup miss
    /// takes as long as a wrong password.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| bcrypt::hash(DECOY_PASSWORD, self.cost).unwrap_or_default());
        let _ = bcrypt::verify(password, decoy);
    }

    #[cfg(test)]
    pub(crate) fn decoy_ready(&self) -> bool {
        self.decoy.get().is_some()
    }
}
