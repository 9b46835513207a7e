// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Password digests
//!
//! Argon2id with a random per-password salt. The digest string is the only
//! thing the user store ever sees; verification never reconstructs the
//! plain text.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{Result, ShelfstockError};

/// Hash a clear-text password into a salted argon2 digest string
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| ShelfstockError::Internal(format!("password hashing failed: {e}")))?;

    Ok(digest.to_string())
}

/// Check a clear-text password against a stored digest
pub fn verify_password(plain: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| ShelfstockError::Internal(format!("stored password digest malformed: {e}")))?;

    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let digest = hash_password("hunter2").expect("Failed to hash");
        assert!(digest.starts_with("$argon2"));
        assert!(verify_password("hunter2", &digest).expect("Failed to verify"));
        assert!(!verify_password("hunter3", &digest).expect("Failed to verify"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("hunter2").expect("Failed to hash");
        let b = hash_password("hunter2").expect("Failed to hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(verify_password("hunter2", "not-a-digest").is_err());
    }
}
