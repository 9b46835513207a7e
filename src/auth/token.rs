// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Bearer tokens
//!
//! Issues and validates the signed tokens carried in the Authorization
//! header. A token is `base64(user_id:expiry)` joined by a dot to the hex
//! Ed25519 signature over that payload. The signing key lives in a key file
//! next to the database and is generated on first start.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, SECRET_KEY_LENGTH};

use crate::error::{Result, ShelfstockError};

/// Tokens outlive the login by five days
const TOKEN_TTL_SECS: i64 = 5 * 24 * 60 * 60;

const ERR_INVALID_TOKEN: &str = "invalid token";
const ERR_EXPIRED_TOKEN: &str = "token expired";

/// Token issuer/validator holding the server's signing key
#[derive(Clone)]
pub struct TokenService {
    signing_key: SigningKey,
}

impl TokenService {
    /// Fresh random key, used by tests and ephemeral setups
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut csprng),
        }
    }

    /// Load the signing key from a key file
    pub fn load(path: &Path) -> Result<Self> {
        let key_bytes = fs::read(path)
            .map_err(|e| ShelfstockError::Internal(format!("failed to read key file: {e}")))?;

        if key_bytes.len() != SECRET_KEY_LENGTH {
            return Err(ShelfstockError::Internal(format!(
                "invalid key file: expected {} bytes, got {}",
                SECRET_KEY_LENGTH,
                key_bytes.len()
            )));
        }

        let mut secret_bytes = [0u8; SECRET_KEY_LENGTH];
        secret_bytes.copy_from_slice(&key_bytes);

        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret_bytes),
        })
    }

    /// Load the key file, generating and saving a new key when missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ShelfstockError::Internal(format!("failed to create key directory: {e}"))
            })?;
        }

        let service = Self::generate();
        fs::write(path, service.signing_key.to_bytes())
            .map_err(|e| ShelfstockError::Internal(format!("failed to write key file: {e}")))?;

        // Key material is secret; owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms)
                .map_err(|e| ShelfstockError::Internal(format!("failed to chmod key file: {e}")))?;
        }

        Ok(service)
    }

    /// Issue a bearer token for a user
    pub fn issue(&self, user_id: i64) -> String {
        self.issue_with_expiry(user_id, Utc::now().timestamp() + TOKEN_TTL_SECS)
    }

    fn issue_with_expiry(&self, user_id: i64, expires_at: i64) -> String {
        let payload = format!("{user_id}:{expires_at}");
        let signature = self.signing_key.sign(payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            hex::encode(signature.to_bytes())
        )
    }

    /// Validate a bearer token, returning the user id it was issued for
    pub fn validate(&self, token: &str) -> Result<i64> {
        let (payload_b64, signature_hex) = token
            .split_once('.')
            .ok_or_else(|| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;

        let signature_bytes = hex::decode(signature_hex)
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;

        self.signing_key
            .verifying_key()
            .verify_strict(&payload, &signature)
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;

        let payload = String::from_utf8(payload)
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;
        let (user_id, expires_at) = payload
            .split_once(':')
            .ok_or_else(|| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;

        let expires_at: i64 = expires_at
            .parse()
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))?;
        if expires_at < Utc::now().timestamp() {
            return Err(ShelfstockError::unauthorized(ERR_EXPIRED_TOKEN));
        }

        user_id
            .parse()
            .map_err(|_| ShelfstockError::unauthorized(ERR_INVALID_TOKEN))
    }
}
