use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const NONCE_LEN: usize = 12;

/// Sealed contents of a token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    id: String,
    issued_at: i64,
}

/// Stateless anti-forgery tokens.
///
/// A token is the URL-safe base64 of `nonce || AES-256-GCM(claims)`, where
/// the claims name the intent the token was issued for and when. Nothing is
/// stored server-side; possession of the key is what makes a token valid.
pub struct CsrfTokens {
    cipher: Aes256Gcm,
    ttl: Duration,
}

impl CsrfTokens {
    /// Create from a base64-encoded 32-byte key.
    pub fn new(key_base64: &str, ttl_secs: u64) -> Result<Self, CsrfError> {
        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(key_base64)
            .map_err(|_| CsrfError::InvalidKey)?;

        if key_bytes.len() != 32 {
            return Err(CsrfError::InvalidKey);
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes).map_err(|_| CsrfError::InvalidKey)?;

        Ok(Self {
            cipher,
            ttl: ttl(ttl_secs),
        })
    }

    /// Create with a key generated for this process. Tokens do not survive
    /// a restart.
    pub fn ephemeral(ttl_secs: u64) -> Self {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        Self {
            cipher: Aes256Gcm::new(&key),
            ttl: ttl(ttl_secs),
        }
    }

    pub fn issue(&self, token_id: &str) -> Result<String, CsrfError> {
        self.issue_at(token_id, Utc::now())
    }

    pub fn verify(&self, token_id: &str, token: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token_id, token, Utc::now())
    }

    fn issue_at(&self, token_id: &str, now: DateTime<Utc>) -> Result<String, CsrfError> {
        let claims = TokenClaims {
            id: token_id.to_string(),
            issued_at: now.timestamp(),
        };
        let plaintext = serde_json::to_vec(&claims).map_err(|_| CsrfError::IssueFailed)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| CsrfError::IssueFailed)?;

        let mut sealed = nonce.to_vec();
        sealed.extend(ciphertext);
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(sealed))
    }

    fn verify_at(
        &self,
        token_id: &str,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(CsrfError::Missing)?;

        let sealed = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CsrfError::Malformed)?;
        if sealed.len() <= NONCE_LEN {
            return Err(CsrfError::Malformed);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CsrfError::Forged)?;

        let claims: TokenClaims =
            serde_json::from_slice(&plaintext).map_err(|_| CsrfError::Malformed)?;

        if claims.id != token_id {
            return Err(CsrfError::WrongIntent);
        }

        let issued_at = DateTime::from_timestamp(claims.issued_at, 0).ok_or(CsrfError::Malformed)?;
        if now - issued_at > self.ttl {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }
}

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("Invalid CSRF key (must be 32 bytes, base64-encoded)")]
    InvalidKey,

    #[error("CSRF token could not be issued")]
    IssueFailed,

    #[error("CSRF token missing")]
    Missing,

    #[error("CSRF token malformed")]
    Malformed,

    #[error("CSRF token was not issued by this server")]
    Forged,

    #[error("CSRF token was issued for a different form")]
    WrongIntent,

    #[error("CSRF token expired")]
    Expired,
}
