//! Session Token
//!
//! Cookie value `"{session_id}.{signature}"` where the signature is
//! HMAC-SHA256 of the session id, URL-safe base64 without padding.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &[u8], session_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(session_id.as_bytes());
    Some(mac)
}

/// Sign a session id for the cookie
pub fn sign(session_id: Uuid, secret: &[u8; 32]) -> AuthResult<String> {
    let session_id = session_id.to_string();
    let signature = mac(secret, &session_id)
        .ok_or_else(|| AuthError::Internal("Invalid session secret".to_string()))?
        .finalize()
        .into_bytes();
    Ok(format!("{}.{}", session_id, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a cookie value and return its session id
///
/// Any malformed or forged token is `None`.
pub fn verify(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
    let (session_id, signature_b64) = token.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    mac(secret, session_id)?.verify_slice(&signature).ok()?;
    session_id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_sign_then_verify() {
        let id = Uuid::new_v4();
        let token = sign(id, &SECRET).unwrap();
        assert_eq!(verify(&token, &SECRET), Some(id));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(Uuid::new_v4(), &SECRET).unwrap();
        assert_eq!(verify(&token, &[8u8; 32]), None);
    }

    #[test]
    fn test_tampered_id_rejected() {
        let token = sign(Uuid::new_v4(), &SECRET).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), sig);
        assert_eq!(verify(&forged, &SECRET), None);
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(verify("", &SECRET), None);
        assert_eq!(verify("no-dot", &SECRET), None);
        assert_eq!(verify("a.b.c", &SECRET), None);
        assert_eq!(verify("not-a-uuid.!!!", &SECRET), None);
    }
}
