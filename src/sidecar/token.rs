//! Compact HS256 tokens.
//!
//! A token is `header.payload.signature`, each part base64url without padding.
//! The header is always `{"alg":"HS256","typ":"JWT"}` and the signature is
//! HMAC-SHA256 over `header.payload` with the shared secret.

use base64::prelude::*;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Reasons a request is not authorized.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// No Authorization header was sent
    #[error("Token is missing")]
    MissingToken,

    /// The header is not `Bearer <token>`
    #[error("Invalid Authorization header format")]
    MalformedHeader,

    /// Wrong signature, algorithm or encoding
    #[error("Token is invalid")]
    Invalid,

    /// The token's `exp` has passed
    #[error("Token has expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Payload carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Tenant the token was issued for
    pub owner_id: String,
    /// Operation the token authorizes
    pub action: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: i64,
}

fn mac(secret: &[u8]) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Invalid)
}

fn encode_part<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|_| TokenError::Invalid)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::Invalid)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Invalid)
}

/// Signs `claims` with `secret`.
pub fn sign(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let signing_input = format!("{}.{}", encode_part(&header)?, encode_part(claims)?);

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Checks signature and expiry and returns the claims.
///
/// A token whose `exp` is at or before `now` is expired.
pub fn verify(token: &str, secret: &[u8], now: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Invalid);
    };

    let decoded_header: Header = decode_part(header)?;
    if decoded_header.alg != ALGORITHM {
        return Err(TokenError::Invalid);
    }

    let signature = BASE64_URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Invalid)?;
    let mut mac = mac(secret)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::Invalid)?;

    let claims: Claims = decode_part(payload)?;
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

/// Extracts the token from an `Authorization` header value.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::MissingToken)?;
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const SECRET: &[u8] = b"test-shared-secret";
    const NOW: i64 = 1_700_000_000;

    fn claims(exp: i64) -> Claims {
        Claims {
            owner_id: "test_user".to_string(),
            action: "validate_students".to_string(),
            exp,
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let token = sign(&claims(NOW + 60), SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));

        let verified = verify(&token, SECRET, NOW).unwrap();
        assert_eq!(verified, claims(NOW + 60));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = sign(&claims(NOW + 60), SECRET).unwrap();
        assert_eq!(verify(&token, b"another-secret", NOW), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let token = sign(&claims(NOW + 60), SECRET).unwrap();
        let forged = sign(
            &Claims {
                owner_id: "intruder".to_string(),
                ..claims(NOW + 60)
            },
            SECRET,
        )
        .unwrap();

        // Payload from one token, signature from the other
        let original: Vec<&str> = token.split('.').collect();
        let swapped: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", original[0], swapped[1], original[2]);
        assert_eq!(verify(&spliced, SECRET, NOW), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = sign(&claims(NOW), SECRET).unwrap();
        assert_eq!(verify(&token, SECRET, NOW), Err(TokenError::Expired));
        assert!(verify(&token, SECRET, NOW - 1).is_ok());
    }

    #[test]
    fn test_garbage_is_invalid() {
        for bad in ["", "abc", "a.b", "a.b.c", "a.b.c.d", "..."] {
            assert_eq!(verify(bad, SECRET, NOW), Err(TokenError::Invalid), "{bad:?}");
        }
    }

    #[test]
    fn test_other_algorithm_is_invalid() {
        let header = encode_part(&Header {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })
        .unwrap();
        let payload = encode_part(&claims(NOW + 60)).unwrap();
        let token = format!("{header}.{payload}.");
        assert_eq!(verify(&token, SECRET, NOW), Err(TokenError::Invalid));
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(parse_bearer(Some("bearer   xyz")), Ok("xyz"));
        assert_eq!(parse_bearer(None), Err(TokenError::MissingToken));
        assert_eq!(parse_bearer(Some("")), Err(TokenError::MalformedHeader));
        assert_eq!(parse_bearer(Some("Token abc")), Err(TokenError::MalformedHeader));
        assert_eq!(parse_bearer(Some("Bearer")), Err(TokenError::MalformedHeader));
        assert_eq!(parse_bearer(Some("Bearer a b")), Err(TokenError::MalformedHeader));
    }
}
