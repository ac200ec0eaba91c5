//! Authentication and correlation middleware

use axum::{
    body::Body,
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Caller context stored in request extensions: identity, the raw bearer
/// header (forwarded to the catalog), and the correlation id.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: String,
    pub auth_header: String,
    pub cid: String,
}

/// Auth middleware - extracts the caller identity from the bearer token.
///
/// Signature verification is the API gateway's job; this service only needs
/// the `email` claim carried in the token payload.
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?
        .to_string();

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?;

    let user = decode_email_claim(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid bearer token".to_string()))?;

    let cid = request
        .headers()
        .get("x-correlation-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(AuthContext {
        user,
        auth_header,
        cid,
    });

    Ok(next.run(request).await)
}

/// Extract the `email` claim from a JWT payload, without verifying the
/// signature.
fn decode_email_claim(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("email")?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn decodes_email_claim() {
        let token = token_with_payload(r#"{"email":"someone@example.com","iat":1}"#);
        assert_eq!(
            decode_email_claim(&token).as_deref(),
            Some("someone@example.com")
        );
    }

    #[test]
    fn rejects_token_without_email() {
        let token = token_with_payload(r#"{"sub":"abc"}"#);
        assert_eq!(decode_email_claim(&token), None);
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(decode_email_claim("not-a-jwt"), None);
        assert_eq!(decode_email_claim("a.%%%.c"), None);
        assert_eq!(decode_email_claim(""), None);
    }
}
