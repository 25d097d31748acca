//! Credential encoding and client-side validation
//!
//! A credential is `header.payload.signature`, each segment URL-safe base64
//! without padding. Only the payload is interpreted here. The signature is
//! never verified client-side, so a successful decode means "well-formed and
//! not yet expired", not "authentic". The remote service stays the authority.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
        DecodePaddingMode,
    },
    Engine,
};
use chrono::{DateTime, Utc};

use crate::claims::{CredentialHeader, TokenClaims};
use crate::error::AuthError;

/// Segment delimiter
pub const DELIMITER: char = '.';

const SIGNATURE_PLACEHOLDER: &str = "unsigned";

/// URL-safe alphabet; emits no padding, tolerates it on input
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode claims into a three-segment credential
pub fn encode(claims: &TokenClaims) -> String {
    let header = CredentialHeader::default();
    let header = serde_json::json!({ "alg": header.alg, "typ": header.typ });
    let payload = serde_json::json!({
        "id": claims.id,
        "email": claims.email,
        "role": claims.role,
        "exp": claims.exp,
    });

    format!(
        "{}{DELIMITER}{}{DELIMITER}{}",
        SEGMENT.encode(header.to_string()),
        SEGMENT.encode(payload.to_string()),
        SEGMENT.encode(SIGNATURE_PLACEHOLDER),
    )
}

/// Decode and check a credential against the current instant
pub fn decode(token: &str) -> Result<TokenClaims, AuthError> {
    decode_at(token, Utc::now())
}

/// Decode and check a credential against `now`
pub fn decode_at(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
    let segments: Vec<&str> = token.split(DELIMITER).collect();
    if segments.len() != 3 {
        tracing::debug!(segments = segments.len(), "Credential has wrong segment count");
        return Err(AuthError::InvalidCredentialFormat);
    }

    let payload = SEGMENT.decode(segments[1]).map_err(|e| {
        tracing::debug!(error = %e, "Credential payload is not base64");
        AuthError::InvalidCredentialFormat
    })?;

    let claims: TokenClaims = serde_json::from_slice(&payload).map_err(|e| {
        tracing::debug!(error = %e, "Credential payload is not well-formed claims");
        AuthError::InvalidCredentialFormat
    })?;

    if claims.is_expired_at(now) {
        tracing::debug!(user_id = %claims.id, exp = claims.exp, "Credential expired");
        return Err(AuthError::CredentialExpired);
    }

    Ok(claims)
}
