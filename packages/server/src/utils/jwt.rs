use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a bearer credential was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    SuperAdmin,
    TenantAdmin,
    Participant,
}

/// JWT Claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,         // Admin or participant ID
    pub tid: Option<Uuid>, // Tenant ID, absent for super admins
    pub role: ActorRole,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a credential for `subject` that expires after `ttl`.
pub fn sign(
    secret: &str,
    subject: Uuid,
    tenant_id: Option<Uuid>,
    role: ActorRole,
    ttl: Duration,
) -> Result<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("token lifetime overflows"))?;

    let claims = Claims {
        sub: subject,
        tid: tenant_id,
        role,
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and expiry, then decode the claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
