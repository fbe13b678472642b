//! Client-side JWT claim decoding
//!
//! The signature is not verified: the backend does that on every request.
//! The client only needs the identity and roles to drive navigation.

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Identity decoded from the bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub roles: BTreeSet<String>,
    /// Set when an administrator created the account with a default password
    pub require_password_change: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|role| self.has_role(role))
    }

    /// Whether the token's `exp` is in the past. Tokens without `exp` never expire
    /// client-side.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    roles: Option<Value>,
    scope: Option<Value>,
    authorities: Option<Value>,
    #[serde(rename = "requirePasswordChange")]
    require_password_change: Option<Value>,
    /// NumericDate, which may be fractional
    exp: Option<Value>,
}

/// Decode the claims of `raw` into an [`AuthUser`].
///
/// Roles come from the `roles` array claim, falling back to a space-separated
/// `scope` string and then to a space-separated `authorities` string.
pub fn decode_token(raw: &str) -> Result<AuthUser> {
    let mut segments = raw.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        bail!("token is not a JWT (expected three dot-separated segments)");
    };
    if segments.next().is_some() {
        bail!("token is not a JWT (too many segments)");
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("token payload is not valid base64url")?;
    let claims: RawClaims =
        serde_json::from_slice(&bytes).context("token payload is not a JSON object")?;

    let username = claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or_else(|| anyhow!("token has no subject claim"))?;

    let roles = extract_roles(&claims.roles, &claims.scope, &claims.authorities);

    let expires_at = claims.exp.as_ref().and_then(numeric_date);

    Ok(AuthUser {
        username,
        roles,
        require_password_change: matches!(claims.require_password_change, Some(Value::Bool(true))),
        expires_at,
    })
}

/// Seconds since the epoch, truncated. Anything unusable is ignored since
/// expiry is informational only.
fn numeric_date(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value.as_i64() {
        Some(secs) => secs,
        None => {
            let secs = value.as_f64().filter(|f| f.is_finite())?;
            if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
                return None;
            }
            secs.trunc() as i64
        }
    };
    DateTime::<Utc>::from_timestamp(secs, 0)
}

fn extract_roles(
    roles: &Option<Value>,
    scope: &Option<Value>,
    authorities: &Option<Value>,
) -> BTreeSet<String> {
    if let Some(Value::Array(items)) = roles {
        return items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(Value::String(scope)) = scope {
        if !scope.trim().is_empty() {
            return split_roles(scope);
        }
    }
    if let Some(Value::String(authorities)) = authorities {
        return split_roles(authorities);
    }
    BTreeSet::new()
}

fn split_roles(value: &str) -> BTreeSet<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Build an unsigned token around `claims`. Used by tests and local tooling.
pub fn encode_unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_claim_array() {
        let token = encode_unsigned_token(&json!({
            "sub": "alice",
            "roles": ["ROLE_ADMIN", "ROLE_MANAGER"],
        }));
        let user = decode_token(&token).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.has_role("ROLE_ADMIN"));
        assert!(user.has_role("ROLE_MANAGER"));
        assert!(!user.require_password_change);
    }

    #[test]
    fn test_scope_fallback() {
        let token = encode_unsigned_token(&json!({
            "sub": "bob",
            "scope": "ROLE_EMPLOYEE  ROLE_MANAGER",
        }));
        let user = decode_token(&token).unwrap();
        assert_eq!(user.roles.len(), 2);
        assert!(user.has_any_role(["ROLE_EMPLOYEE"]));
    }

    #[test]
    fn test_authorities_fallback_when_scope_blank() {
        let token = encode_unsigned_token(&json!({
            "sub": "carol",
            "scope": "",
            "authorities": "ROLE_EMPLOYEE",
        }));
        let user = decode_token(&token).unwrap();
        assert_eq!(user.roles.iter().collect::<Vec<_>>(), vec!["ROLE_EMPLOYEE"]);
    }

    #[test]
    fn test_roles_array_wins_over_scope() {
        let token = encode_unsigned_token(&json!({
            "sub": "dave",
            "roles": ["ROLE_ADMIN"],
            "scope": "ROLE_EMPLOYEE",
        }));
        let user = decode_token(&token).unwrap();
        assert!(user.has_role("ROLE_ADMIN"));
        assert!(!user.has_role("ROLE_EMPLOYEE"));
    }

    #[test]
    fn test_no_role_claims() {
        let token = encode_unsigned_token(&json!({ "sub": "erin" }));
        assert!(decode_token(&token).unwrap().roles.is_empty());
    }

    #[test]
    fn test_password_change_flag_must_be_true() {
        let token = encode_unsigned_token(&json!({ "sub": "x", "requirePasswordChange": true }));
        assert!(decode_token(&token).unwrap().require_password_change);

        let token = encode_unsigned_token(&json!({ "sub": "x", "requirePasswordChange": "true" }));
        assert!(!decode_token(&token).unwrap().require_password_change);
    }

    #[test]
    fn test_expiry_claim() {
        let token = encode_unsigned_token(&json!({ "sub": "x", "exp": 1_700_000_000 }));
        let user = decode_token(&token).unwrap();
        let exp = user.expires_at.unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);
        assert!(user.is_expired_at(exp));
        assert!(!user.is_expired_at(exp - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(decode_token("").is_err());
        assert!(decode_token("abc").is_err());
        assert!(decode_token("a.b.c.d").is_err());
        assert!(decode_token("a.!!!.c").is_err());

        let no_sub = encode_unsigned_token(&json!({ "roles": [] }));
        assert!(decode_token(&no_sub).is_err());
    }

    #[test]
    fn test_fractional_expiry_is_accepted() {
        let token = encode_unsigned_token(&json!({
            "sub": "a",
            "roles": ["ROLE_ADMIN"],
            "exp": 1_700_000_000.5,
        }));
        let user = decode_token(&token).unwrap();
        assert_eq!(user.expires_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_unusable_expiry_is_ignored() {
        for exp in [json!("tomorrow"), json!(1e300), json!(null)] {
            let token = encode_unsigned_token(&json!({ "sub": "a", "exp": exp }));
            let user = decode_token(&token).unwrap();
            assert_eq!(user.username, "a");
            assert!(user.expires_at.is_none());
        }
    }
}
