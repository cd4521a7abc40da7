//! Signed session tokens (HS256).

use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::{entity::Role, prelude::*};

/// Which client the token was issued to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifetime {
  Web,
  Mobile,
}

impl Lifetime {
  pub fn duration(self) -> TimeDelta {
    match self {
      Lifetime::Web => TimeDelta::days(7),
      Lifetime::Mobile => TimeDelta::days(30),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
  pub id: i32,
  pub email: String,
  #[serde(alias = "tipo")]
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

pub struct Tokens {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
}

impl Tokens {
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }

  pub fn issue(
    &self,
    id: i32,
    email: &str,
    role: Role,
    lifetime: Lifetime,
  ) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
      id,
      email: email.to_string(),
      role,
      iat: now.timestamp(),
      exp: (now + lifetime.duration()).timestamp(),
    };

    Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
  }

  /// Checks signature and expiry. Any failure yields `None`.
  pub fn verify(&self, token: &str) -> Option<Claims> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .inspect_err(|err| debug!("Rejected session token: {err}"))
      .map(|data| data.claims)
      .ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_issue_and_verify() {
    let tokens = Tokens::new("secret");
    let token =
      tokens.issue(7, "ana@example.com", Role::User, Lifetime::Mobile).unwrap();

    let claims = tokens.verify(&token).unwrap();
    assert_eq!(claims.id, 7);
    assert_eq!(claims.email, "ana@example.com");
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.exp - claims.iat, 30 * 86_400);
  }

  #[test]
  fn test_rejects_foreign_signature() {
    let token = Tokens::new("one")
      .issue(1, "a@b.c", Role::Admin, Lifetime::Web)
      .unwrap();

    assert!(Tokens::new("two").verify(&token).is_none());
    assert!(Tokens::new("one").verify("not-a-token").is_none());
  }

  #[test]
  fn test_rejects_expired() {
    let claims = Claims {
      id: 1,
      email: "a@b.c".into(),
      role: Role::User,
      iat: Utc::now().timestamp() - 100,
      exp: Utc::now().timestamp() - 10,
    };
    let token = encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &EncodingKey::from_secret(b"secret"),
    )
    .unwrap();

    assert!(Tokens::new("secret").verify(&token).is_none());
  }

  #[test]
  fn test_accepts_legacy_role_field() {
    let now = Utc::now().timestamp();
    let legacy = json::json!({
      "id": 3,
      "email": "root@example.com",
      "tipo": "administrador",
      "iat": now,
      "exp": now + 60,
    });
    let token = encode(
      &Header::new(Algorithm::HS256),
      &legacy,
      &EncodingKey::from_secret(b"secret"),
    )
    .unwrap();

    let claims = Tokens::new("secret").verify(&token).unwrap();
    assert_eq!(claims.role, Role::Admin);
  }
}
