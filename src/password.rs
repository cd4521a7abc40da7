use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
  Version, password_hash::SaltString,
};
use rand::rngs::OsRng;

use crate::prelude::*;

fn argon() -> Argon2<'static> {
  if cfg!(test) {
    let params =
      Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
  } else {
    Argon2::default()
  }
}

pub fn hash(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);

  argon()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|err| Error::Internal(format!("Failed to hash password: {err}")))
}

/// Malformed stored hashes never verify.
pub fn verify(password: &str, hash: &str) -> bool {
  match PasswordHash::new(hash) {
    Ok(parsed) => argon().verify_password(password.as_bytes(), &parsed).is_ok(),
    Err(err) => {
      warn!("Stored password hash is malformed: {err}");
      false
    }
  }
}
