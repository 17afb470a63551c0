//! User accounts and their read-facing projection.
//!
//! A user row carries the encoded password credential. It is never handed
//! out as-is: anything leaving the persistence layer goes through
//! [`User::to_data`], which strips the credential.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential::{self, CredentialError};

/// Access level of a user account.
///
/// Stored as a small integer (0–4, declaration order) by backends; matching
/// is exhaustive everywhere so adding a variant is a compile-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Guardian,
  Teacher,
  Moderator,
  Admin,
}

/// A user account row.
///
/// `password` holds the self-describing credential string produced by
/// [`crate::credential::hash_password`] — never plaintext. The struct
/// intentionally does not implement `Serialize`; use [`User::to_data`] for
/// anything caller-facing.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub password:   String,
  pub role:       Role,
}

impl User {
  /// Verify a plaintext password against this user's stored credential.
  ///
  /// `Ok(false)` means the password is wrong; `Err` means the stored
  /// credential could not be parsed — callers must not conflate the two.
  pub fn check_password(&self, password: &str) -> Result<bool, CredentialError> {
    credential::verify(password, &self.password)
  }

  /// The password-free projection, safe to expose outside the store.
  pub fn to_data(&self) -> UserData {
    UserData {
      user_id:    self.user_id,
      username:   self.username.clone(),
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
    }
  }
}

/// What a [`User`] looks like to everyone except the credential subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
  pub user_id:    Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}

/// Input to [`crate::store::SchoolStore::create_user`]. The id and the
/// credential string are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  /// Plaintext; hashed by the store before anything is written.
  pub password:   String,
  pub role:       Role,
}
