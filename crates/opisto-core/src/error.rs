//! Error types for `opisto-core`.
//!
//! Queries that legitimately match zero rows but whose callers need to
//! branch on emptiness get their own named variant (`NoCoursesFound`,
//! `UserHasNoGroups`, ...) instead of an empty collection.

use thiserror::Error;
use uuid::Uuid;

use crate::credential::CredentialError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("no user with username {0:?}")]
  UsernameNotFound(String),

  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("no subjects found")]
  NoSubjects,

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("no courses found for subject {0}")]
  NoCoursesFound(Uuid),

  #[error("group not found: {0}")]
  GroupNotFound(Uuid),

  #[error("user {0} has no groups")]
  UserHasNoGroups(Uuid),

  #[error("group {0} has no users")]
  EmptyGroup(Uuid),

  #[error("message not found: {0}")]
  MessageNotFound(Uuid),

  #[error("no messages found")]
  NoMessages,

  #[error("invalid message id")]
  InvalidMessageId,

  #[error("credential error: {0}")]
  Credential(#[from] CredentialError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
