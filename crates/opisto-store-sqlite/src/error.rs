//! Error type for `opisto-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] opisto_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("background hashing task failed: {0}")]
  Task(#[from] tokio::task::JoinError),

  #[error("unknown role code: {0}")]
  UnknownRole(i64),

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
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
