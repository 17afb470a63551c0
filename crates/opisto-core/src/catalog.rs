//! Subjects and the courses taught under them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A school subject, e.g. "Mathematics". Owns its courses referentially:
/// deleting a subject cascades to every course that points at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub name:       String,
  pub short_name: String,
}

/// A course belonging to exactly one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   Uuid,
  pub name:        String,
  pub short_name:  String,
  pub description: String,
  pub subject_id:  Uuid,
}

/// Input to [`crate::store::SchoolStore::create_course`].
#[derive(Debug, Clone)]
pub struct NewCourse {
  pub name:        String,
  pub short_name:  String,
  pub description: String,
  pub subject_id:  Uuid,
}
