//! Encoding and decoding helpers between Rust domain types and the
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings, roles as small
//! integers in declaration order, and every timestamp as an epoch-second
//! INTEGER.

use opisto_core::{
  catalog::{Course, Subject},
  message::Message,
  schedule::{Group, GroupReservation, GroupTimeData},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> i64 {
  match role {
    Role::Student => 0,
    Role::Guardian => 1,
    Role::Teacher => 2,
    Role::Moderator => 3,
    Role::Admin => 4,
  }
}

pub fn decode_role(code: i64) -> Result<Role> {
  match code {
    0 => Ok(Role::Student),
    1 => Ok(Role::Guardian),
    2 => Ok(Role::Teacher),
    3 => Ok(Role::Moderator),
    4 => Ok(Role::Admin),
    other => Err(Error::UnknownRole(other)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub password:   String,
  pub role:       i64,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      first_name: row.get(2)?,
      last_name:  row.get(3)?,
      password:   row.get(4)?,
      role:       row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      first_name: self.first_name,
      last_name:  self.last_name,
      password:   self.password,
      role:       decode_role(self.role)?,
    })
  }
}

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: String,
  pub name:       String,
  pub short_name: String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id: row.get(0)?,
      name:       row.get(1)?,
      short_name: row.get(2)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      name:       self.name,
      short_name: self.short_name,
    })
  }
}

/// Raw values read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:   String,
  pub name:        String,
  pub short_name:  String,
  pub description: String,
  pub subject_id:  String,
}

impl RawCourse {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:   row.get(0)?,
      name:        row.get(1)?,
      short_name:  row.get(2)?,
      description: row.get(3)?,
      subject_id:  row.get(4)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:   decode_uuid(&self.course_id)?,
      name:        self.name,
      short_name:  self.short_name,
      description: self.description,
      subject_id:  decode_uuid(&self.subject_id)?,
    })
  }
}

/// Raw values read directly from a `study_groups` row.
pub struct RawGroup {
  pub group_id:   String,
  pub name:       String,
  pub course_id:  String,
  pub teacher_id: Option<String>,
  pub start_date: i64,
  pub end_date:   i64,
}

impl RawGroup {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      group_id:   row.get(0)?,
      name:       row.get(1)?,
      course_id:  row.get(2)?,
      teacher_id: row.get(3)?,
      start_date: row.get(4)?,
      end_date:   row.get(5)?,
    })
  }

  pub fn into_group(self) -> Result<Group> {
    let teacher_id = self
      .teacher_id
      .as_deref()
      .map(decode_uuid)
      .transpose()?;

    Ok(Group {
      group_id: decode_uuid(&self.group_id)?,
      name: self.name,
      course_id: decode_uuid(&self.course_id)?,
      teacher_id,
      start_date: self.start_date,
      end_date: self.end_date,
    })
  }
}

/// Read a schedule slot from a `group_times` row (identity columns
/// excluded).
pub fn group_time_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupTimeData> {
  Ok(GroupTimeData {
    start_time:  row.get(0)?,
    end_time:    row.get(1)?,
    day_of_week: row.get(2)?,
  })
}

/// Raw values read directly from a `group_reservations` row.
pub struct RawReservation {
  pub reservation_id: String,
  pub group_id:       String,
  pub reserver_id:    String,
}

impl RawReservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reservation_id: row.get(0)?,
      group_id:       row.get(1)?,
      reserver_id:    row.get(2)?,
    })
  }

  pub fn into_reservation(self) -> Result<GroupReservation> {
    Ok(GroupReservation {
      reservation_id: decode_uuid(&self.reservation_id)?,
      group_id:       decode_uuid(&self.group_id)?,
      reserver_id:    decode_uuid(&self.reserver_id)?,
    })
  }
}

/// Raw values read directly from a `messages` row.
pub struct RawMessage {
  pub message_id:  String,
  pub title:       String,
  pub contents:    String,
  pub sender_id:   String,
  pub responds_to: Option<String>,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id:  row.get(0)?,
      title:       row.get(1)?,
      contents:    row.get(2)?,
      sender_id:   row.get(3)?,
      responds_to: row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    let responds_to = self
      .responds_to
      .as_deref()
      .map(decode_uuid)
      .transpose()?;

    Ok(Message {
      message_id: decode_uuid(&self.message_id)?,
      title: self.title,
      contents: self.contents,
      sender_id: decode_uuid(&self.sender_id)?,
      responds_to,
    })
  }
}
