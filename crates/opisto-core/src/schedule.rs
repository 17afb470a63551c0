//! Teaching groups, their recurring time slots, and student reservations.
//!
//! A group belongs to a course and carries a date range plus a set of weekly
//! [`GroupTime`] slots. Students are linked to groups through
//! [`GroupReservation`] rows; a reservation is identified by the
//! (group, reserver) pair when cancelling, not by its own id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A teaching group for one course.
///
/// `teacher_id` is `None` until a teacher is assigned. `start_date` and
/// `end_date` are epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub group_id:   Uuid,
  pub name:       String,
  pub course_id:  Uuid,
  pub teacher_id: Option<Uuid>,
  pub start_date: i64,
  pub end_date:   i64,
}

/// One recurring weekly slot of a group's schedule.
///
/// `start_time`/`end_time` are epoch seconds; `day_of_week` is a small
/// integer whose range this layer does not check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTime {
  pub time_id:     Uuid,
  pub group_id:    Uuid,
  pub start_time:  i64,
  pub end_time:    i64,
  pub day_of_week: i64,
}

/// A time slot without identity — the input to group creation and schedule
/// replacement, and the shape schedules are read back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTimeData {
  pub start_time:  i64,
  pub end_time:    i64,
  pub day_of_week: i64,
}

/// Links a user into a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReservation {
  pub reservation_id: Uuid,
  pub group_id:       Uuid,
  pub reserver_id:    Uuid,
}

/// A group together with its current schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupData {
  pub group: Group,
  pub times: Vec<GroupTimeData>,
}

/// Input to [`crate::store::SchoolStore::create_group`]. The group id and
/// per-slot ids are assigned by the store; the group row and all time rows
/// are persisted as one atomic unit.
#[derive(Debug, Clone)]
pub struct NewGroup {
  pub name:       String,
  pub course_id:  Uuid,
  pub start_date: i64,
  pub end_date:   i64,
  pub times:      Vec<GroupTimeData>,
}
