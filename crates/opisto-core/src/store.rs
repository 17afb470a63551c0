//! The `SchoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `opisto-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend. A backend only needs single-row inserts, point
//! updates and deletes, equality-filtered selects, simple joins, and
//! transactional atomicity across a group of writes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalog::{Course, NewCourse, Subject},
  message::{Message, NewMessage},
  schedule::{
    Group, GroupData, GroupReservation, GroupTimeData, NewGroup,
  },
  user::{NewUser, User},
};

/// Abstraction over an Opisto persistence backend.
///
/// Every operation that writes more than one row (creation with related
/// rows, schedule replacement, single-entity cascades) must be atomic:
/// either all constituent writes commit or none do. The parent-level
/// cascades ([`delete_subject`](Self::delete_subject),
/// [`delete_course`](Self::delete_course)) are the documented exception —
/// each child deletion commits independently.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Create a user. Fails without writing if the username is taken.
  /// The plaintext password is hashed before anything is persisted.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id.
  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by their unique username.
  fn get_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Update a user's first and last name.
  fn change_names(
    &self,
    user_id: Uuid,
    first_name: String,
    last_name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Re-hash and overwrite a user's stored credential.
  fn change_password(
    &self,
    user_id: Uuid,
    new_password: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a user row. Deleting a missing user is a no-op.
  fn delete_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  fn create_subject(
    &self,
    name: String,
    short_name: String,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// All subjects; zero subjects is the `NoSubjects` condition.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn set_course_name(
    &self,
    course_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_course_short_name(
    &self,
    course_id: Uuid,
    short_name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_course_description(
    &self,
    course_id: Uuid,
    description: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Courses under a subject, resolved by join at query time.
  ///
  /// Zero matching rows is the `NoCoursesFound` condition; this method does
  /// not itself check that the subject exists.
  fn courses_for_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Groups of a course. A course with no groups yields an empty list.
  fn groups_for_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  /// Delete a course and, first, every group under it (group cascades run
  /// as their own transactions).
  fn delete_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a subject and, first, every course under it (course cascades
  /// run as their own transactions).
  fn delete_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Scheduling ────────────────────────────────────────────────────────

  /// Create a group and all its time slots as one atomic unit.
  fn create_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  /// A group row together with its schedule.
  fn get_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<GroupData, Self::Error>> + Send + '_;

  /// Assign a teacher, updating both the row and the caller's copy.
  ///
  /// If the write fails, `group.teacher_id` is restored to its prior value
  /// so the caller's copy does not silently diverge from storage.
  fn assign_teacher<'a>(
    &'a self,
    group: &'a mut Group,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Atomically replace a group's entire schedule with `times` — the old
  /// set is fully removed, never merged with the new one.
  fn replace_group_times(
    &self,
    group_id: Uuid,
    times: Vec<GroupTimeData>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A group's schedule. Zero rows is reported as `GroupNotFound`: the
  /// store cannot tell a truly empty schedule from a missing group.
  fn group_times(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GroupTimeData>, Self::Error>> + Send + '_;

  /// Reserve a user into a group. No duplicate check is performed; callers
  /// that need uniqueness must enforce it themselves.
  fn create_reservation(
    &self,
    user_id: Uuid,
    group_id: Uuid,
  ) -> impl Future<Output = Result<GroupReservation, Self::Error>> + Send + '_;

  /// Remove all reservations matching (user, group). Removing zero rows is
  /// success, not an error.
  fn cancel_reservation(
    &self,
    user_id: Uuid,
    group_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Reservations of a group; zero rows is `GroupNotFound`.
  fn group_reservations(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GroupReservation>, Self::Error>> + Send + '_;

  /// Delete a group, its time slots, and its reservations in one
  /// transaction.
  fn delete_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Groups a user has reserved, resolved through the reservation join.
  /// Zero rows is the `UserHasNoGroups` condition.
  fn user_groups(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  /// Members of a group, resolved through the reservation join. Zero rows
  /// is the `EmptyGroup` condition.
  fn group_users(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Messaging ─────────────────────────────────────────────────────────

  /// Persist a message and one recipient row per target, atomically.
  /// Recipient rows are written exactly as given — see
  /// [`NewMessage::including_sender`] for the sender's own copy.
  fn send_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  fn get_message(
    &self,
    message_id: Uuid,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Messages visible to a user, resolved from their recipient rows.
  /// Zero rows is the `NoMessages` condition.
  fn messages_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Direct replies to a message. A nil parent id is rejected as
  /// `InvalidMessageId` before any query runs; zero matching rows is the
  /// `NoMessages` condition.
  fn replies(
    &self,
    message_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Delete a message and its recipient rows in one transaction. Replies
  /// are left untouched; their `responds_to` may dangle afterwards.
  fn delete_message(
    &self,
    message_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
