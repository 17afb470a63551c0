//! [`SqliteStore`] — the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use opisto_core::{
  catalog::{Course, NewCourse, Subject},
  credential,
  message::{Message, NewMessage},
  schedule::{Group, GroupData, GroupReservation, GroupTimeData, NewGroup},
  store::SchoolStore,
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawCourse, RawGroup, RawMessage, RawReservation, RawSubject, RawUser,
    encode_role, encode_uuid, group_time_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Opisto school store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Hash a password on the blocking pool — the derivation is deliberately
  /// expensive and must not stall the async runtime.
  async fn hash_password_blocking(&self, password: String) -> Result<String> {
    let credential =
      tokio::task::spawn_blocking(move || credential::hash_password(&password))
        .await?
        .map_err(opisto_core::Error::from)?;
    Ok(credential)
  }

  /// A group's schedule without the empty-means-missing interpretation.
  async fn fetch_group_times(&self, group_id: Uuid) -> Result<Vec<GroupTimeData>> {
    let id_str = encode_uuid(group_id);

    let times = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT start_time, end_time, day_of_week
           FROM group_times WHERE group_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], group_time_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(times)
  }
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    // Uniqueness check first, so a taken username fails before the
    // expensive derivation and without any write.
    match self.get_user_by_username(input.username.clone()).await {
      Ok(_) => return Err(Error::UsernameTaken(input.username)),
      Err(Error::UsernameNotFound(_)) => {}
      Err(e) => return Err(e),
    }

    let password = self.hash_password_blocking(input.password).await?;

    let user = User {
      user_id: Uuid::new_v4(),
      username: input.username,
      first_name: input.first_name,
      last_name: input.last_name,
      password,
      role: input.role,
    };

    let id_str     = encode_uuid(user.user_id);
    let username   = user.username.clone();
    let first_name = user.first_name.clone();
    let last_name  = user.last_name.clone();
    let credential = user.password.clone();
    let role       = encode_role(user.role);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, first_name, last_name, password, role)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, first_name, last_name, credential, role],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<User> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, first_name, last_name, password, role
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::UserNotFound(user_id))?.into_user()
  }

  async fn get_user_by_username(&self, username: String) -> Result<User> {
    let needle = username.clone();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, first_name, last_name, password, role
               FROM users WHERE username = ?1",
              rusqlite::params![needle],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::UsernameNotFound(username))?.into_user()
  }

  async fn change_names(
    &self,
    user_id: Uuid,
    first_name: String,
    last_name: String,
  ) -> Result<()> {
    let id_str = encode_uuid(user_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET first_name = ?2, last_name = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, first_name, last_name],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(())
  }

  async fn change_password(&self, user_id: Uuid, new_password: String) -> Result<()> {
    let credential = self.hash_password_blocking(new_password).await?;
    let id_str = encode_uuid(user_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, credential],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(())
  }

  async fn delete_user(&self, user_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(user_id);

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id_str])?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn create_subject(&self, name: String, short_name: String) -> Result<Subject> {
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      name,
      short_name,
    };

    let id_str     = encode_uuid(subject.subject_id);
    let name       = subject.name.clone();
    let short_name = subject.short_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, short_name) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, short_name],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, subject_id: Uuid) -> Result<Subject> {
    let id_str = encode_uuid(subject_id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, name, short_name FROM subjects WHERE subject_id = ?1",
              rusqlite::params![id_str],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::SubjectNotFound(subject_id))?.into_subject()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT subject_id, name, short_name FROM subjects")?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::NoSubjects);
    }
    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course {
      course_id: Uuid::new_v4(),
      name: input.name,
      short_name: input.short_name,
      description: input.description,
      subject_id: input.subject_id,
    };

    let id_str      = encode_uuid(course.course_id);
    let name        = course.name.clone();
    let short_name  = course.short_name.clone();
    let description = course.description.clone();
    let subject_str = encode_uuid(course.subject_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (course_id, name, short_name, description, subject_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, short_name, description, subject_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(course)
  }

  async fn get_course(&self, course_id: Uuid) -> Result<Course> {
    let id_str = encode_uuid(course_id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT course_id, name, short_name, description, subject_id
               FROM courses WHERE course_id = ?1",
              rusqlite::params![id_str],
              RawCourse::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::CourseNotFound(course_id))?.into_course()
  }

  async fn set_course_name(&self, course_id: Uuid, name: String) -> Result<()> {
    let id_str = encode_uuid(course_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses SET name = ?2 WHERE course_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CourseNotFound(course_id));
    }
    Ok(())
  }

  async fn set_course_short_name(&self, course_id: Uuid, short_name: String) -> Result<()> {
    let id_str = encode_uuid(course_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses SET short_name = ?2 WHERE course_id = ?1",
          rusqlite::params![id_str, short_name],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CourseNotFound(course_id));
    }
    Ok(())
  }

  async fn set_course_description(&self, course_id: Uuid, description: String) -> Result<()> {
    let id_str = encode_uuid(course_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses SET description = ?2 WHERE course_id = ?1",
          rusqlite::params![id_str, description],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CourseNotFound(course_id));
    }
    Ok(())
  }

  async fn courses_for_subject(&self, subject_id: Uuid) -> Result<Vec<Course>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawCourse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.course_id, c.name, c.short_name, c.description, c.subject_id
           FROM subjects s
           INNER JOIN courses c ON c.subject_id = s.subject_id
           WHERE s.subject_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawCourse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::NoCoursesFound(subject_id));
    }
    raws.into_iter().map(RawCourse::into_course).collect()
  }

  async fn groups_for_course(&self, course_id: Uuid) -> Result<Vec<Group>> {
    let id_str = encode_uuid(course_id);

    let raws: Vec<RawGroup> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT group_id, name, course_id, teacher_id, start_date, end_date
           FROM study_groups WHERE course_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn delete_course(&self, course_id: Uuid) -> Result<()> {
    // Each group cascade commits independently; a failure partway leaves
    // the remaining groups and the course row in place.
    let groups = self.groups_for_course(course_id).await?;
    for group in &groups {
      self.delete_group(group.group_id).await?;
    }

    let id_str = encode_uuid(course_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM courses WHERE course_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn delete_subject(&self, subject_id: Uuid) -> Result<()> {
    let courses = match self.courses_for_subject(subject_id).await {
      Ok(courses) => courses,
      // A subject with no courses has nothing to cascade into; its own row
      // is still deleted below.
      Err(Error::NoCoursesFound(_)) => Vec::new(),
      Err(e) => return Err(e),
    };
    for course in &courses {
      self.delete_course(course.course_id).await?;
    }

    let id_str = encode_uuid(subject_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Scheduling ────────────────────────────────────────────────────────────

  async fn create_group(&self, input: NewGroup) -> Result<Group> {
    let group = Group {
      group_id: Uuid::new_v4(),
      name: input.name,
      course_id: input.course_id,
      teacher_id: None,
      start_date: input.start_date,
      end_date: input.end_date,
    };

    let id_str     = encode_uuid(group.group_id);
    let name       = group.name.clone();
    let course_str = encode_uuid(group.course_id);
    let start_date = group.start_date;
    let end_date   = group.end_date;
    let times      = input.times;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO study_groups (group_id, name, course_id, teacher_id, start_date, end_date)
           VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
          rusqlite::params![id_str, name, course_str, start_date, end_date],
        )?;
        for slot in &times {
          tx.execute(
            "INSERT INTO group_times (time_id, group_id, start_time, end_time, day_of_week)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              id_str,
              slot.start_time,
              slot.end_time,
              slot.day_of_week,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(group)
  }

  async fn get_group(&self, group_id: Uuid) -> Result<GroupData> {
    let id_str = encode_uuid(group_id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT group_id, name, course_id, teacher_id, start_date, end_date
               FROM study_groups WHERE group_id = ?1",
              rusqlite::params![id_str],
              RawGroup::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let group = raw.ok_or(Error::GroupNotFound(group_id))?.into_group()?;
    let times = self.fetch_group_times(group_id).await?;

    Ok(GroupData { group, times })
  }

  async fn assign_teacher(&self, group: &mut Group, teacher_id: Uuid) -> Result<()> {
    let prev = group.teacher_id;
    group.teacher_id = Some(teacher_id);

    let id_str      = encode_uuid(group.group_id);
    let teacher_str = encode_uuid(teacher_id);

    let outcome: Result<usize> = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE study_groups SET teacher_id = ?2 WHERE group_id = ?1",
          rusqlite::params![id_str, teacher_str],
        )?)
      })
      .await
      .map_err(Error::from);

    // Keep the caller's copy in sync with storage: roll the field back
    // whenever the row was not updated.
    match outcome {
      Ok(0) => {
        group.teacher_id = prev;
        Err(Error::GroupNotFound(group.group_id))
      }
      Ok(_) => Ok(()),
      Err(e) => {
        group.teacher_id = prev;
        Err(e)
      }
    }
  }

  async fn replace_group_times(&self, group_id: Uuid, times: Vec<GroupTimeData>) -> Result<()> {
    let id_str = encode_uuid(group_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM group_times WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?;
        for slot in &times {
          tx.execute(
            "INSERT INTO group_times (time_id, group_id, start_time, end_time, day_of_week)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              id_str,
              slot.start_time,
              slot.end_time,
              slot.day_of_week,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn group_times(&self, group_id: Uuid) -> Result<Vec<GroupTimeData>> {
    let times = self.fetch_group_times(group_id).await?;
    if times.is_empty() {
      return Err(Error::GroupNotFound(group_id));
    }
    Ok(times)
  }

  async fn create_reservation(&self, user_id: Uuid, group_id: Uuid) -> Result<GroupReservation> {
    let reservation = GroupReservation {
      reservation_id: Uuid::new_v4(),
      group_id,
      reserver_id: user_id,
    };

    let id_str       = encode_uuid(reservation.reservation_id);
    let group_str    = encode_uuid(group_id);
    let reserver_str = encode_uuid(user_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO group_reservations (reservation_id, group_id, reserver_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, group_str, reserver_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(reservation)
  }

  async fn cancel_reservation(&self, user_id: Uuid, group_id: Uuid) -> Result<()> {
    let group_str    = encode_uuid(group_id);
    let reserver_str = encode_uuid(user_id);

    // Matching zero rows is fine: cancelling a reservation that does not
    // exist is a no-op.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM group_reservations WHERE reserver_id = ?1 AND group_id = ?2",
          rusqlite::params![reserver_str, group_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn group_reservations(&self, group_id: Uuid) -> Result<Vec<GroupReservation>> {
    let id_str = encode_uuid(group_id);

    let raws: Vec<RawReservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT reservation_id, group_id, reserver_id
           FROM group_reservations WHERE group_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawReservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::GroupNotFound(group_id));
    }
    raws.into_iter().map(RawReservation::into_reservation).collect()
  }

  async fn delete_group(&self, group_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(group_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM group_reservations WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM group_times WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM study_groups WHERE group_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn user_groups(&self, user_id: Uuid) -> Result<Vec<Group>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawGroup> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT g.group_id, g.name, g.course_id, g.teacher_id, g.start_date, g.end_date
           FROM group_reservations r
           INNER JOIN users u ON u.user_id = r.reserver_id
           INNER JOIN study_groups g ON g.group_id = r.group_id
           WHERE r.reserver_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::UserHasNoGroups(user_id));
    }
    raws.into_iter().map(RawGroup::into_group).collect()
  }

  async fn group_users(&self, group_id: Uuid) -> Result<Vec<User>> {
    let id_str = encode_uuid(group_id);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.username, u.first_name, u.last_name, u.password, u.role
           FROM group_reservations r
           INNER JOIN users u ON u.user_id = r.reserver_id
           WHERE r.group_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::EmptyGroup(group_id));
    }
    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Messaging ─────────────────────────────────────────────────────────────

  async fn send_message(&self, input: NewMessage) -> Result<Message> {
    let message = Message {
      message_id: Uuid::new_v4(),
      title: input.title,
      contents: input.contents,
      sender_id: input.sender_id,
      responds_to: input.responds_to,
    };

    let id_str      = encode_uuid(message.message_id);
    let title       = message.title.clone();
    let contents    = message.contents.clone();
    let sender_str  = encode_uuid(message.sender_id);
    let parent_str  = message.responds_to.map(encode_uuid);
    let recipients  = input.recipients;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO messages (message_id, title, contents, sender_id, responds_to)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, title, contents, sender_str, parent_str],
        )?;
        for recipient in &recipients {
          tx.execute(
            "INSERT INTO message_recipients (recipient_id, message_id, user_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              id_str,
              encode_uuid(*recipient),
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn get_message(&self, message_id: Uuid) -> Result<Message> {
    let id_str = encode_uuid(message_id);

    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT message_id, title, contents, sender_id, responds_to
               FROM messages WHERE message_id = ?1",
              rusqlite::params![id_str],
              RawMessage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(Error::MessageNotFound(message_id))?.into_message()
  }

  async fn messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.message_id, m.title, m.contents, m.sender_id, m.responds_to
           FROM message_recipients mr
           LEFT JOIN messages m ON m.message_id = mr.message_id
           WHERE mr.user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::NoMessages);
    }
    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn replies(&self, message_id: Uuid) -> Result<Vec<Message>> {
    // The nil UUID is the typed form of a blank id; reject it before
    // touching the database.
    if message_id.is_nil() {
      return Err(Error::InvalidMessageId);
    }

    let id_str = encode_uuid(message_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT message_id, title, contents, sender_id, responds_to
           FROM messages WHERE responds_to = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Err(Error::NoMessages);
    }
    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn delete_message(&self, message_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(message_id);

    // Replies are deliberately untouched: a reply keeps its responds_to
    // even after the parent is gone.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM messages WHERE message_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM message_recipients WHERE message_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
