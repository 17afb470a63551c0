//! Integration tests for `SqliteStore` against an in-memory database.

use opisto_core::{
  catalog::NewCourse,
  message::NewMessage,
  schedule::{GroupTimeData, NewGroup},
  store::SchoolStore,
  user::{NewUser, Role},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str, password: &str) -> NewUser {
  NewUser {
    username:   username.into(),
    first_name: "Oona".into(),
    last_name:  "Oppilas".into(),
    password:   password.into(),
    role:       Role::Student,
  }
}

fn new_course(subject_id: Uuid, name: &str, short_name: &str) -> NewCourse {
  NewCourse {
    name:        name.into(),
    short_name:  short_name.into(),
    description: format!("{name} course"),
    subject_id,
  }
}

fn slot(day_of_week: i64) -> GroupTimeData {
  GroupTimeData {
    start_time:  8 * 3600,
    end_time:    9 * 3600,
    day_of_week,
  }
}

fn new_group(course_id: Uuid, times: Vec<GroupTimeData>) -> NewGroup {
  NewGroup {
    name: "MAA2.1".into(),
    course_id,
    start_date: 1_700_000_000,
    end_date: 1_702_600_000,
    times,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_user() {
  let s = store().await;

  let user = s.create_user(new_user("oona.o", "password1")).await.unwrap();

  let by_id = s.get_user(user.user_id).await.unwrap();
  assert_eq!(by_id.user_id, user.user_id);
  assert_eq!(by_id.username, "oona.o");
  assert_eq!(by_id.first_name, "Oona");
  assert_eq!(by_id.last_name, "Oppilas");
  assert_eq!(by_id.role, Role::Student);

  let by_username = s.get_user_by_username("oona.o".into()).await.unwrap();
  assert_eq!(by_username.user_id, user.user_id);

  // The stored credential verifies the right password and only that one.
  assert!(by_id.check_password("password1").unwrap());
  assert!(!by_id.check_password("password2").unwrap());

  // The public projection carries everything except the credential.
  let data = by_id.to_data();
  assert_eq!(data.user_id, user.user_id);
  assert_eq!(data.username, "oona.o");
}

#[tokio::test]
async fn get_user_missing_errors() {
  let s = store().await;

  let err = s.get_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));

  let err = s.get_user_by_username("nobody".into()).await.unwrap_err();
  assert!(matches!(err, Error::UsernameNotFound(_)));
}

#[tokio::test]
async fn duplicate_username_rejected_without_write() {
  let s = store().await;

  let original = s.create_user(new_user("eetu.e", "password1")).await.unwrap();

  let mut second = new_user("eetu.e", "password2");
  second.first_name = "Should".into();
  second.last_name = "Fail".into();
  let err = s.create_user(second).await.unwrap_err();
  assert!(matches!(err, Error::UsernameTaken(ref name) if name == "eetu.e"));

  // The existing row is untouched.
  let kept = s.get_user(original.user_id).await.unwrap();
  assert_eq!(kept.first_name, "Oona");
  assert_eq!(kept.password, original.password);
}

#[tokio::test]
async fn change_names_and_password() {
  let s = store().await;

  let user = s.create_user(new_user("arto.a", "admin")).await.unwrap();

  s.change_names(user.user_id, "Arto".into(), "Admini".into())
    .await
    .unwrap();
  let renamed = s.get_user(user.user_id).await.unwrap();
  assert_eq!(renamed.first_name, "Arto");
  assert_eq!(renamed.last_name, "Admini");

  s.change_password(user.user_id, "admin2".into()).await.unwrap();
  let rehashed = s.get_user(user.user_id).await.unwrap();
  assert!(!rehashed.check_password("admin").unwrap());
  assert!(rehashed.check_password("admin2").unwrap());
}

#[tokio::test]
async fn updates_of_missing_user_error() {
  let s = store().await;

  let err = s
    .change_names(Uuid::new_v4(), "No".into(), "One".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn delete_missing_user_is_noop() {
  let s = store().await;
  s.delete_user(Uuid::new_v4()).await.unwrap();
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn courses_for_subject_distinguishes_empty() {
  let s = store().await;

  let maa = s
    .create_subject("Pitkä matematiikka".into(), "MAA".into())
    .await
    .unwrap();
  for (name, short) in [
    ("Polynomifunktiot", "MAA2"),
    ("Geometria", "MAA3"),
    ("Vektorit", "MAA4"),
  ] {
    s.create_course(new_course(maa.subject_id, name, short))
      .await
      .unwrap();
  }

  let ai = s
    .create_subject("Äidinkieli".into(), "AI".into())
    .await
    .unwrap();

  let maa_courses = s.courses_for_subject(maa.subject_id).await.unwrap();
  assert_eq!(maa_courses.len(), 3);
  assert!(maa_courses.iter().all(|c| c.subject_id == maa.subject_id));

  // A subject with zero courses is a named condition, not an empty list.
  let err = s.courses_for_subject(ai.subject_id).await.unwrap_err();
  assert!(matches!(err, Error::NoCoursesFound(id) if id == ai.subject_id));
}

#[tokio::test]
async fn get_subject_roundtrip_and_missing() {
  let s = store().await;

  let subject = s
    .create_subject("Fysiikka".into(), "FY".into())
    .await
    .unwrap();
  let fetched = s.get_subject(subject.subject_id).await.unwrap();
  assert_eq!(fetched.short_name, "FY");

  let err = s.get_subject(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(_)));
}

#[tokio::test]
async fn list_subjects_empty_is_named_condition() {
  let s = store().await;

  let err = s.list_subjects().await.unwrap_err();
  assert!(matches!(err, Error::NoSubjects));

  s.create_subject("Kemia".into(), "KE".into()).await.unwrap();
  assert_eq!(s.list_subjects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn course_setters_update_single_fields() {
  let s = store().await;

  let course = s
    .create_course(new_course(Uuid::new_v4(), "Geometria", "MAB2"))
    .await
    .unwrap();

  s.set_course_name(course.course_id, "Geometria II".into())
    .await
    .unwrap();
  s.set_course_short_name(course.course_id, "MAB2b".into())
    .await
    .unwrap();
  s.set_course_description(course.course_id, "pi = 3".into())
    .await
    .unwrap();

  let updated = s.get_course(course.course_id).await.unwrap();
  assert_eq!(updated.name, "Geometria II");
  assert_eq!(updated.short_name, "MAB2b");
  assert_eq!(updated.description, "pi = 3");

  let err = s
    .set_course_name(Uuid::new_v4(), "x".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CourseNotFound(_)));
}

// ─── Scheduling ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_group_persists_all_time_slots() {
  let s = store().await;
  let course_id = Uuid::new_v4();

  let group = s
    .create_group(new_group(course_id, vec![slot(0), slot(3), slot(5)]))
    .await
    .unwrap();
  assert_eq!(group.teacher_id, None);

  let times = s.group_times(group.group_id).await.unwrap();
  assert_eq!(times.len(), 3);

  let data = s.get_group(group.group_id).await.unwrap();
  assert_eq!(data.group.group_id, group.group_id);
  assert_eq!(data.times.len(), 3);

  let in_course = s.groups_for_course(course_id).await.unwrap();
  assert_eq!(in_course.len(), 1);
  assert_eq!(in_course[0].group_id, group.group_id);
}

#[tokio::test]
async fn replace_group_times_replaces_never_merges() {
  let s = store().await;

  let group = s
    .create_group(new_group(Uuid::new_v4(), vec![slot(0), slot(3), slot(5)]))
    .await
    .unwrap();

  let replacement = vec![slot(1), slot(2)];
  s.replace_group_times(group.group_id, replacement.clone())
    .await
    .unwrap();

  let mut times = s.group_times(group.group_id).await.unwrap();
  times.sort_by_key(|t| t.day_of_week);
  assert_eq!(times, replacement);

  // Replacing with the same set again yields exactly that set.
  s.replace_group_times(group.group_id, replacement.clone())
    .await
    .unwrap();
  let mut again = s.group_times(group.group_id).await.unwrap();
  again.sort_by_key(|t| t.day_of_week);
  assert_eq!(again, replacement);
}

#[tokio::test]
async fn group_times_empty_means_group_not_found() {
  let s = store().await;
  let err = s.group_times(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::GroupNotFound(_)));
}

#[tokio::test]
async fn assign_teacher_syncs_row_and_local_copy() {
  let s = store().await;
  let teacher_id = Uuid::new_v4();

  let mut group = s
    .create_group(new_group(Uuid::new_v4(), vec![slot(0)]))
    .await
    .unwrap();

  s.assign_teacher(&mut group, teacher_id).await.unwrap();
  assert_eq!(group.teacher_id, Some(teacher_id));

  let stored = s.get_group(group.group_id).await.unwrap();
  assert_eq!(stored.group.teacher_id, Some(teacher_id));

  // A failed write must roll the in-memory field back.
  let mut phantom = group.clone();
  phantom.group_id = Uuid::new_v4();
  let prev = phantom.teacher_id;
  let err = s
    .assign_teacher(&mut phantom, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::GroupNotFound(_)));
  assert_eq!(phantom.teacher_id, prev);
}

#[tokio::test]
async fn reservations_join_users_to_groups() {
  let s = store().await;

  let alice = s.create_user(new_user("alice", "pw-alice")).await.unwrap();
  let bob = s.create_user(new_user("bob", "pw-bob")).await.unwrap();

  let group = s
    .create_group(new_group(Uuid::new_v4(), vec![slot(1)]))
    .await
    .unwrap();

  s.create_reservation(alice.user_id, group.group_id).await.unwrap();
  s.create_reservation(bob.user_id, group.group_id).await.unwrap();

  let members = s.group_users(group.group_id).await.unwrap();
  assert_eq!(members.len(), 2);

  let alices_groups = s.user_groups(alice.user_id).await.unwrap();
  assert_eq!(alices_groups.len(), 1);
  assert_eq!(alices_groups[0].group_id, group.group_id);

  s.cancel_reservation(alice.user_id, group.group_id).await.unwrap();

  let remaining = s.group_reservations(group.group_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].reserver_id, bob.user_id);

  // Cancelling a reservation that no longer exists is a no-op.
  s.cancel_reservation(alice.user_id, group.group_id).await.unwrap();

  let err = s.user_groups(alice.user_id).await.unwrap_err();
  assert!(matches!(err, Error::UserHasNoGroups(_)));
}

#[tokio::test]
async fn duplicate_reservations_are_permitted() {
  let s = store().await;
  let (user_id, group_id) = (Uuid::new_v4(), Uuid::new_v4());

  s.create_reservation(user_id, group_id).await.unwrap();
  s.create_reservation(user_id, group_id).await.unwrap();

  let rows = s.group_reservations(group_id).await.unwrap();
  assert_eq!(rows.len(), 2);

  // Cancellation removes every row of the composite pair.
  s.cancel_reservation(user_id, group_id).await.unwrap();
  let err = s.group_reservations(group_id).await.unwrap_err();
  assert!(matches!(err, Error::GroupNotFound(_)));
}

#[tokio::test]
async fn membership_queries_surface_empty_as_errors() {
  let s = store().await;

  let err = s.group_users(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::EmptyGroup(_)));

  let err = s.user_groups(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::UserHasNoGroups(_)));
}

#[tokio::test]
async fn delete_group_removes_times_and_reservations_atomically() {
  let s = store().await;

  let group = s
    .create_group(new_group(Uuid::new_v4(), vec![slot(2), slot(4)]))
    .await
    .unwrap();
  s.create_reservation(Uuid::new_v4(), group.group_id).await.unwrap();

  s.delete_group(group.group_id).await.unwrap();

  assert!(matches!(
    s.get_group(group.group_id).await.unwrap_err(),
    Error::GroupNotFound(_)
  ));
  assert!(matches!(
    s.group_times(group.group_id).await.unwrap_err(),
    Error::GroupNotFound(_)
  ));
  assert!(matches!(
    s.group_reservations(group.group_id).await.unwrap_err(),
    Error::GroupNotFound(_)
  ));
}

// ─── Cascading deletion ──────────────────────────────────────────────────────

#[tokio::test]
async fn delete_subject_cascades_through_courses_and_groups() {
  let s = store().await;

  let subject = s
    .create_subject("Matematiikka".into(), "MA".into())
    .await
    .unwrap();

  let mut group_ids = Vec::new();
  let mut course_ids = Vec::new();
  for short in ["MA1", "MA2"] {
    let course = s
      .create_course(new_course(subject.subject_id, "Kurssi", short))
      .await
      .unwrap();
    course_ids.push(course.course_id);

    let group = s
      .create_group(new_group(course.course_id, vec![slot(1), slot(3)]))
      .await
      .unwrap();
    s.create_reservation(Uuid::new_v4(), group.group_id).await.unwrap();
    group_ids.push(group.group_id);
  }

  s.delete_subject(subject.subject_id).await.unwrap();

  assert!(matches!(
    s.get_subject(subject.subject_id).await.unwrap_err(),
    Error::SubjectNotFound(_)
  ));
  assert!(matches!(
    s.courses_for_subject(subject.subject_id).await.unwrap_err(),
    Error::NoCoursesFound(_)
  ));
  for course_id in course_ids {
    assert!(matches!(
      s.get_course(course_id).await.unwrap_err(),
      Error::CourseNotFound(_)
    ));
  }
  for group_id in group_ids {
    assert!(matches!(
      s.get_group(group_id).await.unwrap_err(),
      Error::GroupNotFound(_)
    ));
    assert!(matches!(
      s.group_times(group_id).await.unwrap_err(),
      Error::GroupNotFound(_)
    ));
    assert!(matches!(
      s.group_reservations(group_id).await.unwrap_err(),
      Error::GroupNotFound(_)
    ));
  }
}

#[tokio::test]
async fn delete_subject_without_courses_still_removes_row() {
  let s = store().await;

  let subject = s
    .create_subject("Filosofia".into(), "FI".into())
    .await
    .unwrap();
  s.delete_subject(subject.subject_id).await.unwrap();

  let err = s.get_subject(subject.subject_id).await.unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(_)));
}

#[tokio::test]
async fn delete_course_cascades_to_groups() {
  let s = store().await;

  let course = s
    .create_course(new_course(Uuid::new_v4(), "Vektorit", "MAA4"))
    .await
    .unwrap();
  let group = s
    .create_group(new_group(course.course_id, vec![slot(2)]))
    .await
    .unwrap();

  s.delete_course(course.course_id).await.unwrap();

  assert!(matches!(
    s.get_course(course.course_id).await.unwrap_err(),
    Error::CourseNotFound(_)
  ));
  assert!(matches!(
    s.get_group(group.group_id).await.unwrap_err(),
    Error::GroupNotFound(_)
  ));
  assert!(s.groups_for_course(course.course_id).await.unwrap().is_empty());
}

// ─── Messaging ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_fans_out_to_every_recipient() {
  let s = store().await;
  let (sender, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

  let message = s
    .send_message(NewMessage::new(sender, vec![b, c], "Tiedote", "Koe siirtyy"))
    .await
    .unwrap();

  let for_b = s.messages_for_user(b).await.unwrap();
  let for_c = s.messages_for_user(c).await.unwrap();
  assert_eq!(for_b.len(), 1);
  assert_eq!(for_c.len(), 1);
  assert_eq!(for_b[0].message_id, message.message_id);
  assert_eq!(for_b[0].message_id, for_c[0].message_id);

  let err = s.messages_for_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NoMessages));
}

#[tokio::test]
async fn including_sender_adds_a_sender_copy() {
  let s = store().await;
  let (sender, recipient) = (Uuid::new_v4(), Uuid::new_v4());

  let message = s
    .send_message(
      NewMessage::new(sender, vec![recipient], "Kuittaus", "Näkyykö?")
        .including_sender(),
    )
    .await
    .unwrap();

  let own = s.messages_for_user(sender).await.unwrap();
  assert_eq!(own.len(), 1);
  assert_eq!(own[0].message_id, message.message_id);
}

#[tokio::test]
async fn replies_thread_by_responds_to() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  let parent = s
    .send_message(NewMessage::new(a, vec![b], "Kysymys", "Milloin koe on?"))
    .await
    .unwrap();
  let reply = s
    .send_message(
      NewMessage::new(b, vec![a], "Vastaus", "Perjantaina")
        .in_reply_to(parent.message_id),
    )
    .await
    .unwrap();

  let replies = s.replies(parent.message_id).await.unwrap();
  assert_eq!(replies.len(), 1);
  assert_eq!(replies[0].message_id, reply.message_id);
  assert_eq!(replies[0].responds_to, Some(parent.message_id));

  // A nil parent id is malformed input, rejected before the query.
  let err = s.replies(Uuid::nil()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidMessageId));

  // An unknown parent id queries fine and matches nothing.
  let err = s.replies(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NoMessages));
}

#[tokio::test]
async fn delete_message_removes_recipients_but_not_replies() {
  let s = store().await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

  let parent = s
    .send_message(NewMessage::new(a, vec![b], "Alkuperäinen", "..."))
    .await
    .unwrap();
  let reply = s
    .send_message(
      NewMessage::new(b, vec![a], "Re: Alkuperäinen", "...")
        .in_reply_to(parent.message_id),
    )
    .await
    .unwrap();

  s.delete_message(parent.message_id).await.unwrap();

  assert!(matches!(
    s.get_message(parent.message_id).await.unwrap_err(),
    Error::MessageNotFound(_)
  ));
  // The recipient rows went with the message.
  assert!(matches!(
    s.messages_for_user(b).await.unwrap_err(),
    Error::NoMessages
  ));
  // The reply survives with its responds_to now dangling.
  let surviving = s.get_message(reply.message_id).await.unwrap();
  assert_eq!(surviving.responds_to, Some(parent.message_id));
  let threaded = s.replies(parent.message_id).await.unwrap();
  assert_eq!(threaded.len(), 1);
}
